//! Ordered acceptance filters applied to every resolved candidate.
//!
//! The chain short-circuits: the first filter that fails decides the reject
//! reason and nothing after it runs. Which filters are present comes from
//! [`FilterConfig`]; their relative order never changes.

use std::collections::HashSet;

use log::{debug, warn};

use crate::config::FilterConfig;
use crate::models::{
    decision::{Decision, RejectReason},
    place::PlaceRecord,
    trip::TripContext,
};
use crate::services::places_service::map_link;

#[derive(Debug, Clone)]
pub enum AcceptanceFilter {
    /// Candidate text is a generic label, not a venue.
    Blacklist(HashSet<String>),
    /// Resolved address must mention the destination's leading component.
    LocalityContainment,
    CategoryAllowList(HashSet<String>),
    CategoryDenyList(HashSet<String>),
    MinReviews(u32),
    /// Candidate and canonical names must share a token of at least this length.
    NameSimilarity(usize),
}

impl AcceptanceFilter {
    pub fn check(
        &self,
        candidate: &str,
        ctx: &TripContext,
        place: &PlaceRecord,
    ) -> Result<(), RejectReason> {
        let passed = match self {
            AcceptanceFilter::Blacklist(stoplist) => {
                !stoplist.contains(&candidate.trim().to_lowercase())
            }
            AcceptanceFilter::LocalityContainment => place
                .formatted_address
                .to_lowercase()
                .contains(&ctx.locality_key()),
            AcceptanceFilter::CategoryAllowList(allowed) => place
                .categories
                .iter()
                .any(|c| allowed.contains(&c.to_lowercase())),
            AcceptanceFilter::CategoryDenyList(denied) => !place
                .categories
                .iter()
                .any(|c| denied.contains(&c.to_lowercase())),
            AcceptanceFilter::MinReviews(min) => place.reviews() >= *min,
            AcceptanceFilter::NameSimilarity(min_len) => {
                let wanted = name_tokens(candidate, *min_len);
                name_tokens(&place.name, *min_len)
                    .iter()
                    .any(|token| wanted.contains(token))
            }
        };

        if passed {
            Ok(())
        } else {
            Err(self.reject_reason())
        }
    }

    pub fn reject_reason(&self) -> RejectReason {
        match self {
            AcceptanceFilter::Blacklist(_) => RejectReason::NonVenueLabel,
            AcceptanceFilter::LocalityContainment => RejectReason::WrongLocality,
            AcceptanceFilter::CategoryAllowList(_) => RejectReason::CategoryNotAllowed,
            AcceptanceFilter::CategoryDenyList(_) => RejectReason::CategoryDenied,
            AcceptanceFilter::MinReviews(_) => RejectReason::InsufficientReviews,
            AcceptanceFilter::NameSimilarity(_) => RejectReason::NameMismatch,
        }
    }
}

/// Lower-cased word tokens with at least `min_len` characters.
fn name_tokens(name: &str, min_len: usize) -> HashSet<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= min_len)
        .map(|token| token.to_lowercase())
        .collect()
}

#[derive(Debug, Clone)]
pub struct FilterChain {
    filters: Vec<AcceptanceFilter>,
    map_search_base_url: String,
}

impl FilterChain {
    pub fn new(filters: Vec<AcceptanceFilter>, map_search_base_url: impl Into<String>) -> Self {
        Self {
            filters,
            map_search_base_url: map_search_base_url.into(),
        }
    }

    pub fn from_config(config: &FilterConfig, map_search_base_url: impl Into<String>) -> Self {
        let mut filters = vec![AcceptanceFilter::Blacklist(config.stoplist.clone())];

        if config.check_locality {
            filters.push(AcceptanceFilter::LocalityContainment);
        }
        if let Some(allowed) = &config.allowed_categories {
            filters.push(AcceptanceFilter::CategoryAllowList(allowed.clone()));
        }
        if !config.denied_categories.is_empty() {
            filters.push(AcceptanceFilter::CategoryDenyList(
                config.denied_categories.clone(),
            ));
        }
        if let Some(min) = config.min_reviews {
            filters.push(AcceptanceFilter::MinReviews(min));
        }
        if let Some(min_len) = config.name_token_len {
            filters.push(AcceptanceFilter::NameSimilarity(min_len));
        }

        Self::new(filters, map_search_base_url)
    }

    pub fn filters(&self) -> &[AcceptanceFilter] {
        &self.filters
    }

    pub fn evaluate(
        &self,
        candidate: &str,
        ctx: &TripContext,
        place: Option<&PlaceRecord>,
    ) -> Decision {
        let Some(place) = place else {
            return Decision::rejected(RejectReason::Unresolved);
        };

        if let Some(reason) = self
            .filters
            .iter()
            .find_map(|filter| filter.check(candidate, ctx, place).err())
        {
            debug!("Rejected '{}' ({}): {}", candidate, place.name, reason);
            return Decision::rejected(reason);
        }

        match map_link(&self.map_search_base_url, &place.name, &place.place_id) {
            Ok(url) => Decision::Accepted {
                canonical_name: place.name.clone(),
                map_url: url.to_string(),
            },
            Err(e) => {
                // only reachable with a malformed MAP_SEARCH_BASE_URL
                warn!("Could not build map link for '{}': {}", place.name, e);
                Decision::rejected(RejectReason::Unresolved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAP_SEARCH_BASE_URL;

    fn place(name: &str, address: &str) -> PlaceRecord {
        PlaceRecord {
            name: name.to_string(),
            formatted_address: address.to_string(),
            place_id: "ChIJ-test".to_string(),
            categories: vec!["tourist_attraction".to_string()],
            review_count: Some(500),
            rating: Some(4.5),
            open_now: None,
        }
    }

    fn chain(config: FilterConfig) -> FilterChain {
        FilterChain::from_config(&config, DEFAULT_MAP_SEARCH_BASE_URL)
    }

    fn reason(decision: Decision) -> RejectReason {
        decision.reject_reason().expect("expected a rejection")
    }

    #[test]
    fn test_unresolved_rejects_first() {
        let ctx = TripContext::new("Piracicaba, SP");
        let decision = chain(FilterConfig::default()).evaluate("Tip", &ctx, None);
        assert_eq!(reason(decision), RejectReason::Unresolved);
    }

    #[test]
    fn test_blacklisted_label_rejected() {
        let ctx = TripContext::new("Piracicaba, SP");
        let record = place("Tip Top Lanches", "Rua X, Piracicaba, SP");
        let decision = chain(FilterConfig::default()).evaluate(" TIP ", &ctx, Some(&record));
        assert_eq!(reason(decision), RejectReason::NonVenueLabel);
    }

    #[test]
    fn test_locality_mismatch_rejected_regardless_of_reviews_and_category() {
        let ctx = TripContext::new("Piracicaba, SP");
        let mut record = place("Parque Ecológico", "Rua X, Campinas, SP");
        record.review_count = Some(0);
        record.categories = vec!["local_government_office".to_string()];

        let config = FilterConfig {
            min_reviews: Some(100),
            allowed_categories: Some(["park".to_string()].into_iter().collect()),
            ..FilterConfig::default()
        };

        let decision = chain(config).evaluate("Parque Ecológico", &ctx, Some(&record));
        assert_eq!(reason(decision), RejectReason::WrongLocality);
    }

    #[test]
    fn test_locality_match_is_case_insensitive() {
        let ctx = TripContext::new("piracicaba, sp");
        let record = place("Engenho Central", "Av. Maurice Allain, 454 - PIRACICABA - SP");
        let decision = chain(FilterConfig::default()).evaluate("Engenho Central", &ctx, Some(&record));
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_category_allow_list() {
        let ctx = TripContext::new("Santos, SP");
        let record = place("Museu do Café", "Rua XV, Santos - SP");
        let config = FilterConfig {
            allowed_categories: Some(["museum".to_string()].into_iter().collect()),
            ..FilterConfig::default()
        };

        let decision = chain(config).evaluate("Museu do Café", &ctx, Some(&record));
        assert_eq!(reason(decision), RejectReason::CategoryNotAllowed);
    }

    #[test]
    fn test_category_deny_list() {
        let ctx = TripContext::new("Santos, SP");
        let mut record = place("Prefeitura Municipal de Santos", "Praça Mauá, Santos - SP");
        record.categories = vec!["local_government_office".to_string()];

        let decision =
            chain(FilterConfig::default()).evaluate("Prefeitura de Santos", &ctx, Some(&record));
        assert_eq!(reason(decision), RejectReason::CategoryDenied);
    }

    #[test]
    fn test_review_floor_treats_missing_as_zero() {
        let ctx = TripContext::new("Santos, SP");
        let mut record = place("Bar do Torto", "Rua Y, Santos - SP");
        record.review_count = None;
        let config = FilterConfig {
            min_reviews: Some(1),
            ..FilterConfig::default()
        };

        let decision = chain(config.clone()).evaluate("Bar do Torto", &ctx, Some(&record));
        assert_eq!(reason(decision), RejectReason::InsufficientReviews);

        record.review_count = Some(1);
        let decision = chain(config).evaluate("Bar do Torto", &ctx, Some(&record));
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_locality_reported_before_review_floor() {
        let ctx = TripContext::new("Santos, SP");
        let mut record = place("Bar do Torto", "Rua Y, Guarujá - SP");
        record.review_count = Some(3);
        let config = FilterConfig {
            min_reviews: Some(100),
            ..FilterConfig::default()
        };

        let decision = chain(config).evaluate("Bar do Torto", &ctx, Some(&record));
        assert_eq!(reason(decision), RejectReason::WrongLocality);
    }

    #[test]
    fn test_name_mismatch_rejected() {
        let ctx = TripContext::new("Piracicaba, SP");
        let record = place("Catedral de Santo Antônio", "Rua Y, Piracicaba - SP");
        let decision =
            chain(FilterConfig::default()).evaluate("Cervejaria Leuven", &ctx, Some(&record));
        assert_eq!(reason(decision), RejectReason::NameMismatch);
    }

    #[test]
    fn test_short_tokens_do_not_count_as_overlap() {
        let ctx = TripContext::new("Piracicaba, SP");
        let record = place("Bar do Zé", "Rua Y, Piracicaba - SP");
        let decision = chain(FilterConfig::default()).evaluate("Bar da Rua", &ctx, Some(&record));
        assert_eq!(reason(decision), RejectReason::NameMismatch);
    }

    #[test]
    fn test_name_similarity_can_be_disabled() {
        let ctx = TripContext::new("Piracicaba, SP");
        let record = place("Bar do Zé", "Rua Y, Piracicaba - SP");
        let config = FilterConfig {
            name_token_len: None,
            ..FilterConfig::default()
        };
        assert!(chain(config).evaluate("Bar da Rua", &ctx, Some(&record)).is_accepted());
    }

    #[test]
    fn test_accepted_carries_canonical_name_and_link() {
        let ctx = TripContext::new("Piracicaba, SP");
        let record = place("Engenho Central de Piracicaba", "Av. Maurice Allain, Piracicaba - SP");

        let decision = chain(FilterConfig::default()).evaluate("Engenho Central", &ctx, Some(&record));
        assert_eq!(
            decision,
            Decision::Accepted {
                canonical_name: "Engenho Central de Piracicaba".to_string(),
                map_url: "https://www.google.com/maps/search/?api=1&query=Engenho+Central+de+Piracicaba&query_place_id=ChIJ-test".to_string(),
            }
        );
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let ctx = TripContext::new("Piracicaba, SP");
        let record = place("Engenho Central", "Piracicaba - SP");
        let chain = chain(FilterConfig::default());

        let first = chain.evaluate("Engenho Central", &ctx, Some(&record));
        for _ in 0..10 {
            assert_eq!(chain.evaluate("Engenho Central", &ctx, Some(&record)), first);
        }
    }

    #[test]
    fn test_from_config_keeps_fixed_order() {
        let config = FilterConfig {
            allowed_categories: Some(HashSet::new()),
            min_reviews: Some(10),
            ..FilterConfig::default()
        };
        let reasons: Vec<RejectReason> = chain(config)
            .filters()
            .iter()
            .map(AcceptanceFilter::reject_reason)
            .collect();

        assert_eq!(
            reasons,
            vec![
                RejectReason::NonVenueLabel,
                RejectReason::WrongLocality,
                RejectReason::CategoryNotAllowed,
                RejectReason::CategoryDenied,
                RejectReason::InsufficientReviews,
                RejectReason::NameMismatch,
            ]
        );
    }
}
