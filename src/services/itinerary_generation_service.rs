//! Itinerary generation pipeline.
//!
//! One request runs start to finish: generate text, extract candidate venues,
//! resolve each distinct candidate once, filter, rewrite, then persist. Only a
//! text-generation failure (or a rewrite that leaves nothing) fails the
//! request; lookup and persistence problems degrade the result instead.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Local;
use futures::future::join_all;
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::GenerationConfig;
use crate::models::{
    decision::{Decision, VenueDecision},
    itinerary::GeneratedItinerary,
    trip::TripContext,
};
use crate::services::{
    acceptance_filter::FilterChain,
    itinerary_rewriter::rewrite_candidates,
    itinerary_store::{share_link, whatsapp_link, with_timeout, ItineraryStore, StoreError},
    places_service::{resolve, PlaceLookup},
    text_generation_service::{
        build_user_context, TextGenerationError, TextGenerator, SYSTEM_INSTRUCTIONS,
    },
    venue_extractor::VenueExtractor,
};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("A destination is required")]
    MissingLocality,
    #[error("Could not generate an itinerary: {0}")]
    TextGeneration(#[from] TextGenerationError),
    #[error("None of the suggested venues could be verified")]
    NoVerifiedVenues,
}

/// Validated text plus the decision made for every distinct candidate.
#[derive(Debug, Clone)]
pub struct ValidatedItinerary {
    pub content: String,
    pub decisions: Vec<VenueDecision>,
}

pub struct ItineraryGenerator {
    text_generator: Arc<dyn TextGenerator>,
    places: Arc<dyn PlaceLookup>,
    store: Arc<dyn ItineraryStore>,
    extractor: VenueExtractor,
    filter_chain: FilterChain,
    config: GenerationConfig,
}

impl ItineraryGenerator {
    pub fn new(
        text_generator: Arc<dyn TextGenerator>,
        places: Arc<dyn PlaceLookup>,
        store: Arc<dyn ItineraryStore>,
    ) -> Self {
        Self::with_config(text_generator, places, store, GenerationConfig::default())
    }

    pub fn with_config(
        text_generator: Arc<dyn TextGenerator>,
        places: Arc<dyn PlaceLookup>,
        store: Arc<dyn ItineraryStore>,
        config: GenerationConfig,
    ) -> Self {
        let extractor = if config.strip_labels_on_extract {
            VenueExtractor::with_stoplist(config.filters.stoplist.clone())
        } else {
            VenueExtractor::new()
        };
        let filter_chain = FilterChain::from_config(&config.filters, &config.map_search_base_url);

        Self {
            text_generator,
            places,
            store,
            extractor,
            filter_chain,
            config,
        }
    }

    /// Generate, validate and persist an itinerary for the trip.
    pub async fn generate_itinerary(
        &self,
        ctx: &TripContext,
    ) -> Result<GeneratedItinerary, GenerationError> {
        if !ctx.has_locality() {
            return Err(GenerationError::MissingLocality);
        }

        let user_context = build_user_context(ctx, Local::now().naive_local());
        let raw_text = match tokio::time::timeout(
            self.config.generation_timeout,
            self.text_generator.generate(SYSTEM_INSTRUCTIONS, &user_context),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(TextGenerationError::Timeout(self.config.generation_timeout).into())
            }
        };

        let validated = self.validate(&raw_text, ctx).await;
        if validated.content.trim().is_empty() {
            warn!(
                "Every line of the itinerary for '{}' was removed during validation",
                ctx.locality
            );
            return Err(GenerationError::NoVerifiedVenues);
        }

        let mut result = GeneratedItinerary {
            locality: ctx.locality.trim().to_string(),
            content: validated.content,
            decisions: validated.decisions,
            itinerary_id: None,
            share_url: None,
            whatsapp_share_url: None,
            warnings: Vec::new(),
        };

        match self.persist(&result.locality, &result.content).await {
            Ok(id) => match share_link(&self.config.share_base_url, &id) {
                Ok(url) => {
                    result.whatsapp_share_url = whatsapp_link(&result.locality, url.as_str())
                        .ok()
                        .map(String::from);
                    result.share_url = Some(url.to_string());
                    result.itinerary_id = Some(id);
                }
                Err(e) => {
                    warn!("Could not build share link: {}", e);
                    result.itinerary_id = Some(id);
                    result.warnings.push("Share link unavailable".to_string());
                }
            },
            Err(e) => {
                warn!("Failed to persist itinerary for '{}': {}", result.locality, e);
                result
                    .warnings
                    .push("Itinerary could not be saved; sharing is unavailable".to_string());
            }
        }

        info!(
            "Generated itinerary for '{}': {} of {} venues verified",
            result.locality,
            result.decisions.iter().filter(|d| d.decision.is_accepted()).count(),
            result.decisions.len()
        );

        Ok(result)
    }

    /// Cross-check every emphasised venue in `raw_text` and rewrite it.
    pub async fn validate(&self, raw_text: &str, ctx: &TripContext) -> ValidatedItinerary {
        let candidates = self.extractor.extract(raw_text);
        debug!("Resolving {} candidates in '{}'", candidates.len(), ctx.locality);
        // join_all keeps input order, so results line up with first appearance
        let places = join_all(candidates.iter().map(|candidate| {
            resolve(
                self.places.as_ref(),
                &candidate.name,
                &ctx.locality,
                &self.config.places_language,
                self.config.places_timeout,
            )
        }))
        .await;

        let decisions: Vec<VenueDecision> = candidates
            .iter()
            .zip(places.iter())
            .map(|(candidate, place)| {
                let decision = self
                    .filter_chain
                    .evaluate(&candidate.name, ctx, place.as_ref());
                debug!("'{}' -> {:?}", candidate.name, decision);
                VenueDecision {
                    name: candidate.name.clone(),
                    decision,
                }
            })
            .collect();

        let by_name: HashMap<String, Decision> = decisions
            .iter()
            .map(|d| (d.name.clone(), d.decision.clone()))
            .collect();
        let content = rewrite_candidates(raw_text, &candidates, &by_name);
        debug!("Rewrote itinerary for '{}'", ctx.locality);

        ValidatedItinerary { content, decisions }
    }

    async fn persist(&self, locality: &str, content: &str) -> Result<String, StoreError> {
        with_timeout(self.config.store_timeout, self.store.store(locality, content)).await
    }

    pub fn store(&self) -> &Arc<dyn ItineraryStore> {
        &self.store
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }
}
