//! Places lookup against the Google Places Text Search API.
//!
//! The model names venues informally, so every lookup is qualified with the
//! destination and only the top-ranked hit is kept. One lookup per distinct
//! candidate, never per occurrence.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::models::place::PlaceRecord;

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
const HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Places API error: {status}")]
    Api { status: String },
    #[error("Places lookup timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait PlaceLookup: Send + Sync {
    /// Best match for `query_text`, or `None` when the service has nothing.
    async fn find(&self, query_text: &str, language: &str)
        -> Result<Option<PlaceRecord>, PlacesError>;
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<TextSearchResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TextSearchResult {
    name: String,
    #[serde(default)]
    formatted_address: String,
    place_id: String,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    user_ratings_total: Option<u32>,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Deserialize)]
struct OpeningHours {
    #[serde(default)]
    open_now: Option<bool>,
}

impl From<TextSearchResult> for PlaceRecord {
    fn from(result: TextSearchResult) -> Self {
        Self {
            name: result.name,
            formatted_address: result.formatted_address,
            place_id: result.place_id,
            categories: result.types,
            review_count: result.user_ratings_total,
            rating: result.rating,
            open_now: result.opening_hours.and_then(|h| h.open_now),
        }
    }
}

impl TextSearchResponse {
    fn into_best_match(self) -> Result<Option<PlaceRecord>, PlacesError> {
        match self.status.as_str() {
            "OK" => Ok(self.results.into_iter().next().map(PlaceRecord::from)),
            "ZERO_RESULTS" => Ok(None),
            _ => Err(PlacesError::Api {
                status: match self.error_message {
                    Some(message) => format!("{} ({})", self.status, message),
                    None => self.status,
                },
            }),
        }
    }
}

#[derive(Clone)]
pub struct GooglePlacesService {
    http_client: reqwest::Client,
    api_key: String,
}

impl GooglePlacesService {
    pub fn new(api_key: impl Into<String>) -> Result<Self, PlacesError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesService {
    async fn find(
        &self,
        query_text: &str,
        language: &str,
    ) -> Result<Option<PlaceRecord>, PlacesError> {
        debug!("Places text search: '{}'", query_text);

        let response: TextSearchResponse = self
            .http_client
            .get(TEXT_SEARCH_URL)
            .query(&[
                ("query", query_text),
                ("language", language),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_best_match()
    }
}

/// Name plus destination, which is what makes the lookup precise enough.
pub fn build_query(candidate: &str, locality: &str) -> String {
    format!("{}, {}", candidate.trim(), locality.trim())
}

/// Runs the single lookup for a candidate. Any failure, timeout included,
/// comes back as `None` after being logged.
pub async fn resolve(
    lookup: &dyn PlaceLookup,
    candidate: &str,
    locality: &str,
    language: &str,
    timeout: Duration,
) -> Option<PlaceRecord> {
    let query = build_query(candidate, locality);

    let outcome = match tokio::time::timeout(timeout, lookup.find(&query, language)).await {
        Ok(result) => result,
        Err(_) => Err(PlacesError::Timeout(timeout)),
    };

    match outcome {
        Ok(Some(place)) => {
            debug!("Resolved '{}' to '{}' ({})", candidate, place.name, place.place_id);
            Some(place)
        }
        Ok(None) => {
            debug!("No place found for '{}'", candidate);
            None
        }
        Err(e) => {
            warn!("Place lookup for '{}' failed: {}", candidate, e);
            None
        }
    }
}

/// Map deep link that opens directly on the verified place.
pub fn map_link(base_url: &str, canonical_name: &str, place_id: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        base_url,
        &[
            ("api", "1"),
            ("query", canonical_name),
            ("query_place_id", place_id),
        ],
    )
}
