use serde::{Deserialize, Serialize};

/// Best-ranked match returned by the places lookup for one candidate venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    pub formatted_address: String,
    pub place_id: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub open_now: Option<bool>,
}

impl PlaceRecord {
    /// Missing review data counts as zero reviews.
    pub fn reviews(&self) -> u32 {
        self.review_count.unwrap_or(0)
    }
}
