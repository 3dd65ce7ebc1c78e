use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::decision::VenueDecision;

/// Stored itinerary as it lives in the `Itineraries.Generated` collection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItineraryDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub locality: String,
    pub content: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Itinerary as handed out for shared viewing.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Itinerary {
    pub id: String,
    pub locality: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ItineraryDocument> for Itinerary {
    fn from(doc: ItineraryDocument) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            locality: doc.locality,
            content: doc.content,
            created_at: doc.created_at,
        }
    }
}

/// Response for a generation request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratedItinerary {
    pub locality: String,
    pub content: String,
    pub decisions: Vec<VenueDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub itinerary_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_share_url: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}
