use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Client, Collection,
};
use thiserror::Error;
use url::Url;

use crate::db::mongo::DATABASE;
use crate::models::itinerary::{Itinerary, ItineraryDocument};

const COLLECTION: &str = "Generated";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid itinerary id: {0}")]
    InvalidId(String),
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Write-once storage for finished itineraries. There is no update or
/// delete: an itinerary is immutable once it has an identifier.
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    async fn store(&self, locality: &str, content: &str) -> Result<String, StoreError>;
    async fn retrieve(&self, id: &str) -> Result<Option<Itinerary>, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}

pub struct MongoItineraryStore {
    client: Arc<Client>,
}

impl MongoItineraryStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> Collection<ItineraryDocument> {
        self.client.database(DATABASE).collection(COLLECTION)
    }
}

#[async_trait]
impl ItineraryStore for MongoItineraryStore {
    async fn store(&self, locality: &str, content: &str) -> Result<String, StoreError> {
        let id = ObjectId::new();
        let document = ItineraryDocument {
            id: Some(id),
            locality: locality.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };

        self.collection().insert_one(&document).await?;
        Ok(id.to_hex())
    }

    async fn retrieve(&self, id: &str) -> Result<Option<Itinerary>, StoreError> {
        let id = ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))?;

        let document = self.collection().find_one(doc! { "_id": id }).await?;
        Ok(document.map(Itinerary::from))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(DATABASE)
            .run_command(doc! {"ping": 1})
            .await?;
        Ok(())
    }
}

/// Bounds a store call; an elapsed timer becomes `StoreError::Timeout`.
pub async fn with_timeout<T>(
    timeout: Duration,
    operation: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(timeout)),
    }
}

/// `<base_url>?itinerary_id=<id>`
pub fn share_link(base_url: &str, itinerary_id: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(base_url, &[("itinerary_id", itinerary_id)])
}

/// Prefilled WhatsApp message pointing at the share link.
pub fn whatsapp_link(locality: &str, share_url: &str) -> Result<Url, url::ParseError> {
    let text = format!(
        "Check out the itinerary I made for {}: {}",
        locality.trim(),
        share_url
    );
    Url::parse_with_params("https://api.whatsapp.com/send", &[("text", text.as_str())])
}
