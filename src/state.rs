use std::sync::Arc;
use std::time::Duration;

use crate::services::{
    itinerary_generation_service::ItineraryGenerator, itinerary_store::ItineraryStore,
};

/// Shared across workers via `web::Data`.
pub struct AppState {
    pub generator: ItineraryGenerator,
    pub store: Arc<dyn ItineraryStore>,
    /// Applied to reads and health pings on `store`.
    pub store_timeout: Duration,
    pub collaborators: CollaboratorKeys,
}

/// Which external API keys were configured, for the health report.
#[derive(Debug, Clone, Default)]
pub struct CollaboratorKeys {
    pub text_generation: Option<String>,
    pub places: Option<String>,
}

impl AppState {
    pub fn new(generator: ItineraryGenerator, collaborators: CollaboratorKeys) -> Self {
        let store = generator.store().clone();
        let store_timeout = generator.config().store_timeout;
        Self {
            generator,
            store,
            store_timeout,
            collaborators,
        }
    }
}
