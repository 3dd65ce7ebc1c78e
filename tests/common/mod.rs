#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{web, App};
use async_trait::async_trait;
use chrono::Utc;

use nomadai_api::{
    config::GenerationConfig,
    models::{itinerary::Itinerary, place::PlaceRecord},
    routes,
    services::{
        itinerary_generation_service::ItineraryGenerator,
        itinerary_store::{ItineraryStore, StoreError},
        places_service::{PlaceLookup, PlacesError},
        text_generation_service::{TextGenerationError, TextGenerator},
    },
    state::{AppState, CollaboratorKeys},
};

/// Returns canned text, or fails when built with `failing()`.
pub struct ScriptedGenerator {
    text: Option<String>,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn new(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            text: None,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        system_instructions: &str,
        user_context: &str,
    ) -> Result<String, TextGenerationError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_instructions.to_string(), user_context.to_string()));
        self.text.clone().ok_or(TextGenerationError::Api {
            status: 503,
            body: "model overloaded".to_string(),
        })
    }
}

/// Serves places keyed by the candidate part of the query and counts calls.
#[derive(Default)]
pub struct FakePlaces {
    places: HashMap<String, PlaceRecord>,
    failing: Vec<String>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, candidate: &str, place: PlaceRecord) -> Self {
        self.places.insert(candidate.to_string(), place);
        self
    }

    pub fn with_failure(mut self, candidate: &str) -> Self {
        self.failing.push(candidate.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, candidate: &str) -> usize {
        self.calls()
            .iter()
            .filter(|q| q.split(", ").next() == Some(candidate))
            .count()
    }
}

#[async_trait]
impl PlaceLookup for FakePlaces {
    async fn find(
        &self,
        query_text: &str,
        _language: &str,
    ) -> Result<Option<PlaceRecord>, PlacesError> {
        self.calls.lock().unwrap().push(query_text.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let candidate = query_text.split(", ").next().unwrap_or_default();
        if self.failing.iter().any(|f| f == candidate) {
            return Err(PlacesError::Api {
                status: "UNKNOWN_ERROR".to_string(),
            });
        }
        Ok(self.places.get(candidate).cloned())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, Itinerary>>,
    next_id: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn insert(&self, id: &str, locality: &str, content: &str) {
        self.items.lock().unwrap().insert(
            id.to_string(),
            Itinerary {
                id: id.to_string(),
                locality: locality.to_string(),
                content: content.to_string(),
                created_at: Utc::now(),
            },
        );
    }
}

#[async_trait]
impl ItineraryStore for MemoryStore {
    async fn store(&self, locality: &str, content: &str) -> Result<String, StoreError> {
        let id = format!("itn{:04}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.insert(&id, locality, content);
        Ok(id)
    }

    async fn retrieve(&self, id: &str) -> Result<Option<Itinerary>, StoreError> {
        if !id.starts_with("itn") {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.items.lock().unwrap().get(id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

pub struct FailingStore;

#[async_trait]
impl ItineraryStore for FailingStore {
    async fn store(&self, _: &str, _: &str) -> Result<String, StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(1)))
    }

    async fn retrieve(&self, _: &str) -> Result<Option<Itinerary>, StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(1)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(1)))
    }
}

/// Never answers in time.
pub struct SlowStore;

#[async_trait]
impl ItineraryStore for SlowStore {
    async fn store(&self, _: &str, _: &str) -> Result<String, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok("itn0000".to_string())
    }

    async fn retrieve(&self, _: &str) -> Result<Option<Itinerary>, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
}

pub fn place(name: &str, address: &str, place_id: &str) -> PlaceRecord {
    PlaceRecord {
        name: name.to_string(),
        formatted_address: address.to_string(),
        place_id: place_id.to_string(),
        categories: vec!["tourist_attraction".to_string(), "point_of_interest".to_string()],
        review_count: Some(1200),
        rating: Some(4.6),
        open_now: Some(true),
    }
}

pub fn test_config() -> GenerationConfig {
    GenerationConfig {
        share_base_url: "https://nomadai.example/view".to_string(),
        ..GenerationConfig::default()
    }
}

/// Store calls give up after 50ms.
pub fn impatient_config() -> GenerationConfig {
    GenerationConfig {
        store_timeout: Duration::from_millis(50),
        ..test_config()
    }
}

pub fn generator(
    text: Arc<dyn TextGenerator>,
    places: Arc<dyn PlaceLookup>,
    store: Arc<dyn ItineraryStore>,
) -> ItineraryGenerator {
    ItineraryGenerator::with_config(text, places, store, test_config())
}

pub struct TestApp {
    pub state: web::Data<AppState>,
}

impl TestApp {
    pub fn new(generator: ItineraryGenerator) -> Self {
        let keys = CollaboratorKeys {
            text_generation: Some("sk-test-0123456789".to_string()),
            places: Some("AIza-test-0123456789".to_string()),
        };
        Self {
            state: web::Data::new(AppState::new(generator, keys)),
        }
    }

    pub fn with_keys(generator: ItineraryGenerator, keys: CollaboratorKeys) -> Self {
        Self {
            state: web::Data::new(AppState::new(generator, keys)),
        }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(self.state.clone())
            .service(web::resource("/health").route(web::get().to(routes::health::health_check)))
            .service(
                web::scope("/api/itineraries")
                    .route("/generate", web::post().to(routes::itinerary::generate))
                    .route("/shared", web::get().to(routes::itinerary::get_shared))
                    .route("/{id}", web::get().to(routes::itinerary::get_by_id)),
            )
    }
}
