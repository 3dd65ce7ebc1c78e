use actix_web::{web, HttpResponse, Responder};
use log::{error, warn};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::trip::TripContext,
    services::{
        itinerary_generation_service::GenerationError,
        itinerary_store::{with_timeout, StoreError},
    },
    state::AppState,
};

/*
    /api/itineraries/generate
*/
pub async fn generate(data: web::Data<AppState>, input: web::Json<TripContext>) -> impl Responder {
    let ctx = input.into_inner();

    match data.generator.generate_itinerary(&ctx).await {
        Ok(itinerary) => HttpResponse::Ok().json(itinerary),
        Err(GenerationError::MissingLocality) => {
            HttpResponse::BadRequest().json(json!({ "error": "A destination is required" }))
        }
        Err(err @ GenerationError::NoVerifiedVenues) => {
            warn!("Itinerary for '{}' had no verifiable venues", ctx.locality);
            HttpResponse::UnprocessableEntity().json(json!({ "error": err.to_string() }))
        }
        Err(err) => {
            error!("Itinerary generation failed for '{}': {}", ctx.locality, err);
            HttpResponse::BadGateway().json(json!({
                "error": "We could not put together an itinerary right now. Please try again.",
            }))
        }
    }
}

/*
    /api/itineraries/{id}
*/
pub async fn get_by_id(path: web::Path<String>, data: web::Data<AppState>) -> impl Responder {
    fetch(&data, &path.into_inner()).await
}

#[derive(Deserialize)]
pub struct SharedQuery {
    itinerary_id: String,
}

/*
    /api/itineraries/shared?itinerary_id={id}
*/
pub async fn get_shared(query: web::Query<SharedQuery>, data: web::Data<AppState>) -> impl Responder {
    fetch(&data, &query.itinerary_id).await
}

async fn fetch(data: &AppState, id: &str) -> HttpResponse {
    match with_timeout(data.store_timeout, data.store.retrieve(id)).await {
        Ok(Some(itinerary)) => HttpResponse::Ok().json(itinerary),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": "Itinerary not found" })),
        Err(StoreError::InvalidId(_)) => {
            HttpResponse::BadRequest().json(json!({ "error": "Invalid ID" }))
        }
        Err(err) => {
            error!("Failed to retrieve itinerary {}: {}", id, err);
            HttpResponse::InternalServerError()
                .json(json!({ "error": "Failed to retrieve itinerary" }))
        }
    }
}
