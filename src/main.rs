use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use nomadai_api::{
    config::AppConfig,
    db, routes,
    services::{
        itinerary_generation_service::ItineraryGenerator,
        itinerary_store::MongoItineraryStore, places_service::GooglePlacesService,
        text_generation_service::OpenAiTextGenerator,
    },
    state::{AppState, CollaboratorKeys},
};

fn startup_error(e: impl std::fmt::Display) -> std::io::Error {
    error!("{}", e);
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    info!("Application starting...");

    let config = AppConfig::from_env().map_err(startup_error)?;

    let client = db::mongo::create_mongo_client(&config.mongo_uri)
        .await
        .map_err(startup_error)?;
    let store = Arc::new(MongoItineraryStore::new(client));
    let text_generator =
        Arc::new(OpenAiTextGenerator::new(config.openai.clone()).map_err(startup_error)?);
    let places = Arc::new(GooglePlacesService::new(config.places_api_key.clone()).map_err(startup_error)?);

    let generator =
        ItineraryGenerator::with_config(text_generator, places, store, config.generation.clone());
    let state = web::Data::new(AppState::new(
        generator,
        CollaboratorKeys {
            text_generation: Some(config.openai.api_key.clone()),
            places: Some(config.places_api_key.clone()),
        },
    ));

    info!("Starting HTTP server on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(web::resource("/health").route(web::get().to(routes::health::health_check)))
            .service(
                web::scope("/api").service(
                    web::scope("/itineraries")
                        .route("/generate", web::post().to(routes::itinerary::generate))
                        .route("/shared", web::get().to(routes::itinerary::get_shared))
                        .route("/{id}", web::get().to(routes::itinerary::get_by_id)),
                ),
            )
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await
}
