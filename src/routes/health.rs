use actix_web::{web, HttpResponse, Responder};
use log::warn;
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::{services::itinerary_store::with_timeout, state::AppState};

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

impl ServiceStatus {
    fn ok(details: String) -> Self {
        Self {
            status: "ok".to_string(),
            details: Some(details),
        }
    }

    fn error(details: String) -> Self {
        Self {
            status: "error".to_string(),
            details: Some(details),
        }
    }
}

pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let store = match with_timeout(data.store_timeout, data.store.ping()).await {
        Ok(()) => ServiceStatus::ok("Itinerary store reachable".to_string()),
        Err(e) => {
            warn!("Itinerary store health check failed: {}", e);
            ServiceStatus::error(format!("Failed to reach store: {}", e))
        }
    };
    health.services.insert("store".to_string(), store);

    health.services.insert(
        "text_generation".to_string(),
        check_key("Text generation", data.collaborators.text_generation.as_deref()),
    );
    health.services.insert(
        "places".to_string(),
        check_key("Places", data.collaborators.places.as_deref()),
    );

    // any failing service degrades the whole report
    if health.services.values().any(|s| s.status != "ok") {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

fn check_key(label: &str, key: Option<&str>) -> ServiceStatus {
    match key {
        Some(key) if !key.is_empty() => {
            ServiceStatus::ok(format!("{} API key configured ({})", label, mask(key)))
        }
        _ => ServiceStatus::error(format!("{} API key not configured", label)),
    }
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    } else {
        "***".to_string()
    }
}
