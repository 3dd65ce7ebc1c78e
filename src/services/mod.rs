pub mod acceptance_filter;
pub mod itinerary_generation_service;
pub mod itinerary_rewriter;
pub mod itinerary_store;
pub mod places_service;
pub mod text_generation_service;
pub mod venue_extractor;
