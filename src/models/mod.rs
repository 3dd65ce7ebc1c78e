pub mod decision;
pub mod itinerary;
pub mod place;
pub mod trip;
