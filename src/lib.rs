//! Aventra - AI-assisted multi-day travel itinerary generation
//!
//! Given a trip request, the engine asks a generative model for each slice of
//! the trip (geography, transport, activities, lodging and dining, weather),
//! enriches the results from open data sources, lays the venues out over the
//! days and returns one normalized itinerary document.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod generators;
pub mod http;
pub mod models;
pub mod normalize;
pub mod planning;
pub mod providers;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::AventraConfig;
pub use coordinator::ItineraryCoordinator;
pub use error::TravelAiError;
pub use models::{ItineraryDocument, TripRequest};
pub use providers::Providers;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelAiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
