//! Data models for the itinerary engine
//!
//! - Request: the trip description supplied by callers
//! - Itinerary: the response document and its building blocks
//! - Components: typed generator results and their fallbacks
//! - Venue: restaurants and activities allocated to days
//! - Location: coordinates and map links

pub mod components;
pub mod itinerary;
pub mod lenient;
pub mod location;
pub mod request;
pub mod venue;

pub use components::{
    AccommodationsAndDining, ActivityCatalog, Component, DailyWeather, MetaInfo, TransportOptions,
    TripName, WeatherReport,
};
pub use itinerary::{
    Accommodation, Activity, BlockType, BudgetBreakdown, BudgetShares, Cost, DayItinerary,
    DayWeather, Dining, EssentialInfo, ItineraryDocument, JourneyPath, Links, Metadata,
    Recommendations, TimeBlock, TotalBudget, TravelOption, TripPreferences, Warning,
};
pub use location::{Coordinates, GeoLocation};
pub use request::TripRequest;
pub use venue::{VenueKind, VenueRecord};
