//! Turning generated components into scheduled days

pub mod allocator;
pub mod day;
pub mod transit;

pub use allocator::{DayVenues, allocate};
pub use day::DayAssembler;
pub use transit::transit_block;
