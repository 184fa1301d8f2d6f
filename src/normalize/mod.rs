//! Normalization of provider output and of the assembled document

pub mod response;
pub mod schema;

pub use response::{parse_as, parse_structured};
pub use schema::{NormalizeContext, normalize};
