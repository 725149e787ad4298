//! Static event data: venue polygon, markers and page text.
//!
//! The event document is loaded once at startup and never mutated. Malformed
//! records are dropped individually and reported through `EventData::issues`.

mod load;
mod schema;

pub use load::*;
pub use schema::*;
