//! Configuration loader and schema types.
//!
//! Settings drive the proximity threshold, the location provider, the venue
//! gate, audio and logging. Everything has a default, so a missing config
//! file is never an error.

mod load;
mod schema;

pub use schema::*;
