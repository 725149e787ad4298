//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the loaded markers, the
//! cursor, the latest location snapshot and the playback coordinator.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
