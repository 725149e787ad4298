//! Audio output for the active marker.
//!
//! A dedicated thread owns the `rodio` output stream and plays at most one
//! sink at a time. The UI thread talks to it through `AudioPlayer` and reads
//! progress back through a shared `PlaybackHandle`.

mod player;
mod sink;
mod thread;
mod types;

pub use player::*;
pub use types::*;

#[cfg(test)]
mod tests;
