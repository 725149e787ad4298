//! Which track is playing and which marker's details are shown.
//!
//! The coordinator is the single owner of the active track. It is driven by
//! two independent inputs: location changes (through the proximity reducer)
//! and explicit taps from the UI.

mod coordinator;

pub use coordinator::*;

#[cfg(test)]
mod tests;
