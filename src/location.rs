//! Where the user is.
//!
//! `LocationSource` reconciles a live, cancellable stream of fixes with a
//! manually set mock location. Providers push `LocationMessage`s into a
//! channel from their own threads; the source drains that channel on the UI
//! thread in `poll_with`, so `current` is only ever mutated in one place.

mod feed;
mod provider;
mod source;
mod types;

pub use feed::*;
pub use provider::*;
pub use source::*;
pub use types::*;
