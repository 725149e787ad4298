//! Geodesic helpers and the coordinate value types.
//!
//! Everything in here is pure: no state, no I/O. Distances are great-circle
//! (haversine) distances in meters; polygon containment works on the
//! `(lng, lat)` plane, which is accurate enough at venue scale (~1 km).

mod coord;
mod math;
mod polygon;

pub use coord::*;
pub use math::*;
pub use polygon::*;

#[cfg(test)]
mod tests;
