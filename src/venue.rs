//! Venue boundary and the one-shot entry gate.
//!
//! Unlike the proximity check, the gate runs once (at startup or on an
//! explicit retry). If no location can be obtained, or the venue polygon is
//! unusable, the gate fails open and lets the visitor in.

use std::fmt;

use thiserror::Error;

use crate::geo::{Coordinate, UserLocation, point_in_polygon, vertex_centroid};
use crate::location::{LocationError, LocationProvider, PositionOptions};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VenueError {
    #[error("venue polygon needs at least 3 points, got {0}")]
    TooFewPoints(usize),
}

/// Closed polygon boundary of the venue. The closing edge is implicit.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueRegion {
    points: Vec<Coordinate>,
}

impl VenueRegion {
    pub fn new(points: Vec<Coordinate>) -> Result<Self, VenueError> {
        if points.len() < 3 {
            return Err(VenueError::TooFewPoints(points.len()));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn center(&self) -> Option<Coordinate> {
        vertex_centroid(&self.points)
    }
}

/// Whether `location` falls inside `region`. Boundary points count as inside.
pub fn is_inside(location: &UserLocation, region: &VenueRegion) -> bool {
    point_in_polygon(location.coordinate, region.points())
}

/// Why the gate let the visitor in without a containment check.
#[derive(Debug, Clone, PartialEq)]
pub enum FailOpenReason {
    Location(LocationError),
    NoVenue,
}

impl fmt::Display for FailOpenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailOpenReason::Location(e) => write!(f, "{e}"),
            FailOpenReason::NoVenue => f.write_str("venue boundary is not configured"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Inside(UserLocation),
    Outside(UserLocation),
    FailOpen(FailOpenReason),
}

impl GateDecision {
    /// True unless the visitor was positively located outside the venue.
    pub fn admits(&self) -> bool {
        !matches!(self, GateDecision::Outside(_))
    }
}

/// Acquire one fix from `provider` and decide whether the visitor may enter.
pub fn check_entry<P: LocationProvider>(
    provider: &P,
    region: Option<&VenueRegion>,
    options: PositionOptions,
) -> GateDecision {
    let Some(region) = region else {
        tracing::warn!("venue gate skipped: no usable venue polygon");
        return GateDecision::FailOpen(FailOpenReason::NoVenue);
    };

    match provider.current_position(options) {
        Ok(location) if is_inside(&location, region) => {
            tracing::info!(location = %location.coordinate, "venue gate: inside");
            GateDecision::Inside(location)
        }
        Ok(location) => {
            tracing::info!(location = %location.coordinate, "venue gate: outside");
            GateDecision::Outside(location)
        }
        Err(e) => {
            tracing::warn!(error = %e, "venue gate: no location fix, letting visitor in");
            GateDecision::FailOpen(FailOpenReason::Location(e))
        }
    }
}

#[cfg(test)]
mod tests;
