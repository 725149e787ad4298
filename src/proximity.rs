//! Which marker, if any, is active for a given location.
//!
//! `active_marker` is a pure function re-run on every location update.
//! `ChangeGate` sits behind it and only reports a result that differs from
//! the previous one, so staying inside one marker's range never restarts
//! its audio.

use crate::event::{Marker, MarkerId};
use crate::geo::{UserLocation, distance_meters, is_within_threshold};

/// The active marker for `location`, or `None`.
///
/// When several markers are in range, the first one in configuration order
/// wins, even if a later one is nearer. That ordering decides which of
/// several overlapping ranges gets the audio.
pub fn active_marker(
    location: Option<&UserLocation>,
    markers: &[Marker],
    threshold_m: f64,
) -> Option<MarkerId> {
    let location = location?;
    markers
        .iter()
        .find(|m| is_within_threshold(location.coordinate, m.coordinate, threshold_m))
        .map(|m| m.id)
}

/// Per-marker in-range flags, in marker order.
pub fn markers_in_range(
    location: Option<&UserLocation>,
    markers: &[Marker],
    threshold_m: f64,
) -> Vec<bool> {
    match location {
        Some(l) => markers
            .iter()
            .map(|m| is_within_threshold(l.coordinate, m.coordinate, threshold_m))
            .collect(),
        None => vec![false; markers.len()],
    }
}

/// Distance from `location` to `marker`, if the location is known.
pub fn distance_to(location: Option<&UserLocation>, marker: &Marker) -> Option<f64> {
    location.map(|l| distance_meters(l.coordinate, marker.coordinate))
}

/// A transition of the active track.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TrackChange {
    pub previous: Option<MarkerId>,
    pub current: Option<MarkerId>,
}

/// Remembers the last adopted result and reports only real changes.
#[derive(Debug, Default)]
pub struct ChangeGate {
    previous: Option<MarkerId>,
}

impl ChangeGate {
    pub fn current(&self) -> Option<MarkerId> {
        self.previous
    }

    pub fn observe(&mut self, result: Option<MarkerId>) -> Option<TrackChange> {
        if result == self.previous {
            return None;
        }
        let change = TrackChange {
            previous: self.previous,
            current: result,
        };
        self.previous = result;
        Some(change)
    }
}
