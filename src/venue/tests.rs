use super::*;
use crate::location::{LocationMessage, SubscriptionId, WatchHandle};
use std::sync::mpsc::Sender;

fn c(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn square() -> VenueRegion {
    VenueRegion::new(vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0), c(1.0, 0.0)]).unwrap()
}

/// Answers one-shot queries with a fixed result.
struct FixedProvider(Result<UserLocation, LocationError>);

impl LocationProvider for FixedProvider {
    fn watch(
        &self,
        _options: PositionOptions,
        _subscription: SubscriptionId,
        _tx: Sender<LocationMessage>,
    ) -> Result<WatchHandle, LocationError> {
        Err(LocationError::Unsupported)
    }

    fn current_position(&self, _options: PositionOptions) -> Result<UserLocation, LocationError> {
        self.0
    }
}

#[test]
fn region_needs_three_points() {
    assert_eq!(
        VenueRegion::new(vec![c(0.0, 0.0), c(1.0, 1.0)]),
        Err(VenueError::TooFewPoints(2))
    );
    assert_eq!(square().points().len(), 4);
    assert_eq!(square().center(), Some(c(0.5, 0.5)));
}

#[test]
fn is_inside_uses_polygon_containment() {
    let region = square();
    assert!(is_inside(&c(0.5, 0.5).into(), &region));
    assert!(!is_inside(&c(2.0, 2.0).into(), &region));
}

#[test]
fn gate_admits_visitor_inside() {
    let provider = FixedProvider(Ok(c(0.5, 0.5).into()));
    let decision = check_entry(&provider, Some(&square()), PositionOptions::default());
    assert_eq!(decision, GateDecision::Inside(c(0.5, 0.5).into()));
    assert!(decision.admits());
}

#[test]
fn gate_rejects_visitor_outside() {
    let provider = FixedProvider(Ok(c(2.0, 2.0).into()));
    let decision = check_entry(&provider, Some(&square()), PositionOptions::default());
    assert_eq!(decision, GateDecision::Outside(c(2.0, 2.0).into()));
    assert!(!decision.admits());
}

#[test]
fn gate_fails_open_without_a_location() {
    for err in [
        LocationError::PermissionDenied,
        LocationError::Unavailable,
        LocationError::Timeout,
        LocationError::Unsupported,
    ] {
        let provider = FixedProvider(Err(err));
        let decision = check_entry(&provider, Some(&square()), PositionOptions::default());
        assert_eq!(decision, GateDecision::FailOpen(FailOpenReason::Location(err)));
        assert!(decision.admits());
    }
}

#[test]
fn gate_fails_open_without_a_venue() {
    let provider = FixedProvider(Ok(c(50.0, 50.0).into()));
    let decision = check_entry(&provider, None, PositionOptions::default());
    assert_eq!(decision, GateDecision::FailOpen(FailOpenReason::NoVenue));
    assert!(decision.admits());
}
