use super::coord::Coordinate;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default "in range" radius around a marker.
pub const DEFAULT_PROXIMITY_THRESHOLD_M: f64 = 10.0;

/// Great-circle distance between `a` and `b` in meters.
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = (b.latitude() - a.latitude()).to_radians();
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `h` just past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Inclusive proximity check: a distance equal to the threshold is in range.
pub fn is_within_threshold(a: Coordinate, b: Coordinate, threshold_m: f64) -> bool {
    distance_meters(a, b) <= threshold_m
}
