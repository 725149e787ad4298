use super::*;
use proptest::prelude::*;

fn c(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).unwrap()
}

fn square() -> Vec<Coordinate> {
    vec![c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0), c(1.0, 0.0)]
}

#[test]
fn coordinate_rejects_out_of_range_and_non_finite() {
    assert!(Coordinate::new(90.0, 180.0).is_ok());
    assert!(Coordinate::new(-90.0, -180.0).is_ok());
    assert!(Coordinate::new(90.5, 0.0).is_err());
    assert!(Coordinate::new(0.0, -180.1).is_err());
    assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
}

#[test]
fn user_location_drops_invalid_accuracy() {
    assert_eq!(UserLocation::new(c(0.0, 0.0), Some(-1.0)).accuracy, None);
    assert_eq!(UserLocation::new(c(0.0, 0.0), Some(f64::NAN)).accuracy, None);
    assert_eq!(UserLocation::new(c(0.0, 0.0), Some(4.5)).accuracy, Some(4.5));
}

#[test]
fn hundred_meters_of_latitude_at_the_equator() {
    let d = distance_meters(c(0.0, 0.0), c(0.0009, 0.0));
    assert!((d - 100.0).abs() <= 5.0, "got {d}");
}

#[test]
fn antipodal_points_do_not_produce_nan() {
    let d = distance_meters(c(0.0, 0.0), c(0.0, 180.0));
    assert!(d.is_finite());
    let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
    assert!((d - half_circumference).abs() < 1.0);

    let d = distance_meters(c(90.0, 0.0), c(-90.0, 0.0));
    assert!((d - half_circumference).abs() < 1.0);
}

#[test]
fn threshold_boundary_is_inclusive() {
    let a = c(28.5245, 77.1899);
    let b = c(28.5246, 77.1899);
    let d = distance_meters(a, b);
    assert!(is_within_threshold(a, b, d));
    assert!(!is_within_threshold(a, b, d - 1e-9));
}

#[test]
fn offset_meters_moves_roughly_the_requested_distance() {
    let start = c(28.5245, 77.1899);
    let north = start.offset_meters(10.0, 0.0);
    let east = start.offset_meters(0.0, 10.0);
    assert!((distance_meters(start, north) - 10.0).abs() < 0.1);
    assert!((distance_meters(start, east) - 10.0).abs() < 0.1);
}

#[test]
fn offset_meters_clamps_and_wraps() {
    let p = c(89.99999, 179.99999).offset_meters(10_000.0, 10_000.0);
    assert!(p.latitude() <= 90.0);
    assert!(p.longitude() >= -180.0 && p.longitude() <= 180.0);
}

#[test]
fn polygon_contains_centroid_but_not_far_point() {
    // ~100 m square near the reference venue.
    let venue = vec![
        c(28.5240, 77.1890),
        c(28.5240, 77.1900),
        c(28.5250, 77.1900),
        c(28.5250, 77.1890),
    ];
    let center = vertex_centroid(&venue).unwrap();
    assert!(point_in_polygon(center, &venue));

    // ~10 km north-east of the bounding box.
    let far = c(28.5250 + 0.09, 77.1900 + 0.09);
    assert!(!point_in_polygon(far, &venue));
}

#[test]
fn unit_square_classification() {
    let sq = square();
    assert!(point_in_polygon(c(0.5, 0.5), &sq));
    assert!(!point_in_polygon(c(2.0, 2.0), &sq));
    assert!(!point_in_polygon(c(-0.5, 0.5), &sq));
    assert!(!point_in_polygon(c(0.5, 1.5), &sq));
}

#[test]
fn points_on_edges_and_vertices_count_as_inside() {
    let sq = square();
    assert!(point_in_polygon(c(0.0, 0.5), &sq));
    assert!(point_in_polygon(c(1.0, 0.5), &sq));
    assert!(point_in_polygon(c(0.5, 0.0), &sq));
    assert!(point_in_polygon(c(0.0, 0.0), &sq));
    assert!(point_in_polygon(c(1.0, 1.0), &sq));
}

#[test]
fn ray_through_a_vertex_is_counted_once() {
    // Diamond: the horizontal ray from the center passes through the
    // left and right vertices.
    let diamond = vec![c(0.0, 1.0), c(1.0, 2.0), c(2.0, 1.0), c(1.0, 0.0)];
    assert!(point_in_polygon(c(1.0, 1.0), &diamond));
    assert!(!point_in_polygon(c(1.0, -1.0), &diamond));
    assert!(!point_in_polygon(c(1.0, 3.0), &diamond));
}

#[test]
fn degenerate_polygons_contain_nothing_off_their_line() {
    assert!(!point_in_polygon(c(0.5, 0.5), &[c(0.0, 0.0), c(1.0, 1.0)]));
    assert!(!point_in_polygon(c(0.0, 0.0), &[]));

    // All vertices collinear: zero area, only the segment itself is "on edge".
    let line = vec![c(0.0, 0.0), c(0.0, 1.0), c(0.0, 2.0)];
    assert!(!point_in_polygon(c(0.5, 1.0), &line));
    assert!(point_in_polygon(c(0.0, 1.5), &line));

    // Repeated vertices produce zero-length edges.
    let repeated = vec![c(0.0, 0.0), c(0.0, 0.0), c(0.0, 1.0), c(1.0, 1.0), c(1.0, 0.0)];
    assert!(point_in_polygon(c(0.5, 0.5), &repeated));
}

#[test]
fn vertex_centroid_of_empty_is_none() {
    assert!(vertex_centroid(&[]).is_none());
    assert_eq!(vertex_centroid(&square()).unwrap(), c(0.5, 0.5));
}

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| c(lat, lng))
}

proptest! {
    #[test]
    fn distance_to_self_is_zero(a in coordinate()) {
        prop_assert_eq!(distance_meters(a, a), 0.0);
    }

    #[test]
    fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
        let ab = distance_meters(a, b);
        let ba = distance_meters(b, a);
        prop_assert!((ab - ba).abs() <= 1e-6, "{} vs {}", ab, ba);
    }

    #[test]
    fn distance_is_finite_and_bounded(a in coordinate(), b in coordinate()) {
        let d = distance_meters(a, b);
        prop_assert!(d.is_finite());
        prop_assert!(d >= 0.0);
        prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_M + 1.0);
    }
}
