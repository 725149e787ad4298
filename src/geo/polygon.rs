use super::coord::Coordinate;

/// Tolerance (in degrees) for treating a point as lying on an edge.
const EDGE_EPSILON: f64 = 1e-12;

/// Ray-casting containment test on the `(lng, lat)` plane.
///
/// Points on an edge or vertex count as inside. Fewer than three vertices
/// never contain anything. The polygon is closed implicitly: the last vertex
/// connects back to the first.
pub fn point_in_polygon(point: Coordinate, polygon: &[Coordinate]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (px, py) = (point.longitude(), point.latitude());
    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].longitude(), polygon[i].latitude());
        let (xj, yj) = (polygon[j].longitude(), polygon[j].latitude());

        if on_segment(px, py, xi, yi, xj, yj) {
            return true;
        }

        // Half-open rule: an edge is crossed only when exactly one endpoint is
        // above the ray. Horizontal edges (yi == yj) never qualify, so the
        // division below always has a non-zero denominator.
        if (yi > py) != (yj > py) {
            let x_cross = xi + (py - yi) * (xj - xi) / (yj - yi);
            if px < x_cross {
                inside = !inside;
            }
        }

        j = i;
    }

    inside
}

fn on_segment(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
    let cross = (x2 - x1) * (py - y1) - (y2 - y1) * (px - x1);
    if cross.abs() > EDGE_EPSILON {
        return false;
    }
    px >= x1.min(x2) - EDGE_EPSILON
        && px <= x1.max(x2) + EDGE_EPSILON
        && py >= y1.min(y2) - EDGE_EPSILON
        && py <= y1.max(y2) + EDGE_EPSILON
}

/// Arithmetic mean of the vertices. Good enough as a map/venue center.
pub fn vertex_centroid(polygon: &[Coordinate]) -> Option<Coordinate> {
    if polygon.is_empty() {
        return None;
    }
    let n = polygon.len() as f64;
    let lat = polygon.iter().map(Coordinate::latitude).sum::<f64>() / n;
    let lng = polygon.iter().map(Coordinate::longitude).sum::<f64>() / n;
    Coordinate::new(lat, lng).ok()
}
