use crate::geom::point::Point;

/// Returns the `(min, max)` corners of the box holding all points `pts`.
///
/// An empty slice gives an inverted box that contains nothing.
pub fn bounding_box(pts: &[Point]) -> (Point, Point) {
    let mut pmin = Point::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut pmax = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in pts {
        pmin.x = pmin.x.min(p.x);
        pmin.y = pmin.y.min(p.y);
        pmin.z = pmin.z.min(p.z);
        pmax.x = pmax.x.max(p.x);
        pmax.y = pmax.y.max(p.y);
        pmax.z = pmax.z.max(p.z);
    }
    (pmin, pmax)
}

/// Checks whether a point lies in the box `(pmin, pmax)` grown by `margin`.
pub fn is_point_inside_bbox(ptest: Point, pmin: Point, pmax: Point, margin: f64) -> bool {
    ptest.x >= pmin.x - margin
        && ptest.x <= pmax.x + margin
        && ptest.y >= pmin.y - margin
        && ptest.y <= pmax.y + margin
        && ptest.z >= pmin.z - margin
        && ptest.z <= pmax.z + margin
}
