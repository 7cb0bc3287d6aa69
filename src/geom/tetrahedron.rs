use crate::{Point, Vector};

/// Four points of a tetrahedron.
///
/// Side `k` is the triangle opposite to vertex `k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tetrahedron {
    pub pts: [Point; 4],
}

impl Tetrahedron {
    pub fn new(pt0: Point, pt1: Point, pt2: Point, pt3: Point) -> Self {
        Self {
            pts: [pt0, pt1, pt2, pt3],
        }
    }

    /// Signed volume (positive if `pt3` lies on the side of `(pt1-pt0) x (pt2-pt0)`).
    pub fn signed_volume(&self) -> f64 {
        let [p0, p1, p2, p3] = self.pts;
        signed_volume(p0, p1, p2, p3)
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Returns tetrahedron centroid (i.e. average of each vertices)
    pub fn centroid(&self) -> Point {
        Point::average(&self.pts)
    }

    /// Returns the three points of the side opposite to vertex `k`.
    pub fn side(&self, k: usize) -> [Point; 3] {
        let p = &self.pts;
        match k {
            0 => [p[1], p[2], p[3]],
            1 => [p[0], p[2], p[3]],
            2 => [p[0], p[1], p[3]],
            _ => [p[0], p[1], p[2]],
        }
    }

    /// Normal of side `k` pointing out of the tetrahedron.
    ///
    /// The magnitude is twice the side area.
    pub fn outward_normal(&self, k: usize) -> Vector {
        let [q0, q1, q2] = self.side(k);
        let n = (q1 - q0).cross(&(q2 - q0));
        if n.dot(&(self.pts[k] - q0)) > 0. { -n } else { n }
    }

    /// Barycentric coordinates of `p`.
    ///
    /// Coordinate `k` is the signed volume of the tetrahedron with vertex `k`
    /// replaced by `p`, relative to the full volume. All coordinates are
    /// non-negative when `p` is inside. Returns `None` for a flat tetrahedron.
    pub fn barycentric(&self, p: Point) -> Option<[f64; 4]> {
        let vol = self.signed_volume();
        let scale = self
            .pts
            .iter()
            .map(|q| (*q - self.pts[0]).length())
            .fold(0.0_f64, f64::max);
        if vol.abs() <= 1e-14 * scale.powi(3) {
            return None;
        }
        let mut coords = [0.; 4];
        for (k, c) in coords.iter_mut().enumerate() {
            let mut pts = self.pts;
            pts[k] = p;
            *c = signed_volume(pts[0], pts[1], pts[2], pts[3]) / vol;
        }
        Some(coords)
    }

    /// Finds where the segment `p -> p + d` leaves the tetrahedron.
    ///
    /// Returns the side index and the fraction of `d` travelled before the
    /// exit. The fraction may exceed 1 when the segment ends inside. Sides
    /// the segment moves parallel to or inwards through are ignored.
    pub fn exit(&self, p: Point, d: Vector) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for k in 0..4 {
            let n = self.outward_normal(k);
            let nd = n.dot(&d);
            if nd <= 0. {
                continue;
            }
            let q0 = self.side(k)[0];
            let lambda = (n.dot(&(q0 - p)) / nd).max(0.);
            match best {
                Some((_, l)) if l <= lambda => {}
                _ => best = Some((k, lambda)),
            }
        }
        best
    }
}

fn signed_volume(p0: Point, p1: Point, p2: Point, p3: Point) -> f64 {
    (p1 - p0).dot(&(p2 - p0).cross(&(p3 - p0))) / 6.
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet() -> Tetrahedron {
        Tetrahedron::new(
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(0., 1., 0.),
            Point::new(0., 0., 1.),
        )
    }

    #[test]
    fn test_volume() {
        let tet = unit_tet();
        assert!((tet.signed_volume() - 1. / 6.).abs() < 1e-15);
        let [p0, p1, p2, p3] = tet.pts;
        let flipped = Tetrahedron::new(p0, p2, p1, p3);
        assert!((flipped.signed_volume() + 1. / 6.).abs() < 1e-15);
        assert!((flipped.volume() - 1. / 6.).abs() < 1e-15);
    }

    #[test]
    fn test_centroid() {
        let tet = unit_tet();
        assert!(tet.centroid().is_close(&Point::new(0.25, 0.25, 0.25)));
    }

    #[test]
    fn test_outward_normals() {
        let tet = unit_tet();
        let c = tet.centroid();
        for k in 0..4 {
            let n = tet.outward_normal(k);
            let q0 = tet.side(k)[0];
            assert!(n.dot(&(q0 - c)) > 0.);
        }
        // Side 3 is the z=0 triangle
        assert!(tet.outward_normal(3).is_close(&Vector::new(0., 0., -1.)));
    }

    #[test]
    fn test_barycentric() {
        let tet = unit_tet();
        let b = tet.barycentric(tet.centroid()).unwrap();
        for c in b {
            assert!((c - 0.25).abs() < 1e-14);
        }
        let b = tet.barycentric(Point::new(1., 1., 1.)).unwrap();
        assert!(b.iter().any(|c| *c < 0.));
        let flat = Tetrahedron::new(
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(0., 1., 0.),
            Point::new(1., 1., 0.),
        );
        assert!(flat.barycentric(Point::new(0.1, 0.1, 0.)).is_none());
    }

    #[test]
    fn test_exit() {
        let tet = unit_tet();
        let p = Point::new(0.1, 0.1, 0.1);
        // Straight down leaves through the z=0 side after 0.1 units
        let (side, lambda) = tet.exit(p, Vector::new(0., 0., -1.)).unwrap();
        assert_eq!(side, 3);
        assert!((lambda - 0.1).abs() < 1e-14);
        // Short displacement stays inside
        let (_, lambda) = tet.exit(p, Vector::new(0.01, 0., 0.)).unwrap();
        assert!(lambda > 1.);
        assert!(tet.exit(p, Vector::zero()).is_none());
    }
}
