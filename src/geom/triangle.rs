//! Triangle primitives used as the atomic unit of all polygon decompositions.

use crate::{Point, Vector};

/// A triangle built by value from three points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Point,
    pub b: Point,
    pub c: Point,
}

impl Triangle {
    pub fn new(a: Point, b: Point, c: Point) -> Self {
        Self { a, b, c }
    }

    /// Returns `(b - a) x (c - a)`.
    ///
    /// The direction follows the vertex order (right-hand rule) and the
    /// magnitude is twice the triangle area.
    pub fn normal(&self) -> Vector {
        (self.b - self.a).cross(&(self.c - self.a))
    }

    pub fn area(&self) -> f64 {
        0.5 * self.normal().length()
    }

    pub fn centroid(&self) -> Point {
        Point::average(&[self.a, self.b, self.c])
    }

    /// Volume swept by this triangle moving to the position of `new`.
    ///
    /// The prism between both instants is split into three tetrahedra in two
    /// different ways and the results are averaged. Positive when the
    /// triangle moves along its normal.
    pub fn swept_volume(&self, new: &Triangle) -> f64 {
        let (a, b, c) = (self.a, self.b, self.c);
        let (na, nb, nc) = (new.a, new.b, new.c);

        let v = (na - a).dot(&(b - a).cross(&(c - a)))
            + (nb - b).dot(&(c - b).cross(&(na - b)))
            + (c - nc).dot(&(nb - nc).cross(&(na - nc)))
            + (na - a).dot(&(b - a).cross(&(c - a)))
            + (b - nb).dot(&(na - nb).cross(&(nc - nb)))
            + (c - nc).dot(&(b - nc).cross(&(na - nc)));

        v / 12.0
    }
}
