//! Polygon face kernel.
//!
//! A [`Face`] is a `{start, size}` view into a shared label array; the labels
//! index a shared point array. Nothing here owns points or labels.
//!
//! All operations work on arbitrary polygons, including non-planar and
//! mildly concave ones, by decomposing the polygon into a fan of triangles
//! anchored at the vertex average. Triangles take a direct path.

use crate::error::GeometryError;
use crate::geom::triangle::Triangle;
use crate::geom::{SMALL, VSMALL};
use crate::{Point, Vector};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Contiguous run of point labels in a shared label array.
///
/// Equality is structural: two faces are equal when `start` and `size` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Face {
    start: usize,
    size: usize,
}

impl Face {
    pub fn new(start: usize, size: usize) -> Result<Self> {
        if size < 3 {
            return Err(GeometryError::TooFewPoints { size }.into());
        }
        Ok(Self { start, size })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// One past the last label of this face in the label array.
    pub fn end(&self) -> usize {
        self.start + self.size
    }

    /// Returns the labels of this face.
    pub fn labels<'a>(&self, labels: &'a [usize]) -> Result<&'a [usize]> {
        if self.size < 3 {
            return Err(GeometryError::TooFewPoints { size: self.size }.into());
        }
        labels.get(self.start..self.end()).ok_or_else(|| {
            GeometryError::LabelRangeOutOfBounds {
                start: self.start,
                end: self.end(),
                len: labels.len(),
            }
            .into()
        })
    }

    /// Binds the face to its label and point arrays.
    ///
    /// Fails if the face is malformed: fewer than 3 labels, a label range
    /// outside `labels`, or a label outside `points`.
    pub fn view<'a>(&self, labels: &'a [usize], points: &'a [Point]) -> Result<PolygonView<'a>> {
        let labels = self.labels(labels)?;
        if let Some(&label) = labels.iter().find(|&&l| l >= points.len()) {
            return Err(GeometryError::PointLabelOutOfRange {
                label,
                num_points: points.len(),
            }
            .into());
        }
        Ok(PolygonView { labels, points })
    }

    pub fn centroid(&self, labels: &[usize], points: &[Point]) -> Result<Point> {
        Ok(self.view(labels, points)?.centroid())
    }

    pub fn normal(&self, labels: &[usize], points: &[Point]) -> Result<Vector> {
        Ok(self.view(labels, points)?.normal())
    }

    /// Volume swept by the face moving from `old_points` to `new_points`.
    pub fn swept_volume(
        &self,
        labels: &[usize],
        old_points: &[Point],
        new_points: &[Point],
    ) -> Result<f64> {
        if old_points.len() != new_points.len() {
            return Err(GeometryError::PointCountMismatch {
                old: old_points.len(),
                new: new_points.len(),
            }
            .into());
        }
        let old = self.view(labels, old_points)?;
        let new = self.view(labels, new_points)?;
        Ok(old.swept_volume(&new))
    }

    pub fn contact_sphere_diameter(
        &self,
        labels: &[usize],
        probe_point: Point,
        probe_normal: Vector,
        points: &[Point],
    ) -> Result<f64> {
        Ok(self
            .view(labels, points)?
            .contact_sphere_diameter(probe_point, probe_normal))
    }
}

/// A validated face bound to its labels and points.
#[derive(Debug, Clone, Copy)]
pub struct PolygonView<'a> {
    labels: &'a [usize],
    points: &'a [Point],
}

impl<'a> PolygonView<'a> {
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn labels(&self) -> &'a [usize] {
        self.labels
    }

    pub fn label(&self, i: usize) -> usize {
        self.labels[i % self.size()]
    }

    /// Label of the vertex after `i`, wrapping to the first vertex.
    pub fn next_label(&self, i: usize) -> usize {
        self.labels[(i + 1) % self.size()]
    }

    /// Label of the vertex before `i`, wrapping to the last vertex.
    pub fn prev_label(&self, i: usize) -> usize {
        let n = self.size();
        self.labels[(i % n + n - 1) % n]
    }

    /// Point of vertex `i` (wrapping).
    pub fn point(&self, i: usize) -> Point {
        self.points[self.label(i)]
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.labels.iter().map(|&l| self.points[l])
    }

    /// Plain average of the vertices.
    pub fn vertex_average(&self) -> Point {
        let sum = self
            .points()
            .fold(Vector::zero(), |acc, p| acc + Vector::from(p));
        Point::origin() + sum / self.size() as f64
    }

    /// Area-weighted centroid.
    pub fn centroid(&self) -> Point {
        if self.size() == 3 {
            return Point::average(&[self.point(0), self.point(1), self.point(2)]);
        }
        self.fan_centroid()
    }

    /// Sum of the fan triangle normals.
    ///
    /// Orientation follows the vertex order (right-hand rule); the magnitude
    /// is twice the polygon area.
    pub fn normal(&self) -> Vector {
        if self.size() == 3 {
            return Triangle::new(self.point(0), self.point(1), self.point(2)).normal();
        }
        self.fan_normal()
    }

    pub fn area(&self) -> f64 {
        0.5 * self.normal().length()
    }

    pub fn unit_normal(&self) -> Result<Vector> {
        self.normal().normalize()
    }

    /// Fan triangles `(p[i], p[i+1], vertex average)`, wrapping at the end.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        let centre = self.vertex_average();
        (0..self.size())
            .map(move |i| Triangle::new(self.point(i), self.point(i + 1), centre))
    }

    /// Volume swept by this polygon moving to `new`.
    ///
    /// Always uses the centroid fan, also for triangles, so neighbouring
    /// cells see the same decomposition of a shared face. For cells mixing
    /// triangular and polygonal faces the swept volumes of opposite faces
    /// can differ slightly; this is a known property of the decomposition.
    pub fn swept_volume(&self, new: &PolygonView) -> f64 {
        let n = self.size();
        let old_centre = self.centroid();
        let new_centre = new.centroid();

        let mut sv = 0.;
        for i in 0..n {
            let old_tri = Triangle::new(old_centre, self.point(i), self.point(i + 1));
            let new_tri = Triangle::new(new_centre, new.point(i), new.point(i + 1));
            sv += old_tri.swept_volume(&new_tri);
        }
        sv
    }

    /// Diameter of the sphere touching `probe_point` with surface normal
    /// `probe_normal` and tangent to the plane of this polygon.
    ///
    /// Both normals are normalized with a `SMALL` bias, so a zero-length
    /// probe normal does not divide by zero. Parallel normals
    /// (`n1 . n2 = 1`) are singular; callers must avoid them.
    pub fn contact_sphere_diameter(&self, probe_point: Point, probe_normal: Vector) -> f64 {
        let n1 = probe_normal / (probe_normal.length() + SMALL);
        let n2 = self.normal();
        let n2 = n2 / (n2.length() + SMALL);
        2. * (self.centroid() - probe_point).dot(&n2) / (n1.dot(&n2) - 1.)
    }

    fn fan_centroid(&self) -> Point {
        let centre = self.vertex_average();
        let mut sum_a = 0.;
        let mut sum_ac = Vector::zero();
        for i in 0..self.size() {
            let (p, next) = (self.point(i), self.point(i + 1));
            // 3 * triangle centre
            let ttc = Vector::from(p) + Vector::from(next) + Vector::from(centre);
            // 2 * triangle area
            let ta = (p - centre).cross(&(next - centre)).length();
            sum_a += ta;
            sum_ac += ta * ttc;
        }
        if sum_a > VSMALL {
            Point::origin() + sum_ac / (3. * sum_a)
        } else {
            centre
        }
    }

    fn fan_normal(&self) -> Vector {
        // The centre point always comes last
        self.triangles()
            .fold(Vector::zero(), |acc, tri| acc + tri.normal())
    }
}
