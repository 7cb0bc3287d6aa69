use crate::Vector;
use crate::geom::EPS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::default()
    }

    pub fn is_close(&self, other: &Self) -> bool {
        self.is_close_tol(other, EPS)
    }

    /// True if the points are within `tol` of each other along every axis.
    pub fn is_close_tol(&self, other: &Self, tol: f64) -> bool {
        let d = *self - *other;
        d.dx.abs() <= tol && d.dy.abs() <= tol && d.dz.abs() <= tol
    }

    /// Arithmetic mean, or the origin for an empty slice.
    pub fn average(pts: &[Point]) -> Self {
        if pts.is_empty() {
            return Self::origin();
        }
        let sum = pts.iter().fold(Vector::zero(), |acc, &p| acc + Vector::from(p));
        Self::origin() + sum / pts.len() as f64
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (*other - *self).length()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(6);
        write!(f, "({:.prec$}, {:.prec$}, {:.prec$})", self.x, self.y, self.z)
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, v: Vector) -> Point {
        Point::new(self.x + v.dx, self.y + v.dy, self.z + v.dz)
    }
}

impl Sub<Vector> for Point {
    type Output = Point;
    fn sub(self, v: Vector) -> Point {
        Point::new(self.x - v.dx, self.y - v.dy, self.z - v.dz)
    }
}

/// Displacement from `rhs` to `self`.
impl Sub for Point {
    type Output = Vector;
    fn sub(self, rhs: Self) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}
