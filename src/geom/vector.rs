use crate::Point;
use crate::geom::EPS;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Displacement in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Vector {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.dx * other.dx + self.dy * other.dy + self.dz * other.dz
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.dy * other.dz - self.dz * other.dy,
            self.dz * other.dx - self.dx * other.dz,
            self.dx * other.dy - self.dy * other.dx,
        )
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Component-wise comparison within [`EPS`].
    pub fn is_close(&self, other: &Self) -> bool {
        let d = *self - *other;
        d.dx.abs() < EPS && d.dy.abs() < EPS && d.dz.abs() < EPS
    }

    /// Unit vector with the same direction.
    pub fn normalize(&self) -> Result<Self> {
        match self.length() {
            len if len < EPS => Err(anyhow!("{} has no direction", self)),
            len => Ok(*self / len),
        }
    }

    /// Mirrors the vector across a plane with the unit normal `n`.
    pub fn reflect(&self, n: &Vector) -> Self {
        *self - 2.0 * self.dot(n) * *n
    }
}

/// Position vector of a point.
impl From<Point> for Vector {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(6);
        write!(f, "[{:.prec$} {:.prec$} {:.prec$}]", self.dx, self.dy, self.dz)
    }
}

impl Add for Vector {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.dx + rhs.dx, self.dy + rhs.dy, self.dz + rhs.dz)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self + -rhs
    }
}

impl Neg for Vector {
    type Output = Self;
    fn neg(self) -> Self {
        -1.0 * self
    }
}

impl Mul<f64> for Vector {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.dx * s, self.dy * s, self.dz * s)
    }
}

impl Mul<Vector> for f64 {
    type Output = Vector;
    fn mul(self, v: Vector) -> Vector {
        v * self
    }
}

impl Div<f64> for Vector {
    type Output = Self;
    fn div(self, s: f64) -> Self {
        Self::new(self.dx / s, self.dy / s, self.dz / s)
    }
}
