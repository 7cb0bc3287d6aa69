pub mod bboxes;
pub mod face;
pub mod point;
pub mod rotation;
pub mod tetrahedron;
pub mod triangle;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-13;

/// Bias added to magnitudes before dividing by them.
pub const SMALL: f64 = 1e-15;

/// Accumulated areas below this value are treated as zero.
pub const VSMALL: f64 = 1e-300;

/// Approximate comparison of scalars.
pub trait IsClose {
    fn is_close(&self, other: f64) -> bool;
}

impl IsClose for f64 {
    fn is_close(&self, other: f64) -> bool {
        (self - other).abs() < EPS
    }
}
