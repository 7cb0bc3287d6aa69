//! Typed failure conditions.
//!
//! Public operations return `anyhow::Result`. The variants below are the
//! conditions callers need to tell apart; recover them with
//! `err.downcast_ref::<GeometryError>()` or `err.downcast_ref::<TrackingError>()`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Polygon needs at least 3 points, got {size}")]
    TooFewPoints { size: usize },

    #[error("Polygon label range {start}..{end} exceeds label array of length {len}")]
    LabelRangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Point label {label} is out of range for {num_points} points")]
    PointLabelOutOfRange { label: usize, num_points: usize },

    #[error("Point arrays differ in length: {old} (old) vs {new} (new)")]
    PointCountMismatch { old: usize, new: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackingError {
    #[error("Cell not found: tracer gave up after {crossings} face crossings")]
    CellNotFound { crossings: usize },

    #[error("Cell not found: {steps} tetrahedron steps in cell {cell} without reaching a face")]
    StuckInCell { cell: usize, steps: usize },

    #[error("Unexpected boundary: patch '{patch}' (face {face}) has no tracking behaviour")]
    UnexpectedBoundary { patch: String, face: usize },

    #[error("Point ({x}, {y}, {z}) is not inside cell {cell}")]
    PointNotInCell { cell: usize, x: f64, y: f64, z: f64 },

    #[error("No processor patch connects domain {domain} to domain {from}")]
    NoProcessorPatch { domain: usize, from: usize },

    #[error("Tracking did not terminate within {rounds} exchange rounds")]
    RoundLimit { rounds: usize },
}
