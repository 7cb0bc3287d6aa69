use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Face crossings and boundary interactions allowed per tracer before
    /// it is reported as lost.
    pub max_face_crossings: usize,
    /// Tetrahedron-to-tetrahedron steps allowed inside one cell per `advance`.
    pub max_tet_steps: usize,
    /// Exchange rounds allowed in a parallel run.
    pub max_rounds: usize,
    /// Barycentric tolerance used when locating points in tetrahedra.
    pub tolerance: f64,
}

impl TrackingConfig {
    pub fn new() -> Self {
        Self {
            max_face_crossings: 10_000,
            max_tet_steps: 1_000,
            max_rounds: 100,
            tolerance: 1e-9,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self::new()
    }
}
