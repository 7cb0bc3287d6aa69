pub mod error;
pub mod geom;
mod id;
pub mod mesh;
pub mod track;

// Prelude
pub use error::{GeometryError, TrackingError};
pub use geom::face::{Face, PolygonView};
pub use geom::point::Point;
pub use geom::vector::Vector;
pub use id::TracerId;
pub use mesh::{HexBlock, PatchKind, PolyMesh, TopologyView};
pub use track::{TrackState, Tracer, TrackingConfig, TrackingContext};
