//! Polyhedral meshes and the topology view that tracking walks.

pub mod block;
pub mod patch;
pub mod poly_mesh;
pub mod topology;

pub use block::{HexBlock, Side, SideKind};
pub use patch::{CyclicTransform, Patch, PatchKind};
pub use poly_mesh::PolyMesh;
pub use topology::{TetIndices, TopologyView};
