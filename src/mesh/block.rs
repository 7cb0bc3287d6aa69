//! Structured hexahedral block meshes.
//!
//! A [`HexBlock`] is an axis-aligned box split into `nx * ny * nz` cells.
//! Each of the six sides becomes one patch, in the order of [`Side::ALL`].
//! Opposite sides enumerate their faces in the same order, so face `k` of
//! one matches face `k` of the other; cyclic pairs and processor cuts rely
//! on this.

use crate::geom::face::Face;
use crate::mesh::patch::{CyclicTransform, Patch, PatchKind};
use crate::mesh::poly_mesh::PolyMesh;
use crate::{Point, Vector};
use anyhow::{Result, anyhow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    XMin,
    XMax,
    YMin,
    YMax,
    ZMin,
    ZMax,
}

impl Side {
    pub const ALL: [Side; 6] = [
        Side::XMin,
        Side::XMax,
        Side::YMin,
        Side::YMax,
        Side::ZMin,
        Side::ZMax,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn opposite(&self) -> Side {
        Side::ALL[self.index() ^ 1]
    }

    pub fn axis(&self) -> usize {
        self.index() / 2
    }

    pub fn is_max(&self) -> bool {
        self.index() % 2 == 1
    }

    pub fn name(&self) -> &'static str {
        match self {
            Side::XMin => "xmin",
            Side::XMax => "xmax",
            Side::YMin => "ymin",
            Side::YMax => "ymax",
            Side::ZMin => "zmin",
            Side::ZMax => "zmax",
        }
    }
}

/// Boundary treatment of one block side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideKind {
    Wall,
    Generic,
    SymmetryPlane,
    Symmetry,
    Wedge,
    /// Periodic with the opposite side.
    Cyclic,
    /// Cut towards the given domain.
    Processor(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HexBlock {
    origin: Point,
    lengths: [f64; 3],
    cells: [usize; 3],
    sides: [SideKind; 6],
}

impl HexBlock {
    /// Box with its minimum corner at `origin`. All sides are walls.
    pub fn new(origin: Point, lengths: [f64; 3], cells: [usize; 3]) -> Result<Self> {
        if lengths.iter().any(|&l| l <= 0. || !l.is_finite()) {
            return Err(anyhow!("Block lengths must be positive, got {:?}", lengths));
        }
        if cells.contains(&0) {
            return Err(anyhow!("Block needs at least one cell per direction, got {:?}", cells));
        }
        Ok(Self {
            origin,
            lengths,
            cells,
            sides: [SideKind::Wall; 6],
        })
    }

    pub fn with_side(mut self, side: Side, kind: SideKind) -> Self {
        self.sides[side.index()] = kind;
        self
    }

    /// Sets both sides along `axis` (0, 1 or 2) to be periodic.
    pub fn with_cyclic_axis(self, axis: usize) -> Self {
        let min = Side::ALL[2 * axis];
        self.with_side(min, SideKind::Cyclic)
            .with_side(min.opposite(), SideKind::Cyclic)
    }

    pub fn side(&self, side: Side) -> SideKind {
        self.sides[side.index()]
    }

    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    pub fn n_cells(&self) -> usize {
        self.cells.iter().product()
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn lengths(&self) -> [f64; 3] {
        self.lengths
    }

    pub fn cell_size(&self) -> Vector {
        Vector::new(
            self.lengths[0] / self.cells[0] as f64,
            self.lengths[1] / self.cells[1] as f64,
            self.lengths[2] / self.cells[2] as f64,
        )
    }

    pub fn build(&self) -> Result<PolyMesh> {
        self.build_mapped(|p| p)
    }

    /// Builds the mesh with every point passed through `map`.
    ///
    /// The map must keep cells star-shaped around their centres. Cyclic
    /// transforms are derived from the unmapped box.
    pub fn build_mapped<F: Fn(Point) -> Point>(&self, map: F) -> Result<PolyMesh> {
        for side in Side::ALL {
            if self.side(side) == SideKind::Cyclic
                && self.side(side.opposite()) != SideKind::Cyclic
            {
                return Err(anyhow!(
                    "Side '{}' is cyclic but '{}' is not",
                    side.name(),
                    side.opposite().name()
                ));
            }
        }

        let [nx, ny, nz] = self.cells;
        let d = self.cell_size();
        let pid = |i: usize, j: usize, k: usize| i + (nx + 1) * (j + (ny + 1) * k);
        let cid = |i: usize, j: usize, k: usize| i + nx * (j + ny * k);

        let mut points = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for k in 0..=nz {
            for j in 0..=ny {
                for i in 0..=nx {
                    let p = self.origin
                        + Vector::new(i as f64 * d.dx, j as f64 * d.dy, k as f64 * d.dz);
                    points.push(map(p));
                }
            }
        }

        // Quads with normals along +x, +y and +z at lattice point (i, j, k)
        let x_quad = |i: usize, j: usize, k: usize| {
            [pid(i, j, k), pid(i, j + 1, k), pid(i, j + 1, k + 1), pid(i, j, k + 1)]
        };
        let y_quad = |i: usize, j: usize, k: usize| {
            [pid(i, j, k), pid(i, j, k + 1), pid(i + 1, j, k + 1), pid(i + 1, j, k)]
        };
        let z_quad = |i: usize, j: usize, k: usize| {
            [pid(i, j, k), pid(i + 1, j, k), pid(i + 1, j + 1, k), pid(i, j + 1, k)]
        };

        let mut list = FaceList::default();
        let mut neighbour = Vec::new();
        for k in 0..nz {
            for j in 0..ny {
                for i in 1..nx {
                    list.push(x_quad(i, j, k), false, cid(i - 1, j, k))?;
                    neighbour.push(cid(i, j, k));
                }
            }
        }
        for k in 0..nz {
            for j in 1..ny {
                for i in 0..nx {
                    list.push(y_quad(i, j, k), false, cid(i, j - 1, k))?;
                    neighbour.push(cid(i, j, k));
                }
            }
        }
        for k in 1..nz {
            for j in 0..ny {
                for i in 0..nx {
                    list.push(z_quad(i, j, k), false, cid(i, j, k - 1))?;
                    neighbour.push(cid(i, j, k));
                }
            }
        }

        let mut patches = Vec::with_capacity(6);
        for side in Side::ALL {
            let start = list.owner.len();
            let max = side.is_max();
            match side.axis() {
                0 => {
                    let (i, plane) = if max { (nx - 1, nx) } else { (0, 0) };
                    for k in 0..nz {
                        for j in 0..ny {
                            list.push(x_quad(plane, j, k), !max, cid(i, j, k))?;
                        }
                    }
                }
                1 => {
                    let (j, plane) = if max { (ny - 1, ny) } else { (0, 0) };
                    for k in 0..nz {
                        for i in 0..nx {
                            list.push(y_quad(i, plane, k), !max, cid(i, j, k))?;
                        }
                    }
                }
                _ => {
                    let (k, plane) = if max { (nz - 1, nz) } else { (0, 0) };
                    for j in 0..ny {
                        for i in 0..nx {
                            list.push(z_quad(i, j, plane), !max, cid(i, j, k))?;
                        }
                    }
                }
            }
            let size = list.owner.len() - start;
            patches.push(Patch::new(side.name(), self.patch_kind(side), start, size));
        }

        PolyMesh::new(points, list.labels, list.faces, list.owner, neighbour, patches)
    }

    fn patch_kind(&self, side: Side) -> PatchKind {
        match self.side(side) {
            SideKind::Wall => PatchKind::Wall,
            SideKind::Generic => PatchKind::Generic,
            SideKind::SymmetryPlane => PatchKind::SymmetryPlane,
            SideKind::Symmetry => PatchKind::Symmetry,
            SideKind::Wedge => PatchKind::Wedge,
            SideKind::Processor(neighbour_domain) => PatchKind::Processor { neighbour_domain },
            SideKind::Cyclic => {
                let mut separation = [0.; 3];
                let length = self.lengths[side.axis()];
                separation[side.axis()] = if side.is_max() { -length } else { length };
                PatchKind::Cyclic {
                    neighbour_patch: side.opposite().index(),
                    transform: CyclicTransform::Translational {
                        separation: Vector::new(separation[0], separation[1], separation[2]),
                    },
                }
            }
        }
    }

    /// Splits the block into `n` slabs along x, one per domain.
    ///
    /// Cut sides become processor patches. Cells are spread as evenly as
    /// possible, the first slabs taking the remainder.
    pub fn decompose_x(&self, n: usize) -> Result<Vec<HexBlock>> {
        let nx = self.cells[0];
        if n == 0 || n > nx {
            return Err(anyhow!("Cannot split {} cells along x into {} domains", nx, n));
        }
        if n > 1 && self.side(Side::XMin) == SideKind::Cyclic {
            return Err(anyhow!("Cyclic x sides cannot be split across domains"));
        }
        let dx = self.cell_size().dx;
        let mut blocks = Vec::with_capacity(n);
        let mut i0 = 0;
        for domain in 0..n {
            let count = nx / n + usize::from(domain < nx % n);
            let mut block = self.clone();
            block.origin = self.origin + Vector::new(i0 as f64 * dx, 0., 0.);
            block.lengths[0] = count as f64 * dx;
            block.cells[0] = count;
            if domain > 0 {
                block.sides[Side::XMin.index()] = SideKind::Processor(domain - 1);
            }
            if domain + 1 < n {
                block.sides[Side::XMax.index()] = SideKind::Processor(domain + 1);
            }
            blocks.push(block);
            i0 += count;
        }
        Ok(blocks)
    }
}

#[derive(Default)]
struct FaceList {
    labels: Vec<usize>,
    faces: Vec<Face>,
    owner: Vec<usize>,
}

impl FaceList {
    fn push(&mut self, quad: [usize; 4], flip: bool, owner: usize) -> Result<()> {
        self.faces.push(Face::new(self.labels.len(), 4)?);
        if flip {
            self.labels.extend(quad.iter().rev());
        } else {
            self.labels.extend(quad);
        }
        self.owner.push(owner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::IsClose;
    use crate::mesh::topology::TopologyView;

    #[test]
    fn test_block_counts_and_volume() -> Result<()> {
        let block = HexBlock::new(Point::origin(), [2., 1., 1.], [4, 2, 3])?;
        let mesh = block.build()?;
        assert_eq!(mesh.n_cells(), 24);
        assert_eq!(mesh.n_points(), 5 * 3 * 4);
        // 3*2*3 + 4*1*3 + 4*2*2 internal faces
        assert_eq!(mesh.n_internal_faces(), 18 + 12 + 16);
        assert_eq!(mesh.patches().len(), 6);
        assert_eq!(mesh.patches()[0].size, 6);
        assert_eq!(mesh.patches()[2].size, 12);
        assert!(mesh.total_volume().is_close(2.));
        mesh.check_orientation()?;
        Ok(())
    }

    #[test]
    fn test_cell_centres() -> Result<()> {
        let block = HexBlock::new(Point::new(1., 0., 0.), [1., 1., 1.], [2, 2, 2])?;
        let mesh = block.build()?;
        assert!(mesh.cell_centre(0).is_close(&Point::new(1.25, 0.25, 0.25)));
        assert!(mesh.cell_centre(7).is_close(&Point::new(1.75, 0.75, 0.75)));
        assert!(mesh.cell_volume(3).is_close(0.125));
        Ok(())
    }

    #[test]
    fn test_cyclic_faces_match() -> Result<()> {
        let block = HexBlock::new(Point::origin(), [3., 1., 1.], [3, 2, 2])?.with_cyclic_axis(0);
        let mesh = block.build()?;
        let xmin = &mesh.patches()[Side::XMin.index()];
        let PatchKind::Cyclic {
            neighbour_patch,
            transform,
        } = &xmin.kind
        else {
            return Err(anyhow!("xmin should be cyclic"));
        };
        let xmax = &mesh.patches()[*neighbour_patch];
        assert_eq!(xmax.name, "xmax");
        for k in 0..xmin.size {
            let mapped = transform.apply(mesh.face_centre(xmin.start + k))?;
            assert!(mapped.is_close(&mesh.face_centre(xmax.start + k)));
        }
        Ok(())
    }

    #[test]
    fn test_one_sided_cyclic_is_rejected() -> Result<()> {
        let block = HexBlock::new(Point::origin(), [1., 1., 1.], [1, 1, 1])?
            .with_side(Side::YMin, SideKind::Cyclic);
        assert!(block.build().is_err());
        Ok(())
    }

    #[test]
    fn test_decompose_x() -> Result<()> {
        let block = HexBlock::new(Point::origin(), [5., 1., 1.], [5, 1, 1])?;
        let parts = block.decompose_x(2)?;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].cells(), [3, 1, 1]);
        assert_eq!(parts[1].cells(), [2, 1, 1]);
        assert!(parts[1].origin().is_close(&Point::new(3., 0., 0.)));
        assert_eq!(parts[0].side(Side::XMin), SideKind::Wall);
        assert_eq!(parts[0].side(Side::XMax), SideKind::Processor(1));
        assert_eq!(parts[1].side(Side::XMin), SideKind::Processor(0));

        let m0 = parts[0].build()?;
        let m1 = parts[1].build()?;
        let out = &m0.patches()[Side::XMax.index()];
        let inn = &m1.patches()[Side::XMin.index()];
        for k in 0..out.size {
            assert!(m0.face_centre(out.start + k).is_close(&m1.face_centre(inn.start + k)));
        }

        assert!(block.decompose_x(6).is_err());
        assert!(block.with_cyclic_axis(0).decompose_x(2).is_err());
        Ok(())
    }
}
