//! Read-only mesh topology consumed by tracking.
//!
//! Every cell is decomposed into tetrahedra `(cell centre, face centroid,
//! point a, point b)`, one per edge of each of its faces. The decomposition
//! is valid for non-convex cells as long as the cell is star-shaped with
//! respect to its centre, and both cells of a shared face see the same fan
//! of face triangles.

use crate::geom::bboxes::{bounding_box, is_point_inside_bbox};
use crate::geom::face::Face;
use crate::geom::tetrahedron::Tetrahedron;
use crate::mesh::patch::Patch;
use crate::{Point, Vector};
use serde::{Deserialize, Serialize};

/// One tetrahedron of a cell decomposition.
///
/// `a` and `b` are positions within the face's point list, `b == a + 1`
/// modulo the face size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TetIndices {
    pub cell: usize,
    pub face: usize,
    pub a: usize,
    pub b: usize,
}

impl TetIndices {
    pub fn new(cell: usize, face: usize, a: usize, face_size: usize) -> Self {
        Self {
            cell,
            face,
            a,
            b: (a + 1) % face_size,
        }
    }
}

/// Side of a decomposition tetrahedron lying on the mesh face.
pub const FACE_SIDE: usize = 0;

pub trait TopologyView {
    fn points(&self) -> &[Point];
    fn face_labels(&self) -> &[usize];
    fn faces(&self) -> &[Face];
    fn n_cells(&self) -> usize;
    fn n_internal_faces(&self) -> usize;
    fn owner(&self, face: usize) -> usize;
    /// Neighbour cell, `None` for boundary faces.
    fn neighbour(&self, face: usize) -> Option<usize>;
    fn cell_faces(&self, cell: usize) -> &[usize];
    fn patches(&self) -> &[Patch];
    /// Patch holding a boundary face, `None` for internal faces.
    fn patch_id(&self, face: usize) -> Option<usize>;
    fn face_centre(&self, face: usize) -> Point;
    /// Face normal pointing out of the owner cell, magnitude twice the area.
    fn face_normal(&self, face: usize) -> Vector;
    /// Decomposition point of the cell.
    fn cell_centre(&self, cell: usize) -> Point;

    fn n_faces(&self) -> usize {
        self.faces().len()
    }

    fn labels_of(&self, face: usize) -> &[usize] {
        let f = self.faces()[face];
        &self.face_labels()[f.start()..f.end()]
    }

    fn is_internal_face(&self, face: usize) -> bool {
        face < self.n_internal_faces()
    }

    fn patch_by_name(&self, name: &str) -> Option<usize> {
        self.patches().iter().position(|p| p.name == name)
    }

    /// Cell on the other side of `face` as seen from `cell`.
    fn other_cell(&self, face: usize, cell: usize) -> Option<usize> {
        let owner = self.owner(face);
        let neighbour = self.neighbour(face)?;
        if owner == cell {
            Some(neighbour)
        } else {
            Some(owner)
        }
    }

    /// All decomposition tetrahedra of a cell.
    fn cell_tets(&self, cell: usize) -> Vec<TetIndices> {
        let mut tets = Vec::new();
        for &face in self.cell_faces(cell) {
            let n = self.faces()[face].size();
            for a in 0..n {
                tets.push(TetIndices::new(cell, face, a, n));
            }
        }
        tets
    }

    fn tet(&self, tet: &TetIndices) -> Tetrahedron {
        let labels = self.labels_of(tet.face);
        let pts = self.points();
        Tetrahedron::new(
            self.cell_centre(tet.cell),
            self.face_centre(tet.face),
            pts[labels[tet.a]],
            pts[labels[tet.b]],
        )
    }

    /// Tetrahedron of the same cell across `side` of `tet`.
    ///
    /// Returns `None` for [`FACE_SIDE`], which lies on the mesh face, and for
    /// an edge that no other face of the cell shares (open cell).
    fn tet_neighbour(&self, tet: &TetIndices, side: usize) -> Option<TetIndices> {
        let n = self.faces()[tet.face].size();
        match side {
            FACE_SIDE => None,
            // Side (cell centre, point a, point b): across the face edge
            1 => {
                let labels = self.labels_of(tet.face);
                let (la, lb) = (labels[tet.a], labels[tet.b]);
                self.cell_faces(tet.cell)
                    .iter()
                    .filter(|&&f| f != tet.face)
                    .find_map(|&f| {
                        let other = self.labels_of(f);
                        let m = other.len();
                        (0..m)
                            .find(|&i| {
                                let (p, q) = (other[i], other[(i + 1) % m]);
                                (p == la && q == lb) || (p == lb && q == la)
                            })
                            .map(|i| TetIndices::new(tet.cell, f, i, m))
                    })
            }
            // Side (cell centre, face centroid, point b)
            2 => Some(TetIndices::new(tet.cell, tet.face, tet.b, n)),
            // Side (cell centre, face centroid, point a)
            _ => Some(TetIndices::new(tet.cell, tet.face, (tet.a + n - 1) % n, n)),
        }
    }

    /// Locates `p` within `cell`.
    ///
    /// Picks the tetrahedron whose smallest barycentric coordinate is the
    /// largest and accepts it if that coordinate is above `-tol`.
    fn find_tet(&self, cell: usize, p: Point, tol: f64) -> Option<TetIndices> {
        let mut best: Option<(TetIndices, f64)> = None;
        for tet in self.cell_tets(cell) {
            let Some(bary) = self.tet(&tet).barycentric(p) else {
                continue;
            };
            let score = bary.iter().copied().fold(f64::INFINITY, f64::min);
            match best {
                Some((_, s)) if s >= score => {}
                _ => best = Some((tet, score)),
            }
        }
        best.filter(|(_, s)| *s >= -tol).map(|(tet, _)| tet)
    }

    /// Locates a point lying on `face` within the tetrahedra of `cell`
    /// built on that face.
    fn find_tet_on_face(&self, cell: usize, face: usize, p: Point) -> TetIndices {
        let n = self.faces()[face].size();
        let mut best = (TetIndices::new(cell, face, 0, n), f64::NEG_INFINITY);
        for a in 0..n {
            let tet = TetIndices::new(cell, face, a, n);
            let Some(bary) = self.tet(&tet).barycentric(p) else {
                continue;
            };
            // Coordinate 0 belongs to the cell centre and vanishes on the face
            let score = bary[1].min(bary[2]).min(bary[3]);
            if score > best.1 {
                best = (tet, score);
            }
        }
        best.0
    }

    /// Brute-force search for the cell containing `p`.
    fn find_cell(&self, p: Point, tol: f64) -> Option<usize> {
        (0..self.n_cells()).find(|&cell| {
            let pts: Vec<Point> = self
                .cell_faces(cell)
                .iter()
                .flat_map(|&f| self.labels_of(f).iter().map(|&l| self.points()[l]))
                .collect();
            let (pmin, pmax) = bounding_box(&pts);
            let margin = tol * pmin.distance(&pmax);
            is_point_inside_bbox(p, pmin, pmax, margin) && self.find_tet(cell, p, tol).is_some()
        })
    }
}
