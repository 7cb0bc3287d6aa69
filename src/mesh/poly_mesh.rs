//! Owner/neighbour polyhedral mesh.
//!
//! Faces are stored in one shared label array. Internal faces come first,
//! followed by boundary faces grouped into contiguous patches. Each face's
//! normal points out of its owner cell.

use crate::geom::VSMALL;
use crate::geom::face::Face;
use crate::mesh::patch::{Patch, PatchKind};
use crate::mesh::topology::TopologyView;
use crate::{Point, Vector};
use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct PolyMesh {
    points: Vec<Point>,
    face_labels: Vec<usize>,
    faces: Vec<Face>,
    owner: Vec<usize>,
    neighbour: Vec<usize>,
    patches: Vec<Patch>,
    cell_faces: Vec<Vec<usize>>,
    face_centres: Vec<Point>,
    face_normals: Vec<Vector>,
    cell_centres: Vec<Point>,
    cell_volumes: Vec<f64>,
}

impl PolyMesh {
    /// Builds a mesh and computes its face and cell geometry.
    ///
    /// `neighbour` holds one entry per internal face. Patches must cover the
    /// boundary faces in order without gaps.
    pub fn new(
        points: Vec<Point>,
        face_labels: Vec<usize>,
        faces: Vec<Face>,
        owner: Vec<usize>,
        neighbour: Vec<usize>,
        patches: Vec<Patch>,
    ) -> Result<Self> {
        let n_faces = faces.len();
        if owner.len() != n_faces {
            return Err(anyhow!(
                "Owner list has {} entries for {} faces",
                owner.len(),
                n_faces
            ));
        }
        if neighbour.len() > n_faces {
            return Err(anyhow!(
                "Neighbour list has {} entries for {} faces",
                neighbour.len(),
                n_faces
            ));
        }
        for (i, f) in faces.iter().enumerate() {
            f.view(&face_labels, &points)
                .with_context(|| format!("Invalid face {}", i))?;
        }
        for (i, (&o, &n)) in owner.iter().zip(&neighbour).enumerate() {
            if o == n {
                return Err(anyhow!("Internal face {} has owner == neighbour == {}", i, o));
            }
        }

        let n_cells = owner
            .iter()
            .chain(&neighbour)
            .copied()
            .max()
            .map(|c| c + 1)
            .ok_or_else(|| anyhow!("Mesh has no faces"))?;

        check_patches(&patches, neighbour.len(), n_faces)?;

        let mut cell_faces = vec![Vec::new(); n_cells];
        for (i, &o) in owner.iter().enumerate() {
            cell_faces[o].push(i);
        }
        for (i, &n) in neighbour.iter().enumerate() {
            cell_faces[n].push(i);
        }
        if let Some(c) = cell_faces.iter().position(|f| f.len() < 4) {
            return Err(anyhow!("Cell {} has {} faces, at least 4 needed", c, cell_faces[c].len()));
        }

        let mut mesh = Self {
            points,
            face_labels,
            faces,
            owner,
            neighbour,
            patches,
            cell_faces,
            face_centres: Vec::new(),
            face_normals: Vec::new(),
            cell_centres: Vec::new(),
            cell_volumes: Vec::new(),
        };
        mesh.update_geometry()?;
        Ok(mesh)
    }

    /// Replaces the boundary patches, keeping points and connectivity.
    pub fn with_patches(mut self, patches: Vec<Patch>) -> Result<Self> {
        check_patches(&patches, self.neighbour.len(), self.faces.len())?;
        self.patches = patches;
        Ok(self)
    }

    fn update_geometry(&mut self) -> Result<()> {
        let mut centres = Vec::with_capacity(self.faces.len());
        let mut normals = Vec::with_capacity(self.faces.len());
        for f in &self.faces {
            let view = f.view(&self.face_labels, &self.points)?;
            centres.push(view.centroid());
            normals.push(view.normal());
        }
        self.face_centres = centres;
        self.face_normals = normals;

        let (cc, vols): (Vec<Point>, Vec<f64>) = (0..self.cell_faces.len())
            .map(|c| self.cell_centre_and_volume(c))
            .unzip();
        self.cell_centres = cc;
        self.cell_volumes = vols;
        Ok(())
    }

    /// Pyramid decomposition around the average of the face centres.
    fn cell_centre_and_volume(&self, cell: usize) -> (Point, f64) {
        let fcs: Vec<Point> = self.cell_faces[cell]
            .iter()
            .map(|&f| self.face_centres[f])
            .collect();
        let estimate = Point::average(&fcs);

        let mut sum_vol = 0.;
        let mut sum_vc = Vector::zero();
        for &f in &self.cell_faces[cell] {
            let mut area = 0.5 * self.face_normals[f];
            if self.owner[f] != cell {
                area = -area;
            }
            let d = self.face_centres[f] - estimate;
            let pyr3_vol = area.dot(&d).max(VSMALL);
            // Pyramid centroid sits at 3/4 of the way towards the base
            sum_vc += pyr3_vol * (0.75 * d);
            sum_vol += pyr3_vol;
        }
        if sum_vol.abs() <= VSMALL {
            return (estimate, 0.);
        }
        (estimate + sum_vc / sum_vol, sum_vol / 3.)
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }

    pub fn cell_volume(&self, cell: usize) -> f64 {
        self.cell_volumes[cell]
    }

    pub fn cell_volumes(&self) -> &[f64] {
        &self.cell_volumes
    }

    pub fn total_volume(&self) -> f64 {
        self.cell_volumes.iter().sum()
    }

    pub fn face_area(&self, face: usize) -> f64 {
        0.5 * self.face_normals[face].length()
    }

    /// Patch-local face `k` of `patch` as a mesh face index.
    pub fn patch_face(&self, patch: usize, k: usize) -> Option<usize> {
        let p = self.patches.get(patch)?;
        (k < p.size).then(|| p.start + k)
    }

    /// Checks that every face normal points away from its owner centre.
    pub fn check_orientation(&self) -> Result<()> {
        for (f, &o) in self.owner.iter().enumerate() {
            let d = self.face_centres[f] - self.cell_centres[o];
            if self.face_normals[f].dot(&d) <= 0. {
                return Err(anyhow!("Face {} points into its owner cell {}", f, o));
            }
        }
        Ok(())
    }

    /// Volume swept by every face when points move from `old` to `new`.
    pub fn face_swept_volumes(&self, old: &[Point], new: &[Point]) -> Result<Vec<f64>> {
        self.faces
            .iter()
            .map(|f| f.swept_volume(&self.face_labels, old, new))
            .collect()
    }

    /// Moves the mesh points and returns the volume swept by each face.
    pub fn move_points(&mut self, new_points: Vec<Point>) -> Result<Vec<f64>> {
        let swept = self.face_swept_volumes(&self.points, &new_points)?;
        self.points = new_points;
        self.update_geometry()?;
        Ok(swept)
    }
}

fn check_patches(patches: &[Patch], n_internal: usize, n_faces: usize) -> Result<()> {
    let mut next = n_internal;
    for (i, p) in patches.iter().enumerate() {
        if p.start != next {
            return Err(anyhow!(
                "Patch '{}' starts at face {}, expected {}",
                p.name,
                p.start,
                next
            ));
        }
        next = p.start + p.size;
        if let PatchKind::Cyclic { neighbour_patch, .. } = p.kind {
            let other = patches.get(neighbour_patch).ok_or_else(|| {
                anyhow!("Cyclic patch '{}' refers to missing patch {}", p.name, neighbour_patch)
            })?;
            if neighbour_patch == i || other.size != p.size {
                return Err(anyhow!(
                    "Cyclic patch '{}' does not match its neighbour '{}'",
                    p.name,
                    other.name
                ));
            }
        }
    }
    if next != n_faces {
        return Err(anyhow!(
            "Patches cover faces up to {}, mesh has {} faces",
            next,
            n_faces
        ));
    }
    Ok(())
}

impl TopologyView for PolyMesh {
    fn points(&self) -> &[Point] {
        &self.points
    }

    fn face_labels(&self) -> &[usize] {
        &self.face_labels
    }

    fn faces(&self) -> &[Face] {
        &self.faces
    }

    fn n_cells(&self) -> usize {
        self.cell_faces.len()
    }

    fn n_internal_faces(&self) -> usize {
        self.neighbour.len()
    }

    fn owner(&self, face: usize) -> usize {
        self.owner[face]
    }

    fn neighbour(&self, face: usize) -> Option<usize> {
        self.neighbour.get(face).copied()
    }

    fn cell_faces(&self, cell: usize) -> &[usize] {
        &self.cell_faces[cell]
    }

    fn patches(&self) -> &[Patch] {
        &self.patches
    }

    fn patch_id(&self, face: usize) -> Option<usize> {
        if face < self.neighbour.len() {
            return None;
        }
        self.patches.iter().position(|p| p.faces().contains(&face))
    }

    fn face_centre(&self, face: usize) -> Point {
        self.face_centres[face]
    }

    fn face_normal(&self, face: usize) -> Vector {
        self.face_normals[face]
    }

    fn cell_centre(&self, cell: usize) -> Point {
        self.cell_centres[cell]
    }
}
