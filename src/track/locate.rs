//! Point location by tracking.

use crate::Point;
use crate::mesh::topology::TopologyView;
use crate::track::cloud::Cloud;
use crate::track::config::TrackingConfig;
use crate::track::context::TrackingContext;
use crate::track::tracer::Tracer;
use anyhow::{Result, anyhow};
use log::debug;

/// Answers "which cell contains this point" by walking tracers from a seed
/// cell to each target.
pub struct CellLocator<'a, M> {
    mesh: &'a M,
    config: TrackingConfig,
}

impl<'a, M: TopologyView> CellLocator<'a, M> {
    pub fn new(mesh: &'a M, config: TrackingConfig) -> Self {
        Self { mesh, config }
    }

    /// Locates every target, starting from the centre of `seed_cell`.
    ///
    /// A target the tracer cannot reach along a straight line (a wall in the
    /// way, or a failed walk) falls back to a brute-force search. Targets
    /// outside the mesh give `None`.
    pub fn locate(&self, seed_cell: usize, targets: &[Point]) -> Result<Vec<Option<usize>>> {
        if seed_cell >= self.mesh.n_cells() {
            return Err(anyhow!("Seed cell {} out of range", seed_cell));
        }
        let start = self.mesh.cell_centre(seed_cell);
        let mut cloud = Cloud::new();
        for (i, &target) in targets.iter().enumerate() {
            cloud.add(Tracer::new(self.mesh, start, seed_cell, target, i, &self.config)?);
        }
        let mut ctx = TrackingContext::new(self.mesh.n_cells());
        cloud.track(self.mesh, &mut ctx, &self.config);

        let mut found = vec![None; targets.len()];
        for (cell, &i, _) in ctx.records() {
            // Tracers stopped at a wall are recorded in the cell at the wall
            if self.mesh.find_tet(cell, targets[i], self.config.tolerance).is_some() {
                found[i] = Some(cell);
            }
        }
        for (i, cell) in found.iter_mut().enumerate() {
            if cell.is_none() {
                debug!("Target {} not reached by tracking, searching all cells", i);
                *cell = self.mesh.find_cell(targets[i], self.config.tolerance);
            }
        }
        Ok(found)
    }
}

/// Cell and end point reached from one patch face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearWallSample {
    pub cell: usize,
    pub point: Point,
}

/// Tracks inward from the centre of every face of `patch` by `distance`
/// along the face normal and reports where each tracer ends up.
///
/// Entry `k` belongs to face `k` of the patch. A tracer that meets a wall
/// first ends at the wall. Tracers that fail give `None`.
pub fn near_wall_cells<M: TopologyView>(
    mesh: &M,
    patch: usize,
    distance: f64,
    config: &TrackingConfig,
) -> Result<Vec<Option<NearWallSample>>> {
    let patch = mesh
        .patches()
        .get(patch)
        .ok_or_else(|| anyhow!("Patch {} does not exist", patch))?;

    let mut cloud = Cloud::new();
    for (k, face) in patch.faces().enumerate() {
        let start = mesh.face_centre(face);
        let inward = -mesh.face_normal(face).normalize()?;
        let owner = mesh.owner(face);
        cloud.add(Tracer::new(mesh, start, owner, start + distance * inward, k, config)?);
    }
    let mut ctx = TrackingContext::new(mesh.n_cells());
    cloud.track(mesh, &mut ctx, config);

    let mut samples = vec![None; patch.size];
    for (cell, &k, point) in ctx.records() {
        samples[k] = Some(NearWallSample { cell, point });
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::block::{HexBlock, Side};

    #[test]
    fn test_locate_matches_block_layout() -> Result<()> {
        let mesh = HexBlock::new(Point::origin(), [3., 2., 1.], [3, 2, 1])?.build()?;
        let locator = CellLocator::new(&mesh, TrackingConfig::new());
        let targets = [
            Point::new(0.3, 0.2, 0.5),
            Point::new(2.7, 1.6, 0.3),
            Point::new(1.4, 1.1, 0.9),
            Point::new(5., 0.5, 0.5),
        ];
        let found = locator.locate(0, &targets)?;
        assert_eq!(found, vec![Some(0), Some(5), Some(4), None]);
        assert!(locator.locate(6, &targets).is_err());
        Ok(())
    }

    #[test]
    fn test_near_wall_cells() -> Result<()> {
        let mesh = HexBlock::new(Point::origin(), [1., 1., 3.], [1, 1, 3])?.build()?;
        let config = TrackingConfig::new();
        let samples = near_wall_cells(&mesh, Side::ZMin.index(), 1.5, &config)?;
        assert_eq!(samples.len(), 1);
        let sample = samples[0].ok_or_else(|| anyhow!("no sample"))?;
        assert_eq!(sample.cell, 1);
        assert!(sample.point.is_close(&Point::new(0.5, 0.5, 1.5)));

        // Past the far wall the tracer stops on that wall, in the last cell
        let samples = near_wall_cells(&mesh, Side::ZMax.index(), 4., &config)?;
        let sample = samples[0].ok_or_else(|| anyhow!("no sample"))?;
        assert_eq!(sample.cell, 0);
        assert!(sample.point.is_close(&Point::new(0.5, 0.5, 0.)));
        assert_eq!(mesh.find_cell(sample.point, config.tolerance), Some(sample.cell));
        assert!(near_wall_cells(&mesh, 9, 1., &config).is_err());
        Ok(())
    }
}
