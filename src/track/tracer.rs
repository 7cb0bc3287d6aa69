//! Tracer particle and its trajectory stepper.
//!
//! A tracer walks the straight segment from its position to its end point
//! through the tetrahedral decomposition of the mesh. Inside a cell it moves
//! freely from tetrahedron to tetrahedron; reaching a mesh face ends the
//! current [`Tracer::advance`] call.

use crate::error::TrackingError;
use crate::id::TracerId;
use crate::mesh::topology::{FACE_SIDE, TetIndices, TopologyView};
use crate::track::boundary::hit_boundary;
use crate::track::config::TrackingConfig;
use crate::track::context::TrackingContext;
use crate::{Point, Vector};
use anyhow::{Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackState {
    /// Still moving towards its end point.
    InCell,
    /// Reached its end point.
    Arrived,
    /// Left through a processor patch. `patch_face` is the patch-local index
    /// of the crossed face.
    Transferred { to_domain: usize, patch_face: usize },
    /// Stopped at a boundary that does not let it continue.
    Discarded,
    /// Tracking failed.
    Lost,
}

impl TrackState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TrackState::InCell)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracer<T> {
    pub(crate) id: TracerId,
    pub(crate) position: Point,
    pub(crate) cell: usize,
    pub(crate) tet: TetIndices,
    pub(crate) end: Point,
    pub(crate) payload: T,
    pub(crate) crossings: usize,
    pub(crate) state: TrackState,
}

impl<T: Clone> Tracer<T> {
    /// Creates a tracer at `position` inside `cell`, heading for `end`.
    pub fn new<M: TopologyView>(
        mesh: &M,
        position: Point,
        cell: usize,
        end: Point,
        payload: T,
        config: &TrackingConfig,
    ) -> Result<Self> {
        if cell >= mesh.n_cells() {
            return Err(anyhow!("Cell {} out of range ({} cells)", cell, mesh.n_cells()));
        }
        let tet = mesh
            .find_tet(cell, position, config.tolerance)
            .ok_or(TrackingError::PointNotInCell {
                cell,
                x: position.x,
                y: position.y,
                z: position.z,
            })?;
        Ok(Self {
            id: TracerId::new(),
            position,
            cell,
            tet,
            end,
            payload,
            crossings: 0,
            state: TrackState::InCell,
        })
    }

    /// Moves the tracer towards its end point.
    ///
    /// Stops at the end point, at the first mesh face, or after covering
    /// `max_track_fraction` of the remaining distance, whichever comes first.
    /// Returns `true` while the tracer should keep going. Arriving records
    /// the payload and end point in `ctx` under the current cell; stopping
    /// at a wall records the payload and the hit point.
    ///
    /// Errors mark the tracer [`TrackState::Lost`].
    pub fn advance<M: TopologyView>(
        &mut self,
        mesh: &M,
        ctx: &mut TrackingContext<T>,
        config: &TrackingConfig,
        max_track_fraction: f64,
    ) -> Result<bool> {
        if self.state.is_terminal() {
            return Ok(false);
        }
        if max_track_fraction.is_nan() || max_track_fraction <= 0. {
            return Err(anyhow!(
                "Track fraction must be positive, got {}",
                max_track_fraction
            ));
        }
        let stop = max_track_fraction.min(1.);
        let disp = self.end - self.position;
        let mut travelled = 0.;
        let mut steps = 0;

        loop {
            let exit = mesh.tet(&self.tet).exit(self.position, disp);
            let (side, lambda) = exit.unwrap_or((FACE_SIDE, f64::INFINITY));

            if travelled + lambda >= stop {
                if stop < 1. {
                    self.position = self.position + (stop - travelled) * disp;
                    return Ok(true);
                }
                self.position = self.end;
                self.state = TrackState::Arrived;
                ctx.record(self.cell, self.payload.clone(), self.end);
                return Ok(false);
            }

            self.position = self.position + lambda * disp;
            travelled += lambda;

            if side != FACE_SIDE {
                steps += 1;
                if steps > config.max_tet_steps {
                    return self.lose(TrackingError::StuckInCell {
                        cell: self.cell,
                        steps,
                    });
                }
                match mesh.tet_neighbour(&self.tet, side) {
                    Some(next) => self.tet = next,
                    None => {
                        return self.lose(TrackingError::StuckInCell {
                            cell: self.cell,
                            steps,
                        });
                    }
                }
                continue;
            }

            self.crossings += 1;
            if self.crossings > config.max_face_crossings {
                return self.lose(TrackingError::CellNotFound {
                    crossings: self.crossings,
                });
            }

            let face = self.tet.face;
            return match mesh.other_cell(face, self.cell) {
                Some(next) => {
                    debug!("Tracer {} crossed face {} into cell {}", self.id, face, next);
                    self.cell = next;
                    self.tet = mesh.find_tet_on_face(next, face, self.position);
                    Ok(true)
                }
                None => hit_boundary(self, mesh, ctx, face),
            };
        }
    }

    /// Re-attaches a tracer at `face` of `cell`, used after it was moved to
    /// a coupled face.
    pub(crate) fn attach<M: TopologyView>(&mut self, mesh: &M, cell: usize, face: usize) {
        self.cell = cell;
        self.tet = mesh.find_tet_on_face(cell, face, self.position);
        self.state = TrackState::InCell;
    }

    pub(crate) fn lose(&mut self, err: TrackingError) -> Result<bool> {
        self.state = TrackState::Lost;
        Err(err.into())
    }
}

impl<T> Tracer<T> {
    pub fn id(&self) -> &TracerId {
        &self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn cell(&self) -> usize {
        self.cell
    }

    pub fn tet(&self) -> TetIndices {
        self.tet
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn crossings(&self) -> usize {
        self.crossings
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    /// Remaining displacement.
    pub fn remaining(&self) -> Vector {
        self.end - self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::block::HexBlock;

    fn run<M: TopologyView>(
        tracer: &mut Tracer<usize>,
        mesh: &M,
        ctx: &mut TrackingContext<usize>,
    ) -> Result<usize> {
        let config = TrackingConfig::new();
        let mut calls = 1;
        while tracer.advance(mesh, ctx, &config, 1.0)? {
            calls += 1;
        }
        Ok(calls)
    }

    #[test]
    fn test_same_cell_arrives_in_one_call() -> Result<()> {
        let mesh = HexBlock::new(Point::origin(), [2., 1., 1.], [2, 1, 1])?.build()?;
        let config = TrackingConfig::new();
        let mut ctx = TrackingContext::new(mesh.n_cells());
        let end = Point::new(0.8, 0.3, 0.7);
        let mut tracer = Tracer::new(&mesh, Point::new(0.2, 0.6, 0.4), 0, end, 7, &config)?;

        assert!(!tracer.advance(&mesh, &mut ctx, &config, 1.0)?);
        assert_eq!(tracer.state(), TrackState::Arrived);
        assert_eq!(tracer.position(), end);
        assert_eq!(ctx.data(0), &[7]);
        assert_eq!(ctx.ends(0), &[end]);
        assert!(ctx.data(1).is_empty());

        // Terminal tracers stay put
        assert!(!tracer.advance(&mesh, &mut ctx, &config, 1.0)?);
        assert_eq!(ctx.len(), 1);
        Ok(())
    }

    #[test]
    fn test_one_call_per_crossing() -> Result<()> {
        let mesh = HexBlock::new(Point::origin(), [4., 1., 1.], [4, 1, 1])?.build()?;
        let config = TrackingConfig::new();
        let mut ctx = TrackingContext::new(mesh.n_cells());
        let mut tracer = Tracer::new(
            &mesh,
            Point::new(0.3, 0.35, 0.6),
            0,
            Point::new(3.6, 0.55, 0.45),
            0,
            &config,
        )?;
        let calls = run(&mut tracer, &mesh, &mut ctx)?;
        assert_eq!(calls, 4);
        assert_eq!(tracer.crossings(), 3);
        assert_eq!(tracer.cell(), 3);
        assert_eq!(ctx.data(3), &[0]);
        Ok(())
    }

    #[test]
    fn test_partial_fraction_keeps_tracer_in_cell() -> Result<()> {
        let mesh = HexBlock::new(Point::origin(), [1., 1., 1.], [1, 1, 1])?.build()?;
        let config = TrackingConfig::new();
        let mut ctx = TrackingContext::new(mesh.n_cells());
        let start = Point::new(0.1, 0.2, 0.3);
        let end = Point::new(0.9, 0.6, 0.5);
        let mut tracer = Tracer::new(&mesh, start, 0, end, 0, &config)?;

        assert!(tracer.advance(&mesh, &mut ctx, &config, 0.5)?);
        assert_eq!(tracer.state(), TrackState::InCell);
        assert!(tracer.position().is_close(&Point::new(0.5, 0.4, 0.4)));
        assert!(ctx.is_empty());

        assert!(!tracer.advance(&mesh, &mut ctx, &config, 1.0)?);
        assert_eq!(tracer.state(), TrackState::Arrived);

        assert!(tracer.advance(&mesh, &mut ctx, &config, 0.).is_ok());
        Ok(())
    }

    #[test]
    fn test_start_outside_cell_is_rejected() -> Result<()> {
        let mesh = HexBlock::new(Point::origin(), [2., 1., 1.], [2, 1, 1])?.build()?;
        let config = TrackingConfig::new();
        let res = Tracer::new(&mesh, Point::new(1.5, 0.5, 0.5), 0, Point::origin(), (), &config);
        let err = res.err().ok_or_else(|| anyhow!("expected an error"))?;
        assert!(matches!(
            err.downcast_ref::<TrackingError>(),
            Some(TrackingError::PointNotInCell { cell: 0, .. })
        ));
        assert!(Tracer::new(&mesh, Point::origin(), 5, Point::origin(), (), &config).is_err());
        Ok(())
    }

    #[test]
    fn test_crossing_limit() -> Result<()> {
        let mesh = HexBlock::new(Point::origin(), [4., 1., 1.], [4, 1, 1])?.build()?;
        let mut config = TrackingConfig::new();
        config.max_face_crossings = 2;
        let mut ctx = TrackingContext::new(mesh.n_cells());
        let mut tracer = Tracer::new(
            &mesh,
            Point::new(0.3, 0.35, 0.6),
            0,
            Point::new(3.6, 0.55, 0.45),
            0,
            &config,
        )?;
        assert!(tracer.advance(&mesh, &mut ctx, &config, 1.0)?);
        assert!(tracer.advance(&mesh, &mut ctx, &config, 1.0)?);
        let err = tracer
            .advance(&mesh, &mut ctx, &config, 1.0)
            .err()
            .ok_or_else(|| anyhow!("expected an error"))?;
        assert_eq!(
            err.downcast_ref::<TrackingError>(),
            Some(&TrackingError::CellNotFound { crossings: 3 })
        );
        assert_eq!(tracer.state(), TrackState::Lost);
        assert!(ctx.is_empty());
        Ok(())
    }
}
