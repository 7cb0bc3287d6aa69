//! Active tracers of one domain.

use crate::id::TracerId;
use crate::mesh::topology::TopologyView;
use crate::track::config::TrackingConfig;
use crate::track::context::TrackingContext;
use crate::track::tracer::{TrackState, Tracer};
use anyhow::Error;
use log::warn;

/// A tracer that could not be tracked.
#[derive(Debug)]
pub struct Failure {
    pub id: TracerId,
    pub error: Error,
}

/// Outcome of one local pass over a cloud.
#[derive(Debug)]
pub struct PassReport<T> {
    pub arrived: Vec<Tracer<T>>,
    pub discarded: Vec<Tracer<T>>,
    /// Tracers that left through a processor patch, still carrying their
    /// [`TrackState::Transferred`] state.
    pub outgoing: Vec<Tracer<T>>,
    pub failures: Vec<Failure>,
}

impl<T> PassReport<T> {
    fn new() -> Self {
        Self {
            arrived: Vec::new(),
            discarded: Vec::new(),
            outgoing: Vec::new(),
            failures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cloud<T> {
    tracers: Vec<Tracer<T>>,
}

impl<T> Default for Cloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cloud<T> {
    pub fn new() -> Self {
        Self {
            tracers: Vec::new(),
        }
    }

    pub fn add(&mut self, tracer: Tracer<T>) {
        self.tracers.push(tracer);
    }

    pub fn len(&self) -> usize {
        self.tracers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracers.is_empty()
    }

    pub fn tracers(&self) -> &[Tracer<T>] {
        &self.tracers
    }
}

impl<T: Clone> Cloud<T> {
    /// Tracks every tracer one at a time until it arrives, stops or leaves
    /// the domain. The cloud is empty afterwards.
    pub fn track<M: TopologyView>(
        &mut self,
        mesh: &M,
        ctx: &mut TrackingContext<T>,
        config: &TrackingConfig,
    ) -> PassReport<T> {
        let mut report = PassReport::new();
        for mut tracer in self.tracers.drain(..) {
            let result = loop {
                match tracer.advance(mesh, ctx, config, 1.0) {
                    Ok(true) => continue,
                    Ok(false) => break Ok(()),
                    Err(e) => break Err(e),
                }
            };
            if let Err(error) = result {
                warn!("Tracer {} lost in cell {}: {}", tracer.id(), tracer.cell(), error);
                report.failures.push(Failure {
                    id: tracer.id().clone(),
                    error,
                });
                continue;
            }
            match tracer.state() {
                TrackState::Arrived => report.arrived.push(tracer),
                TrackState::Discarded => report.discarded.push(tracer),
                TrackState::Transferred { .. } => report.outgoing.push(tracer),
                TrackState::InCell | TrackState::Lost => {}
            }
        }
        report
    }
}
