//! Tracking across decomposed meshes in synchronized rounds.
//!
//! Each round runs the local pass of every domain, sends the tracers that
//! left through processor patches, and then delivers them. All domains
//! finish their pass before anything is received, so a tracer is owned by
//! exactly one domain at any time. Rounds stop once no tracer is in flight.

use crate::error::TrackingError;
use crate::mesh::topology::TopologyView;
use crate::track::boundary::receive_from_processor;
use crate::track::cloud::{Cloud, Failure};
use crate::track::config::TrackingConfig;
use crate::track::context::TrackingContext;
use crate::track::exchange::{Exchange, TransferMessage};
use crate::track::tracer::Tracer;
use anyhow::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// One subdomain: its mesh, active tracers, results and exchange endpoint.
pub struct Domain<M, T, E> {
    pub mesh: M,
    pub cloud: Cloud<T>,
    pub ctx: TrackingContext<T>,
    pub exchange: E,
}

impl<M: TopologyView, T, E: Exchange> Domain<M, T, E> {
    pub fn new(mesh: M, exchange: E) -> Self {
        let ctx = TrackingContext::new(mesh.n_cells());
        Self {
            mesh,
            cloud: Cloud::new(),
            ctx,
            exchange,
        }
    }
}

#[derive(Debug, Default)]
pub struct DomainTally {
    pub arrived: usize,
    pub discarded: usize,
    pub sent: usize,
    pub received: usize,
    pub failures: Vec<Failure>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub rounds: usize,
    /// Per-domain counts, indexed by domain.
    pub domains: Vec<DomainTally>,
}

impl RunSummary {
    pub fn arrived(&self) -> usize {
        self.domains.iter().map(|d| d.arrived).sum()
    }

    pub fn discarded(&self) -> usize {
        self.domains.iter().map(|d| d.discarded).sum()
    }

    pub fn transfers(&self) -> usize {
        self.domains.iter().map(|d| d.sent).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &Failure)> + '_ {
        self.domains
            .iter()
            .enumerate()
            .flat_map(|(d, t)| t.failures.iter().map(move |f| (d, f)))
    }
}

pub struct ParallelTracker<M, T, E> {
    pub domains: Vec<Domain<M, T, E>>,
    pub config: TrackingConfig,
}

impl<M, T, E> ParallelTracker<M, T, E>
where
    M: TopologyView + Sync + Send,
    T: Clone + Send + Serialize + DeserializeOwned,
    E: Exchange + Send,
{
    pub fn new(domains: Vec<Domain<M, T, E>>, config: TrackingConfig) -> Self {
        Self { domains, config }
    }

    /// Runs rounds until no tracer is left in flight.
    ///
    /// Failed tracers are reported in the summary and do not stop the run.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut tallies: Vec<DomainTally> = (0..self.domains.len())
            .map(|_| DomainTally::default())
            .collect();
        let config = &self.config;

        for round in 1..=config.max_rounds {
            // Local passes are independent within a round
            let passes: Vec<Result<()>> = self
                .domains
                .par_iter_mut()
                .zip(tallies.par_iter_mut())
                .enumerate()
                .map(|(d, (domain, tally))| domain.local_pass(d, config, tally))
                .collect();
            for (d, pass) in passes.into_iter().enumerate() {
                pass.with_context(|| format!("Local pass failed on domain {}", d))?;
            }

            // Barrier: every domain has flushed, deliver the messages
            let mut in_flight = 0;
            let pairs = self.domains.iter_mut().zip(tallies.iter_mut());
            for (d, (domain, tally)) in pairs.enumerate() {
                let received = domain.receive(d, tally)?;
                tally.received += received;
                in_flight += received;
            }
            info!("Round {}: {} tracer(s) in flight", round, in_flight);

            if in_flight == 0 {
                return Ok(RunSummary {
                    rounds: round,
                    domains: tallies,
                });
            }
        }
        warn!("Tracking still active after {} rounds", config.max_rounds);
        Err(TrackingError::RoundLimit {
            rounds: config.max_rounds,
        }
        .into())
    }
}

impl<M, T, E> Domain<M, T, E>
where
    M: TopologyView,
    T: Clone + Serialize + DeserializeOwned,
    E: Exchange,
{
    fn local_pass(
        &mut self,
        d: usize,
        config: &TrackingConfig,
        tally: &mut DomainTally,
    ) -> Result<()> {
        let report = self.cloud.track(&self.mesh, &mut self.ctx, config);
        tally.arrived += report.arrived.len();
        tally.discarded += report.discarded.len();
        tally.failures.extend(report.failures);
        for tracer in report.outgoing {
            let (to, msg) = TransferMessage::new(d, tracer)?;
            self.exchange.send(to, msg.encode()?)?;
            tally.sent += 1;
        }
        self.exchange.flush()
    }

    fn receive(&mut self, d: usize, tally: &mut DomainTally) -> Result<usize> {
        let mut count = 0;
        for bytes in self.exchange.receive_all()? {
            let msg = TransferMessage::<T>::decode(&bytes)?;
            let mut tracer: Tracer<T> = msg.tracer;
            let received =
                receive_from_processor(&mut tracer, &self.mesh, d, msg.from_domain, msg.patch_face);
            if let Err(error) = received {
                warn!("Tracer {} could not enter domain {}: {}", tracer.id(), d, error);
                tally.failures.push(Failure {
                    id: tracer.id().clone(),
                    error,
                });
                continue;
            }
            self.cloud.add(tracer);
            count += 1;
        }
        Ok(count)
    }
}
