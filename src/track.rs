//! Tracer tracking through polyhedral meshes.
//!
//! [`Tracer::advance`] walks one tracer face by face, [`Cloud`] runs all
//! tracers of a domain, and [`ParallelTracker`] couples decomposed domains
//! through an [`Exchange`].

pub mod boundary;
pub mod cloud;
pub mod config;
pub mod context;
pub mod exchange;
pub mod locate;
pub mod parallel;
pub mod tracer;

pub use cloud::{Cloud, Failure, PassReport};
pub use config::TrackingConfig;
pub use context::TrackingContext;
pub use exchange::{ChannelExchange, Exchange, TransferMessage};
pub use locate::{CellLocator, NearWallSample, near_wall_cells};
pub use parallel::{Domain, DomainTally, ParallelTracker, RunSummary};
pub use tracer::{TrackState, Tracer};
