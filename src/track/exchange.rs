//! Message passing between domains.
//!
//! Tracers cross domains only as serialized [`TransferMessage`]s; nothing
//! is shared by reference.

use crate::track::tracer::{TrackState, Tracer};
use anyhow::{Result, anyhow};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{Receiver, Sender, channel};

/// Point-to-point byte transport between domains.
///
/// Sent messages may be held back until [`Exchange::flush`]. After every
/// domain has flushed, [`Exchange::receive_all`] returns everything
/// addressed to this domain.
pub trait Exchange {
    /// Index of the domain this endpoint belongs to.
    fn domain(&self) -> usize;

    fn n_domains(&self) -> usize;

    fn send(&mut self, destination: usize, bytes: Vec<u8>) -> Result<()>;

    fn flush(&mut self) -> Result<()>;

    fn receive_all(&mut self) -> Result<Vec<Vec<u8>>>;
}

/// In-process exchange over `std::sync::mpsc` channels.
#[derive(Debug)]
pub struct ChannelExchange {
    domain: usize,
    senders: Vec<Sender<Vec<u8>>>,
    receiver: Receiver<Vec<u8>>,
    pending: Vec<(usize, Vec<u8>)>,
}

impl ChannelExchange {
    /// Creates `n` endpoints, all connected to each other.
    pub fn connected(n: usize) -> Vec<ChannelExchange> {
        let (senders, receivers): (Vec<_>, Vec<_>) = (0..n).map(|_| channel()).unzip();
        receivers
            .into_iter()
            .enumerate()
            .map(|(domain, receiver)| ChannelExchange {
                domain,
                senders: senders.clone(),
                receiver,
                pending: Vec::new(),
            })
            .collect()
    }
}

impl Exchange for ChannelExchange {
    fn domain(&self) -> usize {
        self.domain
    }

    fn n_domains(&self) -> usize {
        self.senders.len()
    }

    fn send(&mut self, destination: usize, bytes: Vec<u8>) -> Result<()> {
        if destination >= self.senders.len() {
            return Err(anyhow!(
                "Domain {} cannot send to domain {} ({} domains)",
                self.domain,
                destination,
                self.senders.len()
            ));
        }
        self.pending.push((destination, bytes));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        for (destination, bytes) in self.pending.drain(..) {
            self.senders[destination]
                .send(bytes)
                .map_err(|_| anyhow!("Domain {} is no longer receiving", destination))?;
        }
        Ok(())
    }

    fn receive_all(&mut self) -> Result<Vec<Vec<u8>>> {
        Ok(self.receiver.try_iter().collect())
    }
}

/// A tracer in transit, with the processor face it left through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferMessage<T> {
    pub from_domain: usize,
    /// Patch-local index of the crossed processor face. The receiving patch
    /// uses the same index.
    pub patch_face: usize,
    pub tracer: Tracer<T>,
}

impl<T: Serialize + DeserializeOwned> TransferMessage<T> {
    /// Wraps a tracer that left `from_domain` through a processor patch.
    pub fn new(from_domain: usize, tracer: Tracer<T>) -> Result<(usize, Self)> {
        let TrackState::Transferred {
            to_domain,
            patch_face,
        } = tracer.state()
        else {
            return Err(anyhow!(
                "Tracer {} is not leaving its domain ({:?})",
                tracer.id(),
                tracer.state()
            ));
        };
        Ok((
            to_domain,
            Self {
                from_domain,
                patch_face,
                tracer,
            },
        ))
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use crate::mesh::block::HexBlock;
    use crate::mesh::topology::TopologyView;
    use crate::track::config::TrackingConfig;
    use crate::track::context::TrackingContext;

    #[test]
    fn test_sends_wait_for_flush() -> Result<()> {
        let mut ends = ChannelExchange::connected(3);
        assert_eq!(ends[1].n_domains(), 3);
        ends[0].send(2, vec![1, 2, 3])?;
        ends[1].send(2, vec![4])?;
        assert!(ends[0].send(3, vec![]).is_err());
        assert!(ends[2].receive_all()?.is_empty());

        ends[0].flush()?;
        ends[1].flush()?;
        let mut got = ends[2].receive_all()?;
        got.sort();
        assert_eq!(got, vec![vec![1, 2, 3], vec![4]]);
        assert!(ends[0].receive_all()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_message_is_bit_exact() -> Result<()> {
        let blocks = HexBlock::new(Point::origin(), [2., 1., 1.], [2, 1, 1])?.decompose_x(2)?;
        let mesh = blocks[0].build()?;
        let config = TrackingConfig::new();
        let mut ctx = TrackingContext::new(mesh.n_cells());
        let end = Point::new(1.0 + 1. / 3., 0.1 + 0.2, std::f64::consts::FRAC_1_SQRT_2);
        let mut tracer = Tracer::new(&mesh, Point::new(0.1, 0.7, 0.3), 0, end, 0.1_f64, &config)?;
        while tracer.advance(&mesh, &mut ctx, &config, 1.0)? {}

        let (to, msg) = TransferMessage::new(0, tracer.clone())?;
        assert_eq!(to, 1);
        let back = TransferMessage::<f64>::decode(&msg.encode()?)?;
        assert_eq!(back, msg);
        assert_eq!(back.tracer.position().x.to_bits(), tracer.position().x.to_bits());
        assert_eq!(back.tracer.end().z.to_bits(), end.z.to_bits());
        assert_eq!(back.tracer.payload().to_bits(), 0.1_f64.to_bits());
        assert_eq!(back.tracer.id(), tracer.id());

        let fresh = Tracer::new(&mesh, Point::new(0.1, 0.7, 0.3), 0, end, 0.1_f64, &config)?;
        assert!(TransferMessage::new(0, fresh).is_err());
        Ok(())
    }
}
