use crate::sync::ContainerDelta;
use thiserror::Error as ThisError;

///
/// TransportError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TransportError {
    #[error("peer {rank} disconnected during exchange")]
    Disconnected { rank: usize },

    #[error("exchange incomplete: no deltas from rank {rank}")]
    Incomplete { rank: usize },
}

///
/// SyncTransport
///
/// Message-passing boundary of the sync protocol. `exchange` is a blocking
/// all-gather: every rank contributes its local deltas and receives every
/// rank's deltas, indexed by rank. Timeouts and retries belong to the
/// transport, not to the round algorithm.
///

pub trait SyncTransport {
    /// This process's rank.
    fn rank(&self) -> usize;

    /// Total number of ranks participating in a round.
    fn ranks(&self) -> usize;

    /// Broadcast `local` and block until every rank's deltas arrived.
    ///
    /// The returned vector has one entry per rank, in rank order, including
    /// this rank's own contribution.
    fn exchange(
        &mut self,
        local: Vec<ContainerDelta>,
    ) -> Result<Vec<Vec<ContainerDelta>>, TransportError>;
}
