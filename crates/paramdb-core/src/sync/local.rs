use crate::sync::{
    ContainerDelta,
    transport::{SyncTransport, TransportError},
};
use std::sync::mpsc::{Receiver, Sender, channel};

type Envelope = (u64, usize, Vec<ContainerDelta>);

///
/// LocalTransport
///
/// In-process channel-backed transport: one endpoint per simulated rank,
/// fully implementing the blocking all-gather contract. Used by the test
/// suite and by single-machine multi-threaded runs.
///

#[derive(Debug)]
pub struct LocalTransport {
    rank: usize,
    round: u64,
    peers: Vec<Sender<Envelope>>,
    inbox: Receiver<Envelope>,
    /// Messages from peers that already advanced to a later round.
    stash: Vec<Envelope>,
}

/// Create one linked endpoint per rank.
#[must_use]
pub fn local_transports(ranks: usize) -> Vec<LocalTransport> {
    let mut senders = Vec::with_capacity(ranks);
    let mut inboxes = Vec::with_capacity(ranks);

    for _ in 0..ranks {
        let (tx, rx) = channel();
        senders.push(tx);
        inboxes.push(rx);
    }

    inboxes
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| LocalTransport {
            rank,
            round: 0,
            peers: senders.clone(),
            inbox,
            stash: Vec::new(),
        })
        .collect()
}

impl LocalTransport {
    fn take_stashed(&mut self, round: u64) -> Vec<Envelope> {
        let mut current = Vec::new();
        let mut keep = Vec::new();

        for envelope in self.stash.drain(..) {
            if envelope.0 == round {
                current.push(envelope);
            } else {
                keep.push(envelope);
            }
        }
        self.stash = keep;

        current
    }
}

impl SyncTransport for LocalTransport {
    fn rank(&self) -> usize {
        self.rank
    }

    fn ranks(&self) -> usize {
        self.peers.len()
    }

    fn exchange(
        &mut self,
        local: Vec<ContainerDelta>,
    ) -> Result<Vec<Vec<ContainerDelta>>, TransportError> {
        self.round += 1;
        let round = self.round;
        let ranks = self.peers.len();

        for (peer, tx) in self.peers.iter().enumerate() {
            if peer == self.rank {
                continue;
            }
            tx.send((round, self.rank, local.clone()))
                .map_err(|_| TransportError::Disconnected { rank: peer })?;
        }

        let mut all: Vec<Option<Vec<ContainerDelta>>> = (0..ranks).map(|_| None).collect();
        all[self.rank] = Some(local);
        let mut pending = ranks - 1;

        for (_, peer, deltas) in self.take_stashed(round) {
            all[peer] = Some(deltas);
            pending -= 1;
        }

        while pending > 0 {
            let envelope = self
                .inbox
                .recv()
                .map_err(|_| TransportError::Disconnected { rank: self.rank })?;

            // A faster peer may already be in a later round; hold its
            // message until we get there.
            if envelope.0 == round {
                all[envelope.1] = Some(envelope.2);
                pending -= 1;
            } else {
                self.stash.push(envelope);
            }
        }

        all.into_iter()
            .enumerate()
            .map(|(rank, slot)| slot.ok_or(TransportError::Incomplete { rank }))
            .collect()
    }
}
