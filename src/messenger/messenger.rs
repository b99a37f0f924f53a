// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crossbeam_channel::{Receiver, RecvError, Sender, TrySendError};
use tracing::{debug, warn};

use crate::data::{Entry, Metadata, RawInputMap, Record, Wire};
use crate::graph::NodeId;

use super::queue::TerminationFlag;

/// The interface a task loop drives once per iteration (§4.3 / §4.4):
/// publish this node's own output, forward an unmodified map through a
/// passthrough node, or fetch the next map off the single upstream queue.
/// Realtime and batch scheduling share this interface and differ only in
/// whether a full downstream queue blocks or drops (Q6); sentinels always
/// block in both, since they must never be lost.
pub trait Messenger: Send {
    /// Blocks on the single upstream queue, folds the result into the
    /// running raw-input map, and returns this node's declared parents'
    /// entries in parent order (§3). Must not be called on a producer,
    /// which has no upstream queue.
    fn receive(&mut self) -> Vec<Entry>;

    /// Records this node's own output into the running map and forwards it
    /// downstream.
    fn publish(&mut self, record: Record, metadata: Metadata);

    /// Forwards the running map unchanged — used by a consumer that still
    /// has descendants in the topological order (§4.4).
    fn passthrough(&mut self);

    fn publish_sentinel(&mut self);

    fn passthrough_sentinel(&mut self);

    /// Non-blocking poll of the shared termination flag (§4.4, §4.8).
    fn check_termination(&self) -> bool;

    /// The running raw-input map as of the last `receive`, exposed for the
    /// trailing metadata consumer (§4.7), which reads every node's
    /// [`Metadata`] instead of a payload.
    fn last_map(&self) -> &RawInputMap;
}

/// Bookkeeping shared by both scheduling variants: this node's identity, its
/// declared parents (for `receive`'s projection), the queue pair, and the
/// running raw-input map threaded along the chain.
struct Shared {
    node: NodeId,
    parents: Vec<NodeId>,
    input: Option<Receiver<RawInputMap>>,
    output: Option<Sender<RawInputMap>>,
    last_map: RawInputMap,
    termination: TerminationFlag,
}

impl Shared {
    fn new(
        node: NodeId,
        parents: Vec<NodeId>,
        input: Option<Receiver<RawInputMap>>,
        output: Option<Sender<RawInputMap>>,
        termination: TerminationFlag,
    ) -> Self {
        Shared {
            node,
            parents,
            input,
            output,
            last_map: RawInputMap::new(),
            termination,
        }
    }

    fn recv_blocking(&mut self) -> Vec<Entry> {
        let input = self
            .input
            .as_ref()
            .expect("receive() called on a node with no upstream queue");
        match input.recv() {
            Ok(map) => self.last_map = map,
            Err(RecvError) => {
                warn!(
                    node = %self.node,
                    "upstream queue disconnected without a sentinel, synthesizing one"
                );
                self.last_map.insert(self.node, Entry::sentinel());
            }
        }
        self.last_map.entries_for(&self.parents)
    }

    fn insert_own(&mut self, record: Record, metadata: Metadata) {
        self.last_map
            .insert(self.node, Entry::record(Wire::Record(record), metadata));
    }

    fn insert_own_sentinel(&mut self) {
        self.last_map.insert(self.node, Entry::sentinel());
    }
}

fn try_send(output: &Option<Sender<RawInputMap>>, node: NodeId, map: &RawInputMap) {
    if let Some(sender) = output {
        match sender.try_send(map.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(node = %node, "downstream queue full, dropping record (realtime mode)");
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!(node = %node, "downstream queue disconnected, dropping record");
            }
        }
    }
}

fn blocking_send(output: &Option<Sender<RawInputMap>>, node: NodeId, map: &RawInputMap) {
    if let Some(sender) = output {
        if sender.send(map.clone()).is_err() {
            debug!(node = %node, "downstream queue disconnected while sending");
        }
    }
}

/// Lossy scheduling: a full downstream queue is dropped rather than blocked
/// on, since staleness is worse than loss for a live stream. Sentinels are
/// the one exception — they always block.
pub struct RealtimeMessenger(Shared);

impl RealtimeMessenger {
    pub fn new(
        node: NodeId,
        parents: Vec<NodeId>,
        input: Option<Receiver<RawInputMap>>,
        output: Option<Sender<RawInputMap>>,
        termination: TerminationFlag,
    ) -> Self {
        RealtimeMessenger(Shared::new(node, parents, input, output, termination))
    }
}

impl Messenger for RealtimeMessenger {
    fn receive(&mut self) -> Vec<Entry> {
        self.0.recv_blocking()
    }

    fn publish(&mut self, record: Record, metadata: Metadata) {
        self.0.insert_own(record, metadata);
        try_send(&self.0.output, self.0.node, &self.0.last_map);
    }

    fn passthrough(&mut self) {
        try_send(&self.0.output, self.0.node, &self.0.last_map);
    }

    fn publish_sentinel(&mut self) {
        self.0.insert_own_sentinel();
        blocking_send(&self.0.output, self.0.node, &self.0.last_map);
    }

    fn passthrough_sentinel(&mut self) {
        blocking_send(&self.0.output, self.0.node, &self.0.last_map);
    }

    fn check_termination(&self) -> bool {
        self.0.termination.is_set()
    }

    fn last_map(&self) -> &RawInputMap {
        &self.0.last_map
    }
}

/// Lossless scheduling: publishing blocks until the downstream queue has
/// space, back-pressuring the whole pipeline onto its slowest node. Correct
/// for deterministic replay of recorded input, where loss is worse than
/// staleness.
pub struct BatchMessenger(Shared);

impl BatchMessenger {
    pub fn new(
        node: NodeId,
        parents: Vec<NodeId>,
        input: Option<Receiver<RawInputMap>>,
        output: Option<Sender<RawInputMap>>,
        termination: TerminationFlag,
    ) -> Self {
        BatchMessenger(Shared::new(node, parents, input, output, termination))
    }
}

impl Messenger for BatchMessenger {
    fn receive(&mut self) -> Vec<Entry> {
        self.0.recv_blocking()
    }

    fn publish(&mut self, record: Record, metadata: Metadata) {
        self.0.insert_own(record, metadata);
        blocking_send(&self.0.output, self.0.node, &self.0.last_map);
    }

    fn passthrough(&mut self) {
        blocking_send(&self.0.output, self.0.node, &self.0.last_map);
    }

    fn publish_sentinel(&mut self) {
        self.0.insert_own_sentinel();
        blocking_send(&self.0.output, self.0.node, &self.0.last_map);
    }

    fn passthrough_sentinel(&mut self) {
        blocking_send(&self.0.output, self.0.node, &self.0.last_map);
    }

    fn check_termination(&self) -> bool {
        self.0.termination.is_set()
    }

    fn last_map(&self) -> &RawInputMap {
        &self.0.last_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Metadata;

    fn node(n: usize) -> NodeId {
        // NodeId's inner field is `pub(crate)`, so tests inside the crate
        // can build one directly without going through `Graph::add_node`.
        NodeId(n)
    }

    #[test]
    fn realtime_drops_on_full_queue() {
        let (tx, rx) = super::super::queue::edge::<RawInputMap>(1);
        let producer = node(0);
        let consumer = node(1);
        let mut upstream =
            RealtimeMessenger::new(producer, vec![], None, Some(tx), TerminationFlag::new());

        upstream.publish(Record::new(1u32), Metadata::default());
        upstream.publish(Record::new(2u32), Metadata::default());

        let mut downstream = RealtimeMessenger::new(
            consumer,
            vec![producer],
            Some(rx),
            None,
            TerminationFlag::new(),
        );
        let entries = downstream.receive();
        let got = entries[0].wire.as_record().unwrap().downcast_ref::<u32>().copied();
        assert_eq!(got, Some(1));
    }

    #[test]
    fn batch_blocks_until_drained() {
        let (tx, rx) = super::super::queue::edge::<RawInputMap>(1);
        let producer = node(0);
        let consumer = node(1);
        let mut upstream =
            BatchMessenger::new(producer, vec![], None, Some(tx), TerminationFlag::new());
        let mut downstream = BatchMessenger::new(
            consumer,
            vec![producer],
            Some(rx),
            None,
            TerminationFlag::new(),
        );

        upstream.publish(Record::new(1u32), Metadata::default());
        let handle = std::thread::spawn(move || {
            upstream.publish(Record::new(2u32), Metadata::default());
            upstream
        });

        let first = downstream.receive();
        assert_eq!(
            first[0].wire.as_record().unwrap().downcast_ref::<u32>().copied(),
            Some(1)
        );
        handle.join().unwrap();

        let second = downstream.receive();
        assert_eq!(
            second[0].wire.as_record().unwrap().downcast_ref::<u32>().copied(),
            Some(2)
        );
    }
}
