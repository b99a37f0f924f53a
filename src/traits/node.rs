// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::data::Record;
use crate::graph::DevicePreference;

/// Errors raised from user code are boxed rather than threaded through a
/// crate-specific type, since the engine cannot know what error types a
/// concrete producer/processor/consumer implementation wants to raise.
pub type NodeError = Box<dyn std::error::Error + Send + Sync>;

/// Lifecycle hooks shared by every node kind (§6). Both are optional; the
/// default no-op implementations match the common case of a node with no
/// resources to acquire.
pub trait Lifecycle: Send {
    /// Called by the owning worker before the first call to
    /// `next`/`process`/`consume`. Use this to open files, connections,
    /// or other resources that live for the life of the task.
    fn open(&mut self) -> Result<(), NodeError> {
        Ok(())
    }

    /// Called by the owning worker after the loop terminates (natural
    /// end-of-stream or external stop). Use this to release whatever `open`
    /// acquired.
    fn close(&mut self) -> Result<(), NodeError> {
        Ok(())
    }
}

/// A source node: produces records, has no parents.
pub trait Producer: Lifecycle {
    /// Returns the next produced record, or `Ok(None)` to signal
    /// end-of-stream. An `Err` is fatal to this worker (§7): the worker logs
    /// it, publishes no record, and propagates the sentinel as though
    /// end-of-stream had been reached naturally.
    fn next(&mut self) -> Result<Option<Record>, NodeError>;
}

/// A transform node: consumes the outputs of its declared parents (in
/// parent-declaration order) and produces one output record.
///
/// `process` takes `&self`, not `&mut self`: a processor's task loop may run
/// concurrently across replicas (§4.5), so any node-local mutable state must
/// be interior-mutable and safe to share behind `Arc` (hence `Send + Sync`).
/// A processor that must not be shared this way declares itself
/// single-replica via `NodeKind::single_replica_processor`, which pins its
/// replica count to 1 — it still runs behind a shared reference, but the
/// planner guarantees only one task ever calls it.
pub trait Processor: Send + Sync {
    fn process(&self, inputs: Vec<Record>) -> Result<Record, NodeError>;

    /// Hook invoked by the engine when a GPU-preferring processor is demoted
    /// to CPU during device placement (§4.6). Default no-op: most processors
    /// have nothing device-specific to reconfigure.
    fn change_device(&self, _device: DevicePreference) {}

    fn open(&self) -> Result<(), NodeError> {
        Ok(())
    }

    fn close(&self) -> Result<(), NodeError> {
        Ok(())
    }
}

/// A sink node: consumes the outputs of its declared parents, produces
/// nothing.
pub trait Consumer: Lifecycle {
    fn consume(&mut self, inputs: Vec<Record>) -> Result<(), NodeError>;
}
