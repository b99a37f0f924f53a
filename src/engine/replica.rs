// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The parallel-replica fan-out/fan-in coordinator (§4.5, C6): a receive
//! worker, N replica workers, and an output worker, wired around a node's
//! single predecessor and successor queue in the plan's linear chain
//! (`crate::engine::plan`).
//!
//! Grounded directly on the reference engine's multiprocessing variant
//! (`MultiprocessingReceiveTask` / `MultiprocessingProcessorTask` /
//! `MultiprocessingOutputTask`): a shared lock serializes "take the next
//! input" and "record whose turn it was" into one atomic step, which is
//! what guarantees the output worker replays results in input order (P2)
//! even though the replicas themselves finish in whatever order they like
//! (P1).

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use tracing::error;

use crate::data::{Entry, Metadata, RawInputMap, Wire};
use crate::errors::{RuntimeError, RuntimePhase};
use crate::graph::NodeId;
use crate::messenger::{edge, Mode, TerminationFlag};
use crate::observability::messages::replica::{ReplicaPoolDrained, ReplicaPoolStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::Processor;

/// Spawns the full N+2 worker pool for a replicated processor and returns
/// their join handles. `input` is the predecessor's queue in the plan's
/// linear chain; `output` is this node's own queue, read by its successor
/// (`None` only if this were the plan's last entry, which a processor never
/// is).
#[allow(clippy::too_many_arguments)]
pub fn spawn_pool(
    node: NodeId,
    parents: Vec<NodeId>,
    replica_count: u32,
    processor: Arc<dyn Processor>,
    mode: Mode,
    input: Receiver<RawInputMap>,
    output: Option<Sender<RawInputMap>>,
    termination: TerminationFlag,
) -> Vec<JoinHandle<()>> {
    ReplicaPoolStarted { node, replica_count }.log();

    // Fan-out queue: capacity 1, matching the reference engine's receive
    // queue. Ordering queue is unbounded — it only ever carries replica
    // indices, never payloads, so there is nothing to bound.
    let (fanout_tx, fanout_rx) = edge::<RawInputMap>(1);
    let (ordering_tx, ordering_rx) = crossbeam_channel::unbounded::<usize>();
    let dispatch_lock = Arc::new(Mutex::new(()));

    let mut handles = Vec::new();

    {
        let fanout_tx = fanout_tx.clone();
        let termination = termination.clone();
        let receive_parents = parents.clone();
        handles.push(thread::spawn(move || {
            receive_worker(receive_parents, mode, input, fanout_tx, termination);
        }));
    }

    let mut output_rxs = Vec::with_capacity(replica_count as usize);
    for idx in 0..replica_count as usize {
        let (out_tx, out_rx) = crossbeam_channel::unbounded::<RawInputMap>();
        output_rxs.push(out_rx);

        let processor = Arc::clone(&processor);
        let fanout_rx = fanout_rx.clone();
        let fanout_tx = fanout_tx.clone();
        let ordering_tx = ordering_tx.clone();
        let lock = Arc::clone(&dispatch_lock);
        let parents = parents.clone();

        handles.push(thread::spawn(move || {
            replica_worker(node, idx, parents, processor, lock, fanout_rx, fanout_tx, ordering_tx, out_tx);
        }));
    }

    handles.push(thread::spawn(move || {
        output_worker(node, replica_count, mode, ordering_rx, output_rxs, output);
        ReplicaPoolDrained { node }.log();
    }));

    handles
}

/// Reads the predecessor's single queue and relays each map into the
/// bounded fan-out queue the replicas compete over. A realtime relay drops
/// on a full fan-out queue; a batch relay blocks. The sentinel, like every
/// blocking-publish path in this engine, always blocks (it must never
/// drop), and the receive worker exits the moment it observes one.
fn receive_worker(
    parents: Vec<NodeId>,
    mode: Mode,
    input: Receiver<RawInputMap>,
    fanout_tx: Sender<RawInputMap>,
    termination: TerminationFlag,
) {
    loop {
        if termination.is_set() {
            break;
        }
        let raw = match input.recv() {
            Ok(raw) => raw,
            Err(_) => break,
        };

        if raw.any_sentinel(&parents) {
            let _ = fanout_tx.send(raw);
            break;
        }

        match mode {
            Mode::Batch => {
                let _ = fanout_tx.send(raw);
            }
            Mode::Realtime => {
                let _ = fanout_tx.try_send(raw);
            }
        }
    }
}

/// One of `replica_count` identical workers competing for fan-out input.
/// Dequeuing its input and recording its own index in the ordering queue
/// happens under the shared lock as a single atomic step — the ordering
/// queue is what lets the output worker replay results in input order
/// regardless of which replica happens to finish first.
#[allow(clippy::too_many_arguments)]
fn replica_worker(
    node: NodeId,
    idx: usize,
    parents: Vec<NodeId>,
    processor: Arc<dyn Processor>,
    lock: Arc<Mutex<()>>,
    fanout_rx: Receiver<RawInputMap>,
    fanout_tx: Sender<RawInputMap>,
    ordering_tx: Sender<usize>,
    output_tx: Sender<RawInputMap>,
) {
    if let Err(err) = processor.open() {
        error!(node = %node, replica = idx, %err, "replica open() failed");
    }

    loop {
        let raw = {
            let _guard = lock.lock().expect("replica dispatch lock poisoned");
            let raw = match fanout_rx.recv() {
                Ok(raw) => raw,
                Err(_) => break,
            };
            let _ = ordering_tx.send(idx);
            raw
        };

        if raw.any_sentinel(&parents) {
            // Re-enqueue exactly one more copy so the next replica in line
            // also observes end-of-stream; the last replica's re-enqueue is
            // simply never consumed once the receive worker and every
            // sibling has exited.
            let _ = fanout_tx.send(raw.clone());
            let mut out = raw;
            out.insert(node, Entry::sentinel());
            let _ = output_tx.send(out);
            break;
        }

        let t0 = Instant::now();
        let inputs = raw
            .entries_for(&parents)
            .into_iter()
            .map(|e| e.wire.as_record().cloned().expect("non-sentinel entry must carry a record"))
            .collect();

        match processor.process(inputs) {
            Ok(record) => {
                let proctime = t0.elapsed().as_secs_f64();
                let mut out = raw;
                out.insert(
                    node,
                    Entry::record(
                        Wire::Record(record),
                        Metadata {
                            proctime,
                            // Overwritten by the output worker with the true
                            // wait-inclusive timing once dequeued (§4.5).
                            actual_proctime: proctime,
                        },
                    ),
                );
                let _ = output_tx.send(out);
            }
            Err(source) => {
                let err = RuntimeError {
                    node,
                    phase: RuntimePhase::Process,
                    source,
                };
                error!(node = %node, replica = idx, %err, "replica process() failed; propagating sentinel");
                let _ = fanout_tx.send(raw.clone());
                let mut out = raw;
                out.insert(node, Entry::sentinel());
                let _ = output_tx.send(out);
                break;
            }
        }
    }

    if let Err(err) = processor.close() {
        error!(node = %node, replica = idx, %err, "replica close() failed");
    }
}

/// Replays results in dispatch order: pop the next replica index off the
/// ordering queue, then pop exactly one item from that replica's private
/// output queue. Terminates once every replica has reported its sentinel.
fn output_worker(
    node: NodeId,
    replica_count: u32,
    mode: Mode,
    ordering_rx: Receiver<usize>,
    output_rxs: Vec<Receiver<RawInputMap>>,
    downstream: Option<Sender<RawInputMap>>,
) {
    let mut finish_count = 0u32;

    loop {
        let t0 = Instant::now();
        let idx = match ordering_rx.recv() {
            Ok(idx) => idx,
            Err(_) => break,
        };
        let t1 = Instant::now();
        let mut raw = match output_rxs[idx].recv() {
            Ok(raw) => raw,
            Err(_) => break,
        };
        let t2 = Instant::now();

        let is_sentinel = raw.get(node).map(|e| e.wire.is_sentinel()).unwrap_or(false);
        if !is_sentinel {
            // The output worker's own wait (ordering-queue pop to
            // output-queue pop) replaces whatever timing the replica itself
            // recorded — this is the accountant-visible proctime/actual_proctime
            // for a replicated node, exactly as the reference engine computes
            // it in its output task.
            if let Some(entry) = raw.get(node).cloned() {
                raw.insert(
                    node,
                    Entry::record(
                        entry.wire,
                        Metadata {
                            proctime: t2.duration_since(t1).as_secs_f64(),
                            actual_proctime: t2.duration_since(t0).as_secs_f64(),
                        },
                    ),
                );
            }
        } else {
            finish_count += 1;
        }

        // The first sentinel is always forwarded with a blocking send so it
        // is never lost even in realtime mode; everything else (including a
        // redundant sentinel from a later-finishing replica) follows the
        // pipeline's normal publish semantics.
        if let Some(tx) = &downstream {
            if is_sentinel && finish_count == 1 {
                let _ = tx.send(raw);
            } else {
                match mode {
                    Mode::Batch => {
                        let _ = tx.send(raw);
                    }
                    Mode::Realtime => {
                        let _ = tx.try_send(raw);
                    }
                }
            }
        }

        if finish_count == replica_count {
            break;
        }
    }
}
