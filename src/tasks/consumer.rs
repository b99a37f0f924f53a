// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Instant;

use tracing::error;

use crate::data::{Metadata, Record};
use crate::errors::{RuntimeError, RuntimePhase};
use crate::graph::NodeId;
use crate::messenger::Messenger;
use crate::observability::messages::task::{WorkerCloseFailed, WorkerClosed, WorkerOpenFailed, WorkerOpened};
use crate::observability::messages::StructuredLog;
use crate::traits::Consumer;

const KIND: &str = "consumer";

/// Drives a consumer node (§4.4): same shape as the processor loop, but
/// calls `consume` (which returns nothing) and publishes its own entry with
/// an empty payload rather than a real record — a consumer has no payload
/// of its own to contribute, but every descendant still needs to find its
/// identity in the raw-input map (I5). In particular the engine's trailing
/// accountant consumer is wired as a child of every node, including every
/// sink (§4.7, §9 "Accountant global"), so a bare passthrough that never
/// records the sink's own id would leave that entry missing.
///
/// `is_last` is true only for the trailing metadata accountant consumer the
/// engine appends to every plan (§4.8); every other consumer has that node
/// as a descendant and so always publishes onward.
///
/// `metadata` selects the accountant's variant: instead of downcasting each
/// parent's wire to a payload, it is handed the parent's recorded
/// [`crate::data::Metadata`] wrapped as an opaque [`Record`] (§4.7).
pub fn run(
    node: NodeId,
    consumer: &mut dyn Consumer,
    messenger: &mut dyn Messenger,
    is_last: bool,
    metadata: bool,
) {
    match consumer.open() {
        Ok(()) => WorkerOpened { node, kind: KIND }.log(),
        Err(err) => WorkerOpenFailed {
            node,
            kind: KIND,
            error: err.as_ref(),
        }
        .log(),
    }

    loop {
        let t0 = Instant::now();
        let inputs = messenger.receive();
        let t1 = Instant::now();

        if inputs.iter().any(|e| e.wire.is_sentinel()) {
            if !is_last {
                messenger.publish_sentinel();
            }
            break;
        }

        let args: Vec<Record> = if metadata {
            inputs
                .iter()
                .map(|e| Record::new(e.metadata.expect("non-sentinel entry must carry metadata")))
                .collect()
        } else {
            inputs
                .into_iter()
                .map(|e| e.wire.as_record().cloned().expect("non-sentinel entry must carry a record"))
                .collect()
        };

        if let Err(source) = consumer.consume(args) {
            let err = RuntimeError {
                node,
                phase: RuntimePhase::Consume,
                source,
            };
            error!(node = %node, %err, "consumer consume() failed; propagating sentinel");
            if !is_last {
                messenger.publish_sentinel();
            }
            break;
        }

        if !is_last {
            let t2 = Instant::now();
            messenger.publish(
                Record::new(()),
                Metadata {
                    proctime: t2.duration_since(t1).as_secs_f64(),
                    actual_proctime: t2.duration_since(t0).as_secs_f64(),
                },
            );
        }
    }

    match consumer.close() {
        Ok(()) => WorkerClosed { node, kind: KIND }.log(),
        Err(err) => WorkerCloseFailed {
            node,
            kind: KIND,
            error: err.as_ref(),
        }
        .log(),
    }
}
