// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Instant;

use tracing::error;

use crate::data::Metadata;
use crate::errors::{RuntimeError, RuntimePhase};
use crate::graph::NodeId;
use crate::messenger::Messenger;
use crate::observability::messages::task::{WorkerCloseFailed, WorkerClosed, WorkerOpenFailed, WorkerOpened};
use crate::observability::messages::StructuredLog;
use crate::traits::Processor;

const KIND: &str = "processor";

/// Drives a processor node (§4.4): blocks for input, publishes a sentinel
/// and exits the moment any input is a sentinel, otherwise calls `process`
/// and publishes its output with proctime/actual_proctime split apart so
/// the accountant (§4.7) can tell pure work from upstream wait.
///
/// A runtime error from `process` is fatal to this worker in the canonical
/// design (§7): it is logged, no output is published for that iteration,
/// and a sentinel propagates exactly as it would on natural end-of-stream.
pub fn run(node: NodeId, processor: &dyn Processor, messenger: &mut dyn Messenger) {
    match processor.open() {
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
            messenger.publish_sentinel();
            break;
        }

        let records = inputs
            .into_iter()
            .map(|e| {
                e.wire
                    .as_record()
                    .cloned()
                    .expect("non-sentinel entry must carry a record")
            })
            .collect();

        match processor.process(records) {
            Ok(output) => {
                let t2 = Instant::now();
                messenger.publish(
                    output,
                    Metadata {
                        proctime: t2.duration_since(t1).as_secs_f64(),
                        actual_proctime: t2.duration_since(t0).as_secs_f64(),
                    },
                );
            }
            Err(source) => {
                let err = RuntimeError {
                    node,
                    phase: RuntimePhase::Process,
                    source,
                };
                error!(node = %node, %err, "processor process() failed; propagating sentinel");
                messenger.publish_sentinel();
                break;
            }
        }
    }

    match processor.close() {
        Ok(()) => WorkerClosed { node, kind: KIND }.log(),
        Err(err) => WorkerCloseFailed {
            node,
            kind: KIND,
            error: err.as_ref(),
        }
        .log(),
    }
}
