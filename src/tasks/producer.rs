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
use crate::traits::Producer;

const KIND: &str = "producer";

/// Drives a producer node (§4.4): calls `next()` until it signals
/// end-of-stream, an external stop is observed, or a runtime error occurs;
/// publishes each record with fresh timing metadata; always publishes a
/// sentinel and closes before returning.
///
/// `proctime` equals `actual_proctime` here — a producer has no upstream to
/// wait on, so the two timings coincide (§4.4).
pub fn run(node: NodeId, producer: &mut dyn Producer, messenger: &mut dyn Messenger, is_last: bool) {
    match producer.open() {
        Ok(()) => WorkerOpened { node, kind: KIND }.log(),
        Err(err) => WorkerOpenFailed {
            node,
            kind: KIND,
            error: err.as_ref(),
        }
        .log(),
    }

    loop {
        if messenger.check_termination() {
            break;
        }

        let t0 = Instant::now();
        match producer.next() {
            Ok(Some(record)) => {
                let proctime = t0.elapsed().as_secs_f64();
                if !is_last {
                    messenger.publish(
                        record,
                        Metadata {
                            proctime,
                            actual_proctime: proctime,
                        },
                    );
                }
            }
            Ok(None) => break,
            Err(source) => {
                let err = RuntimeError {
                    node,
                    phase: RuntimePhase::Next,
                    source,
                };
                error!(node = %node, %err, "producer next() failed; treating as end-of-stream");
                break;
            }
        }
    }

    messenger.publish_sentinel();

    match producer.close() {
        Ok(()) => WorkerClosed { node, kind: KIND }.log(),
        Err(err) => WorkerCloseFailed {
            node,
            kind: KIND,
            error: err.as_ref(),
        }
        .log(),
    }
}
