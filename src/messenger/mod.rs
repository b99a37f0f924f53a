// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The transport between workers (§4.3): bounded queues carrying the
//! raw-input map, in either a lossy realtime variant or a lossless batch
//! variant, chosen once per pipeline.

mod messenger;
mod queue;

pub use messenger::{BatchMessenger, Messenger, RealtimeMessenger};
pub use queue::{edge, TerminationFlag};

use crossbeam_channel::{Receiver, Sender};
use serde::Deserialize;

use crate::data::RawInputMap;
use crate::graph::NodeId;

/// The scheduling mode a pipeline runs under, chosen once and shared by
/// every node's messenger (§4.3, §4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Realtime,
    Batch,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Realtime
    }
}

/// Builds the messenger variant the plan's [`Mode`] calls for, wiring it to
/// this node's upstream/downstream queue halves (§4.8).
pub fn build_messenger(
    mode: Mode,
    node: NodeId,
    parents: Vec<NodeId>,
    input: Option<Receiver<RawInputMap>>,
    output: Option<Sender<RawInputMap>>,
    termination: TerminationFlag,
) -> Box<dyn Messenger> {
    match mode {
        Mode::Realtime => Box::new(RealtimeMessenger::new(node, parents, input, output, termination)),
        Mode::Batch => Box::new(BatchMessenger::new(node, parents, input, output, termination)),
    }
}
