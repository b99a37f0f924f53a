// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::graph::NodeId;
use thiserror::Error;

/// An error raised by user code inside `next`/`process`/`consume`.
///
/// Per §7, this is fatal to the owning worker in the canonical design: the
/// worker logs the error, publishes no record for that iteration, and
/// propagates the sentinel as though it had reached natural end-of-stream.
/// There is no built-in skip-and-continue policy.
#[derive(Error, Debug)]
#[error("node {node} failed during {phase}: {source}")]
pub struct RuntimeError {
    pub node: NodeId,
    pub phase: RuntimePhase,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimePhase {
    Next,
    Process,
    Consume,
}

impl std::fmt::Display for RuntimePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RuntimePhase::Next => "next",
            RuntimePhase::Process => "process",
            RuntimePhase::Consume => "consume",
        };
        f.write_str(s)
    }
}
