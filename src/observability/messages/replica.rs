// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages for the parallel-replica coordinator (§4.5).

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::graph::NodeId;

use super::StructuredLog;

/// A replicated processor's receive/replica/output worker pool started.
///
/// # Log Level
/// `info!`
pub struct ReplicaPoolStarted {
    pub node: NodeId,
    pub replica_count: u32,
}

impl Display for ReplicaPoolStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "node {} replica pool started with {} replicas ({} workers total)",
            self.node,
            self.replica_count,
            self.replica_count + 2
        )
    }
}

impl StructuredLog for ReplicaPoolStarted {
    fn log(&self) {
        tracing::info!(node = %self.node, replica_count = self.replica_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "replica_pool_started",
            span_name = name,
            node = %self.node,
            replica_count = self.replica_count,
        )
    }
}

/// All replicas and the output worker for a replica pool exited.
///
/// # Log Level
/// `debug!`
pub struct ReplicaPoolDrained {
    pub node: NodeId,
}

impl Display for ReplicaPoolDrained {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "node {} replica pool drained", self.node)
    }
}

impl StructuredLog for ReplicaPoolDrained {
    fn log(&self) {
        tracing::debug!(node = %self.node, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("replica_pool_drained", span_name = name, node = %self.node)
    }
}
