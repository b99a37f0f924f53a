// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages for graph construction and validation (§4.1, §4.2).

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::graph::NodeId;

use super::StructuredLog;

/// A graph passed validation and was assigned a topological order.
///
/// # Log Level
/// `info!`
pub struct GraphValidated {
    pub node_count: usize,
    pub producer: NodeId,
    pub consumer_count: usize,
}

impl Display for GraphValidated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "graph validated: {} nodes, producer {}, {} consumer(s)",
            self.node_count, self.producer, self.consumer_count
        )
    }
}

impl StructuredLog for GraphValidated {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            producer = %self.producer,
            consumer_count = self.consumer_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph_validated",
            span_name = name,
            node_count = self.node_count,
            producer = %self.producer,
        )
    }
}

/// A sub-DAG was fused into a single task-module worker.
///
/// # Log Level
/// `info!`
pub struct ModuleFused {
    pub module: NodeId,
    pub inner_count: usize,
}

impl Display for ModuleFused {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "task module {} fused {} inner processor(s) into one worker",
            self.module, self.inner_count
        )
    }
}

impl StructuredLog for ModuleFused {
    fn log(&self) {
        tracing::info!(module = %self.module, inner_count = self.inner_count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "module_fused",
            span_name = name,
            module = %self.module,
            inner_count = self.inner_count,
        )
    }
}
