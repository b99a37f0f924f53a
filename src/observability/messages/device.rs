// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages for device enumeration and placement (§4.6).

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::graph::NodeId;

use super::StructuredLog;

/// The host's available accelerator set was enumerated.
///
/// # Log Level
/// `info!`
pub struct AcceleratorsDiscovered {
    pub count: usize,
}

impl Display for AcceleratorsDiscovered {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "discovered {} available accelerator(s)", self.count)
    }
}

impl StructuredLog for AcceleratorsDiscovered {
    fn log(&self) {
        tracing::info!(count = self.count, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("accelerators_discovered", span_name = name, count = self.count)
    }
}

/// A GPU-preferring processor was demoted to CPU placement because no
/// accelerator was free.
///
/// # Log Level
/// `warn!`
pub struct ProcessorDemoted {
    pub node: NodeId,
}

impl Display for ProcessorDemoted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "node {} demoted to CPU: no accelerator was available",
            self.node
        )
    }
}

impl StructuredLog for ProcessorDemoted {
    fn log(&self) {
        tracing::warn!(node = %self.node, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("processor_demoted", span_name = name, node = %self.node)
    }
}

/// A processor assigned an accelerator identifier.
///
/// # Log Level
/// `debug!`
pub struct ProcessorPlaced<'a> {
    pub node: NodeId,
    pub accelerator: &'a str,
}

impl Display for ProcessorPlaced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "node {} placed on accelerator {}", self.node, self.accelerator)
    }
}

impl StructuredLog for ProcessorPlaced<'_> {
    fn log(&self) {
        tracing::debug!(node = %self.node, accelerator = self.accelerator, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "processor_placed",
            span_name = name,
            node = %self.node,
            accelerator = self.accelerator,
        )
    }
}
