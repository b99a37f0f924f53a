// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use super::NodeId;

/// The three closed node kinds. Deliberately a tagged variant rather than an
/// open trait-object hierarchy: the planner (§4.8) and validator (§4.1) both
/// switch on kind exhaustively, and a closed enum makes the compiler enforce
/// that every switch stays exhaustive as kinds are touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Producer,
    /// `single_replica` pins `replica_count` to 1 for processors whose
    /// correctness depends on sequentially observing every record (trackers,
    /// aggregators — see `single_replica_processor`).
    Processor {
        replica_count: u32,
        device_preference: DevicePreference,
        single_replica: bool,
    },
    Consumer { metadata: bool },
}

impl NodeKind {
    pub fn processor(replica_count: u32, device_preference: DevicePreference) -> Self {
        NodeKind::Processor {
            replica_count,
            device_preference,
            single_replica: false,
        }
    }

    /// A processor that carries internal state across records and must not
    /// be replicated (§3: `single-replica` processors).
    pub fn single_replica_processor(device_preference: DevicePreference) -> Self {
        NodeKind::Processor {
            replica_count: 1,
            device_preference,
            single_replica: true,
        }
    }

    pub fn consumer() -> Self {
        NodeKind::Consumer { metadata: false }
    }

    pub fn metadata_consumer() -> Self {
        NodeKind::Consumer { metadata: true }
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, NodeKind::Producer)
    }

    pub fn is_processor(&self) -> bool {
        matches!(self, NodeKind::Processor { .. })
    }

    pub fn replica_count(&self) -> Option<u32> {
        match self {
            NodeKind::Processor { replica_count, .. } => Some(*replica_count),
            _ => None,
        }
    }

    pub fn device_preference(&self) -> Option<DevicePreference> {
        match self {
            NodeKind::Processor {
                device_preference, ..
            } => Some(*device_preference),
            _ => None,
        }
    }
}

/// A processor's preferred execution device. `GpuRequired` makes placement
/// failure fatal when no accelerator is free; `GpuPreferred` tolerates
/// demotion to CPU (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePreference {
    Cpu,
    GpuPreferred,
    GpuRequired,
}

impl DevicePreference {
    pub fn wants_gpu(&self) -> bool {
        !matches!(self, DevicePreference::Cpu)
    }

    pub fn tolerates_cpu(&self) -> bool {
        !matches!(self, DevicePreference::GpuRequired)
    }
}

/// The static description of a node as stored in the graph arena.
///
/// Parents and children are tracked by identity rather than by reference
/// (§9: "a node stores its parents ... and children ... by identity; the
/// graph's arena owns nodes"), since nodes cross worker boundaries and a
/// `NodeId` is the only thing guaranteed stable there.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub id: NodeId,
    pub name: Option<String>,
    pub kind: NodeKind,
    pub(crate) parents: Option<Vec<NodeId>>,
    pub(crate) children: BTreeSet<NodeId>,
    pub(crate) owned_by_module: bool,
    /// Set on the node a `TaskModule` splices into the graph (§3: "Nested
    /// modules are forbidden"). Distinct from `owned_by_module`, which marks
    /// a module's *inner* nodes instead.
    pub(crate) is_module: bool,
}

impl NodeSpec {
    pub(crate) fn new(id: NodeId, name: Option<String>, kind: NodeKind) -> Self {
        NodeSpec {
            id,
            name,
            kind,
            parents: None,
            children: BTreeSet::new(),
            owned_by_module: false,
            is_module: false,
        }
    }

    pub fn is_module(&self) -> bool {
        self.is_module
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }

    pub fn parents(&self) -> Option<&[NodeId]> {
        self.parents.as_deref()
    }

    pub fn children(&self) -> &BTreeSet<NodeId> {
        &self.children
    }

    pub fn is_wired(&self) -> bool {
        self.parents.is_some()
    }
}
