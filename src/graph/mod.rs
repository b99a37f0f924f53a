// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The graph model: node identity and kind, the owning arena, validation and
//! topological sort, and task-module fusion.

mod dag;
mod module;
mod node;
mod validate;

pub use dag::Graph;
pub use module::TaskModule;
pub use node::{DevicePreference, NodeKind, NodeSpec};
pub use validate::{topological_sort, PlanOrder};

/// Stable identity of a node, valid across worker boundaries.
///
/// Mirrors the teacher's use of a lightweight newtype id rather than a bare
/// integer so graph APIs read clearly at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}
