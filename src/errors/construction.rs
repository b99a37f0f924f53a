// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::graph::NodeId;
use thiserror::Error;

/// Fatal errors raised while building or validating a graph, before `run`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// (I1) a node's parents were wired more than once.
    #[error("node {0} has already been wired to its parents; wiring can only happen once")]
    AlreadyWired(NodeId),

    /// A parent or child belongs to a `TaskModule` and cannot be linked
    /// through directly (I4).
    #[error("node {0} belongs to a task module and cannot be wired directly; wire the module instead")]
    ModuleOwnedNode(NodeId),

    /// (I2) a cycle was detected reachable from the producer.
    #[error("cycle detected in graph, involving node {0}")]
    CyclicGraph(NodeId),

    /// The engine currently supports exactly one producer per pipeline.
    #[error("exactly one producer is required, found {0}")]
    MultipleProducers(usize),

    /// A declared producer has parents wired to it.
    #[error("node {0} was declared a producer but has parents")]
    ProducerHasParents(NodeId),

    /// (I3) a declared consumer is not reachable from the producer.
    #[error("consumer {0} is not reachable from the producer")]
    UnreachableConsumer(NodeId),

    /// A `single_replica` processor was asked to raise its replica count.
    #[error("node {0} carries internal state across records and cannot be replicated (requested replica_count={1})")]
    SingleReplicaViolation(NodeId, u32),

    /// A task module cannot nest another task module.
    #[error("node {0} is a task module and cannot contain another task module ({1})")]
    NestedModule(NodeId, NodeId),

    /// A task module's inner sub-graph contained a GPU-preferring node.
    #[error("node {0} inside task module {1} requests GPU, which is forbidden inside a module")]
    GpuInsideModule(NodeId, NodeId),

    /// A task module's inner sub-graph contains a node not reachable from its
    /// declared entry, or the exit isn't a descendant of the entry.
    #[error("exit node {0} of task module is not a descendant of entry node {1}")]
    ExitNotDescendant(NodeId, NodeId),

    /// A task module's inner sub-graph contains a parent outside the module's
    /// own node set.
    #[error("node {0} inside task module has a parent not contained in the module")]
    ParentOutsideModule(NodeId),

    /// A task module was given fewer than one inner node.
    #[error("task module must contain at least one processor node")]
    EmptyModule,
}
