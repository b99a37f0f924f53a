// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::errors::ConstructionError;

use super::node::{NodeKind, NodeSpec};
use super::NodeId;

/// The arena that owns every [`NodeSpec`] in a pipeline.
///
/// Nodes are created before planning (`add_node`), wired by call-with-parents
/// (`wire`), and validated once (`crate::graph::topological_sort`). The arena
/// is the single owner of node data; everything else in the engine refers to
/// nodes by [`NodeId`].
#[derive(Debug, Default)]
pub struct Graph {
    nodes: HashMap<NodeId, NodeSpec>,
    next_id: usize,
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            nodes: HashMap::new(),
            next_id: 0,
        }
    }

    /// Registers a new, unwired node and returns its identity.
    pub fn add_node(&mut self, name: Option<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, NodeSpec::new(id, name, kind));
        id
    }

    pub fn node(&self, id: NodeId) -> &NodeSpec {
        self.nodes
            .get(&id)
            .expect("NodeId must come from this graph's add_node")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeSpec {
        self.nodes
            .get_mut(&id)
            .expect("NodeId must come from this graph's add_node")
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeSpec> {
        self.nodes.values()
    }

    /// Wires `node` as a child of `parents`, in order (§3 call-with-parents).
    ///
    /// Fails (I1) if `node` was already wired, and (I4) if either side of the
    /// edge belongs to a task module.
    pub fn wire(&mut self, node: NodeId, parents: &[NodeId]) -> Result<(), ConstructionError> {
        if self.node(node).is_wired() {
            return Err(ConstructionError::AlreadyWired(node));
        }
        if self.node(node).owned_by_module {
            return Err(ConstructionError::ModuleOwnedNode(node));
        }
        for &parent in parents {
            if self.node(parent).owned_by_module {
                return Err(ConstructionError::ModuleOwnedNode(parent));
            }
        }
        if matches!(self.node(node).kind, NodeKind::Producer) && !parents.is_empty() {
            return Err(ConstructionError::ProducerHasParents(node));
        }

        for &parent in parents {
            self.node_mut(parent).children.insert(node);
        }
        self.node_mut(node).parents = Some(parents.to_vec());
        Ok(())
    }

    /// Marks every node in `ids` as owned by a task module, so that outer
    /// code can no longer wire through them directly (I4).
    pub(crate) fn mark_owned(&mut self, ids: &[NodeId]) {
        for &id in ids {
            self.node_mut(id).owned_by_module = true;
        }
    }

    /// Marks `id` as a task module node (§3: nested modules are forbidden).
    pub(crate) fn mark_module(&mut self, id: NodeId) {
        self.node_mut(id).is_module = true;
    }

    /// Rewrites `child`'s recorded parent from `from` to `to`, used by task
    /// module fusion (§4.2) to splice the module in place of its exit node.
    pub(crate) fn replace_parent(&mut self, child: NodeId, from: NodeId, to: NodeId) {
        let node = self.node_mut(child);
        if let Some(parents) = node.parents.as_mut() {
            for p in parents.iter_mut() {
                if *p == from {
                    *p = to;
                }
            }
        }
    }

    pub(crate) fn add_child(&mut self, node: NodeId, child: NodeId) {
        self.node_mut(node).children.insert(child);
    }

    pub(crate) fn remove_child(&mut self, node: NodeId, child: NodeId) {
        self.node_mut(node).children.remove(&child);
    }

    pub(crate) fn take_parents(&mut self, node: NodeId) -> Option<Vec<NodeId>> {
        self.node_mut(node).parents.take()
    }

    pub(crate) fn set_parents(&mut self, node: NodeId, parents: Vec<NodeId>) {
        self.node_mut(node).parents = Some(parents);
    }

    pub(crate) fn clear_children(&mut self, node: NodeId) {
        self.node_mut(node).children.clear();
    }
}
