// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::errors::ConstructionError;

use super::dag::Graph;
use super::NodeId;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Grey,
    Black,
}

/// The result of validating a graph: a deterministic topological order with
/// producers at the front (Q1).
#[derive(Debug, Clone)]
pub struct PlanOrder(pub Vec<NodeId>);

impl PlanOrder {
    pub fn as_slice(&self) -> &[NodeId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Validates a single-producer graph and returns its topological order.
///
/// Ports the DFS white/grey/black colouring of the system this engine
/// generalizes from: a grey-to-grey edge is a cycle, order is emitted on the
/// black transition and then reversed, and ties are broken by insertion
/// order (the order nodes were first visited), matching §4.1.
pub fn topological_sort(
    graph: &Graph,
    producer: NodeId,
    consumers: &[NodeId],
) -> Result<PlanOrder, ConstructionError> {
    let mut colors: HashMap<NodeId, Color> = HashMap::new();
    let mut stack = Vec::new();

    visit(graph, producer, &mut colors, &mut stack)?;
    stack.reverse();

    for &consumer in consumers {
        if !stack.contains(&consumer) {
            return Err(ConstructionError::UnreachableConsumer(consumer));
        }
    }

    Ok(PlanOrder(stack))
}

fn visit(
    graph: &Graph,
    node: NodeId,
    colors: &mut HashMap<NodeId, Color>,
    stack: &mut Vec<NodeId>,
) -> Result<(), ConstructionError> {
    colors.insert(node, Color::Grey);

    for &child in graph.node(node).children() {
        match colors.get(&child).copied().unwrap_or(Color::White) {
            Color::White => visit(graph, child, colors, stack)?,
            Color::Grey => return Err(ConstructionError::CyclicGraph(child)),
            Color::Black => {}
        }
    }

    colors.insert(node, Color::Black);
    stack.push(node);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DevicePreference, NodeKind};

    fn chain() -> (Graph, NodeId, NodeId) {
        let mut g = Graph::new();
        let p = g.add_node(Some("p".into()), NodeKind::Producer);
        let a = g.add_node(Some("a".into()), NodeKind::processor(1, DevicePreference::Cpu));
        let c = g.add_node(Some("c".into()), NodeKind::consumer());
        g.wire(a, &[p]).unwrap();
        g.wire(c, &[a]).unwrap();
        (g, p, c)
    }

    #[test]
    fn linear_order_respects_edges() {
        let (g, p, c) = chain();
        let order = topological_sort(&g, p, &[c]).unwrap();
        assert_eq!(order.len(), 3);
        let pos = |id: NodeId| order.0.iter().position(|&x| x == id).unwrap();
        assert!(pos(p) < pos(c));
    }

    #[test]
    fn cycle_is_rejected() {
        let mut g = Graph::new();
        let p = g.add_node(None, NodeKind::Producer);
        let a = g.add_node(None, NodeKind::processor(1, DevicePreference::Cpu));
        let b = g.add_node(None, NodeKind::processor(1, DevicePreference::Cpu));
        g.wire(a, &[p]).unwrap();
        g.wire(b, &[a]).unwrap();
        // Manually force a cycle b -> a, bypassing the public wiring API,
        // to exercise the cycle-detection path in isolation.
        g.add_child(b, a);

        let err = topological_sort(&g, p, &[]).unwrap_err();
        assert!(matches!(err, ConstructionError::CyclicGraph(_)));
    }

    #[test]
    fn unreachable_consumer_is_rejected() {
        let (g, p, _c) = chain();
        let mut g2 = g;
        let stray = g2.add_node(None, NodeKind::consumer());
        let err = topological_sort(&g2, p, &[stray]).unwrap_err();
        assert_eq!(err, ConstructionError::UnreachableConsumer(stray));
    }
}
