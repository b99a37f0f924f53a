// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::accountant::MetadataConsumer;
use crate::errors::ConstructionError;
use crate::graph::{topological_sort, Graph, NodeId, NodeKind};

/// One row of a compiled plan: a node's position in the topological order,
/// the position of its single predecessor in that order (not its graph
/// parents — see module docs), and whether it is the trailing node the
/// engine appends to every plan (§4.8).
#[derive(Debug, Clone, Copy)]
pub struct PlanEntry {
    pub node: NodeId,
    pub tsort_id: usize,
    pub parent_tsort_id: Option<usize>,
    pub is_last: bool,
}

/// A compiled plan: every real node in topological order, plus the engine's
/// trailing metadata-only accountant consumer (§4.7, §4.8).
#[derive(Debug, Clone)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
    pub accountant: NodeId,
}

impl Plan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compiles a validated graph into a [`Plan`] and the accountant consumer
/// that will run as its trailing entry.
///
/// This mirrors the system this engine generalizes from exactly: a pipeline
/// is flattened into ONE linear chain by its topological order — a task's
/// single upstream queue is its immediate *predecessor in that order*, not
/// one queue per true graph parent. This is what lets the raw-input map
/// design (§3) work with a single queue per task regardless of fan-in/out:
/// every node's own contribution is folded into the map as it relays from
/// one task to the next, so by the time a node runs, the map already
/// contains every true ancestor's entry, even ones several hops back in the
/// graph.
pub fn compile(
    graph: &mut Graph,
    producer: NodeId,
    consumers: &[NodeId],
    threshold_multiplier: u64,
) -> Result<(Plan, MetadataConsumer), ConstructionError> {
    if !graph.node(producer).kind.is_producer() {
        return Err(ConstructionError::ProducerHasParents(producer));
    }
    let producer_count = graph.nodes().filter(|n| n.kind.is_producer()).count();
    if producer_count > 1 {
        return Err(ConstructionError::MultipleProducers(producer_count));
    }

    let order = topological_sort(graph, producer, consumers)?.0;

    let names: HashMap<NodeId, String> = order
        .iter()
        .map(|&id| (id, graph.node(id).display_name()))
        .collect();

    let accountant = graph.add_node(Some("accountant".to_string()), NodeKind::metadata_consumer());
    graph.wire(accountant, &order)?;

    let mut full_order = order.clone();
    full_order.push(accountant);

    let entries = full_order
        .iter()
        .enumerate()
        .map(|(i, &node)| PlanEntry {
            node,
            tsort_id: i,
            parent_tsort_id: if i == 0 { None } else { Some(i - 1) },
            is_last: i == full_order.len() - 1,
        })
        .collect();

    let metadata_consumer =
        MetadataConsumer::new(order.clone(), producer, full_order, names, threshold_multiplier);

    Ok((Plan { entries, accountant }, metadata_consumer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DevicePreference;

    #[test]
    fn linear_chain_has_sequential_predecessors() {
        let mut g = Graph::new();
        let p = g.add_node(Some("p".into()), NodeKind::Producer);
        let a = g.add_node(Some("a".into()), NodeKind::processor(1, DevicePreference::Cpu));
        let c = g.add_node(Some("c".into()), NodeKind::consumer());
        g.wire(a, &[p]).unwrap();
        g.wire(c, &[a]).unwrap();

        let (plan, _accountant) = compile(&mut g, p, &[c], 40).unwrap();

        assert_eq!(plan.len(), 4); // p, a, c, accountant
        assert_eq!(plan.entries[0].parent_tsort_id, None);
        assert_eq!(plan.entries[1].parent_tsort_id, Some(0));
        assert_eq!(plan.entries[2].parent_tsort_id, Some(1));
        assert_eq!(plan.entries[3].parent_tsort_id, Some(2));
        assert!(plan.entries[3].is_last);
        assert!(!plan.entries[2].is_last);
    }

    #[test]
    fn accountant_is_wired_as_child_of_every_real_node() {
        let mut g = Graph::new();
        let p = g.add_node(None, NodeKind::Producer);
        let c = g.add_node(None, NodeKind::consumer());
        g.wire(c, &[p]).unwrap();

        let (plan, _) = compile(&mut g, p, &[c], 40).unwrap();
        let accountant_parents = g.node(plan.accountant).parents().unwrap();
        assert_eq!(accountant_parents, &[p, c]);
    }

    #[test]
    fn second_producer_is_rejected() {
        let mut g = Graph::new();
        let p1 = g.add_node(None, NodeKind::Producer);
        let _p2 = g.add_node(None, NodeKind::Producer);

        let err = compile(&mut g, p1, &[], 40).unwrap_err();
        assert_eq!(err, ConstructionError::MultipleProducers(2));
    }
}
