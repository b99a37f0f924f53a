// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::data::Record;
use crate::errors::ConstructionError;
use crate::observability::messages::graph::ModuleFused;
use crate::observability::messages::StructuredLog;
use crate::traits::{NodeError, Processor};

use super::dag::Graph;
use super::node::{DevicePreference, NodeKind};
use super::validate::topological_sort;
use super::NodeId;

/// Fuses a sub-DAG of processors into a single virtual processor worker
/// (§4.2), trading one queue per inner node for one in-process call chain.
///
/// Construction rewrites the outer graph: the module inherits the entry
/// node's parents and the exit node's children, and every inner node is
/// marked owned so outer code can no longer wire through it (I4).
pub struct TaskModule {
    id: NodeId,
    /// Inner processors in their once-computed topological order. The first
    /// entry is the module's entry node, the last is its exit node.
    inner_order: Vec<NodeId>,
    inner_processors: HashMap<NodeId, Box<dyn Processor>>,
    /// Each non-entry inner node's parent wiring, captured at build time
    /// since inner nodes are marked owned afterward and never rewired —
    /// `process` needs no outer graph reference at call time.
    inner_parents: HashMap<NodeId, Vec<NodeId>>,
}

impl TaskModule {
    /// Builds a module over the sub-graph reachable from `entry` down to
    /// `exit`, taking ownership of `processors` (inner node id -> its
    /// `Processor` implementation, matching `inner_order`'s ids).
    ///
    /// `replica_count` governs the module as a whole; raising it above 1 is
    /// rejected if any inner node carries internal state (I: single-replica
    /// violation propagates into modules the same way it does for a bare
    /// node).
    pub fn build(
        graph: &mut Graph,
        name: Option<String>,
        entry: NodeId,
        exit: NodeId,
        mut processors: HashMap<NodeId, Box<dyn Processor>>,
        replica_count: u32,
    ) -> Result<(Self, NodeId), ConstructionError> {
        // 1. Topologically sort the inner sub-graph rooted at entry, the
        // same algorithm used for the outer graph (§4.2 step 3).
        let inner_order = topological_sort(graph, entry, &[exit])?.0;

        if inner_order.is_empty() {
            return Err(ConstructionError::EmptyModule);
        }
        if !inner_order.contains(&exit) {
            return Err(ConstructionError::ExitNotDescendant(exit, entry));
        }

        for &n in &inner_order {
            let spec = graph.node(n);
            if !spec.kind.is_processor() {
                return Err(ConstructionError::ParentOutsideModule(n));
            }
            if spec.is_module() {
                return Err(ConstructionError::NestedModule(n, entry));
            }
            // The entry node's own parents are the module's external wiring
            // (step 2.1 below adopts them) and are expected to live outside
            // `inner_order`; only non-entry inner nodes must draw every
            // parent from within the module.
            if n != entry {
                if let Some(parents) = spec.parents() {
                    for &p in parents {
                        if !inner_order.contains(&p) {
                            return Err(ConstructionError::ParentOutsideModule(n));
                        }
                    }
                }
            }
            if spec.kind.device_preference().map(|d| d.wants_gpu()).unwrap_or(false) {
                return Err(ConstructionError::GpuInsideModule(n, entry));
            }
            let is_single_replica = matches!(
                spec.kind,
                NodeKind::Processor {
                    single_replica: true,
                    ..
                }
            );
            if is_single_replica && replica_count > 1 {
                return Err(ConstructionError::SingleReplicaViolation(n, replica_count));
            }
        }

        // 2. Splice the module into the outer graph in place of entry/exit.
        let module_kind = if replica_count > 1 {
            NodeKind::processor(replica_count, DevicePreference::Cpu)
        } else {
            NodeKind::processor(1, DevicePreference::Cpu)
        };
        let module_id = graph.add_node(name, module_kind);
        graph.mark_module(module_id);

        // 2.1 Adopt entry's parents.
        if let Some(entry_parents) = graph.take_parents(entry) {
            for &parent in &entry_parents {
                graph.remove_child(parent, entry);
                graph.add_child(parent, module_id);
            }
            graph.set_parents(module_id, entry_parents);
        } else {
            graph.set_parents(module_id, Vec::new());
        }

        // 2.2 Adopt exit's children, rewriting their recorded parent.
        let exit_children: Vec<NodeId> = graph.node(exit).children().iter().copied().collect();
        for &child in &exit_children {
            graph.add_child(module_id, child);
            graph.replace_parent(child, exit, module_id);
        }
        graph.clear_children(exit);

        // 3. Mark every inner node as owned so outer code can't link through it.
        graph.mark_owned(&inner_order);

        ModuleFused {
            module: module_id,
            inner_count: inner_order.len(),
        }
        .log();

        let inner_parents: HashMap<NodeId, Vec<NodeId>> = inner_order[1..]
            .iter()
            .map(|&id| {
                let parents = graph
                    .node(id)
                    .parents()
                    .expect("inner node must be wired during module construction")
                    .to_vec();
                (id, parents)
            })
            .collect();

        let inner_processors = inner_order
            .iter()
            .map(|id| {
                let p = processors
                    .remove(id)
                    .unwrap_or_else(|| panic!("missing processor implementation for inner node {:?}", id));
                (*id, p)
            })
            .collect();

        Ok((
            TaskModule {
                id: module_id,
                inner_order,
                inner_processors,
                inner_parents,
            },
            module_id,
        ))
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl Processor for TaskModule {
    /// Evaluates the fused sub-DAG: feeds `inputs` (the outer inputs, in the
    /// entry node's declared-parent order) to the entry processor, then walks
    /// the rest of the inner topological order, resolving each inner node's
    /// inputs from an in-memory intermediate-results table, and returns the
    /// exit node's output (§4.2).
    fn process(&self, inputs: Vec<Record>) -> Result<Record, NodeError> {
        let mut intermediate: HashMap<NodeId, Record> = HashMap::new();

        let entry = self.inner_order[0];
        let entry_processor = &self.inner_processors[&entry];
        let result = entry_processor.process(inputs)?;
        intermediate.insert(entry, result.clone());

        let mut last = result;
        for &node_id in &self.inner_order[1..] {
            let parents = &self.inner_parents[&node_id];
            let inputs: Vec<Record> = parents
                .iter()
                .map(|p| {
                    intermediate
                        .get(p)
                        .cloned()
                        .unwrap_or_else(|| panic!("inner node {:?} depends on {:?} which hasn't run yet", node_id, p))
                })
                .collect();
            let processor = &self.inner_processors[&node_id];
            let result = processor.process(inputs)?;
            intermediate.insert(node_id, result.clone());
            last = result;
        }

        Ok(last)
    }

    fn change_device(&self, device: DevicePreference) {
        for processor in self.inner_processors.values() {
            processor.change_device(device);
        }
    }

    fn open(&self) -> Result<(), NodeError> {
        for &id in &self.inner_order {
            self.inner_processors[&id].open()?;
        }
        Ok(())
    }

    fn close(&self) -> Result<(), NodeError> {
        for &id in &self.inner_order {
            self.inner_processors[&id].close()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DevicePreference as Dp;

    struct AddOne;
    impl Processor for AddOne {
        fn process(&self, inputs: Vec<Record>) -> Result<Record, NodeError> {
            let n = *inputs[0].downcast_ref::<i32>().unwrap();
            Ok(Record::new(n + 1))
        }
    }

    struct Double;
    impl Processor for Double {
        fn process(&self, inputs: Vec<Record>) -> Result<Record, NodeError> {
            let n = *inputs[0].downcast_ref::<i32>().unwrap();
            Ok(Record::new(n * 2))
        }
    }

    #[test]
    fn fuses_a_two_node_chain_and_evaluates_it() {
        let mut graph = Graph::new();
        let producer = graph.add_node(None, NodeKind::Producer);
        let add = graph.add_node(Some("add".into()), NodeKind::processor(1, Dp::Cpu));
        let double = graph.add_node(Some("double".into()), NodeKind::processor(1, Dp::Cpu));
        graph.wire(add, &[producer]).unwrap();
        graph.wire(double, &[add]).unwrap();

        let mut processors: HashMap<NodeId, Box<dyn Processor>> = HashMap::new();
        processors.insert(add, Box::new(AddOne));
        processors.insert(double, Box::new(Double));

        let (module, module_id) =
            TaskModule::build(&mut graph, Some("fused".into()), add, double, processors, 1).unwrap();

        assert_eq!(module.id(), module_id);
        assert!(graph.node(add).is_wired());
        assert!(graph.node(double).is_wired());

        let result = module.process(vec![Record::new(3i32)]).unwrap();
        assert_eq!(*result.downcast_ref::<i32>().unwrap(), 8); // (3 + 1) * 2
    }

    #[test]
    fn exit_not_descendant_of_entry_is_rejected() {
        let mut graph = Graph::new();
        let producer = graph.add_node(None, NodeKind::Producer);
        let a = graph.add_node(None, NodeKind::processor(1, Dp::Cpu));
        let b = graph.add_node(None, NodeKind::processor(1, Dp::Cpu));
        graph.wire(a, &[producer]).unwrap();
        graph.wire(b, &[producer]).unwrap();

        let mut processors: HashMap<NodeId, Box<dyn Processor>> = HashMap::new();
        processors.insert(a, Box::new(AddOne));
        processors.insert(b, Box::new(Double));

        let err = TaskModule::build(&mut graph, None, a, b, processors, 1).unwrap_err();
        assert!(matches!(err, ConstructionError::UnreachableConsumer(_)));
    }

    #[test]
    fn nesting_a_module_inside_another_module_is_rejected() {
        let mut graph = Graph::new();
        let producer = graph.add_node(None, NodeKind::Producer);
        let inner_a = graph.add_node(Some("inner_a".into()), NodeKind::processor(1, Dp::Cpu));
        graph.wire(inner_a, &[producer]).unwrap();

        let mut inner_processors: HashMap<NodeId, Box<dyn Processor>> = HashMap::new();
        inner_processors.insert(inner_a, Box::new(AddOne));
        let (_first_module, first_module_id) =
            TaskModule::build(&mut graph, Some("first".into()), inner_a, inner_a, inner_processors, 1).unwrap();

        // Attempting to wrap the already-built module as the sole inner node
        // of a second module must be rejected: a module may not contain
        // another module (§3).
        let mut processors: HashMap<NodeId, Box<dyn Processor>> = HashMap::new();
        processors.insert(first_module_id, Box::new(Double));

        let err = TaskModule::build(
            &mut graph,
            Some("second".into()),
            first_module_id,
            first_module_id,
            processors,
            1,
        )
        .unwrap_err();
        assert!(matches!(err, ConstructionError::NestedModule(id, _) if id == first_module_id));
    }
}
