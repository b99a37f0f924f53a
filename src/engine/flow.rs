// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::config::EngineConfig;
use crate::data::RawInputMap;
use crate::device;
use crate::errors::FlowError;
use crate::graph::{DevicePreference, Graph, NodeId, NodeKind};
use crate::messenger::{build_messenger, edge, Mode, TerminationFlag};
use crate::observability::messages::device::ProcessorDemoted;
use crate::observability::messages::engine::{FlowJoined, FlowStarted, FlowStopRequested};
use crate::observability::messages::graph::GraphValidated;
use crate::observability::messages::StructuredLog;
use crate::tasks::{run_consumer, run_processor, run_producer};
use crate::traits::{Consumer, Processor, Producer};

use super::plan::{compile, Plan};

/// User-code registry handed to [`Flow::new`]: the one producer implementation
/// and every processor/consumer implementation, keyed by the [`NodeId`] the
/// embedding application got back from building its [`Graph`].
///
/// Processor implementations are registered behind an [`Arc`] because a
/// replicated processor (§4.5) shares one instance across N replica workers;
/// a single-replica processor just happens to have exactly one reader.
#[derive(Default)]
pub struct NodeImpls {
    producer: Option<Box<dyn Producer>>,
    processors: HashMap<NodeId, Arc<dyn Processor>>,
    consumers: HashMap<NodeId, Box<dyn Consumer>>,
}

impl NodeImpls {
    pub fn new() -> Self {
        NodeImpls::default()
    }

    pub fn with_producer(mut self, producer: Box<dyn Producer>) -> Self {
        self.producer = Some(producer);
        self
    }

    pub fn with_processor(mut self, node: NodeId, processor: Arc<dyn Processor>) -> Self {
        self.processors.insert(node, processor);
        self
    }

    pub fn with_consumer(mut self, node: NodeId, consumer: Box<dyn Consumer>) -> Self {
        self.consumers.insert(node, consumer);
        self
    }
}

/// The compiled, running pipeline (§4.8, C8). `new` validates the graph,
/// compiles it to a plan, and assigns devices; `run` wires every queue and
/// starts every worker; `join`/`stop` wait for or request completion.
pub struct Flow {
    graph: Graph,
    plan: Plan,
    impls: Option<NodeImpls>,
    config: EngineConfig,
    termination: TerminationFlag,
    handles: Vec<JoinHandle<()>>,
    started_at: Option<Instant>,
}

impl Flow {
    /// Validates `graph`, compiles it into a linear plan (appending the
    /// trailing accountant consumer), and assigns devices to every
    /// GPU-preferring processor. Does not start any worker; call `run` for
    /// that.
    pub fn new(
        mut graph: Graph,
        producer: NodeId,
        consumers: &[NodeId],
        mut impls: NodeImpls,
        config: EngineConfig,
    ) -> Result<Self, FlowError> {
        let (plan, metadata_consumer) =
            compile(&mut graph, producer, consumers, config.accountant_threshold_multiplier)?;

        GraphValidated {
            node_count: graph.nodes().count(),
            producer,
            consumer_count: consumers.len(),
        }
        .log();

        let order: Vec<NodeId> = plan.entries.iter().map(|e| e.node).collect();
        let placements = device::plan_placements(&graph, &order)?;

        // Device placement is realized here by calling `change_device`
        // directly on the shared processor instance rather than by setting
        // process-wide accelerator-visibility environment per worker: this
        // engine's workers are threads in one process, not subprocesses, so
        // there is no per-worker environment to set (see DESIGN.md).
        for &node in &order {
            let preference = match graph.node(node).kind.device_preference() {
                Some(p) => p,
                None => continue,
            };
            let demoted = preference.wants_gpu() && placements.get(&node) == Some(&device::Placement::Cpu);
            if demoted {
                if let Some(processor) = impls.processors.get(&node) {
                    processor.change_device(DevicePreference::Cpu);
                }
                ProcessorDemoted { node }.log();
            }
        }

        impls.consumers.insert(plan.accountant, Box::new(metadata_consumer));

        Ok(Flow {
            graph,
            plan,
            impls: Some(impls),
            config,
            termination: TerminationFlag::new(),
            handles: Vec::new(),
            started_at: None,
        })
    }

    /// Wires a bounded queue per edge in the plan's linear chain and starts
    /// one worker per entry (or, for a replicated processor, the N+2 worker
    /// pool of §4.5). Non-blocking: returns once every thread has been
    /// spawned.
    pub fn run(&mut self) {
        let impls = self.impls.take().expect("Flow::run called more than once");
        let mode = self.config.mode;
        let capacity = self.config.queue_capacity.max(1);
        let n = self.plan.entries.len();

        let mut edges = Vec::with_capacity(n.saturating_sub(1));
        for _ in 0..n.saturating_sub(1) {
            edges.push(edge::<RawInputMap>(capacity));
        }
        let (tx_list, rx_list): (Vec<_>, Vec<_>) = edges.into_iter().unzip();
        let mut tx_slots: Vec<Option<_>> = tx_list.into_iter().map(Some).collect();
        let mut rx_slots: Vec<Option<_>> = rx_list.into_iter().map(Some).collect();

        let mut producer_impl = impls.producer;
        let mut processors = impls.processors;
        let mut consumers = impls.consumers;

        for (i, entry) in self.plan.entries.iter().enumerate() {
            let node = entry.node;
            let input = if i == 0 { None } else { rx_slots[i - 1].take() };
            let output = if i == n - 1 { None } else { tx_slots[i].take() };
            let kind = self.graph.node(node).kind;
            let is_last = entry.is_last;
            let termination = self.termination.clone();

            match kind {
                NodeKind::Producer => {
                    let mut producer = producer_impl
                        .take()
                        .expect("producer implementation not registered for the graph's producer node");
                    let mut messenger = build_messenger(mode, node, Vec::new(), input, output, termination);
                    self.handles.push(thread::spawn(move || {
                        run_producer(node, producer.as_mut(), messenger.as_mut(), is_last);
                    }));
                }
                NodeKind::Processor { replica_count, .. } => {
                    let parents = self
                        .graph
                        .node(node)
                        .parents()
                        .expect("processor node must be wired before Flow::run")
                        .to_vec();
                    let processor = processors
                        .remove(&node)
                        .unwrap_or_else(|| panic!("no processor implementation registered for node {}", node));

                    if replica_count > 1 {
                        let input = input.expect("replicated processor must have an upstream queue");
                        let handles = super::replica::spawn_pool(
                            node,
                            parents,
                            replica_count,
                            processor,
                            mode,
                            input,
                            output,
                            termination,
                        );
                        self.handles.extend(handles);
                    } else {
                        let mut messenger = build_messenger(mode, node, parents, input, output, termination);
                        self.handles.push(thread::spawn(move || {
                            run_processor(node, processor.as_ref(), messenger.as_mut());
                        }));
                    }
                }
                NodeKind::Consumer { metadata } => {
                    let parents = self
                        .graph
                        .node(node)
                        .parents()
                        .expect("consumer node must be wired before Flow::run")
                        .to_vec();
                    let mut consumer = consumers
                        .remove(&node)
                        .unwrap_or_else(|| panic!("no consumer implementation registered for node {}", node));
                    let mut messenger = build_messenger(mode, node, parents, input, output, termination);
                    self.handles.push(thread::spawn(move || {
                        run_consumer(node, consumer.as_mut(), messenger.as_mut(), is_last, metadata);
                    }));
                }
            }
        }

        self.started_at = Some(Instant::now());
        FlowStarted {
            worker_count: self.handles.len(),
            mode: match mode {
                Mode::Realtime => "realtime",
                Mode::Batch => "batch",
            },
        }
        .log();
    }

    /// Blocks until every worker thread has exited.
    pub fn join(mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
        if let Some(started_at) = self.started_at {
            FlowJoined {
                duration: started_at.elapsed(),
            }
            .log();
        }
    }

    /// Requests graceful termination: sets the shared flag a producer polls
    /// at the top of its loop, then blocks until every worker exits.
    pub fn stop(self) {
        FlowStopRequested.log();
        self.termination.set();
        self.join();
    }
}
