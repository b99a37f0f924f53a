// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::data::{Metadata, Record};
use crate::graph::NodeId;
use crate::observability::messages::accountant::BottleneckReport;
use crate::observability::messages::StructuredLog;
use crate::traits::{Consumer, NodeError};

use super::report::{self, NodeStats};

/// The engine-appended trailing consumer every plan wires as a child of
/// every real node (§4.7, §4.8). It never sees a payload, only each
/// upstream node's recorded [`Metadata`] (its `NodeKind::Consumer` is
/// constructed with `metadata: true`), and feeds a per-node Welford
/// accumulator used to report bottlenecks.
///
/// Reports once the configured sample threshold is crossed, and again
/// unconditionally on `close` so a short-lived pipeline still gets a final
/// report (§4.7).
pub struct MetadataConsumer {
    parents: Vec<NodeId>,
    producer: NodeId,
    order: Vec<NodeId>,
    names: HashMap<NodeId, String>,
    threshold: u64,
    messages_observed: u64,
    reported: bool,
    stats: HashMap<NodeId, NodeStats>,
}

impl MetadataConsumer {
    /// `parents` is every node in the graph, in the order their metadata
    /// entries were wired into this consumer. `order` is the full plan's
    /// topological order, used to find each node's immediate predecessor.
    /// `threshold_multiplier` is `EngineConfig`'s reporting heuristic
    /// (default 40): a report fires once `threshold_multiplier * node_count`
    /// messages have been observed.
    pub fn new(
        parents: Vec<NodeId>,
        producer: NodeId,
        order: Vec<NodeId>,
        names: HashMap<NodeId, String>,
        threshold_multiplier: u64,
    ) -> Self {
        let node_count = parents.len().max(1) as u64;
        MetadataConsumer {
            parents,
            producer,
            order,
            names,
            threshold: threshold_multiplier * node_count,
            messages_observed: 0,
            reported: false,
            stats: HashMap::new(),
        }
    }

    fn record_sample(&mut self, node: NodeId, metadata: Metadata) {
        let entry = self.stats.entry(node).or_default();
        entry.proctime.update(metadata.proctime);
        entry.actual_proctime.update(metadata.actual_proctime);
    }

    fn emit_report(&self, final_report: bool) {
        let rows = report::build_rows(&self.order, self.producer, &self.stats, &self.names);
        BottleneckReport {
            rows: &rows,
            final_report,
        }
        .log();
    }
}

impl Consumer for MetadataConsumer {
    fn consume(&mut self, inputs: Vec<Record>) -> Result<(), NodeError> {
        for (&node, record) in self.parents.iter().zip(inputs.iter()) {
            let metadata = *record
                .downcast_ref::<Metadata>()
                .expect("metadata consumer must receive Metadata-wrapped records");
            self.record_sample(node, metadata);
        }

        self.messages_observed += 1;
        if !self.reported && self.messages_observed >= self.threshold {
            self.emit_report(false);
            self.reported = true;
        }

        Ok(())
    }

    fn close(&mut self) -> Result<(), NodeError> {
        self.emit_report(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Metadata;

    fn names(ids: &[NodeId]) -> HashMap<NodeId, String> {
        ids.iter().map(|&id| (id, id.to_string())).collect()
    }

    #[test]
    fn reports_once_threshold_crossed() {
        let producer = NodeId(0);
        let processor = NodeId(1);
        let parents = vec![producer, processor];
        let order = parents.clone();
        let mut consumer =
            MetadataConsumer::new(parents.clone(), producer, order, names(&parents), 2);

        for _ in 0..2 {
            consumer
                .consume(vec![
                    Record::new(Metadata {
                        proctime: 0.01,
                        actual_proctime: 0.01,
                    }),
                    Record::new(Metadata {
                        proctime: 0.02,
                        actual_proctime: 0.03,
                    }),
                ])
                .unwrap();
        }

        assert!(consumer.reported);
        assert_eq!(consumer.stats[&processor].proctime.count(), 2);
    }

    #[test]
    fn close_emits_final_report_even_without_threshold() {
        let producer = NodeId(0);
        let parents = vec![producer];
        let mut consumer =
            MetadataConsumer::new(parents.clone(), producer, parents.clone(), names(&parents), 40);
        consumer
            .consume(vec![Record::new(Metadata {
                proctime: 0.01,
                actual_proctime: 0.01,
            })])
            .unwrap();
        assert!(!consumer.reported);
        consumer.close().unwrap();
    }
}
