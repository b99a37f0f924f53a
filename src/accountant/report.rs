// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::graph::NodeId;
use crate::observability::messages::accountant::NodeThroughputRow;

use super::bottleneck::{is_bottleneck, is_effective_bottleneck};
use super::welford::Welford;

#[derive(Default, Clone, Copy)]
pub(super) struct NodeStats {
    pub(super) proctime: Welford,
    pub(super) actual_proctime: Welford,
}

/// Builds one report row per node that has accumulated at least one sample,
/// in topological order, classifying bottlenecks against the single
/// producer's mean proctime and each node's immediate predecessor (§4.7).
/// A node with no samples yet (not reached by any message so far) is
/// skipped and resets the predecessor comparison for whatever follows it.
pub(super) fn build_rows<'a>(
    order: &[NodeId],
    producer: NodeId,
    stats: &HashMap<NodeId, NodeStats>,
    names: &'a HashMap<NodeId, String>,
) -> Vec<NodeThroughputRow<'a>> {
    let producer_proctime = stats.get(&producer).map(|s| s.proctime.mean()).unwrap_or(0.0);

    let mut rows = Vec::new();
    let mut predecessor_proctime: Option<f64> = None;

    for &node in order {
        let node_stats = match stats.get(&node) {
            Some(s) => s,
            None => {
                predecessor_proctime = None;
                continue;
            }
        };

        let proctime_mean = node_stats.proctime.mean();
        let actual_mean = node_stats.actual_proctime.mean();
        let is_producer = node == producer;

        let bottleneck = is_bottleneck(is_producer, proctime_mean, producer_proctime);
        let effective = is_effective_bottleneck(bottleneck, proctime_mean, predecessor_proctime);

        rows.push(NodeThroughputRow {
            node: names.get(&node).map(|s| s.as_str()).unwrap_or("?"),
            possible_fps: if proctime_mean > 0.0 { 1.0 / proctime_mean } else { 0.0 },
            actual_fps: if actual_mean > 0.0 { 1.0 / actual_mean } else { 0.0 },
            bottleneck,
            effective_bottleneck: effective,
        });

        predecessor_proctime = Some(proctime_mean);
    }

    rows
}
