// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::errors::PlacementError;
use crate::graph::{Graph, NodeId};
use crate::observability::messages::device::{AcceleratorsDiscovered, ProcessorDemoted, ProcessorPlaced};
use crate::observability::messages::StructuredLog;

use super::accelerators::available_accelerators;

/// Where a processor ended up after placement (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Gpu(u32),
    Cpu,
}

/// Assigns accelerator identifiers to GPU-preferring processors in
/// topological order, demoting a processor that tolerates CPU once
/// accelerators are exhausted, and failing fatally for one that requires a
/// GPU (§4.6). Non-GPU-preferring processors and non-processor nodes are
/// left out of the map entirely.
pub fn plan_placements(graph: &Graph, order: &[NodeId]) -> Result<HashMap<NodeId, Placement>, PlacementError> {
    let accelerators = available_accelerators();
    AcceleratorsDiscovered {
        count: accelerators.len(),
    }
    .log();

    let mut pool = accelerators.into_iter();
    let mut placements = HashMap::new();

    for &node in order {
        let preference = match graph.node(node).kind.device_preference() {
            Some(p) => p,
            None => continue,
        };

        if !preference.wants_gpu() {
            placements.insert(node, Placement::Cpu);
            continue;
        }

        match pool.next() {
            Some(id) => {
                let label = id.to_string();
                ProcessorPlaced {
                    node,
                    accelerator: &label,
                }
                .log();
                placements.insert(node, Placement::Gpu(id));
            }
            None if preference.tolerates_cpu() => {
                ProcessorDemoted { node }.log();
                placements.insert(node, Placement::Cpu);
            }
            None => return Err(PlacementError::NoGpuAvailable(node)),
        }
    }

    Ok(placements)
}
