// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages for the streaming throughput accountant (§4.7).

use std::fmt::{Display, Formatter};

use tracing::Span;

use super::StructuredLog;

/// One row of a bottleneck report.
pub struct NodeThroughputRow<'a> {
    pub node: &'a str,
    pub possible_fps: f64,
    pub actual_fps: f64,
    pub bottleneck: bool,
    pub effective_bottleneck: bool,
}

/// The accountant's periodic or final bottleneck report (§4.7): a
/// human-readable table plus the same data as structured fields via `log`.
///
/// # Log Level
/// `info!`
pub struct BottleneckReport<'a> {
    pub rows: &'a [NodeThroughputRow<'a>],
    pub final_report: bool,
}

impl Display for BottleneckReport<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "{} throughput report ({} nodes):",
            if self.final_report { "final" } else { "periodic" },
            self.rows.len()
        )?;
        writeln!(
            f,
            "{:<20} {:>12} {:>12} {:>11} {:>11}",
            "node", "possible_fps", "actual_fps", "bottleneck", "effective"
        )?;
        for row in self.rows {
            writeln!(
                f,
                "{:<20} {:>12.2} {:>12.2} {:>11} {:>11}",
                row.node, row.possible_fps, row.actual_fps, row.bottleneck, row.effective_bottleneck
            )?;
        }
        Ok(())
    }
}

impl StructuredLog for BottleneckReport<'_> {
    fn log(&self) {
        tracing::info!(
            final_report = self.final_report,
            node_count = self.rows.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "bottleneck_report",
            span_name = name,
            final_report = self.final_report,
            node_count = self.rows.len(),
        )
    }
}
