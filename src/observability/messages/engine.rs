// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages for the engine driver's lifecycle (§4.8): `Flow::run`,
//! `Flow::join`, `Flow::stop`.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use tracing::Span;

use super::StructuredLog;

/// A `Flow` finished compiling its plan and started every worker.
///
/// # Log Level
/// `info!`
pub struct FlowStarted {
    pub worker_count: usize,
    pub mode: &'static str,
}

impl Display for FlowStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "flow started: {} worker(s), {} mode",
            self.worker_count, self.mode
        )
    }
}

impl StructuredLog for FlowStarted {
    fn log(&self) {
        tracing::info!(worker_count = self.worker_count, mode = self.mode, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "flow_started",
            span_name = name,
            worker_count = self.worker_count,
            mode = self.mode,
        )
    }
}

/// `Flow::stop` was called; the termination flag was set.
///
/// # Log Level
/// `info!`
pub struct FlowStopRequested;

impl Display for FlowStopRequested {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "flow stop requested, waiting for workers to drain")
    }
}

impl StructuredLog for FlowStopRequested {
    fn log(&self) {
        tracing::info!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("flow_stop_requested", span_name = name)
    }
}

/// All workers joined; the flow finished.
///
/// # Log Level
/// `info!`
pub struct FlowJoined {
    pub duration: Duration,
}

impl Display for FlowJoined {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "flow joined after {:?}", self.duration)
    }
}

impl StructuredLog for FlowJoined {
    fn log(&self) {
        tracing::info!(duration_ms = self.duration.as_millis() as u64, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "flow_joined",
            span_name = name,
            duration_ms = self.duration.as_millis() as u64,
        )
    }
}
