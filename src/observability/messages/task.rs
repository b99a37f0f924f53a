// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages for worker lifecycle events (§4.4): `open`/`close`, once per
//! worker, not the per-record hot path (which logs plainly through
//! `tracing` directly — see `crate::tasks`).

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::graph::NodeId;

use super::StructuredLog;

/// A node's worker started and `open()` returned successfully.
///
/// # Log Level
/// `debug!`
pub struct WorkerOpened<'a> {
    pub node: NodeId,
    pub kind: &'a str,
}

impl Display for WorkerOpened<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} worker {} opened", self.kind, self.node)
    }
}

impl StructuredLog for WorkerOpened<'_> {
    fn log(&self) {
        tracing::debug!(node = %self.node, kind = self.kind, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("worker_opened", span_name = name, node = %self.node, kind = self.kind)
    }
}

/// A node's worker loop exited and `close()` ran.
///
/// # Log Level
/// `debug!`
pub struct WorkerClosed<'a> {
    pub node: NodeId,
    pub kind: &'a str,
}

impl Display for WorkerClosed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} worker {} closed", self.kind, self.node)
    }
}

impl StructuredLog for WorkerClosed<'_> {
    fn log(&self) {
        tracing::debug!(node = %self.node, kind = self.kind, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("worker_closed", span_name = name, node = %self.node, kind = self.kind)
    }
}

/// A node's `open()` hook returned an error; the worker starts its loop
/// anyway, since the canonical design has no separate "failed to start"
/// state — the next fatal error surfaces through the loop itself.
///
/// # Log Level
/// `error!`
pub struct WorkerOpenFailed<'a> {
    pub node: NodeId,
    pub kind: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerOpenFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} worker {} open() failed: {}", self.kind, self.node, self.error)
    }
}

impl StructuredLog for WorkerOpenFailed<'_> {
    fn log(&self) {
        tracing::error!(node = %self.node, kind = self.kind, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_open_failed",
            span_name = name,
            node = %self.node,
            kind = self.kind,
            error = %self.error,
        )
    }
}

/// A node's `close()` hook returned an error after its loop already exited.
///
/// # Log Level
/// `error!`
pub struct WorkerCloseFailed<'a> {
    pub node: NodeId,
    pub kind: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerCloseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} worker {} close() failed: {}", self.kind, self.node, self.error)
    }
}

impl StructuredLog for WorkerCloseFailed<'_> {
    fn log(&self) {
        tracing::error!(node = %self.node, kind = self.kind, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_close_failed",
            span_name = name,
            node = %self.node,
            kind = self.kind,
            error = %self.error,
        )
    }
}
