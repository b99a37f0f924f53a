// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};

/// Creates one bounded edge: a publishing worker gets the [`Sender`] half,
/// its single downstream consumer gets the [`Receiver`] half. Every queue in
/// a plan carries a [`crate::data::RawInputMap`], never a bare payload
/// (§4.3), so the chain can accumulate contributions from every upstream
/// node regardless of which nodes are this one's real graph parents.
pub fn edge<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    bounded(capacity)
}

/// The shared stop signal a producer polls at the top of its loop (§4.4) and
/// `Flow::stop` sets (§4.8). Cheap to clone; every worker in a plan holds one.
#[derive(Clone, Debug)]
pub struct TerminationFlag(Arc<AtomicBool>);

impl TerminationFlag {
    pub fn new() -> Self {
        TerminationFlag(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for TerminationFlag {
    fn default() -> Self {
        TerminationFlag::new()
    }
}
