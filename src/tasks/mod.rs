// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The three task loops a worker thread runs (§4.4): producer, processor,
//! and consumer. Each is a free function rather than a struct, since a loop
//! owns no state beyond what it borrows for its single call — the plan
//! (`crate::engine::plan`) is what decides which loop a given worker runs.
//!
//! Cancellation here is external only: `crate::messenger::TerminationFlag`
//! is polled at loop-iteration boundaries (never from inside a blocking
//! `receive`/`publish`), which is the same "safe point" discipline the
//! system this engine generalizes from enforces by deferring OS signals
//! around its publish calls. This engine has no OS signal handling of its
//! own; `Flow::stop` is the only cancellation entry point (§4.8).

mod consumer;
mod processor;
mod producer;

pub use consumer::run as run_consumer;
pub use processor::run as run_processor;
pub use producer::run as run_producer;
