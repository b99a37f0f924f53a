// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the three phases in which the engine can fail: graph
//! construction, device placement, and per-worker runtime execution (§7).

mod config;
mod construction;
mod flow;
mod placement;
mod runtime;

pub use config::ConfigError;
pub use construction::ConstructionError;
pub use flow::FlowError;
pub use placement::PlacementError;
pub use runtime::{RuntimeError, RuntimePhase};
