// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline-level configuration (§4.9): scheduling mode, queue capacity, and
//! accountant/telemetry tuning, loadable from YAML in the same style as the
//! teacher's `config::loader` module.

mod consts;
mod engine;
mod loader;

pub use consts::{DEFAULT_ACCOUNTANT_THRESHOLD_MULTIPLIER, DEFAULT_QUEUE_CAPACITY};
pub use engine::EngineConfig;
pub use loader::load_config;
