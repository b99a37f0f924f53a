// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The node interface user code must implement (§6): one trait per kind,
//! plus the lifecycle hooks shared by all three.

mod node;

pub use node::{Consumer, Lifecycle, NodeError, Processor, Producer};
