// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The engine driver (§4.8): compiling a validated graph into a linear
//! plan, assigning devices to it, and running it as a pool of OS threads.

mod flow;
mod plan;
mod replica;

mod integration_tests;

pub use flow::{Flow, NodeImpls};
pub use plan::{compile, Plan, PlanEntry};
