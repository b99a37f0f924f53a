// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Accelerator discovery and device placement (§4.6).

mod accelerators;
mod placement;

pub use accelerators::available_accelerators;
pub use placement::{plan_placements, Placement};
