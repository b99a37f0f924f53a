// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::graph::NodeId;
use thiserror::Error;

/// Fatal errors raised while assigning devices to processors during `run`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    /// A processor that requires a GPU could not be placed: no accelerator
    /// was free and the processor does not tolerate CPU fallback (§4.6).
    #[error("node {0} requires a GPU but none is available and it does not tolerate CPU fallback")]
    NoGpuAvailable(NodeId),
}
