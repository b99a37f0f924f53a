// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{ConstructionError, PlacementError};

/// The union of everything that can fail before a [`crate::engine::Flow`]
/// starts a single worker: compiling the plan (construction) and assigning
/// devices to it (placement). Runtime errors (§7) are per-worker and do not
/// appear here; they are logged against the failing node instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Placement(#[from] PlacementError),
}
