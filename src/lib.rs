// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod accountant; // streaming throughput statistics
pub mod config;     // pipeline-level configuration
pub mod data;       // the opaque record and raw-input map
pub mod device;     // accelerator discovery and placement
pub mod engine;     // plan compilation and the Flow driver
pub mod errors;     // error handling
pub mod graph;      // node/graph model, validation, task-module fusion
pub mod messenger;  // inter-worker transport
pub mod observability;
pub mod tasks;      // the producer/processor/consumer task loops
pub mod traits;     // unified node abstractions
