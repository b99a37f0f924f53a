// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Streaming throughput accounting (§4.7): Welford statistics per node fed
//! by a trailing metadata-only consumer, and bottleneck classification.

mod bottleneck;
mod consumer;
mod report;
mod welford;

pub use consumer::MetadataConsumer;
pub use welford::Welford;
