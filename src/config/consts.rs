// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default capacity of every inter-worker queue (§4.3). The spec's suggested
/// default; callers needing more slack for batch mode raise it per pipeline.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// Default accountant reporting threshold multiplier (§4.7): a report fires
/// once `multiplier * node_count` metadata messages have been observed.
pub const DEFAULT_ACCOUNTANT_THRESHOLD_MULTIPLIER: u64 = 40;
