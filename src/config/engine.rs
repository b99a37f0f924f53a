// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use serde::Deserialize;

use crate::messenger::Mode;

use super::consts::{DEFAULT_ACCOUNTANT_THRESHOLD_MULTIPLIER, DEFAULT_QUEUE_CAPACITY};

/// Pipeline-level configuration (§4.9), optionally loaded from YAML.
///
/// Per-processor configuration (`replica_count`, `device_preference`) is set
/// at graph-construction time in code, not here — the graph is a Rust data
/// structure the embedding application builds, not a declarative DSL.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Realtime (lossy) or batch (lossless) scheduling, chosen once per
    /// pipeline (§4.3).
    #[serde(default)]
    pub mode: Mode,

    /// Capacity of every inter-worker bounded queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// The accountant's reporting threshold multiplier (§4.7): a report
    /// fires once `accountant_threshold_multiplier * node_count` messages
    /// have been observed.
    #[serde(default = "default_threshold_multiplier")]
    pub accountant_threshold_multiplier: u64,

    /// Directory the telemetry sink rotates `node_id,log_type,value` files
    /// into (§6). `None` disables the file sink; reports still go through
    /// `tracing`.
    #[serde(default)]
    pub telemetry_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            mode: Mode::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            accountant_threshold_multiplier: DEFAULT_ACCOUNTANT_THRESHOLD_MULTIPLIER,
            telemetry_dir: None,
        }
    }
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_threshold_multiplier() -> u64 {
    DEFAULT_ACCOUNTANT_THRESHOLD_MULTIPLIER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_heuristics() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.queue_capacity, 1);
        assert_eq!(cfg.accountant_threshold_multiplier, 40);
        assert_eq!(cfg.mode, Mode::Realtime);
    }

    #[test]
    fn parses_partial_yaml_with_defaults() {
        let yaml = "mode: batch\n";
        let cfg: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.mode, Mode::Batch);
        assert_eq!(cfg.queue_capacity, 1);
        assert_eq!(cfg.accountant_threshold_multiplier, 40);
    }

    #[test]
    fn parses_full_yaml() {
        let yaml = r#"
mode: realtime
queue_capacity: 4
accountant_threshold_multiplier: 100
telemetry_dir: /tmp/flow-telemetry
"#;
        let cfg: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.queue_capacity, 4);
        assert_eq!(cfg.accountant_threshold_multiplier, 100);
        assert_eq!(cfg.telemetry_dir, Some(PathBuf::from("/tmp/flow-telemetry")));
    }
}
