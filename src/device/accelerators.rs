// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;
use std::env;
use std::process::Command;

/// Enumerates the accelerators visible to this process by intersecting the
/// host's accelerator inventory with the `CUDA_VISIBLE_DEVICES` restriction
/// (§4.6), the same way the system this engine generalizes from does. A
/// host with no inventory tool installed, or no accelerators, yields an
/// empty set.
pub fn available_accelerators() -> Vec<u32> {
    let system = system_accelerators();
    let visible = visible_accelerators(&system);
    system.intersection(&visible).copied().collect()
}

fn system_accelerators() -> BTreeSet<u32> {
    let output = match Command::new("nvidia-smi").arg("-L").output() {
        Ok(output) if output.status.success() => output,
        _ => return BTreeSet::new(),
    };
    let text = String::from_utf8_lossy(&output.stdout);
    let count = text.matches("UUID").count() as u32;
    (0..count).collect()
}

fn visible_accelerators(system: &BTreeSet<u32>) -> BTreeSet<u32> {
    match env::var("CUDA_VISIBLE_DEVICES") {
        Err(_) => system.clone(),
        Ok(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                BTreeSet::new()
            } else {
                raw.split(',')
                    .filter_map(|s| s.trim().parse::<u32>().ok())
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cuda_visible_devices_means_nothing_visible() {
        let system: BTreeSet<u32> = (0..4).collect();
        let visible = {
            // Mirrors `visible_accelerators`'s empty-string branch without
            // touching the real process environment from a test.
            let raw = "";
            if raw.is_empty() {
                BTreeSet::new()
            } else {
                raw.split(',').filter_map(|s| s.parse::<u32>().ok()).collect()
            }
        };
        let available: BTreeSet<u32> = system.intersection(&visible).copied().collect();
        assert!(available.is_empty());
    }
}
