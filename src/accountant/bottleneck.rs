// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bottleneck classification (§4.7): a node is a bottleneck if it is slower
//! than the pipeline's single producer, and an *effective* bottleneck if it
//! is also slower than whatever precedes it — the first place along the
//! chain where the slowdown actually originates.

/// `node_proctime` is not a producer and exceeds the producer's mean
/// proctime.
pub fn is_bottleneck(is_producer: bool, node_proctime: f64, producer_proctime: f64) -> bool {
    !is_producer && node_proctime > producer_proctime
}

/// A bottleneck whose proctime also exceeds its immediate predecessor's in
/// topological order — the predecessor is `None` only for the producer
/// itself, which is never a bottleneck.
pub fn is_effective_bottleneck(
    is_bottleneck: bool,
    node_proctime: f64,
    predecessor_proctime: Option<f64>,
) -> bool {
    is_bottleneck && predecessor_proctime.map_or(false, |p| node_proctime > p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slower_than_producer_is_bottleneck() {
        assert!(is_bottleneck(false, 0.5, 0.1));
        assert!(!is_bottleneck(false, 0.05, 0.1));
        assert!(!is_bottleneck(true, 0.5, 0.1));
    }

    #[test]
    fn effective_requires_exceeding_predecessor() {
        assert!(is_effective_bottleneck(true, 0.5, Some(0.2)));
        assert!(!is_effective_bottleneck(true, 0.5, Some(0.6)));
        assert!(!is_effective_bottleneck(false, 0.5, Some(0.2)));
        assert!(!is_effective_bottleneck(true, 0.5, None));
    }
}
