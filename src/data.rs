// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The opaque, dynamically-typed record that flows between nodes.
//!
//! The engine is payload-agnostic: a producer in one pipeline might emit frames,
//! another might emit rows, and a third might emit nothing but unit values for
//! testing. Rather than make the whole crate generic over a single payload type
//! (which would force every node in a graph to agree on one concrete type), a
//! [`Record`] erases its payload behind `Arc<dyn Any + Send + Sync>` and lets
//! user code downcast to the concrete type it expects from a given parent.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::graph::NodeId;

/// An opaque payload produced by a producer or returned by a processor.
#[derive(Clone)]
pub struct Record(Arc<dyn Any + Send + Sync>);

impl Record {
    /// Wraps a concrete value as an opaque record.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Record(Arc::new(value))
    }

    /// Attempts to view the record as a concrete type.
    ///
    /// Returns `None` if the record does not hold a `T`. A processor that
    /// receives a record of the wrong type has a bug in its graph wiring, not
    /// a recoverable runtime condition, so callers typically `expect` this.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Record(..)")
    }
}

/// Per-record timing metadata attached by the publishing task.
///
/// `proctime` is the wall time the node itself spent producing this record;
/// `actual_proctime` additionally includes time spent waiting on upstream.
/// Their divergence is what the accountant (§4.7 / [`crate::accountant`]) uses
/// to classify bottlenecks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Metadata {
    pub proctime: f64,
    pub actual_proctime: f64,
}

/// The distinguished end-of-stream marker, encoded as a variant of the wire
/// value rather than a sentinel string baked into the payload. This forces
/// every receiver to match both cases instead of comparing against a magic
/// value that a user node could accidentally produce.
#[derive(Debug, Clone)]
pub enum Wire {
    Record(Record),
    Sentinel,
}

impl Wire {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Wire::Sentinel)
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Wire::Record(r) => Some(r),
            Wire::Sentinel => None,
        }
    }
}

/// One entry of the raw-input map: a node's output, plus the metadata the
/// owning task measured while producing it.
#[derive(Debug, Clone)]
pub struct Entry {
    pub wire: Wire,
    pub metadata: Option<Metadata>,
}

impl Entry {
    pub fn record(wire: Wire, metadata: Metadata) -> Self {
        Entry {
            wire,
            metadata: Some(metadata),
        }
    }

    pub fn sentinel() -> Self {
        Entry {
            wire: Wire::Sentinel,
            metadata: None,
        }
    }
}

/// The unit carried on every inter-worker queue: a mapping from node identity
/// to that node's `{payload, metadata}`. A downstream task looks up its
/// declared parents' identities in this map rather than receiving a single
/// positional value, which is what lets any descendant observe the output of
/// any ancestor, not just its immediate parent (§3).
#[derive(Debug, Clone, Default)]
pub struct RawInputMap(HashMap<NodeId, Entry>);

impl RawInputMap {
    pub fn new() -> Self {
        RawInputMap(HashMap::new())
    }

    /// Inserts or overwrites the entry for `node`, as a publishing task does
    /// with its own identity before forwarding the map downstream.
    pub fn insert(&mut self, node: NodeId, entry: Entry) {
        self.0.insert(node, entry);
    }

    pub fn get(&self, node: NodeId) -> Option<&Entry> {
        self.0.get(&node)
    }

    /// Resolves the entries for `parents`, in order, failing loudly (I5) if
    /// any declared parent is missing from the map.
    pub fn entries_for(&self, parents: &[NodeId]) -> Vec<Entry> {
        parents
            .iter()
            .map(|id| {
                self.0
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| panic!("raw-input map missing entry for parent {:?}; this is an I5 violation and indicates an engine bug", id))
            })
            .collect()
    }

    /// True if any of `parents`' entries is the sentinel.
    pub fn any_sentinel(&self, parents: &[NodeId]) -> bool {
        parents
            .iter()
            .any(|id| self.0.get(id).map(|e| e.wire.is_sentinel()).unwrap_or(false))
    }
}
