// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions for the graph.

use crate::id::next_raw_id;
use crate::node::NodeId;
use crate::pin::PinId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub(crate) u64);

impl EdgeId {
    /// Allocate a new edge ID from the shared counter
    pub(crate) fn new() -> Self {
        Self(next_raw_id())
    }

    /// Raw integer value, e.g. for use as a link id
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}

/// A directed connection from an output pin to an input pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Unique edge ID
    pub id: EdgeId,
    /// Node owning the source pin
    pub from_node: NodeId,
    /// Source output pin
    pub from_pin: PinId,
    /// Node owning the target pin
    pub to_node: NodeId,
    /// Target input pin
    pub to_pin: PinId,
}

impl Edge {
    /// Create a new edge
    pub(crate) fn new(from_node: NodeId, from_pin: PinId, to_node: NodeId, to_pin: PinId) -> Self {
        Self {
            id: EdgeId::new(),
            from_node,
            from_pin,
            to_node,
            to_pin,
        }
    }

    /// Check if this edge touches a pin of a specific node
    pub fn involves_node(&self, node_id: NodeId) -> bool {
        self.from_node == node_id || self.to_node == node_id
    }

    /// Check if this edge involves a specific pin
    pub fn involves_pin(&self, pin_id: PinId) -> bool {
        self.from_pin == pin_id || self.to_pin == pin_id
    }
}
