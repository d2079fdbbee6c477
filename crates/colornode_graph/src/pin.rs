// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin definitions for node inputs/outputs.

use crate::id::next_raw_id;
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PinId(pub(crate) u64);

impl PinId {
    /// Allocate a new pin ID from the shared counter
    pub(crate) fn new() -> Self {
        Self(next_raw_id())
    }

    /// Raw integer value, e.g. for use as a widget attribute id
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pin#{}", self.0)
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// Input pin, fed by at most one edge or by a direct edit
    Input,
    /// Output pin, holds the latest result of the owning node
    Output,
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// A named scalar slot on a node
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    /// Unique pin ID
    pub id: PinId,
    /// Pin name
    pub name: String,
    /// Pin direction
    pub direction: PinDirection,
    /// Current value
    pub value: f32,
    /// Owning node
    pub node: NodeId,
}

impl Pin {
    /// Create a new input pin holding `value` until something overwrites it
    pub fn input(node: NodeId, name: impl Into<String>, value: f32) -> Self {
        Self {
            id: PinId::new(),
            name: name.into(),
            direction: PinDirection::Input,
            value,
            node,
        }
    }

    /// Create a new output pin
    pub fn output(node: NodeId, name: impl Into<String>) -> Self {
        Self {
            id: PinId::new(),
            name: name.into(),
            direction: PinDirection::Output,
            value: 0.0,
            node,
        }
    }

    /// Whether this is an input pin
    pub fn is_input(&self) -> bool {
        self.direction == PinDirection::Input
    }

    /// Whether this is an output pin
    pub fn is_output(&self) -> bool {
        self.direction == PinDirection::Output
    }
}
