// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph.

use crate::id::next_raw_id;
use crate::pin::{Pin, PinId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    /// Allocate a new node ID from the shared counter
    pub(crate) fn new() -> Self {
        Self(next_raw_id())
    }

    /// Raw integer value, e.g. for use as a widget id
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// The operation a node performs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// `result = left + right`
    Add,
    /// `result = left * right`
    Multiply,
    /// `value = |sin(theta)|`
    Sine,
    /// `time = current frame time in seconds`
    Time,
    /// Color sink with `r`, `g`, `b` inputs and no outputs
    Output,
    /// A user-set scalar exposed on a single `value` output
    Constant(f32),
}

impl NodeKind {
    /// Kinds offered by the "add node" menu, in menu order
    pub const MENU: [NodeKind; 6] = [
        NodeKind::Add,
        NodeKind::Multiply,
        NodeKind::Output,
        NodeKind::Sine,
        NodeKind::Time,
        NodeKind::Constant(0.0),
    ];

    /// Display name used as the node title
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Multiply => "multiply",
            Self::Sine => "sine",
            Self::Time => "time",
            Self::Output => "output",
            Self::Constant(_) => "constant",
        }
    }

    /// Build a node of this kind with freshly allocated pins
    pub fn build(self, id: NodeId) -> Node {
        let (inputs, outputs) = match self {
            Self::Add | Self::Multiply => (
                vec![Pin::input(id, "left", 0.0), Pin::input(id, "right", 0.0)],
                vec![Pin::output(id, "result")],
            ),
            Self::Sine => (
                vec![Pin::input(id, "theta", 0.0)],
                vec![Pin::output(id, "value")],
            ),
            Self::Time => (vec![], vec![Pin::output(id, "time")]),
            Self::Output => (
                vec![
                    Pin::input(id, "r", 0.0),
                    Pin::input(id, "g", 0.0),
                    Pin::input(id, "b", 0.0),
                ],
                vec![],
            ),
            Self::Constant(value) => {
                let mut out = Pin::output(id, "value");
                out.value = value;
                (vec![], vec![out])
            }
        };

        Node {
            id,
            kind: self,
            name: self.display_name().to_string(),
            inputs,
            outputs,
            mark: EvalMark::Unvisited,
        }
    }
}

/// Per-node evaluation state, keyed by frame number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalMark {
    /// Never evaluated
    #[default]
    Unvisited,
    /// Evaluation of this node started in the given frame and has not finished
    InProgress(u64),
    /// Evaluation of this node finished in the given frame
    Done(u64),
}

impl EvalMark {
    /// Whether the node was fully evaluated during `frame`
    pub fn is_done_in(self, frame: u64) -> bool {
        self == Self::Done(frame)
    }

    /// Whether the node is on the evaluation stack of `frame`
    pub fn is_in_progress_in(self, frame: u64) -> bool {
        self == Self::InProgress(frame)
    }
}

/// A node instance in the graph
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Operation performed by this node
    pub kind: NodeKind,
    /// Display name
    pub name: String,
    /// Input pins, in declaration order
    pub inputs: Vec<Pin>,
    /// Output pins, in declaration order
    pub outputs: Vec<Pin>,
    /// Evaluation state of the last frame that touched this node
    pub mark: EvalMark,
}

impl Node {
    /// Get an input pin by name
    pub fn input_named(&self, name: &str) -> Option<&Pin> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Get an output pin by name
    pub fn output_named(&self, name: &str) -> Option<&Pin> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Get a pin by ID
    pub fn pin(&self, pin_id: PinId) -> Option<&Pin> {
        self.pins().find(|p| p.id == pin_id)
    }

    /// Get a mutable pin by ID
    pub fn pin_mut(&mut self, pin_id: PinId) -> Option<&mut Pin> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|p| p.id == pin_id)
    }

    /// Get all pins, inputs first
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Whether this node owns the given pin
    pub fn owns_pin(&self, pin_id: PinId) -> bool {
        self.pin(pin_id).is_some()
    }

    /// A node without outputs; valid evaluation entry point
    pub fn is_sink(&self) -> bool {
        self.outputs.is_empty()
    }

    /// A node without inputs
    pub fn is_source(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Value of the first output pin, if any
    pub fn result(&self) -> Option<f32> {
        self.outputs.first().map(|p| p.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_layouts() {
        let add = NodeKind::Add.build(NodeId::new());
        assert_eq!(add.name, "add");
        assert!(add.input_named("left").is_some());
        assert!(add.input_named("right").is_some());
        assert!(add.output_named("result").is_some());

        let sine = NodeKind::Sine.build(NodeId::new());
        assert_eq!(sine.inputs.len(), 1);
        assert_eq!(sine.outputs[0].name, "value");

        let time = NodeKind::Time.build(NodeId::new());
        assert!(time.is_source());
        assert!(!time.is_sink());

        let output = NodeKind::Output.build(NodeId::new());
        assert!(output.is_sink());
        let names: Vec<_> = output.inputs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["r", "g", "b"]);
    }

    #[test]
    fn test_pins_are_owned_by_node() {
        let id = NodeId::new();
        let node = NodeKind::Multiply.build(id);
        assert!(node.pins().all(|p| p.node == id));
        let right = node.inputs[1].id;
        assert!(node.owns_pin(right));
        assert_eq!(node.pin(right).map(|p| p.name.as_str()), Some("right"));
    }

    #[test]
    fn test_constant_seeds_output() {
        let node = NodeKind::Constant(2.5).build(NodeId::new());
        assert_eq!(node.result(), Some(2.5));
    }

    #[test]
    fn test_eval_mark() {
        let mark = EvalMark::Done(3);
        assert!(mark.is_done_in(3));
        assert!(!mark.is_done_in(4));
        assert!(EvalMark::InProgress(3).is_in_progress_in(3));
        assert_eq!(EvalMark::default(), EvalMark::Unvisited);
    }
}
