// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph engine for the `ColorNode` editor.
//!
//! A small directed graph of nodes (add, multiply, sine, time, constant and
//! a color output sink) whose pins carry scalar values. Edges run from an
//! output pin to an input pin.
//!
//! ## Architecture
//!
//! - Nodes, pins and edges share one process-wide id counter
//! - The [`Graph`] store keeps edges free of dangling pins and cycles
//! - Evaluation pulls values from the sink back to its sources, running each
//!   node's operation once per frame
//! - [`ColorEditor`] wraps a graph with the output node and frame counter the
//!   rendering layer drives

mod id;

pub mod pin;
pub mod node;
pub mod edge;
pub mod graph;
pub mod operation;
pub mod evaluation;
pub mod color;
pub mod clock;
pub mod editor;
pub mod shared;

pub use clock::{Clock, SystemClock};
pub use color::OutputColor;
pub use edge::{Edge, EdgeId};
pub use editor::{ColorEditor, EditorError, EditorSettings, Interaction};
pub use evaluation::{evaluate, evaluate_builtin, EvaluationContext, EvaluationError};
pub use graph::{ConnectionRule, Graph, GraphError};
pub use node::{EvalMark, Node, NodeId, NodeKind};
pub use operation::{BuiltinOperations, FrameContext, NodeOperation};
pub use pin::{Pin, PinDirection, PinId};
pub use shared::SharedEditor;
