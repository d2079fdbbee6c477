// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demand-driven graph evaluation.
//!
//! Evaluation starts at a node (normally the output sink) and pulls values
//! through the edges feeding its inputs, depth first. Each node is visited
//! at most once per frame: its [`EvalMark`] records the frame it last
//! finished in, so diamond-shaped graphs compute shared upstream nodes once
//! and every consumer sees the same value.

use crate::graph::{Graph, GraphError};
use crate::node::{EvalMark, NodeId};
use crate::operation::{BuiltinOperations, FrameContext, NodeOperation};
use crate::pin::PinId;

/// State for one evaluation pass
pub struct EvaluationContext<'a, O: NodeOperation> {
    /// The graph being evaluated
    graph: &'a mut Graph,
    /// Operation dispatch
    ops: &'a mut O,
    /// Frame being evaluated
    frame: FrameContext,
}

impl<'a, O: NodeOperation> EvaluationContext<'a, O> {
    /// Create a new evaluation context
    pub fn new(graph: &'a mut Graph, ops: &'a mut O, frame: FrameContext) -> Self {
        Self { graph, ops, frame }
    }

    /// Evaluate `node_id` and everything upstream of it
    pub fn evaluate(&mut self, node_id: NodeId) -> Result<(), EvaluationError> {
        let frame = self.frame.frame;
        let node = self
            .graph
            .node_mut(node_id)
            .map_err(|_| EvaluationError::NodeNotFound(node_id))?;

        if node.mark.is_done_in(frame) {
            return Ok(());
        }
        if node.mark.is_in_progress_in(frame) {
            return Err(EvaluationError::CycleDetected(node_id));
        }
        node.mark = EvalMark::InProgress(frame);

        let inputs: Vec<PinId> = node.inputs.iter().map(|p| p.id).collect();
        if let Err(err) = self.pull_inputs(&inputs) {
            // Leave no half-visited nodes behind for a retry of this frame
            if let Ok(node) = self.graph.node_mut(node_id) {
                node.mark = EvalMark::Unvisited;
            }
            return Err(err);
        }

        let node = self.graph.node_mut(node_id)?;
        self.ops.invoke(node, &self.frame);
        node.mark = EvalMark::Done(frame);
        tracing::trace!("Evaluated {} ({}) in frame {}", node_id, node.name, frame);
        Ok(())
    }

    fn pull_inputs(&mut self, inputs: &[PinId]) -> Result<(), EvaluationError> {
        for &to_pin in inputs {
            // Unconnected pins keep their edited or default value
            let Some(edge) = self.graph.edge_into(to_pin) else {
                continue;
            };
            let (upstream, from_pin) = (edge.from_node, edge.from_pin);

            self.evaluate(upstream)?;

            let value = self.graph.pin(from_pin)?.value;
            self.graph.pin_mut(to_pin)?.value = value;
        }
        Ok(())
    }
}

/// Evaluate `sink` for one frame with a custom operation table
pub fn evaluate<O: NodeOperation>(
    graph: &mut Graph,
    sink: NodeId,
    frame: FrameContext,
    ops: &mut O,
) -> Result<(), EvaluationError> {
    EvaluationContext::new(graph, ops, frame).evaluate(sink)
}

/// Evaluate `sink` for one frame with the built-in operations
pub fn evaluate_builtin(
    graph: &mut Graph,
    sink: NodeId,
    frame: FrameContext,
) -> Result<(), EvaluationError> {
    evaluate(graph, sink, frame, &mut BuiltinOperations)
}

/// Error during evaluation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// A node was reached again while its own inputs were being pulled
    #[error("Graph contains a cycle through {0}")]
    CycleDetected(NodeId),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Graph lookup failed mid-pass
    #[error(transparent)]
    Graph(#[from] GraphError),
}
