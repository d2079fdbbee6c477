// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-kind node operations.

use crate::node::{Node, NodeKind};
use crate::pin::Pin;

/// Values shared by every node evaluated during one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Frame number, strictly increasing between passes
    pub frame: u64,
    /// Time in seconds, sampled once before the pass
    pub time_seconds: f32,
}

impl FrameContext {
    /// Create a frame context
    pub fn new(frame: u64, time_seconds: f32) -> Self {
        Self { frame, time_seconds }
    }
}

/// Trait for running a node's operation over its pins
pub trait NodeOperation {
    /// Read `node`'s input pins and write its output pins
    fn invoke(&mut self, node: &mut Node, ctx: &FrameContext);
}

/// The built-in operation table
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinOperations;

impl NodeOperation for BuiltinOperations {
    fn invoke(&mut self, node: &mut Node, ctx: &FrameContext) {
        node.kind.apply(&node.inputs, &mut node.outputs, ctx);
    }
}

impl NodeKind {
    /// Compute output pin values from input pin values.
    ///
    /// Pins missing from the expected layout leave the outputs untouched.
    pub fn apply(&self, inputs: &[Pin], outputs: &mut [Pin], ctx: &FrameContext) {
        match (self, inputs, outputs) {
            (Self::Add, [left, right], [result]) => result.value = left.value + right.value,
            (Self::Multiply, [left, right], [result]) => result.value = left.value * right.value,
            (Self::Sine, [theta], [value]) => value.value = theta.value.sin().abs(),
            (Self::Time, [], [time]) => time.value = ctx.time_seconds,
            (Self::Constant(constant), [], [value]) => value.value = *constant,
            // Sinks consume their inputs after the pass
            (Self::Output, _, _) => {}
            (kind, _, _) => {
                tracing::trace!("Skipping {} with unexpected pin layout", kind.display_name());
            }
        }
    }
}
