// SPDX-License-Identifier: MIT OR Apache-2.0
//! The graph the driver starts with.
//!
//! ```text
//! time ──► sine ─────────────────► output.r
//!   └────► multiply(×0.5) ► sine ► output.g
//!                                  output.b = 0.5
//! ```

use colornode_graph::{ColorEditor, EditorError, NodeId, NodeKind, PinId};

/// Error building the demo scene
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Editor rejected a step
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// A node lacks a pin the scene wires up
    #[error("{node} has no pin named {name:?}")]
    MissingPin {
        /// Node
        node: NodeId,
        /// Pin name, or "output" for the first output
        name: String,
    },
}

/// Ids of the nodes in the demo graph
#[derive(Debug, Clone, Copy)]
pub struct PulseScene {
    /// Color sink
    pub output: NodeId,
    /// Clock source shared by both channels
    pub time: NodeId,
}

/// Build a pulsing red/green scene in an empty editor
pub fn build_pulse_scene(editor: &mut ColorEditor) -> Result<PulseScene, SceneError> {
    let output = editor.add_node(NodeKind::Output)?;
    let time = editor.add_node(NodeKind::Time)?;
    let fast = editor.add_node(NodeKind::Sine)?;
    let scale = editor.add_node(NodeKind::Multiply)?;
    let slow = editor.add_node(NodeKind::Sine)?;

    let time_out = output_pin(editor, time)?;
    editor.link(time_out, input_pin(editor, fast, "theta")?)?;
    editor.link(output_pin(editor, fast)?, input_pin(editor, output, "r")?)?;

    editor.link(time_out, input_pin(editor, scale, "left")?)?;
    editor.set_value(input_pin(editor, scale, "right")?, 0.5)?;
    editor.link(output_pin(editor, scale)?, input_pin(editor, slow, "theta")?)?;
    editor.link(output_pin(editor, slow)?, input_pin(editor, output, "g")?)?;

    editor.set_value(input_pin(editor, output, "b")?, 0.5)?;

    tracing::info!(
        "Built pulse scene: {} nodes, {} edges",
        editor.graph().node_count(),
        editor.graph().edge_count()
    );
    Ok(PulseScene { output, time })
}

fn output_pin(editor: &ColorEditor, node: NodeId) -> Result<PinId, SceneError> {
    let pins = &editor.graph().node(node).map_err(EditorError::from)?.outputs;
    pins.first().map(|p| p.id).ok_or_else(|| SceneError::MissingPin {
        node,
        name: "output".to_string(),
    })
}

fn input_pin(editor: &ColorEditor, node: NodeId, name: &str) -> Result<PinId, SceneError> {
    let found = editor.graph().node(node).map_err(EditorError::from)?;
    found.input_named(name).map(|p| p.id).ok_or_else(|| SceneError::MissingPin {
        node,
        name: name.to_string(),
    })
}
