// SPDX-License-Identifier: MIT OR Apache-2.0
//! Color editor session: a graph, its output node and the frame counter.
//!
//! The rendering layer reads [`ColorEditor::graph`] to draw nodes, pins and
//! links, feeds user gestures back as [`Interaction`]s and calls
//! [`ColorEditor::tick`] once per frame to get the color to display.

use crate::clock::Clock;
use crate::color::OutputColor;
use crate::edge::EdgeId;
use crate::evaluation::{evaluate_builtin, EvaluationError};
use crate::graph::{Graph, GraphError};
use crate::node::{NodeId, NodeKind};
use crate::operation::FrameContext;
use crate::pin::PinId;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Color shown while there is no output node or evaluation fails
    pub fallback_color: OutputColor,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            fallback_color: OutputColor::FALLBACK,
        }
    }
}

/// A user gesture that modifies the graph
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Add a node from the menu
    AddNode(NodeKind),
    /// Delete a node and its links
    EraseNode(NodeId),
    /// Drag a link from an output pin to an input pin
    Link {
        /// Output pin
        from: PinId,
        /// Input pin
        to: PinId,
    },
    /// Detach or delete a link
    Unlink(EdgeId),
    /// Delete a selection as one step; links go first, then nodes
    DeleteSelection {
        /// Selected links
        edges: Vec<EdgeId>,
        /// Selected nodes
        nodes: Vec<NodeId>,
    },
    /// Drag the value widget of an unconnected input pin
    SetValue {
        /// Input pin
        pin: PinId,
        /// New value
        value: f32,
    },
    /// Edit the value of a constant node
    SetConstant {
        /// Constant node
        node: NodeId,
        /// New value
        value: f32,
    },
}

/// Color editor session state
#[derive(Debug, Clone, Default)]
pub struct ColorEditor {
    /// The graph being edited
    graph: Graph,
    /// The single output node, if one exists
    output: Option<NodeId>,
    /// Last frame number handed to the evaluator
    frame: u64,
    /// Color produced by the last tick
    color: OutputColor,
    /// Settings
    settings: EditorSettings,
}

impl ColorEditor {
    /// Create an empty editor
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            graph: Graph::new(),
            output: None,
            frame: 0,
            color: settings.fallback_color,
            settings,
        }
    }

    /// The graph, for drawing
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The output node, if one exists
    pub fn output(&self) -> Option<NodeId> {
        self.output
    }

    /// The last evaluated frame number
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The color produced by the last tick
    pub fn color(&self) -> OutputColor {
        self.color
    }

    /// The editor settings
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Whether an input pin should show an editable value widget
    pub fn is_editable(&self, pin_id: PinId) -> bool {
        self.graph.pin(pin_id).is_ok_and(|p| p.is_input()) && self.graph.edge_into(pin_id).is_none()
    }

    /// Add a node. Only one output node may exist at a time.
    pub fn add_node(&mut self, kind: NodeKind) -> Result<NodeId, EditorError> {
        if kind == NodeKind::Output {
            if let Some(existing) = self.output {
                return Err(EditorError::OutputExists(existing));
            }
        }

        let id = self.graph.insert_node(kind);
        if kind == NodeKind::Output {
            self.output = Some(id);
        }
        Ok(id)
    }

    /// Erase a node and its links
    pub fn erase_node(&mut self, node_id: NodeId) -> Result<(), EditorError> {
        self.graph.erase_node(node_id)?;
        if self.output == Some(node_id) {
            tracing::debug!("Output node {} removed", node_id);
            self.output = None;
        }
        Ok(())
    }

    /// Link an output pin to an input pin
    pub fn link(&mut self, from: PinId, to: PinId) -> Result<EdgeId, EditorError> {
        Ok(self.graph.insert_edge(from, to)?)
    }

    /// Remove a link
    pub fn unlink(&mut self, edge_id: EdgeId) -> Result<(), EditorError> {
        self.graph.erase_edge(edge_id)?;
        Ok(())
    }

    /// Set the value of an input pin
    pub fn set_value(&mut self, pin_id: PinId, value: f32) -> Result<(), EditorError> {
        Ok(self.graph.set_input_value(pin_id, value)?)
    }

    /// Set the value of a constant node
    pub fn set_constant(&mut self, node_id: NodeId, value: f32) -> Result<(), EditorError> {
        Ok(self.graph.set_constant(node_id, value)?)
    }

    /// Apply one interaction.
    ///
    /// A selection deletion checks every id before removing anything, so a
    /// stale id fails the whole interaction and leaves the graph unchanged.
    pub fn apply(&mut self, interaction: Interaction) -> Result<(), EditorError> {
        match interaction {
            Interaction::AddNode(kind) => self.add_node(kind).map(drop),
            Interaction::EraseNode(node) => self.erase_node(node),
            Interaction::Link { from, to } => self.link(from, to).map(drop),
            Interaction::Unlink(edge) => self.unlink(edge),
            Interaction::DeleteSelection { edges, nodes } => self.delete_selection(edges, nodes),
            Interaction::SetValue { pin, value } => self.set_value(pin, value),
            Interaction::SetConstant { node, value } => self.set_constant(node, value),
        }
    }

    fn delete_selection(
        &mut self,
        edges: Vec<EdgeId>,
        nodes: Vec<NodeId>,
    ) -> Result<(), EditorError> {
        let edges: IndexSet<EdgeId> = edges.into_iter().collect();
        let nodes: IndexSet<NodeId> = nodes.into_iter().collect();
        for &edge in &edges {
            self.graph.edge(edge)?;
        }
        for &node in &nodes {
            self.graph.node(node)?;
        }

        // Links first so no listed link is already gone through a node cascade
        for edge in edges {
            self.unlink(edge)?;
        }
        for node in nodes {
            self.erase_node(node)?;
        }
        Ok(())
    }

    /// Apply interactions, logging and skipping the ones that fail.
    ///
    /// Returns the number of interactions that failed.
    pub fn handle(&mut self, interactions: impl IntoIterator<Item = Interaction>) -> usize {
        let mut failed = 0;
        for interaction in interactions {
            let description = format!("{interaction:?}");
            if let Err(e) = self.apply(interaction) {
                tracing::warn!("Skipping interaction {}: {}", description, e);
                failed += 1;
            }
        }
        failed
    }

    /// Advance one frame: sample the clock once, evaluate, return the color
    pub fn tick(&mut self, clock: &impl Clock) -> OutputColor {
        self.frame += 1;
        let ctx = FrameContext::new(self.frame, clock.now_seconds());

        self.color = match self.evaluate(ctx) {
            Ok(color) => color,
            Err(e) => {
                tracing::warn!("Evaluation failed in frame {}: {}", ctx.frame, e);
                self.settings.fallback_color
            }
        };
        self.color
    }

    /// Evaluate the output node for the given frame
    pub fn evaluate(&mut self, ctx: FrameContext) -> Result<OutputColor, EditorError> {
        let Some(output) = self.output else {
            return Ok(self.settings.fallback_color);
        };

        evaluate_builtin(&mut self.graph, output, ctx)?;

        let node = self.graph.node(output)?;
        let channel = |name: &str| node.input_named(name).map_or(0.0, |p| p.value);
        Ok(OutputColor::from_channels(channel("r"), channel("g"), channel("b")))
    }
}

/// Error from an editor operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// Only one output node may exist
    #[error("An output node already exists: {0}")]
    OutputExists(NodeId),

    /// Graph error
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Evaluation error
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
