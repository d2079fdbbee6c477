// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph store containing nodes and edges.
//!
//! Every mutation either applies fully or leaves the graph untouched. The
//! store keeps three invariants:
//! - every edge references an output pin and an input pin of live nodes
//! - an input pin has at most one inbound edge
//! - edges never close a dependency cycle

use crate::edge::{Edge, EdgeId};
use crate::node::{EvalMark, Node, NodeId, NodeKind};
use crate::pin::{Pin, PinDirection, PinId};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// A node graph
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Nodes in insertion order
    nodes: IndexMap<NodeId, Node>,
    /// Edges in insertion order
    edges: IndexMap<EdgeId, Edge>,
    /// Owning node of every live pin
    pin_owners: HashMap<PinId, NodeId>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node of the given kind
    pub fn insert_node(&mut self, kind: NodeKind) -> NodeId {
        self.insert_node_with(|id| kind.build(id))
    }

    /// Insert a node built by `factory` from a freshly allocated id.
    ///
    /// The stored node is stamped with the allocated id and every pin gets a
    /// fresh pin id, whatever the factory put there. A factory returning a
    /// copy of a live node therefore never aliases the original's pins.
    pub fn insert_node_with(&mut self, factory: impl FnOnce(NodeId) -> Node) -> NodeId {
        let id = NodeId::new();
        let mut node = factory(id);
        node.id = id;
        node.mark = EvalMark::Unvisited;
        for pin in node.inputs.iter_mut().chain(node.outputs.iter_mut()) {
            pin.id = PinId::new();
            pin.node = id;
        }

        for pin in node.pins() {
            self.pin_owners.insert(pin.id, id);
        }
        tracing::debug!("Inserted {} ({}) with {} pins", id, node.name, node.pins().count());
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node together with every edge touching one of its pins
    pub fn erase_node(&mut self, node_id: NodeId) -> Result<Node, GraphError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }

        let before = self.edges.len();
        self.edges.retain(|_, e| !e.involves_node(node_id));
        let removed_edges = before - self.edges.len();

        let node = self
            .nodes
            .shift_remove(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        for pin in node.pins() {
            self.pin_owners.remove(&pin.id);
        }

        tracing::debug!("Erased {} and {} attached edges", node_id, removed_edges);
        Ok(node)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&node_id).ok_or(GraphError::NodeNotFound(node_id))
    }

    /// Pin vectors stay crate-private to mutate so `pin_owners` stays exact
    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))
    }

    /// Whether a node with this ID is live
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.nodes.contains_key(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a pin by ID
    pub fn pin(&self, pin_id: PinId) -> Result<&Pin, GraphError> {
        let owner = self
            .pin_owners
            .get(&pin_id)
            .ok_or(GraphError::PinNotFound(pin_id))?;
        self.nodes
            .get(owner)
            .and_then(|n| n.pin(pin_id))
            .ok_or(GraphError::PinNotFound(pin_id))
    }

    pub(crate) fn pin_mut(&mut self, pin_id: PinId) -> Result<&mut Pin, GraphError> {
        let owner = *self
            .pin_owners
            .get(&pin_id)
            .ok_or(GraphError::PinNotFound(pin_id))?;
        self.nodes
            .get_mut(&owner)
            .and_then(|n| n.pin_mut(pin_id))
            .ok_or(GraphError::PinNotFound(pin_id))
    }

    /// Set the value of an input pin, as a UI edit does for unconnected pins.
    ///
    /// A connected pin accepts the edit too, but the next evaluation
    /// overwrites it with the upstream value.
    pub fn set_input_value(&mut self, pin_id: PinId, value: f32) -> Result<(), GraphError> {
        let pin = self.pin_mut(pin_id)?;
        if !pin.is_input() {
            return Err(GraphError::NotAnInput(pin_id));
        }
        pin.value = value;
        Ok(())
    }

    /// Change the value held by a constant node
    pub fn set_constant(&mut self, node_id: NodeId, value: f32) -> Result<(), GraphError> {
        let node = self.node_mut(node_id)?;
        let NodeKind::Constant(_) = node.kind else {
            return Err(GraphError::NotAConstant(node_id));
        };
        node.kind = NodeKind::Constant(value);
        if let Some(out) = node.outputs.first_mut() {
            out.value = value;
        }
        Ok(())
    }

    /// Connect an output pin to an input pin
    pub fn insert_edge(&mut self, from_pin: PinId, to_pin: PinId) -> Result<EdgeId, GraphError> {
        let source = self.pin(from_pin)?;
        let target = self.pin(to_pin)?;
        let (from_node, to_node) = (source.node, target.node);

        let invalid = |reason| GraphError::InvalidConnection {
            from: from_pin,
            to: to_pin,
            reason,
        };

        if source.direction != PinDirection::Output {
            return Err(invalid(ConnectionRule::SourceNotOutput));
        }
        if target.direction != PinDirection::Input {
            return Err(invalid(ConnectionRule::TargetNotInput));
        }
        if from_node == to_node {
            return Err(invalid(ConnectionRule::SelfLoop));
        }
        if let Some(existing) = self.edge_into(to_pin) {
            return Err(invalid(ConnectionRule::TargetAlreadyConnected(existing.id)));
        }
        if self.depends_on(from_node, to_node) {
            return Err(GraphError::CycleDetected {
                from: from_pin,
                to: to_pin,
            });
        }

        let edge = Edge::new(from_node, from_pin, to_node, to_pin);
        let id = edge.id;
        tracing::debug!("Inserted {}: {} -> {}", id, from_pin, to_pin);
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Remove an edge. Pin values keep whatever they last held.
    pub fn erase_edge(&mut self, edge_id: EdgeId) -> Result<Edge, GraphError> {
        let edge = self
            .edges
            .shift_remove(&edge_id)
            .ok_or(GraphError::EdgeNotFound(edge_id))?;
        tracing::debug!("Erased {}: {} -> {}", edge_id, edge.from_pin, edge.to_pin);
        Ok(edge)
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: EdgeId) -> Result<&Edge, GraphError> {
        self.edges.get(&edge_id).ok_or(GraphError::EdgeNotFound(edge_id))
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The edge feeding an input pin, if any
    pub fn edge_into(&self, pin_id: PinId) -> Option<&Edge> {
        self.edges.values().find(|e| e.to_pin == pin_id)
    }

    /// Edges leaving an output pin
    pub fn edges_from(&self, pin_id: PinId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.from_pin == pin_id)
    }

    /// Edges touching any pin of a node
    pub fn edges_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.involves_node(node_id))
    }

    /// Whether any edge touches this pin
    pub fn is_connected(&self, pin_id: PinId) -> bool {
        self.edges.values().any(|e| e.involves_pin(pin_id))
    }

    /// Whether `node` (transitively) pulls values from `upstream`
    pub fn depends_on(&self, node: NodeId, upstream: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            if current == upstream {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(
                self.edges
                    .values()
                    .filter(|e| e.to_node == current)
                    .map(|e| e.from_node),
            );
        }

        false
    }

    #[cfg(test)]
    pub(crate) fn insert_edge_unchecked(&mut self, from_pin: PinId, to_pin: PinId) -> EdgeId {
        let from_node = self.pin_owners[&from_pin];
        let to_node = self.pin_owners[&to_pin];
        let edge = Edge::new(from_node, from_pin, to_node, to_pin);
        let id = edge.id;
        self.edges.insert(id, edge);
        id
    }
}

/// Rule violated by a rejected connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionRule {
    /// The source pin is an input
    #[error("source is not an output pin")]
    SourceNotOutput,

    /// The target pin is an output
    #[error("target is not an input pin")]
    TargetNotInput,

    /// The target pin already has an inbound edge
    #[error("target already connected by {0}")]
    TargetAlreadyConnected(EdgeId),

    /// Both pins belong to the same node
    #[error("pins belong to the same node")]
    SelfLoop,
}

/// Error from a graph store operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Pin not found
    #[error("Pin not found: {0}")]
    PinNotFound(PinId),

    /// Edge not found
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// Edge endpoints do not form a valid connection
    #[error("Invalid connection {from} -> {to}: {reason}")]
    InvalidConnection {
        /// Requested source pin
        from: PinId,
        /// Requested target pin
        to: PinId,
        /// Violated rule
        reason: ConnectionRule,
    },

    /// Edge would close a dependency cycle
    #[error("Connection {from} -> {to} would create a cycle")]
    CycleDetected {
        /// Requested source pin
        from: PinId,
        /// Requested target pin
        to: PinId,
    },

    /// Direct value edits only apply to input pins
    #[error("Pin is not an input: {0}")]
    NotAnInput(PinId),

    /// Node does not hold a constant
    #[error("Node is not a constant: {0}")]
    NotAConstant(NodeId),
}

impl GraphError {
    /// Whether the error is a failed lookup by id
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound(_) | Self::PinNotFound(_) | Self::EdgeNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_of(graph: &Graph, node: NodeId) -> PinId {
        graph.node(node).unwrap().outputs[0].id
    }

    fn input_of(graph: &Graph, node: NodeId, index: usize) -> PinId {
        graph.node(node).unwrap().inputs[index].id
    }

    fn assert_no_dangling_edges(graph: &Graph) {
        for edge in graph.edges() {
            let from = graph.pin(edge.from_pin).expect("dangling source");
            let to = graph.pin(edge.to_pin).expect("dangling target");
            assert!(from.is_output());
            assert!(to.is_input());
            assert_eq!(from.node, edge.from_node);
            assert_eq!(to.node, edge.to_node);
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut graph = Graph::new();
        let add = graph.insert_node(NodeKind::Add);

        let node = graph.node(add).unwrap();
        assert_eq!(node.id, add);
        assert_eq!(node.name, "add");
        assert_eq!(graph.node_count(), 1);
        for pin in node.pins() {
            assert_eq!(graph.pin(pin.id).unwrap().node, add);
        }
    }

    #[test]
    fn test_factory_sees_allocated_id() {
        let mut graph = Graph::new();
        let mut seen = None;
        let id = graph.insert_node_with(|id| {
            seen = Some(id);
            NodeKind::Sine.build(id)
        });
        assert_eq!(seen, Some(id));
        assert!(graph.node(id).unwrap().pins().all(|p| p.node == id));
    }

    #[test]
    fn test_cloned_node_gets_its_own_pins() {
        let mut graph = Graph::new();
        let source = graph.insert_node(NodeKind::Constant(3.0));
        let add = graph.insert_node(NodeKind::Add);
        let left = input_of(&graph, add, 0);
        graph.insert_edge(output_of(&graph, source), left).unwrap();

        let template = graph.node(add).unwrap().clone();
        let copy = graph.insert_node_with(|_| template);

        let copy_left = input_of(&graph, copy, 0);
        assert_ne!(copy_left, left);
        assert_eq!(graph.pin(left).unwrap().node, add);
        assert_eq!(graph.pin(copy_left).unwrap().node, copy);
        assert!(graph.node(copy).unwrap().pins().all(|p| p.node == copy));

        let frame = crate::FrameContext::new(1, 0.0);
        crate::evaluation::evaluate_builtin(&mut graph, add, frame).unwrap();
        assert_eq!(graph.node(add).unwrap().result(), Some(3.0));

        graph.erase_node(copy).unwrap();
        assert_eq!(graph.pin(left).unwrap().node, add);
        assert_eq!(graph.edge_into(left).map(|e| e.to_node), Some(add));
        assert_no_dangling_edges(&graph);
    }

    #[test]
    fn test_lookup_missing() {
        let mut graph = Graph::new();
        let id = graph.insert_node(NodeKind::Time);
        graph.erase_node(id).unwrap();

        assert_eq!(graph.node(id).unwrap_err(), GraphError::NodeNotFound(id));
        assert_eq!(graph.erase_node(id).unwrap_err(), GraphError::NodeNotFound(id));
        assert!(graph.node(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_connect_and_disconnect() {
        let mut graph = Graph::new();
        let time = graph.insert_node(NodeKind::Time);
        let sine = graph.insert_node(NodeKind::Sine);
        let from = output_of(&graph, time);
        let to = input_of(&graph, sine, 0);

        let edge = graph.insert_edge(from, to).unwrap();
        assert_eq!(graph.edge_into(to).map(|e| e.id), Some(edge));
        assert!(graph.is_connected(to));
        assert!(graph.is_connected(from));

        let removed = graph.erase_edge(edge).unwrap();
        assert_eq!(removed.from_pin, from);
        assert!(graph.edge_into(to).is_none());
        assert_eq!(graph.erase_edge(edge).unwrap_err(), GraphError::EdgeNotFound(edge));
    }

    #[test]
    fn test_connection_rules() {
        let mut graph = Graph::new();
        let a = graph.insert_node(NodeKind::Add);
        let b = graph.insert_node(NodeKind::Add);
        let out_a = output_of(&graph, a);
        let out_b = output_of(&graph, b);
        let in_a = input_of(&graph, a, 0);
        let in_b = input_of(&graph, b, 0);

        let err = graph.insert_edge(in_a, in_b).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConnection { reason: ConnectionRule::SourceNotOutput, .. }
        ));

        let err = graph.insert_edge(out_a, out_b).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConnection { reason: ConnectionRule::TargetNotInput, .. }
        ));

        let err = graph.insert_edge(out_a, in_a).unwrap_err();
        assert!(matches!(
            err,
            GraphError::InvalidConnection { reason: ConnectionRule::SelfLoop, .. }
        ));

        let first = graph.insert_edge(out_a, in_b).unwrap();
        let c = graph.insert_node(NodeKind::Time);
        let out_c = output_of(&graph, c);
        let err = graph.insert_edge(out_c, in_b).unwrap_err();
        assert_eq!(
            err,
            GraphError::InvalidConnection {
                from: out_c,
                to: in_b,
                reason: ConnectionRule::TargetAlreadyConnected(first),
            }
        );
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_unknown_pins() {
        let mut graph = Graph::new();
        let a = graph.insert_node(NodeKind::Time);
        let b = graph.insert_node(NodeKind::Sine);
        let out_a = output_of(&graph, a);
        let in_b = input_of(&graph, b, 0);
        graph.erase_node(b).unwrap();

        assert_eq!(
            graph.insert_edge(out_a, in_b).unwrap_err(),
            GraphError::PinNotFound(in_b)
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_fan_out_allowed() {
        let mut graph = Graph::new();
        let time = graph.insert_node(NodeKind::Time);
        let out = graph.insert_node(NodeKind::Output);
        let from = output_of(&graph, time);
        for index in 0..3 {
            let to = input_of(&graph, out, index);
            graph.insert_edge(from, to).unwrap();
        }
        assert_eq!(graph.edges_from(from).count(), 3);
    }

    #[test]
    fn test_rejects_cycles() {
        let mut graph = Graph::new();
        let a = graph.insert_node(NodeKind::Add);
        let b = graph.insert_node(NodeKind::Multiply);
        let c = graph.insert_node(NodeKind::Sine);

        graph.insert_edge(output_of(&graph, a), input_of(&graph, b, 0)).unwrap();
        graph.insert_edge(output_of(&graph, b), input_of(&graph, c, 0)).unwrap();

        let from = output_of(&graph, c);
        let to = input_of(&graph, a, 1);
        assert_eq!(
            graph.insert_edge(from, to).unwrap_err(),
            GraphError::CycleDetected { from, to }
        );
        assert!(graph.depends_on(c, a));
        assert!(!graph.depends_on(a, c));
    }

    #[test]
    fn test_erase_node_removes_exactly_its_edges() {
        let mut graph = Graph::new();
        let time = graph.insert_node(NodeKind::Time);
        let sine = graph.insert_node(NodeKind::Sine);
        let add = graph.insert_node(NodeKind::Add);
        let out = graph.insert_node(NodeKind::Output);

        let time_sine = graph.insert_edge(output_of(&graph, time), input_of(&graph, sine, 0)).unwrap();
        let sine_add = graph.insert_edge(output_of(&graph, sine), input_of(&graph, add, 0)).unwrap();
        let time_add = graph.insert_edge(output_of(&graph, time), input_of(&graph, add, 1)).unwrap();
        let add_out = graph.insert_edge(output_of(&graph, add), input_of(&graph, out, 0)).unwrap();
        let time_out = graph.insert_edge(output_of(&graph, time), input_of(&graph, out, 2)).unwrap();

        let sine_pins: Vec<PinId> = graph.node(sine).unwrap().pins().map(|p| p.id).collect();
        let removed = graph.erase_node(sine).unwrap();
        assert_eq!(removed.id, sine);

        let remaining: Vec<EdgeId> = graph.edges().map(|e| e.id).collect();
        assert_eq!(remaining, vec![time_add, add_out, time_out]);
        assert!(graph.edge(time_sine).is_err());
        assert!(graph.edge(sine_add).is_err());
        for pin in sine_pins {
            assert_eq!(graph.pin(pin).unwrap_err(), GraphError::PinNotFound(pin));
        }
        assert_no_dangling_edges(&graph);
    }

    #[test]
    fn test_no_dangling_edges_under_churn() {
        let mut graph = Graph::new();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move |bound: usize| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % bound as u64) as usize
        };

        for _ in 0..400 {
            let ids: Vec<NodeId> = graph.node_ids().collect();
            match next(4) {
                0 => {
                    let kind = NodeKind::MENU[next(NodeKind::MENU.len())];
                    graph.insert_node(kind);
                }
                1 if !ids.is_empty() => {
                    graph.erase_node(ids[next(ids.len())]).unwrap();
                }
                2 if ids.len() >= 2 => {
                    let from_node = graph.node(ids[next(ids.len())]).unwrap();
                    let to_node = graph.node(ids[next(ids.len())]).unwrap();
                    if let (Some(from), Some(to)) = (from_node.outputs.first(), to_node.inputs.last()) {
                        let (from, to) = (from.id, to.id);
                        let before = graph.edge_count();
                        match graph.insert_edge(from, to) {
                            Ok(_) => assert_eq!(graph.edge_count(), before + 1),
                            Err(_) => assert_eq!(graph.edge_count(), before),
                        }
                    }
                }
                3 if graph.edge_count() > 0 => {
                    let edges: Vec<EdgeId> = graph.edges().map(|e| e.id).collect();
                    graph.erase_edge(edges[next(edges.len())]).unwrap();
                }
                _ => {}
            }
            assert_no_dangling_edges(&graph);
        }
    }

    #[test]
    fn test_set_values() {
        let mut graph = Graph::new();
        let add = graph.insert_node(NodeKind::Add);
        let left = input_of(&graph, add, 0);
        let result = output_of(&graph, add);

        graph.set_input_value(left, 4.0).unwrap();
        assert_eq!(graph.pin(left).unwrap().value, 4.0);
        assert_eq!(
            graph.set_input_value(result, 1.0).unwrap_err(),
            GraphError::NotAnInput(result)
        );

        let constant = graph.insert_node(NodeKind::Constant(1.0));
        graph.set_constant(constant, 7.0).unwrap();
        let node = graph.node(constant).unwrap();
        assert_eq!(node.kind, NodeKind::Constant(7.0));
        assert_eq!(node.result(), Some(7.0));
        assert_eq!(
            graph.set_constant(add, 1.0).unwrap_err(),
            GraphError::NotAConstant(add)
        );
    }
}
