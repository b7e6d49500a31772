// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph container and the port-connection engine.

use egui::Pos2;
use slotmap::SlotMap;

use crate::node::{EditorNode, NodeKey, NodeValue};
use crate::port::{Port, PortKey, PortSpec};
use crate::reroute::RerouteRef;
use crate::undo::UndoSink;

/// The editor's graph: nodes, their ports, and a draw order.
///
/// All connection mutations go through this type so undo recording and
/// reroute pruning happen in one place. Handles are generation-checked;
/// operations on a stale key fail with [`GraphError`] instead of touching a
/// recycled slot.
#[derive(Debug, Default)]
pub struct EditorGraph {
    name: String,
    nodes: SlotMap<NodeKey, EditorNode>,
    ports: SlotMap<PortKey, Port>,
    /// Draw order; the last entry renders on top and hit-tests first.
    order: Vec<NodeKey>,
}

impl EditorGraph {
    /// Create a new empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: SlotMap::with_key(),
            ports: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Graph name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the graph.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // ----- nodes -----

    /// Add a node, registering the ports its value declares.
    pub fn add_node(&mut self, value: Box<dyn NodeValue>) -> NodeKey {
        let specs = value.port_specs();
        let key = self.nodes.insert(EditorNode::new(value));
        self.order.push(key);
        for spec in specs {
            // Field names come from the value itself; a duplicate is a
            // value bug and add_port keeps the first declaration.
            let _ = self.add_port(key, spec);
        }
        key
    }

    /// Remove a node, severing every link that points at it. Returns the
    /// removed editor state, or `None` for a stale key.
    pub fn remove_node(&mut self, key: NodeKey) -> Option<EditorNode> {
        if !self.nodes.contains_key(key) {
            return None;
        }

        // Sever inbound links (and their reroutes) before dropping the node.
        let inbound: Vec<(NodeKey, String)> = self
            .ports
            .values()
            .filter(|p| p.node() != key)
            .filter_map(|p| {
                let owner = p.node();
                (self.nodes.get(owner)?.value().link(p.field()) == Some(key))
                    .then(|| (owner, p.field().to_owned()))
            })
            .collect();
        for (owner, field) in inbound {
            if let Some(node) = self.nodes.get_mut(owner) {
                node.value_mut().set_link(&field, None);
                node.take_reroutes(&field);
            }
        }

        let removed = self.nodes.remove(key)?;
        for port in removed.port_keys() {
            self.ports.remove(port);
        }
        self.order.retain(|k| *k != key);
        Some(removed)
    }

    /// Get a node by key.
    pub fn node(&self, key: NodeKey) -> Option<&EditorNode> {
        self.nodes.get(key)
    }

    /// Get a mutable node by key.
    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut EditorNode> {
        self.nodes.get_mut(key)
    }

    /// Whether `key` refers to a live node.
    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// All nodes with their keys, in storage order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &EditorNode)> {
        self.nodes.iter()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Draw order, bottom to top.
    pub fn order(&self) -> &[NodeKey] {
        &self.order
    }

    /// Draw this node on top of the others.
    pub fn move_to_top(&mut self, key: NodeKey) {
        if self.nodes.contains_key(key) {
            self.order.retain(|k| *k != key);
            self.order.push(key);
        }
    }

    /// Number of live nodes of the given registry kind.
    pub fn count_of_type(&self, type_id: &str) -> usize {
        self.nodes
            .values()
            .filter(|n| n.value().type_id() == type_id)
            .count()
    }

    // ----- ports -----

    /// Add a port to a node. Adding a second port under an existing field
    /// name logs a warning and returns the existing key unchanged.
    pub fn add_port(&mut self, node: NodeKey, spec: PortSpec) -> Result<PortKey, GraphError> {
        let editor = self.nodes.get(node).ok_or(GraphError::NodeNotFound(node))?;
        if let Some(existing) = editor.port_key(&spec.field) {
            tracing::warn!(field = %spec.field, "port already exists");
            return Ok(existing);
        }
        let field = spec.field.clone();
        let key = self.ports.insert(Port::new(node, spec));
        if let Some(editor) = self.nodes.get_mut(node) {
            editor.insert_port(field, key);
        }
        Ok(key)
    }

    /// Remove a port by field name. Removing an unknown field is a caller
    /// bug and fails with [`GraphError::PortNotFound`].
    pub fn remove_port(
        &mut self,
        node: NodeKey,
        field: &str,
        disconnect: bool,
        undo: &mut dyn UndoSink,
    ) -> Result<(), GraphError> {
        let key = self
            .nodes
            .get(node)
            .ok_or(GraphError::NodeNotFound(node))?
            .port_key(field)
            .ok_or_else(|| GraphError::PortNotFound(field.to_owned()))?;
        if disconnect {
            self.disconnect(key, undo)?;
        }
        if let Some(editor) = self.nodes.get_mut(node) {
            editor.remove_port(field);
        }
        self.ports.remove(key);
        Ok(())
    }

    /// Get a port by key.
    pub fn port(&self, key: PortKey) -> Option<&Port> {
        self.ports.get(key)
    }

    /// Get a mutable port by key (stroke, tooltip, cached handle rect).
    pub fn port_mut(&mut self, key: PortKey) -> Option<&mut Port> {
        self.ports.get_mut(key)
    }

    /// All ports with their keys.
    pub fn ports(&self) -> impl Iterator<Item = (PortKey, &Port)> {
        self.ports.iter()
    }

    // ----- connections -----

    /// Connect a port to a target node.
    ///
    /// Re-connecting to the current target logs a warning and leaves state
    /// unchanged. No type validation happens here; callers check
    /// [`can_connect`](Self::can_connect) first.
    pub fn connect(
        &mut self,
        port: PortKey,
        target: NodeKey,
        undo: &mut dyn UndoSink,
    ) -> Result<(), GraphError> {
        let (owner, field) = self.port_owner_field(port)?;
        if !self.nodes.contains_key(target) {
            return Err(GraphError::NodeNotFound(target));
        }
        let current = self
            .nodes
            .get(owner)
            .ok_or(GraphError::NodeNotFound(owner))?
            .value()
            .link(&field);
        if current == Some(target) {
            tracing::warn!(field = %field, "port already connected");
            return Ok(());
        }
        undo.snapshot(self, &[owner, target], "Connect Port");
        if let Some(node) = self.nodes.get_mut(owner) {
            node.value_mut().set_link(&field, Some(target));
        }
        Ok(())
    }

    /// Disconnect a port, pruning its reroute list. Idempotent.
    pub fn disconnect(&mut self, port: PortKey, undo: &mut dyn UndoSink) -> Result<(), GraphError> {
        let (owner, field) = self.port_owner_field(port)?;
        undo.snapshot(self, &[owner], "Disconnect Port");
        if let Some(node) = self.nodes.get_mut(owner) {
            node.value_mut().set_link(&field, None);
            node.take_reroutes(&field);
        }
        Ok(())
    }

    /// Disconnect every port on a node.
    pub fn clear_connections(
        &mut self,
        node: NodeKey,
        undo: &mut dyn UndoSink,
    ) -> Result<(), GraphError> {
        let keys: Vec<PortKey> = self
            .nodes
            .get(node)
            .ok_or(GraphError::NodeNotFound(node))?
            .port_keys()
            .collect();
        for key in keys {
            self.disconnect(key, undo)?;
        }
        Ok(())
    }

    /// The node a port is currently linked to, if any.
    pub fn connected(&self, port: PortKey) -> Option<NodeKey> {
        let p = self.ports.get(port)?;
        self.nodes.get(p.node())?.value().link(p.field())
    }

    /// Whether `port` would accept a node of kind `type_id`. Pure predicate
    /// delegation; a stale key accepts nothing.
    pub fn can_connect(&self, port: PortKey, type_id: &str) -> bool {
        self.ports
            .get(port)
            .is_some_and(|p| p.can_connect_to(type_id))
    }

    // ----- reroutes -----

    /// Reroute waypoints of a port; empty for stale keys or absent lists.
    pub fn reroutes(&self, port: PortKey) -> &[Pos2] {
        self.try_reroutes(port).unwrap_or(&[])
    }

    /// Non-creating waypoint lookup: `None` when no list exists.
    pub fn try_reroutes(&self, port: PortKey) -> Option<&[Pos2]> {
        let p = self.ports.get(port)?;
        self.nodes
            .get(p.node())?
            .reroutes(p.field())
            .map(Vec::as_slice)
    }

    /// Mutable waypoint list, created on first access. `None` only for a
    /// stale port key.
    pub fn reroutes_mut(&mut self, port: PortKey) -> Option<&mut Vec<Pos2>> {
        let (owner, field) = self.port_owner_field(port).ok()?;
        Some(self.nodes.get_mut(owner)?.reroutes_mut(&field))
    }

    /// Remove a port's waypoint list entirely.
    pub fn clear_reroutes(&mut self, port: PortKey) {
        if let Ok((owner, field)) = self.port_owner_field(port) {
            if let Some(node) = self.nodes.get_mut(owner) {
                node.take_reroutes(&field);
            }
        }
    }

    pub(crate) fn prune_empty_reroutes(&mut self, port: PortKey) {
        if let Ok((owner, field)) = self.port_owner_field(port) {
            if let Some(node) = self.nodes.get_mut(owner) {
                node.prune_reroutes(&field);
            }
        }
    }

    // ----- hit-testing -----

    /// Topmost node whose bounds contain `pos`, in canvas space.
    pub fn node_at(&self, pos: Pos2) -> Option<NodeKey> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|key| self.nodes.get(*key).is_some_and(|n| n.rect().contains(pos)))
    }

    /// Port whose cached handle rect contains `pos`, in canvas space.
    pub fn port_at(&self, pos: Pos2) -> Option<PortKey> {
        self.ports.iter().find_map(|(key, p)| {
            p.handle_rect()
                .is_some_and(|r| r.contains(pos))
                .then_some(key)
        })
    }

    /// Reroute handle containing `pos`. Only waypoints of connected ports
    /// are hit-testable.
    pub fn reroute_at(&self, pos: Pos2) -> Option<RerouteRef> {
        self.ports.iter().find_map(|(key, p)| {
            let owner = self.nodes.get(p.node())?;
            owner.value().link(p.field())?;
            let points = owner.reroutes(p.field())?;
            points
                .iter()
                .position(|pt| RerouteRef::handle_rect(*pt).contains(pos))
                .map(|index| RerouteRef::new(key, index))
        })
    }

    fn port_owner_field(&self, port: PortKey) -> Result<(NodeKey, String), GraphError> {
        let p = self.ports.get(port).ok_or(GraphError::StalePort(port))?;
        Ok((p.node(), p.field().to_owned()))
    }
}

/// Error from a graph operation.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node key is stale or was never part of this graph.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// No port registered under the given field name.
    #[error("port {0:?} doesn't exist")]
    PortNotFound(String),

    /// Port key is stale or was never part of this graph.
    #[error("stale port handle: {0:?}")]
    StalePort(PortKey),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortDirection;
    use crate::testing::TestNode;
    use crate::undo::NoopUndo;
    use egui::pos2;

    fn graph_with_pair() -> (EditorGraph, NodeKey, NodeKey, PortKey) {
        let mut graph = EditorGraph::new("test");
        let source = graph.add_node(Box::new(TestNode::at("int", 0.0, 0.0)));
        let sink = graph.add_node(Box::new(
            TestNode::at("math", 300.0, 0.0).with_typed_port("lhs", PortDirection::Input),
        ));
        let port = graph.node(sink).unwrap().port_key("lhs").unwrap();
        (graph, source, sink, port)
    }

    #[test]
    fn connect_sets_link_and_disconnect_clears_it() {
        let (mut graph, source, _, port) = graph_with_pair();
        graph.connect(port, source, &mut NoopUndo).unwrap();
        assert_eq!(graph.connected(port), Some(source));

        graph.disconnect(port, &mut NoopUndo).unwrap();
        assert_eq!(graph.connected(port), None);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (mut graph, source, _, port) = graph_with_pair();
        graph.connect(port, source, &mut NoopUndo).unwrap();
        graph.disconnect(port, &mut NoopUndo).unwrap();
        let after_first = graph.connected(port);
        graph.disconnect(port, &mut NoopUndo).unwrap();
        assert_eq!(graph.connected(port), after_first);
    }

    #[test]
    fn reconnecting_same_target_is_a_noop() {
        let (mut graph, source, _, port) = graph_with_pair();
        graph.connect(port, source, &mut NoopUndo).unwrap();
        graph.connect(port, source, &mut NoopUndo).unwrap();
        assert_eq!(graph.connected(port), Some(source));
    }

    #[test]
    fn connect_does_not_validate_types() {
        // The predicate only accepts "int" but connect trusts the caller.
        let (mut graph, _, sink, port) = graph_with_pair();
        let other = graph.add_node(Box::new(TestNode::at("string", 0.0, 200.0)));
        assert!(!graph.can_connect(port, "string"));
        graph.connect(port, other, &mut NoopUndo).unwrap();
        assert_eq!(graph.connected(port), Some(other));
        let _ = sink;
    }

    #[test]
    fn duplicate_port_add_returns_existing_key() {
        let (mut graph, _, sink, port) = graph_with_pair();
        let again = graph
            .add_port(
                sink,
                PortSpec::new("lhs", "int", PortDirection::Input, crate::testing::accept_any),
            )
            .unwrap();
        assert_eq!(again, port);
    }

    #[test]
    fn removing_unknown_port_fails() {
        let (mut graph, _, sink, _) = graph_with_pair();
        let err = graph
            .remove_port(sink, "missing", true, &mut NoopUndo)
            .unwrap_err();
        assert!(matches!(err, GraphError::PortNotFound(_)));
    }

    #[test]
    fn removed_port_key_is_rejected_after_slot_reuse() {
        let (mut graph, _, sink, port) = graph_with_pair();
        graph.remove_port(sink, "lhs", true, &mut NoopUndo).unwrap();
        assert!(graph.port(port).is_none());
        assert!(!graph.can_connect(port, "int"));

        // A same-named port created later gets a fresh generation; the old
        // key stays dead.
        let fresh = graph
            .add_port(
                sink,
                PortSpec::new("lhs", "int", PortDirection::Input, crate::testing::accept_any),
            )
            .unwrap();
        assert_ne!(fresh, port);
        assert!(graph.port(port).is_none());
        assert!(graph.port(fresh).is_some());
    }

    #[test]
    fn removing_node_severs_inbound_links() {
        let (mut graph, source, _, port) = graph_with_pair();
        graph.connect(port, source, &mut NoopUndo).unwrap();
        graph.reroutes_mut(port).unwrap().push(pos2(10.0, 10.0));

        graph.remove_node(source);
        assert_eq!(graph.connected(port), None);
        assert!(graph.try_reroutes(port).is_none());
        assert!(!graph.contains_node(source));
    }

    #[test]
    fn reroute_list_is_created_lazily_and_pruned() {
        let (mut graph, source, _, port) = graph_with_pair();
        graph.connect(port, source, &mut NoopUndo).unwrap();
        assert!(graph.try_reroutes(port).is_none());

        graph.reroutes_mut(port).unwrap().push(pos2(50.0, 50.0));
        assert_eq!(graph.reroutes(port).len(), 1);

        graph.clear_reroutes(port);
        assert!(graph.try_reroutes(port).is_none());
    }

    #[test]
    fn disconnect_prunes_reroutes() {
        let (mut graph, source, _, port) = graph_with_pair();
        graph.connect(port, source, &mut NoopUndo).unwrap();
        graph.reroutes_mut(port).unwrap().push(pos2(50.0, 50.0));

        graph.disconnect(port, &mut NoopUndo).unwrap();
        assert!(graph.try_reroutes(port).is_none());
    }

    #[test]
    fn move_to_top_changes_hit_order() {
        let mut graph = EditorGraph::new("test");
        let a = graph.add_node(Box::new(TestNode::at("int", 0.0, 0.0)));
        let b = graph.add_node(Box::new(TestNode::at("int", 0.0, 0.0)));
        for key in [a, b] {
            graph
                .node_mut(key)
                .unwrap()
                .set_cached_size(egui::vec2(100.0, 50.0));
        }

        assert_eq!(graph.node_at(pos2(10.0, 10.0)), Some(b));
        graph.move_to_top(a);
        assert_eq!(graph.node_at(pos2(10.0, 10.0)), Some(a));
        assert_eq!(graph.order(), &[b, a]);
    }

    #[test]
    fn stale_node_key_rejected_after_reuse() {
        let mut graph = EditorGraph::new("test");
        let a = graph.add_node(Box::new(TestNode::at("int", 0.0, 0.0)));
        graph.remove_node(a);
        let b = graph.add_node(Box::new(TestNode::at("int", 0.0, 0.0)));
        assert!(graph.node(a).is_none());
        assert!(graph.node(b).is_some());
        assert_ne!(a, b);
    }

    #[test]
    fn count_of_type_counts_live_nodes() {
        let mut graph = EditorGraph::new("test");
        graph.add_node(Box::new(TestNode::at("int", 0.0, 0.0)));
        let second = graph.add_node(Box::new(TestNode::at("int", 10.0, 0.0)));
        graph.add_node(Box::new(TestNode::at("string", 20.0, 0.0)));
        assert_eq!(graph.count_of_type("int"), 2);
        graph.remove_node(second);
        assert_eq!(graph.count_of_type("int"), 1);
    }
}
