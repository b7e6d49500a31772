// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared test fixtures.

use std::collections::HashMap;

use egui::{Pos2, Rect};
use tangle_graph::{
    NodeKey, NodeTypeRegistry, NodeTypeSpec, NodeValue, PortDirection, PortKey, PortSpec,
};

use crate::host::{FrameEvent, Modifiers, PointerButton};
use crate::session::EditorSession;

/// Accepts every node kind.
pub fn accept_any(_type_id: &str) -> bool {
    true
}

/// Minimal [`NodeValue`] used across the crate's tests.
#[derive(Debug, Clone)]
pub struct TestNode {
    type_id: String,
    position: Pos2,
    links: HashMap<String, NodeKey>,
    specs: Vec<PortSpec>,
}

impl TestNode {
    /// A node of kind `type_id` at the given position, with no ports.
    pub fn at(type_id: &str, x: f32, y: f32) -> Self {
        Self {
            type_id: type_id.to_owned(),
            position: Pos2::new(x, y),
            links: HashMap::new(),
            specs: Vec::new(),
        }
    }

    /// Add a declared port accepting any node kind.
    pub fn with_port(mut self, field: &str, direction: PortDirection) -> Self {
        self.specs.push(PortSpec::new(field, "int", direction, accept_any));
        self
    }

    /// Add a declared port accepting only `int` nodes.
    pub fn with_int_port(mut self, field: &str, direction: PortDirection) -> Self {
        self.specs
            .push(PortSpec::new(field, "int", direction, |ty| ty == "int"));
        self
    }
}

impl NodeValue for TestNode {
    fn type_id(&self) -> &str {
        &self.type_id
    }

    fn position(&self) -> Pos2 {
        self.position
    }

    fn set_position(&mut self, position: Pos2) {
        self.position = position;
    }

    fn port_specs(&self) -> Vec<PortSpec> {
        self.specs.clone()
    }

    fn link(&self, field: &str) -> Option<NodeKey> {
        self.links.get(field).copied()
    }

    fn set_link(&mut self, field: &str, target: Option<NodeKey>) {
        match target {
            Some(key) => {
                self.links.insert(field.to_owned(), key);
            }
            None => {
                self.links.remove(field);
            }
        }
    }

    fn boxed_clone(&self) -> Box<dyn NodeValue> {
        Box::new(self.clone())
    }
}

/// A registry with an `int` kind (capped at 2 instances) and an unlimited
/// `math` kind.
pub fn test_registry() -> NodeTypeRegistry {
    let mut registry = NodeTypeRegistry::new();
    registry.register(NodeTypeSpec {
        id: "int".to_owned(),
        name: "Int".to_owned(),
        color: [80, 200, 200],
        max_instances: Some(2),
        create: || Box::new(TestNode::at("int", 0.0, 0.0)),
    });
    registry.register(NodeTypeSpec {
        id: "math".to_owned(),
        name: "Math".to_owned(),
        color: [80, 200, 80],
        max_instances: None,
        create: || {
            Box::new(TestNode::at("math", 0.0, 0.0).with_port("lhs", PortDirection::Input))
        },
    });
    registry
}

/// A session with a 800x600 canvas at the origin and the default viewport,
/// so screen and canvas coordinates differ only by the centering offset.
pub fn test_session() -> EditorSession {
    let mut session = EditorSession::new(test_registry());
    session.begin_frame(Rect::from_min_size(Pos2::ZERO, egui::vec2(800.0, 600.0)));
    session
}

/// Add a laid-out node: position, cached size 100x80, port handle rects on
/// the node edges.
pub fn add_laid_out_node(session: &mut EditorSession, value: TestNode) -> NodeKey {
    let key = session.graph.add_node(Box::new(value));
    let node = session.graph.node_mut(key).unwrap();
    node.set_cached_size(egui::vec2(100.0, 80.0));
    let rect = session.graph.node(key).unwrap().rect();
    let ports: Vec<PortKey> = session.graph.node(key).unwrap().port_keys().collect();
    for port in ports {
        let direction = session.graph.port(port).unwrap().direction();
        let x = if direction.is_input() {
            rect.min.x
        } else {
            rect.max.x
        };
        let center = egui::pos2(x, rect.min.y + 40.0);
        session
            .graph
            .port_mut(port)
            .unwrap()
            .set_handle_rect(Rect::from_center_size(center, egui::vec2(16.0, 16.0)));
    }
    key
}

/// Primary-button press at a screen position.
pub fn primary_down(pos: Pos2) -> FrameEvent {
    FrameEvent::PointerDown {
        pos,
        button: PointerButton::Primary,
        modifiers: Modifiers::default(),
        clicks: 1,
    }
}

/// Primary-button drag to a screen position.
pub fn primary_drag(pos: Pos2) -> FrameEvent {
    FrameEvent::PointerDrag {
        pos,
        button: PointerButton::Primary,
        modifiers: Modifiers::default(),
    }
}

/// Primary-button release at a screen position.
pub fn primary_up(pos: Pos2) -> FrameEvent {
    FrameEvent::PointerUp {
        pos,
        button: PointerButton::Primary,
        modifiers: Modifiers::default(),
    }
}
