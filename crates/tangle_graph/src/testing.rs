// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shared test fixtures.

use std::collections::HashMap;

use egui::Pos2;

use crate::node::{NodeKey, NodeValue};
use crate::port::{PortDirection, PortSpec};

/// Accepts every node kind.
pub fn accept_any(_type_id: &str) -> bool {
    true
}

/// Accepts only `int` nodes.
pub fn accept_int(type_id: &str) -> bool {
    type_id == "int"
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

    /// Add a declared port.
    pub fn with_port(mut self, field: &str, direction: PortDirection) -> Self {
        self.specs.push(PortSpec::new(field, "int", direction, accept_any));
        self
    }

    /// Add a declared port with a restrictive predicate.
    pub fn with_typed_port(mut self, field: &str, direction: PortDirection) -> Self {
        self.specs.push(PortSpec::new(field, "int", direction, accept_int));
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
