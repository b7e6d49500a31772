// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of available node kinds.

use indexmap::IndexMap;

use crate::node::NodeValue;

/// Description of a registered node kind.
#[derive(Debug, Clone)]
pub struct NodeTypeSpec {
    /// Unique type id, the key every predicate and counter uses.
    pub id: String,
    /// Display name for menus and default node titles.
    pub name: String,
    /// Display color for node headers and wires.
    pub color: [u8; 3],
    /// Maximum instance count per graph; `None` means unlimited.
    pub max_instances: Option<usize>,
    /// Factory producing a fresh value of this kind.
    pub create: fn() -> Box<dyn NodeValue>,
}

/// Registry of node kinds available to a graph.
#[derive(Debug, Default)]
pub struct NodeTypeRegistry {
    types: IndexMap<String, NodeTypeSpec>,
}

impl NodeTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node kind, replacing any previous spec under the same id.
    pub fn register(&mut self, spec: NodeTypeSpec) {
        self.types.insert(spec.id.clone(), spec);
    }

    /// Get a kind by id.
    pub fn get(&self, id: &str) -> Option<&NodeTypeSpec> {
        self.types.get(id)
    }

    /// All registered kinds, in registration order.
    pub fn types(&self) -> impl Iterator<Item = &NodeTypeSpec> {
        self.types.values()
    }

    /// Kinds passing an acceptance predicate, for type-filtered creation
    /// menus.
    pub fn types_accepted_by(
        &self,
        accept: impl Fn(&str) -> bool,
    ) -> impl Iterator<Item = &NodeTypeSpec> {
        self.types.values().filter(move |spec| accept(&spec.id))
    }

    /// Instantiate a fresh value of the given kind.
    pub fn create(&self, id: &str) -> Option<Box<dyn NodeValue>> {
        self.types.get(id).map(|spec| (spec.create)())
    }

    /// Display color of a kind, if registered.
    pub fn display_color(&self, id: &str) -> Option<[u8; 3]> {
        self.types.get(id).map(|spec| spec.color)
    }

    /// Instance cap of a kind; `None` when unregistered or unlimited.
    pub fn max_instances(&self, id: &str) -> Option<usize> {
        self.types.get(id).and_then(|spec| spec.max_instances)
    }
}
