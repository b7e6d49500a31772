// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions and the per-kind capability interface.

use std::collections::HashMap;

use egui::{Pos2, Rect, Vec2};
use indexmap::IndexMap;
use slotmap::new_key_type;

use crate::port::{PortKey, PortSpec};

new_key_type! {
    /// Generation-checked handle to an [`EditorNode`] stored in an
    /// [`EditorGraph`](crate::graph::EditorGraph).
    pub struct NodeKey;
}

/// Height of a node's title strip in canvas units.
pub const TITLE_HEIGHT: f32 = 30.0;

/// Fallback display width for node kinds that do not override it.
pub const DEFAULT_NODE_WIDTH: f32 = 200.0;

/// Capability interface implemented once per node kind.
///
/// The value owns the node's canvas position and its connection references:
/// [`link`](Self::link) and [`set_link`](Self::set_link) are the accessor
/// pair behind every port of the node, dispatched by field name. Ports are
/// declared up front through [`port_specs`](Self::port_specs) and registered
/// when the value is added to a graph.
pub trait NodeValue: std::fmt::Debug {
    /// Registry type id of this node kind.
    fn type_id(&self) -> &str;

    /// Canvas-space position of the node's top-left corner.
    fn position(&self) -> Pos2;

    /// Move the node.
    fn set_position(&mut self, position: Pos2);

    /// Ports this value exposes, registered on insertion into a graph.
    fn port_specs(&self) -> Vec<PortSpec>;

    /// Current link target stored under `field`, or `None` when the port is
    /// disconnected or the field is unknown.
    fn link(&self, field: &str) -> Option<NodeKey>;

    /// Replace the link stored under `field`.
    fn set_link(&mut self, field: &str, target: Option<NodeKey>);

    /// Preferred body width in canvas units.
    fn display_width(&self) -> f32 {
        DEFAULT_NODE_WIDTH
    }

    /// Tooltip shown when hovering the node's title strip.
    fn header_tooltip(&self) -> Option<String> {
        None
    }

    /// Clone the value for duplicate/copy operations.
    fn boxed_clone(&self) -> Box<dyn NodeValue>;
}

/// Per-node editor state: the user value plus everything the editor layers
/// cache about it (rendered size, port keys, reroute waypoints).
#[derive(Debug)]
pub struct EditorNode {
    value: Box<dyn NodeValue>,
    name: String,
    cached_size: Vec2,
    ports: IndexMap<String, PortKey>,
    reroutes: HashMap<String, Vec<Pos2>>,
}

impl EditorNode {
    pub(crate) fn new(value: Box<dyn NodeValue>) -> Self {
        let name = nicify_type_id(value.type_id());
        Self {
            value,
            name,
            cached_size: Vec2::ZERO,
            ports: IndexMap::new(),
            reroutes: HashMap::new(),
        }
    }

    /// The node's user value.
    pub fn value(&self) -> &dyn NodeValue {
        self.value.as_ref()
    }

    /// Mutable access to the node's user value.
    pub fn value_mut(&mut self) -> &mut dyn NodeValue {
        self.value.as_mut()
    }

    /// Replace the user value wholesale. Used by undo hosts restoring a
    /// snapshot; does not re-register ports.
    pub fn replace_value(&mut self, value: Box<dyn NodeValue>) {
        self.value = value;
    }

    /// Display name, editable through the title-edit gesture.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Canvas-space position of the node's top-left corner.
    pub fn position(&self) -> Pos2 {
        self.value.position()
    }

    /// Move the node.
    pub fn set_position(&mut self, position: Pos2) {
        self.value.set_position(position);
    }

    /// Rendered size cached by the host layout pass. Zero until the node
    /// has been laid out once.
    pub fn cached_size(&self) -> Vec2 {
        self.cached_size
    }

    /// Cache the rendered size for hit-testing and framing.
    pub fn set_cached_size(&mut self, size: Vec2) {
        self.cached_size = size;
    }

    /// Canvas-space bounds, position plus cached size.
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position(), self.cached_size)
    }

    /// Canvas-space bounds of the title strip.
    pub fn title_rect(&self) -> Rect {
        let width = if self.cached_size.x == 0.0 {
            self.value.display_width()
        } else {
            self.cached_size.x
        };
        Rect::from_min_size(self.position(), Vec2::new(width, TITLE_HEIGHT))
    }

    /// Key of the port registered under `field`.
    pub fn port_key(&self, field: &str) -> Option<PortKey> {
        self.ports.get(field).copied()
    }

    /// Whether a port named `field` is registered.
    pub fn has_port(&self, field: &str) -> bool {
        self.ports.contains_key(field)
    }

    /// Keys of all registered ports, in declaration order.
    pub fn port_keys(&self) -> impl Iterator<Item = PortKey> + '_ {
        self.ports.values().copied()
    }

    pub(crate) fn insert_port(&mut self, field: String, key: PortKey) {
        self.ports.insert(field, key);
    }

    pub(crate) fn remove_port(&mut self, field: &str) -> Option<PortKey> {
        self.ports.shift_remove(field)
    }

    /// All reroute waypoint lists, keyed by port field name. Intended for
    /// undo hosts capturing node state; gesture code goes through
    /// [`EditorGraph`](crate::graph::EditorGraph) instead.
    pub fn reroutes_map(&self) -> &HashMap<String, Vec<Pos2>> {
        &self.reroutes
    }

    /// Replace all reroute waypoint lists. Counterpart of
    /// [`reroutes_map`](Self::reroutes_map) for undo hosts.
    pub fn set_reroutes_map(&mut self, reroutes: HashMap<String, Vec<Pos2>>) {
        self.reroutes = reroutes;
    }

    pub(crate) fn reroutes(&self, field: &str) -> Option<&Vec<Pos2>> {
        self.reroutes.get(field)
    }

    pub(crate) fn reroutes_mut(&mut self, field: &str) -> &mut Vec<Pos2> {
        self.reroutes.entry(field.to_owned()).or_default()
    }

    pub(crate) fn take_reroutes(&mut self, field: &str) -> Option<Vec<Pos2>> {
        self.reroutes.remove(field)
    }

    pub(crate) fn prune_reroutes(&mut self, field: &str) {
        if self.reroutes.get(field).is_some_and(Vec::is_empty) {
            self.reroutes.remove(field);
        }
    }
}

/// Derive a human-readable default display name from a registry type id,
/// e.g. `"float_math"` becomes `"Float Math"`.
pub fn nicify_type_id(type_id: &str) -> String {
    let mut out = String::with_capacity(type_id.len());
    let mut start_of_word = true;
    for c in type_id.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !out.ends_with(' ') {
                out.push(' ');
            }
            start_of_word = true;
        } else if start_of_word {
            out.extend(c.to_uppercase());
            start_of_word = false;
        } else {
            out.push(c);
        }
    }
    out.trim_end().to_owned()
}
