// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use egui::Rect;
use slotmap::new_key_type;

use crate::node::NodeKey;

new_key_type! {
    /// Generation-checked handle to a [`Port`] stored in an
    /// [`EditorGraph`](crate::graph::EditorGraph).
    pub struct PortKey;
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// The port reads a value produced upstream.
    Input,
    /// The port feeds a value to downstream nodes.
    Output,
}

impl PortDirection {
    /// Whether this is an input port.
    pub fn is_input(self) -> bool {
        self == Self::Input
    }
}

/// Stroke style used when rendering a port's wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireStroke {
    /// Continuous line.
    #[default]
    Solid,
    /// Alternating on/off dashes.
    Dashed,
}

/// Acceptance predicate deciding which node kinds a port may link to.
///
/// The argument is the candidate node's registry type id. The predicate is
/// supplied at port construction and consulted by
/// [`EditorGraph::can_connect`](crate::graph::EditorGraph::can_connect);
/// `connect` itself performs no type validation.
pub type AcceptFn = fn(&str) -> bool;

/// Declaration of a port, produced by
/// [`NodeValue::port_specs`](crate::node::NodeValue::port_specs) or passed
/// to [`EditorGraph::add_port`](crate::graph::EditorGraph::add_port).
#[derive(Debug, Clone)]
pub struct PortSpec {
    /// Field name, unique within the owning node.
    pub field: String,
    /// Registry type id of the value this port references.
    pub value_type: String,
    /// Port direction.
    pub direction: PortDirection,
    /// Acceptance predicate for candidate node kinds.
    pub accept: AcceptFn,
    /// Stroke style for the port's wire.
    pub stroke: WireStroke,
    /// Tooltip text; defaults to the value type id when `None`.
    pub tooltip: Option<String>,
}

impl PortSpec {
    /// Create a spec with default stroke and tooltip.
    pub fn new(
        field: impl Into<String>,
        value_type: impl Into<String>,
        direction: PortDirection,
        accept: AcceptFn,
    ) -> Self {
        Self {
            field: field.into(),
            value_type: value_type.into(),
            direction,
            accept,
            stroke: WireStroke::Solid,
            tooltip: None,
        }
    }

    /// Set the stroke style.
    pub fn with_stroke(mut self, stroke: WireStroke) -> Self {
        self.stroke = stroke;
        self
    }

    /// Set the tooltip text.
    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }
}

/// A typed, directional connection slot on a node.
///
/// The port itself stores no connection value; the owning node's
/// [`NodeValue`](crate::node::NodeValue) does. Connection mutations go
/// through [`EditorGraph`](crate::graph::EditorGraph) so that undo recording
/// and reroute pruning stay in one place.
#[derive(Debug)]
pub struct Port {
    node: NodeKey,
    field: String,
    value_type: String,
    direction: PortDirection,
    tooltip: String,
    stroke: WireStroke,
    accept: AcceptFn,
    handle_rect: Option<Rect>,
}

impl Port {
    pub(crate) fn new(node: NodeKey, spec: PortSpec) -> Self {
        let tooltip = spec.tooltip.unwrap_or_else(|| spec.value_type.clone());
        Self {
            node,
            field: spec.field,
            value_type: spec.value_type,
            direction: spec.direction,
            tooltip,
            stroke: spec.stroke,
            accept: spec.accept,
            handle_rect: None,
        }
    }

    /// Key of the owning node.
    pub fn node(&self) -> NodeKey {
        self.node
    }

    /// Field name, unique within the owning node.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Registry type id of the value this port references.
    pub fn value_type(&self) -> &str {
        &self.value_type
    }

    /// Port direction.
    pub fn direction(&self) -> PortDirection {
        self.direction
    }

    /// Tooltip text.
    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    /// Replace the tooltip text.
    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) {
        self.tooltip = tooltip.into();
    }

    /// Stroke style for the port's wire.
    pub fn stroke(&self) -> WireStroke {
        self.stroke
    }

    /// Replace the stroke style.
    pub fn set_stroke(&mut self, stroke: WireStroke) {
        self.stroke = stroke;
    }

    /// Whether a node of kind `type_id` may be linked through this port.
    pub fn can_connect_to(&self, type_id: &str) -> bool {
        (self.accept)(type_id)
    }

    /// Canvas-space rect of the port handle, cached by the host layout
    /// pass. `None` until the port has been laid out once.
    pub fn handle_rect(&self) -> Option<Rect> {
        self.handle_rect
    }

    /// Cache the canvas-space handle rect for hit-testing.
    pub fn set_handle_rect(&mut self, rect: Rect) {
        self.handle_rect = Some(rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept_int(ty: &str) -> bool {
        ty == "int"
    }

    #[test]
    fn tooltip_defaults_to_value_type() {
        let spec = PortSpec::new("input", "int", PortDirection::Input, accept_int);
        let port = Port::new(NodeKey::default(), spec);
        assert_eq!(port.tooltip(), "int");

        let spec = PortSpec::new("input", "int", PortDirection::Input, accept_int)
            .with_tooltip("the upstream value");
        let port = Port::new(NodeKey::default(), spec);
        assert_eq!(port.tooltip(), "the upstream value");
    }

    #[test]
    fn predicate_is_pure_delegation() {
        let spec = PortSpec::new("input", "int", PortDirection::Input, accept_int);
        let port = Port::new(NodeKey::default(), spec);
        assert!(port.can_connect_to("int"));
        assert!(!port.can_connect_to("string"));
    }

    #[test]
    fn handle_rect_unset_until_layout() {
        let spec = PortSpec::new("out", "int", PortDirection::Output, accept_int);
        let mut port = Port::new(NodeKey::default(), spec);
        assert!(port.handle_rect().is_none());
        port.set_handle_rect(Rect::from_min_size(
            egui::pos2(10.0, 20.0),
            egui::vec2(16.0, 16.0),
        ));
        assert!(port.handle_rect().is_some());
    }
}
