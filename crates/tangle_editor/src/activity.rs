// SPDX-License-Identifier: MIT OR Apache-2.0
//! The gesture state machine's states.

use egui::{pos2, Pos2, Vec2};
use tangle_graph::{NodeKey, PortKey, RerouteRef};

use crate::host::PointerButton;

/// Grid pitch for drag snapping, in canvas units.
pub const GRID_PITCH: f32 = 16.0;

/// Phase offset applied when snapping node positions, so node bodies land
/// between grid lines while reroute points land on them.
pub const NODE_SNAP_PHASE: f32 = 8.0;

/// The mutually exclusive interaction activities. Exactly one is active at
/// a time; a non-idle activity owns pointer input until its gesture ends.
#[derive(Debug, Default)]
pub enum Activity {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging a connection out of a port.
    ConnectPort(ConnectPortState),
    /// Dragging the selected nodes and reroute points.
    DragNode(DragState),
    /// Panning the canvas.
    DragGrid {
        /// The button that started the pan; releasing it ends the gesture.
        button: PointerButton,
    },
    /// Rubber-band selection over empty canvas.
    BoxSelect(BoxSelectState),
    /// Editing a node's title; ends when the title field loses focus.
    EditTitle(EditTitleState),
    /// A host-owned modal dialog is open; all input is swallowed until the
    /// host ends it.
    HostModal,
}

impl Activity {
    /// Whether no gesture is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// State of a connect-port gesture.
#[derive(Debug, Clone, Copy)]
pub struct ConnectPortState {
    /// The port the wire is dragged from.
    pub port: PortKey,
    /// Current candidate drop target. Kept non-`None` but unconnectable
    /// right after detaching an existing wire, which suppresses the
    /// creation menu on an instant release.
    pub candidate: Option<NodeKey>,
}

/// State of a node/reroute drag: per-item offsets from the pointer,
/// captured at gesture start.
#[derive(Debug, Default)]
pub struct DragState {
    /// Dragged nodes and their start offsets.
    pub nodes: Vec<(NodeKey, Vec2)>,
    /// Dragged reroute points and their start offsets.
    pub reroutes: Vec<(RerouteRef, Vec2)>,
}

/// State of a box-select gesture. The selection is recomputed from the
/// initial snapshot on every pointer move, never incrementally.
#[derive(Debug, Default)]
pub struct BoxSelectState {
    /// Canvas-space anchor where the drag started.
    pub start: Pos2,
    /// Nodes selected before the gesture began.
    pub initial_nodes: Vec<NodeKey>,
    /// Reroute points selected before the gesture began.
    pub initial_reroutes: Vec<RerouteRef>,
}

/// State of a title-edit session.
#[derive(Debug, Clone, Copy)]
pub struct EditTitleState {
    /// The node whose title is being edited.
    pub node: NodeKey,
    /// Whether the title field has held focus at least once. Only a
    /// focused-then-blurred field ends the gesture; a field that never
    /// received focus keeps waiting for it.
    pub focused: bool,
}

/// Snap a node position to the grid, with the node phase offset.
pub fn snap_node_position(pos: Pos2) -> Pos2 {
    pos2(
        ((pos.x + NODE_SNAP_PHASE) / GRID_PITCH).round() * GRID_PITCH - NODE_SNAP_PHASE,
        ((pos.y + NODE_SNAP_PHASE) / GRID_PITCH).round() * GRID_PITCH - NODE_SNAP_PHASE,
    )
}

/// Snap a reroute point to the grid, without the phase offset.
pub fn snap_reroute_position(pos: Pos2) -> Pos2 {
    pos2(
        (pos.x / GRID_PITCH).round() * GRID_PITCH,
        (pos.y / GRID_PITCH).round() * GRID_PITCH,
    )
}
