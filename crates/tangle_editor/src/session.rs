// SPDX-License-Identifier: MIT OR Apache-2.0
//! The editor session: one context object owning graph, selection,
//! viewport and the active gesture.

use egui::{Pos2, Rect, Vec2};
use tangle_graph::{
    EditorGraph, NodeKey, NodeTypeRegistry, NodeValue, Port, PortKey, RerouteRef, UndoSink,
};

use crate::activity::{
    snap_node_position, snap_reroute_position, Activity, BoxSelectState, ConnectPortState,
    DragState, EditTitleState,
};
use crate::host::{CanvasPainter, EditorRequest, FrameEvent, PointerButton};
use crate::prefs::EditorPrefs;
use crate::selection::Selection;
use crate::viewport::Viewport;
use crate::wire::{wire_endpoint, wire_polyline};

/// A node captured in the copy buffer.
#[derive(Debug)]
pub(crate) struct CopiedNode {
    pub(crate) value: Box<dyn NodeValue>,
    pub(crate) name: String,
}

impl Clone for CopiedNode {
    fn clone(&self) -> Self {
        Self {
            value: self.value.boxed_clone(),
            name: self.name.clone(),
        }
    }
}

/// The explicit editor context: graph model, selection state and the
/// interaction state machine, driven by the host's frame protocol (see the
/// crate docs).
#[derive(Debug)]
pub struct EditorSession {
    /// The graph being edited.
    pub graph: EditorGraph,
    /// Available node kinds.
    pub registry: NodeTypeRegistry,
    /// Selected nodes and reroute points.
    pub selection: Selection,
    /// Pan/zoom transform.
    pub viewport: Viewport,
    /// Ambient preferences.
    pub prefs: EditorPrefs,
    pub(crate) activity: Activity,
    pub(crate) canvas_rect: Rect,
    pub(crate) last_pointer: Pos2,
    pub(crate) copy_buffer: Vec<CopiedNode>,
    pub(crate) requests: Vec<EditorRequest>,
    hovered_node: Option<NodeKey>,
    hovered_port: Option<PortKey>,
    hovered_reroute: Option<RerouteRef>,
    event_used: bool,
}

impl EditorSession {
    /// Create a session around an empty graph.
    pub fn new(registry: NodeTypeRegistry) -> Self {
        Self::with_graph(EditorGraph::new("Untitled"), registry)
    }

    /// Create a session around an existing graph.
    pub fn with_graph(graph: EditorGraph, registry: NodeTypeRegistry) -> Self {
        Self {
            graph,
            registry,
            selection: Selection::new(),
            viewport: Viewport::default(),
            prefs: EditorPrefs::default(),
            activity: Activity::Idle,
            canvas_rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(1280.0, 720.0)),
            last_pointer: Pos2::ZERO,
            copy_buffer: Vec::new(),
            requests: Vec::new(),
            hovered_node: None,
            hovered_port: None,
            hovered_reroute: None,
            event_used: false,
        }
    }

    /// The active gesture.
    pub fn activity(&self) -> &Activity {
        &self.activity
    }

    /// Canvas area within the host window, as of the last `begin_frame`.
    pub fn canvas_rect(&self) -> Rect {
        self.canvas_rect
    }

    /// Start a frame: the host reports where the canvas lives on screen.
    pub fn begin_frame(&mut self, canvas_rect: Rect) {
        self.canvas_rect = canvas_rect;
    }

    /// Node under the pointer, as of the last hover refresh.
    pub fn hovered_node(&self) -> Option<NodeKey> {
        self.hovered_node
    }

    /// Port handle under the pointer.
    pub fn hovered_port(&self) -> Option<PortKey> {
        self.hovered_port
    }

    /// Reroute handle under the pointer.
    pub fn hovered_reroute(&self) -> Option<RerouteRef> {
        self.hovered_reroute
    }

    /// Drain the requests accumulated since the last call.
    pub fn take_requests(&mut self) -> Vec<EditorRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Convert a screen position to canvas space.
    pub fn screen_to_canvas(&self, screen: Pos2) -> Pos2 {
        self.viewport.screen_to_canvas(screen, self.canvas_rect)
    }

    /// Convert a canvas position to screen space.
    pub fn canvas_to_screen(&self, canvas: Pos2) -> Pos2 {
        self.viewport.canvas_to_screen(canvas, self.canvas_rect)
    }

    pub(crate) fn request(&mut self, request: EditorRequest) {
        if !self.requests.contains(&request) {
            self.requests.push(request);
        }
    }

    pub(crate) fn request_repaint(&mut self) {
        self.request(EditorRequest::Repaint);
    }

    // ----- frame phases -----

    /// Pre-draw input phase: the active gesture interprets the event.
    pub fn input_pre(&mut self, event: &FrameEvent) {
        self.event_used = false;
        let activity = std::mem::take(&mut self.activity);
        self.activity = self.dispatch_pre(activity, event);
    }

    /// Post-draw input phase: gesture completion and, when idle, new
    /// gesture starts and click handling.
    pub fn input_post(&mut self, event: &FrameEvent, undo: &mut dyn UndoSink) {
        if self.event_used {
            self.event_used = false;
            self.note_pointer(event);
            return;
        }
        let activity = std::mem::take(&mut self.activity);
        self.activity = match activity {
            Activity::ConnectPort(state) => self.connect_port_post(state, event, undo),
            Activity::Idle => self.idle_post(event, undo),
            other => other,
        };
        self.note_pointer(event);
    }

    /// Pre-render phase: the active gesture draws its transient geometry
    /// (the in-flight wire of a connect gesture). Read-only.
    pub fn pre_draw(&self, painter: &mut dyn CanvasPainter) {
        if let Activity::ConnectPort(state) = &self.activity {
            self.draw_pending_wire(state, painter);
        }
    }

    /// Post-render phase: gesture overlays above the nodes (the box-select
    /// rectangle). Read-only.
    pub fn post_draw(&self, painter: &mut dyn CanvasPainter) {
        if let Activity::BoxSelect(state) = &self.activity {
            let current = self.screen_to_canvas(self.last_pointer);
            painter.selection_box(Rect::from_two_pos(state.start, current));
        }
    }

    /// Emit every committed connection as wire geometry plus reroute
    /// handles. Read-only; the host calls this from its paint pass.
    pub fn paint_wires(&self, painter: &mut dyn CanvasPainter) {
        for (port_key, port) in self.graph.ports() {
            let Some(handle) = port.handle_rect() else {
                continue;
            };
            let Some(target) = self
                .graph
                .connected(port_key)
                .and_then(|key| self.graph.node(key))
            else {
                continue;
            };

            let from = handle.center();
            let to = wire_endpoint(from, target.rect(), port.direction());
            let mut points = Vec::with_capacity(self.graph.reroutes(port_key).len() + 2);
            if port.direction().is_input() {
                points.push(to);
                points.extend_from_slice(self.graph.reroutes(port_key));
                points.push(from);
            } else {
                points.push(from);
                points.extend_from_slice(self.graph.reroutes(port_key));
                points.push(to);
            }
            let vertices =
                wire_polyline(&points, self.prefs.wire_path, port.stroke(), self.viewport.zoom);
            painter.wire(port_key, &vertices);

            for (index, point) in self.graph.reroutes(port_key).iter().enumerate() {
                let reroute = RerouteRef::new(port_key, index);
                painter.reroute_handle(
                    reroute,
                    RerouteRef::handle_rect(*point),
                    self.selection.contains_reroute(reroute),
                );
            }
        }
    }

    // ----- title editing and host modals -----

    /// Node whose title is being edited, if a title-edit session is open.
    pub fn title_edit_target(&self) -> Option<NodeKey> {
        match &self.activity {
            Activity::EditTitle(state) => Some(state.node),
            _ => None,
        }
    }

    /// The host reports whether its title text field currently has
    /// keyboard focus. The gesture ends only after the field held focus
    /// once and then lost it.
    pub fn report_title_focus(&mut self, focused: bool) {
        if let Activity::EditTitle(state) = &mut self.activity {
            if focused {
                state.focused = true;
            } else if state.focused {
                self.activity = Activity::Idle;
                self.request_repaint();
            }
        }
    }

    /// Enter the host-modal placeholder state, e.g. while a host dialog is
    /// open. No-op unless idle.
    pub fn begin_host_modal(&mut self) {
        if self.activity.is_idle() {
            self.activity = Activity::HostModal;
        }
    }

    /// Leave the host-modal placeholder state.
    pub fn end_host_modal(&mut self) {
        if matches!(self.activity, Activity::HostModal) {
            self.activity = Activity::Idle;
        }
    }

    /// Force the active gesture back to idle (release outside the canvas,
    /// focus loss, host interruption).
    pub fn cancel_activity(&mut self) {
        self.activity = Activity::Idle;
        self.request_repaint();
    }

    // ----- pre-input dispatch -----

    fn dispatch_pre(&mut self, activity: Activity, event: &FrameEvent) -> Activity {
        match activity {
            Activity::Idle => Activity::Idle,
            Activity::ConnectPort(state) => self.connect_port_pre(state, event),
            Activity::DragNode(state) => self.drag_node_pre(state, event),
            Activity::DragGrid { button } => self.drag_grid_pre(button, event),
            Activity::BoxSelect(state) => self.box_select_pre(state, event),
            Activity::EditTitle(state) => match event {
                FrameEvent::Cancel => Activity::Idle,
                _ => Activity::EditTitle(state),
            },
            Activity::HostModal => {
                self.event_used = true;
                Activity::HostModal
            }
        }
    }

    fn connect_port_pre(&mut self, mut state: ConnectPortState, event: &FrameEvent) -> Activity {
        if let FrameEvent::PointerDrag {
            pos,
            button: PointerButton::Primary,
            ..
        } = event
        {
            let canvas = self.screen_to_canvas(*pos);
            self.refresh_hover(canvas);
            // Candidate = hovered node, only when it differs from the
            // current connection and the predicate accepts its kind.
            state.candidate = self.hovered_node.filter(|key| {
                Some(*key) != self.graph.connected(state.port)
                    && self.graph.node(*key).is_some_and(|node| {
                        self.graph.can_connect(state.port, node.value().type_id())
                    })
            });
            self.event_used = true;
            self.request_repaint();
        }
        Activity::ConnectPort(state)
    }

    fn drag_node_pre(&mut self, state: DragState, event: &FrameEvent) -> Activity {
        match event {
            FrameEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            } => {
                self.event_used = true;
                Activity::Idle
            }
            FrameEvent::Cancel => Activity::Idle,
            FrameEvent::PointerDrag {
                pos,
                button: PointerButton::Primary,
                modifiers,
            } => {
                let mut grid_snap = self.prefs.grid_snap;
                if modifiers.ctrl {
                    grid_snap = !grid_snap;
                }
                let canvas = self.screen_to_canvas(*pos);
                for (key, offset) in &state.nodes {
                    if let Some(node) = self.graph.node_mut(*key) {
                        let mut position = canvas + *offset;
                        if grid_snap {
                            position = snap_node_position(position);
                        }
                        node.set_position(position);
                    }
                }
                for (reroute, offset) in &state.reroutes {
                    let mut position = canvas + *offset;
                    if grid_snap {
                        position = snap_reroute_position(position);
                    }
                    reroute.set(&mut self.graph, position);
                }
                self.event_used = true;
                self.request_repaint();
                Activity::DragNode(state)
            }
            _ => Activity::DragNode(state),
        }
    }

    fn drag_grid_pre(&mut self, button: PointerButton, event: &FrameEvent) -> Activity {
        match event {
            FrameEvent::PointerUp { button: released, .. } if *released == button => {
                self.event_used = true;
                Activity::Idle
            }
            FrameEvent::Cancel => Activity::Idle,
            FrameEvent::PointerDrag { pos, .. } => {
                self.viewport.pan_by_screen_delta(*pos - self.last_pointer);
                self.event_used = true;
                self.request_repaint();
                Activity::DragGrid { button }
            }
            _ => Activity::DragGrid { button },
        }
    }

    fn box_select_pre(&mut self, state: BoxSelectState, event: &FrameEvent) -> Activity {
        match event {
            FrameEvent::PointerUp {
                button: PointerButton::Primary,
                ..
            } => {
                self.event_used = true;
                Activity::Idle
            }
            FrameEvent::Cancel => Activity::Idle,
            FrameEvent::PointerDrag {
                pos,
                button: PointerButton::Primary,
                modifiers,
            } => {
                let current = self.screen_to_canvas(*pos);
                let additive = modifiers.ctrl || modifiers.shift;
                self.update_box_selection(&state, current, additive);
                self.event_used = true;
                self.request_repaint();
                Activity::BoxSelect(state)
            }
            _ => Activity::BoxSelect(state),
        }
    }

    /// Recompute the selection from the pre-drag snapshot and the current
    /// rectangle. Pure in its inputs; never incremental.
    fn update_box_selection(&mut self, state: &BoxSelectState, current: Pos2, additive: bool) {
        let rect = Rect::from_two_pos(state.start, current);
        let mut nodes: Vec<NodeKey> = if additive {
            state.initial_nodes.clone()
        } else {
            Vec::new()
        };
        let mut reroutes: Vec<RerouteRef> = if additive {
            state.initial_reroutes.clone()
        } else {
            Vec::new()
        };

        if rect.width() > 0.0 || rect.height() > 0.0 {
            for (key, node) in self.graph.nodes() {
                if node.rect().intersects(rect) && !nodes.contains(&key) {
                    nodes.push(key);
                }
            }
            for (port_key, _) in self.graph.ports() {
                if self.graph.connected(port_key).is_none() {
                    continue;
                }
                for (index, point) in self.graph.reroutes(port_key).iter().enumerate() {
                    let reroute = RerouteRef::new(port_key, index);
                    if RerouteRef::handle_rect(*point).intersects(rect)
                        && !reroutes.contains(&reroute)
                    {
                        reroutes.push(reroute);
                    }
                }
            }
        }

        self.selection.set(nodes, reroutes);
    }

    // ----- post-input dispatch -----

    fn connect_port_post(
        &mut self,
        state: ConnectPortState,
        event: &FrameEvent,
        undo: &mut dyn UndoSink,
    ) -> Activity {
        match event {
            FrameEvent::PointerDown {
                button: PointerButton::Primary,
                ..
            } => {
                self.graph.clear_reroutes(state.port);
                self.request_repaint();
                Activity::ConnectPort(state)
            }
            FrameEvent::PointerDown { pos, button, .. } if button.is_secondary_or_middle() => {
                let canvas = self.screen_to_canvas(*pos);
                if let Some(points) = self.graph.reroutes_mut(state.port) {
                    points.push(canvas);
                }
                self.request_repaint();
                Activity::ConnectPort(state)
            }
            FrameEvent::PointerUp {
                pos,
                button: PointerButton::Primary,
                ..
            } => self.finish_connect(state, *pos, undo),
            FrameEvent::Cancel => Activity::Idle,
            _ => Activity::ConnectPort(state),
        }
    }

    fn finish_connect(
        &mut self,
        state: ConnectPortState,
        screen_pos: Pos2,
        undo: &mut dyn UndoSink,
    ) -> Activity {
        match state.candidate {
            Some(target) => {
                // The candidate is re-validated on release; a parked but
                // unconnectable target just ends the gesture quietly.
                let accepts = self.graph.node(target).is_some_and(|node| {
                    self.graph.can_connect(state.port, node.value().type_id())
                });
                if accepts {
                    if let Err(error) = self.graph.connect(state.port, target, undo) {
                        tracing::warn!(%error, "connect failed");
                    }
                }
            }
            None => {
                self.graph.clear_reroutes(state.port);
                if self.prefs.drag_to_create {
                    self.request(EditorRequest::OpenCreateMenu {
                        port: state.port,
                        screen_pos,
                    });
                }
            }
        }
        self.request_repaint();
        Activity::Idle
    }

    fn idle_post(&mut self, event: &FrameEvent, undo: &mut dyn UndoSink) -> Activity {
        match event {
            FrameEvent::PointerMove { pos } => {
                let canvas = self.screen_to_canvas(*pos);
                self.refresh_hover(canvas);
                Activity::Idle
            }
            FrameEvent::Scroll { pos, delta_y } => {
                self.viewport
                    .scroll_zoom(*pos, self.canvas_rect, *delta_y, self.prefs.zoom_to_mouse);
                self.request_repaint();
                Activity::Idle
            }
            FrameEvent::PointerDrag {
                pos,
                button: PointerButton::Primary,
                ..
            } => {
                let canvas = self.screen_to_canvas(*pos);
                self.refresh_hover(canvas);
                if self.hovered_node.is_some() || self.hovered_reroute.is_some() {
                    self.start_drag(canvas, undo)
                } else {
                    let (initial_nodes, initial_reroutes) = self.selection.snapshot();
                    Activity::BoxSelect(BoxSelectState {
                        start: canvas,
                        initial_nodes,
                        initial_reroutes,
                    })
                }
            }
            FrameEvent::PointerDrag { pos, button, .. } if button.is_secondary_or_middle() => {
                self.viewport.pan_by_screen_delta(*pos - self.last_pointer);
                self.request_repaint();
                Activity::DragGrid { button: *button }
            }
            FrameEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
                modifiers,
                clicks,
            } => self.idle_primary_down(*pos, *modifiers, *clicks, undo),
            FrameEvent::Key { command } => {
                self.key_command(*command, undo);
                Activity::Idle
            }
            _ => Activity::Idle,
        }
    }

    fn idle_primary_down(
        &mut self,
        pos: Pos2,
        modifiers: egui::Modifiers,
        clicks: u32,
        undo: &mut dyn UndoSink,
    ) -> Activity {
        let canvas = self.screen_to_canvas(pos);
        self.refresh_hover(canvas);
        self.request_repaint();
        let additive = modifiers.ctrl || modifiers.shift;

        if let Some(port) = self.hovered_port {
            return self.start_connect(port, undo);
        }

        if let Some(reroute) = self.hovered_reroute {
            if self.selection.contains_reroute(reroute) {
                if additive {
                    self.selection.deselect_reroute(reroute);
                }
            } else {
                self.selection.select_reroute(reroute, additive);
            }
            return Activity::Idle;
        }

        if let Some(node) = self.hovered_node {
            if clicks >= 2 {
                let title_hit = self
                    .graph
                    .node(node)
                    .is_some_and(|n| n.title_rect().contains(canvas));
                if title_hit {
                    return Activity::EditTitle(EditTitleState {
                        node,
                        focused: false,
                    });
                }
                self.center_on_node(node);
                return Activity::Idle;
            }
            if self.selection.contains_node(node) {
                if additive {
                    self.selection.deselect_node(node);
                }
            } else {
                self.selection.select_node(node, additive);
            }
            return Activity::Idle;
        }

        if !additive {
            self.selection.clear();
        }
        Activity::Idle
    }

    fn start_connect(&mut self, port: PortKey, undo: &mut dyn UndoSink) -> Activity {
        let mut candidate = None;
        if self.graph.connected(port).is_some() {
            // Grabbing a connected port detaches the wire. Parking the
            // candidate on the port's own node keeps an instant release
            // from opening the creation menu.
            candidate = self.graph.port(port).map(Port::node);
            if let Err(error) = self.graph.disconnect(port, undo) {
                tracing::warn!(%error, "detach failed");
            }
        }
        self.request_repaint();
        Activity::ConnectPort(ConnectPortState { port, candidate })
    }

    fn start_drag(&mut self, canvas: Pos2, undo: &mut dyn UndoSink) -> Activity {
        let mut state = DragState::default();
        let mut targets: Vec<NodeKey> = Vec::new();

        for key in self.graph.order() {
            if !self.selection.contains_node(*key) {
                continue;
            }
            if let Some(node) = self.graph.node(*key) {
                state.nodes.push((*key, node.position() - canvas));
                targets.push(*key);
            }
        }
        for reroute in self.selection.reroutes() {
            if let Some(point) = reroute.point(&self.graph) {
                state.reroutes.push((*reroute, point - canvas));
                if let Some(owner) = self.graph.port(reroute.port).map(Port::node) {
                    if !targets.contains(&owner) {
                        targets.push(owner);
                    }
                }
            }
        }

        if state.nodes.is_empty() && state.reroutes.is_empty() {
            return Activity::Idle;
        }
        undo.snapshot(&self.graph, &targets, "Moved Node");
        Activity::DragNode(state)
    }

    // ----- hover -----

    fn refresh_hover(&mut self, canvas: Pos2) {
        self.hovered_port = self.graph.port_at(canvas);
        self.hovered_reroute = self.graph.reroute_at(canvas);
        self.hovered_node = self.graph.node_at(canvas);
    }

    fn note_pointer(&mut self, event: &FrameEvent) {
        match event {
            FrameEvent::PointerDown { pos, .. }
            | FrameEvent::PointerUp { pos, .. }
            | FrameEvent::PointerMove { pos }
            | FrameEvent::PointerDrag { pos, .. }
            | FrameEvent::Scroll { pos, .. } => self.last_pointer = *pos,
            FrameEvent::Key { .. } | FrameEvent::Cancel => {}
        }
    }

    // ----- pending wire -----

    fn draw_pending_wire(&self, state: &ConnectPortState, painter: &mut dyn CanvasPainter) {
        let Some(port) = self.graph.port(state.port) else {
            return;
        };
        let Some(handle) = port.handle_rect() else {
            return;
        };

        let mut points = vec![handle.center()];
        points.extend_from_slice(self.graph.reroutes(state.port));
        let end = match state.candidate.and_then(|key| self.graph.node(key)) {
            Some(target) => wire_endpoint(handle.center(), target.rect(), port.direction()),
            None => self.screen_to_canvas(self.last_pointer),
        };
        points.push(end);
        if port.direction().is_input() {
            points.reverse();
        }

        let vertices =
            wire_polyline(&points, self.prefs.wire_path, port.stroke(), self.viewport.zoom);
        painter.wire(state.port, &vertices);

        for (index, point) in self.graph.reroutes(state.port).iter().enumerate() {
            painter.reroute_handle(
                RerouteRef::new(state.port, index),
                RerouteRef::handle_rect(*point),
                false,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{FrameEvent, KeyCommand, Modifiers};
    use crate::testing::{
        add_laid_out_node, primary_down, primary_drag, primary_up, test_session, TestNode,
    };
    use crate::wire::WireVertex;
    use egui::pos2;
    use tangle_graph::{NoopUndo, PortDirection, WireStroke};

    /// Canvas (0,0) sits at screen (400,300) for the test session.
    fn to_screen(canvas: Pos2) -> Pos2 {
        canvas + egui::vec2(400.0, 300.0)
    }

    struct NullPainter;
    impl CanvasPainter for NullPainter {
        fn wire(&mut self, _port: PortKey, _vertices: &[WireVertex]) {}
        fn reroute_handle(&mut self, _reroute: RerouteRef, _rect: Rect, _selected: bool) {}
        fn selection_box(&mut self, _rect: Rect) {}
    }

    fn feed(session: &mut EditorSession, event: FrameEvent) {
        session.input_pre(&event);
        session.input_post(&event, &mut NoopUndo);
    }

    #[test]
    fn drag_moves_node_by_exact_pointer_delta() {
        let mut session = test_session();
        session.prefs.grid_snap = false;
        let key = add_laid_out_node(&mut session, TestNode::at("int", 40.0, 40.0));

        feed(&mut session, primary_down(to_screen(pos2(50.0, 50.0))));
        assert!(session.selection.contains_node(key));
        feed(&mut session, primary_drag(to_screen(pos2(53.0, 50.0))));
        assert!(matches!(session.activity(), Activity::DragNode(_)));
        // Offsets were captured at the gesture-start pointer (53, 50), so
        // the node tracks the pointer delta from there exactly.
        feed(&mut session, primary_drag(to_screen(pos2(171.0, -7.0))));
        assert_eq!(
            session.graph.node(key).unwrap().position(),
            pos2(40.0 + 118.0, 40.0 - 57.0)
        );

        feed(&mut session, primary_up(to_screen(pos2(171.0, -7.0))));
        assert!(session.activity().is_idle());
    }

    #[test]
    fn drag_snaps_nodes_to_phased_grid() {
        let mut session = test_session();
        session.prefs.grid_snap = true;
        let key = add_laid_out_node(&mut session, TestNode::at("int", 40.0, 40.0));

        feed(&mut session, primary_down(to_screen(pos2(50.0, 50.0))));
        feed(&mut session, primary_drag(to_screen(pos2(63.0, 51.0))));
        feed(&mut session, primary_drag(to_screen(pos2(80.0, 60.0))));
        let position = session.graph.node(key).unwrap().position();
        assert_eq!((position.x + 8.0) % 16.0, 0.0);
        assert_eq!((position.y + 8.0) % 16.0, 0.0);
    }

    #[test]
    fn box_select_over_empty_canvas_selects_overlapping_nodes() {
        let mut session = test_session();
        let a = add_laid_out_node(&mut session, TestNode::at("int", 0.0, 0.0));
        let b = add_laid_out_node(&mut session, TestNode::at("int", 200.0, 0.0));
        let far = add_laid_out_node(&mut session, TestNode::at("math", 1000.0, 1000.0));

        feed(&mut session, primary_drag(to_screen(pos2(-40.0, -40.0))));
        assert!(matches!(session.activity(), Activity::BoxSelect(_)));
        feed(&mut session, primary_drag(to_screen(pos2(320.0, 120.0))));
        assert!(session.selection.contains_node(a));
        assert!(session.selection.contains_node(b));
        assert!(!session.selection.contains_node(far));

        feed(&mut session, primary_up(to_screen(pos2(320.0, 120.0))));
        assert!(session.activity().is_idle());
    }

    #[test]
    fn box_select_recomputes_from_snapshot() {
        let mut session = test_session();
        let a = add_laid_out_node(&mut session, TestNode::at("int", 0.0, 0.0));

        feed(&mut session, primary_drag(to_screen(pos2(-40.0, -40.0))));
        feed(&mut session, primary_drag(to_screen(pos2(120.0, 120.0))));
        assert!(session.selection.contains_node(a));

        // Shrinking the rectangle away from the node deselects it again:
        // the result is a pure function of snapshot plus rectangle.
        feed(&mut session, primary_drag(to_screen(pos2(-39.0, -39.0))));
        assert!(!session.selection.contains_node(a));
    }

    #[test]
    fn zero_size_box_select_yields_empty_selection() {
        let mut session = test_session();
        add_laid_out_node(&mut session, TestNode::at("int", 0.0, 0.0));

        let start = to_screen(pos2(-40.0, -40.0));
        feed(&mut session, primary_drag(start));
        feed(&mut session, primary_drag(start));
        assert!(session.selection.is_empty());
    }

    #[test]
    fn connect_gesture_commits_on_release_over_accepting_node() {
        let mut session = test_session();
        let source = add_laid_out_node(&mut session, TestNode::at("int", 300.0, 0.0));
        let sink = add_laid_out_node(
            &mut session,
            TestNode::at("math", 0.0, 0.0).with_port("lhs", PortDirection::Input),
        );
        let port = session.graph.node(sink).unwrap().port_key("lhs").unwrap();

        // The input port handle sits on the node's left edge.
        feed(&mut session, primary_down(to_screen(pos2(0.0, 40.0))));
        assert!(matches!(session.activity(), Activity::ConnectPort(_)));

        feed(&mut session, primary_drag(to_screen(pos2(320.0, 40.0))));
        feed(&mut session, primary_up(to_screen(pos2(320.0, 40.0))));

        assert!(session.activity().is_idle());
        assert_eq!(session.graph.connected(port), Some(source));
    }

    #[test]
    fn connect_release_over_empty_canvas_requests_create_menu() {
        let mut session = test_session();
        let sink = add_laid_out_node(
            &mut session,
            TestNode::at("math", 0.0, 0.0).with_port("lhs", PortDirection::Input),
        );
        let port = session.graph.node(sink).unwrap().port_key("lhs").unwrap();

        feed(&mut session, primary_down(to_screen(pos2(0.0, 40.0))));
        feed(&mut session, primary_drag(to_screen(pos2(500.0, 400.0))));
        feed(&mut session, primary_up(to_screen(pos2(500.0, 400.0))));

        let requests = session.take_requests();
        assert!(requests
            .iter()
            .any(|r| matches!(r, EditorRequest::OpenCreateMenu { port: p, .. } if *p == port)));
    }

    #[test]
    fn detaching_a_connected_port_suppresses_the_create_menu() {
        let mut session = test_session();
        let source = add_laid_out_node(&mut session, TestNode::at("int", 300.0, 0.0));
        let sink = add_laid_out_node(
            &mut session,
            TestNode::at("math", 0.0, 0.0).with_int_port("lhs", PortDirection::Input),
        );
        let port = session.graph.node(sink).unwrap().port_key("lhs").unwrap();
        session.graph.connect(port, source, &mut NoopUndo).unwrap();

        // Pressing the connected port detaches immediately...
        feed(&mut session, primary_down(to_screen(pos2(0.0, 40.0))));
        assert_eq!(session.graph.connected(port), None);

        // ...and an instant release neither reconnects nor opens a menu.
        feed(&mut session, primary_up(to_screen(pos2(0.0, 40.0))));
        assert!(session.activity().is_idle());
        assert_eq!(session.graph.connected(port), None);
        assert!(!session
            .take_requests()
            .iter()
            .any(|r| matches!(r, EditorRequest::OpenCreateMenu { .. })));
    }

    #[test]
    fn middle_click_during_connect_appends_a_waypoint() {
        let mut session = test_session();
        let sink = add_laid_out_node(
            &mut session,
            TestNode::at("math", 0.0, 0.0).with_port("lhs", PortDirection::Input),
        );
        let port = session.graph.node(sink).unwrap().port_key("lhs").unwrap();

        feed(&mut session, primary_down(to_screen(pos2(0.0, 40.0))));
        feed(&mut session, primary_drag(to_screen(pos2(150.0, 90.0))));
        feed(
            &mut session,
            FrameEvent::PointerDown {
                pos: to_screen(pos2(150.0, 90.0)),
                button: PointerButton::Middle,
                modifiers: Modifiers::default(),
                clicks: 1,
            },
        );
        assert_eq!(session.graph.reroutes(port), &[pos2(150.0, 90.0)]);

        // A primary press mid-gesture clears the waypoints again.
        feed(&mut session, primary_down(to_screen(pos2(150.0, 90.0))));
        assert!(session.graph.try_reroutes(port).is_none());
    }

    #[test]
    fn secondary_drag_pans_the_grid() {
        let mut session = test_session();
        let drag = |pos: Pos2| FrameEvent::PointerDrag {
            pos,
            button: PointerButton::Secondary,
            modifiers: Modifiers::default(),
        };

        feed(&mut session, FrameEvent::PointerMove { pos: pos2(100.0, 100.0) });
        feed(&mut session, drag(pos2(110.0, 100.0)));
        assert!(matches!(session.activity(), Activity::DragGrid { .. }));
        feed(&mut session, drag(pos2(150.0, 130.0)));
        assert_eq!(session.viewport.pan, egui::vec2(50.0, 30.0));

        feed(
            &mut session,
            FrameEvent::PointerUp {
                pos: pos2(150.0, 130.0),
                button: PointerButton::Secondary,
                modifiers: Modifiers::default(),
            },
        );
        assert!(session.activity().is_idle());
    }

    #[test]
    fn cancel_forces_any_gesture_back_to_idle() {
        let mut session = test_session();
        add_laid_out_node(&mut session, TestNode::at("int", 0.0, 0.0));

        feed(&mut session, primary_drag(to_screen(pos2(-200.0, -200.0))));
        assert!(!session.activity().is_idle());
        feed(&mut session, FrameEvent::Cancel);
        assert!(session.activity().is_idle());
    }

    #[test]
    fn title_edit_waits_for_focus_then_ends_on_blur() {
        let mut session = test_session();
        let key = add_laid_out_node(&mut session, TestNode::at("int", 0.0, 0.0));

        feed(
            &mut session,
            FrameEvent::PointerDown {
                pos: to_screen(pos2(50.0, 10.0)),
                button: PointerButton::Primary,
                modifiers: Modifiers::default(),
                clicks: 2,
            },
        );
        assert_eq!(session.title_edit_target(), Some(key));

        // Not yet focused: a blur report is ignored.
        session.report_title_focus(false);
        assert_eq!(session.title_edit_target(), Some(key));

        session.report_title_focus(true);
        session.report_title_focus(false);
        assert!(session.activity().is_idle());
    }

    #[test]
    fn reroute_click_replaces_node_selection() {
        let mut session = test_session();
        let source = add_laid_out_node(&mut session, TestNode::at("int", 300.0, 0.0));
        let sink = add_laid_out_node(
            &mut session,
            TestNode::at("math", 0.0, 0.0).with_port("lhs", PortDirection::Input),
        );
        let port = session.graph.node(sink).unwrap().port_key("lhs").unwrap();
        session.graph.connect(port, source, &mut NoopUndo).unwrap();
        session
            .graph
            .reroutes_mut(port)
            .unwrap()
            .push(pos2(150.0, 200.0));
        session.selection.select_node(sink, false);

        feed(&mut session, primary_down(to_screen(pos2(150.0, 200.0))));
        assert_eq!(session.selection.node_count(), 0);
        assert_eq!(
            session.selection.reroutes(),
            &[RerouteRef::new(port, 0)]
        );
    }

    #[test]
    fn host_modal_swallows_input() {
        let mut session = test_session();
        let key = add_laid_out_node(&mut session, TestNode::at("int", 0.0, 0.0));
        session.begin_host_modal();

        feed(&mut session, primary_down(to_screen(pos2(50.0, 50.0))));
        assert!(!session.selection.contains_node(key));

        session.end_host_modal();
        assert!(session.activity().is_idle());
    }

    #[test]
    fn draw_phases_do_not_mutate_state() {
        let mut session = test_session();
        let source = add_laid_out_node(&mut session, TestNode::at("int", 300.0, 0.0));
        let sink = add_laid_out_node(
            &mut session,
            TestNode::at("math", 0.0, 0.0).with_port("lhs", PortDirection::Input),
        );
        let port = session.graph.node(sink).unwrap().port_key("lhs").unwrap();
        session.graph.connect(port, source, &mut NoopUndo).unwrap();

        let before = session.graph.node(sink).unwrap().position();
        let mut painter = NullPainter;
        for _ in 0..3 {
            session.paint_wires(&mut painter);
            session.pre_draw(&mut painter);
            session.post_draw(&mut painter);
        }
        assert_eq!(session.graph.node(sink).unwrap().position(), before);
        assert_eq!(session.graph.connected(port), Some(source));
    }

    #[test]
    fn scroll_zooms_and_double_click_centers() {
        let mut session = test_session();
        let key = add_laid_out_node(&mut session, TestNode::at("int", 500.0, 500.0));

        feed(
            &mut session,
            FrameEvent::Scroll {
                pos: pos2(400.0, 300.0),
                delta_y: 1.0,
            },
        );
        assert!(session.viewport.zoom > 1.0);
        session.viewport.reset();

        feed(
            &mut session,
            FrameEvent::PointerDown {
                pos: to_screen(pos2(550.0, 560.0)),
                button: PointerButton::Primary,
                modifiers: Modifiers::default(),
                clicks: 2,
            },
        );
        // The node body double-click centers the view on the node.
        let node_center = session.graph.node(key).unwrap().rect().center();
        assert_eq!(session.viewport.pan, -node_center.to_vec2());
    }

    #[test]
    fn key_command_delete_removes_selection() {
        let mut session = test_session();
        let key = add_laid_out_node(&mut session, TestNode::at("int", 0.0, 0.0));
        session.selection.select_node(key, false);

        feed(
            &mut session,
            FrameEvent::Key {
                command: KeyCommand::Delete,
            },
        );
        assert!(!session.graph.contains_node(key));
        assert!(session.selection.is_empty());
    }

    #[test]
    fn dashed_port_stroke_flows_into_wire_geometry() {
        let mut session = test_session();
        let source = add_laid_out_node(&mut session, TestNode::at("int", 300.0, 0.0));
        let sink = add_laid_out_node(
            &mut session,
            TestNode::at("math", 0.0, 0.0).with_port("lhs", PortDirection::Input),
        );
        let port = session.graph.node(sink).unwrap().port_key("lhs").unwrap();
        session.graph.port_mut(port).unwrap().set_stroke(WireStroke::Dashed);
        session.graph.connect(port, source, &mut NoopUndo).unwrap();
        session.prefs.wire_path = crate::wire::WirePath::Straight;

        struct Collect(Vec<WireVertex>);
        impl CanvasPainter for Collect {
            fn wire(&mut self, _port: PortKey, vertices: &[WireVertex]) {
                self.0.extend_from_slice(vertices);
            }
            fn reroute_handle(&mut self, _r: RerouteRef, _rect: Rect, _s: bool) {}
            fn selection_box(&mut self, _rect: Rect) {}
        }
        let mut painter = Collect(Vec::new());
        session.paint_wires(&mut painter);
        assert!(!painter.0.is_empty());
        assert!(painter.0.iter().any(|v| !v.visible));
    }
}
