// SPDX-License-Identifier: MIT OR Apache-2.0
//! The host boundary: input events in, draw and service requests out.

use egui::{Pos2, Rect};
use tangle_graph::{PortKey, RerouteRef};

use crate::wire::WireVertex;

pub use egui::Modifiers;

/// Pointer buttons the editor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Usually the left button; selects, drags and connects.
    Primary,
    /// Usually the right button; pans and places reroute waypoints.
    Secondary,
    /// The middle button; pans and places reroute waypoints.
    Middle,
}

impl PointerButton {
    /// Whether this is one of the pan/waypoint buttons.
    pub fn is_secondary_or_middle(self) -> bool {
        matches!(self, Self::Secondary | Self::Middle)
    }
}

/// Keyboard commands the host forwards to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// Remove the selected nodes and reroute points.
    Delete,
    /// Duplicate the selected nodes with a fixed offset.
    Duplicate,
    /// Copy the selected nodes into the session's copy buffer.
    Copy,
    /// Paste the copy buffer at the pointer position.
    Paste,
    /// Toggle between all nodes selected and none.
    SelectAll,
    /// Frame the selection, or reset the view when nothing is selected.
    Home,
}

/// One input event, translated by the host. Positions are in screen space;
/// the session converts through its viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameEvent {
    /// A button was pressed. `clicks` counts consecutive clicks, so a
    /// double-click arrives with `clicks == 2`.
    PointerDown {
        /// Pointer position.
        pos: Pos2,
        /// The pressed button.
        button: PointerButton,
        /// Held keyboard modifiers.
        modifiers: Modifiers,
        /// Consecutive click count.
        clicks: u32,
    },
    /// A button was released.
    PointerUp {
        /// Pointer position.
        pos: Pos2,
        /// The released button.
        button: PointerButton,
        /// Held keyboard modifiers.
        modifiers: Modifiers,
    },
    /// The pointer moved with no button held.
    PointerMove {
        /// Pointer position.
        pos: Pos2,
    },
    /// The pointer moved while a button is held.
    PointerDrag {
        /// Pointer position.
        pos: Pos2,
        /// The held button.
        button: PointerButton,
        /// Held keyboard modifiers.
        modifiers: Modifiers,
    },
    /// Scroll wheel movement over the canvas.
    Scroll {
        /// Pointer position.
        pos: Pos2,
        /// Vertical scroll amount; positive zooms in.
        delta_y: f32,
    },
    /// A keyboard command.
    Key {
        /// The command.
        command: KeyCommand,
    },
    /// Forced gesture cancellation, e.g. the pointer was released outside
    /// the window or the host lost input capture.
    Cancel,
}

/// A request the session hands back to the host at the end of a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorRequest {
    /// State changed in a way that needs a repaint.
    Repaint,
    /// A connect gesture ended over empty canvas with drag-to-create
    /// enabled: open a creation menu filtered to kinds the port accepts,
    /// and call [`complete_create_menu`] on accept.
    ///
    /// [`complete_create_menu`]: crate::session::EditorSession::complete_create_menu
    OpenCreateMenu {
        /// The port waiting for a connection.
        port: PortKey,
        /// Screen position for the menu.
        screen_pos: Pos2,
    },
}

/// Drawing callbacks implemented by the host's paint pass.
///
/// All geometry arrives in canvas space; the host applies its own
/// canvas-to-screen transform when rasterizing.
pub trait CanvasPainter {
    /// Draw a wire as a polyline. Vertices carry the gradient parameter
    /// `t` and a `visible` flag for dash gaps; the wire's colors follow
    /// from the port (and the registry's display colors).
    fn wire(&mut self, port: PortKey, vertices: &[WireVertex]);

    /// Draw a reroute waypoint handle.
    fn reroute_handle(&mut self, reroute: RerouteRef, rect: Rect, selected: bool);

    /// Draw the box-select rectangle.
    fn selection_box(&mut self, rect: Rect);
}
