// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interaction core for the tangle node editor.
//!
//! This crate turns the data model from `tangle_graph` into an editable
//! surface: selection and multi-edit, the gesture state machine that owns
//! pointer input for the duration of each interaction, and the pure
//! geometry that turns connections into drawable polylines.
//!
//! ## Frame protocol
//!
//! The host owns the event loop and rendering. Each frame it:
//!
//! 1. calls [`EditorSession::begin_frame`] with the canvas rect,
//! 2. feeds every input event through [`EditorSession::input_pre`] and
//!    [`EditorSession::input_post`] (in that order per event),
//! 3. between the two input phases, draws via
//!    [`EditorSession::paint_wires`], [`EditorSession::pre_draw`] and
//!    [`EditorSession::post_draw`] with its [`CanvasPainter`],
//! 4. drains [`EditorSession::take_requests`] and services them (repaint,
//!    opening a creation menu, ...).
//!
//! All mutation happens synchronously inside those calls; the draw-phase
//! methods are read-only and may be called repeatedly.

pub mod activity;
pub mod commands;
pub mod history;
pub mod host;
pub mod prefs;
pub mod selection;
pub mod session;
pub mod viewport;
pub mod wire;

pub use activity::Activity;
pub use commands::CommandError;
pub use history::{HistoryError, SnapshotHistory};
pub use host::{CanvasPainter, EditorRequest, FrameEvent, KeyCommand, PointerButton};
pub use prefs::EditorPrefs;
pub use selection::Selection;
pub use session::EditorSession;
pub use viewport::Viewport;
pub use wire::{wire_bounds, wire_endpoint, wire_polyline, WirePath, WireVertex};

#[cfg(test)]
pub(crate) mod testing;
