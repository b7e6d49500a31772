// SPDX-License-Identifier: MIT OR Apache-2.0
//! The host-facing undo boundary.

use crate::graph::EditorGraph;
use crate::node::NodeKey;

/// Opaque undo boundary implemented by the host.
///
/// The editor calls [`snapshot`](Self::snapshot) immediately before
/// mutating the listed nodes; what the host does with it (group, persist,
/// ignore) is its own business. `tangle_editor` ships a ready default in
/// its `history` module.
pub trait UndoSink {
    /// Record the pre-mutation state of `targets` under a display label.
    fn snapshot(&mut self, graph: &EditorGraph, targets: &[NodeKey], label: &str);
}

/// An [`UndoSink`] that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUndo;

impl UndoSink for NoopUndo {
    fn snapshot(&mut self, _graph: &EditorGraph, _targets: &[NodeKey], _label: &str) {}
}
