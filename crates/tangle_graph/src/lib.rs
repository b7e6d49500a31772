// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data model for the tangle node editor.
//!
//! This crate holds the host-independent half of the editor: nodes with
//! typed, directional ports, the single-valued connection state behind each
//! port, and the reroute waypoints that bend a connection's path. It knows
//! nothing about rendering or input; the `tangle_editor` crate builds
//! selection and gesture handling on top of it.
//!
//! ## Architecture
//!
//! - Nodes and ports live in [`slotmap`] arenas; handles are
//!   generation-checked, so a key kept across a removal is rejected instead
//!   of resurrecting on slot reuse.
//! - A node's user payload implements [`NodeValue`] and owns the connection
//!   references; ports are typed views over those fields.
//! - Reroute waypoints are stored per node, keyed by port field name, and
//!   exist only while non-empty.

pub mod graph;
pub mod node;
pub mod port;
pub mod registry;
pub mod reroute;
pub mod undo;

pub use graph::{EditorGraph, GraphError};
pub use node::{EditorNode, NodeKey, NodeValue, TITLE_HEIGHT};
pub use port::{Port, PortDirection, PortKey, PortSpec, WireStroke};
pub use registry::{NodeTypeRegistry, NodeTypeSpec};
pub use reroute::RerouteRef;
pub use undo::{NoopUndo, UndoSink};

#[cfg(test)]
pub(crate) mod testing;
