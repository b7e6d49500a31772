// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reroute waypoint references.

use egui::{Pos2, Rect, Vec2};

use crate::graph::EditorGraph;
use crate::port::PortKey;

/// Side length of a reroute handle in canvas units.
const HANDLE_SIZE: f32 = 12.0;

/// A `(port, index)` view into a port's waypoint list.
///
/// The reference does not own the point; the index is only meaningful
/// against the list's current state. Removing a waypoint shifts every
/// higher index down by one, so batch removals must process indices
/// highest-first (the command layer sorts for this).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RerouteRef {
    /// The port whose waypoint list is referenced.
    pub port: PortKey,
    /// Index into the waypoint list.
    pub index: usize,
}

impl RerouteRef {
    /// Create a reference to waypoint `index` of `port`.
    pub fn new(port: PortKey, index: usize) -> Self {
        Self { port, index }
    }

    /// The referenced waypoint, or `None` when the port or index is gone.
    pub fn point(&self, graph: &EditorGraph) -> Option<Pos2> {
        graph.try_reroutes(self.port)?.get(self.index).copied()
    }

    /// Canvas-space handle rect of the referenced waypoint.
    pub fn rect(&self, graph: &EditorGraph) -> Option<Rect> {
        self.point(graph).map(Self::handle_rect)
    }

    /// Move the referenced waypoint. Stale references are ignored.
    pub fn set(&self, graph: &mut EditorGraph, pos: Pos2) {
        if let Some(points) = graph.reroutes_mut(self.port) {
            if let Some(point) = points.get_mut(self.index) {
                *point = pos;
            }
        }
    }

    /// Insert a waypoint at this index, shifting later points up.
    pub fn insert(&self, graph: &mut EditorGraph, pos: Pos2) {
        if let Some(points) = graph.reroutes_mut(self.port) {
            if self.index <= points.len() {
                points.insert(self.index, pos);
            }
        }
    }

    /// Remove the referenced waypoint, shifting later points down. The
    /// list is pruned entirely when this removes the last point.
    pub fn remove(&self, graph: &mut EditorGraph) {
        if let Some(points) = graph.reroutes_mut(self.port) {
            if self.index < points.len() {
                points.remove(self.index);
            }
        }
        graph.prune_empty_reroutes(self.port);
    }

    /// The 12x12 handle rect centered on a waypoint.
    pub fn handle_rect(point: Pos2) -> Rect {
        Rect::from_center_size(point, Vec2::splat(HANDLE_SIZE))
    }
}
