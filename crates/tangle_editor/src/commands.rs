// SPDX-License-Identifier: MIT OR Apache-2.0
//! User commands operating on the selection: duplicate, copy/paste,
//! remove, view framing.

use egui::{pos2, Pos2, Vec2};
use tangle_graph::{GraphError, NodeKey, Port, PortKey, RerouteRef, UndoSink};

use crate::host::KeyCommand;
use crate::session::{CopiedNode, EditorSession};

/// Offset applied to duplicated nodes, relative to the source bounding
/// top-left corner.
const DUPLICATE_OFFSET: Vec2 = Vec2 { x: 30.0, y: 30.0 };

/// Error from a session command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The registry has no node kind under this id.
    #[error("unknown node type: {0}")]
    UnknownType(String),

    /// Creating another instance would exceed the kind's cap.
    #[error("instance cap reached for {type_id} (max {max})")]
    InstanceCapReached {
        /// The capped node kind.
        type_id: String,
        /// Its configured maximum.
        max: usize,
    },

    /// The underlying graph operation failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl EditorSession {
    /// Dispatch a keyboard command.
    pub fn key_command(&mut self, command: KeyCommand, undo: &mut dyn UndoSink) {
        match command {
            KeyCommand::Delete => self.remove_selected(undo),
            KeyCommand::Duplicate => {
                self.duplicate_selected();
            }
            KeyCommand::Copy => self.copy_selected(),
            KeyCommand::Paste => {
                let pos = self.screen_to_canvas(self.last_pointer);
                self.paste(pos);
            }
            KeyCommand::SelectAll => self.select_all_toggle(),
            KeyCommand::Home => self.home(),
        }
        self.request_repaint();
    }

    /// Remove the selected reroute points and nodes.
    ///
    /// Reroute points go first, highest index first within each port, so
    /// earlier removals never invalidate the remaining indices.
    pub fn remove_selected(&mut self, undo: &mut dyn UndoSink) {
        let mut reroutes = self.selection.reroutes().to_vec();
        reroutes.sort_by(|a, b| b.index.cmp(&a.index));

        let mut targets: Vec<NodeKey> = self
            .graph
            .order()
            .iter()
            .copied()
            .filter(|key| self.selection.contains_node(*key))
            .collect();
        for reroute in &reroutes {
            if let Some(owner) = self.graph.port(reroute.port).map(Port::node) {
                if !targets.contains(&owner) {
                    targets.push(owner);
                }
            }
        }
        undo.snapshot(&self.graph, &targets, "Remove Selected");

        for reroute in &reroutes {
            reroute.remove(&mut self.graph);
        }
        let nodes: Vec<NodeKey> = self
            .graph
            .order()
            .iter()
            .copied()
            .filter(|key| self.selection.contains_node(*key))
            .collect();
        for key in nodes {
            self.graph.remove_node(key);
        }
        self.selection.clear();
    }

    /// Duplicate the selected nodes 30 units down-right of their bounding
    /// top-left corner, then select exactly the copies.
    pub fn duplicate_selected(&mut self) -> Vec<NodeKey> {
        let sources = self.copy_selection();
        let Some(top_left) = bounding_top_left(&sources) else {
            return Vec::new();
        };
        self.insert_duplicates(sources, top_left + DUPLICATE_OFFSET)
    }

    /// Capture the selected nodes into the session's copy buffer.
    pub fn copy_selected(&mut self) {
        self.copy_buffer = self.copy_selection();
    }

    /// Instantiate the copy buffer with its bounding top-left corner at
    /// `pos`, then select exactly the copies. The buffer survives for
    /// repeated pastes.
    pub fn paste(&mut self, pos: Pos2) -> Vec<NodeKey> {
        let sources = self.copy_buffer.clone();
        self.insert_duplicates(sources, pos)
    }

    fn copy_selection(&self) -> Vec<CopiedNode> {
        self.graph
            .order()
            .iter()
            .filter(|key| self.selection.contains_node(**key))
            .filter_map(|key| self.graph.node(*key))
            .map(|node| CopiedNode {
                value: node.value().boxed_clone(),
                name: node.name().to_owned(),
            })
            .collect()
    }

    fn insert_duplicates(&mut self, sources: Vec<CopiedNode>, top_left: Pos2) -> Vec<NodeKey> {
        let Some(source_top_left) = bounding_top_left(&sources) else {
            return Vec::new();
        };
        let offset = top_left - source_top_left;

        let mut new_keys = Vec::new();
        for source in sources {
            let type_id = source.value.type_id().to_owned();
            // Per-item cap check; a skipped copy never aborts the batch.
            // The count includes copies made earlier in this call.
            if let Some(max) = self.registry.max_instances(&type_id) {
                if self.graph.count_of_type(&type_id) >= max {
                    tracing::warn!(type_id = %type_id, max, "instance cap reached, skipping copy");
                    continue;
                }
            }
            let mut value = source.value;
            let position = value.position() + offset;
            value.set_position(position);
            let key = self.graph.add_node(value);
            if let Some(node) = self.graph.node_mut(key) {
                node.set_name(source.name);
            }
            new_keys.push(key);
        }

        self.selection.set(new_keys.iter().copied(), Vec::new());
        new_keys
    }

    /// Select every node, or clear the selection when any node is already
    /// selected.
    pub fn select_all_toggle(&mut self) {
        if self.selection.node_count() > 0 {
            self.selection.clear();
        } else {
            let keys: Vec<NodeKey> = self.graph.order().to_vec();
            for key in keys {
                self.selection.select_node(key, true);
            }
        }
    }

    /// Center the view on the selection bounds, or reset pan and zoom when
    /// nothing is selected.
    pub fn home(&mut self) {
        let mut bounds = egui::Rect::NOTHING;
        for key in self.selection.nodes() {
            if let Some(node) = self.graph.node(key) {
                bounds = bounds.union(node.rect());
            }
        }
        if bounds.is_finite() {
            self.viewport.center_on(bounds.center());
        } else {
            self.viewport.reset();
        }
    }

    /// Center the view on one node.
    pub fn center_on_node(&mut self, key: NodeKey) {
        if let Some(node) = self.graph.node(key) {
            self.viewport.center_on(node.rect().center());
            self.request_repaint();
        }
    }

    /// Remove a single reroute point (the reroute context-menu command).
    pub fn remove_reroute(&mut self, reroute: RerouteRef, undo: &mut dyn UndoSink) {
        if let Some(owner) = self.graph.port(reroute.port).map(Port::node) {
            undo.snapshot(&self.graph, &[owner], "Remove Reroute");
        }
        reroute.remove(&mut self.graph);
        self.selection.deselect_reroute(reroute);
        self.request_repaint();
    }

    /// Finish a drag-to-create gesture: instantiate `type_id` at
    /// `canvas_pos` and wire it to the waiting port.
    pub fn complete_create_menu(
        &mut self,
        port: PortKey,
        type_id: &str,
        canvas_pos: Pos2,
        undo: &mut dyn UndoSink,
    ) -> Result<NodeKey, CommandError> {
        if let Some(max) = self.registry.max_instances(type_id) {
            if self.graph.count_of_type(type_id) >= max {
                return Err(CommandError::InstanceCapReached {
                    type_id: type_id.to_owned(),
                    max,
                });
            }
        }
        let mut value = self
            .registry
            .create(type_id)
            .ok_or_else(|| CommandError::UnknownType(type_id.to_owned()))?;
        value.set_position(canvas_pos);
        let key = self.graph.add_node(value);
        self.graph.connect(port, key, undo)?;
        self.request_repaint();
        Ok(key)
    }
}

fn bounding_top_left(sources: &[CopiedNode]) -> Option<Pos2> {
    sources
        .iter()
        .map(|source| source.value.position())
        .reduce(|a, b| pos2(a.x.min(b.x), a.y.min(b.y)))
}
