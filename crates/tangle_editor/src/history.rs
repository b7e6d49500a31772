// SPDX-License-Identifier: MIT OR Apache-2.0
//! A ready-made undo/redo history for hosts without their own.
//!
//! [`SnapshotHistory`] implements the [`UndoSink`] boundary by cloning the
//! values of the nodes about to be mutated. It restores positions, links,
//! names and reroute waypoints; node creation and removal are outside its
//! reach, so hosts that need those undone should bring their own sink.

use std::collections::{HashMap, VecDeque};

use egui::Pos2;
use tangle_graph::{EditorGraph, NodeKey, NodeValue, UndoSink};
use thiserror::Error;

/// Maximum undo history depth.
const MAX_HISTORY: usize = 100;

/// History errors.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo.
    #[error("nothing to undo")]
    NothingToUndo,

    /// Nothing to redo.
    #[error("nothing to redo")]
    NothingToRedo,
}

#[derive(Debug)]
struct NodeSnapshot {
    key: NodeKey,
    name: String,
    value: Box<dyn NodeValue>,
    reroutes: HashMap<String, Vec<Pos2>>,
}

/// One undoable step: the pre-mutation state of the touched nodes.
#[derive(Debug)]
pub struct UndoStep {
    label: String,
    nodes: Vec<NodeSnapshot>,
}

impl UndoStep {
    /// Display label of the step.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Bounded undo/redo stacks over node-value snapshots.
#[derive(Debug, Default)]
pub struct SnapshotHistory {
    undo_stack: VecDeque<UndoStep>,
    redo_stack: VecDeque<UndoStep>,
    max_depth: usize,
}

impl SnapshotHistory {
    /// Create a history with the default depth.
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create a history with a custom maximum depth.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
        }
    }

    fn capture(graph: &EditorGraph, targets: &[NodeKey], label: &str) -> UndoStep {
        let mut nodes = Vec::new();
        for key in targets {
            if nodes.iter().any(|s: &NodeSnapshot| s.key == *key) {
                continue;
            }
            if let Some(node) = graph.node(*key) {
                nodes.push(NodeSnapshot {
                    key: *key,
                    name: node.name().to_owned(),
                    value: node.value().boxed_clone(),
                    reroutes: node.reroutes_map().clone(),
                });
            }
        }
        UndoStep {
            label: label.to_owned(),
            nodes,
        }
    }

    fn restore(graph: &mut EditorGraph, step: &UndoStep) {
        for snapshot in &step.nodes {
            // Nodes removed since the snapshot are skipped; the rest of
            // the step still applies.
            if let Some(node) = graph.node_mut(snapshot.key) {
                node.replace_value(snapshot.value.boxed_clone());
                node.set_name(snapshot.name.clone());
                node.set_reroutes_map(snapshot.reroutes.clone());
            }
        }
    }

    /// Undo the most recent step.
    pub fn undo(&mut self, graph: &mut EditorGraph) -> Result<(), HistoryError> {
        let step = self.undo_stack.pop_back().ok_or(HistoryError::NothingToUndo)?;
        let keys: Vec<NodeKey> = step.nodes.iter().map(|s| s.key).collect();
        let current = Self::capture(graph, &keys, &step.label);
        Self::restore(graph, &step);
        self.redo_stack.push_back(current);
        Ok(())
    }

    /// Redo the most recently undone step.
    pub fn redo(&mut self, graph: &mut EditorGraph) -> Result<(), HistoryError> {
        let step = self.redo_stack.pop_back().ok_or(HistoryError::NothingToRedo)?;
        let keys: Vec<NodeKey> = step.nodes.iter().map(|s| s.key).collect();
        let current = Self::capture(graph, &keys, &step.label);
        Self::restore(graph, &step);
        self.undo_stack.push_back(current);
        Ok(())
    }

    /// Whether undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the next undo step.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(UndoStep::label)
    }

    /// Label of the next redo step.
    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.back().map(UndoStep::label)
    }

    /// Current undo stack depth.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Drop all recorded steps.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl UndoSink for SnapshotHistory {
    fn snapshot(&mut self, graph: &EditorGraph, targets: &[NodeKey], label: &str) {
        let step = Self::capture(graph, targets, label);
        if step.nodes.is_empty() {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push_back(step);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }
}
