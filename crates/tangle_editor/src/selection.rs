// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection state: node set plus reroute point list.

use std::collections::HashSet;

use tangle_graph::{NodeKey, RerouteRef};

/// The two parallel selection sets.
///
/// Nodes and reroute points are tracked independently. A non-additive
/// selection of either kind clears both sets first, so mixed selections
/// only arise from additive (ctrl/shift) clicks and box-selects.
#[derive(Debug, Default)]
pub struct Selection {
    nodes: HashSet<NodeKey>,
    reroutes: Vec<RerouteRef>,
}

impl Selection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes.iter().copied()
    }

    /// Selected reroute points, in selection order.
    pub fn reroutes(&self) -> &[RerouteRef] {
        &self.reroutes
    }

    /// Whether the node is selected.
    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.nodes.contains(&key)
    }

    /// Whether the reroute point is selected.
    pub fn contains_reroute(&self, reroute: RerouteRef) -> bool {
        self.reroutes.contains(&reroute)
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.reroutes.is_empty()
    }

    /// Number of selected nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of selected reroute points.
    pub fn reroute_count(&self) -> usize {
        self.reroutes.len()
    }

    /// Select a node; a non-additive select replaces the whole selection.
    pub fn select_node(&mut self, key: NodeKey, additive: bool) {
        if !additive {
            self.clear();
        }
        self.nodes.insert(key);
    }

    /// Remove a node from the selection.
    pub fn deselect_node(&mut self, key: NodeKey) {
        self.nodes.remove(&key);
    }

    /// Select a reroute point; a non-additive select replaces the whole
    /// selection.
    pub fn select_reroute(&mut self, reroute: RerouteRef, additive: bool) {
        if !additive {
            self.clear();
        }
        if !self.reroutes.contains(&reroute) {
            self.reroutes.push(reroute);
        }
    }

    /// Remove a reroute point from the selection.
    pub fn deselect_reroute(&mut self, reroute: RerouteRef) {
        self.reroutes.retain(|r| *r != reroute);
    }

    /// Replace both sets wholesale (box-select recomputation).
    pub fn set(&mut self, nodes: impl IntoIterator<Item = NodeKey>, reroutes: Vec<RerouteRef>) {
        self.nodes = nodes.into_iter().collect();
        self.reroutes = reroutes;
    }

    /// Clear both sets.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.reroutes.clear();
    }

    /// Copy of both sets, taken when a box-select gesture starts.
    pub fn snapshot(&self) -> (Vec<NodeKey>, Vec<RerouteRef>) {
        (self.nodes.iter().copied().collect(), self.reroutes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tangle_graph::PortKey;

    fn reroute(index: usize) -> RerouteRef {
        RerouteRef::new(PortKey::default(), index)
    }

    #[test]
    fn non_additive_node_select_replaces_everything() {
        let mut selection = Selection::new();
        selection.select_reroute(reroute(0), false);
        let key = NodeKey::default();
        selection.select_node(key, false);
        assert!(selection.contains_node(key));
        assert_eq!(selection.reroute_count(), 0);
    }

    #[test]
    fn non_additive_reroute_select_clears_nodes() {
        let mut selection = Selection::new();
        selection.select_node(NodeKey::default(), false);
        selection.select_reroute(reroute(1), false);
        assert_eq!(selection.node_count(), 0);
        assert_eq!(selection.reroutes(), &[reroute(1)]);
    }

    #[test]
    fn additive_select_allows_mixed_selection() {
        let mut selection = Selection::new();
        selection.select_node(NodeKey::default(), false);
        selection.select_reroute(reroute(0), true);
        assert_eq!(selection.node_count(), 1);
        assert_eq!(selection.reroute_count(), 1);
    }

    #[test]
    fn selecting_the_same_reroute_twice_is_single() {
        let mut selection = Selection::new();
        selection.select_reroute(reroute(2), true);
        selection.select_reroute(reroute(2), true);
        assert_eq!(selection.reroute_count(), 1);
        selection.deselect_reroute(reroute(2));
        assert!(selection.is_empty());
    }
}
