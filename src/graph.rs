//! The authoritative in-memory dialogue graph.
//!
//! [`GraphModel`] owns every node and connection plus the single selection slot.
//! All mutations go through it. Invalid requests (self-loops, unknown ids) are
//! ignored rather than reported, since the editor has no notion of an invalid graph.

use crate::constants::{SEED_START_ID, SEED_START_POSITION};
use crate::snapshot::{NodeRecord, Snapshot};
use crate::types::*;

/// Nodes, connections and the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphModel {
    nodes: Vec<BotNode>,
    connections: Vec<Connection>,
    selected: Option<NodeId>,
}

impl Default for GraphModel {
    /// Creates a graph seeded with a single start node.
    fn default() -> Self {
        let mut graph = Self::empty();
        graph.nodes.push(BotNode::with_id(
            NodeId::from(SEED_START_ID),
            NodeKind::Start,
            SEED_START_POSITION,
        ));
        graph
    }
}

impl GraphModel {
    /// Creates a graph with no nodes at all.
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            selected: None,
        }
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[BotNode] {
        &self.nodes
    }

    /// All connections in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Looks up a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&BotNode> {
        self.nodes.iter().find(|node| node.id == *id)
    }

    fn node_mut(&mut self, id: &NodeId) -> Option<&mut BotNode> {
        self.nodes.iter_mut().find(|node| node.id == *id)
    }

    /// Returns true if a node with this id exists.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Creates a node of the given kind with default attributes.
    ///
    /// # Returns
    ///
    /// The newly inserted node.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> &BotNode {
        let node = BotNode::new(kind, position);
        log::debug!("Adding {} node {}", kind, node.id);
        self.nodes.push(node);
        let last = self.nodes.len() - 1;
        &self.nodes[last]
    }

    /// Removes a node and every connection that references it.
    ///
    /// Clears the selection if it pointed at the node.
    ///
    /// # Returns
    ///
    /// `true` if the node was found and removed, `false` if it didn't exist.
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| node.id != *id);
        let removed = self.nodes.len() != before;
        if removed {
            // Remove all connections involving this node
            self.connections
                .retain(|conn| conn.from != *id && conn.to != *id);
            if self.selected.as_ref() == Some(id) {
                self.selected = None;
            }
            log::debug!("Removed node {}", id);
        }
        removed
    }

    /// Adds a directed connection between two existing, distinct nodes.
    ///
    /// Self-loops, missing endpoints and exact duplicates are ignored.
    ///
    /// # Returns
    ///
    /// `true` if a connection was added.
    pub fn add_connection(&mut self, from: &NodeId, to: &NodeId) -> bool {
        if from == to || !self.contains_node(from) || !self.contains_node(to) {
            return false;
        }
        if self
            .connections
            .iter()
            .any(|c| c.from == *from && c.to == *to)
        {
            return false;
        }

        self.connections
            .push(Connection::new(from.clone(), to.clone()));
        log::debug!("Connected {} -> {}", from, to);
        true
    }

    /// Removes the connection at `index`.
    pub fn remove_connection(&mut self, index: usize) -> Option<Connection> {
        (index < self.connections.len()).then(|| self.connections.remove(index))
    }

    /// Sets or clears the label of the connection at `index`.
    pub fn set_connection_label(&mut self, index: usize, label: Option<String>) -> bool {
        match self.connections.get_mut(index) {
            Some(connection) => {
                connection.label = label.filter(|l| !l.is_empty());
                true
            }
            None => false,
        }
    }

    /// Replaces one attribute in a node's attribute bag.
    ///
    /// # Returns
    ///
    /// `false` if no node has this id.
    pub fn update_node_attribute(&mut self, id: &NodeId, update: AttributeUpdate) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.apply(update);
                true
            }
            None => false,
        }
    }

    /// Overwrites a node's position.
    pub fn move_node(&mut self, id: &NodeId, position: Position) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Makes `id` the single selected node. Unknown ids leave the selection untouched.
    pub fn select(&mut self, id: &NodeId) -> bool {
        if self.contains_node(id) {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Id of the selected node, if any.
    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    /// The selected node, if any.
    pub fn selected_node(&self) -> Option<&BotNode> {
        self.selected.as_ref().and_then(|id| self.node(id))
    }

    /// Indices of connections whose endpoints no longer exist.
    ///
    /// Only [`GraphModel::deserialize`] can produce these.
    pub fn dangling_connections(&self) -> Vec<usize> {
        self.connections
            .iter()
            .enumerate()
            .filter(|(_, c)| !self.contains_node(&c.from) || !self.contains_node(&c.to))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Produces the wire snapshot of the whole graph.
    pub fn serialize(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.iter().map(NodeRecord::from).collect(),
            connections: self.connections.clone(),
            created: None,
        }
    }

    /// Replaces the entire graph with the snapshot's contents.
    ///
    /// Connection endpoints are not validated.
    pub fn deserialize(&mut self, snapshot: Snapshot) {
        self.nodes = snapshot.nodes.into_iter().map(BotNode::from).collect();
        self.connections = snapshot.connections;
        self.selected = None;
    }

    /// Builds a new graph from a snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut graph = Self::empty();
        graph.deserialize(snapshot);
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn ids(graph: &GraphModel) -> HashSet<NodeId> {
        graph.nodes().iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn test_default_graph_is_seeded() {
        let graph = GraphModel::default();

        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.nodes()[0].id.as_str(), "start-1");
        assert_eq!(graph.nodes()[0].kind(), NodeKind::Start);
        assert!(graph.connections().is_empty());
        assert!(graph.selected().is_none());
    }

    #[test]
    fn test_add_node_keeps_kind() {
        let mut graph = GraphModel::empty();
        for kind in NodeKind::ALL {
            assert_eq!(graph.add_node(kind, (0.0, 0.0)).kind(), kind);
        }
        assert_eq!(graph.nodes().len(), NodeKind::ALL.len());
    }

    #[test]
    fn test_thousand_nodes_have_distinct_ids() {
        let mut graph = GraphModel::empty();
        for i in 0..1000 {
            let kind = NodeKind::ALL[i % NodeKind::ALL.len()];
            graph.add_node(kind, (i as f32, 0.0));
        }
        assert_eq!(ids(&graph).len(), 1000);
    }

    #[test]
    fn test_drop_message_scenario() {
        let mut graph = GraphModel::default();
        let node = graph.add_node(NodeKind::Message, (200.0, 150.0)).clone();

        assert_eq!(graph.nodes().len(), 2);
        assert!(graph.connections().is_empty());
        assert_eq!(node.position, (200.0, 150.0));
        assert_eq!(node.label, "Сообщение");
        assert_eq!(node.body, NodeBody::Message { text: String::new() });
    }

    #[test]
    fn test_remove_node_cascades_connections() {
        let mut graph = GraphModel::empty();
        let a = graph.add_node(NodeKind::Start, (0.0, 0.0)).id.clone();
        let b = graph.add_node(NodeKind::Message, (100.0, 0.0)).id.clone();
        let c = graph.add_node(NodeKind::End, (200.0, 0.0)).id.clone();

        assert!(graph.add_connection(&a, &b));
        assert!(graph.add_connection(&b, &c));
        assert_eq!(graph.connections().len(), 2);

        assert!(graph.remove_node(&b));
        assert!(graph.connections().is_empty());
        assert_eq!(graph.nodes().len(), 2);
    }

    #[test]
    fn test_remove_node_keeps_unrelated_connections() {
        let mut graph = GraphModel::empty();
        let a = graph.add_node(NodeKind::Start, (0.0, 0.0)).id.clone();
        let b = graph.add_node(NodeKind::Message, (100.0, 0.0)).id.clone();
        let c = graph.add_node(NodeKind::End, (200.0, 0.0)).id.clone();
        graph.add_connection(&a, &b);
        graph.add_connection(&a, &c);

        graph.remove_node(&b);

        assert_eq!(graph.connections(), &[Connection::new(a, c)]);
    }

    #[test]
    fn test_remove_node_is_idempotent() {
        let mut graph = GraphModel::default();
        let id = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();
        graph.add_connection(&NodeId::from("start-1"), &id);

        assert!(graph.remove_node(&id));
        let once = graph.clone();
        assert!(!graph.remove_node(&id));
        assert_eq!(graph, once);
    }

    #[test]
    fn test_remove_selected_node_clears_selection() {
        let mut graph = GraphModel::default();
        let id = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();
        assert!(graph.select(&id));

        graph.remove_node(&id);

        assert!(graph.selected().is_none());
    }

    #[test]
    fn test_remove_other_node_keeps_selection() {
        let mut graph = GraphModel::default();
        let id = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();
        graph.select(&id);

        graph.remove_node(&NodeId::from("start-1"));

        assert_eq!(graph.selected(), Some(&id));
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let mut graph = GraphModel::default();
        let start = NodeId::from("start-1");

        assert!(!graph.add_connection(&start, &start));
        assert!(graph.connections().is_empty());
    }

    #[test]
    fn test_connection_to_missing_node_is_noop() {
        let mut graph = GraphModel::default();
        let start = NodeId::from("start-1");

        assert!(!graph.add_connection(&start, &NodeId::from("ghost")));
        assert!(!graph.add_connection(&NodeId::from("ghost"), &start));
        assert!(graph.connections().is_empty());
    }

    #[test]
    fn test_duplicate_connection_is_ignored() {
        let mut graph = GraphModel::default();
        let start = NodeId::from("start-1");
        let msg = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();

        assert!(graph.add_connection(&start, &msg));
        assert!(!graph.add_connection(&start, &msg));
        // The reverse direction is a different connection
        assert!(graph.add_connection(&msg, &start));
        assert_eq!(graph.connections().len(), 2);
    }

    #[test]
    fn test_cycles_are_permitted() {
        let mut graph = GraphModel::empty();
        let a = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();
        let b = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();
        let c = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();

        assert!(graph.add_connection(&a, &b));
        assert!(graph.add_connection(&b, &c));
        assert!(graph.add_connection(&c, &a));
    }

    #[test]
    fn test_update_attribute_and_move() {
        let mut graph = GraphModel::default();
        let id = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();

        assert!(graph.update_node_attribute(&id, AttributeUpdate::Text("Hello".into())));
        assert!(graph.move_node(&id, (42.0, 24.0)));

        let node = graph.node(&id).unwrap();
        assert_eq!(node.body.text(), Some("Hello"));
        assert_eq!(node.position, (42.0, 24.0));

        let ghost = NodeId::from("ghost");
        assert!(!graph.update_node_attribute(&ghost, AttributeUpdate::Label("x".into())));
        assert!(!graph.move_node(&ghost, (1.0, 1.0)));
    }

    #[test]
    fn test_connection_label_and_removal() {
        let mut graph = GraphModel::default();
        let start = NodeId::from("start-1");
        let msg = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();
        graph.add_connection(&start, &msg);

        assert!(graph.set_connection_label(0, Some("yes".into())));
        assert_eq!(graph.connections()[0].label.as_deref(), Some("yes"));
        assert!(graph.set_connection_label(0, Some(String::new())));
        assert!(graph.connections()[0].label.is_none());
        assert!(!graph.set_connection_label(5, None));

        assert!(graph.remove_connection(3).is_none());
        assert_eq!(graph.remove_connection(0), Some(Connection::new(start, msg)));
        assert!(graph.connections().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_graph() {
        let mut graph = GraphModel::default();
        let start = NodeId::from("start-1");
        let question = graph.add_node(NodeKind::Question, (10.0, 20.0)).id.clone();
        let api = graph.add_node(NodeKind::ApiCall, (30.0, 40.0)).id.clone();
        let delay = graph.add_node(NodeKind::Delay, (50.0, 60.0)).id.clone();
        graph.update_node_attribute(&question, AttributeUpdate::Text("Ready?".into()));
        graph.update_node_attribute(
            &question,
            AttributeUpdate::Options(vec!["Yes".into(), "No".into()]),
        );
        graph.update_node_attribute(&api, AttributeUpdate::Url("https://api.test".into()));
        graph.update_node_attribute(&delay, AttributeUpdate::Delay(30));
        graph.add_connection(&start, &question);
        graph.add_connection(&question, &api);
        graph.add_connection(&api, &delay);
        graph.set_connection_label(1, Some("Yes".into()));

        let restored = GraphModel::from_snapshot(graph.serialize());

        assert_eq!(restored.nodes(), graph.nodes());
        assert_eq!(restored.connections(), graph.connections());
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut graph = GraphModel::default();
        let msg = graph.add_node(NodeKind::Message, (1.5, 2.5)).id.clone();
        graph.update_node_attribute(&msg, AttributeUpdate::Text("Hi".into()));
        graph.add_connection(&NodeId::from("start-1"), &msg);

        let json = graph.serialize().to_json().unwrap();
        let restored = GraphModel::from_snapshot(Snapshot::from_json(&json).unwrap());

        assert_eq!(ids(&restored), ids(&graph));
        assert_eq!(restored.nodes(), graph.nodes());
        assert_eq!(restored.connections(), graph.connections());
    }

    #[test]
    fn test_mistyped_attribute_survives_json_round_trip() {
        let mut graph = GraphModel::default();
        let msg = graph.add_node(NodeKind::Message, (0.0, 0.0)).id.clone();
        let start = NodeId::from("start-1");
        graph.update_node_attribute(&msg, AttributeUpdate::from_key_value("text", serde_json::json!(5)));
        graph.update_node_attribute(
            &start,
            AttributeUpdate::from_key_value("options", serde_json::json!(["a", 1])),
        );

        let json = graph.serialize().to_json().unwrap();
        let restored = GraphModel::from_snapshot(Snapshot::from_json(&json).unwrap());

        assert_eq!(restored.nodes(), graph.nodes());
        let node = restored.node(&msg).unwrap();
        assert_eq!(node.body.text(), Some(""));
        assert_eq!(node.extra["text"], serde_json::json!(5));
    }

    #[test]
    fn test_deserialize_replaces_graph_and_keeps_dangling() {
        let mut graph = GraphModel::default();
        graph.select(&NodeId::from("start-1"));

        let snapshot = Snapshot::from_json(
            r#"{"nodes":[{"id":"m","type":"message","x":0,"y":0,"data":{"label":"Hi"}}],
                "connections":[{"from":"m","to":"missing"}]}"#,
        )
        .unwrap();
        graph.deserialize(snapshot);

        assert_eq!(graph.nodes().len(), 1);
        assert_eq!(graph.connections().len(), 1);
        assert_eq!(graph.dangling_connections(), vec![0]);
        assert!(graph.selected().is_none());
    }

    proptest! {
        #[test]
        fn prop_remove_node_twice_equals_once(count in 1usize..12, victim in 0usize..12) {
            let mut graph = GraphModel::default();
            let mut ids = vec![NodeId::from("start-1")];
            for i in 0..count {
                let kind = NodeKind::ALL[i % NodeKind::ALL.len()];
                ids.push(graph.add_node(kind, (i as f32, 0.0)).id.clone());
            }
            for pair in ids.windows(2) {
                graph.add_connection(&pair[0], &pair[1]);
            }
            let target = ids[victim % ids.len()].clone();

            graph.remove_node(&target);
            let once = graph.clone();
            graph.remove_node(&target);

            prop_assert_eq!(graph, once);
        }

        #[test]
        fn prop_self_loops_never_added(count in 1usize..10, pick in 0usize..10) {
            let mut graph = GraphModel::empty();
            let mut ids = Vec::new();
            for i in 0..count {
                ids.push(graph.add_node(NodeKind::ALL[i % 8], (0.0, 0.0)).id.clone());
            }
            let node = ids[pick % ids.len()].clone();

            prop_assert!(!graph.add_connection(&node, &node));
            prop_assert!(graph.connections().is_empty());
        }
    }
}
