//! Per-kind property editing for the selected node.
//!
//! Every edit is written straight through to the [`GraphModel`]; the editor
//! keeps no copy of node attributes. The one exception is the raw text of the
//! delay field, held so that a half-typed number is not replaced mid-edit.

use crate::graph::GraphModel;
use crate::types::*;
use std::collections::HashMap;

/// An editable field shown in the properties panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Label,
    Text,
    Options,
    Url,
    Delay,
}

/// Fields shown for a node kind, in display order.
pub fn fields_for(kind: NodeKind) -> &'static [Field] {
    match kind {
        NodeKind::Start | NodeKind::End | NodeKind::Condition | NodeKind::Action => &[Field::Label],
        NodeKind::Message => &[Field::Label, Field::Text],
        NodeKind::Question => &[Field::Label, Field::Text, Field::Options],
        NodeKind::ApiCall => &[Field::Label, Field::Url],
        NodeKind::Delay => &[Field::Label, Field::Delay],
    }
}

/// Parses a delay in whole seconds, falling back to 1.
pub fn parse_delay(input: &str) -> u32 {
    input.trim().parse().unwrap_or(1)
}

/// Write-through editor bound to the graph's current selection.
#[derive(Debug, Default, Clone)]
pub struct PropertyEditor {
    delay_inputs: HashMap<NodeId, String>,
}

impl PropertyEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node whose properties are shown, if any.
    pub fn selected<'g>(&self, graph: &'g GraphModel) -> Option<&'g BotNode> {
        graph.selected_node()
    }

    fn selected_id(graph: &GraphModel) -> Option<NodeId> {
        graph.selected().cloned()
    }

    fn write(graph: &mut GraphModel, update: AttributeUpdate) -> bool {
        match Self::selected_id(graph) {
            Some(id) => graph.update_node_attribute(&id, update),
            None => false,
        }
    }

    pub fn set_label(&mut self, graph: &mut GraphModel, label: &str) -> bool {
        Self::write(graph, AttributeUpdate::Label(label.to_string()))
    }

    pub fn set_text(&mut self, graph: &mut GraphModel, text: &str) -> bool {
        Self::write(graph, AttributeUpdate::Text(text.to_string()))
    }

    pub fn set_url(&mut self, graph: &mut GraphModel, url: &str) -> bool {
        Self::write(graph, AttributeUpdate::Url(url.to_string()))
    }

    /// Text currently in the delay field for the selected node.
    pub fn delay_input(&self, graph: &GraphModel) -> String {
        let Some(node) = graph.selected_node() else {
            return String::new();
        };
        if let Some(raw) = self.delay_inputs.get(&node.id) {
            return raw.clone();
        }
        match node.body {
            NodeBody::Delay { seconds } => seconds.to_string(),
            _ => String::new(),
        }
    }

    /// Stores the raw input and writes the parsed delay to the node.
    pub fn set_delay_input(&mut self, graph: &mut GraphModel, input: &str) -> bool {
        let Some(id) = Self::selected_id(graph) else {
            return false;
        };
        self.delay_inputs.insert(id.clone(), input.to_string());
        graph.update_node_attribute(&id, AttributeUpdate::Delay(parse_delay(input)))
    }

    /// Drops the raw delay text so the field shows the stored value again.
    pub fn commit_delay_input(&mut self, graph: &GraphModel) {
        if let Some(id) = graph.selected() {
            self.delay_inputs.remove(id);
        }
    }

    fn with_options(
        graph: &mut GraphModel,
        edit: impl FnOnce(&mut Vec<String>) -> bool,
    ) -> bool {
        let Some(mut options) = graph
            .selected_node()
            .and_then(|node| node.body.options())
            .map(<[String]>::to_vec)
        else {
            return false;
        };
        edit(&mut options) && Self::write(graph, AttributeUpdate::Options(options))
    }

    /// Appends an empty option to the selected question node.
    pub fn add_option(&mut self, graph: &mut GraphModel) -> bool {
        Self::with_options(graph, |options| {
            options.push(String::new());
            true
        })
    }

    /// Replaces the option at `index`.
    pub fn set_option(&mut self, graph: &mut GraphModel, index: usize, value: &str) -> bool {
        Self::with_options(graph, |options| match options.get_mut(index) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        })
    }

    /// Removes the option at `index`; later options shift down.
    pub fn remove_option(&mut self, graph: &mut GraphModel, index: usize) -> bool {
        Self::with_options(graph, |options| {
            if index < options.len() {
                options.remove(index);
                true
            } else {
                false
            }
        })
    }

    /// Deletes the selected node, leaving the panel empty.
    pub fn delete_selected(&mut self, graph: &mut GraphModel) -> bool {
        let Some(id) = Self::selected_id(graph) else {
            return false;
        };
        self.delay_inputs.remove(&id);
        graph.remove_node(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(kind: NodeKind) -> (GraphModel, NodeId) {
        let mut graph = GraphModel::default();
        let id = graph.add_node(kind, (0.0, 0.0)).id.clone();
        graph.select(&id);
        (graph, id)
    }

    #[test]
    fn test_fields_per_kind() {
        assert_eq!(fields_for(NodeKind::Start), &[Field::Label]);
        assert_eq!(fields_for(NodeKind::End), &[Field::Label]);
        assert_eq!(fields_for(NodeKind::Message), &[Field::Label, Field::Text]);
        assert!(fields_for(NodeKind::Question).contains(&Field::Options));
        assert!(fields_for(NodeKind::ApiCall).contains(&Field::Url));
        assert!(fields_for(NodeKind::Delay).contains(&Field::Delay));
        assert_eq!(fields_for(NodeKind::Condition), &[Field::Label]);
    }

    #[test]
    fn test_message_text_written_through() {
        let (mut graph, id) = graph_with(NodeKind::Message);
        let mut editor = PropertyEditor::new();

        assert!(editor.set_text(&mut graph, "Hello"));

        let node = graph.node(&id).unwrap();
        assert_eq!(node.body.text(), Some("Hello"));
        assert_eq!(editor.selected(&graph).unwrap().id, id);
        assert_eq!(graph.serialize().nodes[1].data.text, Some(serde_json::json!("Hello")));
    }

    #[test]
    fn test_edits_without_selection_are_ignored() {
        let mut graph = GraphModel::default();
        let mut editor = PropertyEditor::new();

        assert!(!editor.set_label(&mut graph, "x"));
        assert!(!editor.add_option(&mut graph));
        assert!(!editor.delete_selected(&mut graph));
        assert_eq!(graph, GraphModel::default());
    }

    #[test]
    fn test_option_list_editing() {
        let (mut graph, id) = graph_with(NodeKind::Question);
        let mut editor = PropertyEditor::new();

        editor.add_option(&mut graph);
        editor.add_option(&mut graph);
        editor.set_option(&mut graph, 0, "Yes");
        editor.set_option(&mut graph, 1, "No");
        assert_eq!(
            graph.node(&id).unwrap().body.options().unwrap(),
            &["Yes".to_string(), "No".to_string()]
        );

        assert!(editor.remove_option(&mut graph, 0));
        assert_eq!(graph.node(&id).unwrap().body.options().unwrap(), &["No".to_string()]);

        assert!(!editor.remove_option(&mut graph, 5));
        assert!(!editor.set_option(&mut graph, 5, "x"));
    }

    #[test]
    fn test_options_unavailable_for_message() {
        let (mut graph, id) = graph_with(NodeKind::Message);
        let mut editor = PropertyEditor::new();

        assert!(!editor.add_option(&mut graph));
        assert!(graph.node(&id).unwrap().extra.is_empty());
    }

    #[test]
    fn test_delay_parsing_defaults_to_one() {
        assert_eq!(parse_delay("5"), 5);
        assert_eq!(parse_delay(" 12 "), 12);
        assert_eq!(parse_delay("abc"), 1);
        assert_eq!(parse_delay(""), 1);
        assert_eq!(parse_delay("-3"), 1);
    }

    #[test]
    fn test_delay_input_keeps_raw_text() {
        let (mut graph, id) = graph_with(NodeKind::Delay);
        let mut editor = PropertyEditor::new();
        assert_eq!(editor.delay_input(&graph), "1");

        editor.set_delay_input(&mut graph, "");
        assert_eq!(editor.delay_input(&graph), "");
        assert_eq!(graph.node(&id).unwrap().body, NodeBody::Delay { seconds: 1 });

        editor.set_delay_input(&mut graph, "30");
        assert_eq!(graph.node(&id).unwrap().body, NodeBody::Delay { seconds: 30 });

        editor.commit_delay_input(&graph);
        assert_eq!(editor.delay_input(&graph), "30");
    }

    #[test]
    fn test_delete_selected_clears_panel() {
        let (mut graph, id) = graph_with(NodeKind::ApiCall);
        let mut editor = PropertyEditor::new();
        editor.set_url(&mut graph, "https://example.com");
        graph.add_connection(&NodeId::from("start-1"), &id);

        assert!(editor.delete_selected(&mut graph));

        assert!(editor.selected(&graph).is_none());
        assert!(graph.node(&id).is_none());
        assert!(graph.connections().is_empty());
    }
}
