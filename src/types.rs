//! Core data types for the bot dialogue graph.
//!
//! This module defines the node kinds, the kind-specific node bodies, nodes,
//! connections and the attribute updates the property editor issues.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generates a fresh id of the form `<kind>-<uuid>`.
    pub fn fresh(kind: NodeKind) -> Self {
        Self(format!("{}-{}", kind.slug(), Uuid::new_v4().simple()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position on the canvas as (x, y) world coordinates.
pub type Position = (f32, f32);

/// The fixed set of node kinds a dialogue graph can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Entry point of the dialogue
    Start,
    /// Sends a text message
    Message,
    /// Asks a question with a list of answer options
    Question,
    /// Branches the flow
    Condition,
    /// Performs a platform action
    Action,
    /// Calls an external HTTP endpoint
    ApiCall,
    /// Waits a number of seconds
    Delay,
    /// Terminates the dialogue
    End,
}

impl NodeKind {
    /// Every kind, in palette order.
    pub const ALL: [NodeKind; 8] = [
        NodeKind::Start,
        NodeKind::Message,
        NodeKind::Question,
        NodeKind::Condition,
        NodeKind::Action,
        NodeKind::ApiCall,
        NodeKind::Delay,
        NodeKind::End,
    ];

    /// Wire name of the kind, as written in the snapshot `type` field.
    pub fn slug(self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Message => "message",
            NodeKind::Question => "question",
            NodeKind::Condition => "condition",
            NodeKind::Action => "action",
            NodeKind::ApiCall => "api-call",
            NodeKind::Delay => "delay",
            NodeKind::End => "end",
        }
    }

    /// Label given to freshly created nodes of this kind.
    pub fn default_label(self) -> &'static str {
        match self {
            NodeKind::Start => "Старт",
            NodeKind::Message => "Сообщение",
            NodeKind::Question => "Вопрос",
            NodeKind::Condition => "Условие",
            NodeKind::Action => "Действие",
            NodeKind::ApiCall => "API запрос",
            NodeKind::Delay => "Задержка",
            NodeKind::End => "Конец",
        }
    }

    /// Human readable name shown in the palette.
    pub fn display_name(self) -> &'static str {
        match self {
            NodeKind::Start => "Start",
            NodeKind::Message => "Message",
            NodeKind::Question => "Question",
            NodeKind::Condition => "Condition",
            NodeKind::Action => "Action",
            NodeKind::ApiCall => "API call",
            NodeKind::Delay => "Delay",
            NodeKind::End => "End",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for NodeKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| EditorError::UnknownNodeKind(s.to_string()))
    }
}

/// Kind-specific attributes of a node. The variant determines the node's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Start,
    Message {
        /// Body text sent to the user
        text: String,
    },
    Question {
        /// Question text
        text: String,
        /// Ordered answer options
        options: Vec<String>,
    },
    Condition,
    Action,
    ApiCall {
        /// Target URL of the request
        url: String,
    },
    Delay {
        /// Wait time in whole seconds
        seconds: u32,
    },
    End,
}

impl NodeBody {
    /// Creates the default body for a kind.
    pub fn new(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Start => NodeBody::Start,
            NodeKind::Message => NodeBody::Message {
                text: String::new(),
            },
            NodeKind::Question => NodeBody::Question {
                text: String::new(),
                options: Vec::new(),
            },
            NodeKind::Condition => NodeBody::Condition,
            NodeKind::Action => NodeBody::Action,
            NodeKind::ApiCall => NodeBody::ApiCall { url: String::new() },
            NodeKind::Delay => NodeBody::Delay { seconds: 1 },
            NodeKind::End => NodeBody::End,
        }
    }

    /// Returns the kind this body belongs to.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeBody::Start => NodeKind::Start,
            NodeBody::Message { .. } => NodeKind::Message,
            NodeBody::Question { .. } => NodeKind::Question,
            NodeBody::Condition => NodeKind::Condition,
            NodeBody::Action => NodeKind::Action,
            NodeBody::ApiCall { .. } => NodeKind::ApiCall,
            NodeBody::Delay { .. } => NodeKind::Delay,
            NodeBody::End => NodeKind::End,
        }
    }

    /// Body text for message and question nodes.
    pub fn text(&self) -> Option<&str> {
        match self {
            NodeBody::Message { text } | NodeBody::Question { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Answer options for question nodes.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            NodeBody::Question { options, .. } => Some(options),
            _ => None,
        }
    }
}

/// Represents a single step of the bot dialogue.
#[derive(Debug, Clone, PartialEq)]
pub struct BotNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Top-left corner on the canvas in world coordinates
    pub position: Position,
    /// User-displayable label
    pub label: String,
    /// Kind-specific attributes
    pub body: NodeBody,
    /// Attributes not meaningful for this kind, kept for round trips
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl BotNode {
    /// Creates a node with a fresh id, the kind's default label and default body.
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self::with_id(NodeId::fresh(kind), kind, position)
    }

    /// Creates a node with an explicit id.
    pub fn with_id(id: NodeId, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            position,
            label: kind.default_label().to_string(),
            body: NodeBody::new(kind),
            extra: serde_json::Map::new(),
        }
    }

    /// Returns the node's kind.
    pub fn kind(&self) -> NodeKind {
        self.body.kind()
    }

    /// Applies a single attribute update.
    ///
    /// Attributes the kind does not use land in the `extra` bag under their wire key.
    pub fn apply(&mut self, update: AttributeUpdate) {
        match (update, &mut self.body) {
            (AttributeUpdate::Label(label), _) => self.label = label,
            (AttributeUpdate::Text(value), NodeBody::Message { text })
            | (AttributeUpdate::Text(value), NodeBody::Question { text, .. }) => *text = value,
            (AttributeUpdate::Options(value), NodeBody::Question { options, .. }) => {
                *options = value
            }
            (AttributeUpdate::Url(value), NodeBody::ApiCall { url }) => *url = value,
            (AttributeUpdate::Delay(value), NodeBody::Delay { seconds }) => *seconds = value,
            (other, _) => {
                let (key, value) = other.into_key_value();
                self.extra.insert(key, value);
            }
        }
    }
}

/// Represents a directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// ID of the source node
    pub from: NodeId,
    /// ID of the destination node
    pub to: NodeId,
    /// Optional text shown on the edge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Connection {
    /// Creates an unlabeled connection between two nodes.
    pub fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            label: None,
        }
    }
}

/// A single attribute write issued against a node's attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeUpdate {
    Label(String),
    Text(String),
    Options(Vec<String>),
    Url(String),
    Delay(u32),
    /// Any key outside the known attribute set
    Custom {
        key: String,
        value: serde_json::Value,
    },
}

impl AttributeUpdate {
    /// Maps a wire key/value pair onto a typed update.
    ///
    /// Known keys with a value of the wrong JSON type fall through to `Custom`.
    pub fn from_key_value(key: &str, value: serde_json::Value) -> Self {
        use serde_json::Value;

        match (key, value) {
            ("label", Value::String(s)) => AttributeUpdate::Label(s),
            ("text", Value::String(s)) => AttributeUpdate::Text(s),
            ("url", Value::String(s)) => AttributeUpdate::Url(s),
            ("delay", value) if coerce_delay(&value).is_some() => {
                AttributeUpdate::Delay(coerce_delay(&value).unwrap_or(1))
            }
            ("options", Value::Array(items)) if items.iter().all(Value::is_string) => {
                AttributeUpdate::Options(
                    items
                        .into_iter()
                        .filter_map(|item| match item {
                            Value::String(s) => Some(s),
                            _ => None,
                        })
                        .collect(),
                )
            }
            (key, value) => AttributeUpdate::Custom {
                key: key.to_string(),
                value,
            },
        }
    }

    /// Converts the update back into its wire key and JSON value.
    pub fn into_key_value(self) -> (String, serde_json::Value) {
        use serde_json::Value;

        match self {
            AttributeUpdate::Label(s) => ("label".into(), Value::String(s)),
            AttributeUpdate::Text(s) => ("text".into(), Value::String(s)),
            AttributeUpdate::Options(items) => (
                "options".into(),
                Value::Array(items.into_iter().map(Value::String).collect()),
            ),
            AttributeUpdate::Url(s) => ("url".into(), Value::String(s)),
            AttributeUpdate::Delay(seconds) => ("delay".into(), Value::from(seconds)),
            AttributeUpdate::Custom { key, value } => (key, value),
        }
    }
}

/// Reads a delay value that may be stored as a number or a numeric string.
pub(crate) fn coerce_delay(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_creation() {
        let node = BotNode::new(NodeKind::Message, (200.0, 150.0));

        assert_eq!(node.kind(), NodeKind::Message);
        assert_eq!(node.position, (200.0, 150.0));
        assert_eq!(node.label, "Сообщение");
        assert!(node.id.as_str().starts_with("message-"));
        assert!(node.extra.is_empty());
    }

    #[test]
    fn test_default_bodies_match_kind() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeBody::new(kind).kind(), kind);
        }
        assert_eq!(
            NodeBody::new(NodeKind::Delay),
            NodeBody::Delay { seconds: 1 }
        );
    }

    #[test]
    fn test_kind_slug_parsing() {
        assert_eq!("api-call".parse::<NodeKind>().unwrap(), NodeKind::ApiCall);
        assert_eq!("start".parse::<NodeKind>().unwrap(), NodeKind::Start);

        let err = "webhook".parse::<NodeKind>().unwrap_err();
        assert!(matches!(err, EditorError::UnknownNodeKind(ref s) if s == "webhook"));
    }

    #[test]
    fn test_kind_serde_uses_kebab_case() {
        let json = serde_json::to_string(&NodeKind::ApiCall).unwrap();
        assert_eq!(json, "\"api-call\"");
        let kind: NodeKind = serde_json::from_str("\"delay\"").unwrap();
        assert_eq!(kind, NodeKind::Delay);
    }

    #[test]
    fn test_apply_text_to_message() {
        let mut node = BotNode::new(NodeKind::Message, (0.0, 0.0));
        node.apply(AttributeUpdate::Text("Hello".into()));

        assert_eq!(node.body.text(), Some("Hello"));
        assert!(node.extra.is_empty());
    }

    #[test]
    fn test_apply_irrelevant_attribute_goes_to_extra() {
        let mut node = BotNode::new(NodeKind::Start, (0.0, 0.0));
        node.apply(AttributeUpdate::Url("https://example.com".into()));

        assert_eq!(node.body, NodeBody::Start);
        assert_eq!(node.extra["url"], json!("https://example.com"));
    }

    #[test]
    fn test_attribute_from_key_value() {
        assert_eq!(
            AttributeUpdate::from_key_value("text", json!("hi")),
            AttributeUpdate::Text("hi".into())
        );
        assert_eq!(
            AttributeUpdate::from_key_value("delay", json!("5")),
            AttributeUpdate::Delay(5)
        );
        assert_eq!(
            AttributeUpdate::from_key_value("options", json!(["Yes", "No"])),
            AttributeUpdate::Options(vec!["Yes".into(), "No".into()])
        );
        assert_eq!(
            AttributeUpdate::from_key_value("color", json!("red")),
            AttributeUpdate::Custom {
                key: "color".into(),
                value: json!("red")
            }
        );
        // Wrong JSON type for a known key stays untyped
        assert_eq!(
            AttributeUpdate::from_key_value("delay", json!(true)),
            AttributeUpdate::Custom {
                key: "delay".into(),
                value: json!(true)
            }
        );
    }

    #[test]
    fn test_connection_creation() {
        let connection = Connection::new("a".into(), "b".into());

        assert_eq!(connection.from.as_str(), "a");
        assert_eq!(connection.to.as_str(), "b");
        assert!(connection.label.is_none());
        assert_eq!(
            serde_json::to_value(&connection).unwrap(),
            json!({"from": "a", "to": "b"})
        );
    }
}
