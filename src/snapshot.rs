//! Serialized form of a graph.
//!
//! The snapshot is the only durable contract with the rest of the platform:
//!
//! ```json
//! { "nodes": [{ "id", "type", "x", "y", "data": { "label", "text", "options", "url", "delay" } }],
//!   "connections": [{ "from", "to", "label" }],
//!   "created": "2024-01-01T00:00:00Z" }
//! ```
//!
//! The typed [`NodeBody`] is flattened into the loose `data` bag here and
//! rebuilt when reading. Keys the kind does not use survive in [`BotNode::extra`].

use crate::types::{coerce_delay, BotNode, Connection, NodeBody, NodeId, NodeKind};
use serde::{Deserialize, Serialize};

/// The full serialized graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    /// Export timestamp, only present in downloaded files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// One node as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub data: DataBag,
}

/// The loosely typed attribute bag of a node record.
///
/// Values are kept as raw JSON so a key of the wrong type never fails the
/// whole document; it is parked in the node's extra bag instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataBag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Snapshot {
    /// Serialize the snapshot to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize the snapshot to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a snapshot from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<&BotNode> for NodeRecord {
    fn from(node: &BotNode) -> Self {
        let mut data = DataBag {
            label: Some(node.label.clone()),
            extra: node.extra.clone(),
            ..DataBag::default()
        };

        match &node.body {
            NodeBody::Message { text } => {
                data.text = non_empty(text);
            }
            NodeBody::Question { text, options } => {
                data.text = non_empty(text);
                if !options.is_empty() {
                    data.options = Some(serde_json::Value::from(options.clone()));
                }
            }
            NodeBody::ApiCall { url } => {
                data.url = non_empty(url);
            }
            NodeBody::Delay { seconds } => {
                data.delay = Some(serde_json::Value::from(*seconds));
            }
            NodeBody::Start | NodeBody::Condition | NodeBody::Action | NodeBody::End => {}
        }

        // Typed fields win over stale copies in the extra bag
        let typed = [
            ("label", data.label.is_some()),
            ("text", data.text.is_some()),
            ("options", data.options.is_some()),
            ("url", data.url.is_some()),
            ("delay", data.delay.is_some()),
        ];
        for (key, present) in typed {
            if present {
                data.extra.remove(key);
            }
        }

        NodeRecord {
            id: node.id.clone(),
            kind: node.kind(),
            x: node.position.0,
            y: node.position.1,
            data,
        }
    }
}

impl From<NodeRecord> for BotNode {
    fn from(record: NodeRecord) -> Self {
        let DataBag {
            label,
            mut text,
            mut options,
            mut url,
            mut delay,
            mut extra,
        } = record.data;

        let mut stash = |key: &str, value: Option<serde_json::Value>| {
            if let Some(value) = value {
                extra.insert(key.to_string(), value);
            }
        };

        let body = match record.kind {
            NodeKind::Start => NodeBody::Start,
            NodeKind::Condition => NodeBody::Condition,
            NodeKind::Action => NodeBody::Action,
            NodeKind::End => NodeBody::End,
            NodeKind::Message => NodeBody::Message {
                text: take_string(&mut text).unwrap_or_default(),
            },
            NodeKind::Question => NodeBody::Question {
                text: take_string(&mut text).unwrap_or_default(),
                options: take_strings(&mut options).unwrap_or_default(),
            },
            NodeKind::ApiCall => NodeBody::ApiCall {
                url: take_string(&mut url).unwrap_or_default(),
            },
            NodeKind::Delay => NodeBody::Delay {
                seconds: delay.take().as_ref().and_then(coerce_delay).unwrap_or(1),
            },
        };

        stash("text", text);
        stash("options", options);
        stash("url", url);
        stash("delay", delay);

        BotNode {
            id: record.id,
            position: (record.x, record.y),
            label: label.unwrap_or_else(|| record.kind.default_label().to_string()),
            body,
            extra,
        }
    }
}

fn non_empty(value: &str) -> Option<serde_json::Value> {
    (!value.is_empty()).then(|| serde_json::Value::String(value.to_string()))
}

/// Takes the slot's value if it is a string, leaving anything else in place.
fn take_string(slot: &mut Option<serde_json::Value>) -> Option<String> {
    match slot.take() {
        Some(serde_json::Value::String(s)) => Some(s),
        other => {
            *slot = other;
            None
        }
    }
}

/// Takes the slot's value if it is an array of strings, leaving anything else in place.
fn take_strings(slot: &mut Option<serde_json::Value>) -> Option<Vec<String>> {
    match slot.take() {
        Some(serde_json::Value::Array(items)) if items.iter().all(|item| item.is_string()) => {
            Some(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        serde_json::Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )
        }
        other => {
            *slot = other;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_record_has_only_label() {
        let node = BotNode::new(NodeKind::Message, (200.0, 150.0));
        let record = NodeRecord::from(&node);
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["type"], json!("message"));
        assert_eq!(value["x"], json!(200.0));
        assert_eq!(value["y"], json!(150.0));
        assert_eq!(value["data"], json!({"label": "Сообщение"}));
    }

    #[test]
    fn test_field_order_is_stable() {
        let node = BotNode::with_id("q-1".into(), NodeKind::Question, (1.0, 2.0));
        let snapshot = Snapshot {
            nodes: vec![NodeRecord::from(&node)],
            connections: vec![],
            created: None,
        };

        let json = snapshot.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"nodes":[{"id":"q-1","type":"question","x":1.0,"y":2.0,"data":{"label":"Вопрос"}}],"connections":[]}"#
        );
    }

    #[test]
    fn test_delay_accepts_strings_and_falls_back() {
        let parse = |data: serde_json::Value| -> BotNode {
            let record: NodeRecord = serde_json::from_value(json!({
                "id": "d", "type": "delay", "x": 0, "y": 0, "data": data
            }))
            .unwrap();
            record.into()
        };

        assert_eq!(parse(json!({"delay": 5})).body, NodeBody::Delay { seconds: 5 });
        assert_eq!(parse(json!({"delay": "7"})).body, NodeBody::Delay { seconds: 7 });
        assert_eq!(parse(json!({"delay": "soon"})).body, NodeBody::Delay { seconds: 1 });
        assert_eq!(parse(json!({})).body, NodeBody::Delay { seconds: 1 });
    }

    #[test]
    fn test_irrelevant_keys_survive_round_trip() {
        let record: NodeRecord = serde_json::from_value(json!({
            "id": "s", "type": "start", "x": 10, "y": 20,
            "data": {"label": "Go", "text": "ignored", "color": "green"}
        }))
        .unwrap();

        let node = BotNode::from(record.clone());
        assert_eq!(node.body, NodeBody::Start);
        assert_eq!(node.label, "Go");
        assert_eq!(node.extra["text"], json!("ignored"));
        assert_eq!(node.extra["color"], json!("green"));

        assert_eq!(
            serde_json::to_value(NodeRecord::from(&node)).unwrap(),
            serde_json::to_value(&record).unwrap()
        );
    }

    #[test]
    fn test_mistyped_keys_survive_round_trip() {
        let json = r#"{"nodes":[
            {"id":"s","type":"start","x":0,"y":0,"data":{"label":"Go","text":5}},
            {"id":"q","type":"question","x":0,"y":0,"data":{"text":"Pick","options":["a",1]}},
            {"id":"m","type":"message","x":0,"y":0,"data":{"text":{"ru":"Привет"}}}
        ],"connections":[]}"#;

        let snapshot = Snapshot::from_json(json).unwrap();
        let nodes: Vec<BotNode> = snapshot.nodes.iter().cloned().map(BotNode::from).collect();

        assert_eq!(nodes[0].extra["text"], json!(5));
        assert_eq!(
            nodes[1].body,
            NodeBody::Question {
                text: "Pick".into(),
                options: vec![],
            }
        );
        assert_eq!(nodes[1].extra["options"], json!(["a", 1]));
        assert_eq!(nodes[2].body.text(), Some(""));
        assert_eq!(nodes[2].extra["text"], json!({"ru": "Привет"}));

        let rewritten = Snapshot {
            nodes: nodes.iter().map(NodeRecord::from).collect(),
            connections: vec![],
            created: None,
        };
        let reread = Snapshot::from_json(&rewritten.to_json().unwrap()).unwrap();
        assert_eq!(reread, rewritten);
        assert_eq!(reread.nodes[0].data.text, Some(json!(5)));
        assert_eq!(reread.nodes[1].data.options, Some(json!(["a", 1])));
    }

    #[test]
    fn test_missing_label_uses_default() {
        let record: NodeRecord = serde_json::from_value(json!({
            "id": "e", "type": "end", "x": 0, "y": 0
        }))
        .unwrap();

        assert_eq!(BotNode::from(record).label, "Конец");
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = Snapshot::from_json(
            r#"{"nodes":[{"id":"w","type":"webhook","x":0,"y":0,"data":{}}],"connections":[]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_created_is_optional() {
        let snapshot = Snapshot::from_json(r#"{"nodes":[],"connections":[]}"#).unwrap();
        assert!(snapshot.created.is_none());

        let snapshot = Snapshot::from_json(
            r#"{"nodes":[],"connections":[{"from":"a","to":"b","label":"yes"}],"created":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.created.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(snapshot.connections[0].label.as_deref(), Some("yes"));
    }
}
