//! Pointer-gesture handling for the canvas.
//!
//! [`CanvasInteraction`] turns abstract pointer events (already converted to
//! world coordinates and hit-tested) into [`GraphModel`] mutations. It owns the
//! palette drag payload and the transient connection draft; it never holds
//! node data of its own.

use crate::constants::*;
use crate::error::EditorError;
use crate::graph::GraphModel;
use crate::types::*;
use egui::{pos2, vec2, Pos2, Rect, Vec2};

/// Payload carried by a palette drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragPayload {
    pub kind: NodeKind,
}

impl DragPayload {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind }
    }

    /// Validates an untyped payload string (a node kind slug).
    pub fn parse(raw: &str) -> Result<Self, EditorError> {
        Ok(Self {
            kind: raw.trim().parse()?,
        })
    }
}

/// What lies under the pointer, topmost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Canvas,
    Node(NodeId),
    OutputHandle(NodeId),
    InputHandle(NodeId),
    DeleteButton(NodeId),
}

/// An in-progress connection from `source` to wherever the pointer is.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDraft {
    pub source: NodeId,
    pub pointer: Pos2,
}

/// Observable confirmation of a successful action.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    NodeAdded(NodeKind),
    NodeRemoved,
    Connected,
    ConnectionRemoved,
}

impl Notice {
    /// Short text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Notice::NodeAdded(kind) => format!("{} node added", kind.display_name()),
            Notice::NodeRemoved => "Node deleted".to_string(),
            Notice::Connected => "Nodes connected".to_string(),
            Notice::ConnectionRemoved => "Connection deleted".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    PressedNode {
        id: NodeId,
        origin: Pos2,
        grab_offset: Vec2,
        dragging: bool,
    },
    PressedCanvas {
        origin: Pos2,
        moved: bool,
    },
    Connecting(ConnectionDraft),
}

/// Canvas gesture state machine.
#[derive(Debug, Clone)]
pub struct CanvasInteraction {
    gesture: Gesture,
    palette_drag: Option<DragPayload>,
}

impl Default for CanvasInteraction {
    fn default() -> Self {
        Self {
            gesture: Gesture::Idle,
            palette_drag: None,
        }
    }
}

impl CanvasInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the payload of a palette drag. No node is created yet.
    pub fn begin_palette_drag(&mut self, payload: DragPayload) {
        self.palette_drag = Some(payload);
    }

    /// The palette payload currently being dragged, if any.
    pub fn palette_drag(&self) -> Option<DragPayload> {
        self.palette_drag
    }

    /// Discards the palette payload without creating anything.
    pub fn cancel_palette_drag(&mut self) {
        self.palette_drag = None;
    }

    /// Creates a node from the pending palette payload at `position`.
    pub fn drop_on_canvas(
        &mut self,
        graph: &mut GraphModel,
        position: Position,
    ) -> Option<(NodeId, Notice)> {
        let payload = self.palette_drag.take()?;
        Some(Self::place(graph, payload, position))
    }

    /// Validates a raw payload string and creates a node from it.
    ///
    /// Unknown kinds are rejected and leave the graph untouched.
    pub fn drop_raw(
        &mut self,
        graph: &mut GraphModel,
        raw: &str,
        position: Position,
    ) -> Result<(NodeId, Notice), EditorError> {
        self.palette_drag = None;
        let payload = DragPayload::parse(raw)?;
        Ok(Self::place(graph, payload, position))
    }

    fn place(graph: &mut GraphModel, payload: DragPayload, position: Position) -> (NodeId, Notice) {
        let id = graph.add_node(payload.kind, position).id.clone();
        (id, Notice::NodeAdded(payload.kind))
    }

    /// The connection being drawn, if any.
    pub fn connection_draft(&self) -> Option<&ConnectionDraft> {
        match &self.gesture {
            Gesture::Connecting(draft) => Some(draft),
            _ => None,
        }
    }

    /// Id of the node currently being dragged, if any.
    pub fn dragging_node(&self) -> Option<&NodeId> {
        match &self.gesture {
            Gesture::PressedNode {
                id, dragging: true, ..
            } => Some(id),
            _ => None,
        }
    }

    /// Starts a connection draft from `source`, abandoning any previous draft.
    pub fn begin_connection(&mut self, source: NodeId, pointer: Pos2) {
        self.gesture = Gesture::Connecting(ConnectionDraft { source, pointer });
    }

    /// Primary button pressed at `pos` over `hit`.
    pub fn pointer_down(&mut self, graph: &mut GraphModel, hit: Hit, pos: Pos2) -> Option<Notice> {
        match hit {
            Hit::OutputHandle(id) => {
                self.begin_connection(id, pos);
                None
            }
            Hit::DeleteButton(id) => {
                self.gesture = Gesture::Idle;
                self.delete_node(graph, &id)
            }
            Hit::Node(id) | Hit::InputHandle(id) => {
                let grab_offset = graph
                    .node(&id)
                    .map(|node| pos2(node.position.0, node.position.1) - pos)
                    .unwrap_or(Vec2::ZERO);
                self.gesture = Gesture::PressedNode {
                    id,
                    origin: pos,
                    grab_offset,
                    dragging: false,
                };
                None
            }
            Hit::Canvas => {
                self.gesture = Gesture::PressedCanvas {
                    origin: pos,
                    moved: false,
                };
                None
            }
        }
    }

    /// Pointer moved to `pos` while the primary button is held.
    pub fn pointer_move(&mut self, graph: &mut GraphModel, pos: Pos2) {
        match &mut self.gesture {
            Gesture::Connecting(draft) => draft.pointer = pos,
            Gesture::PressedNode {
                id,
                origin,
                grab_offset,
                dragging,
            } => {
                if !*dragging && (pos - *origin).length() >= CLICK_THRESHOLD {
                    *dragging = true;
                }
                if *dragging {
                    let target = pos + *grab_offset;
                    graph.move_node(id, (target.x, target.y));
                }
            }
            Gesture::PressedCanvas { origin, moved } => {
                if (pos - *origin).length() >= CLICK_THRESHOLD {
                    *moved = true;
                }
            }
            Gesture::Idle => {}
        }
    }

    /// Primary button released at `pos` over `hit`.
    pub fn pointer_up(&mut self, graph: &mut GraphModel, hit: Hit, pos: Pos2) -> Option<Notice> {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Connecting(draft) => match hit {
                Hit::InputHandle(target) if target != draft.source => graph
                    .add_connection(&draft.source, &target)
                    .then_some(Notice::Connected),
                // Released back on the source node: a click, not a connection
                Hit::Node(target)
                | Hit::InputHandle(target)
                | Hit::OutputHandle(target)
                | Hit::DeleteButton(target)
                    if target == draft.source =>
                {
                    graph.select(&target);
                    None
                }
                _ => None,
            },
            Gesture::PressedNode {
                id,
                origin,
                dragging,
                ..
            } => {
                if !dragging && (pos - origin).length() < CLICK_THRESHOLD {
                    graph.select(&id);
                }
                None
            }
            Gesture::PressedCanvas { moved, .. } => {
                if !moved {
                    graph.clear_selection();
                }
                None
            }
            Gesture::Idle => None,
        }
    }

    /// Drops any in-progress gesture without mutating the graph.
    pub fn cancel(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// Selects a node, as a plain click does.
    pub fn click_node(&mut self, graph: &mut GraphModel, id: &NodeId) {
        graph.select(id);
    }

    /// Deletes a node and its connections.
    pub fn delete_node(&mut self, graph: &mut GraphModel, id: &NodeId) -> Option<Notice> {
        if let Gesture::Connecting(draft) = &self.gesture {
            if draft.source == *id {
                self.gesture = Gesture::Idle;
            }
        }
        graph.remove_node(id).then_some(Notice::NodeRemoved)
    }
}

/// Screen-independent geometry of a node, in world units.
#[derive(Debug, Clone, Copy)]
pub struct NodeGeometry {
    pub body: Rect,
    pub input: Pos2,
    pub output: Pos2,
    pub delete: Rect,
}

impl NodeGeometry {
    pub fn of(node: &BotNode) -> Self {
        let body = Rect::from_min_size(
            pos2(node.position.0, node.position.1),
            vec2(NODE_WIDTH, NODE_HEIGHT),
        );
        let delete = Rect::from_min_size(
            pos2(body.max.x - DELETE_BUTTON_SIZE - 4.0, body.min.y + 4.0),
            vec2(DELETE_BUTTON_SIZE, DELETE_BUTTON_SIZE),
        );
        Self {
            body,
            input: pos2(body.min.x, body.center().y),
            output: pos2(body.max.x, body.center().y),
            delete,
        }
    }
}

/// Finds what lies under `pos`, checking the most recently added node first.
pub fn hit_test(graph: &GraphModel, pos: Pos2) -> Hit {
    let handle_reach = HANDLE_RADIUS + HANDLE_HIT_SLACK;

    for node in graph.nodes().iter().rev() {
        let geometry = NodeGeometry::of(node);
        if geometry.delete.contains(pos) {
            return Hit::DeleteButton(node.id.clone());
        }
        if (pos - geometry.output).length() <= handle_reach {
            return Hit::OutputHandle(node.id.clone());
        }
        if (pos - geometry.input).length() <= handle_reach {
            return Hit::InputHandle(node.id.clone());
        }
        if geometry.body.contains(pos) {
            return Hit::Node(node.id.clone());
        }
    }
    Hit::Canvas
}

/// Index of the first connection passing within the click threshold of `pos`.
pub fn connection_at(graph: &GraphModel, pos: Pos2) -> Option<usize> {
    graph
        .connections()
        .iter()
        .enumerate()
        .find_map(|(idx, connection)| {
            let from = graph.node(&connection.from)?;
            let to = graph.node(&connection.to)?;
            let start = NodeGeometry::of(from).output;
            let end = NodeGeometry::of(to).input;
            (point_to_segment_distance(pos, start, end) < CLICK_THRESHOLD).then_some(idx)
        })
}

/// Distance from a point to a line segment, using the clamped projection.
pub fn point_to_segment_distance(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let line = end - start;
    let offset = point - start;
    let len_sq = line.length_sq();

    if len_sq < 0.0001 {
        return offset.length();
    }

    let t = (offset.dot(line) / len_sq).clamp(0.0, 1.0);
    (point - (start + line * t)).length()
}
