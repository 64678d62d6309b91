//! Knowledge board: a pannable, zoomable canvas of draggable nodes.

use crate::camera::CanvasTransform;
use crate::config::InteractionConfig;
use crate::connections::{ConnectionRenderer, EdgePolicy, Segment};
use crate::drag::DraggableNode;
use crate::events::{EventSink, InteractionEvent, ZoomSource};
use crate::geometry::is_finite_point;
use crate::node::{CanvasNode, NodeKind};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// Where newly added nodes are placed.
pub const NEW_NODE_POSITION: Point = Point::new(250.0, 250.0);

/// Board errors.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("Node is already being dragged: {0}")]
    AlreadyDragging(String),
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),
    #[error("Node cannot connect to itself: {0}")]
    SelfConnection(String),
    #[error("Invalid position for node {0}")]
    InvalidPosition(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Serialized form of a board.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardDocument {
    pub nodes: Vec<CanvasNode>,
}

/// Board state for one screen.
///
/// Committed node positions are the source of truth. A drag only writes back
/// into the node list when it ends.
#[derive(Debug, Clone)]
pub struct KnowledgeBoard {
    config: InteractionConfig,
    nodes: Vec<CanvasNode>,
    /// Open drag sessions by node id.
    drags: HashMap<String, DraggableNode>,
    disabled: HashSet<String>,
    camera: CanvasTransform,
    renderer: ConnectionRenderer,
}

impl KnowledgeBoard {
    /// Create an empty board.
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            camera: CanvasTransform::new(&config),
            renderer: ConnectionRenderer::new(&config),
            nodes: Vec::new(),
            drags: HashMap::new(),
            disabled: HashSet::new(),
            config,
        }
    }

    /// Create a board with initial nodes. Ids must be unique.
    pub fn with_nodes(config: InteractionConfig, nodes: Vec<CanvasNode>) -> BoardResult<Self> {
        let mut board = Self::new(config);
        for node in nodes {
            board.insert_node(node)?;
        }
        Ok(board)
    }

    /// The starter map shown on a fresh project.
    pub fn sample(config: InteractionConfig) -> Self {
        let nodes = vec![
            CanvasNode::new("1", NodeKind::Concept, "Neuroplasticity", Point::new(100.0, 150.0))
                .with_connections(["2", "4"]),
            CanvasNode::new("2", NodeKind::Note, "Learning Mechanisms", Point::new(300.0, 120.0))
                .with_content("Notes on different learning mechanisms...")
                .with_connections(["1", "3"]),
            CanvasNode::new("3", NodeKind::Document, "Research Paper", Point::new(450.0, 250.0))
                .with_content("Academic paper on cognitive development...")
                .with_connections(["2"]),
            CanvasNode::new(
                "4",
                NodeKind::Flashcard,
                "Memory Models Deck",
                Point::new(200.0, 350.0),
            )
            .with_content("24 cards on memory models")
            .with_connections(["1"]),
        ];
        let mut board = Self::new(config);
        board.nodes = nodes;
        board
    }

    /// Set how mutual edges are drawn.
    pub fn with_edge_policy(mut self, policy: EdgePolicy) -> Self {
        self.renderer = self.renderer.with_policy(policy);
        self
    }

    /// The configuration this board was built with.
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// All nodes, with committed positions.
    pub fn nodes(&self) -> &[CanvasNode] {
        &self.nodes
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&CanvasNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the board has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current pan and zoom.
    pub fn camera(&self) -> &CanvasTransform {
        &self.camera
    }

    /// Direct camera access for panning. Zoom changes made through this
    /// handle do not emit events; prefer the board's zoom methods.
    pub fn camera_mut(&mut self) -> &mut CanvasTransform {
        &mut self.camera
    }

    fn node_mut(&mut self, id: &str) -> BoardResult<&mut CanvasNode> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| BoardError::UnknownNode(id.to_string()))
    }

    /// Add a node with a caller-chosen id.
    pub fn insert_node(&mut self, node: CanvasNode) -> BoardResult<()> {
        if self.node(&node.id).is_some() {
            return Err(BoardError::DuplicateNode(node.id));
        }
        if !node.has_valid_position() {
            return Err(BoardError::InvalidPosition(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Add a fresh node of `kind` at the default spot. Returns its id.
    pub fn add_node(&mut self, kind: NodeKind, sink: &mut dyn EventSink) -> String {
        let id = Uuid::new_v4().to_string();
        let mut node = CanvasNode::new(id.clone(), kind, format!("New {kind}"), NEW_NODE_POSITION);
        if kind.has_content() {
            node = node.with_content(format!("Content for new {kind}..."));
        }
        self.nodes.push(node);
        log::debug!("added {kind} node {id}");
        sink.emit(InteractionEvent::NodeAdded {
            node_id: id.clone(),
        });
        id
    }

    /// Remove a node, any open drag on it, and every edge pointing at it.
    pub fn remove_node(&mut self, id: &str) -> BoardResult<CanvasNode> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| BoardError::UnknownNode(id.to_string()))?;
        let removed = self.nodes.remove(index);
        self.drags.remove(id);
        self.disabled.remove(id);
        for node in &mut self.nodes {
            node.connections.retain(|c| c != id);
        }
        Ok(removed)
    }

    /// Add an edge `from -> to`. Returns false if it already existed.
    pub fn connect(&mut self, from: &str, to: &str) -> BoardResult<bool> {
        if from == to {
            return Err(BoardError::SelfConnection(from.to_string()));
        }
        if self.node(to).is_none() {
            return Err(BoardError::UnknownNode(to.to_string()));
        }
        let node = self.node_mut(from)?;
        if node.is_connected_to(to) {
            return Ok(false);
        }
        node.connections.push(to.to_string());
        Ok(true)
    }

    /// Remove the edge between two nodes in both directions.
    /// Returns whether anything was removed.
    pub fn disconnect(&mut self, a: &str, b: &str) -> BoardResult<bool> {
        if self.node(a).is_none() {
            return Err(BoardError::UnknownNode(a.to_string()));
        }
        if self.node(b).is_none() {
            return Err(BoardError::UnknownNode(b.to_string()));
        }
        let mut removed = false;
        for node in &mut self.nodes {
            let other = if node.id == a {
                b
            } else if node.id == b {
                a
            } else {
                continue;
            };
            let before = node.connections.len();
            node.connections.retain(|c| c != other);
            removed |= node.connections.len() != before;
        }
        Ok(removed)
    }

    /// Move a node from outside a gesture. Returns false while it is being
    /// dragged.
    pub fn set_position(&mut self, id: &str, position: Point) -> BoardResult<bool> {
        if !is_finite_point(position) {
            return Err(BoardError::InvalidPosition(id.to_string()));
        }
        if self.drags.contains_key(id) {
            log::debug!("ignoring reposition of {id} during drag");
            return Ok(false);
        }
        self.node_mut(id)?.position = position;
        Ok(true)
    }

    /// Stop a node from being dragged. Cancels an open drag on it.
    pub fn set_node_disabled(&mut self, id: &str, disabled: bool) -> BoardResult<()> {
        if self.node(id).is_none() {
            return Err(BoardError::UnknownNode(id.to_string()));
        }
        if disabled {
            self.disabled.insert(id.to_string());
            self.drags.remove(id);
        } else {
            self.disabled.remove(id);
        }
        Ok(())
    }

    // --- Dragging ---

    /// Start dragging a node. Returns false if the node is disabled.
    pub fn begin_drag(&mut self, id: &str, sink: &mut dyn EventSink) -> BoardResult<bool> {
        if self.drags.contains_key(id) {
            log::warn!("rejected second drag on {id}");
            return Err(BoardError::AlreadyDragging(id.to_string()));
        }
        let position = self
            .node(id)
            .map(|n| n.position)
            .ok_or_else(|| BoardError::UnknownNode(id.to_string()))?;
        let mut handle = DraggableNode::new(id, position, &self.config);
        handle.set_disabled(self.disabled.contains(id));
        if !handle.start_drag(sink) {
            return Ok(false);
        }
        self.drags.insert(id.to_string(), handle);
        Ok(true)
    }

    /// Update a drag with total finger travel `(dx, dy)` in canvas units.
    /// Returns the live position (the committed one if not dragging).
    pub fn update_drag(&mut self, id: &str, dx: f64, dy: f64) -> BoardResult<Point> {
        match self.drags.get_mut(id) {
            Some(handle) => Ok(handle.update_drag(dx, dy)),
            None => self
                .node(id)
                .map(|n| n.position)
                .ok_or_else(|| BoardError::UnknownNode(id.to_string())),
        }
    }

    /// Finish a drag and commit the position. A no-op if not dragging.
    pub fn end_drag(&mut self, id: &str, sink: &mut dyn EventSink) -> BoardResult<Point> {
        let Some(mut handle) = self.drags.remove(id) else {
            return self
                .node(id)
                .map(|n| n.position)
                .ok_or_else(|| BoardError::UnknownNode(id.to_string()));
        };
        let committed = handle.end_drag(sink);
        // The node may have been removed mid-drag by another path.
        self.node_mut(id)?.position = committed;
        Ok(committed)
    }

    /// Abandon a drag without committing.
    pub fn cancel_drag(&mut self, id: &str) {
        if let Some(mut handle) = self.drags.remove(id) {
            handle.cancel_drag();
        }
    }

    /// Whether `id` has an open drag.
    pub fn is_dragging(&self, id: &str) -> bool {
        self.drags.contains_key(id)
    }

    /// Ids with an open drag.
    pub fn dragging(&self) -> impl Iterator<Item = &str> {
        self.drags.keys().map(String::as_str)
    }

    /// Where to draw a node right now: the live drag position if dragging.
    pub fn display_position(&self, id: &str) -> Option<Point> {
        if let Some(handle) = self.drags.get(id) {
            return Some(handle.display_position());
        }
        self.node(id).map(|n| n.position)
    }

    // --- Connections ---

    /// Edge segments from committed positions.
    pub fn segments(&self) -> Vec<Segment> {
        self.renderer.segments(&self.nodes)
    }

    /// Edge segments following nodes that are being dragged.
    pub fn live_segments(&self) -> Vec<Segment> {
        self.renderer.segments_with(&self.nodes, |n| self.live_position(n))
    }

    /// Segments touching one node, following live drags.
    pub fn segments_for_node(&self, id: &str) -> Vec<Segment> {
        self.renderer.segments_for_node(&self.nodes, id, |n| self.live_position(n))
    }

    fn live_position(&self, node: &CanvasNode) -> Point {
        self.drags
            .get(&node.id)
            .map(DraggableNode::display_position)
            .unwrap_or(node.position)
    }

    // --- Viewport ---

    fn emit_zoom(
        &self,
        changed: Option<f64>,
        source: ZoomSource,
        sink: &mut dyn EventSink,
    ) -> Option<f64> {
        if let Some(zoom) = changed {
            log::debug!("zoom {:?} -> {}", source, zoom);
            sink.emit(InteractionEvent::ZoomChanged { zoom, source });
        }
        changed
    }

    /// Zoom-in button. Emits only when the zoom actually moved.
    pub fn zoom_in(&mut self, sink: &mut dyn EventSink) -> Option<f64> {
        let changed = self.camera.zoom_in();
        self.emit_zoom(changed, ZoomSource::Step, sink)
    }

    /// Zoom-out button.
    pub fn zoom_out(&mut self, sink: &mut dyn EventSink) -> Option<f64> {
        let changed = self.camera.zoom_out();
        self.emit_zoom(changed, ZoomSource::Step, sink)
    }

    /// Start a pinch from the current zoom.
    pub fn begin_pinch(&mut self) {
        self.camera.begin_pinch();
    }

    /// Apply the cumulative pinch `scale`. Emits when the zoom changes.
    pub fn update_pinch(&mut self, scale: f64, sink: &mut dyn EventSink) -> Option<f64> {
        let changed = self.camera.update_pinch(scale);
        self.emit_zoom(changed, ZoomSource::Pinch, sink)
    }

    /// Finish the pinch and return the final zoom.
    pub fn end_pinch(&mut self) -> f64 {
        self.camera.end_pinch()
    }

    /// Multiply zoom around a screen point (wheel or focal pinch).
    pub fn zoom_at(
        &mut self,
        screen_point: Point,
        factor: f64,
        sink: &mut dyn EventSink,
    ) -> Option<f64> {
        let changed = self.camera.zoom_at(screen_point, factor);
        self.emit_zoom(changed, ZoomSource::Tap, sink)
    }

    /// Double tap: toggle between 1x and 2x.
    pub fn toggle_zoom(&mut self, sink: &mut dyn EventSink) -> Option<f64> {
        let changed = self.camera.toggle_zoom();
        self.emit_zoom(changed, ZoomSource::Tap, sink)
    }

    /// Back to the initial zoom with no pan.
    pub fn reset_view(&mut self, sink: &mut dyn EventSink) -> Option<f64> {
        let before = self.camera.zoom();
        self.camera.reset();
        let after = self.camera.zoom();
        let changed = (after != before).then_some(after);
        self.emit_zoom(changed, ZoomSource::Reset, sink)
    }

    /// Start panning the canvas.
    pub fn begin_pan(&mut self) {
        self.camera.begin_pan();
    }

    /// Pan to the start offset plus total finger travel.
    pub fn update_pan(&mut self, translation: Vec2) {
        self.camera.update_pan(translation);
    }

    /// Finish panning the canvas.
    pub fn end_pan(&mut self) {
        self.camera.end_pan();
    }

    /// Screen teardown: drop every open gesture without committing.
    pub fn unmount(&mut self) {
        let open = self.drags.len();
        for (_, mut handle) in self.drags.drain() {
            handle.cancel_drag();
        }
        self.camera.end_pan();
        self.camera.end_pinch();
        if open > 0 {
            log::debug!("board unmounted with {open} open drags");
        }
    }

    // --- Persistence ---

    /// Snapshot the node list.
    pub fn to_document(&self) -> BoardDocument {
        BoardDocument {
            nodes: self.nodes.clone(),
        }
    }

    /// Serialize the node list to pretty JSON.
    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Load a board. Duplicate ids and non-finite positions are rejected.
    pub fn from_json(config: InteractionConfig, json: &str) -> BoardResult<Self> {
        let document: BoardDocument = serde_json::from_str(json)?;
        Self::with_nodes(config, document.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;

    fn board() -> KnowledgeBoard {
        KnowledgeBoard::sample(InteractionConfig::default())
    }

    #[test]
    fn test_drag_commits_once() {
        let mut board = board();
        let mut events = EventQueue::new();
        assert!(board.begin_drag("2", &mut events).unwrap());
        board.update_drag("2", 10.0, 10.0).unwrap();
        let live = board.update_drag("2", 45.0, -20.0).unwrap();
        assert_eq!(live, Point::new(345.0, 100.0));
        // Committed position untouched until the drag ends.
        assert_eq!(board.node("2").unwrap().position, Point::new(300.0, 120.0));
        assert_eq!(board.display_position("2"), Some(Point::new(345.0, 100.0)));

        let committed = board.end_drag("2", &mut events).unwrap();
        assert_eq!(committed, Point::new(345.0, 100.0));
        assert_eq!(board.node("2").unwrap().position, committed);
        let commits = events
            .events()
            .iter()
            .filter(|e| matches!(e, InteractionEvent::PositionCommitted { .. }))
            .count();
        assert_eq!(commits, 1);

        // Ending again is a no-op.
        board.end_drag("2", &mut events).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_snap_on_release() {
        let config = InteractionConfig::default().with_grid(20.0, true);
        let mut board = KnowledgeBoard::sample(config);
        let mut events = EventQueue::new();
        board.begin_drag("1", &mut events).unwrap();
        board.update_drag("1", 13.0, 27.0).unwrap();
        let committed = board.end_drag("1", &mut events).unwrap();
        assert_eq!(committed, Point::new(120.0, 180.0));
    }

    #[test]
    fn test_second_drag_rejected() {
        let mut board = board();
        let mut events = EventQueue::new();
        board.begin_drag("1", &mut events).unwrap();
        assert!(matches!(
            board.begin_drag("1", &mut events),
            Err(BoardError::AlreadyDragging(_))
        ));
        // Independent nodes drag concurrently.
        assert!(board.begin_drag("3", &mut events).unwrap());
        assert_eq!(board.dragging().count(), 2);
    }

    #[test]
    fn test_unknown_and_disabled() {
        let mut board = board();
        let mut events = EventQueue::new();
        assert!(matches!(
            board.begin_drag("nope", &mut events),
            Err(BoardError::UnknownNode(_))
        ));
        board.set_node_disabled("4", true).unwrap();
        assert!(!board.begin_drag("4", &mut events).unwrap());
        assert!(!board.is_dragging("4"));
        assert!(events.is_empty());
    }

    #[test]
    fn test_live_segments_follow_drag() {
        let mut board = board();
        let mut events = EventQueue::new();
        assert_eq!(board.segments().len(), 3);
        assert_eq!(board.segments_for_node("3").len(), 1);

        board.begin_drag("3", &mut events).unwrap();
        board.update_drag("3", -150.0, -130.0).unwrap();
        let live = board.segments_for_node("3");
        assert_eq!(live.len(), 1);
        // 3 now sits exactly on top of 2.
        assert!((live[0].length - 0.0).abs() < 1e-9);

        let committed = board.segments();
        assert!(committed.iter().all(|s| s.length > 0.0));
    }

    #[test]
    fn test_add_node() {
        let mut board = KnowledgeBoard::new(InteractionConfig::default());
        let mut events = EventQueue::new();
        let note = board.add_node(NodeKind::Note, &mut events);
        let concept = board.add_node(NodeKind::Concept, &mut events);
        assert_ne!(note, concept);

        let node = board.node(&note).unwrap();
        assert_eq!(node.title, "New note");
        assert_eq!(node.content.as_deref(), Some("Content for new note..."));
        assert_eq!(node.position, NEW_NODE_POSITION);
        assert!(node.connections.is_empty());
        assert_eq!(board.node(&concept).unwrap().content, None);
        assert_eq!(events.drain(), vec![
            InteractionEvent::NodeAdded { node_id: note },
            InteractionEvent::NodeAdded { node_id: concept },
        ]);
    }

    #[test]
    fn test_remove_node_drops_edges_and_drag() {
        let mut board = board();
        let mut events = EventQueue::new();
        board.begin_drag("1", &mut events).unwrap();
        let removed = board.remove_node("1").unwrap();
        assert_eq!(removed.title, "Neuroplasticity");
        assert!(!board.is_dragging("1"));
        assert!(board.nodes().iter().all(|n| !n.is_connected_to("1")));
        assert_eq!(board.segments().len(), 1);
        assert!(matches!(board.end_drag("1", &mut events), Err(BoardError::UnknownNode(_))));
    }

    #[test]
    fn test_connect_disconnect() {
        let mut board = board();
        assert!(board.connect("3", "4").unwrap());
        assert!(!board.connect("3", "4").unwrap());
        assert!(matches!(board.connect("3", "3"), Err(BoardError::SelfConnection(_))));
        assert!(matches!(board.connect("3", "x"), Err(BoardError::UnknownNode(_))));
        assert_eq!(board.segments().len(), 4);

        assert!(board.disconnect("2", "1").unwrap());
        assert!(!board.node("1").unwrap().is_connected_to("2"));
        assert!(!board.node("2").unwrap().is_connected_to("1"));
        assert!(!board.disconnect("2", "1").unwrap());
    }

    #[test]
    fn test_set_position_blocked_while_dragging() {
        let mut board = board();
        let mut events = EventQueue::new();
        assert!(board.set_position("1", Point::new(0.0, 0.0)).unwrap());
        board.begin_drag("1", &mut events).unwrap();
        assert!(!board.set_position("1", Point::new(9.0, 9.0)).unwrap());
        assert!(matches!(
            board.set_position("1", Point::new(f64::NAN, 0.0)),
            Err(BoardError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_zoom_events() {
        let mut board = board();
        let mut events = EventQueue::new();
        for _ in 0..20 {
            board.zoom_in(&mut events);
        }
        assert_eq!(board.camera().zoom(), 2.0);
        assert!((10..=11).contains(&events.len()));
        assert_eq!(
            events.events().last(),
            Some(&InteractionEvent::ZoomChanged {
                zoom: 2.0,
                source: ZoomSource::Step,
            })
        );
        assert!(events.events().iter().all(|e| matches!(
            e,
            InteractionEvent::ZoomChanged { source: ZoomSource::Step, .. }
        )));
        events.clear();

        board.toggle_zoom(&mut events);
        assert_eq!(board.camera().zoom(), 1.0);
        assert_eq!(
            events.drain(),
            vec![InteractionEvent::ZoomChanged {
                zoom: 1.0,
                source: ZoomSource::Tap,
            }]
        );
        assert_eq!(board.reset_view(&mut events), None);
        assert!(events.is_empty());
    }

    #[test]
    fn test_unmount_discards_drags() {
        let mut board = board();
        let mut events = EventQueue::new();
        board.begin_drag("1", &mut events).unwrap();
        board.update_drag("1", 500.0, 500.0).unwrap();
        board.unmount();
        assert_eq!(board.dragging().count(), 0);
        assert_eq!(board.node("1").unwrap().position, Point::new(100.0, 150.0));
    }

    #[test]
    fn test_view_state_not_persisted() {
        let mut board = board();
        let mut events = EventQueue::new();
        board.zoom_in(&mut events);
        board.zoom_in(&mut events);
        let json = board.to_json().unwrap();
        assert!(!json.contains("zoom"));
        let loaded = KnowledgeBoard::from_json(InteractionConfig::default(), &json).unwrap();
        assert_eq!(loaded.camera().zoom(), 1.0);
        assert_eq!(loaded.camera().offset, Vec2::ZERO);
    }

    #[test]
    fn test_json_roundtrip() {
        let board = board();
        let json = board.to_json().unwrap();
        assert!(json.contains("\"type\": \"concept\""));
        let loaded = KnowledgeBoard::from_json(InteractionConfig::default(), &json).unwrap();
        assert_eq!(loaded.nodes(), board.nodes());

        let dup = r#"{"nodes":[
            {"id":"a","type":"note","title":"A","position":{"x":0.0,"y":0.0}},
            {"id":"a","type":"note","title":"B","position":{"x":1.0,"y":1.0}}
        ]}"#;
        assert!(matches!(
            KnowledgeBoard::from_json(InteractionConfig::default(), dup),
            Err(BoardError::DuplicateNode(_))
        ));
    }
}
