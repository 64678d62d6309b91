//! Board node data.

use crate::geometry::is_finite_point;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a board node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Note,
    Flashcard,
    Document,
    Concept,
}

impl NodeKind {
    /// Lowercase name, as used in titles and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Note => "note",
            NodeKind::Flashcard => "flashcard",
            NodeKind::Document => "document",
            NodeKind::Concept => "concept",
        }
    }

    /// Whether nodes of this kind carry body text.
    pub fn has_content(self) -> bool {
        self != NodeKind::Concept
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A card on the knowledge board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Top-left corner in canvas coordinates.
    pub position: Point,
    /// Ids of connected nodes (undirected).
    #[serde(default)]
    pub connections: Vec<String>,
}

impl CanvasNode {
    /// Create a node with no content and no connections.
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        title: impl Into<String>,
        position: Point,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            title: title.into(),
            content: None,
            position,
            connections: Vec::new(),
        }
    }

    /// Set the body text.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Set the outgoing edges.
    pub fn with_connections<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.connections = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this node lists `id` as a neighbour.
    pub fn is_connected_to(&self, id: &str) -> bool {
        self.connections.iter().any(|c| c == id)
    }

    /// Whether both coordinates are finite.
    pub fn has_valid_position(&self) -> bool {
        is_finite_point(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let node = CanvasNode::new("1", NodeKind::Note, "Neuroplasticity", Point::new(50.0, 50.0))
            .with_content("The brain's ability to reorganize itself")
            .with_connections(["2", "4"]);
        assert!(node.is_connected_to("2"));
        assert!(!node.is_connected_to("3"));
        assert!(node.has_valid_position());
    }

    #[test]
    fn test_serde_shape() {
        let node = CanvasNode::new("3", NodeKind::Concept, "Memory", Point::new(1.0, 2.0));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "concept");
        assert!(json.get("content").is_none());

        let back: CanvasNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(NodeKind::Flashcard.to_string(), "flashcard");
        assert!(NodeKind::Document.has_content());
        assert!(!NodeKind::Concept.has_content());
    }
}
