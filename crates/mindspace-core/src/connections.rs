//! Connection line geometry between board nodes.
//!
//! Each edge is drawn as a straight bar that starts at the source node's
//! anchor, has length `length`, and is rotated by `angle` radians about its
//! start point.

use crate::config::InteractionConfig;
use crate::geometry::{angle, distance};
use crate::node::CanvasNode;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// How to treat an edge listed by both of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Draw each undirected edge once.
    #[default]
    Deduplicate,
    /// Draw every listed direction (an A-B pair listed twice is drawn twice).
    BothDirections,
}

/// A line segment ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: String,
    pub to: String,
    pub start: Point,
    pub end: Point,
    pub length: f64,
    /// Rotation about `start`, in radians.
    pub angle: f64,
}

impl Segment {
    /// Build the segment from `start` to `end`.
    pub fn between(from: &str, to: &str, start: Point, end: Point) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            start,
            end,
            length: distance(start, end),
            angle: angle(start, end),
        }
    }

    /// Whether the segment touches `id`.
    pub fn touches(&self, id: &str) -> bool {
        self.from == id || self.to == id
    }
}

/// Computes connection segments from node positions.
#[derive(Debug, Clone)]
pub struct ConnectionRenderer {
    anchor_offset: Vec2,
    policy: EdgePolicy,
}

impl ConnectionRenderer {
    /// Create a renderer using the configured node size for anchors.
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            anchor_offset: config.anchor_offset(),
            policy: EdgePolicy::default(),
        }
    }

    /// Set the edge policy.
    pub fn with_policy(mut self, policy: EdgePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Current edge policy.
    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    /// Visual center of a node whose top-left corner is at `position`.
    pub fn anchor(&self, position: Point) -> Point {
        position + self.anchor_offset
    }

    /// Segments for all edges, using committed node positions.
    pub fn segments(&self, nodes: &[CanvasNode]) -> Vec<Segment> {
        self.segments_with(nodes, |node| node.position)
    }

    /// Segments for all edges, asking `position_of` where each node is.
    ///
    /// Edges to ids that are not in `nodes` are skipped.
    pub fn segments_with<F>(&self, nodes: &[CanvasNode], position_of: F) -> Vec<Segment>
    where
        F: Fn(&CanvasNode) -> Point,
    {
        self.collect(nodes, &position_of, |_| true)
    }

    /// Segments touching one node, for redrawing while it moves.
    pub fn segments_for_node<F>(
        &self,
        nodes: &[CanvasNode],
        id: &str,
        position_of: F,
    ) -> Vec<Segment>
    where
        F: Fn(&CanvasNode) -> Point,
    {
        self.collect(nodes, &position_of, |seg| seg.touches(id))
    }

    fn collect<F, P>(&self, nodes: &[CanvasNode], position_of: &F, keep: P) -> Vec<Segment>
    where
        F: Fn(&CanvasNode) -> Point,
        P: Fn(&Segment) -> bool,
    {
        let by_id: HashMap<&str, &CanvasNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut segments = Vec::new();

        for node in nodes {
            for target_id in &node.connections {
                let Some(target) = by_id.get(target_id.as_str()) else {
                    log::trace!("skipping dangling edge {} -> {}", node.id, target_id);
                    continue;
                };
                if self.policy == EdgePolicy::Deduplicate {
                    let key = if node.id.as_str() <= target_id.as_str() {
                        (node.id.as_str(), target_id.as_str())
                    } else {
                        (target_id.as_str(), node.id.as_str())
                    };
                    if !seen.insert(key) {
                        continue;
                    }
                }
                let segment = Segment::between(
                    &node.id,
                    &target.id,
                    self.anchor(position_of(node)),
                    self.anchor(position_of(target)),
                );
                if keep(&segment) {
                    segments.push(segment);
                }
            }
        }
        segments
    }
}
