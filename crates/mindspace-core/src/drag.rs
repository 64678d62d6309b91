//! Draggable node position state.

use crate::config::InteractionConfig;
use crate::events::{EventSink, InteractionEvent};
use crate::geometry::{is_finite_point, snap_to_grid};
use kurbo::{Point, Vec2};

/// State of an active drag gesture on one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Node position when the gesture began.
    pub origin: Point,
    /// Current (uncommitted) position.
    pub live: Point,
}

impl DragSession {
    /// Create a new session anchored at `origin`.
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            live: origin,
        }
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.live - self.origin
    }
}

/// Position state for one draggable board item.
///
/// Live movement during a gesture is visual only; the committed `position`
/// changes once, on `end_drag`.
#[derive(Debug, Clone)]
pub struct DraggableNode {
    id: String,
    position: Point,
    session: Option<DragSession>,
    snap_to_grid: bool,
    grid_size: f64,
    disabled: bool,
}

impl DraggableNode {
    /// Create a node handle at its committed position.
    pub fn new(id: impl Into<String>, position: Point, config: &InteractionConfig) -> Self {
        Self {
            id: id.into(),
            position,
            session: None,
            snap_to_grid: config.snap_to_grid,
            grid_size: config.grid_size,
            disabled: false,
        }
    }

    /// Node id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Committed position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Position to draw: the live position while dragging, else the committed one.
    pub fn display_position(&self) -> Point {
        self.session.map_or(self.position, |s| s.live)
    }

    /// The open drag session, if any.
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Enable or disable dragging.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Whether dragging is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Begin a drag from the current position.
    ///
    /// Returns false if the node is disabled. Restarting while a session is
    /// open re-anchors at the current committed position.
    pub fn start_drag(&mut self, sink: &mut dyn EventSink) -> bool {
        if self.disabled {
            return false;
        }
        log::debug!("drag start: {} at ({}, {})", self.id, self.position.x, self.position.y);
        self.session = Some(DragSession::new(self.position));
        sink.emit(InteractionEvent::DragStarted {
            node_id: self.id.clone(),
        });
        true
    }

    /// Move to `origin + (dx, dy)`, where the deltas are total finger travel
    /// since `start_drag`. Returns the live position.
    pub fn update_drag(&mut self, dx: f64, dy: f64) -> Point {
        let Some(session) = self.session.as_mut() else {
            return self.position;
        };
        let live = session.origin + Vec2::new(dx, dy);
        if is_finite_point(live) {
            session.live = live;
        } else {
            log::warn!("Ignoring non-finite drag update for {}", self.id);
        }
        log::trace!("drag update: {} -> ({}, {})", self.id, session.live.x, session.live.y);
        session.live
    }

    /// Finish the drag, snapping if enabled, and commit the final position.
    ///
    /// Without an open session this is a no-op returning the current position.
    pub fn end_drag(&mut self, sink: &mut dyn EventSink) -> Point {
        let Some(session) = self.session.take() else {
            return self.position;
        };
        let mut target = session.live;
        if self.snap_to_grid {
            target = snap_to_grid(target, self.grid_size);
        }
        self.position = target;
        log::debug!("drag end: {} committed at ({}, {})", self.id, target.x, target.y);
        sink.emit(InteractionEvent::PositionCommitted {
            node_id: self.id.clone(),
            x: target.x,
            y: target.y,
        });
        target
    }

    /// Abandon the drag without committing.
    pub fn cancel_drag(&mut self) {
        if self.session.take().is_some() {
            log::debug!("drag cancelled: {}", self.id);
        }
    }

    /// Move the committed position from outside a gesture (e.g. data reload).
    ///
    /// Ignored while a drag is in flight.
    pub fn set_position(&mut self, position: Point) -> bool {
        if self.session.is_some() || !is_finite_point(position) {
            return false;
        }
        self.position = position;
        true
    }
}
