//! Events emitted by the gesture state machines.
//!
//! Components never call side-effecting code directly. They emit
//! [`InteractionEvent`]s into an [`EventSink`]; the host screen (and the
//! haptics adapter) listen and react.

use crate::flip::CardFace;
use crate::swipe::{CardOutcome, SwipeDirection};

/// Where a zoom change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomSource {
    /// Zoom in/out buttons.
    Step,
    /// Two-finger pinch.
    Pinch,
    /// Double tap toggle or focal zoom.
    Tap,
    /// Programmatic reset or fit.
    Reset,
}

/// Something that happened as the result of a gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEvent {
    /// A node drag began.
    DragStarted { node_id: String },
    /// A node drag ended and its position was committed.
    PositionCommitted { node_id: String, x: f64, y: f64 },
    /// A node was added to the board.
    NodeAdded { node_id: String },
    /// The canvas zoom level changed.
    ZoomChanged { zoom: f64, source: ZoomSource },
    /// A review card was flipped.
    CardFlipped { card_id: String, face: CardFace },
    /// A review card was rated (by swipe or button).
    CardResult { card_id: String, outcome: CardOutcome },
    /// The review moved on to the card at `index`.
    CardAdvanced { index: usize },
    /// The last card of the deck was rated.
    DeckFinished,
    /// A list card was swiped away.
    CardSwiped { direction: SwipeDirection },
}

/// Listener for interaction events.
pub trait EventSink {
    fn emit(&mut self, event: InteractionEvent);
}

impl<F: FnMut(InteractionEvent)> EventSink for F {
    fn emit(&mut self, event: InteractionEvent) {
        self(event)
    }
}

/// Forwards every event to two sinks, in order.
#[derive(Debug, Clone, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: EventSink, B: EventSink> EventSink for Tee<A, B> {
    fn emit(&mut self, event: InteractionEvent) {
        self.0.emit(event.clone());
        self.1.emit(event);
    }
}

/// Buffers events until the host drains them.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<InteractionEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all buffered events, oldest first.
    pub fn drain(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Buffered events, oldest first.
    pub fn events(&self) -> &[InteractionEvent] {
        &self.events
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every buffered event.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for EventQueue {
    fn emit(&mut self, event: InteractionEvent) {
        log::trace!("event: {:?}", event);
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drain() {
        let mut queue = EventQueue::new();
        queue.emit(InteractionEvent::DeckFinished);
        queue.emit(InteractionEvent::CardAdvanced { index: 1 });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0], InteractionEvent::DeckFinished);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_closure_and_tee() {
        let mut seen = Vec::new();
        {
            let mut sink = Tee(EventQueue::new(), |e: InteractionEvent| seen.push(e));
            sink.emit(InteractionEvent::DragStarted {
                node_id: "1".into(),
            });
            assert_eq!(sink.0.len(), 1);
        }
        assert_eq!(seen.len(), 1);
    }
}
