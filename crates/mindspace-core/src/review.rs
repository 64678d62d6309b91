//! Flashcard review session.
//!
//! One card is active at a time. Tapping flips it; once the answer is fully
//! showing the card can be swiped (or rated with buttons). A rating is
//! recorded immediately and the deck advances after the commit animation.

use crate::config::InteractionConfig;
use crate::events::{EventSink, InteractionEvent};
use crate::flip::{CardFace, FlipState};
use crate::scheduler::Scheduler;
use crate::swipe::{
    CardOutcome, SwipeClassifier, SwipeMode, SwipePhase, SwipeRelease, SwipeResolution,
};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    /// Create a card.
    pub fn new(
        id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// Running totals for the progress meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total_cards: usize,
    pub total_reviewed: usize,
    pub total_correct: usize,
    pub total_incorrect: usize,
    pub total_hard: usize,
}

impl ReviewStats {
    /// Fraction of the deck reviewed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_cards == 0 {
            return 0.0;
        }
        self.total_reviewed as f64 / self.total_cards as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewTask {
    Advance,
}

/// State of one review screen.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    cards: Vec<Flashcard>,
    index: usize,
    completed: HashMap<String, CardOutcome>,
    flip: FlipState,
    swipe: SwipeClassifier,
    scheduler: Scheduler<ReviewTask>,
    advance_delay: Duration,
    finished: bool,
    /// Set by `unmount`; no further input is accepted.
    unmounted: bool,
}

impl ReviewSession {
    /// Start a review of `cards`. An empty deck starts finished.
    pub fn new(config: &InteractionConfig, cards: Vec<Flashcard>) -> Self {
        let mut swipe = SwipeClassifier::new(config, SwipeMode::Rating);
        swipe.set_enabled(false);
        Self {
            finished: cards.is_empty(),
            cards,
            index: 0,
            completed: HashMap::new(),
            flip: FlipState::new(config),
            swipe,
            scheduler: Scheduler::new(),
            advance_delay: config.commit_timing.duration(),
            unmounted: false,
        }
    }

    /// The neuroscience starter deck.
    pub fn sample(config: &InteractionConfig) -> Self {
        let cards = vec![
            Flashcard::new(
                "1",
                "What is neuroplasticity?",
                "Neuroplasticity is the brain's ability to reorganize itself by forming new neural connections throughout life. This capability allows for learning, adaptation, and recovery from brain injuries.",
            ),
            Flashcard::new(
                "2",
                "What is the role of the hippocampus in learning?",
                "The hippocampus plays a crucial role in the formation of new memories, particularly declarative memories (facts and events). It helps transfer information from short-term to long-term memory.",
            ),
            Flashcard::new(
                "3",
                "What are the main types of learning?",
                "1. Explicit Learning: Conscious, intentional acquisition of knowledge\n2. Implicit Learning: Unconscious acquisition of knowledge\n3. Observational Learning: Learning by observing others\n4. Experiential Learning: Learning through experience and reflection",
            ),
        ];
        Self::new(config, cards)
    }

    /// The deck being reviewed.
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    /// Index of the active card.
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// The active card, or `None` once the deck is finished.
    pub fn current_card(&self) -> Option<&Flashcard> {
        if self.finished {
            return None;
        }
        self.cards.get(self.index)
    }

    /// Face of the active card.
    pub fn face(&self) -> CardFace {
        self.flip.face()
    }

    /// Flip animation state of the active card.
    pub fn flip_state(&self) -> &FlipState {
        &self.flip
    }

    /// Swipe state of the active card.
    pub fn swipe(&self) -> &SwipeClassifier {
        &self.swipe
    }

    /// Rating recorded for `card_id`, if any.
    pub fn outcome(&self, card_id: &str) -> Option<CardOutcome> {
        self.completed.get(card_id).copied()
    }

    /// Every recorded rating by card id.
    pub fn completed(&self) -> &HashMap<String, CardOutcome> {
        &self.completed
    }

    /// Whether the last card has been rated and advanced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether a rating is waiting for its advance.
    pub fn is_advancing(&self) -> bool {
        !self.scheduler.is_empty()
    }

    /// Totals for the progress meter.
    pub fn stats(&self) -> ReviewStats {
        let count = |o: CardOutcome| self.completed.values().filter(|&&v| v == o).count();
        ReviewStats {
            total_cards: self.cards.len(),
            total_reviewed: self.completed.len(),
            total_correct: count(CardOutcome::Correct),
            total_incorrect: count(CardOutcome::Incorrect),
            total_hard: count(CardOutcome::Hard),
        }
    }

    /// Whether swiping is allowed at `now`.
    pub fn is_swipe_enabled(&self, now: Duration) -> bool {
        !self.finished && !self.unmounted && !self.is_advancing() && self.flip.is_swipe_enabled(now)
    }

    fn sync_gate(&mut self, now: Duration) {
        let enabled = self.is_swipe_enabled(now);
        if self.swipe.is_enabled() != enabled {
            self.swipe.set_enabled(enabled);
        }
    }

    /// Tap on the card. Ignored once the card has been rated.
    pub fn flip(&mut self, now: Duration, sink: &mut dyn EventSink) -> Option<CardFace> {
        if self.finished || self.unmounted || self.is_advancing() {
            return None;
        }
        let card_id = self.cards.get(self.index)?.id.clone();
        let face = self.flip.flip(now);
        self.sync_gate(now);
        sink.emit(InteractionEvent::CardFlipped { card_id, face });
        Some(face)
    }

    /// Finger down on the card. Returns whether the swipe was accepted.
    pub fn swipe_begin(&mut self, now: Duration) -> bool {
        self.sync_gate(now);
        self.swipe.begin()
    }

    /// Finger moved; returns the card offset to draw.
    pub fn swipe_update(&mut self, translation: Vec2, now: Duration) -> Vec2 {
        self.sync_gate(now);
        self.swipe.update(translation)
    }

    /// Finger lifted. A commit records the rating and schedules the advance.
    pub fn swipe_end(
        &mut self,
        velocity: Vec2,
        now: Duration,
        sink: &mut dyn EventSink,
    ) -> Option<SwipeRelease> {
        self.sync_gate(now);
        let release = self.swipe.end(velocity)?;
        if let SwipeResolution::Commit(direction) = release.resolution {
            self.commit(CardOutcome::from_direction(direction), now, sink);
        }
        Some(release)
    }

    /// Rating button. Same gate and commit path as a swipe.
    pub fn rate(
        &mut self,
        outcome: CardOutcome,
        now: Duration,
        sink: &mut dyn EventSink,
    ) -> Option<SwipeRelease> {
        self.sync_gate(now);
        if self.swipe.phase() == SwipePhase::Dragging {
            return None;
        }
        let release = self.swipe.force(outcome.direction())?;
        self.commit(outcome, now, sink);
        Some(release)
    }

    fn commit(&mut self, outcome: CardOutcome, now: Duration, sink: &mut dyn EventSink) {
        let Some(card) = self.cards.get(self.index) else {
            return;
        };
        let card_id = card.id.clone();
        log::debug!("card {} rated {:?}", card_id, outcome);
        self.completed.insert(card_id.clone(), outcome);
        sink.emit(InteractionEvent::CardResult { card_id, outcome });
        self.scheduler.schedule(now, self.advance_delay, ReviewTask::Advance);
        self.swipe.set_enabled(false);
    }

    /// Drive deferred work. Call once per frame.
    pub fn tick(&mut self, now: Duration, sink: &mut dyn EventSink) {
        for task in self.scheduler.advance(now) {
            match task {
                ReviewTask::Advance => self.advance(sink),
            }
        }
        self.sync_gate(now);
    }

    fn advance(&mut self, sink: &mut dyn EventSink) {
        self.flip.reset();
        self.swipe.reset();
        self.swipe.set_enabled(false);
        if self.index + 1 < self.cards.len() {
            self.index += 1;
            log::debug!("advanced to card {}", self.index);
            sink.emit(InteractionEvent::CardAdvanced { index: self.index });
        } else {
            self.finished = true;
            let stats = self.stats();
            log::info!(
                "deck finished: {}/{} correct",
                stats.total_correct,
                stats.total_reviewed
            );
            sink.emit(InteractionEvent::DeckFinished);
        }
    }

    /// Screen teardown: drop the pending advance and any open gesture.
    /// The session accepts no input afterwards.
    pub fn unmount(&mut self) {
        self.unmounted = true;
        self.scheduler.clear();
        self.flip.reset();
        self.swipe.reset();
        self.swipe.set_enabled(false);
    }

    /// Whether `unmount` has run.
    pub fn is_unmounted(&self) -> bool {
        self.unmounted
    }
}

/// Card position in the deck editor. Moving back is only possible here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeckCursor {
    index: usize,
    len: usize,
}

impl DeckCursor {
    /// Cursor at the first of `len` cards.
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    /// Current card index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of cards.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the deck has no cards.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the cursor is on the first card.
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Whether the cursor is on the last card.
    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.len
    }

    /// Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Move back one card. Returns whether the cursor moved.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// The deck grew or shrank; keep the cursor in range.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.index = self.index.min(len.saturating_sub(1));
    }
}
