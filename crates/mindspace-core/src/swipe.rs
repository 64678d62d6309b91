//! Swipe classification state machine.
//!
//! Tracks one card's swipe gesture and, when the finger lifts, decides
//! whether the card is thrown off-screen (left, right or up) or springs back
//! to its origin. Distance and velocity are combined: crossing the distance
//! threshold OR releasing faster than the velocity threshold commits a
//! horizontal swipe. Upward swipes are distance-only.

use crate::config::InteractionConfig;
use crate::events::{EventSink, InteractionEvent};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// Direction a card was thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
}

/// Review rating recorded for a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardOutcome {
    Correct,
    Incorrect,
    Hard,
}

impl CardOutcome {
    /// Rating for a swipe direction.
    pub fn from_direction(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Left => CardOutcome::Incorrect,
            SwipeDirection::Right => CardOutcome::Correct,
            SwipeDirection::Up => CardOutcome::Hard,
        }
    }

    /// Swipe direction that produces this rating.
    pub fn direction(self) -> SwipeDirection {
        match self {
            CardOutcome::Incorrect => SwipeDirection::Left,
            CardOutcome::Correct => SwipeDirection::Right,
            CardOutcome::Hard => SwipeDirection::Up,
        }
    }
}

/// Which directions a card accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwipeMode {
    /// Flashcard review: left, right and up. Each gesture starts from the origin.
    #[default]
    Rating,
    /// List cards (archive/delete): horizontal only, continuing from wherever
    /// the card currently sits.
    Horizontal,
}

/// Lifecycle of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwipePhase {
    #[default]
    Idle,
    Dragging,
    Committed(SwipeDirection),
}

/// Terminal result of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeResolution {
    Commit(SwipeDirection),
    Reset,
}

/// What happened when the finger lifted, with the motion to animate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeRelease {
    pub resolution: SwipeResolution,
    /// Card offset at release.
    pub from: Vec2,
    /// Where the card should come to rest.
    pub target: Vec2,
}

/// Classify a release. Evaluated in order: left, right, up, reset.
pub fn classify(
    translation: Vec2,
    velocity: Vec2,
    threshold: f64,
    velocity_threshold: f64,
    mode: SwipeMode,
) -> SwipeResolution {
    if translation.x < -threshold || velocity.x < -velocity_threshold {
        SwipeResolution::Commit(SwipeDirection::Left)
    } else if translation.x > threshold || velocity.x > velocity_threshold {
        SwipeResolution::Commit(SwipeDirection::Right)
    } else if mode == SwipeMode::Rating && translation.y < -threshold {
        SwipeResolution::Commit(SwipeDirection::Up)
    } else {
        SwipeResolution::Reset
    }
}

/// Per-card swipe state machine.
#[derive(Debug, Clone)]
pub struct SwipeClassifier {
    mode: SwipeMode,
    threshold: f64,
    velocity_threshold: f64,
    viewport_width: f64,
    rotation_factor: f64,
    enabled: bool,
    phase: SwipePhase,
    translation: Vec2,
    origin: Vec2,
}

impl SwipeClassifier {
    /// Create a classifier. It starts enabled; review cards gate it via `set_enabled`.
    pub fn new(config: &InteractionConfig, mode: SwipeMode) -> Self {
        Self {
            mode,
            threshold: config.swipe_threshold(),
            velocity_threshold: config.velocity_threshold,
            viewport_width: config.viewport.width,
            rotation_factor: config.rotation_factor,
            enabled: true,
            phase: SwipePhase::Idle,
            translation: Vec2::ZERO,
            origin: Vec2::ZERO,
        }
    }

    /// Which directions this classifier accepts.
    pub fn mode(&self) -> SwipeMode {
        self.mode
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SwipePhase {
        self.phase
    }

    /// Current card offset.
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Distance threshold in pixels.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether the gate is open.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Open or close the gate. Closing mid-gesture abandons the gesture.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled && self.phase == SwipePhase::Dragging {
            log::debug!("swipe gate closed mid-gesture, resetting");
            self.phase = SwipePhase::Idle;
            self.translation = Vec2::ZERO;
        }
        self.enabled = enabled;
    }

    /// Card tilt in degrees, proportional to horizontal travel.
    pub fn rotation(&self) -> f64 {
        self.translation.x / self.viewport_width * self.rotation_factor
    }

    /// Finger down. Returns whether the gesture was accepted.
    pub fn begin(&mut self) -> bool {
        if !self.enabled || matches!(self.phase, SwipePhase::Committed(_)) {
            return false;
        }
        self.origin = match self.mode {
            SwipeMode::Rating => Vec2::ZERO,
            SwipeMode::Horizontal => self.translation,
        };
        self.phase = SwipePhase::Dragging;
        true
    }

    /// Finger moved; `translation` is total travel since `begin`.
    pub fn update(&mut self, translation: Vec2) -> Vec2 {
        if !self.enabled || self.phase != SwipePhase::Dragging {
            return self.translation;
        }
        if !translation.x.is_finite() || !translation.y.is_finite() {
            return self.translation;
        }
        let next = self.origin + translation;
        self.translation = match self.mode {
            SwipeMode::Rating => next,
            SwipeMode::Horizontal => Vec2::new(next.x, 0.0),
        };
        log::trace!("swipe update: ({}, {})", self.translation.x, self.translation.y);
        self.translation
    }

    /// Finger lifted with the given velocity (px/s).
    ///
    /// Returns `None` when no gesture was in progress (gated, already
    /// committed, or never begun).
    pub fn end(&mut self, velocity: Vec2) -> Option<SwipeRelease> {
        if !self.enabled || self.phase != SwipePhase::Dragging {
            return None;
        }
        let velocity = if velocity.x.is_finite() && velocity.y.is_finite() {
            velocity
        } else {
            Vec2::ZERO
        };
        let from = self.translation;
        let resolution = classify(
            from,
            velocity,
            self.threshold,
            self.velocity_threshold,
            self.mode,
        );
        let target = match resolution {
            SwipeResolution::Commit(direction) => {
                self.phase = SwipePhase::Committed(direction);
                self.off_screen_target(direction, from)
            }
            SwipeResolution::Reset => {
                self.phase = SwipePhase::Idle;
                Vec2::ZERO
            }
        };
        self.translation = target;
        log::debug!("swipe end: {:?} from ({}, {})", resolution, from.x, from.y);
        Some(SwipeRelease { resolution, from, target })
    }

    /// Commit in `direction` without a gesture (rating buttons).
    ///
    /// Subject to the same gate as a swipe. Returns `None` if gated or
    /// already committed.
    pub fn force(&mut self, direction: SwipeDirection) -> Option<SwipeRelease> {
        if !self.enabled || matches!(self.phase, SwipePhase::Committed(_)) {
            return None;
        }
        if self.mode == SwipeMode::Horizontal && direction == SwipeDirection::Up {
            return None;
        }
        let from = self.translation;
        let target = self.off_screen_target(direction, from);
        self.phase = SwipePhase::Committed(direction);
        self.translation = target;
        log::debug!("swipe forced: {:?}", direction);
        Some(SwipeRelease {
            resolution: SwipeResolution::Commit(direction),
            from,
            target,
        })
    }

    /// Back to the origin, ready for the next card.
    pub fn reset(&mut self) {
        self.phase = SwipePhase::Idle;
        self.translation = Vec2::ZERO;
        self.origin = Vec2::ZERO;
    }

    fn off_screen_target(&self, direction: SwipeDirection, from: Vec2) -> Vec2 {
        let w = self.viewport_width;
        match (self.mode, direction) {
            (SwipeMode::Rating, SwipeDirection::Left) => Vec2::new(-1.5 * w, from.y),
            (SwipeMode::Rating, SwipeDirection::Right) => Vec2::new(1.5 * w, from.y),
            (_, SwipeDirection::Up) => Vec2::new(from.x, -w),
            (SwipeMode::Horizontal, SwipeDirection::Left) => Vec2::new(-w, 0.0),
            (SwipeMode::Horizontal, SwipeDirection::Right) => Vec2::new(w, 0.0),
        }
    }
}

/// Horizontally swipeable list row (archive / delete).
#[derive(Debug, Clone)]
pub struct SwipeableCard {
    classifier: SwipeClassifier,
}

impl SwipeableCard {
    /// Create a list row swipeable left and right.
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            classifier: SwipeClassifier::new(config, SwipeMode::Horizontal),
        }
    }

    /// Underlying classifier.
    pub fn classifier(&self) -> &SwipeClassifier {
        &self.classifier
    }

    /// Enable or disable swiping.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.classifier.set_enabled(!disabled);
    }

    /// Finger down. Returns whether the swipe was accepted.
    pub fn begin(&mut self) -> bool {
        self.classifier.begin()
    }

    /// Finger moved; returns the row offset to draw.
    pub fn update(&mut self, translation: Vec2) -> Vec2 {
        self.classifier.update(translation)
    }

    /// Release. A commit emits [`InteractionEvent::CardSwiped`].
    pub fn end(&mut self, velocity: Vec2, sink: &mut dyn EventSink) -> Option<SwipeRelease> {
        let release = self.classifier.end(velocity)?;
        if let SwipeResolution::Commit(direction) = release.resolution {
            sink.emit(InteractionEvent::CardSwiped { direction });
        }
        Some(release)
    }

    /// Bring a swiped row back (e.g. undo).
    pub fn restore(&mut self) {
        self.classifier.reset();
    }
}
