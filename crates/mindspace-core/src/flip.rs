//! Question/answer flip state for a review card.

use crate::config::InteractionConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which side of the card is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardFace {
    #[default]
    Question,
    Answer,
}

impl CardFace {
    /// The other face.
    pub fn flipped(self) -> Self {
        match self {
            CardFace::Question => CardFace::Answer,
            CardFace::Answer => CardFace::Question,
        }
    }

    /// Resting rotation of this face, in degrees.
    pub fn angle(self) -> f64 {
        match self {
            CardFace::Question => 0.0,
            CardFace::Answer => 180.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FlipTransition {
    started: Duration,
    from_angle: f64,
}

/// Two-state flip with a timed rotation.
///
/// Swiping is only allowed once the answer side has fully turned over, so a
/// card that is still mid-flip cannot be rated.
#[derive(Debug, Clone)]
pub struct FlipState {
    face: CardFace,
    duration: Duration,
    transition: Option<FlipTransition>,
}

impl FlipState {
    /// Start on the question face.
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            face: CardFace::Question,
            duration: config.flip_timing.duration(),
            transition: None,
        }
    }

    /// Face currently showing (or turning towards).
    pub fn face(&self) -> CardFace {
        self.face
    }

    /// Toggle the face (tap). `now` is time since mount.
    pub fn flip(&mut self, now: Duration) -> CardFace {
        let from_angle = self.rotation(now);
        self.face = self.face.flipped();
        self.transition = Some(FlipTransition {
            started: now,
            from_angle,
        });
        log::debug!("card flipped to {:?}", self.face);
        self.face
    }

    /// Whether the flip animation has finished at `now`.
    pub fn is_settled(&self, now: Duration) -> bool {
        self.progress(now) >= 1.0
    }

    /// Animation progress in `[0, 1]`.
    pub fn progress(&self, now: Duration) -> f64 {
        let Some(transition) = self.transition else {
            return 1.0;
        };
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(transition.started);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Current rotation in degrees (0 = question, 180 = answer).
    pub fn rotation(&self, now: Duration) -> f64 {
        let target = self.face.angle();
        match self.transition {
            Some(transition) => {
                let t = self.progress(now);
                transition.from_angle + (target - transition.from_angle) * t
            }
            None => target,
        }
    }

    /// Swipe gating: answer showing and fully turned.
    pub fn is_swipe_enabled(&self, now: Duration) -> bool {
        self.face == CardFace::Answer && self.is_settled(now)
    }

    /// Snap back to the question side without animating.
    pub fn reset(&mut self) {
        self.face = CardFace::Question;
        self.transition = None;
    }
}
