//! Haptic feedback adapter.
//!
//! Haptics are fire-and-forget: a failing or missing vibration motor must
//! never interrupt a gesture. [`Haptics`] wraps a platform [`HapticDriver`],
//! logs failures and carries on.

use crate::events::{EventSink, InteractionEvent, ZoomSource};
use crate::flip::CardFace;
use crate::swipe::CardOutcome;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of haptic feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HapticKind {
    Light,
    Medium,
    Heavy,
    Success,
    Warning,
    Error,
    Selection,
}

/// Haptic driver errors.
#[derive(Debug, Error)]
pub enum HapticError {
    #[error("Haptics not supported on this platform")]
    Unsupported,
    #[error("Haptics permission denied")]
    PermissionDenied,
    #[error("Haptic device error: {0}")]
    Device(String),
}

/// Platform hook that actually vibrates.
pub trait HapticDriver {
    fn trigger(&mut self, kind: HapticKind) -> Result<(), HapticError>;

    /// Whether the platform has haptics at all.
    fn is_supported(&self) -> bool {
        true
    }
}

/// Driver for platforms without haptics.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHaptics;

impl HapticDriver for NoopHaptics {
    fn trigger(&mut self, _kind: HapticKind) -> Result<(), HapticError> {
        Ok(())
    }

    fn is_supported(&self) -> bool {
        false
    }
}

/// Map an interaction event to the feedback it should produce.
pub fn haptic_for(event: &InteractionEvent) -> Option<HapticKind> {
    match event {
        InteractionEvent::DragStarted { .. } => Some(HapticKind::Light),
        InteractionEvent::NodeAdded { .. } => Some(HapticKind::Medium),
        InteractionEvent::ZoomChanged { source: ZoomSource::Step, .. } => Some(HapticKind::Light),
        InteractionEvent::CardFlipped { face: CardFace::Answer, .. } => Some(HapticKind::Light),
        InteractionEvent::CardResult { outcome, .. } => Some(match outcome {
            CardOutcome::Correct => HapticKind::Success,
            CardOutcome::Incorrect => HapticKind::Error,
            CardOutcome::Hard => HapticKind::Warning,
        }),
        InteractionEvent::CardSwiped { .. } => Some(HapticKind::Medium),
        _ => None,
    }
}

/// Error-swallowing haptics front end.
#[derive(Debug, Clone)]
pub struct Haptics<D: HapticDriver> {
    driver: D,
    enabled: bool,
}

impl<D: HapticDriver> Haptics<D> {
    /// Wrap a driver. Feedback starts enabled.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            enabled: true,
        }
    }

    /// Turn feedback on or off (user setting).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether feedback is on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The wrapped driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Trigger feedback. Failures are logged and dropped.
    pub fn trigger(&mut self, kind: HapticKind) {
        if !self.enabled || !self.driver.is_supported() {
            return;
        }
        if let Err(e) = self.driver.trigger(kind) {
            log::warn!("Haptic feedback error ({:?}): {}", kind, e);
        }
    }
}

impl<D: HapticDriver> EventSink for Haptics<D> {
    fn emit(&mut self, event: InteractionEvent) {
        if let Some(kind) = haptic_for(&event) {
            self.trigger(kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swipe::SwipeDirection;

    #[derive(Default)]
    struct Recording {
        fired: Vec<HapticKind>,
        fail: bool,
    }

    impl HapticDriver for Recording {
        fn trigger(&mut self, kind: HapticKind) -> Result<(), HapticError> {
            if self.fail {
                return Err(HapticError::PermissionDenied);
            }
            self.fired.push(kind);
            Ok(())
        }
    }

    fn result(outcome: CardOutcome) -> InteractionEvent {
        InteractionEvent::CardResult {
            card_id: "1".into(),
            outcome,
        }
    }

    #[test]
    fn test_outcome_mapping() {
        let mut haptics = Haptics::new(Recording::default());
        haptics.emit(result(CardOutcome::Correct));
        haptics.emit(result(CardOutcome::Incorrect));
        haptics.emit(result(CardOutcome::Hard));
        assert_eq!(
            haptics.driver().fired,
            vec![HapticKind::Success, HapticKind::Error, HapticKind::Warning]
        );
    }

    #[test]
    fn test_silent_events() {
        let mut haptics = Haptics::new(Recording::default());
        haptics.emit(InteractionEvent::PositionCommitted {
            node_id: "1".into(),
            x: 0.0,
            y: 0.0,
        });
        haptics.emit(InteractionEvent::ZoomChanged {
            zoom: 1.2,
            source: ZoomSource::Pinch,
        });
        haptics.emit(InteractionEvent::CardFlipped {
            card_id: "1".into(),
            face: CardFace::Question,
        });
        assert!(haptics.driver().fired.is_empty());

        haptics.emit(InteractionEvent::CardSwiped {
            direction: SwipeDirection::Left,
        });
        assert_eq!(haptics.driver().fired, vec![HapticKind::Medium]);
    }

    #[test]
    fn test_failure_is_swallowed() {
        let mut haptics = Haptics::new(Recording {
            fired: Vec::new(),
            fail: true,
        });
        haptics.trigger(HapticKind::Success);
        haptics.emit(InteractionEvent::DragStarted {
            node_id: "n".into(),
        });
        assert!(haptics.driver().fired.is_empty());
    }

    #[test]
    fn test_disabled() {
        let mut haptics = Haptics::new(Recording::default());
        haptics.set_enabled(false);
        haptics.trigger(HapticKind::Heavy);
        assert!(haptics.driver().fired.is_empty());

        let mut noop = Haptics::new(NoopHaptics);
        noop.trigger(HapticKind::Light);
    }
}
