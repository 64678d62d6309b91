//! Pointer input adapter.
//!
//! Turns raw timestamped pointer samples into the higher-level gestures the
//! state machines consume: pans (translation relative to touch-down plus a
//! release velocity), taps and double taps.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Movement below this distance (px) is still a tap.
pub const TAP_SLOP: f64 = 10.0;
/// Maximum gap between two taps of a double tap.
pub const DOUBLE_TAP_TIME: Duration = Duration::from_millis(300);
/// Maximum distance between two taps of a double tap.
pub const DOUBLE_TAP_DISTANCE: f64 = 20.0;
/// Samples older than this are ignored for velocity.
pub const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The system took the pointer away (e.g. screen unmount).
    Cancel,
}

/// One pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub phase: PointerPhase,
    pub position: Point,
    /// Time since mount.
    pub time: Duration,
}

impl PointerSample {
    /// Finger or button pressed.
    pub fn down(position: Point, time: Duration) -> Self {
        Self {
            phase: PointerPhase::Down,
            position,
            time,
        }
    }

    /// Pointer moved.
    pub fn moved(position: Point, time: Duration) -> Self {
        Self {
            phase: PointerPhase::Move,
            position,
            time,
        }
    }

    /// Finger or button released.
    pub fn up(position: Point, time: Duration) -> Self {
        Self {
            phase: PointerPhase::Up,
            position,
            time,
        }
    }

    /// Pointer taken away by the system.
    pub fn cancel(position: Point, time: Duration) -> Self {
        Self {
            phase: PointerPhase::Cancel,
            position,
            time,
        }
    }
}

/// Recognised gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    PanStart { origin: Point },
    PanUpdate { translation: Vec2 },
    PanEnd { translation: Vec2, velocity: Vec2 },
    /// Pan aborted without a release.
    PanCancel,
    Tap { position: Point },
    DoubleTap { position: Point },
}

/// Estimates pointer velocity (px/s) from recent samples.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(Duration, Point)>,
}

impl VelocityTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample, dropping those outside the window.
    pub fn add(&mut self, time: Duration, position: Point) {
        self.samples.push_back((time, position));
        while let Some(&(oldest, _)) = self.samples.front() {
            if time.saturating_sub(oldest) > VELOCITY_WINDOW {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    /// Velocity across the window, or zero with fewer than two samples.
    pub fn velocity(&self) -> Vec2 {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back())
        else {
            return Vec2::ZERO;
        };
        let dt = t1.saturating_sub(t0).as_secs_f64();
        if dt <= 0.0 {
            return Vec2::ZERO;
        }
        (p1 - p0) / dt
    }

    /// Forget every sample.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: Point,
    panning: bool,
}

/// Single-pointer gesture recogniser.
#[derive(Debug, Clone, Default)]
pub struct GestureRecognizer {
    press: Option<Press>,
    tracker: VelocityTracker,
    last_tap: Option<(Duration, Point)>,
}

impl GestureRecognizer {
    /// Create an idle recogniser.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the current press has turned into a pan.
    pub fn is_panning(&self) -> bool {
        self.press.is_some_and(|p| p.panning)
    }

    /// Feed one sample; returns the gestures it completes.
    pub fn handle(&mut self, sample: PointerSample) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        match sample.phase {
            PointerPhase::Down => {
                self.tracker.reset();
                self.tracker.add(sample.time, sample.position);
                self.press = Some(Press {
                    origin: sample.position,
                    panning: false,
                });
            }
            PointerPhase::Move => {
                let Some(press) = self.press.as_mut() else {
                    return out;
                };
                self.tracker.add(sample.time, sample.position);
                let translation = sample.position - press.origin;
                if !press.panning && translation.hypot() >= TAP_SLOP {
                    press.panning = true;
                    log::trace!("pan started at {:?}", press.origin);
                    out.push(GestureEvent::PanStart {
                        origin: press.origin,
                    });
                }
                if press.panning {
                    out.push(GestureEvent::PanUpdate { translation });
                }
            }
            PointerPhase::Up => {
                let Some(press) = self.press.take() else {
                    return out;
                };
                self.tracker.add(sample.time, sample.position);
                let translation = sample.position - press.origin;
                if press.panning {
                    out.push(GestureEvent::PanEnd {
                        translation,
                        velocity: self.tracker.velocity(),
                    });
                } else {
                    out.push(GestureEvent::Tap {
                        position: sample.position,
                    });
                    if self.is_double_tap(sample.time, sample.position) {
                        self.last_tap = None;
                        out.push(GestureEvent::DoubleTap {
                            position: sample.position,
                        });
                    } else {
                        self.last_tap = Some((sample.time, sample.position));
                    }
                }
                self.tracker.reset();
            }
            PointerPhase::Cancel => {
                if let Some(press) = self.press.take() {
                    if press.panning {
                        out.push(GestureEvent::PanCancel);
                    }
                }
                self.tracker.reset();
            }
        }
        out
    }

    fn is_double_tap(&self, time: Duration, position: Point) -> bool {
        match self.last_tap {
            Some((last_time, last_position)) => {
                time.saturating_sub(last_time) <= DOUBLE_TAP_TIME
                    && last_position.distance(position) <= DOUBLE_TAP_DISTANCE
            }
            None => false,
        }
    }
}
