//! Interpolation layer.
//!
//! The gesture state machines decide *where* things end up; this module
//! decides how they get there. Animations only consume committed targets and
//! never feed back into gesture logic.

use crate::config::{InteractionConfig, SpringConfig, TimingConfig};
use crate::swipe::{SwipeRelease, SwipeResolution};
use kurbo::{Point, Vec2};
use std::time::Duration;

/// Integration step for springs (seconds).
const SPRING_SUBSTEP: f64 = 1.0 / 240.0;
/// A spring within this distance of its target...
const REST_DISPLACEMENT: f64 = 0.01;
/// ...and slower than this is considered settled.
const REST_VELOCITY: f64 = 0.01;

/// Damped harmonic spring towards a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringAnimation {
    pub value: f64,
    pub velocity: f64,
    pub target: f64,
    pub config: SpringConfig,
    done: bool,
}

impl SpringAnimation {
    /// Create a spring starting at `from` with an initial velocity.
    pub fn new(from: f64, target: f64, velocity: f64, config: SpringConfig) -> Self {
        Self {
            value: from,
            velocity,
            target,
            config,
            done: false,
        }
    }

    /// Advance the simulation by `dt`.
    pub fn step(&mut self, dt: Duration) -> f64 {
        if self.done {
            return self.value;
        }
        let mut remaining = dt.as_secs_f64();
        let mass = if self.config.mass > 0.0 { self.config.mass } else { 1.0 };
        while remaining > 0.0 {
            let h = remaining.min(SPRING_SUBSTEP);
            let displacement = self.value - self.target;
            let force = -self.config.stiffness * displacement - self.config.damping * self.velocity;
            self.velocity += force / mass * h;
            self.value += self.velocity * h;
            remaining -= h;
        }
        if (self.value - self.target).abs() < REST_DISPLACEMENT
            && self.velocity.abs() < REST_VELOCITY
        {
            self.value = self.target;
            self.velocity = 0.0;
            self.done = true;
        }
        self.value
    }

    /// Whether the spring has come to rest.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Fixed-duration tween with ease-in-out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingAnimation {
    pub from: f64,
    pub target: f64,
    pub duration: Duration,
    elapsed: Duration,
}

impl TimingAnimation {
    /// Create a tween from `from` to `target`.
    pub fn new(from: f64, target: f64, timing: TimingConfig) -> Self {
        Self {
            from,
            target,
            duration: timing.duration(),
            elapsed: Duration::ZERO,
        }
    }

    /// Advance the tween by `dt`.
    pub fn step(&mut self, dt: Duration) -> f64 {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
        self.value()
    }

    /// Current eased value.
    pub fn value(&self) -> f64 {
        if self.duration.is_zero() {
            return self.target;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.target - self.from) * ease_in_out(t)
    }

    /// Whether the full duration has elapsed.
    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Quadratic ease-in-out on `[0, 1]`.
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Animation {
    Spring(SpringAnimation),
    Timing(TimingAnimation),
}

/// A scalar that is either at rest or animating towards a target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimatedValue {
    value: f64,
    animation: Option<Animation>,
}

impl AnimatedValue {
    /// Create a value at rest.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            animation: None,
        }
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Where the value will come to rest.
    pub fn target(&self) -> f64 {
        match self.animation {
            Some(Animation::Spring(s)) => s.target,
            Some(Animation::Timing(t)) => t.target,
            None => self.value,
        }
    }

    /// Whether an animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Jump immediately, cancelling any animation.
    pub fn set(&mut self, value: f64) {
        self.value = value;
        self.animation = None;
    }

    /// Spring from the current value, keeping any in-flight velocity.
    pub fn spring_to(&mut self, target: f64, config: SpringConfig) {
        let velocity = match self.animation {
            Some(Animation::Spring(s)) => s.velocity,
            _ => 0.0,
        };
        self.animation = Some(Animation::Spring(SpringAnimation::new(
            self.value, target, velocity, config,
        )));
    }

    /// Tween to `target`. A zero duration jumps immediately.
    pub fn timing_to(&mut self, target: f64, timing: TimingConfig) {
        let animation = TimingAnimation::new(self.value, target, timing);
        if animation.duration.is_zero() {
            self.set(target);
            return;
        }
        self.animation = Some(Animation::Timing(animation));
    }

    /// Advance by `dt` and return the new value.
    pub fn tick(&mut self, dt: Duration) -> f64 {
        let Some(animation) = self.animation.as_mut() else {
            return self.value;
        };
        let finished = match animation {
            Animation::Spring(spring) => {
                self.value = spring.step(dt);
                spring.is_done()
            }
            Animation::Timing(timing) => {
                self.value = timing.step(dt);
                timing.is_done()
            }
        };
        if finished {
            self.animation = None;
        }
        self.value
    }
}

/// Two animated coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnimatedVec {
    pub x: AnimatedValue,
    pub y: AnimatedValue,
}

impl AnimatedVec {
    /// Create a vector at rest.
    pub fn new(value: Vec2) -> Self {
        Self {
            x: AnimatedValue::new(value.x),
            y: AnimatedValue::new(value.y),
        }
    }

    /// Current value.
    pub fn value(&self) -> Vec2 {
        Vec2::new(self.x.value(), self.y.value())
    }

    /// Whether either axis is animating.
    pub fn is_animating(&self) -> bool {
        self.x.is_animating() || self.y.is_animating()
    }

    /// Jump immediately on both axes.
    pub fn set(&mut self, value: Vec2) {
        self.x.set(value.x);
        self.y.set(value.y);
    }

    /// Spring both axes towards `target`.
    pub fn spring_to(&mut self, target: Vec2, config: SpringConfig) {
        self.x.spring_to(target.x, config);
        self.y.spring_to(target.y, config);
    }

    /// Tween both axes towards `target`.
    pub fn timing_to(&mut self, target: Vec2, timing: TimingConfig) {
        self.x.timing_to(target.x, timing);
        self.y.timing_to(target.y, timing);
    }

    /// Advance both axes by `dt`.
    pub fn tick(&mut self, dt: Duration) -> Vec2 {
        Vec2::new(self.x.tick(dt), self.y.tick(dt))
    }
}

/// Visual motion of a swipeable card.
#[derive(Debug, Clone)]
pub struct CardMotion {
    offset: AnimatedVec,
    rotation: AnimatedValue,
    commit_timing: TimingConfig,
    reset_spring: SpringConfig,
    viewport_width: f64,
    rotation_factor: f64,
}

impl CardMotion {
    /// Motion for review cards (gentle reset spring).
    pub fn new(config: &InteractionConfig) -> Self {
        Self {
            offset: AnimatedVec::default(),
            rotation: AnimatedValue::default(),
            commit_timing: config.commit_timing,
            reset_spring: config.reset_spring,
            viewport_width: config.viewport.width,
            rotation_factor: config.rotation_factor,
        }
    }

    /// Motion for list cards (responsive reset spring).
    pub fn for_list(config: &InteractionConfig) -> Self {
        Self {
            reset_spring: config.list_reset_spring,
            ..Self::new(config)
        }
    }

    /// Current card offset from its resting place.
    pub fn offset(&self) -> Vec2 {
        self.offset.value()
    }

    /// Tilt in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation.value()
    }

    /// Whether the card is still moving.
    pub fn is_animating(&self) -> bool {
        self.offset.is_animating() || self.rotation.is_animating()
    }

    /// Track the finger directly while dragging.
    pub fn follow(&mut self, translation: Vec2) {
        self.offset.set(translation);
        self.rotation.set(translation.x / self.viewport_width * self.rotation_factor);
    }

    /// Animate the outcome of a release.
    pub fn release(&mut self, release: &SwipeRelease) {
        self.offset.set(release.from);
        match release.resolution {
            SwipeResolution::Commit(_) => {
                self.offset.timing_to(release.target, self.commit_timing);
            }
            SwipeResolution::Reset => {
                self.offset.spring_to(release.target, self.reset_spring);
                self.rotation.spring_to(0.0, self.reset_spring);
            }
        }
    }

    /// Snap to the origin without animating (next card shown).
    pub fn reset(&mut self) {
        self.offset.set(Vec2::ZERO);
        self.rotation.set(0.0);
    }

    /// Advance the card animation by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.offset.tick(dt);
        self.rotation.tick(dt);
    }
}

/// Displayed position of a board node.
///
/// Tracks the finger exactly while dragging; committed moves made outside a
/// gesture (reload, programmatic layout) spring into place.
#[derive(Debug, Clone)]
pub struct NodeMotion {
    position: AnimatedVec,
    spring: SpringConfig,
}

impl NodeMotion {
    /// Create motion resting at `position`.
    pub fn new(config: &InteractionConfig, position: Point) -> Self {
        Self {
            position: AnimatedVec::new(position.to_vec2()),
            spring: config.reposition_spring,
        }
    }

    /// Where to draw the node.
    pub fn position(&self) -> Point {
        self.position.value().to_point()
    }

    /// Whether the node is still settling.
    pub fn is_animating(&self) -> bool {
        self.position.is_animating()
    }

    /// Jump to a live drag position.
    pub fn follow(&mut self, position: Point) {
        self.position.set(position.to_vec2());
    }

    /// Spring towards a new committed position.
    pub fn settle_to(&mut self, position: Point) {
        self.position.spring_to(position.to_vec2(), self.spring);
    }

    /// Advance by `dt` and return the new position.
    pub fn tick(&mut self, dt: Duration) -> Point {
        self.position.tick(dt).to_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swipe::SwipeDirection;

    fn run(value: &mut AnimatedValue, total_ms: u64) {
        for _ in 0..(total_ms / 16) {
            value.tick(Duration::from_millis(16));
        }
    }

    #[test]
    fn test_spring_settles() {
        let mut value = AnimatedValue::new(300.0);
        value.spring_to(0.0, SpringConfig::GENTLE);
        assert!(value.is_animating());
        run(&mut value, 5000);
        assert!(!value.is_animating());
        assert_eq!(value.value(), 0.0);
    }

    #[test]
    fn test_bouncy_spring_overshoots() {
        let mut spring = SpringAnimation::new(100.0, 0.0, 0.0, SpringConfig::BOUNCY);
        let mut min = f64::MAX;
        for _ in 0..200 {
            min = min.min(spring.step(Duration::from_millis(16)));
        }
        assert!(min < 0.0);
        assert!(spring.is_done());
    }

    #[test]
    fn test_timing_reaches_target_on_time() {
        let mut value = AnimatedValue::new(0.0);
        value.timing_to(100.0, TimingConfig::NORMAL);
        value.tick(Duration::from_millis(150));
        assert!((value.value() - 50.0).abs() < 1e-9);
        value.tick(Duration::from_millis(150));
        assert_eq!(value.value(), 100.0);
        assert!(!value.is_animating());
    }

    #[test]
    fn test_zero_duration_is_instant() {
        let mut value = AnimatedValue::new(0.0);
        value.timing_to(42.0, TimingConfig { duration_ms: 0 });
        assert_eq!(value.value(), 42.0);
        assert!(!value.is_animating());
    }

    #[test]
    fn test_ease_in_out() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert!((ease_in_out(0.5) - 0.5).abs() < 1e-12);
        assert!(ease_in_out(0.25) < 0.25);
    }

    #[test]
    fn test_card_motion_commit_and_reset() {
        let config = InteractionConfig::default().with_viewport(1000.0, 800.0);
        let mut motion = CardMotion::new(&config);
        motion.follow(Vec2::new(500.0, 0.0));
        assert!((motion.rotation() - 3.5).abs() < 1e-12);

        motion.release(&SwipeRelease {
            resolution: SwipeResolution::Commit(SwipeDirection::Right),
            from: Vec2::new(500.0, 0.0),
            target: Vec2::new(1500.0, 0.0),
        });
        motion.tick(Duration::from_millis(300));
        assert_eq!(motion.offset(), Vec2::new(1500.0, 0.0));

        motion.follow(Vec2::new(100.0, 40.0));
        motion.release(&SwipeRelease {
            resolution: SwipeResolution::Reset,
            from: Vec2::new(100.0, 40.0),
            target: Vec2::ZERO,
        });
        for _ in 0..300 {
            motion.tick(Duration::from_millis(16));
        }
        assert!(!motion.is_animating());
        assert_eq!(motion.offset(), Vec2::ZERO);
        assert_eq!(motion.rotation(), 0.0);
    }

    #[test]
    fn test_list_motion_uses_responsive_spring() {
        let config = InteractionConfig::default();
        let mut list = CardMotion::for_list(&config);
        let mut review = CardMotion::new(&config);
        assert_eq!(list.reset_spring, SpringConfig::RESPONSIVE);
        assert_eq!(review.reset_spring, SpringConfig::GENTLE);

        let release = SwipeRelease {
            resolution: SwipeResolution::Reset,
            from: Vec2::new(100.0, 0.0),
            target: Vec2::ZERO,
        };
        let frames_to_rest = |motion: &mut CardMotion| {
            motion.follow(release.from);
            motion.release(&release);
            let mut frames = 0;
            while motion.is_animating() && frames < 1000 {
                motion.tick(Duration::from_millis(16));
                frames += 1;
            }
            frames
        };
        let list_frames = frames_to_rest(&mut list);
        let review_frames = frames_to_rest(&mut review);
        assert!(list_frames < 1000 && review_frames < 1000);
        assert!(list_frames < review_frames);
        assert_eq!(list.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_node_motion_springs_to_new_position() {
        let config = InteractionConfig::default();
        let mut motion = NodeMotion::new(&config, Point::new(100.0, 100.0));
        motion.follow(Point::new(140.0, 90.0));
        assert_eq!(motion.position(), Point::new(140.0, 90.0));
        assert!(!motion.is_animating());

        motion.settle_to(Point::new(0.0, 0.0));
        let first = motion.tick(Duration::from_millis(16));
        assert!(first.x < 140.0 && first.x > 0.0);
        for _ in 0..400 {
            motion.tick(Duration::from_millis(16));
        }
        assert_eq!(motion.position(), Point::ZERO);
    }
}
