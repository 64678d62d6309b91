//! Mindspace Core Library
//!
//! Platform-agnostic gesture and spatial interaction logic for the Mindspace
//! knowledge board and flashcard review screens.

pub mod animation;
pub mod board;
pub mod camera;
pub mod config;
pub mod connections;
pub mod drag;
pub mod events;
pub mod flip;
pub mod geometry;
pub mod gesture;
pub mod haptics;
pub mod node;
pub mod review;
pub mod scheduler;
pub mod swipe;

pub use animation::{
    AnimatedValue, AnimatedVec, CardMotion, NodeMotion, SpringAnimation, TimingAnimation,
};
pub use board::{BoardDocument, BoardError, BoardResult, KnowledgeBoard};
pub use camera::{CanvasTransform, PanBounds, ViewTransform};
pub use config::{ConfigError, InteractionConfig, SpringConfig, TimingConfig};
pub use connections::{ConnectionRenderer, EdgePolicy, Segment};
pub use drag::{DragSession, DraggableNode};
pub use events::{EventQueue, EventSink, InteractionEvent, Tee, ZoomSource};
pub use flip::{CardFace, FlipState};
pub use geometry::{snap_to_grid, GRID_SIZE};
pub use gesture::{GestureEvent, GestureRecognizer, PointerSample, VelocityTracker};
pub use haptics::{HapticDriver, HapticError, HapticKind, Haptics, NoopHaptics};
pub use node::{CanvasNode, NodeKind};
pub use review::{DeckCursor, Flashcard, ReviewSession, ReviewStats};
pub use scheduler::{Scheduler, TaskId};
pub use swipe::{
    CardOutcome, SwipeClassifier, SwipeDirection, SwipeMode, SwipeRelease, SwipeResolution,
    SwipeableCard,
};
