//! State management module.
//!
//! - `GameState` - score, combo and health of one run
//! - `JudgmentEngine` - hand/note interception
//! - `SessionController` - owns the above and drives the run lifecycle

pub mod game;
pub mod session;

pub use session::SessionController;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Waiting for the tracker to come up.
    Loading,
    Idle,
    Playing,
    Paused,
    GameOver,
    Victory,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Loading => "loading",
            Status::Idle => "idle",
            Status::Playing => "playing",
            Status::Paused => "paused",
            Status::GameOver => "game over",
            Status::Victory => "victory",
        }
    }

    /// A run has ended and its results are on display.
    pub fn is_finished(self) -> bool {
        matches!(self, Status::GameOver | Status::Victory)
    }
}

/// End-of-run transition queued during an update and applied after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    GameOver,
    Victory,
}

/// Trait for creating render-ready snapshots.
///
/// Snapshots are immutable captures of state sent to the render thread.
pub trait Snapshot {
    type Output;

    fn create_snapshot(&self) -> Self::Output;
}
