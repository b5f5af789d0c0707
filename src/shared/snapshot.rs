//! Render snapshots for inter-thread communication.
//!
//! Snapshots are immutable captures of game state sent from the logic thread
//! to the render thread. This decouples game logic from rendering.

use crate::models::settings::{Difficulty, ThemePalette};
use crate::models::stats::HitStats;
use crate::state::Status;
use crate::state::game::JudgeEvent;
use crate::state::game::judgment::NotePlacement;
use crate::tracking::HandFrame;
use std::sync::Arc;

/// High-level render state.
#[derive(Clone, Debug)]
pub enum RenderState {
    /// Tracker not ready yet. Carries the initialization failure, if any.
    Loading { error: Option<String> },
    /// Any state once the tracker is up.
    Session(GameplaySnapshot),
}

/// Snapshot of gameplay state for rendering.
#[derive(Clone, Debug)]
pub struct GameplaySnapshot {
    pub status: Status,
    /// Song clock in seconds.
    pub audio_time: f64,
    pub hands: Arc<HandFrame>,
    /// Spawned notes with their world positions at `audio_time`.
    pub visible_notes: Vec<NotePlacement>,
    /// Note travel speed in units/s.
    pub note_speed: f32,
    pub palette: &'static ThemePalette,
    pub difficulty: Difficulty,

    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub multiplier: u32,
    pub health: u32,
    pub hit_stats: HitStats,
    /// Notes of the chart not yet hit or missed.
    pub notes_left: usize,
    /// Judge events of the latest update.
    pub last_events: Vec<JudgeEvent>,
    /// Message for the player, e.g. why playback did not start.
    pub notice: Option<String>,
}
