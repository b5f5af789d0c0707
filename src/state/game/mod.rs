//! Score, combo, multiplier and health for one run.
//!
//! The `GameState` reacts to judge events. A miss that empties the health bar
//! does not change the status itself: it queues a [`Transition::GameOver`]
//! which the session applies with [`GameState::flush_pending`] once the
//! current update has finished.

pub mod judgment;

pub use judgment::{JudgeEvent, JudgeKind, JudgmentEngine};

use super::{Status, Transition};
use crate::logic::haptics::{GOOD_CUT_PULSE, HIT_PULSE, HapticFeedback};
use crate::models::engine::Note;
use crate::models::stats::{HitStats, Judgement};

pub const MAX_HEALTH: u32 = 100;
/// Base points for any hit.
pub const HIT_POINTS: u32 = 100;
/// Extra points for a good cut.
pub const GOOD_CUT_BONUS: u32 = 50;
pub const HIT_HEAL: u32 = 2;
pub const MISS_DAMAGE: u32 = 15;

/// Score multiplier for a combo count.
pub fn multiplier_for(combo: u32) -> u32 {
    match combo {
        c if c > 30 => 8,
        c if c > 20 => 4,
        c if c > 10 => 2,
        _ => 1,
    }
}

pub struct GameState {
    pub status: Status,
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub multiplier: u32,
    /// 0 to [`MAX_HEALTH`].
    pub health: u32,
    pub hit_stats: HitStats,
    /// Follow-up transition queued during an update.
    pending: Option<Transition>,
    haptics: Box<dyn HapticFeedback>,
}

impl GameState {
    pub fn new(haptics: Box<dyn HapticFeedback>) -> Self {
        Self {
            status: Status::Loading,
            score: 0,
            combo: 0,
            max_combo: 0,
            multiplier: 1,
            health: MAX_HEALTH,
            hit_stats: HitStats::new(),
            pending: None,
            haptics,
        }
    }

    /// Back to the values of a fresh run. Status is left untouched.
    pub fn reset(&mut self) {
        self.score = 0;
        self.combo = 0;
        self.max_combo = 0;
        self.multiplier = 1;
        self.health = MAX_HEALTH;
        self.hit_stats = HitStats::new();
        self.pending = None;
    }

    /// Whether judge events still affect this run.
    fn accepts_events(&self) -> bool {
        self.status == Status::Playing && self.pending.is_none()
    }

    pub fn on_hit(&mut self, note: &Note, good_cut: bool) {
        if !self.accepts_events() {
            return;
        }

        let points = if good_cut {
            HIT_POINTS + GOOD_CUT_BONUS
        } else {
            HIT_POINTS
        };
        self.haptics
            .vibrate(if good_cut { GOOD_CUT_PULSE } else { HIT_PULSE });

        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.multiplier = multiplier_for(self.combo);
        self.score += points * self.multiplier;
        self.health = (self.health + HIT_HEAL).min(MAX_HEALTH);
        self.hit_stats.record(if good_cut {
            Judgement::GoodCut
        } else {
            Judgement::Hit
        });

        log::debug!(
            "GAME: Hit note {} (good cut: {}) combo {} x{}",
            note.id,
            good_cut,
            self.combo,
            self.multiplier
        );
    }

    pub fn on_miss(&mut self, note: &Note) {
        if !self.accepts_events() {
            return;
        }

        self.combo = 0;
        self.multiplier = 1;
        self.health = self.health.saturating_sub(MISS_DAMAGE);
        self.hit_stats.record(Judgement::Miss);
        log::debug!("GAME: Missed note {} health {}", note.id, self.health);

        if self.health == 0 {
            log::info!("GAME: Health depleted, game over queued");
            self.pending = Some(Transition::GameOver);
        }
    }

    /// Queues an end-of-run transition unless one is already waiting.
    pub fn queue(&mut self, transition: Transition) {
        if self.status == Status::Playing && self.pending.is_none() {
            self.pending = Some(transition);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Applies the queued transition, if any. Returns the applied transition.
    pub fn flush_pending(&mut self) -> Option<Transition> {
        let transition = self.pending.take()?;
        if self.status != Status::Playing {
            return None;
        }
        self.status = match transition {
            Transition::GameOver => Status::GameOver,
            Transition::Victory => Status::Victory,
        };
        Some(transition)
    }
}
