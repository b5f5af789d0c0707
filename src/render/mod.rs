//! Headless presenter: turns render snapshots into console output.
//!
//! Only changes are reported (status, notices, judge events) so the log stays
//! readable at the logic thread's tick rate.

use crate::shared::snapshot::{GameplaySnapshot, RenderState};
use crate::state::Status;
use crate::state::game::JudgeKind;
use crate::system::bus::SystemBus;
use crossbeam_channel::RecvTimeoutError;
use std::time::Duration;

/// How often the presenter checks for shutdown while no snapshot arrives.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Default)]
pub struct ConsolePresenter {
    last_status: Option<Status>,
    last_error: Option<String>,
    last_notice: Option<String>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines worth printing for this snapshot.
    pub fn present(&mut self, state: &RenderState) -> Vec<String> {
        match state {
            RenderState::Loading { error } => {
                let mut lines = Vec::new();
                if self.last_status.is_none() && self.last_error.is_none() && error.is_none() {
                    lines.push("Waiting for hand tracking...".to_string());
                    self.last_status = Some(Status::Loading);
                }
                if error.is_some() && *error != self.last_error {
                    if let Some(message) = error {
                        lines.push(format!("Hand tracking failed: {}", message));
                    }
                    self.last_error = error.clone();
                }
                lines
            }
            RenderState::Session(snapshot) => self.present_session(snapshot),
        }
    }

    fn present_session(&mut self, snapshot: &GameplaySnapshot) -> Vec<String> {
        let mut lines = Vec::new();

        for event in &snapshot.last_events {
            let verdict = match event.kind {
                JudgeKind::Hit { good_cut: true } => "GOOD CUT",
                JudgeKind::Hit { good_cut: false } => "HIT",
                JudgeKind::Miss => "MISS",
            };
            log::debug!(
                "RENDER: {:>7.2}s note {:>3} {}",
                event.time,
                event.note.id,
                verdict
            );
        }

        if self.last_status != Some(snapshot.status) {
            self.last_status = Some(snapshot.status);
            lines.push(status_line(snapshot));
        }

        if snapshot.notice != self.last_notice {
            if let Some(notice) = &snapshot.notice {
                lines.push(format!("! {}", notice));
            }
            self.last_notice = snapshot.notice.clone();
        }

        lines
    }

    /// Blocks until shutdown, printing snapshots as they arrive.
    pub fn run(bus: SystemBus) {
        log::info!("RENDER: Console presenter started");
        let mut presenter = ConsolePresenter::new();

        while !bus.is_shutting_down() {
            match bus.render_rx.recv_timeout(POLL_INTERVAL) {
                Ok(state) => {
                    for line in presenter.present(&state) {
                        println!("{}", line);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        log::info!("RENDER: Console presenter stopped");
    }
}

fn status_line(snapshot: &GameplaySnapshot) -> String {
    let label = snapshot.difficulty.settings().label;
    let theme = snapshot.palette.label;
    match snapshot.status {
        Status::Loading => "Waiting for hand tracking...".to_string(),
        Status::Idle => format!("[{} / {}] Ready. Type `start` to play.", label, theme),
        Status::Playing => format!(
            "[{}] Playing at {:.1}s, score {} health {}, {} notes left",
            label, snapshot.audio_time, snapshot.score, snapshot.health, snapshot.notes_left
        ),
        Status::Paused => format!("[{}] Paused at {:.1}s", label, snapshot.audio_time),
        Status::GameOver | Status::Victory => format!(
            "[{}] {}! score {} max combo {} accuracy {:.1}%. Type `reboot` to continue.",
            label,
            snapshot.status.label().to_uppercase(),
            snapshot.score,
            snapshot.max_combo,
            snapshot.hit_stats.calculate_accuracy()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::{Difficulty, Theme};
    use crate::models::stats::HitStats;
    use crate::tracking::HandFrame;
    use std::sync::Arc;

    fn snapshot(status: Status) -> GameplaySnapshot {
        GameplaySnapshot {
            status,
            audio_time: 0.0,
            hands: Arc::new(HandFrame::default()),
            visible_notes: Vec::new(),
            note_speed: 14.0,
            palette: Theme::Neon.palette(),
            difficulty: Difficulty::Medium,
            score: 0,
            combo: 0,
            max_combo: 0,
            multiplier: 1,
            health: 100,
            hit_stats: HitStats::new(),
            notes_left: 0,
            last_events: Vec::new(),
            notice: None,
        }
    }

    #[test]
    fn test_status_changes_are_reported_once() {
        let mut presenter = ConsolePresenter::new();
        let idle = RenderState::Session(snapshot(Status::Idle));
        assert_eq!(presenter.present(&idle).len(), 1);
        assert!(presenter.present(&idle).is_empty());

        let mut playing = snapshot(Status::Playing);
        playing.notes_left = 42;
        let lines = presenter.present(&RenderState::Session(playing));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Playing"));
        assert!(lines[0].contains("42 notes left"));
    }

    #[test]
    fn test_tracking_failure_is_reported() {
        let mut presenter = ConsolePresenter::new();
        let waiting = RenderState::Loading { error: None };
        assert_eq!(presenter.present(&waiting).len(), 1);
        assert!(presenter.present(&waiting).is_empty());

        let failed = RenderState::Loading {
            error: Some("camera denied".to_string()),
        };
        let lines = presenter.present(&failed);
        assert_eq!(lines, vec!["Hand tracking failed: camera denied".to_string()]);
        assert!(presenter.present(&failed).is_empty());
    }

    #[test]
    fn test_notice_is_shown() {
        let mut presenter = ConsolePresenter::new();
        let mut idle = snapshot(Status::Idle);
        presenter.present(&RenderState::Session(idle.clone()));
        idle.notice = Some("Could not start the music".to_string());
        let lines = presenter.present(&RenderState::Session(idle));
        assert_eq!(lines, vec!["! Could not start the music".to_string()]);
    }
}
