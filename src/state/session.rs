//! Run lifecycle: wires the tracker, the audio transport, the judgment
//! engine and the game state together.

use super::game::{GameState, JudgeEvent, JudgeKind, JudgmentEngine};
use super::{Snapshot, Status, Transition};
use crate::error::SessionError;
use crate::logic::audio::AudioTransport;
use crate::logic::clock::SongClock;
use crate::logic::haptics::HapticFeedback;
use crate::models::chart::{ChartParams, generate_chart, generate_chart_with};
use crate::models::engine::{HitZone, Note};
use crate::models::settings::{Difficulty, GameSettings, Theme};
use crate::shared::snapshot::{GameplaySnapshot, RenderState};
use crate::tracking::{TrackerEvent, TrackerHandle};
use crossbeam_channel::Receiver;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::sync::Arc;

pub struct SessionController {
    game: GameState,
    engine: JudgmentEngine,
    clock: SongClock,
    transport: Box<dyn AudioTransport>,
    tracker: Arc<TrackerHandle>,
    tracker_events: Receiver<TrackerEvent>,
    settings: GameSettings,
    /// Where difficulty and theme changes are persisted. `None` keeps them in memory.
    settings_path: Option<PathBuf>,
    /// Judge events since the last `frame_end`.
    last_events: Vec<JudgeEvent>,
    notice: Option<String>,
}

impl SessionController {
    pub fn new(
        settings: GameSettings,
        settings_path: Option<PathBuf>,
        transport: Box<dyn AudioTransport>,
        tracker: Arc<TrackerHandle>,
        tracker_events: Receiver<TrackerEvent>,
        haptics: Box<dyn HapticFeedback>,
    ) -> Self {
        log::info!(
            "SESSION: Initializing ({}, {})",
            settings.difficulty.settings().label,
            settings.theme.palette().label
        );
        Self {
            game: GameState::new(haptics),
            engine: JudgmentEngine::new(HitZone::with_radius(settings.hit_radius)),
            clock: SongClock::new(),
            transport,
            tracker,
            tracker_events,
            settings,
            settings_path,
            last_events: Vec::new(),
            notice: None,
        }
    }

    pub fn status(&self) -> Status {
        self.game.status
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn song_time(&self) -> f64 {
        self.clock.time()
    }

    pub fn chart(&self) -> &[Note] {
        self.engine.chart()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Leaves `Loading` once the tracker is up; keeps its failure as a notice.
    fn handle_tracker_events(&mut self) {
        while let Ok(event) = self.tracker_events.try_recv() {
            match event {
                TrackerEvent::Ready => log::debug!("SESSION: Tracker ready"),
                TrackerEvent::Failed(message) => self.notice = Some(message),
            }
        }
        if self.game.status == Status::Loading && self.tracker.is_ready() {
            log::info!("SESSION: Ready to play");
            self.game.status = Status::Idle;
        }
    }

    fn build_chart(&self) -> Vec<Note> {
        let difficulty = self.settings.difficulty;
        match self.settings.chart_seed {
            Some(seed) => generate_chart_with(
                difficulty,
                &ChartParams::default(),
                &mut StdRng::seed_from_u64(seed),
            ),
            None => generate_chart(difficulty),
        }
    }

    /// Starts a fresh run from `Idle`. Does nothing before the tracker is ready.
    ///
    /// The status only becomes `Playing` once the transport confirmed playback.
    pub fn start_game(&mut self) -> Result<(), SessionError> {
        if !self.tracker.is_ready() {
            log::debug!("SESSION: Start ignored, tracker not ready");
            return Ok(());
        }
        if self.game.status != Status::Idle {
            log::debug!("SESSION: Start ignored while {}", self.game.status.label());
            return Ok(());
        }

        self.game.reset();
        let chart = self.build_chart();
        let speed = self.settings.difficulty.settings().speed;
        log::info!(
            "SESSION: Generated {} notes ({})",
            chart.len(),
            self.settings.difficulty.settings().label
        );
        self.engine.bind(chart, speed);
        self.last_events.clear();
        self.notice = None;

        self.transport.seek(0.0);
        // Drop an end-of-track left over from the previous run.
        self.transport.take_track_ended();
        if let Err(e) = self.transport.play() {
            log::warn!("SESSION: Playback did not start: {}", e);
            self.notice = Some(format!("Could not start the music: {}", e));
            self.engine.clear();
            return Err(e.into());
        }

        self.clock.reset(0.0);
        self.clock.start();
        self.game.status = Status::Playing;
        log::info!("SESSION: Run started");
        Ok(())
    }

    /// Playing to Paused and back, keeping audio and song clock in lockstep.
    pub fn toggle_pause(&mut self) -> Result<(), SessionError> {
        match self.game.status {
            Status::Playing => {
                self.transport.pause();
                self.clock.pause(self.transport.current_time());
                self.game.status = Status::Paused;
                log::info!("SESSION: Paused at {:.2}s", self.clock.time());
            }
            Status::Paused => {
                if let Err(e) = self.transport.play() {
                    log::warn!("SESSION: Resume failed: {}", e);
                    self.notice = Some(format!("Could not resume the music: {}", e));
                    return Err(e.into());
                }
                self.notice = None;
                self.clock.start();
                self.game.status = Status::Playing;
                log::info!("SESSION: Resumed at {:.2}s", self.clock.time());
            }
            _ => {}
        }
        Ok(())
    }

    /// Abandons the current run.
    pub fn quit_game(&mut self) {
        if matches!(self.game.status, Status::Playing | Status::Paused) {
            log::info!("SESSION: Run abandoned");
            self.rewind();
            self.game.status = Status::Idle;
        }
    }

    /// Leaves the results of a finished run.
    pub fn reboot(&mut self) {
        if self.game.status.is_finished() {
            self.rewind();
            self.game.status = Status::Idle;
        }
    }

    fn rewind(&mut self) {
        self.transport.pause();
        self.transport.seek(0.0);
        self.clock.reset(0.0);
        self.engine.clear();
        self.last_events.clear();
    }

    fn ensure_configurable(&self) -> Result<(), SessionError> {
        match self.game.status {
            Status::Idle => Ok(()),
            status => Err(SessionError::SessionInProgress(status)),
        }
    }

    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> Result<(), SessionError> {
        self.ensure_configurable()?;
        self.settings.difficulty = difficulty;
        log::info!("SESSION: Difficulty {}", difficulty.settings().label);
        self.persist_settings();
        Ok(())
    }

    pub fn select_theme(&mut self, theme: Theme) -> Result<(), SessionError> {
        self.ensure_configurable()?;
        self.settings.theme = theme;
        log::info!("SESSION: Theme {}", theme.palette().label);
        self.persist_settings();
        Ok(())
    }

    fn persist_settings(&self) {
        if let Some(path) = &self.settings_path
            && let Err(e) = self.settings.save(path)
        {
            log::warn!("SESSION: Settings not saved: {}", e);
        }
    }

    /// One logic tick.
    pub fn update(&mut self, dt: f64) {
        self.handle_tracker_events();
        if self.game.status != Status::Playing {
            return;
        }

        let now = self.clock.advance(dt, self.transport.current_time());
        let hands = self.tracker.hands();
        let events = self.engine.tick(now, &hands);
        for event in &events {
            match event.kind {
                JudgeKind::Hit { good_cut } => self.game.on_hit(&event.note, good_cut),
                JudgeKind::Miss => self.game.on_miss(&event.note),
            }
        }
        self.last_events.extend(events);

        if self.transport.take_track_ended() {
            self.game.queue(Transition::Victory);
        }

        if let Some(transition) = self.game.flush_pending() {
            self.transport.pause();
            self.clock.pause(now);
            self.log_summary(transition);
        }
    }

    fn log_summary(&self, transition: Transition) {
        let stats = &self.game.hit_stats;
        log::info!(
            "SESSION: {:?} at {:.2}s: score {} max combo {} accuracy {:.1}% ({} good cut / {} hit / {} miss)",
            transition,
            self.clock.time(),
            self.game.score,
            self.game.max_combo,
            stats.calculate_accuracy(),
            stats.good_cut,
            stats.hit,
            stats.miss
        );
    }

    /// Called once a snapshot of the frame reached the presenter. Judge
    /// events accumulate until then.
    pub fn frame_end(&mut self) {
        self.last_events.clear();
    }

    /// Stops playback for application exit.
    pub fn shutdown(&mut self) {
        log::info!("SESSION: Shutting down");
        self.transport.pause();
        self.transport.seek(0.0);
    }
}

impl Snapshot for SessionController {
    type Output = RenderState;

    fn create_snapshot(&self) -> RenderState {
        if self.game.status == Status::Loading {
            return RenderState::Loading {
                error: self.tracker.error(),
            };
        }

        let now = self.clock.time();
        RenderState::Session(GameplaySnapshot {
            status: self.game.status,
            audio_time: now,
            hands: self.tracker.hands(),
            visible_notes: self.engine.visible_notes(now),
            note_speed: self.engine.speed(),
            palette: self.settings.theme.palette(),
            difficulty: self.settings.difficulty,
            score: self.game.score,
            combo: self.game.combo,
            max_combo: self.game.max_combo,
            multiplier: self.game.multiplier,
            health: self.game.health,
            hit_stats: self.game.hit_stats.clone(),
            notes_left: self.engine.remaining(),
            last_events: self.last_events.clone(),
            notice: self.notice.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlaybackError;
    use crate::logic::haptics::NoHaptics;
    use crossbeam_channel::unbounded;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Deck {
        time: f64,
        playing: bool,
        fail_play: bool,
        ended: bool,
        plays: u32,
        seeks: Vec<f64>,
    }

    /// Transport whose time only moves when the test says so.
    struct ManualTransport(Arc<Mutex<Deck>>);

    impl AudioTransport for ManualTransport {
        fn current_time(&self) -> f64 {
            self.0.lock().time
        }

        fn seek(&mut self, position_secs: f64) {
            let mut deck = self.0.lock();
            deck.time = position_secs;
            deck.seeks.push(position_secs);
        }

        fn play(&mut self) -> Result<(), PlaybackError> {
            let mut deck = self.0.lock();
            if deck.fail_play {
                return Err(PlaybackError::Blocked("autoplay denied".to_string()));
            }
            deck.plays += 1;
            deck.playing = true;
            Ok(())
        }

        fn pause(&mut self) {
            self.0.lock().playing = false;
        }

        fn take_track_ended(&mut self) -> bool {
            std::mem::take(&mut self.0.lock().ended)
        }
    }

    struct Rig {
        session: SessionController,
        deck: Arc<Mutex<Deck>>,
        tracker: Arc<TrackerHandle>,
    }

    fn rig() -> Rig {
        let deck = Arc::new(Mutex::new(Deck::default()));
        let (tx, rx) = unbounded();
        let tracker = Arc::new(TrackerHandle::new(tx));
        let settings = GameSettings {
            chart_seed: Some(1),
            ..GameSettings::default()
        };
        let session = SessionController::new(
            settings,
            None,
            Box::new(ManualTransport(deck.clone())),
            tracker.clone(),
            rx,
            Box::new(NoHaptics),
        );
        Rig {
            session,
            deck,
            tracker,
        }
    }

    fn ready_rig() -> Rig {
        let mut rig = rig();
        rig.tracker.mark_ready();
        rig.session.update(0.0);
        assert_eq!(rig.session.status(), Status::Idle);
        rig
    }

    fn playing_rig() -> Rig {
        let mut rig = ready_rig();
        rig.session.start_game().unwrap();
        assert_eq!(rig.session.status(), Status::Playing);
        rig
    }

    #[test]
    fn test_start_before_ready_is_a_noop() {
        let mut rig = rig();
        rig.session.start_game().unwrap();
        rig.session.update(0.1);
        assert_eq!(rig.session.status(), Status::Loading);
        assert_eq!(rig.deck.lock().plays, 0);
        assert!(rig.session.chart().is_empty());
    }

    #[test]
    fn test_tracker_failure_keeps_loading_with_message() {
        let mut rig = rig();
        rig.tracker.fail("camera denied".to_string());
        rig.session.update(0.1);
        assert_eq!(rig.session.status(), Status::Loading);
        assert_eq!(rig.session.notice(), Some("camera denied"));
        match rig.session.create_snapshot() {
            RenderState::Loading { error } => assert_eq!(error.as_deref(), Some("camera denied")),
            other => panic!("unexpected snapshot {:?}", other),
        }
    }

    #[test]
    fn test_start_resets_and_plays_from_zero() {
        let rig = playing_rig();
        let deck = rig.deck.lock();
        assert!(deck.playing);
        assert_eq!(deck.seeks, vec![0.0]);
        assert!(!rig.session.chart().is_empty());
        assert_eq!(rig.session.game().score, 0);
        assert_eq!(rig.session.song_time(), 0.0);
    }

    #[test]
    fn test_failed_playback_stays_idle() {
        let mut rig = ready_rig();
        rig.deck.lock().fail_play = true;
        let result = rig.session.start_game();
        assert!(matches!(result, Err(SessionError::Playback(PlaybackError::Blocked(_)))));
        assert_eq!(rig.session.status(), Status::Idle);
        assert!(rig.session.notice().is_some());

        rig.deck.lock().fail_play = false;
        rig.session.start_game().unwrap();
        assert_eq!(rig.session.status(), Status::Playing);
        assert!(rig.session.notice().is_none());
    }

    #[test]
    fn test_pause_resume_is_continuous() {
        let mut rig = playing_rig();
        rig.deck.lock().time = 1.0;
        rig.session.update(0.5);
        assert_eq!(rig.session.song_time(), 1.0);

        rig.session.toggle_pause().unwrap();
        assert_eq!(rig.session.status(), Status::Paused);
        assert!(!rig.deck.lock().playing);
        for _ in 0..10 {
            rig.session.update(0.5);
        }
        assert_eq!(rig.session.song_time(), 1.0);
        assert!(rig.session.game().hit_stats.judged() == 0);

        rig.session.toggle_pause().unwrap();
        assert_eq!(rig.session.status(), Status::Playing);
        rig.deck.lock().time = 1.01;
        rig.session.update(0.01);
        assert!((rig.session.song_time() - 1.01).abs() < 1e-9);
    }

    #[test]
    fn test_track_end_is_victory() {
        let mut rig = playing_rig();
        rig.deck.lock().ended = true;
        rig.session.update(0.01);
        assert_eq!(rig.session.status(), Status::Victory);
        assert!(!rig.deck.lock().playing);

        rig.session.start_game().unwrap();
        assert_eq!(rig.session.status(), Status::Victory);
        rig.session.reboot();
        assert_eq!(rig.session.status(), Status::Idle);
    }

    #[test]
    fn test_health_depletion_ends_after_update() {
        let mut rig = playing_rig();
        // Jump far ahead: every note up to here passes unhit in one tick.
        rig.deck.lock().time = 60.0;
        rig.session.update(0.01);

        assert_eq!(rig.session.status(), Status::GameOver);
        let game = rig.session.game();
        assert_eq!(game.health, 0);
        assert_eq!(game.hit_stats.miss, 7);
        assert!(!rig.deck.lock().playing);
        match rig.session.create_snapshot() {
            RenderState::Session(snapshot) => {
                assert!(snapshot.last_events.len() > 7);
                assert_eq!(snapshot.status, Status::GameOver);
            }
            other => panic!("unexpected snapshot {:?}", other),
        }
        rig.session.frame_end();
    }

    fn gameplay(rig: &Rig) -> GameplaySnapshot {
        match rig.session.create_snapshot() {
            RenderState::Session(snapshot) => snapshot,
            other => panic!("unexpected snapshot {:?}", other),
        }
    }

    #[test]
    fn test_judge_events_kept_until_frame_end() {
        let mut rig = playing_rig();
        assert_eq!(gameplay(&rig).notes_left, rig.session.chart().len());

        rig.deck.lock().time = 60.0;
        rig.session.update(0.01);
        let first = gameplay(&rig);
        assert!(!first.last_events.is_empty());
        assert!(first.notes_left < rig.session.chart().len());

        // Snapshot not delivered: the next frame still carries the events.
        rig.session.update(0.01);
        assert_eq!(gameplay(&rig).last_events.len(), first.last_events.len());

        rig.session.frame_end();
        assert!(gameplay(&rig).last_events.is_empty());
    }

    #[test]
    fn test_quit_rewinds_to_idle() {
        let mut rig = playing_rig();
        rig.deck.lock().time = 2.0;
        rig.session.update(0.01);
        rig.session.quit_game();
        assert_eq!(rig.session.status(), Status::Idle);
        let deck = rig.deck.lock();
        assert!(!deck.playing);
        assert_eq!(deck.time, 0.0);
        assert_eq!(rig.session.song_time(), 0.0);
    }

    #[test]
    fn test_selection_only_between_runs() {
        let mut rig = playing_rig();
        let result = rig.session.select_difficulty(Difficulty::Hard);
        assert!(matches!(
            result,
            Err(SessionError::SessionInProgress(Status::Playing))
        ));
        assert!(rig.session.select_theme(Theme::Matrix).is_err());

        rig.session.quit_game();
        rig.session.select_difficulty(Difficulty::Hard).unwrap();
        rig.session.select_theme(Theme::Matrix).unwrap();
        assert_eq!(rig.session.settings().difficulty, Difficulty::Hard);
        assert_eq!(rig.session.settings().theme, Theme::Matrix);
    }

    #[test]
    fn test_selection_rejected_while_loading() {
        let mut rig = rig();
        let before = rig.session.settings().clone();
        assert!(matches!(
            rig.session.select_difficulty(Difficulty::Hard),
            Err(SessionError::SessionInProgress(Status::Loading))
        ));
        assert!(matches!(
            rig.session.select_theme(Theme::Matrix),
            Err(SessionError::SessionInProgress(Status::Loading))
        ));
        assert_eq!(rig.session.settings().difficulty, before.difficulty);
        assert_eq!(rig.session.settings().theme, before.theme);
    }
}
