//! Shared channel infrastructure between system threads.
//!
//! The `SystemBus` is the one place every thread gets its channels from. It
//! is cheap to clone; every clone talks to the same channels.

use crate::error::PlaybackError;
use crate::input::events::GameAction;
use crate::shared::snapshot::RenderState;
use crate::tracking::TrackerEvent;
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Clone)]
pub enum SystemEvent {
    /// Leave the application.
    Quit,
}

/// Requests handled by the audio thread, in order.
#[derive(Debug, Clone)]
pub enum AudioCommand {
    /// Prepares a track, paused at 0.
    Load { path: PathBuf },
    /// Answers on `reply` once the device accepted or refused playback.
    Play {
        reply: Sender<Result<(), PlaybackError>>,
    },
    Pause,
    /// Keeps the play/pause state.
    Seek { position_secs: f32 },
    SetVolume { volume: f32 },
}

/// Notifications from the audio thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    /// The loaded track played to its end.
    TrackEnded,
}

/// Every channel and shared counter the threads use to talk to each other.
#[derive(Clone)]
pub struct SystemBus {
    /// Player commands for the logic thread.
    pub action_tx: Sender<GameAction>,
    pub action_rx: Receiver<GameAction>,

    /// Snapshots for the presenter. Bounded so a slow presenter drops frames
    /// instead of lagging behind.
    pub render_tx: Sender<RenderState>,
    pub render_rx: Receiver<RenderState>,

    pub sys_tx: Sender<SystemEvent>,
    pub sys_rx: Receiver<SystemEvent>,

    pub audio_cmd_tx: Sender<AudioCommand>,
    pub audio_cmd_rx: Receiver<AudioCommand>,
    pub audio_evt_tx: Sender<AudioEvent>,
    pub audio_evt_rx: Receiver<AudioEvent>,

    /// Tracker readiness and failure, consumed by the session.
    pub tracker_evt_tx: Sender<TrackerEvent>,
    pub tracker_evt_rx: Receiver<TrackerEvent>,

    /// Interleaved samples played so far. Only the audio thread counts;
    /// seeks from the logic thread overwrite it.
    pub audio_position: Arc<AtomicU64>,
    pub audio_sample_rate: Arc<AtomicU64>,
    pub audio_channels: Arc<AtomicU64>,

    /// Raised once when the application is shutting down.
    pub shutdown: Arc<AtomicBool>,
}

/// Snapshots queued for the presenter at most.
const RENDER_QUEUE: usize = 2;

impl SystemBus {
    pub fn new() -> Self {
        let (action_tx, action_rx) = unbounded();
        let (render_tx, render_rx) = bounded(RENDER_QUEUE);
        let (sys_tx, sys_rx) = unbounded();
        let (audio_cmd_tx, audio_cmd_rx) = unbounded();
        let (audio_evt_tx, audio_evt_rx) = unbounded();
        let (tracker_evt_tx, tracker_evt_rx) = unbounded();

        Self {
            action_tx,
            action_rx,
            render_tx,
            render_rx,
            sys_tx,
            sys_rx,
            audio_cmd_tx,
            audio_cmd_rx,
            audio_evt_tx,
            audio_evt_rx,
            tracker_evt_tx,
            tracker_evt_rx,
            audio_position: Arc::new(AtomicU64::new(0)),
            audio_sample_rate: Arc::new(AtomicU64::new(44_100)),
            audio_channels: Arc::new(AtomicU64::new(2)),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}
