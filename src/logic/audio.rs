//! Audio transport: the music clock the whole game is judged against.
//!
//! [`AudioManager`] drives the dedicated audio thread through commands;
//! [`ClockTransport`] stands in when no track is configured.

use crate::error::PlaybackError;
use crate::system::bus::{AudioCommand, AudioEvent, SystemBus};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How long `play()` waits for the audio thread to confirm playback.
const PLAY_TIMEOUT: Duration = Duration::from_millis(1500);

/// Playback transport consumed by the session.
///
/// Everything except `play` takes effect immediately from the caller's point
/// of view; `play` may fail and is only considered done once it returns.
pub trait AudioTransport: Send {
    /// Playback position in seconds.
    fn current_time(&self) -> f64;

    /// Moves the playback position (seconds).
    fn seek(&mut self, position_secs: f64);

    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// `true` once per playthrough, after the track reached its end.
    fn take_track_ended(&mut self) -> bool;
}

/// Sends commands to the audio thread and reads its position counters.
pub struct AudioManager {
    cmd_tx: Sender<AudioCommand>,
    event_rx: Receiver<AudioEvent>,
    position: Arc<AtomicU64>,
    sample_rate: Arc<AtomicU64>,
    channels: Arc<AtomicU64>,
}

impl AudioManager {
    pub fn new(bus: &SystemBus) -> Self {
        Self {
            cmd_tx: bus.audio_cmd_tx.clone(),
            event_rx: bus.audio_evt_rx.clone(),
            position: bus.audio_position.clone(),
            sample_rate: bus.audio_sample_rate.clone(),
            channels: bus.audio_channels.clone(),
        }
    }

    pub fn load_music(&mut self, path: &Path) {
        let _ = self.cmd_tx.send(AudioCommand::Load {
            path: path.to_path_buf(),
        });
    }

    /// Sets the master volume (0.0 to 1.0).
    pub fn set_volume(&mut self, volume: f32) {
        let _ = self.cmd_tx.send(AudioCommand::SetVolume {
            volume: volume.clamp(0.0, 1.0),
        });
    }

    fn samples_per_second(&self) -> f64 {
        let sample_rate = self.sample_rate.load(Ordering::Relaxed).max(1) as f64;
        let channels = self.channels.load(Ordering::Relaxed).max(1) as f64;
        sample_rate * channels
    }
}

impl AudioTransport for AudioManager {
    fn current_time(&self) -> f64 {
        self.position.load(Ordering::Relaxed) as f64 / self.samples_per_second()
    }

    fn seek(&mut self, position_secs: f64) {
        let position_secs = position_secs.max(0.0);
        // Reflect the new position right away; the audio thread confirms it
        // once the source is reloaded.
        self.position.store(
            (position_secs * self.samples_per_second()) as u64,
            Ordering::Relaxed,
        );
        let _ = self.cmd_tx.send(AudioCommand::Seek {
            position_secs: position_secs as f32,
        });
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let (reply, answer) = bounded(1);
        self.cmd_tx
            .send(AudioCommand::Play { reply })
            .map_err(|_| PlaybackError::Disconnected)?;
        let err = match answer.recv_timeout(PLAY_TIMEOUT) {
            Ok(result) => return result,
            Err(RecvTimeoutError::Timeout) => PlaybackError::Timeout,
            Err(RecvTimeoutError::Disconnected) => PlaybackError::Disconnected,
        };
        // The Play may still be queued; make sure it cannot start the track.
        let _ = self.cmd_tx.send(AudioCommand::Pause);
        Err(err)
    }

    fn pause(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Pause);
    }

    fn take_track_ended(&mut self) -> bool {
        self.event_rx
            .try_iter()
            .fold(false, |ended, evt| ended || evt == AudioEvent::TrackEnded)
    }
}

/// Silent transport keeping time with the wall clock over a fixed length.
pub struct ClockTransport {
    length_secs: f64,
    base_secs: f64,
    started: Option<Instant>,
    ended_reported: bool,
}

impl ClockTransport {
    pub fn new(length_secs: f64) -> Self {
        Self {
            length_secs: length_secs.max(0.0),
            base_secs: 0.0,
            started: None,
            ended_reported: false,
        }
    }
}

impl AudioTransport for ClockTransport {
    fn current_time(&self) -> f64 {
        let running = self
            .started
            .map(|s| s.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (self.base_secs + running).min(self.length_secs)
    }

    fn seek(&mut self, position_secs: f64) {
        self.base_secs = position_secs.clamp(0.0, self.length_secs);
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
        self.ended_reported = false;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
        Ok(())
    }

    fn pause(&mut self) {
        self.base_secs = self.current_time();
        self.started = None;
    }

    fn take_track_ended(&mut self) -> bool {
        if self.ended_reported || self.started.is_none() {
            return false;
        }
        if self.current_time() >= self.length_secs {
            self.ended_reported = true;
            return true;
        }
        false
    }
}
