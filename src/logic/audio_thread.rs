//! Dedicated audio thread that owns the output device.
//!
//! Keeps file decoding and seeking off the logic thread. Position is counted in
//! samples into shared atomics; the end of the track is reported once per
//! playthrough on the bus.

use crate::error::PlaybackError;
use crate::system::bus::{AudioCommand, AudioEvent, SystemBus};
use crossbeam_channel::{RecvTimeoutError, Sender};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// Interval at which the player checks for the end of the track.
const END_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// The configured track, as far as it could be prepared.
enum Track {
    None,
    Ready(Sink),
    /// Why the file could not be turned into a sink.
    Broken(String),
}

struct TrackPlayer {
    device: Option<(OutputStream, OutputStreamHandle)>,
    path: Option<PathBuf>,
    track: Track,
    volume: f32,
    playing: bool,
    bus: SystemBus,
}

impl TrackPlayer {
    fn new(bus: SystemBus) -> Self {
        let device = OutputStream::try_default()
            .inspect(|_| log::info!("AUDIO: Output device ready"))
            .inspect_err(|e| log::warn!("AUDIO: No output device ({}), playback will fail", e))
            .ok();

        Self {
            device,
            path: None,
            track: Track::None,
            volume: 1.0,
            playing: false,
            bus,
        }
    }

    fn sink(&self) -> Option<&Sink> {
        match &self.track {
            Track::Ready(sink) => Some(sink),
            _ => None,
        }
    }

    fn handle(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::Load { path } => {
                self.path = Some(path);
                self.playing = false;
                self.prepare(0.0);
            }
            AudioCommand::Play { reply } => {
                let result = self.play();
                if let Err(e) = &result {
                    log::warn!("AUDIO: Play failed: {}", e);
                }
                let started = result.is_ok();
                if !deliver_play_answer(&reply, result) && started {
                    log::warn!("AUDIO: Play answer not delivered, pausing");
                    self.pause();
                }
            }
            AudioCommand::Pause => self.pause(),
            AudioCommand::Seek { position_secs } => {
                let resume = self.playing;
                self.prepare(position_secs);
                self.playing = resume && self.sink().inspect(|sink| sink.play()).is_some();
            }
            AudioCommand::SetVolume { volume } => {
                self.volume = volume;
                if let Some(sink) = self.sink() {
                    sink.set_volume(volume);
                }
            }
        }
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.device.is_none() {
            return Err(PlaybackError::NoDevice);
        }
        match &self.track {
            Track::Ready(sink) => {
                sink.play();
                self.playing = true;
                Ok(())
            }
            Track::Broken(reason) => Err(PlaybackError::Blocked(reason.clone())),
            Track::None => Err(PlaybackError::NoTrack),
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink() {
            sink.pause();
        }
        self.playing = false;
    }

    /// Reports the end of the track once per playthrough.
    fn poll_end(&mut self) {
        if self.playing && self.sink().is_some_and(Sink::empty) {
            self.playing = false;
            log::info!("AUDIO: Track ended");
            let _ = self.bus.audio_evt_tx.send(AudioEvent::TrackEnded);
        }
    }

    fn release(&mut self) {
        if let Track::Ready(sink) = std::mem::replace(&mut self.track, Track::None) {
            sink.stop();
        }
    }

    /// Rebuilds the sink paused at `position_secs`.
    fn prepare(&mut self, position_secs: f32) {
        self.release();
        let (Some((_, handle)), Some(path)) = (&self.device, &self.path) else {
            return;
        };
        let position_secs = position_secs.max(0.0);

        self.track = match open_at(path, handle, position_secs, &self.bus) {
            Ok(sink) => {
                sink.set_volume(self.volume);
                log::info!("AUDIO: Loaded {:?} at {:.1}s", path, position_secs);
                Track::Ready(sink)
            }
            Err(reason) => {
                log::error!("AUDIO: {}", reason);
                Track::Broken(reason)
            }
        };
    }
}

/// Returns `false` when the caller stopped waiting for the answer.
fn deliver_play_answer(
    reply: &Sender<Result<(), PlaybackError>>,
    result: Result<(), PlaybackError>,
) -> bool {
    reply.send(result).is_ok()
}

/// Decodes `path`, skips to `position_secs` and queues it on a paused sink.
/// Publishes the stream format and start position to the bus.
fn open_at(
    path: &Path,
    handle: &OutputStreamHandle,
    position_secs: f32,
    bus: &SystemBus,
) -> Result<Sink, String> {
    let file = File::open(path).map_err(|e| format!("Cannot open {:?}: {}", path, e))?;
    let source =
        Decoder::new(BufReader::new(file)).map_err(|e| format!("Cannot decode {:?}: {}", path, e))?;

    let sample_rate = source.sample_rate() as u64;
    let channels = source.channels() as u64;
    bus.audio_sample_rate.store(sample_rate, Ordering::Relaxed);
    bus.audio_channels.store(channels, Ordering::Relaxed);
    let skipped = (position_secs as f64 * (sample_rate * channels) as f64) as u64;
    bus.audio_position.store(skipped, Ordering::Relaxed);

    let sink = Sink::try_new(handle).map_err(|e| format!("Cannot create sink: {}", e))?;
    sink.pause();
    sink.append(SampleCounter {
        inner: source.skip_duration(Duration::from_secs_f32(position_secs)),
        counter: bus.audio_position.clone(),
    });
    Ok(sink)
}

/// Counts samples as the device pulls them.
struct SampleCounter<I> {
    inner: I,
    counter: Arc<AtomicU64>,
}

impl<I: Iterator> Iterator for SampleCounter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let sample = self.inner.next()?;
        self.counter.fetch_add(1, Ordering::Relaxed);
        Some(sample)
    }
}

impl<I> Source for SampleCounter<I>
where
    I: Source,
    I::Item: rodio::Sample,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }
}

/// Spawns the audio thread. It exits on shutdown once its queue is drained.
pub fn start_audio_thread(bus: SystemBus) {
    let spawned = thread::Builder::new()
        .name("Audio Thread".to_string())
        .spawn(move || {
            log::info!("AUDIO: Thread started");
            let commands = bus.audio_cmd_rx.clone();
            let mut player = TrackPlayer::new(bus);

            loop {
                match commands.recv_timeout(END_POLL_INTERVAL) {
                    Ok(cmd) => player.handle(cmd),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
                player.poll_end();
                if player.bus.is_shutting_down() && commands.is_empty() {
                    break;
                }
            }

            player.release();
            log::info!("AUDIO: Thread stopped");
        });
    if let Err(e) = spawned {
        log::error!("AUDIO: Failed to spawn audio thread: {}", e);
    }
}
