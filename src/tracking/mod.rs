//! Gesture tracking: the detection loop and its handoff to the logic thread.
//!
//! The detection loop runs on its own thread at the source's cadence and
//! publishes whole [`HandFrame`]s into a [`SnapshotCell`]. The logic tick
//! reads the latest frame without waiting on detection. Readiness and
//! initialization failure are reported once each through [`TrackerEvent`]s.

pub mod cell;
pub mod filter;
pub mod landmarks;
pub mod source;
pub mod tracker;

pub use cell::SnapshotCell;
pub use source::{LandmarkSource, SweepSource, TraceSource};
pub use tracker::{GestureTracker, HandEstimate, HandFrame};

use crate::error::TrackingError;
use crate::models::settings::{TrackingSettings, TrackingSourceKind};
use landmarks::LandmarkFrame;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

/// Frame rate of the synthetic sweep source.
const SWEEP_FPS: f64 = 30.0;

/// Lifecycle notifications of the capture pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    /// The pipeline produces frames. Sent at most once.
    Ready,
    /// The pipeline could not start; the message is meant for the player.
    Failed(String),
}

/// Shared view of the tracker, cloned into every consumer.
pub struct TrackerHandle {
    hands: SnapshotCell<HandFrame>,
    ready: AtomicBool,
    error: Mutex<Option<String>>,
    events: Sender<TrackerEvent>,
}

impl TrackerHandle {
    pub fn new(events: Sender<TrackerEvent>) -> Self {
        Self {
            hands: SnapshotCell::default(),
            ready: AtomicBool::new(false),
            error: Mutex::new(None),
            events,
        }
    }

    /// Latest smoothed hands. Cheap; meant to be called every tick.
    pub fn hands(&self) -> Arc<HandFrame> {
        self.hands.load()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Human-readable initialization failure, if any.
    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    pub fn publish(&self, frame: HandFrame) {
        self.hands.publish(frame);
    }

    pub(crate) fn mark_ready(&self) {
        if !self.ready.swap(true, Ordering::AcqRel) {
            log::info!("TRACKER: Ready");
            let _ = self.events.send(TrackerEvent::Ready);
        }
    }

    pub(crate) fn fail(&self, message: String) {
        log::error!("TRACKER: {}", message);
        *self.error.lock() = Some(message.clone());
        let _ = self.events.send(TrackerEvent::Failed(message));
    }
}

/// Builds the configured landmark source.
pub fn source_from_settings(settings: &TrackingSettings) -> Box<dyn LandmarkSource> {
    match (settings.source, &settings.trace_path) {
        (TrackingSourceKind::Trace, Some(path)) => Box::new(TraceSource::new(path.clone())),
        (TrackingSourceKind::Trace, None) => Box::new(MissingTrace),
        (TrackingSourceKind::Sweep, _) => Box::new(SweepSource::new(SWEEP_FPS)),
    }
}

/// Stand-in for a trace source configured without a path.
struct MissingTrace;

impl LandmarkSource for MissingTrace {
    fn open(&mut self) -> Result<(), TrackingError> {
        Err(TrackingError::SourceUnavailable(
            "tracking.source is \"trace\" but tracking.trace_path is not set".to_string(),
        ))
    }

    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        None
    }
}

/// Runs the detection loop on the calling thread until the source ends or
/// `shutdown` is raised.
pub fn run_detection(
    handle: &TrackerHandle,
    mut source: Box<dyn LandmarkSource>,
    settings: &TrackingSettings,
    shutdown: &AtomicBool,
) {
    if let Err(e) = source.open() {
        handle.fail(e.to_string());
        return;
    }
    handle.mark_ready();

    let mut tracker = GestureTracker::new(settings.min_cutoff, settings.beta);
    let mut frames: u64 = 0;
    while !shutdown.load(Ordering::Relaxed) {
        match source.next_frame() {
            Some(frame) => {
                handle.publish(tracker.ingest(&frame));
                frames += 1;
            }
            None => {
                log::info!("TRACKER: Source exhausted after {} frames", frames);
                handle.publish(HandFrame::default());
                break;
            }
        }
    }
}

/// Spawns the detection loop.
pub fn start_thread(
    handle: Arc<TrackerHandle>,
    source: Box<dyn LandmarkSource>,
    settings: TrackingSettings,
    shutdown: Arc<AtomicBool>,
) {
    let spawned = thread::Builder::new()
        .name("Tracking Thread".to_string())
        .spawn(move || {
            log::info!("TRACKER: Thread started");
            run_detection(&handle, source, &settings, &shutdown);
            log::info!("TRACKER: Thread stopped");
        });
    if let Err(e) = spawned {
        log::error!("TRACKER: Failed to spawn tracking thread: {}", e);
    }
}
