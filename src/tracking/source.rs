//! Producers of landmark frames.
//!
//! The detection model is a black box: anything that can hand over
//! [`LandmarkFrame`]s at its own cadence implements [`LandmarkSource`].

use super::landmarks::{LandmarkFrame, from_world, hand_at};
use crate::error::TrackingError;
use crate::models::engine::{HandSide, LANE_X, LAYER_Y, PLAYER_Z, Vec3};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

pub trait LandmarkSource: Send + 'static {
    /// Acquires the capture device/model. Called once before any frame.
    fn open(&mut self) -> Result<(), TrackingError>;

    /// Blocks until the next inference cycle. `None` once the source is done.
    fn next_frame(&mut self) -> Option<LandmarkFrame>;
}

/// Replays a JSON-lines recording, one [`LandmarkFrame`] per line, paced by
/// the recorded timestamps.
pub struct TraceSource {
    path: PathBuf,
    frames: Vec<LandmarkFrame>,
    cursor: usize,
    started: Option<Instant>,
}

impl TraceSource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            frames: Vec::new(),
            cursor: 0,
            started: None,
        }
    }

    fn parse(path: &Path, reader: impl BufRead) -> Result<Vec<LandmarkFrame>, TrackingError> {
        let mut frames = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| TrackingError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let frame = serde_json::from_str(&line).map_err(|source| {
                TrackingError::MalformedFrame {
                    line: idx + 1,
                    source,
                }
            })?;
            frames.push(frame);
        }
        Ok(frames)
    }
}

impl LandmarkSource for TraceSource {
    fn open(&mut self) -> Result<(), TrackingError> {
        let file = File::open(&self.path).map_err(|source| TrackingError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.frames = Self::parse(&self.path, BufReader::new(file))?;
        if self.frames.is_empty() {
            return Err(TrackingError::SourceUnavailable(format!(
                "trace {:?} contains no frames",
                self.path
            )));
        }
        self.frames
            .sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        log::info!(
            "TRACKER: Loaded {} frames from {:?}",
            self.frames.len(),
            self.path
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        let frame = self.frames.get(self.cursor)?.clone();
        let origin = self.frames[0].timestamp;
        let started = *self.started.get_or_insert_with(Instant::now);

        let due = Duration::from_secs_f64((frame.timestamp - origin).max(0.0));
        if let Some(wait) = due.checked_sub(started.elapsed()) {
            thread::sleep(wait);
        }
        self.cursor += 1;
        Some(frame)
    }
}

/// Synthetic hands sweeping across their half of the grid. Runs without any
/// camera.
pub struct SweepSource {
    fps: f64,
    started: Option<Instant>,
    frame_index: u64,
}

impl SweepSource {
    pub fn new(fps: f64) -> Self {
        Self {
            fps: fps.max(1.0),
            started: None,
            frame_index: 0,
        }
    }

    /// Frame content at `t` seconds after start.
    pub fn frame_at(t: f64) -> LandmarkFrame {
        let phase = (t * std::f64::consts::PI * 0.5).sin() as f32;
        let lift = (t * std::f64::consts::PI * 0.25).cos() as f32;
        let mid_y = (LAYER_Y[0] + LAYER_Y[2]) * 0.5;
        let half_height = (LAYER_Y[2] - LAYER_Y[0]) * 0.5;

        let left = Vec3::new(
            (LANE_X[0] + LANE_X[1]) * 0.5 + phase * (LANE_X[1] - LANE_X[0]) * 0.5,
            mid_y + lift * half_height,
            PLAYER_Z,
        );
        let right = Vec3::new(
            (LANE_X[2] + LANE_X[3]) * 0.5 - phase * (LANE_X[3] - LANE_X[2]) * 0.5,
            mid_y - lift * half_height,
            PLAYER_Z,
        );

        LandmarkFrame {
            timestamp: t,
            hands: vec![
                hand_at(HandSide::Left, from_world(left)),
                hand_at(HandSide::Right, from_world(right)),
            ],
        }
    }
}

impl LandmarkSource for SweepSource {
    fn open(&mut self) -> Result<(), TrackingError> {
        Ok(())
    }

    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        let started = *self.started.get_or_insert_with(Instant::now);
        self.frame_index += 1;
        let due = Duration::from_secs_f64(self.frame_index as f64 / self.fps);
        if let Some(wait) = due.checked_sub(started.elapsed()) {
            thread::sleep(wait);
        }
        Some(Self::frame_at(started.elapsed().as_secs_f64()))
    }
}
