//! Note records and their placement in the lane grid.

use super::constants::{LANE_X, LAYER_Y, NUM_LANES, NUM_LAYERS, PLAYER_Z};
use super::vec3::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_1_SQRT_2;

/// Which hand a note (or a tracked estimate) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandSide {
    Left,
    Right,
}

/// Required swing direction for a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutDirection {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
    Any,
}

impl CutDirection {
    /// Unit swing vector in world space, `None` for [`CutDirection::Any`].
    pub fn vector(self) -> Option<Vec3> {
        let d = FRAC_1_SQRT_2;
        let v = match self {
            CutDirection::Up => Vec3::new(0.0, 1.0, 0.0),
            CutDirection::Down => Vec3::new(0.0, -1.0, 0.0),
            CutDirection::Left => Vec3::new(-1.0, 0.0, 0.0),
            CutDirection::Right => Vec3::new(1.0, 0.0, 0.0),
            CutDirection::UpLeft => Vec3::new(-d, d, 0.0),
            CutDirection::UpRight => Vec3::new(d, d, 0.0),
            CutDirection::DownLeft => Vec3::new(-d, -d, 0.0),
            CutDirection::DownRight => Vec3::new(d, -d, 0.0),
            CutDirection::Any => return None,
        };
        Some(v)
    }
}

/// A single timed target in a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    /// Seconds from track start at which the note reaches the player plane.
    pub time: f64,
    /// Horizontal lane, `0..NUM_LANES`.
    pub line_index: u8,
    /// Vertical layer, `0..NUM_LAYERS`.
    pub line_layer: u8,
    /// Hand that must intercept the note.
    pub hand: HandSide,
    pub cut_direction: CutDirection,
}

impl Note {
    pub fn new(
        time: f64,
        line_index: u8,
        line_layer: u8,
        hand: HandSide,
        cut_direction: CutDirection,
    ) -> Self {
        Self {
            id: 0,
            time,
            line_index: line_index.min(NUM_LANES as u8 - 1),
            line_layer: line_layer.min(NUM_LAYERS as u8 - 1),
            hand,
            cut_direction,
        }
    }

    /// World position at song time `now` for a note travelling at `speed` units/s.
    ///
    /// Continuous in `now`, so render cadence never changes where a note is.
    pub fn position_at(&self, now: f64, speed: f32) -> Vec3 {
        let z = PLAYER_Z - ((self.time - now) as f32) * speed;
        Vec3::new(
            LANE_X[self.line_index as usize],
            LAYER_Y[self.line_layer as usize],
            z,
        )
    }
}
