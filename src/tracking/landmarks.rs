//! Landmark frames as delivered by the detection model.

use crate::models::engine::{
    FIELD_FLOOR_Y, FIELD_HEIGHT, FIELD_WIDTH, HandSide, PLAYER_Z, Vec3,
};
use serde::{Deserialize, Serialize};

pub const WRIST: usize = 0;
pub const INDEX_MCP: usize = 5;
pub const PINKY_MCP: usize = 17;
/// Landmarks per detected hand.
pub const HAND_LANDMARKS: usize = 21;

/// Normalized image-space landmark: x and y in `[0, 1]`, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedHand {
    pub side: HandSide,
    #[serde(default = "full_confidence")]
    pub score: f32,
    pub landmarks: Vec<Landmark>,
}

fn full_confidence() -> f32 {
    1.0
}

/// One inference cycle: zero or more hands tagged by side.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture time in seconds (monotonic, arbitrary origin).
    pub timestamp: f64,
    #[serde(default)]
    pub hands: Vec<DetectedHand>,
}

impl LandmarkFrame {
    pub fn hand(&self, side: HandSide) -> Option<&DetectedHand> {
        self.hands
            .iter()
            .filter(|h| h.side == side)
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

impl DetectedHand {
    /// Mean of wrist, index MCP and pinky MCP. Falls back to whatever
    /// landmarks exist for partial detections.
    pub fn palm_center(&self) -> Option<Landmark> {
        let anchors: Vec<&Landmark> = [WRIST, INDEX_MCP, PINKY_MCP]
            .iter()
            .filter_map(|&i| self.landmarks.get(i))
            .collect();
        let points: Vec<&Landmark> = if anchors.is_empty() {
            self.landmarks.iter().collect()
        } else {
            anchors
        };
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f32;
        let (x, y, z) = points
            .iter()
            .fold((0.0, 0.0, 0.0), |acc, p| (acc.0 + p.x, acc.1 + p.y, acc.2 + p.z));
        Some(Landmark {
            x: x / n,
            y: y / n,
            z: z / n,
        })
    }
}

/// Maps a normalized image point onto the player plane.
///
/// The camera image is mirrored so moving a hand right moves it right in the
/// world. Depth from a monocular model is too unreliable to judge against, so
/// every hand sits on the player plane.
pub fn to_world(point: Landmark) -> Vec3 {
    let x = point.x.clamp(0.0, 1.0);
    let y = point.y.clamp(0.0, 1.0);
    Vec3::new(
        (0.5 - x) * FIELD_WIDTH,
        FIELD_FLOOR_Y + (1.0 - y) * FIELD_HEIGHT,
        PLAYER_Z,
    )
}

/// Inverse of [`to_world`] on the player plane; used to synthesize frames.
pub fn from_world(position: Vec3) -> Landmark {
    Landmark {
        x: 0.5 - position.x / FIELD_WIDTH,
        y: 1.0 - (position.y - FIELD_FLOOR_Y) / FIELD_HEIGHT,
        z: 0.0,
    }
}

/// A full hand with every landmark at `point`; enough for palm-centre tracking.
pub fn hand_at(side: HandSide, point: Landmark) -> DetectedHand {
    DetectedHand {
        side,
        score: 1.0,
        landmarks: vec![point; HAND_LANDMARKS],
    }
}
