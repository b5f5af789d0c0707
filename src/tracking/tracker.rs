//! Raw landmark frames to smoothed per-hand estimates.

use super::filter::OneEuroFilter3;
use super::landmarks::{LandmarkFrame, to_world};
use crate::models::engine::{HandSide, Vec3};

/// Frames a hand may drop out before its estimate is withdrawn.
pub const LOST_FRAME_TOLERANCE: u32 = 3;
/// Exponential smoothing applied to the finite-difference velocity.
const VELOCITY_SMOOTHING: f32 = 0.5;
/// Frame gaps above this (seconds) restart velocity estimation.
const MAX_VELOCITY_GAP: f64 = 0.5;

/// Latest estimate for one hand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandEstimate {
    pub position: Vec3,
    /// World units per second.
    pub velocity: Vec3,
    /// Detector score of the last observation, 0 when undetected.
    pub confidence: f32,
    pub detected: bool,
}

/// Both hands at one detection instant, published as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HandFrame {
    pub timestamp: f64,
    pub left: HandEstimate,
    pub right: HandEstimate,
}

impl HandFrame {
    pub fn hand(&self, side: HandSide) -> &HandEstimate {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }
}

struct HandFilter {
    position: OneEuroFilter3,
    estimate: HandEstimate,
    last_seen: Option<f64>,
    lost_frames: u32,
}

impl HandFilter {
    fn new(min_cutoff: f32, beta: f32) -> Self {
        Self {
            position: OneEuroFilter3::new(min_cutoff, beta),
            estimate: HandEstimate::default(),
            last_seen: None,
            lost_frames: 0,
        }
    }

    fn observe(&mut self, t: f64, raw: Vec3, confidence: f32) {
        let smoothed = self.position.filter(t, raw);
        let velocity = match self.last_seen {
            Some(prev) if t > prev && t - prev <= MAX_VELOCITY_GAP => {
                let dt = (t - prev) as f32;
                let instant = (smoothed - self.estimate.position) * (1.0 / dt);
                self.estimate.velocity.lerp(instant, VELOCITY_SMOOTHING)
            }
            Some(prev) if t <= prev => self.estimate.velocity,
            _ => Vec3::ZERO,
        };

        self.estimate = HandEstimate {
            position: smoothed,
            velocity,
            confidence,
            detected: true,
        };
        self.last_seen = Some(t);
        self.lost_frames = 0;
    }

    fn miss(&mut self) {
        if !self.estimate.detected {
            return;
        }
        self.lost_frames += 1;
        if self.lost_frames > LOST_FRAME_TOLERANCE {
            self.position.reset();
            self.last_seen = None;
            self.estimate = HandEstimate {
                position: self.estimate.position,
                ..HandEstimate::default()
            };
        }
    }
}

/// Smooths landmark frames into [`HandFrame`]s.
///
/// Owned by the detection loop; consumers only ever see the frames it returns.
pub struct GestureTracker {
    left: HandFilter,
    right: HandFilter,
}

impl GestureTracker {
    pub fn new(min_cutoff: f32, beta: f32) -> Self {
        Self {
            left: HandFilter::new(min_cutoff, beta),
            right: HandFilter::new(min_cutoff, beta),
        }
    }

    pub fn ingest(&mut self, frame: &LandmarkFrame) -> HandFrame {
        for side in [HandSide::Left, HandSide::Right] {
            let filter = match side {
                HandSide::Left => &mut self.left,
                HandSide::Right => &mut self.right,
            };
            match frame.hand(side).and_then(|h| Some((h.palm_center()?, h.score))) {
                Some((palm, score)) => filter.observe(frame.timestamp, to_world(palm), score),
                None => filter.miss(),
            }
        }

        HandFrame {
            timestamp: frame.timestamp,
            left: self.left.estimate,
            right: self.right.estimate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::landmarks::{Landmark, from_world, hand_at};

    fn frame(t: f64, hands: Vec<(HandSide, Vec3)>) -> LandmarkFrame {
        LandmarkFrame {
            timestamp: t,
            hands: hands
                .into_iter()
                .map(|(side, pos)| hand_at(side, from_world(pos)))
                .collect(),
        }
    }

    #[test]
    fn test_first_observation_is_exact() {
        let mut tracker = GestureTracker::new(1.2, 0.3);
        let target = Vec3::new(0.4, 1.4, 0.0);
        let out = tracker.ingest(&frame(0.0, vec![(HandSide::Right, target)]));
        assert!(out.right.detected);
        assert!(out.right.position.distance(target) < 1e-5);
        assert_eq!(out.right.velocity, Vec3::ZERO);
        assert!(!out.left.detected);
    }

    #[test]
    fn test_velocity_follows_motion() {
        let mut tracker = GestureTracker::new(1.2, 0.3);
        let mut out = HandFrame::default();
        for i in 0..30 {
            let t = i as f64 / 30.0;
            let pos = Vec3::new(-1.0, 2.0 - 1.5 * t as f32, 0.0);
            out = tracker.ingest(&frame(t, vec![(HandSide::Left, pos)]));
        }
        assert!(out.left.velocity.y < -0.5, "moving down: {:?}", out.left.velocity);
        assert!(out.left.velocity.x.abs() < 0.05);
    }

    #[test]
    fn test_brief_dropout_keeps_estimate() {
        let mut tracker = GestureTracker::new(1.2, 0.3);
        let pos = Vec3::new(1.2, 0.8, 0.0);
        tracker.ingest(&frame(0.0, vec![(HandSide::Right, pos)]));
        for i in 1..=LOST_FRAME_TOLERANCE {
            let out = tracker.ingest(&frame(i as f64 / 30.0, vec![]));
            assert!(out.right.detected);
        }
        let out = tracker.ingest(&frame(1.0, vec![]));
        assert!(!out.right.detected);
        assert_eq!(out.right.confidence, 0.0);
    }

    #[test]
    fn test_prefers_highest_scoring_duplicate() {
        let mut tracker = GestureTracker::new(1.2, 0.3);
        let mut weak = hand_at(HandSide::Left, Landmark { x: 0.9, y: 0.9, z: 0.0 });
        weak.score = 0.2;
        let strong = hand_at(HandSide::Left, from_world(Vec3::new(0.0, 1.4, 0.0)));
        let out = tracker.ingest(&LandmarkFrame {
            timestamp: 0.0,
            hands: vec![weak, strong],
        });
        assert!(out.left.position.distance(Vec3::new(0.0, 1.4, 0.0)) < 1e-5);
        assert_eq!(out.left.confidence, 1.0);
    }
}
