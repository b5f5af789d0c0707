//! Spatial and directional thresholds deciding whether a hand intercepts a note.

use super::note::CutDirection;
use super::vec3::Vec3;

/// Outcome of testing one hand against one note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Hand is not close enough, or swings the wrong way.
    None,
    /// Hand intercepts the note; `good_cut` marks a clean swing.
    Hit { good_cut: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct HitZone {
    /// Maximum hand-to-note distance for an interception.
    pub radius: f32,
    /// Minimum alignment (dot product) with a required swing direction.
    pub direction_threshold: f32,
    /// Minimum hand speed (units/s) for a directional note to register.
    pub min_swing_speed: f32,
    /// Hand speed (units/s) from which a hit counts as a good cut.
    pub good_cut_speed: f32,
    /// Alignment from which a directional hit counts as a good cut.
    pub good_cut_alignment: f32,
}

impl HitZone {
    pub fn new() -> Self {
        Self {
            radius: 0.6,
            direction_threshold: 0.3,
            min_swing_speed: 1.0,
            good_cut_speed: 2.0,
            good_cut_alignment: 0.7,
        }
    }

    /// Default thresholds with a custom interception radius.
    pub fn with_radius(radius: f32) -> Self {
        Self {
            radius: radius.max(0.05),
            ..Self::new()
        }
    }

    pub fn judge(&self, distance: f32, velocity: Vec3, direction: CutDirection) -> Contact {
        if distance > self.radius {
            return Contact::None;
        }

        let speed = velocity.length();
        let Some(required) = direction.vector() else {
            return Contact::Hit {
                good_cut: speed >= self.good_cut_speed,
            };
        };

        if speed < self.min_swing_speed {
            return Contact::None;
        }
        let alignment = velocity
            .normalized()
            .map(|v| v.dot(required))
            .unwrap_or(-1.0);
        if alignment < self.direction_threshold {
            return Contact::None;
        }

        Contact::Hit {
            good_cut: speed >= self.good_cut_speed && alignment >= self.good_cut_alignment,
        }
    }
}

impl Default for HitZone {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_radius_never_hits() {
        let zone = HitZone::new();
        let fast_down = Vec3::new(0.0, -5.0, 0.0);
        assert_eq!(zone.judge(0.61, fast_down, CutDirection::Any), Contact::None);
        assert_eq!(zone.judge(0.61, fast_down, CutDirection::Down), Contact::None);
    }

    #[test]
    fn test_any_direction_is_lenient() {
        let zone = HitZone::new();
        assert_eq!(
            zone.judge(0.2, Vec3::ZERO, CutDirection::Any),
            Contact::Hit { good_cut: false }
        );
        assert_eq!(
            zone.judge(0.2, Vec3::new(3.0, 0.0, 0.0), CutDirection::Any),
            Contact::Hit { good_cut: true }
        );
    }

    #[test]
    fn test_directional_requires_alignment() {
        let zone = HitZone::new();
        let up = Vec3::new(0.0, 3.0, 0.0);
        assert_eq!(zone.judge(0.1, up, CutDirection::Down), Contact::None);
        assert_eq!(zone.judge(0.1, up, CutDirection::Up), Contact::Hit { good_cut: true });

        // Diagonal swing: aligned enough to count, not enough for a good cut.
        let slanted = Vec3::new(2.5, 1.5, 0.0);
        assert_eq!(
            zone.judge(0.1, slanted, CutDirection::Up),
            Contact::Hit { good_cut: false }
        );
    }

    #[test]
    fn test_directional_requires_motion() {
        let zone = HitZone::new();
        assert_eq!(
            zone.judge(0.1, Vec3::new(0.0, -0.5, 0.0), CutDirection::Down),
            Contact::None
        );
    }
}
