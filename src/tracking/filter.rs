//! Landmark smoothing.
//!
//! The cutoff of the low-pass stage rises with the estimated speed, so a
//! resting palm stops trembling while a swing is followed with little lag.

use crate::models::engine::Vec3;
use std::f32::consts::PI;

/// One Euro filter over a single coordinate.
pub struct OneEuroFilter {
    /// Cutoff (Hz) applied when the coordinate does not move.
    min_cutoff: f32,
    /// Cutoff gain per unit/s of estimated speed.
    beta: f32,
    /// Cutoff (Hz) for the speed estimate itself.
    speed_cutoff: f32,

    last: Option<Sample>,
}

#[derive(Clone, Copy)]
struct Sample {
    t: f64,
    value: f32,
    speed: f32,
}

impl OneEuroFilter {
    pub fn new(min_cutoff: f32, beta: f32) -> Self {
        Self {
            min_cutoff: min_cutoff.max(0.01),
            beta: beta.max(0.0),
            speed_cutoff: 1.0,
            last: None,
        }
    }

    /// Blend weight of a new sample for a first-order low-pass at `cutoff`.
    fn alpha(dt: f32, cutoff: f32) -> f32 {
        let tau = 1.0 / (2.0 * PI * cutoff);
        dt / (dt + tau)
    }

    /// Filters `x` sampled at `t` seconds. Out-of-order samples return the
    /// previous output.
    pub fn filter(&mut self, t: f64, x: f32) -> f32 {
        let Some(prev) = self.last else {
            self.last = Some(Sample {
                t,
                value: x,
                speed: 0.0,
            });
            return x;
        };

        let dt = (t - prev.t) as f32;
        if dt <= 0.0 {
            return prev.value;
        }

        let raw_speed = (x - prev.value) / dt;
        let speed = prev.speed + Self::alpha(dt, self.speed_cutoff) * (raw_speed - prev.speed);
        let cutoff = self.min_cutoff + self.beta * speed.abs();
        let value = prev.value + Self::alpha(dt, cutoff) * (x - prev.value);

        self.last = Some(Sample { t, value, speed });
        value
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// One filter per axis.
pub struct OneEuroFilter3 {
    x: OneEuroFilter,
    y: OneEuroFilter,
    z: OneEuroFilter,
}

impl OneEuroFilter3 {
    pub fn new(min_cutoff: f32, beta: f32) -> Self {
        Self {
            x: OneEuroFilter::new(min_cutoff, beta),
            y: OneEuroFilter::new(min_cutoff, beta),
            z: OneEuroFilter::new(min_cutoff, beta),
        }
    }

    pub fn filter(&mut self, t: f64, v: Vec3) -> Vec3 {
        Vec3::new(
            self.x.filter(t, v.x),
            self.y.filter(t, v.y),
            self.z.filter(t, v.z),
        )
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
    }
}
