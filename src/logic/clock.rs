//! Smoothed song clock.
//!
//! Device positions arrive in coarse steps; the clock advances with the tick
//! delta and is nudged toward the transport so note motion stays smooth.

/// Drift (seconds) beyond which the clock snaps to the transport.
const HARD_RESYNC_SECS: f64 = 0.080;
/// Drift (seconds) below which no correction is applied.
const SOFT_RESYNC_SECS: f64 = 0.005;
/// Fraction of the drift corrected per tick.
const SOFT_CORRECTION: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SongClock {
    time: f64,
    running: bool,
}

impl SongClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current song time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Jumps to `time` and stops.
    pub fn reset(&mut self, time: f64) {
        self.time = time;
        self.running = false;
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Freezes the clock on the transport's paused position.
    pub fn pause(&mut self, transport_time: f64) {
        self.time = transport_time;
        self.running = false;
    }

    /// Advances by `dt` seconds and resynchronizes with the transport.
    pub fn advance(&mut self, dt: f64, transport_time: f64) -> f64 {
        if !self.running {
            return self.time;
        }
        self.time += dt.max(0.0);

        let drift = transport_time - self.time;
        if drift.abs() > HARD_RESYNC_SECS {
            self.time = transport_time;
        } else if drift.abs() > SOFT_RESYNC_SECS {
            self.time += drift * SOFT_CORRECTION;
        }
        self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_clock_ignores_ticks() {
        let mut clock = SongClock::new();
        assert_eq!(clock.advance(1.0, 5.0), 0.0);
    }

    #[test]
    fn test_tracks_transport_in_step() {
        let mut clock = SongClock::new();
        clock.start();
        let mut transport = 0.0;
        for _ in 0..100 {
            transport += 1.0 / 60.0;
            clock.advance(1.0 / 60.0, transport);
        }
        assert!((clock.time() - transport).abs() < 1e-9);
    }

    #[test]
    fn test_large_drift_snaps() {
        let mut clock = SongClock::new();
        clock.start();
        assert_eq!(clock.advance(0.01, 3.0), 3.0);
    }

    #[test]
    fn test_small_drift_is_eased() {
        let mut clock = SongClock::new();
        clock.start();
        let t = clock.advance(0.0, 0.05);
        assert!(t > 0.0 && t < 0.05);
    }

    #[test]
    fn test_pause_and_resume_is_continuous() {
        let mut clock = SongClock::new();
        clock.start();
        clock.advance(0.5, 0.5);
        clock.pause(0.5);
        clock.advance(2.0, 0.5);
        assert_eq!(clock.time(), 0.5);
        clock.start();
        assert!((clock.advance(0.1, 0.6) - 0.6).abs() < 1e-9);
    }
}
