//! Optional haptic feedback on hits.

use std::time::Duration;

/// Pulse length for a clean cut.
pub const GOOD_CUT_PULSE: Duration = Duration::from_millis(40);
/// Pulse length for any other hit.
pub const HIT_PULSE: Duration = Duration::from_millis(20);

/// A device that can vibrate. Platforms without one use [`NoHaptics`].
pub trait HapticFeedback: Send {
    fn vibrate(&mut self, pulse: Duration);
}

/// Accepts and drops every pulse.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl HapticFeedback for NoHaptics {
    fn vibrate(&mut self, pulse: Duration) {
        log::trace!("HAPTICS: {} ms pulse (no device)", pulse.as_millis());
    }
}
