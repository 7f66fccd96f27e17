//! Extreme-speed warning with a hysteresis band.

use crate::consts::{EXTREME_OFF_THRESHOLD, EXTREME_ON_THRESHOLD};

/// Two-threshold gate on the global difficulty scalar. The gap between the
/// on (3.7) and off (3.2) thresholds keeps the banner from flickering when
/// the scalar hovers at the boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtremeSpeedAlert {
    active: bool,
}

impl ExtremeSpeedAlert {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current difficulty scalar. Returns true on the frame the
    /// alert switches on (haptic pulse + audio cue); switching off is
    /// silent.
    pub fn update(&mut self, game_speed: f32) -> bool {
        if !self.active && game_speed >= EXTREME_ON_THRESHOLD {
            self.active = true;
            return true;
        }
        if self.active && game_speed <= EXTREME_OFF_THRESHOLD {
            self.active = false;
        }
        false
    }

    /// Force the inactive state, used on run start and end.
    pub fn reset(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activates_at_upper_threshold() {
        let mut alert = ExtremeSpeedAlert::new();
        assert!(!alert.update(3.69));
        assert!(!alert.is_active());
        assert!(alert.update(3.7));
        assert!(alert.is_active());
    }

    #[test]
    fn stays_active_inside_the_band() {
        let mut alert = ExtremeSpeedAlert::new();
        alert.update(4.0);
        assert!(alert.is_active());

        // Anywhere in (3.2, 3.7) must not release the alert
        for speed in [3.69, 3.5, 3.3, 3.21] {
            alert.update(speed);
            assert!(alert.is_active(), "released at {speed}");
        }

        alert.update(3.2);
        assert!(!alert.is_active());
    }

    #[test]
    fn activation_edge_fires_once() {
        let mut alert = ExtremeSpeedAlert::new();
        assert!(alert.update(3.8));
        assert!(!alert.update(3.9), "already active, no second edge");
    }

    #[test]
    fn reset_is_unconditional() {
        let mut alert = ExtremeSpeedAlert::new();
        alert.update(5.0);
        alert.reset();
        assert!(!alert.is_active());
    }
}
