//! Difficulty progression derived from elapsed playtime.

use crate::consts::SLOWMO_SPAWN_FACTOR;

/// Global difficulty scalar for the given elapsed playtime (whole seconds).
///
/// `dilation` is the slow-motion game factor: 0.5 while slow-motion is
/// active *and* the assist preference is on, otherwise 1.0. Monotonic in
/// elapsed time for a fixed dilation.
pub fn difficulty_scalar(elapsed_secs: u32, dilation: f32) -> f32 {
    (0.8 + elapsed_secs as f32 * 0.03) * dilation
}

/// Per-frame hazard spawn probability, floor-clamped so spawning never
/// stalls, and reduced while slow-motion is active.
pub fn spawn_probability(elapsed_secs: u32, slow_motion: bool) -> f64 {
    let base = (0.05 - elapsed_secs as f64 * 0.0008).max(0.015);
    if slow_motion {
        base * SLOWMO_SPAWN_FACTOR
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_start_baseline() {
        assert!((difficulty_scalar(0, 1.0) - 0.8).abs() < 1e-6);
        assert!((spawn_probability(0, false) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn sixty_second_checkpoint() {
        // 0.8 + 60 * 0.03 = 2.6; spawn floor already reached
        assert!((difficulty_scalar(60, 1.0) - 2.6).abs() < 1e-5);
        assert!((spawn_probability(60, false) - 0.015).abs() < 1e-9);
    }

    #[test]
    fn spawn_probability_never_drops_below_floor() {
        for secs in [44, 100, 1_000, 100_000] {
            assert!(spawn_probability(secs, false) >= 0.015);
        }
    }

    #[test]
    fn dilation_halves_the_scalar() {
        let raw = difficulty_scalar(40, 1.0);
        let dilated = difficulty_scalar(40, 0.5);
        assert!((dilated - raw * 0.5).abs() < 1e-6);
    }

    #[test]
    fn slow_motion_reduces_spawns() {
        let base = spawn_probability(10, false);
        let slowed = spawn_probability(10, true);
        assert!((slowed - base * 0.6).abs() < 1e-9);
    }

    #[test]
    fn scalar_is_monotonic() {
        let mut last = 0.0f32;
        for secs in 0..300 {
            let s = difficulty_scalar(secs, 1.0);
            assert!(s >= last);
            last = s;
        }
    }
}
