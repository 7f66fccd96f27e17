//! Rolling dodge-streak tracker.

use crate::consts::COMBO_TIMEOUT_MS;

/// Streak of consecutive dodges. The streak decays to zero all at once when
/// dodges stop for longer than the timeout; the peak survives until a fresh
/// run starts.
#[derive(Debug, Clone, Default)]
pub struct ComboTracker {
    streak: u32,
    peak: u32,
    last_dodge_ms: f64,
}

impl ComboTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a qualifying dodge. Returns true when the streak lands on a
    /// multiple-of-five milestone (haptic cue).
    pub fn register_dodge(&mut self, now_ms: f64) -> bool {
        self.streak += 1;
        self.last_dodge_ms = now_ms;
        if self.streak > self.peak {
            self.peak = self.streak;
        }
        self.streak >= 2 && self.streak.is_multiple_of(5)
    }

    /// Zero the streak once dodges have gone quiet past the timeout. This is
    /// the only decay path; there is no partial decay.
    pub fn update(&mut self, now_ms: f64) {
        if self.streak == 0 {
            return;
        }
        if now_ms - self.last_dodge_ms > COMBO_TIMEOUT_MS {
            self.streak = 0;
        }
    }

    /// Clear the streak. The session peak is kept.
    pub fn reset(&mut self) {
        self.streak = 0;
    }

    /// Fresh run: clears streak and peak both.
    pub fn start_run(&mut self) {
        self.streak = 0;
        self.peak = 0;
        self.last_dodge_ms = 0.0;
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn peak(&self) -> u32 {
        self.peak
    }

    /// The on-screen indicator lights up from a streak of 2.
    pub fn indicator_active(&self) -> bool {
        self.streak >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_counts_and_tracks_peak() {
        let mut combo = ComboTracker::new();
        for i in 1..=4 {
            combo.register_dodge(i as f64 * 100.0);
        }
        assert_eq!(combo.streak(), 4);
        assert_eq!(combo.peak(), 4);

        combo.reset();
        assert_eq!(combo.streak(), 0);
        assert_eq!(combo.peak(), 4, "reset must not clear the session peak");
    }

    #[test]
    fn streak_resets_after_timeout() {
        let mut combo = ComboTracker::new();
        combo.register_dodge(1_000.0);
        combo.register_dodge(1_500.0);

        combo.update(3_999.0);
        assert_eq!(combo.streak(), 2, "still inside the 2500ms window");

        combo.update(4_001.0);
        assert_eq!(combo.streak(), 0);
        assert_eq!(combo.peak(), 2);
    }

    #[test]
    fn milestone_fires_every_fifth_dodge() {
        let mut combo = ComboTracker::new();
        let mut milestones = Vec::new();
        for i in 1..=12 {
            if combo.register_dodge(i as f64) {
                milestones.push(i);
            }
        }
        assert_eq!(milestones, vec![5, 10]);
    }

    #[test]
    fn indicator_needs_streak_of_two() {
        let mut combo = ComboTracker::new();
        combo.register_dodge(0.0);
        assert!(!combo.indicator_active());
        combo.register_dodge(1.0);
        assert!(combo.indicator_active());
    }

    #[test]
    fn peak_is_nondecreasing_within_run() {
        let mut combo = ComboTracker::new();
        let mut last_peak = 0;
        for i in 0..30 {
            let t = i as f64 * 400.0;
            if i % 7 == 0 {
                combo.update(t + 3_000.0);
            } else {
                combo.register_dodge(t);
            }
            assert!(combo.peak() >= last_peak);
            last_peak = combo.peak();
        }
    }
}
