//! Best-of-run records
//!
//! One record per stat rather than a leaderboard: each finished run is
//! compared against the stored bests and every beaten stat is reported so
//! the game-over screen can badge it.

use serde::{Deserialize, Serialize};

use crate::sim::RunStats;

/// Which stat a finished run set a new record on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Score,
    Time,
    Distance,
    Combo,
    Speed,
}

impl RecordKind {
    /// Badge text for the game-over screen
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Score => "New score record",
            RecordKind::Time => "Longest survival yet",
            RecordKind::Distance => "Farthest distance driven",
            RecordKind::Combo => "Most spectacular combo",
            RecordKind::Speed => "Top speed beaten",
        }
    }
}

/// Persisted best-of record, merged after every run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BestRecords {
    pub best_score: u32,
    pub best_time: u32,
    pub best_distance: f64,
    pub best_combo: u32,
    pub best_speed: u32,
    pub runs_played: u32,
}

impl BestRecords {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "ember-dash.records.v1";

    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a finished run into the records. Returns the stats the run set
    /// new records on, in display order.
    pub fn evaluate(&mut self, stats: &RunStats) -> Vec<RecordKind> {
        let mut new_records = Vec::new();
        let final_speed = stats.max_speed.floor() as u32;

        if stats.score > self.best_score {
            self.best_score = stats.score;
            new_records.push(RecordKind::Score);
        }
        if stats.time_secs > self.best_time {
            self.best_time = stats.time_secs;
            new_records.push(RecordKind::Time);
        }
        if stats.distance_km > self.best_distance {
            self.best_distance = stats.distance_km;
            new_records.push(RecordKind::Distance);
        }
        if stats.peak_combo > self.best_combo {
            self.best_combo = stats.peak_combo;
            new_records.push(RecordKind::Combo);
        }
        if final_speed > self.best_speed {
            self.best_speed = final_speed;
            new_records.push(RecordKind::Speed);
        }

        self.runs_played += 1;
        new_records
    }

    /// Load records from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
        {
            match serde_json::from_str::<BestRecords>(&json) {
                Ok(records) => {
                    log::info!("Loaded best records ({} runs played)", records.runs_played);
                    return records;
                }
                Err(err) => log::warn!("Stored records unreadable, starting fresh: {err}"),
            }
        }

        log::info!("No stored records, starting fresh");
        Self::new()
    }

    /// Save records to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Best records saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Thousands-separated number for the HUD
pub fn format_number(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `45s` under a minute, `m:ss` beyond
pub fn format_time(seconds: u32) -> String {
    if seconds == 0 {
        return "0s".to_owned();
    }
    let mins = seconds / 60;
    let secs = seconds % 60;
    if mins == 0 {
        format!("{secs}s")
    } else {
        format!("{mins}:{secs:02}")
    }
}

pub fn format_distance(km: f64) -> String {
    if km == 0.0 {
        return "0 km".to_owned();
    }
    format!("{km:.2} km")
}

pub fn format_combo(combo: u32) -> String {
    format!("x{combo}")
}

pub fn format_speed(speed: u32) -> String {
    if speed == 0 {
        return "0 km/h".to_owned();
    }
    format!("{speed} km/h")
}

/// Shareable end-of-run summary
pub fn run_summary(stats: &RunStats, start_label: &str, end_label: &str) -> String {
    format!(
        "\u{1f692} Fire run complete!\n\
         \u{1f4ca} Score: {}\n\
         \u{23f1}\u{fe0f} Time: {}\n\
         \u{1f4cf} Distance: {}\n\
         \u{1f525} Hazards dodged: {}\n\
         \u{26a1} Top speed: {}\n\
         \u{1f5fa}\u{fe0f} Route: {} \u{2192} {}",
        format_number(stats.score),
        format_time(stats.time_secs),
        format_distance(stats.distance_km),
        format_number(stats.dodges),
        format_speed(stats.max_speed.floor() as u32),
        start_label,
        end_label,
    )
}
