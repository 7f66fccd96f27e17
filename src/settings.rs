//! Game settings and preferences
//!
//! Persisted separately from best records in LocalStorage. Malformed stored
//! data falls back to defaults, never crashes.

use serde::{Deserialize, Serialize};

use crate::consts::{SENSITIVITY_MAX, SENSITIVITY_MIN};

/// Graphics quality levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GraphicsQuality {
    Low,
    Medium,
    #[default]
    High,
}

impl GraphicsQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraphicsQuality::Low => "Low",
            GraphicsQuality::Medium => "Medium",
            GraphicsQuality::High => "High",
        }
    }

    /// Whether the drifting smoke layer is drawn
    pub fn smoke_enabled(&self) -> bool {
        !matches!(self, GraphicsQuality::Low)
    }

    /// Whether spark/debris particles are drawn
    pub fn particles_enabled(&self) -> bool {
        true
    }
}

/// User preferences that affect gameplay and presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio_enabled: bool,
    pub vibration_enabled: bool,
    /// Tilt-to-speed multiplier (clamped at the point of use)
    pub gyro_sensitivity: f32,
    /// Keyboard speed multiplier (clamped at the point of use)
    pub keyboard_speed: f32,
    pub graphics_quality: GraphicsQuality,
    /// When on, the slow-motion buff also softens scoring difficulty.
    /// When off, the visual slow-down keeps the raw difficulty scalar.
    pub slow_motion_assist: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            vibration_enabled: true,
            gyro_sensitivity: 1.0,
            keyboard_speed: 1.0,
            graphics_quality: GraphicsQuality::High,
            slow_motion_assist: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "ember-dash.settings.v1";

    pub fn effective_gyro_sensitivity(&self) -> f32 {
        self.gyro_sensitivity.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX)
    }

    pub fn effective_keyboard_speed(&self) -> f32 {
        self.keyboard_speed.clamp(SENSITIVITY_MIN, SENSITIVITY_MAX)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
        {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                Err(err) => log::warn!("Stored settings unreadable, using defaults: {err}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_on() {
        let settings = Settings::default();
        assert!(settings.audio_enabled);
        assert!(settings.vibration_enabled);
        assert!(settings.slow_motion_assist);
        assert_eq!(settings.graphics_quality, GraphicsQuality::High);
    }

    #[test]
    fn sensitivity_scalars_are_clamped() {
        let mut settings = Settings::default();
        settings.gyro_sensitivity = 10.0;
        settings.keyboard_speed = 0.0;
        assert_eq!(settings.effective_gyro_sensitivity(), 2.5);
        assert_eq!(settings.effective_keyboard_speed(), 0.4);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"audio_enabled": false}"#).expect("partial settings");
        assert!(!settings.audio_enabled);
        assert!(settings.vibration_enabled);
        assert_eq!(settings.gyro_sensitivity, 1.0);
    }

    #[test]
    fn quality_round_trips_lowercase() {
        let json = serde_json::to_string(&GraphicsQuality::High).expect("serialize");
        assert_eq!(json, r#""high""#);
        let back: GraphicsQuality = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, GraphicsQuality::High);
    }
}
