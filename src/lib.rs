//! Ember Dash - a fire-truck hazard-dodging arcade game
//!
//! Core modules:
//! - `sim`: platform-free simulation (entities, collisions, game state)
//! - `render`: Canvas 2D rendering sink
//! - `audio`: procedurally generated Web Audio sound effects
//! - `geo`: route tracking and place labels for the end-of-run summary
//! - `settings` / `highscores`: LocalStorage-backed preferences and records

pub mod geo;
pub mod highscores;
pub mod settings;
pub mod sim;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod render;

pub use highscores::BestRecords;
pub use settings::{GraphicsQuality, Settings};

/// Game configuration constants
pub mod consts {
    /// Truck dimensions
    pub const TRUCK_WIDTH: f32 = 60.0;
    pub const TRUCK_HEIGHT: f32 = 90.0;
    /// Base lateral speed in pixels per frame (scaled by user sensitivity)
    pub const TRUCK_BASE_SPEED: f32 = 6.0;
    /// Gap kept between the truck and the bottom edge
    pub const TRUCK_BOTTOM_OFFSET: f32 = 100.0;

    /// Score awarded per dodged hazard
    pub const DODGE_SCORE: u32 = 10;

    /// Streak resets after this much idle time between dodges
    pub const COMBO_TIMEOUT_MS: f64 = 2500.0;

    /// Ground fire lifetime
    pub const GROUND_FIRE_DURATION_MS: f64 = 2800.0;
    /// Base duration of the water-blast flash over ground fires
    pub const GROUND_FIRE_FLASH_MS: f64 = 650.0;
    /// Soft cap on simultaneous ground fires; oldest is evicted first
    pub const GROUND_FIRE_CAP: usize = 20;

    /// Buff durations
    pub const SHIELD_DURATION_MS: f64 = 5000.0;
    pub const SLOWMO_DURATION_MS: f64 = 4000.0;

    /// Slow-motion multipliers: global difficulty, hazard descent, spawn rate
    pub const SLOWMO_GAME_FACTOR: f32 = 0.5;
    pub const SLOWMO_FIRE_FACTOR: f32 = 0.55;
    pub const SLOWMO_SPAWN_FACTOR: f64 = 0.6;

    /// Pickup spawn gating
    pub const PICKUP_MAX_ACTIVE: usize = 2;
    pub const PICKUP_COOLDOWN_MS: f64 = 8000.0;
    pub const PICKUP_BASE_CHANCE: f64 = 0.0035;
    pub const PICKUP_SLOWMO_CHANCE: f64 = 0.0015;
    pub const PICKUP_SIZE: f32 = 32.0;

    /// Extreme-speed alert hysteresis thresholds
    pub const EXTREME_ON_THRESHOLD: f32 = 3.7;
    pub const EXTREME_OFF_THRESHOLD: f32 = 3.2;

    /// Pool capacities (soft targets, not hard caps)
    pub const SPARK_POOL_SIZE: usize = 512;
    pub const DEBRIS_POOL_SIZE: usize = 256;

    /// Pre-run countdown, seconds (3..0 displayed one per second)
    pub const COUNTDOWN_SECONDS: u32 = 3;

    /// User sensitivity scalars are clamped to this range at the point of use
    pub const SENSITIVITY_MIN: f32 = 0.4;
    pub const SENSITIVITY_MAX: f32 = 2.5;

    /// Tilt angle (degrees) that maps to full lateral speed
    pub const MAX_TILT_DEGREES: f32 = 30.0;
}

/// Axis-aligned rectangle; all collision in the game is AABB overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Strict overlap test - touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}
