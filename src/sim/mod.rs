//! Platform-free simulation module
//!
//! All gameplay logic lives here:
//! - One `GameState` aggregate owns every entity list, buff timer, and stat
//! - The clock is injected: every update takes `now_ms`, nothing reads time
//! - Randomness comes from the seeded RNG inside `GameState`
//! - Side effects leave as `GameEvent`s; no rendering or platform calls

pub mod alert;
pub mod combo;
pub mod difficulty;
pub mod pool;
pub mod powerups;
pub mod state;
pub mod tick;

pub use alert::ExtremeSpeedAlert;
pub use combo::ComboTracker;
pub use difficulty::{difficulty_scalar, spawn_probability};
pub use pool::Pool;
pub use powerups::{PowerUpSystem, StatusLine, WaterBlastOutcome};
pub use state::{
    ClearMagnitude, Debris, GameEvent, GamePhase, GameState, GroundFire, Hazard, HazardClass,
    Pickup, PickupKind, RunStats, SceneryKind, ScenerySprite, Spark, TreeShape, TreeSprite, Truck,
};
pub use tick::{TickInput, TickResult, tick};
