//! Game state and core simulation types
//!
//! One explicit aggregate owns every entity list, buff timer, and counter;
//! subsystems receive it by reference from the tick and never hold copies.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::alert::ExtremeSpeedAlert;
use super::combo::ComboTracker;
use super::pool::Pool;
use super::powerups::PowerUpSystem;
use crate::Rect;
use crate::consts::*;

/// Current screen / phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen, waiting for the start shake
    Presentation,
    /// Pre-run countdown, one digit per second
    Countdown,
    /// Active run
    Playing,
    /// Run ended
    GameOver,
    /// Route map view, reachable from GameOver and returning to it
    Map,
}

/// Hazard size class, chosen probabilistically at spawn (~20% large)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardClass {
    Normal,
    Large,
}

/// A falling fire hazard
#[derive(Debug, Clone)]
pub struct Hazard {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Descent speed in pixels per frame, before time dilation
    pub speed: f32,
    /// Visual flame intensity in [0.5, 1.0]
    pub intensity: f32,
    pub class: HazardClass,
}

impl Hazard {
    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.size,
            h: self.size,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.size / 2.0
    }
}

/// Collectible power-up kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupKind {
    Shield,
    Water,
    SlowMo,
}

/// A falling collectible pickup
#[derive(Debug, Clone)]
pub struct Pickup {
    pub kind: PickupKind,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
}

impl Pickup {
    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.size,
            h: self.size,
        }
    }
}

/// Decaying ground-level remnant left where a hazard was dodged
#[derive(Debug, Clone)]
pub struct GroundFire {
    /// Horizontal center
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub created_at_ms: f64,
    pub duration_ms: f64,
    /// Randomized phase so neighboring fires do not flicker in lockstep
    pub flicker_seed: f32,
}

impl GroundFire {
    /// Age as a fraction of lifetime, clamped to [0, 1]
    pub fn age_fraction(&self, now_ms: f64) -> f32 {
        ((now_ms - self.created_at_ms) / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_at_ms >= self.duration_ms
    }
}

/// Pooled spark particle (small square glints)
#[derive(Debug, Clone, Default)]
pub struct Spark {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in frames; alpha fades as life/max_life
    pub life: f32,
    pub max_life: f32,
    pub color: [u8; 3],
}

/// Pooled explosion debris (round chunks under gravity)
#[derive(Debug, Clone, Default)]
pub struct Debris {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    /// HSL hue (mostly orange, some red) resolved by the renderer
    pub hue: f32,
    pub lightness: f32,
}

/// The player's fire truck
#[derive(Debug, Clone)]
pub struct Truck {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Base lateral speed in pixels per frame
    pub speed: f32,
    /// Previous frame's display speed, for accel/brake cue edges
    pub last_speed: f32,
}

impl Truck {
    fn new(view_w: f32, view_h: f32) -> Self {
        Self {
            x: view_w / 2.0 - TRUCK_WIDTH / 2.0,
            y: view_h - TRUCK_BOTTOM_OFFSET,
            width: TRUCK_WIDTH,
            height: TRUCK_HEIGHT,
            speed: TRUCK_BASE_SPEED,
            last_speed: 0.0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.width,
            h: self.height,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Decorative tree shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeShape {
    Oak,
    Birch,
    Pine,
}

/// Background tree, drifting right to left
#[derive(Debug, Clone)]
pub struct TreeSprite {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub shape: TreeShape,
    pub sway_offset: f32,
    pub speed: f32,
}

/// Smaller background props
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneryKind {
    Rock,
    Bush,
}

#[derive(Debug, Clone)]
pub struct ScenerySprite {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub kind: SceneryKind,
    pub speed: f32,
}

/// Statistics for a single run; frozen at game over and merged into the
/// persisted best-of record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub score: u32,
    pub time_secs: u32,
    pub dodges: u32,
    pub distance_km: f64,
    pub current_speed: f32,
    pub max_speed: f32,
    pub peak_combo: u32,
}

/// How much a water blast cleared; selects audio intensity and flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearMagnitude {
    None,
    Small,
    Medium,
    Large,
}

impl ClearMagnitude {
    pub fn from_cleared(airborne: usize) -> Self {
        match airborne {
            0 => ClearMagnitude::None,
            1..=2 => ClearMagnitude::Small,
            3..=5 => ClearMagnitude::Medium,
            _ => ClearMagnitude::Large,
        }
    }
}

/// Side effects produced by a tick, consumed by the host (audio, haptics,
/// HUD). The sim itself never touches a platform API.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Countdown digit changed (3..=0)
    CountdownTick(u32),
    /// Countdown finished, the run is live
    RunStarted,
    /// A hazard crossed the bottom edge
    HazardDodged,
    /// Streak landed on a multiple-of-five milestone
    ComboMilestone(u32),
    /// Pickup collected
    PickupCollected(PickupKind),
    /// Shield soaked a hazard overlap
    ShieldAbsorbed,
    /// A timed buff ran out
    ShieldExpired,
    SlowMotionExpired,
    /// Water blast resolved
    WaterBlast {
        magnitude: ClearMagnitude,
        airborne_cleared: usize,
        ground_cleared: usize,
    },
    /// Extreme-speed banner switched on (off is silent)
    ExtremeAlertStarted,
    /// Engine running at the given display speed
    EngineRumble(f32),
    /// Sharp speed change edge
    SpeedBurst { accelerating: bool },
    /// Crackle accompanying a hazard spawn
    FireCrackle,
    /// Collision ended the run
    RunEnded,
}

/// Complete game state, owned by the orchestrator.
#[derive(Debug)]
pub struct GameState {
    pub phase: GamePhase,
    /// Viewport size in CSS pixels
    pub view_w: f32,
    pub view_h: f32,

    pub truck: Truck,
    pub hazards: Vec<Hazard>,
    pub ground_fires: Vec<GroundFire>,
    pub sparks: Pool<Spark>,
    pub debris: Pool<Debris>,

    pub combo: ComboTracker,
    pub powerups: PowerUpSystem,
    pub alert: ExtremeSpeedAlert,

    pub stats: RunStats,
    /// Global difficulty scalar, recomputed every playing frame
    pub game_speed: f32,

    pub run_started_ms: f64,
    pub countdown_started_ms: f64,
    pub last_countdown_digit: u32,
    pub last_distance_ms: f64,

    /// Water-blast flash over ground fires
    pub flash_until_ms: f64,
    pub flash_intensity: f32,
    pub flash_duration_ms: f64,

    /// Run-ending explosion still animating after the phase flipped
    pub explosion_active: bool,
    pub truck_on_fire: bool,

    pub trees: Vec<TreeSprite>,
    pub scenery: Vec<ScenerySprite>,

    pub rng: Pcg32,
    pub seed: u64,
}

impl GameState {
    pub fn new(seed: u64, view_w: f32, view_h: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let trees = (0..15).map(|_| random_tree(&mut rng, view_w, view_h)).collect();
        let scenery = (0..10)
            .map(|_| random_scenery(&mut rng, view_w, view_h))
            .collect();

        Self {
            phase: GamePhase::Presentation,
            view_w,
            view_h,
            truck: Truck::new(view_w, view_h),
            hazards: Vec::new(),
            ground_fires: Vec::new(),
            sparks: Pool::new(SPARK_POOL_SIZE),
            debris: Pool::new(DEBRIS_POOL_SIZE),
            combo: ComboTracker::new(),
            powerups: PowerUpSystem::new(),
            alert: ExtremeSpeedAlert::new(),
            stats: RunStats::default(),
            game_speed: 1.0,
            run_started_ms: 0.0,
            countdown_started_ms: 0.0,
            last_countdown_digit: COUNTDOWN_SECONDS,
            last_distance_ms: 0.0,
            flash_until_ms: 0.0,
            flash_intensity: 0.0,
            flash_duration_ms: GROUND_FIRE_FLASH_MS,
            explosion_active: false,
            truck_on_fire: false,
            trees,
            scenery,
            rng,
            seed,
        }
    }

    /// Track a viewport resize; keeps the truck on screen.
    pub fn resize(&mut self, view_w: f32, view_h: f32) {
        self.view_w = view_w;
        self.view_h = view_h;
        self.truck.y = view_h - TRUCK_BOTTOM_OFFSET;
        if self.truck.x > view_w - self.truck.width {
            self.truck.x = (view_w - self.truck.width).max(0.0);
        }
    }

    /// Elapsed playtime in whole seconds.
    pub fn elapsed_secs(&self, now_ms: f64) -> u32 {
        if now_ms <= self.run_started_ms {
            return 0;
        }
        ((now_ms - self.run_started_ms) / 1000.0) as u32
    }

    /// Begin the pre-run countdown from the title screen.
    pub fn begin_countdown(&mut self, now_ms: f64) {
        self.phase = GamePhase::Countdown;
        self.countdown_started_ms = now_ms;
        self.last_countdown_digit = COUNTDOWN_SECONDS;
    }

    /// Reset everything for a live run.
    pub fn start_run(&mut self, now_ms: f64) {
        self.phase = GamePhase::Playing;
        self.run_started_ms = now_ms;
        self.last_distance_ms = now_ms;
        self.stats = RunStats::default();
        self.game_speed = 1.0;
        self.hazards.clear();
        self.ground_fires.clear();
        self.sparks.clear();
        self.debris.clear();
        self.flash_until_ms = 0.0;
        self.flash_intensity = 0.0;
        self.flash_duration_ms = GROUND_FIRE_FLASH_MS;
        self.explosion_active = false;
        self.truck_on_fire = false;
        self.combo.start_run();
        self.powerups.reset(now_ms);
        self.alert.reset();
        self.truck = Truck::new(self.view_w, self.view_h);
        self.truck.y = self.view_h - TRUCK_BOTTOM_OFFSET;
    }

    /// Collision resolution reached the run-ending path.
    pub fn finish_run(&mut self, now_ms: f64) {
        self.phase = GamePhase::GameOver;
        self.stats.time_secs = self.elapsed_secs(now_ms);
        self.stats.peak_combo = self.combo.peak();
        self.truck_on_fire = true;
        self.explosion_active = true;
        let center = self.truck.center();
        self.spawn_explosion(center.x, center.y);
        self.powerups.reset(now_ms);
        self.alert.reset();
    }

    /// Back to the title screen from game over.
    pub fn reset_to_presentation(&mut self, now_ms: f64) {
        self.phase = GamePhase::Presentation;
        self.stats = RunStats::default();
        self.game_speed = 1.0;
        self.hazards.clear();
        self.ground_fires.clear();
        self.sparks.clear();
        self.debris.clear();
        self.flash_until_ms = 0.0;
        self.flash_intensity = 0.0;
        self.flash_duration_ms = GROUND_FIRE_FLASH_MS;
        self.explosion_active = false;
        self.truck_on_fire = false;
        self.truck.last_speed = 0.0;
        self.combo.start_run();
        self.powerups.reset(now_ms);
        self.alert.reset();
    }

    /// Burst of five sparks around a point, used for every small effect.
    pub fn spawn_sparks(&mut self, x: f32, y: f32, color: [u8; 3]) {
        let rng = &mut self.rng;
        self.sparks.spawn(5, |spark| {
            spark.pos = Vec2::new(x + rng.random::<f32>() * 20.0, y + rng.random::<f32>() * 20.0);
            spark.vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * 4.0,
                (rng.random::<f32>() - 0.5) * 4.0,
            );
            spark.life = 30.0 + rng.random::<f32>() * 20.0;
            spark.max_life = 50.0;
            spark.color = color;
        });
    }

    /// Run-ending explosion burst.
    pub fn spawn_explosion(&mut self, x: f32, y: f32) {
        let rng = &mut self.rng;
        self.debris.spawn(30, |d| {
            d.pos = Vec2::new(x, y);
            d.vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * 15.0,
                (rng.random::<f32>() - 0.5) * 15.0,
            );
            d.life = 60.0 + rng.random::<f32>() * 40.0;
            d.max_life = 100.0;
            d.size = 2.0 + rng.random::<f32>() * 8.0;
            d.hue = if rng.random::<f32>() < 0.7 { 30.0 } else { 0.0 };
            d.lightness = 70.0 + rng.random::<f32>() * 30.0;
        });
    }

    /// Host calls this once the game-over screen has settled.
    pub fn clear_explosion(&mut self) {
        self.truck_on_fire = false;
        self.explosion_active = false;
        self.debris.clear();
        self.combo.reset();
    }

    /// Remaining water-flash strength in [0, 1]; zero once elapsed.
    pub fn flash_strength(&self, now_ms: f64) -> f32 {
        if self.flash_until_ms <= now_ms {
            return 0.0;
        }
        (((self.flash_until_ms - now_ms) / self.flash_duration_ms).min(1.0)) as f32
    }
}

fn random_tree(rng: &mut Pcg32, view_w: f32, view_h: f32) -> TreeSprite {
    TreeSprite {
        x: view_w + 50.0 + rng.random::<f32>() * 200.0,
        y: rng.random::<f32>() * view_h,
        size: 20.0 + rng.random::<f32>() * 40.0,
        shape: match rng.random_range(0..3) {
            0 => TreeShape::Oak,
            1 => TreeShape::Birch,
            _ => TreeShape::Pine,
        },
        sway_offset: rng.random::<f32>() * std::f32::consts::TAU,
        speed: 1.0 + rng.random::<f32>() * 2.0,
    }
}

fn random_scenery(rng: &mut Pcg32, view_w: f32, view_h: f32) -> ScenerySprite {
    ScenerySprite {
        x: view_w + 50.0 + rng.random::<f32>() * 100.0,
        y: rng.random::<f32>() * view_h,
        size: 10.0 + rng.random::<f32>() * 20.0,
        kind: if rng.random::<f32>() < 0.5 {
            SceneryKind::Rock
        } else {
            SceneryKind::Bush
        },
        speed: 0.5 + rng.random::<f32>() * 1.5,
    }
}
