//! Pickups and timed buffs.
//!
//! Two independent timed flags (shield, slow-motion) plus the instant water
//! blast. All expiries are wall-clock timestamps fed in from the tick, never
//! frame counts.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{ClearMagnitude, GroundFire, Hazard, Pickup, PickupKind};
use crate::Rect;
use crate::consts::*;

/// Outcome of a water blast, reported to the host for audio/flash scaling.
#[derive(Debug, Clone)]
pub struct WaterBlastOutcome {
    pub airborne_cleared: usize,
    pub ground_cleared: usize,
    pub bonus: u32,
    pub magnitude: ClearMagnitude,
    /// Where cleared hazards were, for particle bursts
    pub cleared_positions: Vec<(f32, f32)>,
}

/// Effects raised while updating the power-up system this frame.
#[derive(Debug, Clone)]
pub enum PowerUpEffect {
    Collected {
        kind: PickupKind,
        x: f32,
        y: f32,
        size: f32,
    },
    ShieldEngaged,
    SlowMotionEngaged,
    WaterBlast(WaterBlastOutcome),
    ShieldExpired,
    SlowMotionExpired,
}

/// Single-line power-up indicator content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub active: bool,
}

#[derive(Debug)]
pub struct PowerUpSystem {
    pickups: Vec<Pickup>,
    shield_active: bool,
    shield_expires_ms: f64,
    slowmo_active: bool,
    slowmo_expires_ms: f64,
    /// Transient status message; empty means none
    transient: String,
    transient_expires_ms: f64,
    last_spawn_ms: f64,
}

impl Default for PowerUpSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerUpSystem {
    pub fn new() -> Self {
        Self {
            pickups: Vec::new(),
            shield_active: false,
            shield_expires_ms: 0.0,
            slowmo_active: false,
            slowmo_expires_ms: 0.0,
            transient: String::new(),
            transient_expires_ms: 0.0,
            last_spawn_ms: 0.0,
        }
    }

    /// Drop all buffs and pickups. Backdates the spawn cooldown so a fresh
    /// run does not wait a full cooldown for its first pickup.
    pub fn reset(&mut self, now_ms: f64) {
        self.pickups.clear();
        self.shield_active = false;
        self.shield_expires_ms = 0.0;
        self.slowmo_active = false;
        self.slowmo_expires_ms = 0.0;
        self.transient.clear();
        self.transient_expires_ms = 0.0;
        self.last_spawn_ms = now_ms - PICKUP_COOLDOWN_MS;
    }

    /// Roll the per-frame spawn chance, gated by the concurrent cap and the
    /// cooldown. The chance itself is halved while slow-motion runs so buffs
    /// do not stack back-to-back.
    pub fn maybe_spawn(&mut self, view_w: f32, now_ms: f64, rng: &mut Pcg32) -> bool {
        if self.pickups.len() >= PICKUP_MAX_ACTIVE {
            return false;
        }
        if now_ms - self.last_spawn_ms < PICKUP_COOLDOWN_MS {
            return false;
        }

        let chance = if self.slowmo_active {
            PICKUP_SLOWMO_CHANCE
        } else {
            PICKUP_BASE_CHANCE
        };
        if rng.random::<f64>() >= chance {
            return false;
        }

        let kind = match rng.random_range(0..3) {
            0 => PickupKind::Shield,
            1 => PickupKind::Water,
            _ => PickupKind::SlowMo,
        };
        self.pickups.push(Pickup {
            kind,
            x: rng.random::<f32>() * (view_w - PICKUP_SIZE),
            y: -PICKUP_SIZE,
            size: PICKUP_SIZE,
            speed: 1.0 + rng.random::<f32>() * 1.5,
        });
        self.last_spawn_ms = now_ms;
        true
    }

    /// Advance pickups, collect on truck overlap, and expire buffs.
    ///
    /// A collected water pickup clears `hazards` and `ground_fires` in
    /// place; the outcome carries what was cleared.
    pub fn update(
        &mut self,
        now_ms: f64,
        view_h: f32,
        truck: &Rect,
        hazards: &mut Vec<Hazard>,
        ground_fires: &mut Vec<GroundFire>,
    ) -> Vec<PowerUpEffect> {
        let mut effects = Vec::new();

        for i in (0..self.pickups.len()).rev() {
            self.pickups[i].y += self.pickups[i].speed;

            if self.pickups[i].y > view_h + self.pickups[i].size {
                self.pickups.remove(i);
                continue;
            }

            if truck.overlaps(&self.pickups[i].bounds()) {
                let pickup = self.pickups.remove(i);
                effects.push(PowerUpEffect::Collected {
                    kind: pickup.kind,
                    x: pickup.x,
                    y: pickup.y,
                    size: pickup.size,
                });
                match pickup.kind {
                    PickupKind::Shield => {
                        self.activate_shield(now_ms);
                        effects.push(PowerUpEffect::ShieldEngaged);
                    }
                    PickupKind::Water => {
                        let outcome = self.water_blast(now_ms, hazards, ground_fires);
                        effects.push(PowerUpEffect::WaterBlast(outcome));
                    }
                    PickupKind::SlowMo => {
                        self.activate_slow_motion(now_ms);
                        effects.push(PowerUpEffect::SlowMotionEngaged);
                    }
                }
            }
        }

        effects.extend(self.expire_buffs(now_ms));
        effects
    }

    fn activate_shield(&mut self, now_ms: f64) {
        self.shield_active = true;
        self.shield_expires_ms = now_ms + SHIELD_DURATION_MS;
        self.set_transient("\u{1f6e1}\u{fe0f} Shield engaged", now_ms, 1200.0);
    }

    fn activate_slow_motion(&mut self, now_ms: f64) {
        self.slowmo_active = true;
        self.slowmo_expires_ms = now_ms + SLOWMO_DURATION_MS;
        self.set_transient("\u{1f422} Bullet time", now_ms, 1500.0);
    }

    fn water_blast(
        &mut self,
        now_ms: f64,
        hazards: &mut Vec<Hazard>,
        ground_fires: &mut Vec<GroundFire>,
    ) -> WaterBlastOutcome {
        let cleared_positions: Vec<(f32, f32)> = hazards.iter().map(|h| (h.x, h.y)).collect();
        let airborne_cleared = hazards.len();
        let ground_cleared = ground_fires.len();
        hazards.clear();
        ground_fires.clear();

        let bonus = water_bonus(airborne_cleared);
        self.set_transient("\u{1f4a7} Water blast!", now_ms, 2000.0);

        WaterBlastOutcome {
            airborne_cleared,
            ground_cleared,
            bonus,
            magnitude: ClearMagnitude::from_cleared(airborne_cleared),
            cleared_positions,
        }
    }

    fn expire_buffs(&mut self, now_ms: f64) -> Vec<PowerUpEffect> {
        let mut effects = Vec::new();

        if self.shield_active && now_ms > self.shield_expires_ms {
            self.shield_active = false;
            self.set_transient("\u{1f6e1}\u{fe0f} Shield depleted", now_ms, 1200.0);
            effects.push(PowerUpEffect::ShieldExpired);
        }

        if self.slowmo_active && now_ms > self.slowmo_expires_ms {
            self.slowmo_active = false;
            self.set_transient("\u{1f422} Normal time", now_ms, 1200.0);
            effects.push(PowerUpEffect::SlowMotionExpired);
        }

        if !self.transient.is_empty() && now_ms >= self.transient_expires_ms {
            self.transient.clear();
        }

        effects
    }

    fn set_transient(&mut self, text: &str, now_ms: f64, hold_ms: f64) {
        self.transient = text.to_owned();
        self.transient_expires_ms = now_ms + hold_ms;
    }

    /// Single-line indicator, in priority order: shield countdown, slow-mo
    /// countdown, unexpired transient message, neutral default. Countdown
    /// seconds are the ceiling of the remaining milliseconds.
    pub fn status_line(&self, now_ms: f64) -> StatusLine {
        let transient_prefix = if !self.transient.is_empty() && now_ms < self.transient_expires_ms {
            format!("{} \u{b7} ", self.transient)
        } else {
            String::new()
        };

        if self.shield_active {
            let remaining = remaining_secs(self.shield_expires_ms, now_ms);
            return StatusLine {
                text: format!("{transient_prefix}\u{1f6e1}\u{fe0f} Shield ({remaining}s)"),
                active: true,
            };
        }

        if self.slowmo_active {
            let remaining = remaining_secs(self.slowmo_expires_ms, now_ms);
            return StatusLine {
                text: format!("{transient_prefix}\u{1f422} Bullet time ({remaining}s)"),
                active: true,
            };
        }

        if !self.transient.is_empty() && now_ms < self.transient_expires_ms {
            return StatusLine {
                text: self.transient.clone(),
                active: true,
            };
        }

        StatusLine {
            text: "No power-ups".to_owned(),
            active: false,
        }
    }

    pub fn is_shield_active(&self) -> bool {
        self.shield_active
    }

    /// Whether the shield absorbs a hit happening at `now_ms`. Collision
    /// resolution runs before buff bookkeeping each frame, so the absorb
    /// rule checks the expiry itself rather than the lazy flag.
    pub fn shield_covers(&self, now_ms: f64) -> bool {
        self.shield_active && now_ms < self.shield_expires_ms
    }

    pub fn is_slow_motion_active(&self) -> bool {
        self.slowmo_active
    }

    /// Multiplier on the global difficulty scalar.
    pub fn game_factor(&self) -> f32 {
        if self.slowmo_active { SLOWMO_GAME_FACTOR } else { 1.0 }
    }

    /// Multiplier on hazard descent speed.
    pub fn fire_factor(&self) -> f32 {
        if self.slowmo_active { SLOWMO_FIRE_FACTOR } else { 1.0 }
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    /// Insert a pickup directly, bypassing the spawn gating. Debug and test
    /// hook; normal spawning goes through `maybe_spawn`.
    pub fn spawn_pickup(&mut self, pickup: Pickup) {
        self.pickups.push(pickup);
    }
}

/// Score bonus for a water blast: 50 base plus 8 per extra hazard cleared,
/// capped at +40. Tuned by feel; keep the constants as they are.
fn water_bonus(airborne_cleared: usize) -> u32 {
    if airborne_cleared == 0 {
        return 0;
    }
    50 + ((airborne_cleared as u32 - 1) * 8).min(40)
}

fn remaining_secs(expires_ms: f64, now_ms: f64) -> u32 {
    ((expires_ms - now_ms).max(0.0) / 1000.0).ceil() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::HazardClass;
    use rand::SeedableRng;

    fn test_rng() -> Pcg32 {
        Pcg32::seed_from_u64(7)
    }

    fn hazard_at(x: f32, y: f32) -> Hazard {
        Hazard {
            x,
            y,
            size: 30.0,
            speed: 2.0,
            intensity: 0.7,
            class: HazardClass::Normal,
        }
    }

    fn ground_fire_at(x: f32) -> GroundFire {
        GroundFire {
            x,
            y: 775.0,
            width: 40.0,
            created_at_ms: 0.0,
            duration_ms: 2_800.0,
            flicker_seed: 0.0,
        }
    }

    fn truck_rect() -> Rect {
        Rect { x: 100.0, y: 700.0, w: 60.0, h: 90.0 }
    }

    #[test]
    fn shield_expires_on_the_clock() {
        let mut system = PowerUpSystem::new();
        system.reset(0.0);
        system.activate_shield(1_000.0);
        assert!(system.is_shield_active());

        let mut hazards = Vec::new();
        let mut fires = Vec::new();
        let effects = system.update(5_999.0, 800.0, &truck_rect(), &mut hazards, &mut fires);
        assert!(system.is_shield_active());
        assert!(effects.is_empty());

        let effects = system.update(6_001.0, 800.0, &truck_rect(), &mut hazards, &mut fires);
        assert!(!system.is_shield_active());
        assert!(matches!(effects[0], PowerUpEffect::ShieldExpired));
    }

    #[test]
    fn slow_motion_exposes_both_factors() {
        let mut system = PowerUpSystem::new();
        system.reset(0.0);
        assert_eq!(system.game_factor(), 1.0);
        assert_eq!(system.fire_factor(), 1.0);

        system.activate_slow_motion(0.0);
        assert_eq!(system.game_factor(), 0.5);
        assert_eq!(system.fire_factor(), 0.55);
    }

    #[test]
    fn water_blast_empties_both_lists_and_scores() {
        let mut system = PowerUpSystem::new();
        system.reset(0.0);
        let mut hazards = vec![hazard_at(10.0, 50.0), hazard_at(60.0, 90.0)];
        let mut fires = vec![ground_fire_at(30.0)];

        let outcome = system.water_blast(1_000.0, &mut hazards, &mut fires);
        assert!(hazards.is_empty());
        assert!(fires.is_empty());
        assert_eq!(outcome.airborne_cleared, 2);
        assert_eq!(outcome.ground_cleared, 1);
        assert_eq!(outcome.bonus, 58);
        assert_eq!(outcome.magnitude, ClearMagnitude::Small);
        assert_eq!(outcome.cleared_positions.len(), 2);
    }

    #[test]
    fn water_blast_on_empty_field_awards_nothing() {
        let mut system = PowerUpSystem::new();
        system.reset(0.0);
        let mut hazards = Vec::new();
        let mut fires = Vec::new();

        let outcome = system.water_blast(1_000.0, &mut hazards, &mut fires);
        assert_eq!(outcome.bonus, 0);
        assert_eq!(outcome.magnitude, ClearMagnitude::None);
    }

    #[test]
    fn water_bonus_is_capped() {
        assert_eq!(water_bonus(0), 0);
        assert_eq!(water_bonus(1), 50);
        assert_eq!(water_bonus(3), 66);
        assert_eq!(water_bonus(6), 90);
        assert_eq!(water_bonus(40), 90, "bonus caps at 50 + 40");
    }

    #[test]
    fn pickup_collected_on_overlap() {
        let mut system = PowerUpSystem::new();
        system.reset(0.0);
        let truck = truck_rect();
        system.spawn_pickup(Pickup {
            kind: PickupKind::Shield,
            x: truck.x + 10.0,
            y: truck.y - 1.0,
            size: 32.0,
            speed: 2.0,
        });

        let mut hazards = Vec::new();
        let mut fires = Vec::new();
        let effects = system.update(100.0, 800.0, &truck, &mut hazards, &mut fires);

        assert!(system.pickups().is_empty());
        assert!(system.is_shield_active());
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, PowerUpEffect::Collected { kind: PickupKind::Shield, .. }))
        );
    }

    #[test]
    fn offscreen_pickup_is_discarded() {
        let mut system = PowerUpSystem::new();
        system.reset(0.0);
        system.spawn_pickup(Pickup {
            kind: PickupKind::Water,
            x: 0.0,
            y: 900.0,
            size: 32.0,
            speed: 2.0,
        });

        let mut hazards = vec![hazard_at(10.0, 50.0)];
        let mut fires = Vec::new();
        system.update(100.0, 800.0, &truck_rect(), &mut hazards, &mut fires);

        assert!(system.pickups().is_empty());
        assert_eq!(hazards.len(), 1, "discard must not trigger the effect");
    }

    #[test]
    fn spawn_respects_cooldown_and_cap() {
        let mut system = PowerUpSystem::new();
        let mut rng = test_rng();
        system.reset(10_000.0);

        // Cooldown was backdated by reset, so only the chance gates us now.
        let mut spawned = false;
        for frame in 0..20_000 {
            if system.maybe_spawn(400.0, 10_000.0 + frame as f64, &mut rng) {
                spawned = true;
                break;
            }
        }
        assert!(spawned, "0.35% per-frame chance should land within 20k rolls");

        // Immediately after a spawn the cooldown blocks everything.
        let t = system.last_spawn_ms;
        for frame in 0..100 {
            assert!(!system.maybe_spawn(400.0, t + frame as f64, &mut rng));
        }

        // Concurrent cap blocks regardless of cooldown.
        system.spawn_pickup(Pickup {
            kind: PickupKind::SlowMo,
            x: 0.0,
            y: 0.0,
            size: 32.0,
            speed: 1.0,
        });
        assert!(system.pickups().len() >= PICKUP_MAX_ACTIVE - 1);
        system.spawn_pickup(Pickup {
            kind: PickupKind::SlowMo,
            x: 0.0,
            y: 0.0,
            size: 32.0,
            speed: 1.0,
        });
        for frame in 0..20_000 {
            assert!(!system.maybe_spawn(400.0, t + 100_000.0 + frame as f64, &mut rng));
        }
    }

    #[test]
    fn status_line_priority_and_ceiling() {
        let mut system = PowerUpSystem::new();
        system.reset(0.0);

        let neutral = system.status_line(0.0);
        assert_eq!(neutral.text, "No power-ups");
        assert!(!neutral.active);

        system.activate_shield(1_000.0);
        system.activate_slow_motion(3_000.0);

        // Shield outranks slow-mo; 4999ms remaining rounds up to 5s.
        let line = system.status_line(1_001.0);
        assert!(line.active);
        assert!(line.text.contains("Shield (5s)"), "got: {}", line.text);

        // 1ms remaining still shows 1s.
        let line = system.status_line(5_999.0);
        assert!(line.text.contains("Shield (1s)"), "got: {}", line.text);

        // After shield expiry the slow-mo countdown takes over.
        let mut hazards = Vec::new();
        let mut fires = Vec::new();
        system.update(6_100.0, 800.0, &truck_rect(), &mut hazards, &mut fires);
        let line = system.status_line(6_100.0);
        assert!(line.text.contains("Bullet time (1s)"), "got: {}", line.text);
    }

    #[test]
    fn transient_message_shows_after_buffs_lapse() {
        let mut system = PowerUpSystem::new();
        system.reset(0.0);
        system.activate_shield(0.0);

        let mut hazards = Vec::new();
        let mut fires = Vec::new();
        system.update(5_001.0, 800.0, &truck_rect(), &mut hazards, &mut fires);

        let line = system.status_line(5_100.0);
        assert!(line.active);
        assert!(line.text.contains("Shield depleted"), "got: {}", line.text);

        // Transient expires 1200ms after it was set.
        system.update(6_300.0, 800.0, &truck_rect(), &mut hazards, &mut fires);
        let line = system.status_line(6_300.0);
        assert_eq!(line.text, "No power-ups");
    }
}
