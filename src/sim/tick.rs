//! Per-frame simulation tick
//!
//! The orchestrator: advances the phase machine and, while playing,
//! sequences truck movement, hazards, power-ups, particle pools, difficulty,
//! combo/alert timers, and the decorative background. One call per animation
//! frame; `now_ms` is the injected wall clock.

use rand::Rng;

use super::difficulty::{difficulty_scalar, spawn_probability};
use super::powerups::PowerUpEffect;
use super::state::{
    GameEvent, GamePhase, GameState, GroundFire, Hazard, HazardClass, PickupKind,
};
use crate::Settings;
use crate::consts::*;

/// Input sample for a single animation frame.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keyboard steering (large screens)
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// True when the keyboard path drives the truck; otherwise tilt does
    pub use_keyboard: bool,
    /// Device tilt (gamma) in degrees; clamped to the max tilt here
    pub tilt: f32,
    /// One-shot confirm (shake, tap, Enter), disambiguated by phase
    pub confirm: bool,
}

/// Per-frame outcome handed back to the host.
#[derive(Debug, Default)]
pub struct TickResult {
    pub events: Vec<GameEvent>,
    /// The collision path ended the run this frame
    pub run_ended: bool,
}

/// Advance the game by one animation frame.
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    settings: &Settings,
    now_ms: f64,
) -> TickResult {
    let mut result = TickResult::default();

    match state.phase {
        GamePhase::Presentation => {
            if input.confirm {
                state.begin_countdown(now_ms);
                result
                    .events
                    .push(GameEvent::CountdownTick(COUNTDOWN_SECONDS));
            }
        }
        GamePhase::Countdown => update_countdown(state, now_ms, &mut result),
        GamePhase::Playing => update_playing(state, input, settings, now_ms, &mut result),
        GamePhase::GameOver => {
            if input.confirm {
                state.reset_to_presentation(now_ms);
            }
        }
        GamePhase::Map => {}
    }

    // Ground fires burn out on their own clock, whatever the phase.
    state.ground_fires.retain(|fire| !fire.expired(now_ms));

    // The run-ending explosion keeps animating after the phase flips.
    if state.explosion_active {
        state.debris.update(|d, _| {
            d.pos += d.vel;
            d.vel.x *= 0.98;
            d.vel.y += 0.2;
            d.life -= 1.0;
            d.life > 0.0
        });
    }

    result
}

fn update_countdown(state: &mut GameState, now_ms: f64, result: &mut TickResult) {
    let elapsed_ms = now_ms - state.countdown_started_ms;
    if elapsed_ms >= (COUNTDOWN_SECONDS as f64 + 1.0) * 1000.0 {
        state.start_run(now_ms);
        result.events.push(GameEvent::RunStarted);
        return;
    }

    let digit = COUNTDOWN_SECONDS.saturating_sub((elapsed_ms / 1000.0) as u32);
    if digit != state.last_countdown_digit {
        state.last_countdown_digit = digit;
        result.events.push(GameEvent::CountdownTick(digit));
    }
}

fn update_playing(
    state: &mut GameState,
    input: &TickInput,
    settings: &Settings,
    now_ms: f64,
    result: &mut TickResult,
) {
    move_truck(state, input, settings, now_ms, result);
    update_hazards(state, now_ms, result);

    if state.phase == GamePhase::GameOver {
        result.run_ended = true;
        result.events.push(GameEvent::RunEnded);
        return;
    }

    update_powerups(state, now_ms, result);

    state.sparks.update(|s, _| {
        s.pos += s.vel;
        s.life -= 1.0;
        s.life > 0.0
    });

    update_difficulty(state, settings, now_ms, result);

    state.combo.update(now_ms);
    if state.alert.update(state.game_speed) {
        result.events.push(GameEvent::ExtremeAlertStarted);
    }

    update_background(state);
}

/// Step 1: read the input signal and move the truck, clamped to the screen.
fn move_truck(
    state: &mut GameState,
    input: &TickInput,
    settings: &Settings,
    now_ms: f64,
    result: &mut TickResult,
) {
    let view_w = state.view_w;
    let view_h = state.view_h;
    let truck = &mut state.truck;

    let mut move_speed = 0.0f32;
    if input.use_keyboard {
        let key_speed = truck.speed * 0.8 * settings.effective_keyboard_speed();
        if input.left {
            move_speed = -key_speed;
        }
        if input.right {
            move_speed = key_speed;
        }
        // Vertical travel is keyboard-only and kept off the screen edges
        if input.up && truck.y > 50.0 {
            truck.y -= key_speed * 0.3;
        }
        if input.down && truck.y < view_h - truck.height - 50.0 {
            truck.y += key_speed * 0.3;
        }
    } else {
        let tilt = input.tilt.clamp(-MAX_TILT_DEGREES, MAX_TILT_DEGREES);
        move_speed = tilt / MAX_TILT_DEGREES * truck.speed * settings.effective_gyro_sensitivity();
    }

    truck.x = (truck.x + move_speed).clamp(0.0, view_w - truck.width);

    // On-screen speed drives the HUD, the odometer, and engine audio.
    let display_speed = move_speed.abs() * 10.0;
    state.stats.current_speed = display_speed;
    if display_speed > state.stats.max_speed {
        state.stats.max_speed = display_speed;
    }

    if display_speed > 5.0 {
        result.events.push(GameEvent::EngineRumble(display_speed));
    }
    if (display_speed - truck.last_speed).abs() > 15.0 {
        result.events.push(GameEvent::SpeedBurst {
            accelerating: display_speed > truck.last_speed,
        });
    }
    truck.last_speed = display_speed;

    let dt_s = (now_ms - state.last_distance_ms) / 1000.0;
    if dt_s > 0.0 {
        state.stats.distance_km += (display_speed as f64 / 3600.0) * dt_s;
        state.last_distance_ms = now_ms;
    }
}

/// Step 2: advance hazards, resolve dodges and collisions.
fn update_hazards(state: &mut GameState, now_ms: f64, result: &mut TickResult) {
    let fire_factor = state.powerups.fire_factor();
    let truck_bounds = state.truck.bounds();

    let mut i = state.hazards.len();
    while i > 0 {
        i -= 1;
        state.hazards[i].y += state.hazards[i].speed * fire_factor;

        if state.hazards[i].y > state.view_h {
            let hazard = state.hazards.remove(i);
            resolve_dodge(state, &hazard, now_ms, result);
            continue;
        }

        if truck_bounds.overlaps(&state.hazards[i].bounds()) {
            if state.powerups.shield_covers(now_ms) {
                // Shield soaks the hit: the hazard is consumed silently.
                let hazard = state.hazards.remove(i);
                state.spawn_sparks(hazard.x, hazard.y, [129, 212, 250]);
                result.events.push(GameEvent::ShieldAbsorbed);
                continue;
            }
            state.finish_run(now_ms);
            return;
        }
    }
}

fn resolve_dodge(state: &mut GameState, hazard: &Hazard, now_ms: f64, result: &mut TickResult) {
    spawn_ground_fire(state, hazard, now_ms);

    state.stats.dodges += 1;
    state.stats.score += DODGE_SCORE;
    result.events.push(GameEvent::HazardDodged);

    if state.combo.register_dodge(now_ms) {
        result
            .events
            .push(GameEvent::ComboMilestone(state.combo.streak()));
    }

    if state.combo.indicator_active() {
        let bursts = (3 + state.combo.streak()).min(10);
        let center = state.truck.center();
        let x = center.x - state.truck.width / 2.0;
        let y = center.y - state.truck.height / 2.0;
        for _ in 0..bursts {
            state.spawn_sparks(x, y, [255, 235, 59]);
        }
    }
}

/// Dodged hazards leave a decaying ground fire at their horizontal center.
fn spawn_ground_fire(state: &mut GameState, hazard: &Hazard, now_ms: f64) {
    if state.ground_fires.len() >= GROUND_FIRE_CAP {
        state.ground_fires.remove(0);
    }

    let center_x = hazard.center_x();
    let width_factor = match hazard.class {
        HazardClass::Large => 1.8,
        HazardClass::Normal => 1.4,
    };
    let flicker_seed = state.rng.random::<f32>() * std::f32::consts::TAU;
    let view_h = state.view_h;

    state.ground_fires.push(GroundFire {
        x: center_x,
        y: view_h - 25.0,
        width: hazard.size * width_factor,
        created_at_ms: now_ms,
        duration_ms: GROUND_FIRE_DURATION_MS,
        flicker_seed,
    });

    state.spawn_sparks(center_x - 5.0, view_h - 45.0, [255, 140, 0]);
    state.spawn_sparks(center_x + 5.0, view_h - 40.0, [255, 94, 0]);
}

/// Step 3: pickups, buffs, and their side effects.
fn update_powerups(state: &mut GameState, now_ms: f64, result: &mut TickResult) {
    let truck_bounds = state.truck.bounds();
    let effects = {
        let GameState {
            powerups,
            hazards,
            ground_fires,
            view_h,
            ..
        } = state;
        powerups.update(now_ms, *view_h, &truck_bounds, hazards, ground_fires)
    };

    for effect in effects {
        match effect {
            PowerUpEffect::Collected { kind, x, y, size } => {
                let color = match kind {
                    PickupKind::Shield => [129, 212, 250],
                    PickupKind::Water => [129, 199, 132],
                    PickupKind::SlowMo => [255, 235, 59],
                };
                for _ in 0..6 {
                    let ox = x + state.rng.random::<f32>() * size;
                    let oy = y + state.rng.random::<f32>() * size;
                    state.spawn_sparks(ox, oy, color);
                }
                result.events.push(GameEvent::PickupCollected(kind));
            }
            PowerUpEffect::WaterBlast(outcome) => {
                for (x, y) in &outcome.cleared_positions {
                    state.spawn_sparks(*x, *y, [0, 150, 255]);
                }
                state.stats.score += outcome.bonus;

                let total = outcome.airborne_cleared + outcome.ground_cleared;
                state.flash_intensity = (total as f32 / 8.0).min(1.0);
                state.flash_duration_ms =
                    GROUND_FIRE_FLASH_MS * (1.0 + total.min(12) as f64 * 0.08);
                state.flash_until_ms = now_ms + state.flash_duration_ms;

                if outcome.ground_cleared > 0 {
                    let cx = state.truck.x + state.truck.width / 2.0;
                    let splash_y = state.view_h - 40.0;
                    state.spawn_sparks(cx, splash_y, [0, 188, 212]);
                }

                result.events.push(GameEvent::WaterBlast {
                    magnitude: outcome.magnitude,
                    airborne_cleared: outcome.airborne_cleared,
                    ground_cleared: outcome.ground_cleared,
                });
            }
            PowerUpEffect::ShieldExpired => result.events.push(GameEvent::ShieldExpired),
            PowerUpEffect::SlowMotionExpired => {
                result.events.push(GameEvent::SlowMotionExpired)
            }
            PowerUpEffect::ShieldEngaged | PowerUpEffect::SlowMotionEngaged => {}
        }
    }
}

/// Step 5: recompute the difficulty scalar and roll the spawn dice.
fn update_difficulty(
    state: &mut GameState,
    settings: &Settings,
    now_ms: f64,
    result: &mut TickResult,
) {
    let elapsed = state.elapsed_secs(now_ms);
    state.stats.time_secs = elapsed;

    // The assist preference decides whether the visual slow-down also
    // softens scoring difficulty.
    let dilation = if settings.slow_motion_assist {
        state.powerups.game_factor()
    } else {
        1.0
    };
    state.game_speed = difficulty_scalar(elapsed, dilation);

    let p = spawn_probability(elapsed, state.powerups.is_slow_motion_active());
    if state.rng.random::<f64>() < p {
        spawn_hazard(state, result);
    }

    let GameState {
        powerups,
        rng,
        view_w,
        ..
    } = state;
    powerups.maybe_spawn(*view_w, now_ms, rng);
}

/// One hazard above the visible area, scaled by the current difficulty.
fn spawn_hazard(state: &mut GameState, result: &mut TickResult) {
    let view_w = state.view_w;
    let game_speed = state.game_speed;
    let rng = &mut state.rng;

    let size = 30.0 + rng.random::<f32>() * 20.0;
    let hazard = Hazard {
        x: rng.random::<f32>() * (view_w - size),
        y: -size,
        size,
        speed: 1.5 + game_speed * 0.7 + rng.random::<f32>() * 2.0,
        intensity: 0.5 + rng.random::<f32>() * 0.5,
        class: if rng.random::<f32>() < 0.2 {
            HazardClass::Large
        } else {
            HazardClass::Normal
        },
    };
    state.hazards.push(hazard);

    if state.rng.random::<f64>() < 0.3 {
        result.events.push(GameEvent::FireCrackle);
    }
}

/// Step 7: drift the decorative forest right to left.
fn update_background(state: &mut GameState) {
    let game_speed = state.game_speed;
    let view_w = state.view_w;
    let view_h = state.view_h;
    let rng = &mut state.rng;

    for tree in &mut state.trees {
        tree.x -= tree.speed * game_speed;
        if tree.x + tree.size < -50.0 {
            tree.x = view_w + 50.0 + rng.random::<f32>() * 200.0;
            tree.y = rng.random::<f32>() * view_h;
        }
    }

    for prop in &mut state.scenery {
        prop.x -= prop.speed * game_speed;
        if prop.x + prop.size < -50.0 {
            prop.x = view_w + 50.0 + rng.random::<f32>() * 100.0;
            prop.y = rng.random::<f32>() * view_h;
        }
    }
}
