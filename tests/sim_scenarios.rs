//! Whole-game scenarios driven through the public tick API with a
//! synthetic clock.

use ember_dash::Settings;
use ember_dash::highscores::{BestRecords, RecordKind};
use ember_dash::sim::{
    GameEvent, GamePhase, GameState, Hazard, HazardClass, TickInput, tick,
};

const W: f32 = 400.0;
const H: f32 = 800.0;
const FRAME_MS: f64 = 1000.0 / 60.0;

fn confirm() -> TickInput {
    TickInput {
        confirm: true,
        ..TickInput::default()
    }
}

/// Drive a fresh state through countdown into a live run starting at `t0`.
fn start_playing(seed: u64, t0: f64) -> GameState {
    let settings = Settings::default();
    let mut state = GameState::new(seed, W, H);
    tick(&mut state, &confirm(), &settings, t0 - 4_100.0);
    tick(&mut state, &TickInput::default(), &settings, t0);
    assert_eq!(state.phase, GamePhase::Playing);
    state
}

#[test]
fn full_lifecycle_presentation_to_reset() {
    let settings = Settings::default();
    let mut state = GameState::new(99, W, H);
    assert_eq!(state.phase, GamePhase::Presentation);

    // Shake starts the countdown; digits land once a second.
    let result = tick(&mut state, &confirm(), &settings, 1_000.0);
    assert_eq!(state.phase, GamePhase::Countdown);
    assert!(result.events.contains(&GameEvent::CountdownTick(3)));

    let mut digits = Vec::new();
    for step in 1..=5 {
        let result = tick(
            &mut state,
            &TickInput::default(),
            &settings,
            1_000.0 + step as f64 * 1_000.0 + 50.0,
        );
        for event in result.events {
            if let GameEvent::CountdownTick(d) = event {
                digits.push(d);
            }
        }
    }
    assert_eq!(digits, vec![2, 1, 0]);
    assert_eq!(state.phase, GamePhase::Playing);

    // Force the run-ending collision.
    let truck = state.truck.bounds();
    state.hazards.push(Hazard {
        x: truck.x,
        y: truck.y,
        size: 30.0,
        speed: 0.0,
        intensity: 0.7,
        class: HazardClass::Normal,
    });
    let result = tick(&mut state, &TickInput::default(), &settings, 20_000.0);
    assert!(result.run_ended);
    assert_eq!(state.phase, GamePhase::GameOver);

    // Shake again resets to the title screen.
    tick(&mut state, &confirm(), &settings, 25_000.0);
    assert_eq!(state.phase, GamePhase::Presentation);
    assert_eq!(state.stats.score, 0);
    assert!(state.hazards.is_empty());
}

#[test]
fn score_and_dodges_accumulate_over_a_long_session() {
    let settings = Settings::default();
    let mut state = start_playing(7, 0.0);

    let mut now = 0.0;
    let mut last_score = 0;
    for _ in 0..(15 * 60) {
        now += FRAME_MS;
        tick(&mut state, &TickInput::default(), &settings, now);
        assert_eq!(state.phase, GamePhase::Playing);

        // Score never decreases while playing.
        assert!(state.stats.score >= last_score);
        last_score = state.stats.score;

        // Emulate a player that always gets out of the way: cull anything
        // that would reach the truck's lane, before it gets close.
        let lane = state.truck.bounds();
        state.hazards.retain(|h| {
            h.y < lane.y - 100.0 || h.x + h.size <= lane.x || h.x >= lane.x + lane.w
        });
    }

    // Fifteen seconds of hazard rain produces dodges; anything on top of
    // the per-dodge score can only be a water-blast bonus.
    assert!(state.stats.dodges > 0);
    assert!(state.stats.score >= state.stats.dodges * 10);
    assert!(state.stats.time_secs >= 14);
}

#[test]
fn session_peak_combo_survives_into_frozen_stats() {
    let settings = Settings::default();
    let mut state = start_playing(3, 0.0);

    // Dodge three hazards in quick succession by dropping them just above
    // the bottom edge, away from the truck.
    for i in 0..3 {
        state.hazards.push(Hazard {
            x: 5.0,
            y: H - 1.0,
            size: 20.0,
            speed: 2.0,
            intensity: 0.6,
            class: HazardClass::Normal,
        });
        tick(
            &mut state,
            &TickInput::default(),
            &settings,
            100.0 + i as f64 * 100.0,
        );
    }
    assert!(state.combo.peak() >= 3);

    let truck = state.truck.bounds();
    state.hazards.push(Hazard {
        x: truck.x,
        y: truck.y,
        size: 30.0,
        speed: 0.0,
        intensity: 0.7,
        class: HazardClass::Normal,
    });
    tick(&mut state, &TickInput::default(), &settings, 1_000.0);

    assert_eq!(state.phase, GamePhase::GameOver);
    assert!(state.stats.peak_combo >= 3);
    assert_eq!(state.stats.time_secs, 1);
}

#[test]
fn finished_run_merges_into_best_records() {
    let settings = Settings::default();
    let mut state = start_playing(5, 0.0);

    state.hazards.push(Hazard {
        x: 5.0,
        y: H - 1.0,
        size: 20.0,
        speed: 2.0,
        intensity: 0.6,
        class: HazardClass::Normal,
    });
    tick(&mut state, &TickInput::default(), &settings, 500.0);
    assert_eq!(state.stats.score, 10);

    let truck = state.truck.bounds();
    state.hazards.push(Hazard {
        x: truck.x,
        y: truck.y,
        size: 30.0,
        speed: 0.0,
        intensity: 0.7,
        class: HazardClass::Normal,
    });
    tick(&mut state, &TickInput::default(), &settings, 12_000.0);
    assert_eq!(state.phase, GamePhase::GameOver);

    let mut records = BestRecords::new();
    let broken = records.evaluate(&state.stats);
    assert!(broken.contains(&RecordKind::Score));
    assert!(broken.contains(&RecordKind::Time));
    assert_eq!(records.best_score, 10);
    assert_eq!(records.best_time, 12);
    assert_eq!(records.runs_played, 1);
}

#[test]
fn assist_preference_gates_score_dilation() {
    // With the assist on, the difficulty scalar halves under slow-motion;
    // with it off the raw scalar is kept. Drive both through real ticks.
    let mut state_on = start_playing(21, 0.0);
    let mut state_off = start_playing(21, 0.0);

    let assist_on = Settings::default();
    let assist_off = Settings {
        slow_motion_assist: false,
        ..Settings::default()
    };

    // Reach 20s of elapsed play, then compare scalars under slow-motion.
    tick(&mut state_on, &TickInput::default(), &assist_on, 20_000.0);
    tick(&mut state_off, &TickInput::default(), &assist_off, 20_000.0);

    force_slow_motion(&mut state_on, 20_000.0, &assist_on);
    force_slow_motion(&mut state_off, 20_000.0, &assist_off);

    tick(&mut state_on, &TickInput::default(), &assist_on, 20_100.0);
    tick(&mut state_off, &TickInput::default(), &assist_off, 20_100.0);

    let raw = 0.8 + 20.0 * 0.03;
    assert!((state_off.game_speed - raw).abs() < 1e-3, "assist off keeps the raw scalar");
    assert!((state_on.game_speed - raw * 0.5).abs() < 1e-3, "assist on halves it");
}

fn force_slow_motion(state: &mut GameState, now_ms: f64, settings: &Settings) {
    use ember_dash::sim::{Pickup, PickupKind};
    let truck = state.truck.bounds();
    state.powerups.spawn_pickup(Pickup {
        kind: PickupKind::SlowMo,
        x: truck.x,
        y: truck.y,
        size: 32.0,
        speed: 0.0,
    });
    tick(state, &TickInput::default(), settings, now_ms);
    assert!(state.powerups.is_slow_motion_active());
}
