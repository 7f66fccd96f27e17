//! Ember Dash entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement};

    use ember_dash::audio::AudioEngine;
    use ember_dash::geo::RouteLog;
    use ember_dash::highscores::{self, BestRecords, RecordKind};
    use ember_dash::render::Renderer;
    use ember_dash::sim::{GameEvent, GamePhase, GameState, PickupKind, TickInput, tick};
    use ember_dash::Settings;

    /// Shake intensity (summed acceleration deltas) that counts as a confirm
    const SHAKE_THRESHOLD: f64 = 18.0;

    // JS binding for the vibration API; typed arrays do not coerce reliably
    #[wasm_bindgen(inline_js = "
        export function vibrate_pattern(pattern) {
            if (navigator.vibrate) {
                navigator.vibrate(Array.from(pattern));
            }
        }
    ")]
    extern "C" {
        fn vibrate_pattern(pattern: Vec<u32>);
    }

    /// Cached document handle with the lookups the HUD needs
    struct Dom {
        document: Document,
    }

    impl Dom {
        fn new() -> Self {
            let document = web_sys::window()
                .expect("no window")
                .document()
                .expect("no document");
            Self { document }
        }

        fn get(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn set_text(&self, id: &str, value: &str) {
            if let Some(el) = self.get(id) {
                el.set_text_content(Some(value));
            }
        }

        fn add_class(&self, id: &str, class: &str) {
            if let Some(el) = self.get(id) {
                let _ = el.class_list().add_1(class);
            }
        }

        fn remove_class(&self, id: &str, class: &str) {
            if let Some(el) = self.get(id) {
                let _ = el.class_list().remove_1(class);
            }
        }

        fn set_attr(&self, id: &str, name: &str, value: &str) {
            if let Some(el) = self.get(id) {
                let _ = el.set_attribute(name, value);
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        renderer: Renderer,
        audio: AudioEngine,
        settings: Settings,
        records: BestRecords,
        route: RouteLog,
        input: TickInput,
        dom: Dom,
        last_phase: GamePhase,
        // Shake detection
        last_accel: (f64, f64, f64),
        last_shake_ms: f64,
    }

    impl Game {
        fn new(seed: u64, renderer: Renderer, view_w: f32, view_h: f32) -> Self {
            let settings = Settings::load();
            let records = BestRecords::load();
            let audio = AudioEngine::new(settings.audio_enabled);
            let input = TickInput {
                use_keyboard: detect_large_screen(),
                ..TickInput::default()
            };

            Self {
                state: GameState::new(seed, view_w, view_h),
                renderer,
                audio,
                settings,
                records,
                route: RouteLog::new(),
                input,
                dom: Dom::new(),
                last_phase: GamePhase::Presentation,
                last_accel: (0.0, 0.0, 0.0),
                last_shake_ms: 0.0,
            }
        }

        fn vibrate(&self, pattern: &[u32]) {
            if self.settings.vibration_enabled {
                vibrate_pattern(pattern.to_vec());
            }
        }

        /// Advance the sim one frame and dispatch its side effects.
        /// Returns true when the run ended this frame.
        fn update(&mut self, now_ms: f64) -> bool {
            let input = self.input.clone();
            let result = tick(&mut self.state, &input, &self.settings, now_ms);
            // Clear one-shot inputs after processing
            self.input.confirm = false;

            let mut run_ended = false;
            for event in &result.events {
                self.audio.handle_event(event);
                match event {
                    GameEvent::CountdownTick(digit) => {
                        self.dom.set_text("countdown", &digit.to_string());
                    }
                    GameEvent::RunStarted => {
                        self.dom.set_text("countdown", "");
                        self.route.capture_start();
                        self.show_screen("game-screen");
                    }
                    GameEvent::ComboMilestone(_) => self.vibrate(&[120, 60, 120]),
                    GameEvent::PickupCollected(PickupKind::Shield) => self.vibrate(&[80, 40, 80]),
                    GameEvent::PickupCollected(PickupKind::Water) => {
                        self.vibrate(&[120, 60, 40, 60])
                    }
                    GameEvent::PickupCollected(PickupKind::SlowMo) => self.vibrate(&[50, 30, 50]),
                    GameEvent::ExtremeAlertStarted => self.vibrate(&[60, 40, 60]),
                    GameEvent::RunEnded => {
                        self.vibrate(&[200, 100, 200, 100, 400]);
                        self.route.capture_end();
                        run_ended = true;
                    }
                    _ => {}
                }
            }

            // Screen switches that are not tied to a single event
            if self.state.phase != self.last_phase {
                if self.state.phase == GamePhase::Presentation {
                    self.dom.set_text("countdown", "");
                    self.show_screen("presentation-screen");
                }
                // GameOver keeps the game screen visible while the
                // explosion plays; the reveal timer switches it later.
                self.last_phase = self.state.phase;
            }

            run_ended
        }

        fn render(&self, now_ms: f64) {
            self.renderer.render(&self.state, &self.settings, now_ms);
        }

        /// Per-frame HUD text and indicator classes.
        fn update_hud(&self, now_ms: f64) {
            let stats = &self.state.stats;
            self.dom.set_text("score-value", &stats.score.to_string());
            self.dom.set_text("time-value", &stats.time_secs.to_string());
            self.dom
                .set_text("speed-value", &(stats.current_speed.floor() as u32).to_string());
            self.dom
                .set_text("distance-value", &format!("{:.2}", stats.distance_km));

            // Combo indicator lights up from a streak of 2
            let streak = self.state.combo.streak();
            if self.state.combo.indicator_active() {
                self.dom.set_text("combo-indicator", &format!("Combo x{streak}"));
                self.dom.add_class("combo-indicator", "active");
            } else {
                self.dom.set_text("combo-indicator", "Combo x0");
                self.dom.remove_class("combo-indicator", "active");
            }

            // Power-up status line
            let status = self.state.powerups.status_line(now_ms);
            self.dom.set_text("powerup-indicator", &status.text);
            if status.active {
                self.dom.add_class("powerup-indicator", "active");
            } else {
                self.dom.remove_class("powerup-indicator", "active");
            }

            // Extreme-speed banner
            if self.state.alert.is_active() {
                self.dom.add_class("extreme-banner", "active");
                self.dom.set_attr("extreme-banner", "aria-hidden", "false");
            } else {
                self.dom.remove_class("extreme-banner", "active");
                self.dom.set_attr("extreme-banner", "aria-hidden", "true");
            }
        }

        fn update_location_display(&self) {
            let place = self.route.place();
            let display = if place.chars().count() > 30 {
                let truncated: String = place.chars().take(27).collect();
                format!("{truncated}...")
            } else {
                place.to_owned()
            };
            self.dom
                .set_text("current-location", &format!("\u{1f4cd} {display}"));
        }

        fn update_best_records_display(&self) {
            let records = &self.records;
            self.dom
                .set_text("best-score", &highscores::format_number(records.best_score));
            self.dom
                .set_text("best-time", &highscores::format_time(records.best_time));
            self.dom.set_text(
                "best-distance",
                &highscores::format_distance(records.best_distance),
            );
            self.dom
                .set_text("best-combo", &highscores::format_combo(records.best_combo));
            self.dom
                .set_text("best-speed", &highscores::format_speed(records.best_speed));
            self.dom
                .set_text("runs-played", &highscores::format_number(records.runs_played));
        }

        fn show_screen(&self, id: &str) {
            for screen in [
                "presentation-screen",
                "game-screen",
                "gameover-screen",
                "map-screen",
            ] {
                if screen == id {
                    self.dom.add_class(screen, "active");
                } else {
                    self.dom.remove_class(screen, "active");
                }
            }
        }

        /// Fill the game-over panel and merge the run into the records.
        fn reveal_game_over(&mut self) {
            self.show_screen("gameover-screen");

            let stats = self.state.stats.clone();
            self.dom
                .set_text("final-score", &highscores::format_number(stats.score));
            self.dom
                .set_text("final-time", &highscores::format_time(stats.time_secs));
            self.dom
                .set_text("final-dodges", &highscores::format_number(stats.dodges));
            self.dom
                .set_text("max-combo", &highscores::format_combo(stats.peak_combo));
            self.dom.set_text(
                "final-distance",
                &highscores::format_distance(stats.distance_km),
            );
            self.dom.set_text(
                "max-speed",
                &highscores::format_speed(stats.max_speed.floor() as u32),
            );
            self.dom.set_text("start-location", self.route.start_label());
            self.dom.set_text("end-location", self.route.end_label());
            self.dom.set_text(
                "share-summary",
                &highscores::run_summary(
                    &stats,
                    self.route.start_label(),
                    self.route.end_label(),
                ),
            );

            let new_records = self.records.evaluate(&stats);
            self.records.save();
            self.update_best_records_display();
            self.render_record_badges(&new_records);

            log::info!(
                "Run over: score {} time {}s, {} new records",
                stats.score,
                stats.time_secs,
                new_records.len()
            );
        }

        fn render_record_badges(&self, new_records: &[RecordKind]) {
            let Some(container) = self.dom.get("record-flags") else {
                return;
            };
            if new_records.is_empty() {
                container.set_text_content(Some(""));
                let _ = container.set_attribute("style", "display: none");
                return;
            }
            let _ = container.set_attribute("style", "display: flex");
            let text = new_records
                .iter()
                .map(|r| format!("\u{1f3c5} {}", r.label()))
                .collect::<Vec<_>>()
                .join("  ");
            container.set_text_content(Some(&text));
        }

        /// Fill the route-map screen from the logged route.
        fn show_map_screen(&mut self) {
            self.state.phase = GamePhase::Map;
            self.show_screen("map-screen");

            let stats = &self.state.stats;
            self.dom.set_text(
                "map-distance",
                &highscores::format_distance(stats.distance_km),
            );
            self.dom
                .set_text("map-time", &highscores::format_time(stats.time_secs));
            self.dom
                .set_text("map-score", &highscores::format_number(stats.score));
            self.dom.set_text(
                "map-route",
                &format!(
                    "{} \u{2192} {}",
                    self.route.start_label(),
                    self.route.end_label()
                ),
            );
            self.dom.set_text(
                "map-status",
                if self.route.start().is_some() {
                    "Route recorded"
                } else {
                    "Enable GPS to record a real route"
                },
            );
        }

        fn close_map_screen(&mut self) {
            if self.state.phase == GamePhase::Map {
                self.state.phase = GamePhase::GameOver;
                self.show_screen("gameover-screen");
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Ember Dash starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let renderer = Renderer::new(canvas).expect("canvas 2d context unavailable");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(
            seed,
            renderer,
            width as f32,
            height as f32,
        )));
        game.borrow().update_best_records_display();

        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone());
        setup_device_orientation(game.clone());
        setup_shake_detection(game.clone());
        setup_resize(game.clone());
        setup_buttons(game.clone());
        setup_geolocation(game.clone());

        request_animation_frame(game);

        log::info!("Ember Dash running!");
    }

    fn detect_large_screen() -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        let width = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let ua = window.navigator().user_agent().unwrap_or_default();
        let is_mobile = ["Android", "iPhone", "iPad", "iPod", "BlackBerry", "IEMobile"]
            .iter()
            .any(|token| ua.contains(token));
        width > 768.0 && height > 500.0 && !is_mobile
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.ensure_context();

                let key = event.key().to_lowercase();
                match g.state.phase {
                    GamePhase::Presentation | GamePhase::GameOver => {
                        if matches!(key.as_str(), "enter" | " " | "spacebar") {
                            event.prevent_default();
                            g.input.confirm = true;
                        }
                    }
                    GamePhase::Playing if g.input.use_keyboard => {
                        match key.as_str() {
                            "a" | "arrowleft" => g.input.left = true,
                            "d" | "arrowright" => g.input.right = true,
                            "w" | "arrowup" => g.input.up = true,
                            "s" | "arrowdown" => g.input.down = true,
                            _ => return,
                        }
                        event.prevent_default();
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                if !g.input.use_keyboard {
                    return;
                }
                match event.key().to_lowercase().as_str() {
                    "a" | "arrowleft" => g.input.left = false,
                    "d" | "arrowright" => g.input.right = false,
                    "w" | "arrowup" => g.input.up = false,
                    "s" | "arrowdown" => g.input.down = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_device_orientation(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::DeviceOrientationEvent| {
            // gamma is the left/right tilt; the sim clamps it
            let gamma = event.gamma().unwrap_or(0.0);
            game.borrow_mut().input.tilt = gamma as f32;
        });
        if window
            .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("DeviceOrientationEvent unsupported, tilt steering inert");
        }
        closure.forget();
    }

    fn setup_shake_detection(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::DeviceMotionEvent| {
            let Some(accel) = event.acceleration_including_gravity() else {
                return;
            };
            let now = js_sys::Date::now();
            let mut g = game.borrow_mut();
            if now - g.last_shake_ms <= 100.0 {
                return;
            }

            let x = accel.x().unwrap_or(0.0);
            let y = accel.y().unwrap_or(0.0);
            let z = accel.z().unwrap_or(0.0);
            let intensity =
                (x - g.last_accel.0).abs() + (y - g.last_accel.1).abs() + (z - g.last_accel.2).abs();

            if intensity > SHAKE_THRESHOLD {
                g.audio.ensure_context();
                g.input.confirm = true;
                g.last_shake_ms = now;
            }
            g.last_accel = (x, y, z);
        });
        if window
            .add_event_listener_with_callback("devicemotion", closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("DeviceMotionEvent unsupported, shake-to-start inert");
        }
        closure.forget();
    }

    fn setup_resize(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let window = web_sys::window().unwrap();
            let width = window
                .inner_width()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(800.0);
            let height = window
                .inner_height()
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(600.0);

            let mut g = game.borrow_mut();
            g.renderer.canvas().set_width(width as u32);
            g.renderer.canvas().set_height(height as u32);
            g.state.resize(width as f32, height as f32);
            g.input.use_keyboard = detect_large_screen();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("start-button") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.ensure_context();
                g.input.confirm = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("view-map-button") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                if g.state.phase == GamePhase::GameOver {
                    g.show_map_screen();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("close-map-button") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().close_map_screen();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_geolocation(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let Ok(geolocation) = window.navigator().geolocation() else {
            log::warn!("Geolocation unavailable, route summary will show placeholders");
            return;
        };

        let success = Closure::<dyn FnMut(_)>::new(move |position: web_sys::GeolocationPosition| {
            let coords = position.coords();
            let mut g = game.borrow_mut();
            let delta = g.route.record_fix(coords.latitude(), coords.longitude());
            // GPS movement counts toward the distance stat during a run
            if g.state.phase == GamePhase::Playing {
                g.state.stats.distance_km += delta;
            }
            g.update_location_display();
        });
        let error = Closure::<dyn FnMut(_)>::new(|err: web_sys::GeolocationPositionError| {
            log::warn!("Geolocation error: {}", err.message());
        });

        let options = web_sys::PositionOptions::new();
        options.set_enable_high_accuracy(true);
        options.set_timeout(10_000);
        options.set_maximum_age(5_000);

        match geolocation.watch_position_with_error_callback_and_options(
            success.as_ref().unchecked_ref(),
            Some(error.as_ref().unchecked_ref()),
            &options,
        ) {
            Ok(_) => {
                success.forget();
                error.forget();
            }
            Err(_) => log::warn!("watchPosition rejected, route summary will show placeholders"),
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, _raf_time: f64) {
        let now = js_sys::Date::now();
        let run_ended = {
            let mut g = game.borrow_mut();
            let run_ended = g.update(now);
            g.render(now);
            g.update_hud(now);
            run_ended
        };

        if run_ended {
            schedule_game_over_reveal(game.clone());
        }

        request_animation_frame(game);
    }

    /// The explosion plays for two seconds before the game-over screen is
    /// revealed; effects are cleared one second after that.
    fn schedule_game_over_reveal(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let reveal = Closure::once(move || {
            game.borrow_mut().reveal_game_over();

            let cleanup_game = game.clone();
            let cleanup = Closure::once(move || {
                cleanup_game.borrow_mut().state.clear_explosion();
            });
            let window = web_sys::window().unwrap();
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                cleanup.as_ref().unchecked_ref(),
                1_000,
            );
            cleanup.forget();
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            reveal.as_ref().unchecked_ref(),
            2_000,
        );
        reveal.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ember Dash (native) starting...");
    log::info!("Native mode is a headless smoke run - serve the wasm build for the real game");

    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive the sim at a synthetic 60Hz for thirty seconds of play and print
/// what happened.
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use ember_dash::Settings;
    use ember_dash::sim::{GamePhase, GameState, TickInput, tick};

    let settings = Settings::default();
    let mut state = GameState::new(0xE3BE2, 400.0, 800.0);

    let confirm = TickInput {
        confirm: true,
        ..TickInput::default()
    };
    tick(&mut state, &confirm, &settings, 0.0);

    let steer = TickInput {
        tilt: 12.0,
        ..TickInput::default()
    };
    let mut now = 0.0;
    for _ in 0..(34 * 60) {
        now += 1000.0 / 60.0;
        tick(&mut state, &steer, &settings, now);
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    println!("phase:    {:?}", state.phase);
    println!("score:    {}", state.stats.score);
    println!("dodges:   {}", state.stats.dodges);
    println!("elapsed:  {}s", state.stats.time_secs);
    println!("hazards:  {} airborne", state.hazards.len());
    println!("residue:  {} ground fires", state.ground_fires.len());
}
