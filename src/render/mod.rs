//! Canvas 2D rendering sink
//!
//! A pure read of the current `GameState`, performed once per frame after
//! all updates. Nothing here mutates simulation state.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement};

use crate::Settings;
use crate::sim::{
    GamePhase, GameState, GroundFire, Hazard, HazardClass, PickupKind, SceneryKind, TreeShape,
};

pub struct Renderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Draw the whole frame.
    pub fn render(&self, state: &GameState, settings: &Settings, now_ms: f64) {
        let w = state.view_w as f64;
        let h = state.view_h as f64;
        self.ctx.clear_rect(0.0, 0.0, w, h);

        if state.phase != GamePhase::Playing && !state.explosion_active {
            return;
        }

        self.draw_background(state, settings, now_ms);
        self.draw_pickups(state);
        for hazard in &state.hazards {
            self.draw_hazard(hazard, now_ms);
        }
        self.draw_ground_fires(state, now_ms);
        self.draw_truck(state, now_ms);
        if settings.graphics_quality.particles_enabled() {
            self.draw_sparks(state);
        }
        self.draw_slowmo_overlay(state, now_ms);
        if state.explosion_active {
            self.draw_debris(state);
        }
    }

    fn draw_background(&self, state: &GameState, settings: &Settings, now_ms: f64) {
        let ctx = &self.ctx;
        let w = state.view_w as f64;
        let h = state.view_h as f64;

        let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, h);
        let _ = gradient.add_color_stop(0.0, "#4a7c23");
        let _ = gradient.add_color_stop(0.6, "#2d5016");
        let _ = gradient.add_color_stop(1.0, "#1a2e0a");
        ctx.set_fill_style_canvas_gradient(&gradient);
        ctx.fill_rect(0.0, 0.0, w, h);

        self.draw_scenery(state);
        self.draw_trees(state, now_ms);

        if settings.graphics_quality.smoke_enabled() {
            ctx.set_fill_style_str("rgba(100, 100, 100, 0.1)");
            let time = now_ms * 0.001;
            for i in 0..5 {
                let fi = i as f64;
                let x = (w * fi / 5.0 + (time + fi).sin() * 50.0).rem_euclid(w);
                let y = (time * 20.0 + fi * 100.0).rem_euclid(h);
                ctx.begin_path();
                let _ = ctx.arc(
                    x,
                    y,
                    10.0 + (time + fi).sin() * 5.0,
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }
        }
    }

    fn draw_trees(&self, state: &GameState, now_ms: f64) {
        let ctx = &self.ctx;
        ctx.save();
        let time = now_ms * 0.002;

        for tree in &state.trees {
            let sway = (time + tree.sway_offset as f64).sin() * 5.0;
            let x = tree.x as f64 + sway;
            let y = tree.y as f64;
            let size = tree.size as f64;

            ctx.set_fill_style_str("rgba(0, 0, 0, 0.2)");
            ctx.begin_path();
            let _ = ctx.arc(x + 5.0, y + size, size * 0.6, 0.0, std::f64::consts::TAU);
            ctx.fill();

            ctx.set_fill_style_str("#8B4513");
            ctx.fill_rect(x - 3.0, y, 6.0, size);

            ctx.set_fill_style_str(match tree.shape {
                TreeShape::Oak => "#228B22",
                TreeShape::Birch => "#32CD32",
                TreeShape::Pine => "#006400",
            });
            ctx.begin_path();
            if tree.shape == TreeShape::Pine {
                ctx.move_to(x, y - size * 0.3);
                ctx.line_to(x - size * 0.4, y + size * 0.3);
                ctx.line_to(x + size * 0.4, y + size * 0.3);
                ctx.close_path();
            } else {
                let _ = ctx.arc(x, y, size * 0.7, 0.0, std::f64::consts::TAU);
            }
            ctx.fill();
        }
        ctx.restore();
    }

    fn draw_scenery(&self, state: &GameState) {
        let ctx = &self.ctx;
        ctx.save();

        for prop in &state.scenery {
            let x = prop.x as f64;
            let y = prop.y as f64;
            let size = prop.size as f64;

            match prop.kind {
                SceneryKind::Rock => {
                    ctx.set_fill_style_str("#696969");
                    ctx.begin_path();
                    let _ = ctx.arc(x, y, size * 0.6, 0.0, std::f64::consts::TAU);
                    ctx.fill();

                    ctx.set_fill_style_str("rgba(0, 0, 0, 0.2)");
                    ctx.begin_path();
                    let _ = ctx.arc(x + 3.0, y + 3.0, size * 0.6, 0.0, std::f64::consts::TAU);
                    ctx.fill();
                }
                SceneryKind::Bush => {
                    ctx.set_fill_style_str("#556B2F");
                    ctx.begin_path();
                    let _ = ctx.arc(x - size * 0.2, y, size * 0.4, 0.0, std::f64::consts::TAU);
                    let _ = ctx.arc(x + size * 0.2, y, size * 0.4, 0.0, std::f64::consts::TAU);
                    let _ = ctx.arc(x, y - size * 0.2, size * 0.4, 0.0, std::f64::consts::TAU);
                    ctx.fill();
                }
            }
        }
        ctx.restore();
    }

    fn draw_hazard(&self, hazard: &Hazard, now_ms: f64) {
        let ctx = &self.ctx;
        ctx.save();

        let center_x = (hazard.x + hazard.size / 2.0) as f64;
        let center_y = (hazard.y + hazard.size / 2.0) as f64;
        let size = hazard.size as f64;
        let flicker = (now_ms * 0.01 + hazard.x as f64).sin() * 2.0;

        if let Ok(gradient) = radial_gradient(
            ctx,
            center_x,
            center_y + flicker,
            0.0,
            center_x,
            center_y + flicker,
            size / 2.0,
        ) {
            match hazard.class {
                HazardClass::Large => {
                    let _ = gradient.add_color_stop(0.0, "#ffff00");
                    let _ = gradient.add_color_stop(0.3, "#ff8f00");
                    let _ = gradient.add_color_stop(0.6, "#ff3d00");
                    let _ = gradient.add_color_stop(1.0, "#d32f2f");
                }
                HazardClass::Normal => {
                    let _ = gradient.add_color_stop(0.0, "#ffeb3b");
                    let _ = gradient.add_color_stop(0.4, "#ff9800");
                    let _ = gradient.add_color_stop(0.8, "#f44336");
                    let _ = gradient.add_color_stop(1.0, "#b71c1c");
                }
            }
            ctx.set_fill_style_canvas_gradient(&gradient);
        }

        ctx.begin_path();
        let _ = ctx.ellipse(
            center_x,
            center_y + flicker,
            size / 3.0,
            size / 2.0,
            0.0,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();

        // Upper flame tongue
        ctx.set_fill_style_str(&format!("rgba(255, 183, 77, {})", hazard.intensity));
        ctx.begin_path();
        let _ = ctx.ellipse(
            center_x,
            center_y - size / 4.0 + flicker,
            size / 4.0,
            size / 3.0,
            0.0,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();

        ctx.restore();
    }

    fn draw_ground_fires(&self, state: &GameState, now_ms: f64) {
        if state.ground_fires.is_empty() {
            return;
        }
        let ctx = &self.ctx;
        ctx.save();

        let flash_strength = state.flash_strength(now_ms) as f64;
        let intensity_factor = if flash_strength > 0.0 {
            (state.flash_intensity as f64).max(0.25)
        } else {
            0.0
        };

        for fire in &state.ground_fires {
            self.draw_ground_fire(fire, now_ms, flash_strength, intensity_factor);
        }
        ctx.restore();
    }

    fn draw_ground_fire(
        &self,
        fire: &GroundFire,
        now_ms: f64,
        flash_strength: f64,
        intensity_factor: f64,
    ) {
        let ctx = &self.ctx;
        let alpha = (1.0 - fire.age_fraction(now_ms) as f64).max(0.0);
        let flicker = (now_ms * 0.012 + fire.flicker_seed as f64).sin() * 0.12;
        let width = fire.width as f64 * (1.0 + flicker);
        let height = (fire.width as f64 * 0.55).max(18.0);
        let center_x = fire.x as f64;
        let base_y = fire.y as f64;

        // Scorched ground under the flames
        ctx.set_global_alpha(0.35 * alpha);
        ctx.set_fill_style_str("rgba(62, 39, 35, 0.85)");
        ctx.begin_path();
        let _ = ctx.ellipse(
            center_x,
            base_y + height * 0.25,
            width * 0.9,
            height * 0.35,
            0.0,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.fill();

        if let Ok(gradient) = radial_gradient(
            ctx,
            center_x,
            base_y - height * 0.2,
            4.0,
            center_x,
            base_y + height * 0.45,
            width,
        ) {
            let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 241, 118, {})", 0.6 * alpha));
            let _ = gradient.add_color_stop(0.35, &format!("rgba(255, 167, 38, {})", 0.5 * alpha));
            let _ = gradient.add_color_stop(0.7, &format!("rgba(244, 81, 30, {})", 0.35 * alpha));
            let _ = gradient.add_color_stop(1.0, "rgba(66, 30, 14, 0)");
            ctx.set_global_alpha(1.0);
            ctx.set_fill_style_canvas_gradient(&gradient);
            ctx.begin_path();
            let _ = ctx.ellipse(
                center_x,
                base_y,
                width,
                height,
                0.0,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.fill();
        }

        ctx.set_global_alpha(0.4 * alpha);
        ctx.set_stroke_style_str(&format!("rgba(255, 204, 128, {})", 0.9 * alpha));
        ctx.set_line_width(2.0);
        ctx.begin_path();
        let _ = ctx.ellipse(
            center_x,
            base_y,
            width * 0.8,
            height * 0.65,
            0.0,
            0.0,
            std::f64::consts::TAU,
        );
        ctx.stroke();

        // Cyan water-blast flash, eased and scaled by clear count
        if flash_strength > 0.0 {
            let eased = flash_strength * flash_strength * (0.7 + intensity_factor * 0.6);
            if let Ok(gradient) = radial_gradient(
                ctx,
                center_x,
                base_y - height * 0.1,
                2.0,
                center_x,
                base_y + height * 0.6,
                width * 1.15,
            ) {
                let _ = gradient
                    .add_color_stop(0.0, &format!("rgba(178, 235, 242, {})", 0.4 + 0.6 * eased));
                let _ = gradient
                    .add_color_stop(0.5, &format!("rgba(0, 188, 212, {})", 0.25 + 0.5 * eased));
                let _ = gradient.add_color_stop(1.0, "rgba(0, 121, 107, 0)");
                ctx.set_global_alpha(1.0);
                ctx.set_fill_style_canvas_gradient(&gradient);
                ctx.begin_path();
                let _ = ctx.ellipse(
                    center_x,
                    base_y,
                    width * 1.1,
                    height * 1.15,
                    0.0,
                    0.0,
                    std::f64::consts::TAU,
                );
                ctx.fill();
            }

            ctx.set_global_alpha(0.25 + 0.45 * eased);
            ctx.set_stroke_style_str(&format!("rgba(224, 247, 250, {})", 0.6 + 0.35 * eased));
            ctx.set_line_width(2.0 + eased * 2.5);
            ctx.begin_path();
            let _ = ctx.ellipse(
                center_x,
                base_y,
                width * 0.9,
                height * 0.85,
                0.0,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.stroke();
        }

        ctx.set_global_alpha(1.0);
    }

    fn draw_pickups(&self, state: &GameState) {
        let ctx = &self.ctx;
        ctx.save();

        for pickup in state.powerups.pickups() {
            let center_x = (pickup.x + pickup.size / 2.0) as f64;
            let center_y = (pickup.y + pickup.size / 2.0) as f64;
            let radius = pickup.size as f64 / 2.0;

            if let Ok(gradient) =
                radial_gradient(ctx, center_x, center_y, 4.0, center_x, center_y, radius)
            {
                match pickup.kind {
                    PickupKind::Shield => {
                        let _ = gradient.add_color_stop(0.0, "rgba(129, 212, 250, 1)");
                        let _ = gradient.add_color_stop(1.0, "rgba(1, 87, 155, 0.3)");
                    }
                    PickupKind::Water => {
                        let _ = gradient.add_color_stop(0.0, "rgba(129, 199, 132, 1)");
                        let _ = gradient.add_color_stop(1.0, "rgba(27, 94, 32, 0.3)");
                    }
                    PickupKind::SlowMo => {
                        let _ = gradient.add_color_stop(0.0, "rgba(255, 214, 0, 1)");
                        let _ = gradient.add_color_stop(1.0, "rgba(255, 171, 0, 0.3)");
                    }
                }
                ctx.set_fill_style_canvas_gradient(&gradient);
            }
            ctx.begin_path();
            let _ = ctx.arc(center_x, center_y, radius, 0.0, std::f64::consts::TAU);
            ctx.fill();

            ctx.set_fill_style_str("rgba(255,255,255,0.9)");
            ctx.set_font("bold 16px Arial");
            ctx.set_text_align("center");
            ctx.set_text_baseline("middle");
            let icon = match pickup.kind {
                PickupKind::Shield => "\u{1f6e1}\u{fe0f}",
                PickupKind::Water => "\u{1f4a7}",
                PickupKind::SlowMo => "\u{1f422}",
            };
            let _ = ctx.fill_text(icon, center_x, center_y);
        }

        ctx.restore();
    }

    fn draw_truck(&self, state: &GameState, now_ms: f64) {
        let ctx = &self.ctx;
        let truck = &state.truck;
        ctx.save();

        let x = truck.x as f64;
        let y = truck.y as f64;
        let w = truck.width as f64;
        let h = truck.height as f64;

        // Shield aura
        if state.powerups.is_shield_active() {
            let pulse = 0.7 + (now_ms * 0.01).sin() * 0.15;
            let center_x = x + w / 2.0;
            let center_y = y + h / 2.0;
            let radius = w.max(h) * 0.85;
            if let Ok(gradient) = radial_gradient(
                ctx,
                center_x,
                center_y,
                radius * 0.2,
                center_x,
                center_y,
                radius,
            ) {
                let _ =
                    gradient.add_color_stop(0.0, &format!("rgba(129,212,250,{})", 0.35 * pulse));
                let _ = gradient.add_color_stop(1.0, "rgba(1,87,155,0)");
                ctx.set_fill_style_canvas_gradient(&gradient);
                ctx.begin_path();
                let _ = ctx.arc(center_x, center_y, radius, 0.0, std::f64::consts::TAU);
                ctx.fill();
            }
        }

        // Shadow
        ctx.set_fill_style_str("rgba(0,0,0,0.3)");
        ctx.fill_rect(x + 5.0, y + 5.0, w, h);

        // Engulfing flames once the run has ended in a collision
        if state.truck_on_fire {
            let time = now_ms * 0.01;
            for i in 0..8 {
                let fi = i as f64;
                let offset_x = (time + fi).sin() * 10.0;
                let offset_y = (time * 1.5 + fi).sin() * 5.0;
                let size = 15.0 + (time + fi * 0.7).sin() * 8.0;
                let flame_x = x + w / 2.0 + offset_x;
                let flame_y = y + offset_y;

                if let Ok(gradient) =
                    radial_gradient(ctx, flame_x, flame_y, 0.0, flame_x, flame_y, size)
                {
                    let _ = gradient.add_color_stop(0.0, "#ffff00");
                    let _ = gradient.add_color_stop(0.5, "#ff8800");
                    let _ = gradient.add_color_stop(1.0, "#ff0000");
                    ctx.set_fill_style_canvas_gradient(&gradient);
                }
                ctx.begin_path();
                let _ = ctx.arc(flame_x, flame_y, size, 0.0, std::f64::consts::TAU);
                ctx.fill();
            }
        }

        // Body and cab stripe
        ctx.set_fill_style_str(if state.truck_on_fire { "#8B0000" } else { "#e53935" });
        ctx.fill_rect(x, y, w, h);
        ctx.set_fill_style_str(if state.truck_on_fire { "#FFB6C1" } else { "#ffffff" });
        ctx.fill_rect(x + 5.0, y + 5.0, w - 10.0, 8.0);

        // Wheels
        ctx.set_fill_style_str("#333333");
        ctx.begin_path();
        let _ = ctx.arc(x + 12.0, y + h, 6.0, 0.0, std::f64::consts::TAU);
        let _ = ctx.arc(x + w - 12.0, y + h, 6.0, 0.0, std::f64::consts::TAU);
        ctx.fill();

        // Emergency light strobe
        if !state.truck_on_fire {
            let color = if (now_ms * 0.01).sin() > 0.0 {
                "#ff0000"
            } else {
                "#0000ff"
            };
            ctx.set_fill_style_str(color);
            ctx.fill_rect(x + w / 2.0 - 3.0, y - 3.0, 6.0, 3.0);
        }

        ctx.restore();
    }

    fn draw_sparks(&self, state: &GameState) {
        let ctx = &self.ctx;
        ctx.save();
        for spark in state.sparks.active() {
            let alpha = (spark.life / spark.max_life).clamp(0.0, 1.0);
            let [r, g, b] = spark.color;
            ctx.set_fill_style_str(&format!("rgba({r},{g},{b},{alpha})"));
            ctx.fill_rect(spark.pos.x as f64, spark.pos.y as f64, 3.0, 3.0);
        }
        ctx.restore();
    }

    fn draw_debris(&self, state: &GameState) {
        let ctx = &self.ctx;
        ctx.save();
        for chunk in state.debris.active() {
            let alpha = (chunk.life / chunk.max_life).clamp(0.0, 1.0) as f64;
            ctx.set_global_alpha(alpha);
            ctx.set_fill_style_str(&format!(
                "hsl({}, 100%, {}%)",
                chunk.hue, chunk.lightness
            ));
            ctx.begin_path();
            let _ = ctx.arc(
                chunk.pos.x as f64,
                chunk.pos.y as f64,
                chunk.size as f64,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.fill();
        }
        ctx.set_global_alpha(1.0);
        ctx.restore();
    }

    fn draw_slowmo_overlay(&self, state: &GameState, now_ms: f64) {
        if !state.powerups.is_slow_motion_active() {
            return;
        }
        let ctx = &self.ctx;
        let w = state.view_w as f64;
        let h = state.view_h as f64;

        ctx.save();
        let pulse = 0.18 + (now_ms * 0.01).sin() * 0.05;
        ctx.set_fill_style_str(&format!("rgba(2, 119, 189, {pulse})"));
        ctx.fill_rect(0.0, 0.0, w, h);
        let _ = ctx.set_global_composite_operation("lighter");
        ctx.set_stroke_style_str(&format!("rgba(224, 247, 250, {})", pulse + 0.05));
        ctx.set_line_width(4.0);
        ctx.stroke_rect(6.0, 6.0, w - 12.0, h - 12.0);
        ctx.restore();
    }
}

fn radial_gradient(
    ctx: &CanvasRenderingContext2d,
    x0: f64,
    y0: f64,
    r0: f64,
    x1: f64,
    y1: f64,
    r1: f64,
) -> Result<CanvasGradient, JsValue> {
    ctx.create_radial_gradient(x0, y0, r0, x1, y1, r1)
}
