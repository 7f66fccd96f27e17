//! Audio system using the Web Audio API
//!
//! Procedurally generated sound effects - no sample files. Every failure
//! path degrades to silence; a blocked context is retried on the next user
//! gesture via `ensure_context`.

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::sim::{ClearMagnitude, GameEvent, PickupKind};

/// Fire-and-forget sound engine driven by tick events.
pub struct AudioEngine {
    ctx: Option<AudioContext>,
    master: Option<GainNode>,
    enabled: bool,
    /// Engine rumble is throttled to 10 Hz
    last_engine_ms: f64,
}

impl AudioEngine {
    pub fn new(enabled: bool) -> Self {
        Self {
            ctx: None,
            master: None,
            enabled,
            last_engine_ms: 0.0,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.ensure_context();
        } else if let Some(ctx) = &self.ctx
            && ctx.state() == AudioContextState::Running
        {
            let _ = ctx.suspend();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Lazily create the context and resume it if the platform suspended
    /// it. Browsers require a user gesture before audio runs, so the host
    /// calls this again on interaction.
    pub fn ensure_context(&mut self) -> bool {
        if !self.enabled {
            return false;
        }

        if self.ctx.is_none() {
            match AudioContext::new() {
                Ok(ctx) => {
                    let master = match ctx.create_gain() {
                        Ok(gain) => gain,
                        Err(_) => return false,
                    };
                    master.gain().set_value(0.8);
                    if master.connect_with_audio_node(&ctx.destination()).is_err() {
                        return false;
                    }
                    self.master = Some(master);
                    self.ctx = Some(ctx);
                }
                Err(_) => {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    return false;
                }
            }
        }

        if let Some(ctx) = &self.ctx
            && ctx.state() == AudioContextState::Suspended
        {
            let _ = ctx.resume();
        }
        self.ctx.is_some()
    }

    /// Map one tick event onto its cue. Unrecognized events are silent.
    pub fn handle_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::EngineRumble(speed) => self.engine_rumble(*speed),
            GameEvent::SpeedBurst { accelerating: true } => {
                self.tone(200.0, 0.2, OscillatorType::Square, 0.1)
            }
            GameEvent::SpeedBurst { accelerating: false } => {
                self.tone(150.0, 0.3, OscillatorType::Triangle, 0.08)
            }
            GameEvent::FireCrackle => self.fire_crackle(),
            GameEvent::PickupCollected(PickupKind::Shield) => {
                self.tone(520.0, 0.2, OscillatorType::Sine, 0.25)
            }
            GameEvent::PickupCollected(PickupKind::SlowMo) => {
                self.tone(140.0, 0.4, OscillatorType::Sine, 0.2)
            }
            // Water audio is scaled by the blast outcome instead
            GameEvent::PickupCollected(PickupKind::Water) => {}
            GameEvent::WaterBlast { magnitude, .. } => self.water_blast(*magnitude),
            GameEvent::ExtremeAlertStarted => {
                self.tone(780.0, 0.14, OscillatorType::Sawtooth, 0.15)
            }
            GameEvent::RunEnded => self.explosion(),
            _ => {}
        }
    }

    /// Single tone with a quick attack and exponential release.
    pub fn tone(&mut self, freq: f32, duration: f64, wave: OscillatorType, volume: f32) {
        self.tone_at(0.0, freq, duration, wave, volume);
    }

    fn tone_at(&mut self, delay: f64, freq: f32, duration: f64, wave: OscillatorType, volume: f32) {
        if !self.ensure_context() {
            return;
        }
        let (Some(ctx), Some(master)) = (self.ctx.as_ref(), self.master.as_ref()) else {
            return;
        };
        let Some((osc, gain)) = create_osc(ctx, master, freq, wave) else {
            return;
        };

        let t = ctx.current_time() + delay;
        let _ = gain.gain().set_value_at_time(0.0, t);
        let _ = gain.gain().linear_ramp_to_value_at_time(volume, t + 0.01);
        let _ = gain
            .gain()
            .exponential_ramp_to_value_at_time(0.0001, t + duration);
        let _ = osc.start_with_when(t);
        let _ = osc.stop_with_when(t + duration + 0.05);
    }

    /// Low sawtooth keyed to the current display speed, at most every 100ms.
    pub fn engine_rumble(&mut self, speed: f32) {
        if !self.enabled {
            return;
        }
        let now = js_sys::Date::now();
        if now - self.last_engine_ms < 100.0 {
            return;
        }
        self.last_engine_ms = now;

        let freq = 80.0 + speed * 10.0;
        let volume = (0.05 + speed * 0.01).min(0.15);
        self.tone(freq, 0.1, OscillatorType::Sawtooth, volume);
    }

    /// Short burst of shaped noise.
    pub fn fire_crackle(&mut self) {
        if !self.ensure_context() {
            return;
        }
        let (Some(ctx), Some(master)) = (self.ctx.as_ref(), self.master.as_ref()) else {
            return;
        };

        let sample_rate = ctx.sample_rate();
        let length = (sample_rate * 0.3) as u32;
        let Ok(buffer) = ctx.create_buffer(1, length, sample_rate) else {
            return;
        };

        let mut data = vec![0.0f32; length as usize];
        for (i, sample) in data.iter_mut().enumerate() {
            *sample = (js_sys::Math::random() as f32 * 2.0 - 1.0) * 0.1 * (i as f32 * 0.01).sin();
        }
        if buffer.copy_to_channel(&mut data, 0).is_err() {
            return;
        }

        let Ok(source) = ctx.create_buffer_source() else {
            return;
        };
        source.set_buffer(Some(&buffer));
        let Ok(gain) = ctx.create_gain() else {
            return;
        };
        if source.connect_with_audio_node(&gain).is_err()
            || gain.connect_with_audio_node(master).is_err()
        {
            return;
        }

        let t = ctx.current_time();
        let _ = gain.gain().set_value_at_time(0.05, t);
        let _ = gain.gain().exponential_ramp_to_value_at_time(0.001, t + 0.3);
        let _ = source.start();
    }

    /// Layered descending boom for the run-ending collision.
    pub fn explosion(&mut self) {
        self.tone(60.0, 0.1, OscillatorType::Sawtooth, 0.3);
        self.tone_at(0.05, 40.0, 0.2, OscillatorType::Triangle, 0.2);
        self.tone_at(0.1, 30.0, 0.3, OscillatorType::Sine, 0.1);
    }

    /// Water blast splash; volume follows how much the blast cleared.
    pub fn water_blast(&mut self, magnitude: ClearMagnitude) {
        let (square_vol, triangle_vol) = match magnitude {
            ClearMagnitude::None => (0.12, 0.08),
            ClearMagnitude::Small => (0.2, 0.12),
            ClearMagnitude::Medium => (0.3, 0.18),
            ClearMagnitude::Large => (0.38, 0.22),
        };
        self.tone(260.0, 0.18, OscillatorType::Square, square_vol);
        self.tone(180.0, 0.22, OscillatorType::Triangle, triangle_vol);
    }
}

/// Oscillator wired through its own gain into the master bus.
fn create_osc(
    ctx: &AudioContext,
    master: &GainNode,
    freq: f32,
    wave: OscillatorType,
) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(wave);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(master).ok()?;

    Some((osc, gain))
}
