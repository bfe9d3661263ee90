//! The stress engine: one organism's stress-response state machine.
//!
//! ```text
//!            stress >= capacity (notify once)
//!   Calm ─────────────────────────────────────▶ Lashing ──┐
//!    ▲ │                                          │  ▲     │ outburst every
//!    │ └─ decay / growth-on-empty                 │  └─────┘ 1 / frequency s
//!    └────────────────────────────────────────────┘
//!        outburst leaves stress < capacity * exit_ratio
//! ```
//!
//! Each frame runs, in order: lashout tick, stress regulation, breathing
//! feedback, colour adaption, light. Later steps read state mutated by
//! earlier ones.

use crate::breathing::{Breathing, PulseBreathing};
use crate::listener::{MaxStressListener, MaxStressReached};
use amoeba_core::config::{AmoebaConfig, OutburstConfig};
use amoeba_core::{
    Color, ColorFeedback, ConfigError, EntityId, Growth, LashoutState, LightPulse, Regulation,
    StressDynamics, StressState, StressorImpulse, Vec3,
};
use serde::Serialize;
use std::sync::Arc;

/// Direction of the first outburst impulse; the rest are rotated about +Y.
const OUTBURST_DIRECTION: Vec3 = Vec3::new(1.0, 0.0, 1.0);

/// Everything a frame produces for the presentation and physics layers.
#[derive(Debug, Clone, Serialize)]
pub struct FrameOutputs {
    pub color: Color,
    pub light_intensity: f32,
    /// Breathing speed control pushed this frame
    pub speed_factor: f32,
    /// Breathing base size pushed this frame
    pub base_factor: f32,
    /// Uniform scale override while lashing. `None` leaves scale to breathing.
    pub scale: Option<f32>,
    /// Impulses released by an outburst this frame, origins relative to the organism
    pub outburst: Vec<StressorImpulse>,
    pub growth: Option<Growth>,
    /// True on the frame a lashout episode started
    pub max_stress_reached: bool,
    pub lashout: LashoutState,
    pub stress_level: f32,
    pub capacity: f32,
}

pub struct StressEngine<B: Breathing = PulseBreathing> {
    id: EntityId,
    state: StressState,
    dynamics: StressDynamics,
    outburst: OutburstConfig,
    color: ColorFeedback,
    light: LightPulse,
    breathing: B,
    listeners: Vec<Arc<dyn MaxStressListener>>,
}

impl StressEngine<PulseBreathing> {
    /// Create an engine with the built-in pulse breathing.
    pub fn new(config: &AmoebaConfig) -> Result<Self, ConfigError> {
        Self::with_breathing(config, PulseBreathing::from_config(&config.breathing))
    }
}

impl<B: Breathing> StressEngine<B> {
    /// Create an engine driving a custom breathing collaborator.
    pub fn with_breathing(config: &AmoebaConfig, breathing: B) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: EntityId::new(),
            state: StressState::new(config.stress.initial_capacity),
            dynamics: StressDynamics::from_config(&config.stress),
            outburst: config.outburst.clone(),
            color: ColorFeedback::new(config.color.max_adaption_speed),
            light: LightPulse::new(config.light.peak_intensity, config.light.rise_duration),
            breathing,
            listeners: Vec::new(),
        })
    }

    /// Absorb a stressor impulse.
    ///
    /// Returns `false` without touching state if this engine created the
    /// impulse; it stays in the environment for others. Returns `true` when
    /// the stress was taken and the caller should remove the impulse.
    pub fn absorb(&mut self, impulse: &StressorImpulse) -> bool {
        if impulse.is_created_by(self.id) {
            return false;
        }

        let magnitude = if impulse.magnitude.is_finite() {
            impulse.magnitude.max(0.0)
        } else {
            0.0
        };
        self.state.stress_level += magnitude;

        tracing::trace!(
            "{} absorbed {:.2}, stress now {:.2}/{:.2}",
            self.id,
            magnitude,
            self.state.stress_level,
            self.state.capacity
        );
        true
    }

    /// Advance one simulation step. `dt` is the elapsed seconds, `now` the
    /// monotonic simulation clock.
    pub fn tick(&mut self, dt: f32, now: f32) -> FrameOutputs {
        // 1. Lashout tick
        let mut outburst = Vec::new();
        let mut scale = None;
        if self.state.is_lashing() {
            let period = self.outburst.period();
            let since_last = now - self.state.last_outburst_time;
            if since_last > period {
                outburst = self.trigger_outburst(now);
            }
            let fluctuation_scale =
                1.0 - 2.0 * self.breathing.fluctuation() * (since_last / period);
            scale = Some(self.breathing.base_factor() * fluctuation_scale);
        }

        // 2. Stress regulation
        let mut growth = None;
        let mut max_stress_reached = false;
        match self.dynamics.regulate(&mut self.state, dt) {
            Regulation::Saturated { onset: true } => {
                max_stress_reached = true;
                self.begin_lashout(now);
            }
            Regulation::Grew(g) => {
                self.light.trigger(g.intensity_ratio);
                growth = Some(g);
            }
            _ => {}
        }
        self.state.normalize();

        // 3. Breathing feedback
        let speed_factor = self.dynamics.speed_factor(&self.state);
        let base_factor = self.dynamics.base_factor(&self.state);
        self.breathing.set_speed_factor(speed_factor);
        self.breathing.set_base_factor(base_factor);

        // 4. Colour adaption
        self.color.adapt(self.state.stress_ratio(), dt);

        // 5. Light
        let light_intensity = self.light.update(dt);

        FrameOutputs {
            color: self.color.display(),
            light_intensity,
            speed_factor,
            base_factor,
            scale,
            outburst,
            growth,
            max_stress_reached,
            lashout: self.state.lashout,
            stress_level: self.state.stress_level,
            capacity: self.state.capacity,
        }
    }

    /// Release one outburst at `now`.
    ///
    /// Emits `count` impulses evenly spaced around the vertical axis, each
    /// carrying `capacity / cost_divisor`. That amount is deducted from stress
    /// once per outburst, not once per impulse. Ends the lashout if stress
    /// drops below `capacity * exit_ratio`.
    pub fn trigger_outburst(&mut self, now: f32) -> Vec<StressorImpulse> {
        let count = self.outburst.count;
        let increment = 360.0 / count as f32;
        let magnitude = self.state.capacity / self.outburst.cost_divisor;

        let impulses: Vec<StressorImpulse> = (0..count)
            .map(|i| StressorImpulse {
                magnitude,
                creator: Some(self.id),
                impulse: OUTBURST_DIRECTION.rotate_y(increment * i as f32) * self.outburst.force,
                origin: Vec3::ZERO,
                lifetime: self.outburst.lifetime,
            })
            .collect();

        self.state.stress_level -= magnitude;
        self.state.last_outburst_time = now;

        tracing::debug!(
            "{} outburst: {} impulses of {:.2}, stress now {:.2}/{:.2}",
            self.id,
            count,
            magnitude,
            self.state.stress_level,
            self.state.capacity
        );

        if self.state.is_lashing()
            && self.state.stress_level < self.state.capacity * self.outburst.exit_ratio
        {
            self.end_lashout();
        }
        self.state.normalize();

        impulses
    }

    /// Add a listener. Registering the same listener twice notifies it twice.
    pub fn register_listener(&mut self, listener: Arc<dyn MaxStressListener>) {
        self.listeners.push(listener);
    }

    fn begin_lashout(&mut self, now: f32) {
        let event = MaxStressReached {
            engine: self.id,
            capacity: self.state.capacity,
            at: now,
        };
        for listener in &self.listeners {
            listener.on_max_stress_reached(&event);
        }

        self.state.enter_lashout(now, self.outburst.period());
        self.breathing.pause();
        tracing::info!(
            "{} reached max stress {:.2}, lashing out",
            self.id,
            self.state.capacity
        );
    }

    fn end_lashout(&mut self) {
        self.state.exit_lashout();
        self.breathing.resume();
        tracing::info!(
            "{} calmed down at {:.2}/{:.2}",
            self.id,
            self.state.stress_level,
            self.state.capacity
        );
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn state(&self) -> &StressState {
        &self.state
    }

    /// Force a state (for testing or manual intervention)
    pub fn set_state(&mut self, mut state: StressState) {
        state.normalize();
        self.state = state;
    }

    pub fn stress_level(&self) -> f32 {
        self.state.stress_level
    }

    pub fn capacity(&self) -> f32 {
        self.state.capacity
    }

    pub fn lashout(&self) -> LashoutState {
        self.state.lashout
    }

    pub fn is_lashing(&self) -> bool {
        self.state.is_lashing()
    }

    pub fn color(&self) -> Color {
        self.color.display()
    }

    pub fn light_intensity(&self) -> f32 {
        self.light.intensity()
    }

    pub fn breathing(&self) -> &B {
        &self.breathing
    }

    pub fn breathing_mut(&mut self) -> &mut B {
        &mut self.breathing
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
