//! Breathing: the pulsation animation driven by the stress engine.
//!
//! The engine only pushes two control scalars (speed and base size) and
//! pauses the animation while lashing out. It reads back the amplitude and
//! the base size to shape the lashout scale itself.

use amoeba_core::config::BreathingConfig;
use std::f32::consts::TAU;

/// Collaborator interface the stress engine drives.
pub trait Breathing {
    /// Stress ratio in `[0, 1]`; higher breathes faster
    fn set_speed_factor(&mut self, factor: f32);

    /// Resting size the pulse oscillates around
    fn set_base_factor(&mut self, factor: f32);

    fn pause(&mut self);

    fn resume(&mut self);

    /// Relative amplitude of the pulse
    fn fluctuation(&self) -> f32;

    fn base_factor(&self) -> f32;
}

/// Sinusoidal breathing: `scale = base * (1 + fluctuation * sin(phase))`.
#[derive(Debug, Clone)]
pub struct PulseBreathing {
    base_factor: f32,
    speed_factor: f32,
    fluctuation: f32,
    /// Breaths per second at zero stress
    base_frequency: f32,
    /// Extra breaths per second at full stress
    speed_gain: f32,
    /// Radians
    phase: f32,
    paused: bool,
}

impl Default for PulseBreathing {
    fn default() -> Self {
        Self::from_config(&BreathingConfig::default())
    }
}

impl PulseBreathing {
    pub fn from_config(config: &BreathingConfig) -> Self {
        Self {
            base_factor: 1.0,
            speed_factor: 0.0,
            fluctuation: config.fluctuation,
            base_frequency: config.base_frequency,
            speed_gain: config.speed_gain,
            phase: 0.0,
            paused: false,
        }
    }

    /// Current breaths per second
    pub fn frequency(&self) -> f32 {
        self.base_frequency + self.speed_gain * self.speed_factor
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// Advance the animation and return the current scale.
    ///
    /// A paused pulse holds its phase and rests at the base size.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.paused {
            return self.base_factor;
        }
        self.phase = (self.phase + TAU * self.frequency() * dt).rem_euclid(TAU);
        self.scale()
    }

    pub fn scale(&self) -> f32 {
        if self.paused {
            self.base_factor
        } else {
            self.base_factor * (1.0 + self.fluctuation * self.phase.sin())
        }
    }
}

impl Breathing for PulseBreathing {
    fn set_speed_factor(&mut self, factor: f32) {
        self.speed_factor = factor;
    }

    fn set_base_factor(&mut self, factor: f32) {
        self.base_factor = factor;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn resume(&mut self) {
        self.paused = false;
    }

    fn fluctuation(&self) -> f32 {
        self.fluctuation
    }

    fn base_factor(&self) -> f32 {
        self.base_factor
    }
}
