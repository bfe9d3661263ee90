//! Light pulse emitted on growth.

use serde::{Deserialize, Serialize};

/// Linear rise to a target intensity followed by a linear fall to zero.
///
/// The fall rate is the last target per second, not a function of the
/// current intensity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightPulse {
    intensity: f32,
    target: f32,
    rising: bool,

    /// Intensity reached by a growth that used the whole capacity
    peak_intensity: f32,

    /// Seconds the rise takes to reach the target
    rise_duration: f32,
}

impl LightPulse {
    pub fn new(peak_intensity: f32, rise_duration: f32) -> Self {
        Self {
            intensity: 0.0,
            target: 0.0,
            rising: false,
            peak_intensity,
            rise_duration,
        }
    }

    /// Start a new rise towards `ratio * peak_intensity`.
    pub fn trigger(&mut self, ratio: f32) {
        self.rising = true;
        self.target = ratio * self.peak_intensity;
        tracing::trace!("Light pulse triggered: target={:.3}", self.target);
    }

    /// Advance by `dt` seconds and return the new intensity.
    pub fn update(&mut self, dt: f32) -> f32 {
        if self.rising {
            self.intensity += dt * self.target / self.rise_duration;
            self.rising = self.intensity < self.target;
        } else if self.intensity > 0.0 {
            self.intensity = (self.intensity - dt * self.target).max(0.0);
        }
        self.intensity
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_rising(&self) -> bool {
        self.rising
    }
}
