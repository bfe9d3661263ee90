//! Stress regulation: saturation, linear decay and growth-on-empty.
//!
//! One call to [`StressDynamics::regulate`] is the per-frame stress update of
//! a single organism. It owns every transition of `StressState` except the
//! outburst release, which belongs to the runtime.

use crate::config::StressConfig;
use crate::state::StressState;
use serde::{Deserialize, Serialize};

/// A one-time capacity increase after stress fully decayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Growth {
    /// Highest stress reached since the previous growth
    pub peak: f32,
    /// `peak / previous_capacity`, drives the light pulse
    pub intensity_ratio: f32,
    pub previous_capacity: f32,
    pub capacity: f32,
}

/// What a regulation step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Regulation {
    /// Stress reached capacity and was clamped. `onset` is true on the first
    /// frame of an episode, i.e. when the organism was still calm.
    Saturated { onset: bool },
    /// Lashing: decay and growth are suspended
    Suppressed,
    /// Stress decayed linearly
    Decayed,
    /// Stress emptied after a peak; capacity grew
    Grew(Growth),
    /// Nothing to do (no stress, no pending growth)
    Idle,
}

#[derive(Debug, Clone)]
pub struct StressDynamics {
    /// Fraction of capacity shed per second while calm
    pub decay_ratio: f32,
    /// Fraction of the peak added to capacity on growth
    pub growth_factor: f32,
    pub size_scale_divisor: f32,
}

impl Default for StressDynamics {
    fn default() -> Self {
        Self::from_config(&StressConfig::default())
    }
}

impl StressDynamics {
    pub fn from_config(config: &StressConfig) -> Self {
        Self {
            decay_ratio: config.decay_ratio,
            growth_factor: config.growth_factor,
            size_scale_divisor: config.size_scale_divisor,
        }
    }

    /// Advance the stress state by `dt` seconds.
    ///
    /// Saturation is checked first and clamps even while lashing, so stress
    /// absorbed during a lashout never leaves `[0, capacity]`. The caller is
    /// responsible for entering the lashout on `Saturated { onset: true }`.
    pub fn regulate(&self, state: &mut StressState, dt: f32) -> Regulation {
        if state.stress_level >= state.capacity {
            state.stress_level = state.capacity;
            return Regulation::Saturated {
                onset: !state.is_lashing(),
            };
        }

        if state.is_lashing() {
            return Regulation::Suppressed;
        }

        if state.stress_level > state.max_stress_since_growth {
            state.max_stress_since_growth = state.stress_level;
        }

        let mut outcome = Regulation::Idle;

        // Linear, not exponential: the rate depends on capacity only.
        if state.stress_level > 0.0 && state.stress_level < state.capacity {
            state.stress_level -= state.capacity * self.decay_ratio * dt;
            outcome = Regulation::Decayed;
        }

        if state.stress_level <= 0.0 && state.max_stress_since_growth > 0.0 {
            outcome = Regulation::Grew(self.grow(state));
        }

        outcome
    }

    /// Grow capacity by the peak since the last growth and reset.
    fn grow(&self, state: &mut StressState) -> Growth {
        let peak = state.max_stress_since_growth;
        let previous_capacity = state.capacity;
        let intensity_ratio = state.ratio_of(peak);

        state.capacity += peak * self.growth_factor;
        state.stress_level = 0.0;
        state.max_stress_since_growth = 0.0;

        tracing::info!(
            "Growth: peak={:.2}, capacity {:.2} -> {:.2}",
            peak,
            previous_capacity,
            state.capacity
        );

        Growth {
            peak,
            intensity_ratio,
            previous_capacity,
            capacity: state.capacity,
        }
    }

    /// Breathing speed control: `stress / capacity`.
    pub fn speed_factor(&self, state: &StressState) -> f32 {
        state.stress_ratio()
    }

    /// Base size control: `ln(capacity / divisor + 1) + 0.5`.
    ///
    /// Size grows sub-linearly with capacity.
    pub fn base_factor(&self, state: &StressState) -> f32 {
        (state.capacity / self.size_scale_divisor + 1.0).ln() + 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(stress: f32, capacity: f32) -> StressState {
        let mut state = StressState::new(capacity);
        state.stress_level = stress;
        state
    }

    #[test]
    fn test_linear_decay_over_one_second() {
        let dynamics = StressDynamics::default();
        let mut state = state_with(10.0, 50.0);

        let outcome = dynamics.regulate(&mut state, 1.0);

        assert_eq!(outcome, Regulation::Decayed);
        // 10 - 50 * 0.05 * 1
        assert!((state.stress_level - 7.5).abs() < 1e-5);
        assert_eq!(state.max_stress_since_growth, 10.0);
    }

    #[test]
    fn test_decay_rate_independent_of_level() {
        let dynamics = StressDynamics::default();
        let mut low = state_with(5.0, 50.0);
        let mut high = state_with(40.0, 50.0);

        dynamics.regulate(&mut low, 0.5);
        dynamics.regulate(&mut high, 0.5);

        assert!((5.0 - low.stress_level - (40.0 - high.stress_level)).abs() < 1e-5);
    }

    #[test]
    fn test_saturation_onset_then_repeat() {
        let dynamics = StressDynamics::default();
        let mut state = state_with(60.0, 50.0);

        let outcome = dynamics.regulate(&mut state, 0.1);
        assert_eq!(outcome, Regulation::Saturated { onset: true });
        assert_eq!(state.stress_level, 50.0);

        state.enter_lashout(0.0, 0.3);
        state.stress_level = 55.0;
        let outcome = dynamics.regulate(&mut state, 0.1);
        assert_eq!(outcome, Regulation::Saturated { onset: false });
        assert_eq!(state.stress_level, 50.0);
    }

    #[test]
    fn test_lashing_suppresses_decay() {
        let dynamics = StressDynamics::default();
        let mut state = state_with(30.0, 50.0);
        state.enter_lashout(0.0, 0.3);

        let outcome = dynamics.regulate(&mut state, 1.0);

        assert_eq!(outcome, Regulation::Suppressed);
        assert_eq!(state.stress_level, 30.0);
        assert_eq!(state.max_stress_since_growth, 0.0);
    }

    #[test]
    fn test_growth_on_empty() {
        let dynamics = StressDynamics::default();
        let mut state = state_with(2.0, 50.0);
        state.max_stress_since_growth = 20.0;

        // Decays 2.5 in one second: crosses zero
        let outcome = dynamics.regulate(&mut state, 1.0);

        let growth = match outcome {
            Regulation::Grew(g) => g,
            other => panic!("Expected growth, got {:?}", other),
        };
        assert_eq!(growth.peak, 20.0);
        assert!((growth.intensity_ratio - 0.4).abs() < 1e-6);
        assert_eq!(growth.previous_capacity, 50.0);
        // 50 + 20 * 0.2
        assert!((state.capacity - 54.0).abs() < 1e-5);
        assert_eq!(state.stress_level, 0.0);
        assert_eq!(state.max_stress_since_growth, 0.0);
    }

    #[test]
    fn test_no_growth_without_peak() {
        let dynamics = StressDynamics::default();
        let mut state = state_with(0.0, 50.0);

        for _ in 0..10 {
            assert_eq!(dynamics.regulate(&mut state, 1.0), Regulation::Idle);
        }
        assert_eq!(state.capacity, 50.0);
    }

    #[test]
    fn test_breathing_factors() {
        let dynamics = StressDynamics::default();
        let state = state_with(25.0, 50.0);

        assert!((dynamics.speed_factor(&state) - 0.5).abs() < 1e-6);
        // ln(50 / 50 + 1) + 0.5
        let expected = 2.0f32.ln() + 0.5;
        assert!((dynamics.base_factor(&state) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_base_factor_grows_sublinearly() {
        let dynamics = StressDynamics::default();
        let small = dynamics.base_factor(&state_with(0.0, 50.0));
        let double = dynamics.base_factor(&state_with(0.0, 100.0));
        let quad = dynamics.base_factor(&state_with(0.0, 200.0));

        assert!(double > small && quad > double);
        assert!(quad / small < 4.0);
    }
}
