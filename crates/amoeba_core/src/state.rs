//! Stress state of a single organism.
//!
//! `stress_level` is the accumulated tension, bounded by `capacity`. The
//! capacity only grows, through growth events. While the organism is
//! `Lashing` it releases outbursts instead of decaying.

use serde::{Deserialize, Deserializer, Serialize};

/// Smallest capacity used as a divisor.
const MIN_CAPACITY: f32 = f32::EPSILON;

/// Guard against NaN and Infinity in state values.
/// If the value is NaN or Inf, replace with the provided fallback.
#[inline]
pub(crate) fn sanitize_f32(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        tracing::warn!("NaN/Inf detected in state, resetting to fallback {}", fallback);
        fallback
    }
}

/// Deserialize an f32, mapping non-finite values to 0.0.
pub fn deserialize_safe_f32<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    let v = f32::deserialize(deserializer)?;
    Ok(sanitize_f32(v, 0.0))
}

/// Discrete behavioural mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LashoutState {
    /// Stress decays, growth may happen
    #[default]
    Calm,
    /// Capacity was exceeded; outbursts fire periodically
    Lashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressState {
    #[serde(deserialize_with = "deserialize_safe_f32")]
    pub stress_level: f32,

    /// Current stress ceiling. Only grows.
    #[serde(deserialize_with = "deserialize_safe_f32")]
    pub capacity: f32,

    /// High-water mark of `stress_level` since the last growth event
    #[serde(deserialize_with = "deserialize_safe_f32")]
    pub max_stress_since_growth: f32,

    pub lashout: LashoutState,

    /// Simulation time of the last outburst. Only meaningful while lashing.
    pub last_outburst_time: f32,
}

impl StressState {
    pub fn new(capacity: f32) -> Self {
        Self {
            stress_level: 0.0,
            capacity,
            max_stress_since_growth: 0.0,
            lashout: LashoutState::Calm,
            last_outburst_time: 0.0,
        }
    }

    pub fn is_lashing(&self) -> bool {
        self.lashout == LashoutState::Lashing
    }

    /// `stress_level / capacity`, safe against a degenerate capacity.
    pub fn stress_ratio(&self) -> f32 {
        self.stress_level / self.capacity.max(MIN_CAPACITY)
    }

    /// `value / capacity`, safe against a degenerate capacity.
    pub fn ratio_of(&self, value: f32) -> f32 {
        value / self.capacity.max(MIN_CAPACITY)
    }

    /// Enter lashout at `now`.
    ///
    /// The outburst clock is set one `period` in the past so the first
    /// outburst fires on the next frame.
    pub fn enter_lashout(&mut self, now: f32, period: f32) {
        self.lashout = LashoutState::Lashing;
        self.last_outburst_time = now - period;
    }

    pub fn exit_lashout(&mut self) {
        self.lashout = LashoutState::Calm;
    }

    /// Sanitize and clamp all values to their valid ranges.
    pub fn normalize(&mut self) {
        self.capacity = sanitize_f32(self.capacity, MIN_CAPACITY).max(MIN_CAPACITY);
        self.stress_level = sanitize_f32(self.stress_level, 0.0).clamp(0.0, self.capacity);
        self.max_stress_since_growth =
            sanitize_f32(self.max_stress_since_growth, 0.0).clamp(0.0, self.capacity);
        self.last_outburst_time = sanitize_f32(self.last_outburst_time, 0.0);
    }
}
