//! Heartbeat configuration for the habitat
//!
//! The heartbeat is the fixed simulation step. Real-time drivers also use
//! it as their pacing interval.

use std::time::Duration;

const DEFAULT_HZ: f32 = 60.0;

/// Configuration for the simulation heartbeat
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Length of one simulation step (default: 1/60 s)
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self::from_hz(DEFAULT_HZ)
    }
}

impl HeartbeatConfig {
    /// Step at `hz` frames per second.
    ///
    /// Rates that are not positive, or so small that the step does not fit a
    /// `Duration`, fall back to 60 Hz.
    pub fn from_hz(hz: f32) -> Self {
        let interval = if hz.is_finite() && hz > 0.0 {
            Duration::try_from_secs_f32(1.0 / hz).ok()
        } else {
            None
        };

        let interval = interval.unwrap_or_else(|| {
            tracing::warn!("Unusable tick rate {} Hz, stepping at {} Hz", hz, DEFAULT_HZ);
            Duration::from_secs_f32(1.0 / DEFAULT_HZ)
        });

        Self { interval }
    }

    /// Step length in seconds
    pub fn dt(&self) -> f32 {
        self.interval.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sixty_hz() {
        let hb = HeartbeatConfig::default();
        assert!((hb.dt() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_rate_sets_step() {
        let hb = HeartbeatConfig::from_hz(20.0);
        assert!((hb.dt() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_rate_falls_back() {
        for hz in [0.0, -5.0, f32::NAN, f32::INFINITY] {
            let hb = HeartbeatConfig::from_hz(hz);
            assert!((hb.dt() - 1.0 / 60.0).abs() < 1e-6, "{} Hz", hz);
        }
    }

    #[test]
    fn test_tiny_rate_falls_back_instead_of_panicking() {
        let hb = HeartbeatConfig::from_hz(1e-20);
        assert!((hb.dt() - 1.0 / 60.0).abs() < 1e-6);
    }
}
