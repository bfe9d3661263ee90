//! Ambient stressors: a steady drizzle of small impulses from the edge of the
//! scene, independent of any organism.

use amoeba_core::config::AmbientConfig;
use amoeba_core::{StressorImpulse, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Gates emissions to one per interval boundary.
///
/// Emits when `now` has passed the next boundary, then moves the boundary
/// one interval on. After a stall it catches up one emission per call.
#[derive(Debug, Clone)]
pub struct EmissionLimiter {
    interval: f32,
    next_boundary: f32,
    emitted: u64,
}

impl EmissionLimiter {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            next_boundary: 0.0,
            emitted: 0,
        }
    }

    /// Returns true and records an emission if one is due at `now`.
    pub fn try_emit(&mut self, now: f32) -> bool {
        if now > self.next_boundary {
            self.emitted += 1;
            self.next_boundary = self.emitted as f32 * self.interval;
            true
        } else {
            false
        }
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

pub struct AmbientGenerator {
    limiter: EmissionLimiter,
    rng: StdRng,
    radius: f32,
    force: f32,
    magnitude: f32,
    lifetime: f32,
}

impl AmbientGenerator {
    /// Build a generator. Without a configured seed the angles come from
    /// entropy.
    pub fn new(config: &AmbientConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_parts(config, EmissionLimiter::new(config.interval), rng)
    }

    pub fn with_parts(config: &AmbientConfig, limiter: EmissionLimiter, rng: StdRng) -> Self {
        Self {
            limiter,
            rng,
            radius: config.radius,
            force: config.force,
            magnitude: config.magnitude,
            lifetime: config.lifetime,
        }
    }

    /// Emit at most one impulse if the cadence allows it at `now`.
    pub fn tick(&mut self, now: f32) -> Option<StressorImpulse> {
        if !self.limiter.try_emit(now) {
            return None;
        }

        // Whole degrees, upper bound exclusive
        let angle = self.rng.gen_range(0..359) as f32;
        let spawn = Vec3::new(self.radius, 0.0, self.radius).rotate_y(angle);

        tracing::trace!("Ambient stressor #{} at {:.0} degrees", self.limiter.emitted(), angle);

        Some(StressorImpulse {
            magnitude: self.magnitude,
            creator: None,
            impulse: -spawn.normalize() * self.force,
            origin: spawn,
            lifetime: self.lifetime,
        })
    }

    pub fn emitted(&self) -> u64 {
        self.limiter.emitted()
    }
}
