//! Habitat: a headless environment that carries impulses between organisms.
//!
//! Projectiles move kinematically (`velocity = impulse / mass`), expire after
//! their lifetime and are absorbed by the first organism whose body they
//! enter and which accepts them. This stands in for the physics and collision
//! layer so a population can run end to end.

use crate::ambient::AmbientGenerator;
use crate::breathing::Breathing;
use crate::engine::{FrameOutputs, StressEngine};
use crate::listener::MaxStressListener;
use amoeba_core::{AmoebaConfig, ConfigError, EntityId, StressorImpulse, Vec3};
use serde::Serialize;
use std::sync::Arc;

/// An organism placed in the habitat.
pub struct Amoeba {
    engine: StressEngine,
    position: Vec3,
    /// Uniform scale rendered this frame
    scale: f32,
}

impl Amoeba {
    pub fn engine(&self) -> &StressEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut StressEngine {
        &mut self.engine
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

/// An impulse in flight.
#[derive(Debug, Clone)]
struct Projectile {
    impulse: StressorImpulse,
    position: Vec3,
    velocity: Vec3,
    age: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AmoebaFrame {
    pub id: EntityId,
    pub position: Vec3,
    pub scale: f32,
    pub outputs: FrameOutputs,
}

/// Summary of one habitat step.
#[derive(Debug, Clone, Serialize)]
pub struct HabitatFrame {
    pub now: f32,
    /// Impulses created this step (ambient and outbursts)
    pub spawned: usize,
    pub absorbed: usize,
    pub expired: usize,
    /// Impulses still in flight after the step
    pub in_flight: usize,
    pub amoebas: Vec<AmoebaFrame>,
}

pub struct Habitat {
    amoebas: Vec<Amoeba>,
    projectiles: Vec<Projectile>,
    ambient: Option<AmbientGenerator>,
    body_radius: f32,
    projectile_mass: f32,
    clock: f32,
}

impl Habitat {
    /// Place `habitat.amoebas` organisms on the X axis, centred on the origin.
    pub fn new(config: &AmoebaConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let count = config.habitat.amoebas;
        let spacing = config.habitat.spacing;
        let offset = count.saturating_sub(1) as f32 * spacing / 2.0;

        let amoebas = (0..count)
            .map(|i| {
                Ok(Amoeba {
                    engine: StressEngine::new(config)?,
                    position: Vec3::new(i as f32 * spacing - offset, 0.0, 0.0),
                    scale: 1.0,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let ambient = config
            .ambient
            .enabled
            .then(|| AmbientGenerator::new(&config.ambient));

        tracing::info!(
            "Habitat created: {} amoebas, ambient stressors {}",
            amoebas.len(),
            if ambient.is_some() { "on" } else { "off" }
        );

        Ok(Self {
            amoebas,
            projectiles: Vec::new(),
            ambient,
            body_radius: config.habitat.body_radius,
            projectile_mass: config.habitat.projectile_mass,
            clock: 0.0,
        })
    }

    /// Register a listener on every organism.
    pub fn register_listener(&mut self, listener: Arc<dyn MaxStressListener>) {
        for amoeba in &mut self.amoebas {
            amoeba.engine.register_listener(Arc::clone(&listener));
        }
    }

    /// Launch an impulse from its (absolute) origin.
    pub fn spawn(&mut self, impulse: StressorImpulse) {
        let velocity = impulse.impulse * (1.0 / self.projectile_mass);
        self.projectiles.push(Projectile {
            position: impulse.origin,
            velocity,
            age: 0.0,
            impulse,
        });
    }

    /// Advance the whole habitat by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> HabitatFrame {
        self.clock += dt;
        let now = self.clock;
        let mut spawned = 0;

        if let Some(impulse) = self.ambient.as_mut().and_then(|a| a.tick(now)) {
            self.spawn(impulse);
            spawned += 1;
        }

        // Move and expire
        let before = self.projectiles.len();
        for p in &mut self.projectiles {
            p.position = p.position + p.velocity * dt;
            p.age += dt;
        }
        self.projectiles.retain(|p| p.age < p.impulse.lifetime);
        let expired = before - self.projectiles.len();

        // Absorb
        let before = self.projectiles.len();
        let amoebas = &mut self.amoebas;
        let body_radius = self.body_radius;
        self.projectiles.retain(|p| {
            !amoebas.iter_mut().any(|a| {
                let radius = body_radius * a.engine.breathing().base_factor();
                p.position.distance(a.position) <= radius && a.engine.absorb(&p.impulse)
            })
        });
        let absorbed = before - self.projectiles.len();

        // Tick organisms
        let mut outbursts = Vec::new();
        let mut frames = Vec::with_capacity(self.amoebas.len());
        for amoeba in &mut self.amoebas {
            let outputs = amoeba.engine.tick(dt, now);
            amoeba.scale = match outputs.scale {
                Some(scale) => scale,
                None => amoeba.engine.breathing_mut().advance(dt),
            };
            for impulse in &outputs.outburst {
                outbursts.push(StressorImpulse {
                    origin: amoeba.position + impulse.origin,
                    ..impulse.clone()
                });
            }
            frames.push(AmoebaFrame {
                id: amoeba.engine.id(),
                position: amoeba.position,
                scale: amoeba.scale,
                outputs,
            });
        }
        spawned += outbursts.len();
        for impulse in outbursts {
            self.spawn(impulse);
        }

        HabitatFrame {
            now,
            spawned,
            absorbed,
            expired,
            in_flight: self.projectiles.len(),
            amoebas: frames,
        }
    }

    pub fn now(&self) -> f32 {
        self.clock
    }

    pub fn amoebas(&self) -> &[Amoeba] {
        &self.amoebas
    }

    pub fn amoebas_mut(&mut self) -> &mut [Amoeba] {
        &mut self.amoebas
    }

    pub fn in_flight(&self) -> usize {
        self.projectiles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn config(amoebas: usize, ambient: bool) -> AmoebaConfig {
        let mut config = AmoebaConfig::default();
        config.habitat.amoebas = amoebas;
        config.ambient.enabled = ambient;
        config.ambient.seed = Some(0xA40E_BA);
        config
    }

    fn stress_impulse(magnitude: f32) -> StressorImpulse {
        StressorImpulse {
            magnitude,
            creator: None,
            impulse: Vec3::ZERO,
            origin: Vec3::ZERO,
            lifetime: 1.0,
        }
    }

    #[test]
    fn test_amoebas_centred_on_origin() {
        let mut config = config(3, false);
        config.habitat.spacing = 4.0;
        let habitat = Habitat::new(&config).unwrap();

        let xs: Vec<f32> = habitat.amoebas().iter().map(|a| a.position().x).collect();
        assert_eq!(xs, vec![-4.0, 0.0, 4.0]);
    }

    #[test]
    fn test_ambient_stressors_reach_the_amoeba() {
        let mut habitat = Habitat::new(&config(1, true)).unwrap();

        let mut absorbed = 0;
        for _ in 0..(6 * 60) {
            absorbed += habitat.step(DT).absorbed;
        }

        assert!(absorbed > 0, "no ambient stressor was absorbed");
    }

    #[test]
    fn test_unabsorbed_impulses_expire() {
        let mut habitat = Habitat::new(&config(1, false)).unwrap();
        habitat.spawn(StressorImpulse {
            origin: Vec3::new(100.0, 0.0, 0.0),
            lifetime: 0.5,
            ..stress_impulse(5.0)
        });
        assert_eq!(habitat.in_flight(), 1);

        let mut expired = 0;
        for _ in 0..60 {
            expired += habitat.step(DT).expired;
        }
        assert_eq!(expired, 1);
        assert_eq!(habitat.in_flight(), 0);
    }

    #[test]
    fn test_lone_amoeba_never_absorbs_own_outburst() {
        let mut habitat = Habitat::new(&config(1, false)).unwrap();
        habitat.amoebas_mut()[0]
            .engine_mut()
            .absorb(&stress_impulse(50.0));

        let mut spawned = 0;
        let mut absorbed = 0;
        for _ in 0..120 {
            let frame = habitat.step(DT);
            spawned += frame.spawned;
            absorbed += frame.absorbed;
        }

        assert!(spawned >= 5);
        assert_eq!(absorbed, 0);
        assert!(!habitat.amoebas()[0].engine().is_lashing());
    }

    #[test]
    fn test_outburst_stresses_neighbour() {
        let mut config = config(2, false);
        config.habitat.spacing = 2.0;
        let mut habitat = Habitat::new(&config).unwrap();
        habitat.amoebas_mut()[0]
            .engine_mut()
            .absorb(&stress_impulse(50.0));

        let mut neighbour_peak: f32 = 0.0;
        for _ in 0..60 {
            let frame = habitat.step(DT);
            neighbour_peak = neighbour_peak.max(frame.amoebas[1].outputs.stress_level);
        }

        assert!(neighbour_peak > 0.0, "neighbour never felt the outburst");
    }

    #[test]
    fn test_lashing_amoeba_scale_is_overridden() {
        let mut habitat = Habitat::new(&config(1, false)).unwrap();
        habitat.amoebas_mut()[0]
            .engine_mut()
            .absorb(&stress_impulse(50.0));

        habitat.step(DT);
        let frame = habitat.step(DT);
        let amoeba = &frame.amoebas[0];
        assert_eq!(Some(amoeba.scale), amoeba.outputs.scale);
    }

    #[test]
    fn test_frame_serializes_to_json() {
        let mut habitat = Habitat::new(&config(2, false)).unwrap();
        let frame = habitat.step(DT);

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["amoebas"].as_array().unwrap().len(), 2);
        assert_eq!(json["amoebas"][0]["outputs"]["lashout"], "calm");
    }
}
