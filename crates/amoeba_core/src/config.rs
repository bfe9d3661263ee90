use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

/// Slowest simulation rate accepted from configuration.
pub const MIN_TICK_HZ: f32 = 1.0;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AmoebaConfig {
    pub stress: StressConfig,
    pub color: ColorConfig,
    pub light: LightConfig,
    pub outburst: OutburstConfig,
    pub breathing: BreathingConfig,
    pub ambient: AmbientConfig,
    pub habitat: HabitatConfig,
}

impl AmoebaConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied and the result is validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: AmoebaConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Try to load from path; if the file doesn't exist or is invalid, return
    /// defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                if let Err(e) = cfg.validate() {
                    tracing::warn!("Ignoring env overrides ({}), using plain defaults", e);
                    cfg = Self::default();
                }
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("AMOEBA_CAPACITY") {
            if let Ok(n) = v.parse() {
                self.stress.initial_capacity = n;
            }
        }
        if let Ok(v) = std::env::var("AMOEBA_COUNT") {
            if let Ok(n) = v.parse() {
                self.habitat.amoebas = n;
            }
        }
        if let Ok(v) = std::env::var("AMOEBA_SEED") {
            if let Ok(n) = v.parse() {
                self.ambient.seed = Some(n);
            }
        }
        if let Ok(v) = std::env::var("AMOEBA_TICK_HZ") {
            if let Ok(n) = v.parse() {
                self.habitat.tick_hz = n;
            }
        }
    }

    /// Reject parameter sets the simulation cannot run with.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let s = &self.stress;
        if !s.initial_capacity.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "stress.initial_capacity",
            });
        }
        if s.initial_capacity <= 0.0 {
            return Err(ConfigError::NonPositiveCapacity(s.initial_capacity));
        }
        non_negative("stress.decay_ratio", s.decay_ratio)?;
        positive("stress.growth_factor", s.growth_factor)?;
        positive("stress.size_scale_divisor", s.size_scale_divisor)?;

        non_negative("color.max_adaption_speed", self.color.max_adaption_speed)?;

        non_negative("light.peak_intensity", self.light.peak_intensity)?;
        positive("light.rise_duration", self.light.rise_duration)?;

        let o = &self.outburst;
        positive("outburst.frequency", o.frequency)?;
        if o.count == 0 {
            return Err(ConfigError::EmptyOutburst);
        }
        non_negative("outburst.force", o.force)?;
        positive("outburst.cost_divisor", o.cost_divisor)?;
        non_negative("outburst.exit_ratio", o.exit_ratio)?;
        positive("outburst.lifetime", o.lifetime)?;

        non_negative("breathing.fluctuation", self.breathing.fluctuation)?;
        non_negative("breathing.base_frequency", self.breathing.base_frequency)?;
        non_negative("breathing.speed_gain", self.breathing.speed_gain)?;

        let a = &self.ambient;
        positive("ambient.interval", a.interval)?;
        non_negative("ambient.radius", a.radius)?;
        non_negative("ambient.force", a.force)?;
        non_negative("ambient.magnitude", a.magnitude)?;
        positive("ambient.lifetime", a.lifetime)?;

        let h = &self.habitat;
        non_negative("habitat.spacing", h.spacing)?;
        positive("habitat.body_radius", h.body_radius)?;
        positive("habitat.projectile_mass", h.projectile_mass)?;
        positive("habitat.tick_hz", h.tick_hz)?;
        if h.tick_hz < MIN_TICK_HZ {
            return Err(ConfigError::BelowMinimum {
                field: "habitat.tick_hz",
                min: MIN_TICK_HZ,
                value: h.tick_hz,
            });
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> std::result::Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> std::result::Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    /// Capacity a newborn organism starts with
    pub initial_capacity: f32,
    /// Fraction of capacity shed per second while calm
    pub decay_ratio: f32,
    /// Fraction of the pre-growth peak added to capacity on growth
    pub growth_factor: f32,
    /// Capacity at which the base size reaches ln(2) + 0.5
    pub size_scale_divisor: f32,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 50.0,
            decay_ratio: 0.05,
            growth_factor: 0.2,
            size_scale_divisor: 50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Largest per-frame step of the inverse red channel
    pub max_adaption_speed: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            max_adaption_speed: 0.1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub peak_intensity: f32,
    /// Seconds
    pub rise_duration: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            peak_intensity: 3.0,
            rise_duration: 0.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutburstConfig {
    /// Outbursts per second while lashing
    pub frequency: f32,
    /// Impulses per outburst, spread evenly around the vertical axis
    pub count: usize,
    /// Force applied to each outburst impulse
    pub force: f32,
    /// Each outburst costs (and each impulse carries) capacity / cost_divisor
    pub cost_divisor: f32,
    /// Lashout ends when stress drops below capacity * exit_ratio
    pub exit_ratio: f32,
    /// Seconds an outburst impulse lives
    pub lifetime: f32,
}

impl Default for OutburstConfig {
    fn default() -> Self {
        Self {
            frequency: 3.0,
            count: 5,
            force: 220.0,
            cost_divisor: 8.0,
            exit_ratio: 0.5,
            lifetime: 1.0,
        }
    }
}

impl OutburstConfig {
    /// Seconds between outbursts
    pub fn period(&self) -> f32 {
        1.0 / self.frequency
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BreathingConfig {
    /// Relative amplitude of the breathing pulse
    pub fluctuation: f32,
    /// Breaths per second at zero stress
    pub base_frequency: f32,
    /// Extra breaths per second at full stress
    pub speed_gain: f32,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            fluctuation: 0.1,
            base_frequency: 0.5,
            speed_gain: 1.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub enabled: bool,
    /// Seconds between emissions
    pub interval: f32,
    /// Spawn ring radius; the spawn point is (radius, 0, radius) rotated
    pub radius: f32,
    /// Inbound force
    pub force: f32,
    pub magnitude: f32,
    /// Seconds an ambient impulse lives
    pub lifetime: f32,
    /// Seed for the angle generator. Random when unset.
    pub seed: Option<u64>,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 1.0,
            radius: 20.0,
            force: 200.0,
            magnitude: 5.0,
            lifetime: 3.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HabitatConfig {
    /// Number of organisms placed in the habitat
    pub amoebas: usize,
    /// Distance between neighbouring organisms along the X axis
    pub spacing: f32,
    /// Contact radius at base size 1.0
    pub body_radius: f32,
    /// Mass of an impulse projectile; velocity = force / mass
    pub projectile_mass: f32,
    /// Simulation steps per second
    pub tick_hz: f32,
}

impl Default for HabitatConfig {
    fn default() -> Self {
        Self {
            amoebas: 1,
            spacing: 6.0,
            body_radius: 1.0,
            projectile_mass: 20.0,
            tick_hz: 60.0,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = AmoebaConfig::default();
        assert_eq!(cfg.stress.initial_capacity, 50.0);
        assert_eq!(cfg.stress.decay_ratio, 0.05);
        assert_eq!(cfg.outburst.count, 5);
        assert!((cfg.outburst.period() - 1.0 / 3.0).abs() < 1e-6);
        assert!(cfg.ambient.enabled);
        assert!(cfg.ambient.seed.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[stress]
initial_capacity = 80.0
"#;
        let cfg: AmoebaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.stress.initial_capacity, 80.0);
        // Defaults for unspecified fields
        assert_eq!(cfg.stress.growth_factor, 0.2);
        assert_eq!(cfg.light.peak_intensity, 3.0);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[stress]
initial_capacity = 40.0
decay_ratio = 0.1
growth_factor = 0.5
size_scale_divisor = 25.0

[color]
max_adaption_speed = 0.2

[light]
peak_intensity = 5.0
rise_duration = 0.4

[outburst]
frequency = 2.0
count = 8
force = 100.0
cost_divisor = 4.0
exit_ratio = 0.25
lifetime = 2.0

[breathing]
fluctuation = 0.2
base_frequency = 1.0
speed_gain = 2.0

[ambient]
enabled = false
interval = 0.5
radius = 10.0
force = 50.0
magnitude = 2.5
lifetime = 4.0
seed = 42

[habitat]
amoebas = 3
spacing = 4.0
body_radius = 1.5
projectile_mass = 10.0
tick_hz = 30.0
"#;
        let cfg: AmoebaConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.stress.initial_capacity, 40.0);
        assert_eq!(cfg.outburst.count, 8);
        assert_eq!(cfg.outburst.exit_ratio, 0.25);
        assert!(!cfg.ambient.enabled);
        assert_eq!(cfg.ambient.seed, Some(42));
        assert_eq!(cfg.habitat.amoebas, 3);
        assert_eq!(cfg.habitat.tick_hz, 30.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_capacity() {
        let mut cfg = AmoebaConfig::default();
        cfg.stress.initial_capacity = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveCapacity(0.0)));

        cfg.stress.initial_capacity = f32::NAN;
        assert!(matches!(cfg.validate(), Err(ConfigError::NonFinite { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_outburst() {
        let mut cfg = AmoebaConfig::default();
        cfg.outburst.count = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyOutburst));

        let mut cfg = AmoebaConfig::default();
        cfg.outburst.frequency = 0.0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                field: "outburst.frequency",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_decay() {
        let mut cfg = AmoebaConfig::default();
        cfg.stress.decay_ratio = -0.1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Negative {
                field: "stress.decay_ratio",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_growth() {
        let mut cfg = AmoebaConfig::default();
        cfg.stress.growth_factor = 0.0;
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                field: "stress.growth_factor",
                value: 0.0,
            })
        );
    }

    #[test]
    fn test_validate_rejects_tiny_tick_rate() {
        let mut cfg = AmoebaConfig::default();
        cfg.habitat.tick_hz = 1e-20;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BelowMinimum {
                field: "habitat.tick_hz",
                ..
            })
        ));

        cfg.habitat.tick_hz = MIN_TICK_HZ;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!("amoeba_invalid_{}.toml", std::process::id()));
        std::fs::write(&path, "[outburst]\ncount = 0\n").unwrap();
        let err = AmoebaConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("outburst"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_env_overrides_and_defaults() {
        // Part 1: env overrides
        std::env::set_var("AMOEBA_CAPACITY", "75");
        std::env::set_var("AMOEBA_SEED", "7");

        let mut cfg = AmoebaConfig::default();
        cfg.apply_env_overrides();

        assert_eq!(cfg.stress.initial_capacity, 75.0);
        assert_eq!(cfg.ambient.seed, Some(7));

        // Clean up env vars before testing defaults
        std::env::remove_var("AMOEBA_CAPACITY");
        std::env::remove_var("AMOEBA_SEED");

        // Part 2: nonexistent path returns defaults (no env interference)
        let cfg = AmoebaConfig::load_or_default("/nonexistent/amoeba.toml");
        assert_eq!(cfg.stress.initial_capacity, 50.0);
    }
}
