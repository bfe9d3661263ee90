//! # Amoeba Core
//!
//! Data model and regulation law for a reactive organism that absorbs
//! stressor impulses and turns its accumulated stress into colour, light,
//! breathing and growth.
//!
//! This crate is pure and synchronous. The runtime that orders the per-frame
//! work, talks to collaborators and emits outbursts lives in `amoeba_limbic`.

pub mod color;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod impulse;
pub mod light;
pub mod math;
pub mod state;

pub use color::{Color, ColorFeedback};
pub use config::AmoebaConfig;
pub use dynamics::{Growth, Regulation, StressDynamics};
pub use error::ConfigError;
pub use impulse::{EntityId, StressorImpulse};
pub use light::LightPulse;
pub use math::Vec3;
pub use state::{LashoutState, StressState};
