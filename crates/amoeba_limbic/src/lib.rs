//! # Amoeba Limbic Runtime
//!
//! The per-frame stress response of an organism. This crate wires the pure
//! regulation law from `amoeba_core` into a running system:
//!
//! - **Engine**: absorbs impulses, regulates stress, runs the lashout state
//!   machine and releases outbursts
//! - **Breathing**: the pulsation the engine speeds up, resizes and pauses
//! - **Ambient**: a fixed-rate source of stressors from the scene's edge
//! - **Habitat**: carries impulses between organisms without a physics engine
//!
//! ## Frame order
//!
//! Lashout tick, stress regulation, breathing feedback, colour adaption, light.
//! Each step reads the state the previous one left behind.

pub mod ambient;
mod breathing;
mod engine;
pub mod habitat;
mod heartbeat;
mod listener;

pub use ambient::{AmbientGenerator, EmissionLimiter};
pub use breathing::{Breathing, PulseBreathing};
pub use engine::{FrameOutputs, StressEngine};
pub use habitat::{Amoeba, AmoebaFrame, Habitat, HabitatFrame};
pub use heartbeat::HeartbeatConfig;
pub use listener::{MaxStressListener, MaxStressReached};
