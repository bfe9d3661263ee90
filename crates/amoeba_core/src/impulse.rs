//! Stressor impulses: the transient units of stress passed between entities.

use crate::math::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identity of an entity that can emit or absorb impulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The short form is enough to tell organisms apart in logs.
        let s = self.0.simple().to_string();
        f.write_str(&s[..8])
    }
}

/// A creator-tagged unit of stress travelling through the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressorImpulse {
    /// Stress units delivered on absorption (>= 0)
    pub magnitude: f32,

    /// Entity that emitted this impulse. `None` for ambient impulses.
    pub creator: Option<EntityId>,

    /// Initial force applied to the carrying projectile
    pub impulse: Vec3,

    /// Spawn point. Relative to the emitter for outbursts, absolute otherwise.
    pub origin: Vec3,

    /// Seconds before the environment expires the impulse if nobody absorbs it
    pub lifetime: f32,
}

impl StressorImpulse {
    /// Whether `entity` emitted this impulse and must therefore ignore it.
    pub fn is_created_by(&self, entity: EntityId) -> bool {
        self.creator == Some(entity)
    }
}
