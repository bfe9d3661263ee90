//! Colour feedback: the organism's hue lags behind its stress ratio.
//!
//! The organism keeps an *inverse* colour whose red channel slowly tracks
//! `stress / capacity`. The displayed colour is derived from it with an
//! involuted mapping: each displayed channel is one minus the two *other*
//! inverse channels. With green and blue inverse channels at zero this fades
//! white towards red as stress builds.

use crate::state::deserialize_safe_f32;
use serde::{Deserialize, Serialize};

/// Opaque RGB colour, components nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    #[serde(deserialize_with = "deserialize_safe_f32")]
    pub r: f32,
    #[serde(deserialize_with = "deserialize_safe_f32")]
    pub g: f32,
    #[serde(deserialize_with = "deserialize_safe_f32")]
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0 };

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// `(1 - b - g, 1 - b - r, 1 - r - g)`
    pub fn involuted(&self) -> Self {
        Self {
            r: 1.0 - self.b - self.g,
            g: 1.0 - self.b - self.r,
            b: 1.0 - self.r - self.g,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Rate-limited follower driving the inverse colour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorFeedback {
    inverse: Color,

    /// Upper bound on how far the red channel may move in one frame
    max_adaption_speed: f32,
}

impl ColorFeedback {
    pub fn new(max_adaption_speed: f32) -> Self {
        Self {
            inverse: Color::BLACK,
            max_adaption_speed,
        }
    }

    /// Move the inverse red channel towards `target_ratio`.
    ///
    /// The step is `min(delta * dt, max_adaption_speed)`. Only the upward
    /// direction is capped; a negative delta passes through unbounded.
    pub fn adapt(&mut self, target_ratio: f32, dt: f32) {
        let delta = target_ratio - self.inverse.r;
        if delta != 0.0 {
            self.inverse.r += (delta * dt).min(self.max_adaption_speed);
        }
    }

    pub fn inverse(&self) -> Color {
        self.inverse
    }

    pub fn display(&self) -> Color {
        self.inverse.involuted()
    }
}
