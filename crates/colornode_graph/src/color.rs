// SPDX-License-Identifier: MIT OR Apache-2.0
//! Conversion of sink channel values to a displayable color.

use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color produced by the output node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputColor {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

impl OutputColor {
    /// Shown while there is no output node to evaluate
    pub const FALLBACK: Self = Self::rgba(255, 20, 147, 255);

    /// Create a color from 8-bit channels
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color from channel values in `[0, 1]`.
    ///
    /// Out-of-range values are clamped; NaN maps to 0.
    pub fn from_channels(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(to_byte(r), to_byte(g), to_byte(b), 255)
    }

    /// Pack as `0xAABBGGRR`
    pub fn to_rgba32(self) -> u32 {
        (u32::from(self.a) << 24)
            | (u32::from(self.b) << 16)
            | (u32::from(self.g) << 8)
            | u32::from(self.r)
    }
}

impl Default for OutputColor {
    fn default() -> Self {
        Self::FALLBACK
    }
}

fn to_byte(channel: f32) -> u8 {
    let clamped = if channel.is_nan() { 0.0 } else { channel.clamp(0.0, 1.0) };
    // In range [0.5, 255.5], so the cast truncates without saturating
    (255.0 * clamped + 0.5) as u8
}
