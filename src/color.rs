//! Straight-alpha float colors as configured by the host, plus the 8-bit
//! conversions used when tinting draw calls.

use crate::error::{OverlayError, OverlayResult};

/// Opaque RGB color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Straight-alpha RGBA color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgb {
    /// Create a validated color; channels must be finite and in `[0, 1]`.
    pub fn new(r: f32, g: f32, b: f32) -> OverlayResult<Self> {
        for (name, v) in [("r", r), ("g", g), ("b", b)] {
            check_channel(name, v)?;
        }
        Ok(Self { r, g, b })
    }

    /// 8-bit RGBA with this color's channels and `alpha` as the alpha channel.
    ///
    /// `alpha` is clamped to `[0, 1]` before quantization.
    pub fn to_rgba8(self, alpha: f32) -> [u8; 4] {
        let a = alpha.clamp(0.0, 1.0);
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(a)]
    }
}

impl Rgba {
    /// Create a validated color; channels must be finite and in `[0, 1]`.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> OverlayResult<Self> {
        for (name, v) in [("r", r), ("g", g), ("b", b), ("a", a)] {
            check_channel(name, v)?;
        }
        Ok(Self { r, g, b, a })
    }

    /// 8-bit RGBA with the stored alpha scaled by `alpha`.
    pub fn to_rgba8_scaled(self, alpha: f32) -> [u8; 4] {
        let a = (self.a * alpha.clamp(0.0, 1.0)).clamp(0.0, 1.0);
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(a)]
    }
}

fn check_channel(name: &str, v: f32) -> OverlayResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(OverlayError::validation(format!(
            "color channel '{name}' must be finite and in [0, 1], got {v}"
        )));
    }
    Ok(())
}

fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
