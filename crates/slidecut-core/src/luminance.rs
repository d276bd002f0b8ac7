//! Luminance calculation utilities using ITU-R BT.709 coefficients.
//!
//! Shared by the luma histogram and the quality analyzer so both agree on
//! what "brightness" means for a pixel.

/// ITU-R BT.709 coefficient for red channel in luminance calculation.
pub const LUMINANCE_R: f32 = 0.2126;

/// ITU-R BT.709 coefficient for green channel in luminance calculation.
pub const LUMINANCE_G: f32 = 0.7152;

/// ITU-R BT.709 coefficient for blue channel in luminance calculation.
pub const LUMINANCE_B: f32 = 0.0722;

/// Unrounded luma of an 8-bit RGB pixel, on the 0.0 to 255.0 scale.
///
/// # Arguments
/// * `r` - Red channel value (0-255)
/// * `g` - Green channel value (0-255)
/// * `b` - Blue channel value (0-255)
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    LUMINANCE_R * r as f32 + LUMINANCE_G * g as f32 + LUMINANCE_B * b as f32
}

/// Histogram bin (0-255) for an unrounded luma value.
#[inline]
pub fn luma_bin(luma: f32) -> u8 {
    luma.clamp(0.0, 255.0).round() as u8
}
