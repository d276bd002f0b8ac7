//! Loaded-image handle and the pixel-sampling primitive.
//!
//! Everything that turns geometry into pixels (quality sampling and slide
//! export) goes through [`ImageSource::sample`]: render an arbitrary source
//! rectangle into a destination buffer of a fixed size.

use thiserror::Error;

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, RgbImage};

use crate::decode::DecodedImage;

/// Errors produced while sampling pixels from a source image.
#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    /// The requested rectangle has no area or lies outside the image.
    #[error("Source region is empty or outside the image")]
    EmptyRegion,

    /// Width or height of the destination buffer is zero
    #[error("Invalid output size: width ({width}) and height ({height}) must be non-zero")]
    InvalidOutputSize { width: u32, height: u32 },

    /// The image's pixel buffer does not match its dimensions
    #[error("Pixel buffer mismatch: expected {expected} bytes, got {actual}")]
    BufferMismatch { expected: usize, actual: usize },
}

/// A rectangle in source-pixel coordinates. Fractional edges are allowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRegion {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole of a `width` x `height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    fn has_area(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A read-only image that can be sampled into fixed-size buffers.
///
/// Implementations must be safe to sample repeatedly; sampling never mutates
/// the source.
pub trait ImageSource {
    /// Natural (full resolution) dimensions in pixels.
    fn natural_size(&self) -> (u32, u32);

    /// Render `region` into an `out_width` x `out_height` RGB buffer.
    ///
    /// Parts of the region outside the image come out black, the way a
    /// canvas blit leaves them untouched.
    fn sample(
        &self,
        region: SourceRegion,
        out_width: u32,
        out_height: u32,
    ) -> Result<DecodedImage, SampleError>;
}

impl ImageSource for DecodedImage {
    fn natural_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn sample(
        &self,
        region: SourceRegion,
        out_width: u32,
        out_height: u32,
    ) -> Result<DecodedImage, SampleError> {
        if out_width == 0 || out_height == 0 {
            return Err(SampleError::InvalidOutputSize {
                width: out_width,
                height: out_height,
            });
        }
        let expected = (self.width as usize) * (self.height as usize) * 3;
        if self.pixels.len() != expected {
            return Err(SampleError::BufferMismatch {
                expected,
                actual: self.pixels.len(),
            });
        }
        if !region.has_area() || self.is_empty() {
            return Err(SampleError::EmptyRegion);
        }

        // Part of the region that overlaps the image.
        let left = region.x.max(0.0);
        let top = region.y.max(0.0);
        let right = (region.x + region.width).min(self.width as f64);
        let bottom = (region.y + region.height).min(self.height as f64);
        if right <= left || bottom <= top {
            return Err(SampleError::EmptyRegion);
        }

        // Where that part lands in the output. Anything outside stays black.
        let dst_x = project(left, region.x, region.width, out_width);
        let dst_y = project(top, region.y, region.height, out_height);
        let dst_width = project(right, region.x, region.width, out_width).saturating_sub(dst_x);
        let dst_height = project(bottom, region.y, region.height, out_height).saturating_sub(dst_y);
        if dst_width == 0 || dst_height == 0 {
            return Err(SampleError::EmptyRegion);
        }

        // Fractional edges snap to the nearest pixel boundary (at most half a
        // source pixel off).
        let src_x = (left.round() as u32).min(self.width - 1);
        let src_y = (top.round() as u32).min(self.height - 1);
        let src_width = (right.round() as u32).clamp(src_x + 1, self.width) - src_x;
        let src_height = (bottom.round() as u32).clamp(src_y + 1, self.height) - src_y;

        let view = ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(self.width, self.height, &self.pixels[..])
            .ok_or(SampleError::BufferMismatch {
                expected,
                actual: self.pixels.len(),
            })?;
        let window = imageops::crop_imm(&view, src_x, src_y, src_width, src_height);
        let resized = imageops::resize(&*window, dst_width, dst_height, FilterType::Triangle);

        if dst_width == out_width && dst_height == out_height {
            return Ok(DecodedImage::from_rgb_image(resized));
        }
        let mut canvas = RgbImage::new(out_width, out_height);
        imageops::replace(&mut canvas, &resized, dst_x as i64, dst_y as i64);
        Ok(DecodedImage::from_rgb_image(canvas))
    }
}

/// Map source coordinate `v` on a region axis `[start, start + len)` to an
/// output pixel edge in `0..=out`.
fn project(v: f64, start: f64, len: f64, out: u32) -> u32 {
    (((v - start) * out as f64 / len).round() as u32).min(out)
}

/// Dimensions that fit `width` x `height` within `max_side`, keeping aspect.
///
/// Never upscales and never returns a zero dimension.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 {
        return (1, 1);
    }
    let scale = (max_side.max(1) as f64 / longest as f64).min(1.0);
    let fit = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (fit(width), fit(height))
}

/// Sample the whole of `source`, downsampled to at most `max_side` on its long side.
pub fn sample_downscaled<S: ImageSource + ?Sized>(
    source: &S,
    max_side: u32,
) -> Result<DecodedImage, SampleError> {
    let (width, height) = source.natural_size();
    let (out_width, out_height) = fit_within(width, height, max_side);
    source.sample(SourceRegion::full(width, height), out_width, out_height)
}
