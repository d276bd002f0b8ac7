//! Pixel-level quality scoring.
//!
//! One pass over the pixels collects the luma histogram, a grayscale buffer
//! for the Laplacian, and the exposure counters. Levels come from the
//! threshold tiers; the score from capped per-concern penalties.

use std::fmt;

use super::{
    laplacian_variance, ContrastMetrics, ExposureMetrics, QualityAnalysis, QualityError,
    QualityLevel, QualityThresholds, ResolutionMetrics, SharpnessMetrics, ThresholdTier,
};
use crate::decode::DecodedImage;
use crate::histogram::LumaHistogram;
use crate::luminance::luma;

/// Sole reason reported for an `ok` analysis.
pub const NO_ISSUES_REASON: &str = "No significant quality issues detected";

/// Luma at or above which a pixel counts as overexposed.
const OVEREXPOSED_LUMA: f32 = 245.0;
/// Channel value at or above which a pixel counts as a clipped highlight.
const CLIPPED_CHANNEL: u8 = 250;
/// Luma at or below which a pixel counts as underexposed.
const UNDEREXPOSED_LUMA: f32 = 15.0;

const EXPOSURE_PENALTY_CAP: f64 = 35.0;
const CONTRAST_PENALTY_CAP: f64 = 20.0;
const SHARPNESS_PENALTY_CAP: f64 = 30.0;
const RESOLUTION_PENALTY_CAP: f64 = 15.0;

/// Analyze an RGB region with the default thresholds.
///
/// `pixels` holds `width * height` RGB triples in row-major order.
/// `resolution` is supplied for per-crop analyses only.
///
/// # Errors
///
/// Returns `QualityError::EmptyRegion` for a zero-area region and
/// `QualityError::PixelBufferMismatch` if the buffer length is wrong.
pub fn analyze(
    pixels: &[u8],
    width: u32,
    height: u32,
    resolution: Option<ResolutionMetrics>,
) -> Result<QualityAnalysis, QualityError> {
    analyze_with(pixels, width, height, resolution, &QualityThresholds::default())
}

/// Analyze a decoded image with the given thresholds.
pub fn analyze_image(
    image: &DecodedImage,
    resolution: Option<ResolutionMetrics>,
    thresholds: &QualityThresholds,
) -> Result<QualityAnalysis, QualityError> {
    analyze_with(&image.pixels, image.width, image.height, resolution, thresholds)
}

/// Analyze an RGB region against explicit thresholds.
pub fn analyze_with(
    pixels: &[u8],
    width: u32,
    height: u32,
    resolution: Option<ResolutionMetrics>,
    thresholds: &QualityThresholds,
) -> Result<QualityAnalysis, QualityError> {
    if width == 0 || height == 0 {
        return Err(QualityError::EmptyRegion { width, height });
    }
    let pixel_count = (width as usize) * (height as usize);
    let expected = pixel_count * 3;
    if pixels.len() != expected {
        return Err(QualityError::PixelBufferMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let mut histogram = LumaHistogram::new();
    let mut gray = Vec::with_capacity(pixel_count);
    let (mut over, mut clipped, mut under) = (0u64, 0u64, 0u64);

    for px in pixels.chunks_exact(3) {
        let (r, g, b) = (px[0], px[1], px[2]);
        let l = luma(r, g, b);
        gray.push(l);
        histogram.record(l);

        if l >= OVEREXPOSED_LUMA {
            over += 1;
        }
        if r >= CLIPPED_CHANNEL || g >= CLIPPED_CHANNEL || b >= CLIPPED_CHANNEL {
            clipped += 1;
        }
        if l <= UNDEREXPOSED_LUMA {
            under += 1;
        }
    }

    let pct = |count: u64| count as f64 / pixel_count as f64 * 100.0;
    let exposure = ExposureMetrics {
        overexposed_pct: pct(over),
        clipped_highlights_pct: pct(clipped),
        underexposed_pct: pct(under),
    };

    let p5 = histogram.percentile(0.05);
    let p95 = histogram.percentile(0.95);
    let contrast = ContrastMetrics {
        p5,
        p95,
        dynamic_range_norm: (p95 as f64 - p5 as f64) / 255.0,
    };

    let sharpness = SharpnessMetrics {
        laplacian_variance: laplacian_variance(&gray, width as usize, height as usize),
    };

    let measured = Measured {
        exposure,
        contrast,
        sharpness,
        resolution,
    };

    let critical = measured.findings(&thresholds.critical);
    let (level, reasons) = if !critical.is_empty() {
        (QualityLevel::Critical, critical)
    } else {
        let warning = measured.findings(&thresholds.warning);
        if warning.is_empty() {
            (QualityLevel::Ok, Vec::new())
        } else {
            (QualityLevel::Warning, warning)
        }
    };

    let reasons = if reasons.is_empty() {
        vec![NO_ISSUES_REASON.to_string()]
    } else {
        reasons.iter().map(Finding::to_string).collect()
    };

    Ok(QualityAnalysis {
        level,
        score: measured.score(&thresholds.warning),
        reasons,
        exposure,
        contrast,
        sharpness,
        resolution,
    })
}

struct Measured {
    exposure: ExposureMetrics,
    contrast: ContrastMetrics,
    sharpness: SharpnessMetrics,
    resolution: Option<ResolutionMetrics>,
}

impl Measured {
    /// Every limit of `tier` this region crosses, in reporting order.
    fn findings(&self, tier: &ThresholdTier) -> Vec<Finding> {
        let mut found = Vec::new();
        let ExposureMetrics {
            overexposed_pct,
            clipped_highlights_pct,
            underexposed_pct,
        } = self.exposure;

        if overexposed_pct >= tier.overexposed_pct {
            found.push(Finding::Overexposed(overexposed_pct));
        }
        if clipped_highlights_pct >= tier.clipped_highlights_pct {
            found.push(Finding::ClippedHighlights(clipped_highlights_pct));
        }
        if underexposed_pct >= tier.underexposed_pct {
            found.push(Finding::DeepShadows(underexposed_pct));
        }
        if self.contrast.dynamic_range_norm < tier.min_dynamic_range {
            found.push(Finding::LowContrast(self.contrast.dynamic_range_norm));
        }
        if self.sharpness.laplacian_variance < tier.min_sharpness {
            found.push(Finding::LowSharpness(self.sharpness.laplacian_variance));
        }
        if let Some(res) = self.resolution {
            if res.upsample_ratio > tier.max_upsample_ratio {
                found.push(Finding::Upscaled(res.upsample_ratio));
            }
        }
        found
    }

    /// 100 minus capped penalties. Contrast and sharpness penalties start at
    /// the warning limits; resolution penalties at any upscaling.
    fn score(&self, warning: &ThresholdTier) -> u8 {
        let exposure = (self.exposure.overexposed_pct * 2.0
            + self.exposure.clipped_highlights_pct * 3.0
            + self.exposure.underexposed_pct * 1.2)
            .min(EXPOSURE_PENALTY_CAP);

        let range = self.contrast.dynamic_range_norm;
        let contrast = if range < warning.min_dynamic_range {
            ((warning.min_dynamic_range - range) * 100.0).min(CONTRAST_PENALTY_CAP)
        } else {
            0.0
        };

        let variance = self.sharpness.laplacian_variance;
        let sharpness = if variance < warning.min_sharpness {
            ((warning.min_sharpness - variance) / 2.0).min(SHARPNESS_PENALTY_CAP)
        } else {
            0.0
        };

        let resolution = match self.resolution {
            Some(res) if res.upsample_ratio > 1.0 => {
                ((res.upsample_ratio - 1.0) * 30.0).min(RESOLUTION_PENALTY_CAP)
            }
            _ => 0.0,
        };

        let total = 100.0 - (exposure + contrast + sharpness + resolution);
        if total.is_nan() {
            return 0;
        }
        total.clamp(0.0, 100.0).round() as u8
    }
}

enum Finding {
    Overexposed(f64),
    ClippedHighlights(f64),
    DeepShadows(f64),
    LowContrast(f64),
    LowSharpness(f64),
    Upscaled(f64),
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Finding::Overexposed(pct) => write!(f, "High overexposure ({pct:.1}%)"),
            Finding::ClippedHighlights(pct) => write!(f, "Clipped highlights ({pct:.1}%)"),
            Finding::DeepShadows(pct) => write!(f, "Deep shadows ({pct:.1}%)"),
            Finding::LowContrast(range) => write!(f, "Low contrast (range {:.1}%)", range * 100.0),
            Finding::LowSharpness(var) => write!(f, "Low sharpness (edge var {var:.1})"),
            Finding::Upscaled(ratio) => write!(f, "Upscaled crop ({ratio:.2}x)"),
        }
    }
}
