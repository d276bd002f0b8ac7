//! Image quality scoring for carousel slides.
//!
//! This module provides:
//! - [`analyze`]: a deterministic pixel-level verdict (exposure, contrast,
//!   sharpness and upscale risk) for one region
//! - [`QualityOrchestrator`]: debounced, token-guarded scheduling of the
//!   whole-image analysis and the per-crop batch
//!
//! Results are exposed as a [`QualityReport`] keyed by [`CropId`].

mod analyzer;
mod config;
mod orchestrator;
mod sharpness;

pub use analyzer::{analyze, analyze_image, analyze_with, NO_ISSUES_REASON};
pub use config::{OrchestratorConfig, QualityThresholds, ThresholdTier};
pub use orchestrator::{
    BatchJob, ChannelStatus, Completion, CropJob, GlobalJob, QualityOrchestrator,
};
pub use sharpness::laplacian_variance;

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::source::SampleError;
use crate::store::CropId;

/// Errors produced while analyzing a region.
#[derive(Debug, Error, PartialEq)]
pub enum QualityError {
    /// Region has zero width or height
    #[error("Cannot analyze an empty region ({width}x{height})")]
    EmptyRegion { width: u32, height: u32 },

    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    PixelBufferMismatch { expected: usize, actual: usize },

    /// Sampling the source image failed
    #[error("Sampling failed: {0}")]
    Sample(#[from] SampleError),
}

/// Overall verdict for a region, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Ok,
    Warning,
    Critical,
}

/// Share of pixels at the extremes of the tonal range, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureMetrics {
    pub overexposed_pct: f64,
    pub clipped_highlights_pct: f64,
    pub underexposed_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContrastMetrics {
    /// 5th percentile luma
    pub p5: u8,
    /// 95th percentile luma
    pub p95: u8,
    /// `(p95 - p5) / 255`
    pub dynamic_range_norm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharpnessMetrics {
    pub laplacian_variance: f64,
}

/// How far a crop will be stretched when exported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetrics {
    /// Side length of the crop in source pixels.
    pub source_crop_pixels: f64,
    /// `export_size / source_crop_pixels`; above 1 means upscaling.
    pub upsample_ratio: f64,
}

impl ResolutionMetrics {
    pub fn for_crop(source_side: f64, export_size: u32) -> Self {
        Self {
            source_crop_pixels: source_side,
            upsample_ratio: export_size as f64 / source_side,
        }
    }
}

/// Verdict and measurements for one analyzed region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAnalysis {
    pub level: QualityLevel,
    /// 0 (unusable) to 100 (no penalties).
    pub score: u8,
    /// Findings in fixed check order, or the single no-issues sentinel.
    pub reasons: Vec<String>,
    pub exposure: ExposureMetrics,
    pub contrast: ContrastMetrics,
    pub sharpness: SharpnessMetrics,
    /// Present for per-crop analyses only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionMetrics>,
}

impl QualityAnalysis {
    pub fn is_critical(&self) -> bool {
        self.level == QualityLevel::Critical
    }

    /// The first reported reason.
    pub fn primary_reason(&self) -> Option<&str> {
        self.reasons.first().map(String::as_str)
    }
}

/// Latest committed analyses, as seen by presentation and the export gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    /// Whole-image analysis, if one has completed for the current image.
    pub global: Option<QualityAnalysis>,
    /// Per-crop analyses from the latest committed batch.
    pub by_crop: HashMap<CropId, QualityAnalysis>,
    pub is_analyzing: bool,
}

impl QualityReport {
    pub fn get(&self, id: CropId) -> Option<&QualityAnalysis> {
        self.by_crop.get(&id)
    }

    /// Ids of every crop whose latest analysis is critical.
    pub fn critical_ids(&self) -> impl Iterator<Item = CropId> + '_ {
        self.by_crop
            .iter()
            .filter(|(_, analysis)| analysis.is_critical())
            .map(|(id, _)| *id)
    }
}
