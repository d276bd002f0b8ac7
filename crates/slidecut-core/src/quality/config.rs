//! Tunable thresholds and scheduling parameters for quality analysis.

use serde::{Deserialize, Serialize};

use crate::EXPORT_SIZE;

/// One tier of pass/fail limits. A metric "trips" the tier when it crosses
/// the corresponding limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdTier {
    /// Trips when overexposed percentage is at or above this.
    pub overexposed_pct: f64,
    /// Trips when clipped-highlight percentage is at or above this.
    pub clipped_highlights_pct: f64,
    /// Trips when underexposed percentage is at or above this.
    pub underexposed_pct: f64,
    /// Trips when normalized dynamic range is strictly below this.
    pub min_dynamic_range: f64,
    /// Trips when Laplacian variance is strictly below this.
    pub min_sharpness: f64,
    /// Trips when the upsample ratio is strictly above this.
    pub max_upsample_ratio: f64,
}

impl ThresholdTier {
    pub const WARNING: Self = Self {
        overexposed_pct: 4.0,
        clipped_highlights_pct: 2.0,
        underexposed_pct: 6.0,
        min_dynamic_range: 0.3,
        min_sharpness: 120.0,
        max_upsample_ratio: 1.15,
    };

    pub const CRITICAL: Self = Self {
        overexposed_pct: 12.0,
        clipped_highlights_pct: 6.0,
        underexposed_pct: 15.0,
        min_dynamic_range: 0.2,
        min_sharpness: 70.0,
        max_upsample_ratio: 1.4,
    };
}

/// Warning and critical limits used to level an analysis.
///
/// The warning tier also sets where score penalties for contrast and
/// sharpness start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub warning: ThresholdTier,
    pub critical: ThresholdTier,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            warning: ThresholdTier::WARNING,
            critical: ThresholdTier::CRITICAL,
        }
    }
}

/// Scheduling and sampling parameters for the quality orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrchestratorConfig {
    /// Quiet period after the last crop change before a batch runs.
    pub debounce_ms: u64,
    /// Long-side limit for the whole-image analysis sample.
    pub global_max_side: u32,
    /// Side length of the square buffer each crop is sampled into.
    pub crop_sample_size: u32,
    /// Side length of an exported slide, used for the upsample ratio.
    pub export_size: u32,
    pub thresholds: QualityThresholds,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            global_max_side: 1024,
            crop_sample_size: 256,
            export_size: EXPORT_SIZE,
            thresholds: QualityThresholds::default(),
        }
    }
}
