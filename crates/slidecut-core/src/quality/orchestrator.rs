//! Debounced, cancellable scheduling of quality analysis.
//!
//! The orchestrator never runs analysis itself. It hands out jobs stamped
//! with a generation token; the host runs them on whatever executor it has
//! and reports back through [`QualityOrchestrator::complete_global`] or
//! [`QualityOrchestrator::complete_batch`]. A completion whose token is no
//! longer current is discarded, so a superseded pass can never overwrite a
//! newer report.
//!
//! Two channels are tracked independently:
//!
//! - **global**: the whole image, re-run whenever the image changes
//! - **batch**: every crop, re-run when the crop list or scale changes,
//!   after a quiet period so a drag collapses into one pass

use std::collections::HashMap;

use serde::Serialize;
use web_time::{Duration, Instant};

use super::{
    analyze_image, OrchestratorConfig, QualityAnalysis, QualityError, QualityReport,
    QualityThresholds, ResolutionMetrics,
};
use crate::export::source_region;
use crate::geometry::Square;
use crate::source::{sample_downscaled, ImageSource, SourceRegion};
use crate::store::{CropId, CropSquare};

/// Lifecycle of one analysis channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    #[default]
    Idle,
    Running,
    Succeeded,
    Cancelled,
    Failed,
}

/// What happened to a reported result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Result became part of the report.
    Committed,
    /// Analysis failed; the channel stopped and the error was logged.
    Failed,
    /// A newer request superseded this one; the result was dropped.
    Stale,
}

/// Whole-image analysis request.
#[derive(Debug, Clone)]
pub struct GlobalJob {
    pub token: u64,
    max_side: u32,
    thresholds: QualityThresholds,
}

impl GlobalJob {
    /// Downsample the source and analyze it.
    pub fn run<S: ImageSource + ?Sized>(&self, source: &S) -> Result<QualityAnalysis, QualityError> {
        let sample = sample_downscaled(source, self.max_side)?;
        analyze_image(&sample, None, &self.thresholds)
    }
}

/// Analysis request for a single crop.
#[derive(Debug, Clone)]
pub struct CropJob {
    pub id: CropId,
    /// Crop rectangle in source pixels.
    pub region: SourceRegion,
    sample_size: u32,
    export_size: u32,
    thresholds: QualityThresholds,
}

impl CropJob {
    pub fn run<S: ImageSource + ?Sized>(&self, source: &S) -> Result<QualityAnalysis, QualityError> {
        let sample = source.sample(self.region, self.sample_size, self.sample_size)?;
        let resolution = ResolutionMetrics::for_crop(self.region.width, self.export_size);
        analyze_image(&sample, Some(resolution), &self.thresholds)
    }
}

/// Per-crop analysis pass. Crops are independent and may run in any order.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub token: u64,
    pub crops: Vec<CropJob>,
}

impl BatchJob {
    /// Run every crop sequentially. The first failure fails the batch.
    pub fn run<S: ImageSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<HashMap<CropId, QualityAnalysis>, QualityError> {
        self.crops
            .iter()
            .map(|job| job.run(source).map(|analysis| (job.id, analysis)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingBatch {
    due: Instant,
    token: u64,
}

/// Keeps the [`QualityReport`] in step with the image and crop list.
#[derive(Debug)]
pub struct QualityOrchestrator {
    config: OrchestratorConfig,
    image_size: Option<(u32, u32)>,
    crops: Vec<(CropId, Square)>,
    scale: f64,
    global_token: u64,
    batch_token: u64,
    pending: Option<PendingBatch>,
    global_status: ChannelStatus,
    batch_status: ChannelStatus,
    report: QualityReport,
}

impl Default for QualityOrchestrator {
    fn default() -> Self {
        Self::new(OrchestratorConfig::default())
    }
}

impl QualityOrchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config,
            image_size: None,
            crops: Vec::new(),
            scale: 1.0,
            global_token: 0,
            batch_token: 0,
            pending: None,
            global_status: ChannelStatus::Idle,
            batch_status: ChannelStatus::Idle,
            report: QualityReport::default(),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn report(&self) -> &QualityReport {
        &self.report
    }

    pub fn is_analyzing(&self) -> bool {
        self.report.is_analyzing
    }

    pub fn global_status(&self) -> ChannelStatus {
        self.global_status
    }

    pub fn batch_status(&self) -> ChannelStatus {
        self.batch_status
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.image_size
    }

    /// When the pending batch becomes due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// A new image was loaded (`Some`) or the image was removed (`None`).
    ///
    /// Either way the report is reset and every in-flight result becomes
    /// stale. For a new image the returned job should be run and reported
    /// through [`complete_global`](Self::complete_global); crops already
    /// known are rescheduled against it.
    pub fn set_image(&mut self, size: Option<(u32, u32)>, now: Instant) -> Option<GlobalJob> {
        self.global_token += 1;
        self.batch_token += 1;
        self.pending = None;
        self.report.global = None;
        self.report.by_crop.clear();
        self.image_size = size;

        let job = match size {
            None => {
                tracing::debug!("Image removed, cancelling quality analysis");
                self.global_status = cancelled_if_running(self.global_status);
                self.batch_status = cancelled_if_running(self.batch_status);
                None
            }
            Some((width, height)) => {
                tracing::debug!(
                    width,
                    height,
                    token = self.global_token,
                    "Scheduling global analysis"
                );
                self.global_status = ChannelStatus::Running;
                if self.crops.is_empty() {
                    self.batch_status = cancelled_if_running(self.batch_status);
                } else {
                    self.schedule_batch(now);
                }
                Some(GlobalJob {
                    token: self.global_token,
                    max_side: self.config.global_max_side,
                    thresholds: self.config.thresholds,
                })
            }
        };
        self.sync_flag();
        job
    }

    /// The crop list or display-to-source scale changed.
    ///
    /// Restarts the debounce window. An empty list clears per-crop results
    /// immediately. Returns true if a batch is now pending.
    pub fn update_crops(&mut self, crops: &[CropSquare], scale: f64, now: Instant) -> bool {
        let inputs: Vec<(CropId, Square)> = crops.iter().map(|c| (c.id, c.square())).collect();
        if inputs == self.crops && scale == self.scale {
            return false;
        }
        self.crops = inputs;
        self.scale = scale;

        if self.image_size.is_none() {
            return false;
        }

        if self.crops.is_empty() {
            self.batch_token += 1;
            self.pending = None;
            self.report.by_crop.clear();
            self.batch_status = cancelled_if_running(self.batch_status);
            self.sync_flag();
            tracing::debug!("Crop list empty, cleared per-crop analysis");
            return false;
        }

        self.schedule_batch(now);
        self.sync_flag();
        true
    }

    /// Release the pending batch once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<BatchJob> {
        let pending = self.pending?;
        if now < pending.due {
            return None;
        }
        self.pending = None;

        let crops = self
            .crops
            .iter()
            .map(|(id, square)| CropJob {
                id: *id,
                region: source_region(*square, self.scale),
                sample_size: self.config.crop_sample_size,
                export_size: self.config.export_size,
                thresholds: self.config.thresholds,
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            token = pending.token,
            crops = crops.len(),
            "Releasing crop analysis batch"
        );
        Some(BatchJob {
            token: pending.token,
            crops,
        })
    }

    /// Report the outcome of a [`GlobalJob`].
    ///
    /// On failure the global analysis is cleared.
    pub fn complete_global(
        &mut self,
        token: u64,
        result: Result<QualityAnalysis, QualityError>,
    ) -> Completion {
        if token != self.global_token || self.image_size.is_none() {
            tracing::debug!(token, current = self.global_token, "Discarding stale global analysis");
            return Completion::Stale;
        }

        let completion = match result {
            Ok(analysis) => {
                tracing::debug!(token, score = analysis.score, "Committed global analysis");
                self.report.global = Some(analysis);
                self.global_status = ChannelStatus::Succeeded;
                Completion::Committed
            }
            Err(e) => {
                tracing::warn!(token, error = %e, "Global quality analysis failed");
                self.report.global = None;
                self.global_status = ChannelStatus::Failed;
                Completion::Failed
            }
        };
        self.sync_flag();
        completion
    }

    /// Report the outcome of a [`BatchJob`].
    ///
    /// A successful batch replaces the per-crop map wholesale. On failure
    /// the previous map is kept.
    pub fn complete_batch(
        &mut self,
        token: u64,
        result: Result<HashMap<CropId, QualityAnalysis>, QualityError>,
    ) -> Completion {
        if token != self.batch_token || self.pending.is_some() {
            tracing::debug!(token, current = self.batch_token, "Discarding stale crop analysis");
            return Completion::Stale;
        }

        let completion = match result {
            Ok(by_crop) => {
                tracing::debug!(token, crops = by_crop.len(), "Committed crop analysis batch");
                self.report.by_crop = by_crop;
                self.batch_status = ChannelStatus::Succeeded;
                Completion::Committed
            }
            Err(e) => {
                tracing::warn!(token, error = %e, "Crop quality analysis failed");
                self.batch_status = ChannelStatus::Failed;
                Completion::Failed
            }
        };
        self.sync_flag();
        completion
    }

    /// Run and commit the pending batch if it is due.
    pub fn run_due<S: ImageSource + ?Sized>(
        &mut self,
        source: &S,
        now: Instant,
    ) -> Option<Completion> {
        let job = self.poll(now)?;
        let result = job.run(source);
        Some(self.complete_batch(job.token, result))
    }

    fn schedule_batch(&mut self, now: Instant) {
        self.batch_token += 1;
        let due = now + Duration::from_millis(self.config.debounce_ms);
        self.pending = Some(PendingBatch {
            due,
            token: self.batch_token,
        });
        self.batch_status = ChannelStatus::Running;
        tracing::debug!(
            token = self.batch_token,
            crops = self.crops.len(),
            "Scheduled crop analysis batch"
        );
    }

    fn sync_flag(&mut self) {
        self.report.is_analyzing = self.global_status == ChannelStatus::Running
            || self.batch_status == ChannelStatus::Running;
    }
}

fn cancelled_if_running(status: ChannelStatus) -> ChannelStatus {
    match status {
        ChannelStatus::Running => ChannelStatus::Cancelled,
        other => other,
    }
}
