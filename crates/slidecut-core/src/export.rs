//! Slide export primitive and the critical-quality gate.
//!
//! Crops live in display coordinates; export maps them into source pixels
//! with the display scale factor, samples each into a square slide and
//! encodes it as PNG. Packaging the files (ZIP, downloads) is left to the
//! host.

use serde::Serialize;
use thiserror::Error;

use crate::decode::DecodedImage;
use crate::encode::{encode_png, EncodeError};
use crate::geometry::Square;
use crate::quality::QualityReport;
use crate::source::{ImageSource, SampleError, SourceRegion};
use crate::store::{CropId, CropSquare};
use crate::EXPORT_SIZE;

/// Errors that can occur while exporting slides.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to sample slide {order}: {source}")]
    Sample { order: usize, source: SampleError },

    #[error("Failed to encode slide {order}: {source}")]
    Encode { order: usize, source: EncodeError },
}

/// One encoded slide ready to be packaged.
#[derive(Debug, Clone)]
pub struct ExportedSlide {
    pub order: usize,
    pub file_name: String,
    pub png: Vec<u8>,
}

/// Map a display-space square to source pixels.
pub fn source_region(square: Square, scale_factor: f64) -> SourceRegion {
    let size = square.size * scale_factor;
    SourceRegion::new(square.x * scale_factor, square.y * scale_factor, size, size)
}

/// File name of the slide at export position `order`.
pub fn slide_file_name(order: usize) -> String {
    format!("{order}.png")
}

/// Sample one crop into an `EXPORT_SIZE` x `EXPORT_SIZE` slide.
pub fn render_slide<S: ImageSource + ?Sized>(
    source: &S,
    square: Square,
    scale_factor: f64,
) -> Result<DecodedImage, SampleError> {
    render_slide_at(source, square, scale_factor, EXPORT_SIZE)
}

/// Sample one crop into a `size` x `size` slide.
pub fn render_slide_at<S: ImageSource + ?Sized>(
    source: &S,
    square: Square,
    scale_factor: f64,
    size: u32,
) -> Result<DecodedImage, SampleError> {
    source.sample(source_region(square, scale_factor), size, size)
}

/// Render and encode every crop, in export order.
pub fn export_slides<S: ImageSource + ?Sized>(
    source: &S,
    squares: &[CropSquare],
    scale_factor: f64,
) -> Result<Vec<ExportedSlide>, ExportError> {
    export_slides_at(source, squares, scale_factor, EXPORT_SIZE)
}

/// [`export_slides`] with an explicit slide size.
pub fn export_slides_at<S: ImageSource + ?Sized>(
    source: &S,
    squares: &[CropSquare],
    scale_factor: f64,
    size: u32,
) -> Result<Vec<ExportedSlide>, ExportError> {
    let mut ordered: Vec<&CropSquare> = squares.iter().collect();
    ordered.sort_by_key(|sq| sq.order);

    ordered
        .into_iter()
        .map(|sq| {
            let order = sq.order;
            let slide = render_slide_at(source, sq.square(), scale_factor, size)
                .map_err(|source| ExportError::Sample { order, source })?;
            let png = encode_png(&slide.pixels, slide.width, slide.height)
                .map_err(|source| ExportError::Encode { order, source })?;
            tracing::debug!(order, bytes = png.len(), "Encoded slide");
            Ok(ExportedSlide {
                order,
                file_name: slide_file_name(order),
                png,
            })
        })
        .collect()
}

/// A slide whose latest analysis is critical.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalSlide {
    pub id: CropId,
    pub order: usize,
    pub score: u8,
    /// First reported reason.
    pub reason: String,
}

/// Outcome of checking the crop list against the quality report before export.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportCheck {
    /// Critical slides, in export order.
    pub critical: Vec<CriticalSlide>,
}

impl ExportCheck {
    /// True when the user should confirm before exporting.
    pub fn needs_confirmation(&self) -> bool {
        !self.critical.is_empty()
    }
}

/// List every crop whose analysis in `report` is critical.
///
/// Crops without an analysis yet are not flagged.
pub fn check_export(squares: &[CropSquare], report: &QualityReport) -> ExportCheck {
    let mut critical: Vec<CriticalSlide> = squares
        .iter()
        .filter_map(|sq| {
            let analysis = report.get(sq.id).filter(|a| a.is_critical())?;
            Some(CriticalSlide {
                id: sq.id,
                order: sq.order,
                score: analysis.score,
                reason: analysis.primary_reason().unwrap_or_default().to_string(),
            })
        })
        .collect();
    critical.sort_by_key(|slide| slide.order);
    ExportCheck { critical }
}
