//! Slidecut Core - carousel slicing library
//!
//! This crate carves one wide image into an ordered set of square slides and
//! judges whether each slide will hold up at export resolution. It covers
//! crop geometry, the undoable crop store, pointer-driven drag/resize,
//! quality scoring and its debounced scheduling, plus the decode, sampling
//! and export primitives they rest on.

pub mod decode;
pub mod encode;
pub mod export;
pub mod geometry;
pub mod histogram;
pub mod interaction;
pub mod luminance;
pub mod quality;
pub mod source;
pub mod store;

pub use decode::{decode_image, DecodeError, DecodedImage};
pub use export::{check_export, export_slides, render_slide, ExportCheck, ExportError};
pub use geometry::{apply_snap, Bounds, Point, Square, MIN_SIZE, SNAP_THRESHOLD};
pub use interaction::{Corner, InteractionController, InteractionState};
pub use quality::{
    analyze, QualityAnalysis, QualityError, QualityLevel, QualityOrchestrator, QualityReport,
};
pub use source::{ImageSource, SampleError, SourceRegion};
pub use store::{CropId, CropPatch, CropSquare, CropStore};

/// Side length in pixels of every exported slide.
pub const EXPORT_SIZE: u32 = 1080;
