//! Quality analysis WASM bindings.
//!
//! [`JsQualitySession`] owns the loaded image and the orchestrator. The
//! host calls `set_crops` after every editor change and `poll` from a timer
//! armed with `next_delay_ms`; the debounced batch then runs synchronously
//! inside `poll`.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsQualitySession();
//! session.set_image(decode_image(bytes));
//!
//! function onCropsChanged() {
//!   session.set_crops(editor, image.naturalWidth / displayWidth);
//!   const delay = session.next_delay_ms();
//!   if (delay !== undefined) setTimeout(tick, delay);
//! }
//!
//! function tick() {
//!   if (session.poll()) renderBadges(session.report());
//! }
//! ```

use crate::editor::JsCropEditor;
use crate::types::{js_error, to_js, to_rgb, warn, JsDecodedImage};
use slidecut_core::decode::DecodedImage;
use slidecut_core::export::check_export;
use slidecut_core::quality::{self, Completion, QualityOrchestrator, ResolutionMetrics};
use wasm_bindgen::prelude::*;
use web_time::Instant;

/// Quality analysis for one image and its crops.
#[wasm_bindgen]
pub struct JsQualitySession {
    image: Option<DecodedImage>,
    orchestrator: QualityOrchestrator,
}

impl Default for JsQualitySession {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl JsQualitySession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> JsQualitySession {
        JsQualitySession {
            image: None,
            orchestrator: QualityOrchestrator::default(),
        }
    }

    /// Load a new image and run its whole-image analysis.
    ///
    /// Crops already known to the session are re-analyzed after the
    /// debounce delay.
    pub fn set_image(&mut self, image: &JsDecodedImage) {
        let image = image.as_decoded().clone();
        let size = (image.width, image.height);
        let job = self.orchestrator.set_image(Some(size), Instant::now());
        if let Some(job) = job {
            let result = job.run(&image);
            if self.orchestrator.complete_global(job.token, result) == Completion::Failed {
                warn("Whole-image quality analysis failed");
            }
        }
        self.image = Some(image);
    }

    /// Drop the image and cancel all analysis.
    pub fn clear_image(&mut self) {
        self.image = None;
        self.orchestrator.set_image(None, Instant::now());
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Report the editor's crops. `scale_factor` = natural width / displayed width.
    ///
    /// Returns true if a batch was scheduled.
    pub fn set_crops(&mut self, editor: &JsCropEditor, scale_factor: f64) -> bool {
        self.orchestrator
            .update_crops(editor.store().squares(), scale_factor, Instant::now())
    }

    /// Run the pending batch if its debounce delay has passed.
    ///
    /// Returns true if the report changed.
    pub fn poll(&mut self) -> bool {
        let Some(image) = &self.image else {
            return false;
        };
        match self.orchestrator.run_due(image, Instant::now()) {
            Some(Completion::Committed) => true,
            Some(Completion::Failed) => {
                warn("Crop quality analysis failed");
                true
            }
            Some(Completion::Stale) | None => false,
        }
    }

    /// Milliseconds until the pending batch is due, if one is pending.
    pub fn next_delay_ms(&self) -> Option<f64> {
        self.orchestrator
            .next_deadline()
            .map(|due| due.saturating_duration_since(Instant::now()).as_secs_f64() * 1000.0)
    }

    #[wasm_bindgen(getter)]
    pub fn is_analyzing(&self) -> bool {
        self.orchestrator.is_analyzing()
    }

    /// `{ global, byCrop: { [id]: analysis }, isAnalyzing }`.
    pub fn report(&self) -> Result<JsValue, JsValue> {
        to_js(self.orchestrator.report())
    }

    /// Critical slides that should be confirmed before export.
    pub fn export_check(&self, editor: &JsCropEditor) -> Result<JsValue, JsValue> {
        to_js(&check_export(
            editor.store().squares(),
            self.orchestrator.report(),
        ))
    }

    /// True when at least one slide is critical.
    pub fn needs_export_confirmation(&self, editor: &JsCropEditor) -> bool {
        check_export(editor.store().squares(), self.orchestrator.report()).needs_confirmation()
    }
}

impl JsQualitySession {
    pub(crate) fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }
}

/// Analyze a raw pixel region (RGB or RGBA).
///
/// Pass `upsample_ratio` for a crop that will be exported; omit it for a
/// whole-image check.
#[wasm_bindgen]
pub fn analyze_region(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    upsample_ratio: Option<f64>,
) -> Result<JsValue, JsValue> {
    let pixels = to_rgb(pixels, width, height);
    let resolution = upsample_ratio.map(|ratio| ResolutionMetrics {
        source_crop_pixels: slidecut_core::EXPORT_SIZE as f64 / ratio,
        upsample_ratio: ratio,
    });
    let analysis = quality::analyze(&pixels, width, height, resolution).map_err(js_error)?;
    to_js(&analysis)
}
