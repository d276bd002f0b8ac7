//! Slidecut WASM - WebAssembly bindings for Slidecut
//!
//! This crate exposes the slidecut-core crop editor, quality analysis and
//! slide export to a JavaScript/TypeScript front end.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types and conversion helpers
//! - `decode` - Image decoding bindings (JPEG, PNG, EXIF orientation)
//! - `editor` - Crop store and pointer interaction bindings
//! - `quality` - Debounced quality analysis session
//! - `export` - Slide rendering and PNG encoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, JsCropEditor, JsQualitySession } from '@slidecut/wasm';
//!
//! await init();
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const editor = new JsCropEditor(displayWidth, displayHeight);
//! const session = new JsQualitySession();
//! session.set_image(image);
//! editor.auto_fill(3);
//! session.set_crops(editor, image.width / displayWidth);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod editor;
mod export;
mod quality;
mod types;

// Re-export public types
pub use decode::{decode_image, image_orientation};
pub use editor::JsCropEditor;
pub use export::{encode_png, export_slides, render_slide_png};
pub use quality::{analyze_region, JsQualitySession};
pub use types::JsDecodedImage;

/// Called automatically when the module loads.
#[wasm_bindgen(start)]
pub fn init() {
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "slidecut-wasm loaded");
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Side length in pixels of exported slides.
#[wasm_bindgen]
pub fn export_size() -> u32 {
    slidecut_core::EXPORT_SIZE
}
