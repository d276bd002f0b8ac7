//! WASM-compatible wrapper types and conversion helpers.
//!
//! Rich results (crop lists, quality reports) cross the boundary as plain JS
//! objects through `serde-wasm-bindgen`; pixel buffers stay in WASM memory
//! inside [`JsDecodedImage`] until JavaScript asks for a copy.

use serde::Serialize;
use slidecut_core::decode::DecodedImage;
use slidecut_core::store::CropId;
use wasm_bindgen::prelude::*;

/// A decoded image wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsDecodedImage {
    inner: DecodedImage,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create an image from dimensions and RGB pixel data (3 bytes per pixel).
    ///
    /// RGBA data (4 bytes per pixel, as produced by `ImageData`) is accepted
    /// too; the alpha channel is dropped.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            inner: DecodedImage {
                width,
                height,
                pixels: to_rgb(pixels, width, height),
            },
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 3 for RGB)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self { inner: img }
    }

    pub(crate) fn as_decoded(&self) -> &DecodedImage {
        &self.inner
    }
}

/// Strip alpha from an RGBA buffer; RGB (or malformed) buffers pass through.
pub(crate) fn to_rgb(pixels: Vec<u8>, width: u32, height: u32) -> Vec<u8> {
    let count = (width as usize) * (height as usize);
    if count > 0 && pixels.len() == count * 4 {
        pixels
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    } else {
        pixels
    }
}

/// Parse a crop id handed back from JavaScript. Malformed ids yield `None`.
pub(crate) fn parse_id(id: &str) -> Option<CropId> {
    id.parse().ok()
}

/// Serialize a value into a plain JS object (maps become objects).
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert any error into a JS string value.
pub(crate) fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Surface a recoverable failure to the developer console.
pub(crate) fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    tracing::warn!("{message}");
}
