//! Slide export WASM bindings.
//!
//! Produces the PNG bytes of each slide; zipping and saving them is left to
//! the JavaScript side.

use crate::editor::JsCropEditor;
use crate::quality::JsQualitySession;
use crate::types::{js_error, JsDecodedImage};
use js_sys::{Array, Object, Reflect, Uint8Array};
use slidecut_core::encode;
use slidecut_core::export::{self, ExportedSlide};
use slidecut_core::geometry::Square;
use wasm_bindgen::prelude::*;

/// Encode RGB pixel data to PNG bytes.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(js_error)
}

/// Render one crop (display coordinates) as a 1080x1080 PNG.
#[wasm_bindgen]
pub fn render_slide_png(
    image: &JsDecodedImage,
    x: f64,
    y: f64,
    size: f64,
    scale_factor: f64,
) -> Result<Vec<u8>, JsValue> {
    let slide = export::render_slide(image.as_decoded(), Square::new(x, y, size), scale_factor)
        .map_err(js_error)?;
    encode::encode_png(&slide.pixels, slide.width, slide.height).map_err(js_error)
}

/// Render every crop of `editor` in export order.
///
/// Returns `{ fileName, order, bytes: Uint8Array }[]`.
#[wasm_bindgen]
pub fn export_slides(
    session: &JsQualitySession,
    editor: &JsCropEditor,
    scale_factor: f64,
) -> Result<Array, JsValue> {
    let image = session
        .image()
        .ok_or_else(|| JsValue::from_str("No image loaded"))?;
    let slides = export::export_slides(image, editor.store().squares(), scale_factor)
        .map_err(js_error)?;

    let out = Array::new();
    for slide in &slides {
        out.push(&slide_object(slide)?);
    }
    Ok(out)
}

fn slide_object(slide: &ExportedSlide) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"fileName".into(), &JsValue::from_str(&slide.file_name))?;
    Reflect::set(&obj, &"order".into(), &JsValue::from_f64(slide.order as f64))?;
    Reflect::set(&obj, &"bytes".into(), &Uint8Array::from(slide.png.as_slice()))?;
    Ok(obj.into())
}
