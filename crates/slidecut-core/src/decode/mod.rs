//! Image decoding for Slidecut.
//!
//! This module provides functionality for:
//! - Decoding JPEG and PNG source images with EXIF orientation applied
//! - The [`DecodedImage`] pixel container every other module reads from
//!
//! # Architecture
//!
//! Decoding is designed to be used from the main thread or a Web Worker via
//! WASM bindings. All operations are synchronous and single-threaded.

mod file;
mod types;

pub use file::{decode_image, get_orientation};
pub use types::{DecodeError, DecodedImage, Orientation};
