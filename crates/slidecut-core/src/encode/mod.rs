//! Image encoding for Slidecut.
//!
//! Exported slides are written as PNG. Encoding is synchronous and
//! single-threaded so it can run inside a Web Worker via WASM bindings.

mod png;

pub use png::{encode_png, EncodeError, PNG_SIGNATURE};
