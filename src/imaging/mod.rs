//! Image encoding on the `image` stack, with libwebp for WebP.
//!
//! | Output | Crate / function |
//! |---|---|
//! | **WebP** | `webp::Encoder` (lossy, libwebp) |
//! | **AVIF** | `image::codecs::avif::AvifEncoder` (rav1e) |
//! | **Optimized PNG** | `PngEncoder` with best compression + adaptive filtering |
//! | **Optimized JPEG** | `JpegEncoder` at the configured quality |
//! | **Optimized SVG** | comment and inter-tag whitespace stripping |
//!
//! The module is split into:
//! - **Parameters**: what to encode ([`EncodeParams`], [`OutputFormat`], [`Quality`])
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use params::{EncodeParams, OutputFormat, Quality};
pub use rust_backend::{RustBackend, is_convertible};
