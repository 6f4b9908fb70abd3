//! Parameter types for image operations.
//!
//! These structs describe *what* to produce, not *how*. The images task
//! decides which outputs a source needs; the [`backend`](super::backend)
//! does the pixel work. Swapping the backend (e.g. for a mock in tests)
//! leaves the task logic untouched.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

/// Which derived file to produce from a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    WebP,
    Avif,
    /// Same format as the source, re-compressed.
    Optimized,
}

impl OutputFormat {
    /// Extension of the derived file, or `None` to keep the source's.
    pub fn extension(self) -> Option<&'static str> {
        match self {
            OutputFormat::WebP => Some("webp"),
            OutputFormat::Avif => Some("avif"),
            OutputFormat::Optimized => None,
        }
    }
}

/// Full specification for one encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub format: OutputFormat,
    pub quality: Quality,
}
