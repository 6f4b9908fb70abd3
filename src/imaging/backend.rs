//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait has a single operation: turn a source file
//! into the bytes of one derived output. Writing those bytes is the images
//! task's job, so backends never touch the destination tree.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend).

use super::params::EncodeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Encode `params.source` into the requested output format.
    fn encode(&self, params: &EncodeParams) -> Result<Vec<u8>, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::{OutputFormat, Quality};
    use std::sync::Mutex;

    /// Mock backend that records operations and returns placeholder bytes.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Sources whose encode should fail.
        pub failing: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedOp {
        pub source: String,
        pub format: OutputFormat,
        pub quality: u32,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(source_suffix: &str) -> Self {
            Self {
                failing: vec![source_suffix.to_string()],
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            let mut ops = self.operations.lock().unwrap().clone();
            // rayon completes files in any order
            ops.sort_by(|a, b| {
                (a.source.as_str(), format!("{:?}", a.format))
                    .cmp(&(b.source.as_str(), format!("{:?}", b.format)))
            });
            ops
        }
    }

    impl ImageBackend for MockBackend {
        fn encode(&self, params: &EncodeParams) -> Result<Vec<u8>, BackendError> {
            let source = params.source.to_string_lossy().to_string();
            if self.failing.iter().any(|s| source.ends_with(s.as_str())) {
                return Err(BackendError::ProcessingFailed(format!(
                    "cannot decode {source}"
                )));
            }
            self.operations.lock().unwrap().push(RecordedOp {
                source: source.clone(),
                format: params.format,
                quality: params.quality.value(),
            });
            Ok(format!("{:?}:{}", params.format, source).into_bytes())
        }
    }

    #[test]
    fn mock_records_encode() {
        let backend = MockBackend::new();
        let bytes = backend
            .encode(&EncodeParams {
                source: "/src/a.png".into(),
                format: OutputFormat::WebP,
                quality: Quality::new(75),
            })
            .unwrap();

        assert_eq!(bytes, b"WebP:/src/a.png");
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp {
                format: OutputFormat::WebP,
                quality: 75,
                ..
            }
        ));
    }

    #[test]
    fn mock_fails_on_configured_source() {
        let backend = MockBackend::failing_on("broken.png");
        let result = backend.encode(&EncodeParams {
            source: "/src/broken.png".into(),
            format: OutputFormat::Optimized,
            quality: Quality::default(),
        });
        assert!(result.is_err());
        assert!(backend.get_operations().is_empty());
    }
}
