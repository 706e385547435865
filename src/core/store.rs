//! Compression outcomes and the store that holds the settled set.

use std::collections::HashMap;
use serde::Serialize;
use tracing::warn;
use crate::core::handle::{HandleRegistry, TransientHandle};
use crate::core::types::{Download, RunId};
use crate::utils::{CompressorError, CompressorResult, ErrorKind, JPEG_MEDIA_TYPE, compressed_file_name};

/// A successfully re-encoded image.
#[derive(Debug)]
pub struct CompressedImage {
    /// Size of the source file in bytes
    pub original_size: u64,
    /// Size of the encoded JPEG in bytes
    pub byte_size: u64,
    /// Handle to the encoded bytes, used for preview and download
    pub handle: TransientHandle,
}

impl CompressedImage {
    /// Bytes saved (negative if the file grew)
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.byte_size as i64
    }

    /// Saved bytes as a percentage of the original size
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size > 0 {
            self.saved_bytes() as f64 / self.original_size as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// Terminal result of one compression task.
#[derive(Debug)]
pub enum CompressionOutcome {
    Success(CompressedImage),
    Failure { kind: ErrorKind, message: String },
}

impl CompressionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn failure(err: CompressorError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: err.failure_message(),
        }
    }
}

impl From<CompressorResult<CompressedImage>> for CompressionOutcome {
    fn from(result: CompressorResult<CompressedImage>) -> Self {
        match result {
            Ok(image) => Self::Success(image),
            Err(e) => Self::failure(e),
        }
    }
}

/// Serializable view of one outcome, for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeSummary {
    /// Name of the source file
    pub file_name: String,
    /// Whether compression succeeded
    pub success: bool,
    /// Original file size in bytes, when known
    pub original_size: Option<u64>,
    /// Compressed size in bytes
    pub compressed_size: Option<u64>,
    /// Bytes saved (can be negative if file grew)
    pub saved_bytes: Option<i64>,
    /// Compression ratio as a percentage
    pub compression_ratio: Option<f64>,
    /// Handle URL for previewing the compressed image
    pub preview_url: Option<String>,
    /// Name of the downloadable artifact; `None` disables the download
    pub download_name: Option<String>,
    /// Kind of the failure
    pub error_kind: Option<ErrorKind>,
    /// Error message if compression failed
    pub error: Option<String>,
}

impl OutcomeSummary {
    fn new(file_name: &str, outcome: &CompressionOutcome) -> Self {
        match outcome {
            CompressionOutcome::Success(image) => Self {
                file_name: file_name.to_string(),
                success: true,
                original_size: Some(image.original_size),
                compressed_size: Some(image.byte_size),
                saved_bytes: Some(image.saved_bytes()),
                compression_ratio: Some(image.compression_ratio()),
                preview_url: Some(image.handle.id().to_string()),
                download_name: Some(compressed_file_name(file_name)),
                error_kind: None,
                error: None,
            },
            CompressionOutcome::Failure { kind, message } => Self {
                file_name: file_name.to_string(),
                success: false,
                original_size: None,
                compressed_size: None,
                saved_bytes: None,
                compression_ratio: None,
                preview_url: None,
                download_name: None,
                error_kind: Some(*kind),
                error: Some(message.clone()),
            },
        }
    }
}

/// Outcomes of one settled run, keyed by file name.
///
/// Dropping or replacing the store releases every handle it holds.
#[derive(Debug, Default)]
pub struct ResultStore {
    outcomes: HashMap<String, CompressionOutcome>,
}

impl ResultStore {
    /// Build the store for `run`. A later outcome for a name already present
    /// replaces the earlier one, whose handle is released.
    pub fn settled(run: RunId, outcomes: impl IntoIterator<Item = (String, CompressionOutcome)>) -> Self {
        let mut map = HashMap::new();
        for (name, outcome) in outcomes {
            if let Some(replaced) = map.insert(name, outcome) {
                warn!("Duplicate file name in run {}, replacing earlier outcome", run);
                drop(replaced);
            }
        }
        Self { outcomes: map }
    }

    pub fn get(&self, name: &str) -> Option<&CompressionOutcome> {
        self.outcomes.get(name)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    /// Summaries in `order`, skipping names without an outcome.
    pub fn summaries<'a>(&self, order: impl IntoIterator<Item = &'a str>) -> Vec<OutcomeSummary> {
        order
            .into_iter()
            .filter_map(|name| self.get(name).map(|o| OutcomeSummary::new(name, o)))
            .collect()
    }

    /// Download for `name`, or `None` when it has no successful outcome.
    pub fn download(&self, name: &str, registry: &HandleRegistry) -> Option<Download> {
        match self.get(name)? {
            CompressionOutcome::Success(image) => Some(Download {
                file_name: compressed_file_name(name),
                content_type: JPEG_MEDIA_TYPE,
                bytes: registry.resolve(image.handle.id())?,
            }),
            CompressionOutcome::Failure { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(registry: &HandleRegistry, original: u64, bytes: Vec<u8>) -> CompressionOutcome {
        CompressionOutcome::Success(CompressedImage {
            original_size: original,
            byte_size: bytes.len() as u64,
            handle: registry.create(bytes),
        })
    }

    #[test]
    fn error_becomes_failure_with_kind() {
        let outcome = CompressionOutcome::failure(CompressorError::decode("x.jpg", "bad magic"));
        match outcome {
            CompressionOutcome::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::DecodeFailure);
                assert!(message.contains("bad magic"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn summaries_follow_requested_order() {
        let registry = HandleRegistry::new();
        let store = ResultStore::settled(RunId::default(), [
            ("b.png".to_string(), success(&registry, 100, vec![0; 50])),
            ("a.jpg".to_string(), CompressionOutcome::failure(CompressorError::encode(""))),
        ]);
        let summaries = store.summaries(["a.jpg", "b.png", "missing.png"]);
        assert_eq!(summaries.len(), 2);

        assert!(!summaries[0].success);
        assert_eq!(summaries[0].error_kind, Some(ErrorKind::EncodeFailure));
        assert_eq!(summaries[0].download_name, None);

        assert!(summaries[1].success);
        assert_eq!(summaries[1].saved_bytes, Some(50));
        assert_eq!(summaries[1].compression_ratio, Some(50.0));
        assert_eq!(summaries[1].download_name.as_deref(), Some("b_compressed.jpg"));
    }

    #[test]
    fn download_only_for_success() {
        let registry = HandleRegistry::new();
        let store = ResultStore::settled(RunId::default(), [
            ("ok.png".to_string(), success(&registry, 10, vec![7; 5])),
            ("bad.png".to_string(), CompressionOutcome::failure(CompressorError::encode("nope"))),
        ]);
        let download = store.download("ok.png", &registry).unwrap();
        assert_eq!(download.file_name, "ok_compressed.jpg");
        assert_eq!(download.content_type, "image/jpeg");
        assert_eq!(&*download.bytes, &[7; 5]);
        assert!(store.download("bad.png", &registry).is_none());
        assert!(store.download("other.png", &registry).is_none());
    }

    #[test]
    fn duplicate_names_keep_one_outcome_and_release_the_other() {
        let registry = HandleRegistry::new();
        let store = ResultStore::settled(RunId::default(), [
            ("same.png".to_string(), success(&registry, 10, vec![1])),
            ("same.png".to_string(), success(&registry, 10, vec![2, 2])),
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(registry.stats().live, 1);
        assert_eq!(&*store.download("same.png", &registry).unwrap().bytes, &[2, 2]);
    }

    #[test]
    fn dropping_the_store_releases_handles() {
        let registry = HandleRegistry::new();
        let store = ResultStore::settled(RunId::default(), [
            ("a.png".to_string(), success(&registry, 10, vec![1])),
            ("b.png".to_string(), success(&registry, 10, vec![2])),
        ]);
        assert_eq!(registry.stats().live, 2);
        drop(store);
        assert_eq!(registry.stats().live, 0);
        assert_eq!(registry.stats().released, 2);
    }
}
