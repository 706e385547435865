//! One compression task: read → decode/encode → register a handle.

use std::sync::Arc;
use tracing::{debug, warn};
use crate::core::{CompressedImage, CompressionOutcome, HandleRegistry, Quality, SourceFile};
use crate::processing::encoder::ImageEncoder;
use crate::utils::{CompressorError, CompressorResult};

/// Compress one file at `quality`.
///
/// Reading is async; decode and encode run on tokio's blocking pool so the
/// runtime is never blocked. Tasks share no mutable state and may run
/// concurrently.
pub async fn compress_file<E: ImageEncoder>(
    encoder: Arc<E>,
    registry: &HandleRegistry,
    file: &SourceFile,
    quality: Quality,
) -> CompressorResult<CompressedImage> {
    let bytes = file.read().await?;
    let original_size = bytes.len() as u64;

    let name = file.name().to_string();
    let encoded = tokio::task::spawn_blocking(move || encoder.encode(&name, &bytes, quality))
        .await
        .map_err(|e| CompressorError::encode(format!("Task panicked: {e}")))??;

    let byte_size = encoded.len() as u64;
    debug!(
        "'{}' → {} bytes at quality {} ({} bytes before)",
        file.name(), byte_size, quality, original_size
    );

    Ok(CompressedImage {
        original_size,
        byte_size,
        handle: registry.create(encoded),
    })
}

/// Run [`compress_file`] and fold any error into a failure outcome.
pub async fn settle_file<E: ImageEncoder>(
    encoder: Arc<E>,
    registry: &HandleRegistry,
    file: &SourceFile,
    quality: Quality,
) -> CompressionOutcome {
    let result = compress_file(encoder, registry, file, quality).await;
    if let Err(e) = &result {
        warn!("Compression failed for {}: {}", file.name(), e);
    }
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::encoder::JpegReencoder;
    use crate::processing::encoder::tests::sample_png;
    use crate::utils::ErrorKind;

    struct PanickingEncoder;

    impl ImageEncoder for PanickingEncoder {
        fn encode(&self, _: &str, _: &[u8], _: Quality) -> CompressorResult<Vec<u8>> {
            panic!("codec bug");
        }
    }

    struct EmptyEncoder;

    impl ImageEncoder for EmptyEncoder {
        fn encode(&self, _: &str, _: &[u8], _: Quality) -> CompressorResult<Vec<u8>> {
            Err(CompressorError::encode(""))
        }
    }

    #[tokio::test]
    async fn success_registers_a_handle() {
        let registry = HandleRegistry::new();
        let file = SourceFile::from_bytes("photo.png", "image/png", sample_png(64, 64));
        let image = compress_file(Arc::new(JpegReencoder), &registry, &file, Quality::DEFAULT)
            .await
            .unwrap();

        assert!(image.byte_size > 0);
        let stored = registry.resolve(image.handle.id()).unwrap();
        assert_eq!(stored.len() as u64, image.byte_size);
    }

    #[tokio::test]
    async fn unreadable_path_is_a_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let registry = HandleRegistry::new();
        let file = SourceFile::from_path(dir.path().join("vanished.png"));
        let outcome = settle_file(Arc::new(JpegReencoder), &registry, &file, Quality::DEFAULT).await;

        assert!(matches!(outcome, CompressionOutcome::Failure { kind: ErrorKind::ReadFailure, .. }));
        assert_eq!(registry.stats().created, 0);
    }

    #[tokio::test]
    async fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("disk.png");
        std::fs::write(&path, sample_png(32, 32)).unwrap();

        let registry = HandleRegistry::new();
        let outcome = settle_file(
            Arc::new(JpegReencoder),
            &registry,
            &SourceFile::from_path(&path),
            Quality::DEFAULT,
        )
        .await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn panic_becomes_encode_failure() {
        let registry = HandleRegistry::new();
        let file = SourceFile::from_bytes("a.png", "image/png", vec![1u8]);
        let outcome = settle_file(Arc::new(PanickingEncoder), &registry, &file, Quality::DEFAULT).await;

        match outcome {
            CompressionOutcome::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::EncodeFailure);
                assert!(message.contains("panicked"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_error_uses_generic_message() {
        let registry = HandleRegistry::new();
        let file = SourceFile::from_bytes("a.png", "image/png", vec![1u8]);
        let outcome = settle_file(Arc::new(EmptyEncoder), &registry, &file, Quality::DEFAULT).await;

        match outcome {
            CompressionOutcome::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::EncodeFailure);
                assert_eq!(message, crate::utils::GENERIC_FAILURE_MESSAGE);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
