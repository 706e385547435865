use tracing::debug;
use crate::core::SourceFile;
use crate::utils::{ACCEPTED_MEDIA_TYPES, CompressorError, CompressorResult};

/// Hard cap on files per batch. Extra files are dropped without error.
pub const MAX_BATCH_SIZE: usize = 5;

/// Keep the image entries of a raw selection, at most [`MAX_BATCH_SIZE`] of
/// them, in their original order.
///
/// A non-empty selection without any image is a validation error. An empty
/// selection yields an empty batch.
pub fn filter_selection(files: Vec<SourceFile>) -> CompressorResult<Vec<SourceFile>> {
    let raw_count = files.len();
    let mut images: Vec<SourceFile> = files.into_iter().filter(SourceFile::is_image).collect();

    if raw_count > 0 && images.is_empty() {
        return Err(CompressorError::NoImagesSelected);
    }

    for file in images.iter().filter(|f| !ACCEPTED_MEDIA_TYPES.contains(&f.media_type())) {
        debug!("{} has unadvertised type {}, accepted as image", file.name(), file.media_type());
    }

    if images.len() > MAX_BATCH_SIZE {
        debug!("Dropping {} images over the batch limit", images.len() - MAX_BATCH_SIZE);
        images.truncate(MAX_BATCH_SIZE);
    }

    debug!("Selection of {} files kept {} images", raw_count, images.len());
    Ok(images)
}
