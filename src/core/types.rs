//! Core types for source files, quality and run identity.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::utils::{
    CompressorError, CompressorResult, extract_filename, is_image_media_type,
    media_type_from_path, read_bytes,
};

/// Where the bytes of a [`SourceFile`] come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// Already in memory
    Memory(Arc<[u8]>),
    /// Read lazily when the compression task runs
    Path(PathBuf),
}

/// A selected file: a name, a declared media type and its bytes.
///
/// The name is the key of the file within the current batch. Cloning is cheap;
/// in-memory bytes are shared.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    media_type: String,
    source: FileSource,
}

impl SourceFile {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            source: FileSource::Memory(bytes.into()),
        }
    }

    /// A file on disk, named after its last path component, with the media
    /// type guessed from its extension. Nothing is read yet.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let display = path.to_string_lossy();
        Self {
            name: extract_filename(&display).to_string(),
            media_type: media_type_from_path(path).to_string(),
            source: FileSource::Path(path.to_path_buf()),
        }
    }

    /// The same file under another name. Bytes and media type are unchanged.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Whether the declared media type is `image/*`. The content is not checked.
    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }

    /// Load the file's bytes.
    pub async fn read(&self) -> CompressorResult<Arc<[u8]>> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(Arc::clone(bytes)),
            FileSource::Path(path) => read_bytes(path, &self.name).await.map(Arc::from),
        }
    }
}

/// JPEG re-encode quality, a value in (0, 1].
///
/// The user-facing control is a slider over [`Quality::MIN`]..=[`Quality::MAX`]
/// in steps of [`Quality::STEP`]; see [`Quality::from_slider`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Quality(f32);

impl Quality {
    pub const MIN: f32 = 0.10;
    pub const MAX: f32 = 1.00;
    pub const STEP: f32 = 0.05;
    pub const DEFAULT: Quality = Quality(0.80);

    pub fn new(value: f32) -> CompressorResult<Self> {
        if value.is_finite() && value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(CompressorError::Quality(value))
        }
    }

    /// Snap a slider value to the 0.05 grid and clamp it to [0.10, 1.00].
    pub fn from_slider(value: f32) -> Self {
        if !value.is_finite() {
            return Self::DEFAULT;
        }
        let steps_per_unit = (1.0 / Self::STEP).round();
        let min_steps = (Self::MIN * steps_per_unit).round();
        let steps = (value * steps_per_unit).round().clamp(min_steps, steps_per_unit);
        Self(steps / steps_per_unit)
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    /// Quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.0 * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for Quality {
    type Error = CompressorError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quality> for f32 {
    fn from(q: Quality) -> Self {
        q.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Tag of one processing pass. Advances on every batch, quality or reset change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunId(u64);

impl RunId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A downloadable artifact for one successfully compressed file.
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Arc<[u8]>,
}
