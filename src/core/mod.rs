//! Core types and state shared by the compression pipeline.
//!
//! - [`SourceFile`]: a selected file and its declared media type
//! - [`Quality`]: the re-encode quality parameter
//! - [`HandleRegistry`] / [`TransientHandle`]: owned references to encoded bytes
//! - [`ResultStore`]: settled outcomes keyed by file name
//! - [`Progress`]: progress events for a run
//! - [`CompressorConfig`]: defaults loaded from JSON

mod config;
mod handle;
mod progress;
mod store;
mod types;

pub use config::CompressorConfig;
pub use handle::{HandleId, HandleRegistry, HandleStats, TransientHandle};
pub use progress::{Progress, ProgressType};
pub use store::{CompressedImage, CompressionOutcome, OutcomeSummary, ResultStore};
pub use types::{Download, FileSource, Quality, RunId, SourceFile};
