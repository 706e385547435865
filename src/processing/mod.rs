mod encoder;
mod filter;
mod orchestrator;
mod task;

pub use encoder::{ImageEncoder, JpegReencoder};
pub use filter::{MAX_BATCH_SIZE, filter_selection};
pub use orchestrator::{Command, Orchestrator, Phase, RunReport};
pub use task::{compress_file, settle_file};
