// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{CompressorConfig, OutcomeSummary, Quality, SourceFile};
pub use processing::{Command, Orchestrator, Phase, RunReport};
pub use utils::{CompressorError, CompressorResult, ErrorKind};
pub use commands::*;
