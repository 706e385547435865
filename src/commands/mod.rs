//! Command handlers for the front end.
//!
//! - [`compress_paths`]: select files from disk and compress them
//! - [`save_downloads`]: write every successful result to a directory

mod compress;

pub use compress::*;
