//! Command handlers used by the CLI front end.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use crate::core::{OutcomeSummary, Quality, SourceFile};
use crate::processing::{Command, ImageEncoder, Orchestrator};
use crate::utils::{CompressorResult, write_file};

/// Turn paths into a selection. Nothing is read until the tasks run.
///
/// Files are named after their last path component. A name already taken by
/// an earlier path gets a ` (n)` suffix before its extension, so
/// `a/photo.png` and `b/photo.png` become `photo.png` and `photo (2).png`.
pub fn select_paths(paths: &[PathBuf]) -> Vec<SourceFile> {
    let mut taken = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let file = SourceFile::from_path(path);
            if taken.insert(file.name().to_string()) {
                return file;
            }
            let name = unique_name(file.name(), &taken);
            warn!("{} shares its name with an earlier file, selected as {}", path.display(), name);
            taken.insert(name.clone());
            file.with_name(name)
        })
        .collect()
}

fn unique_name(name: &str, taken: &HashSet<String>) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Compresses the images among `paths` at `quality`.
///
/// The quality is applied before the selection so the batch is processed once.
///
/// # Returns
/// One summary per file of the effective batch, in selection order.
pub async fn compress_paths<E: ImageEncoder>(
    orchestrator: &Orchestrator<E>,
    paths: &[PathBuf],
    quality: Quality,
) -> CompressorResult<Vec<OutcomeSummary>> {
    debug!("Received compress command for {} paths", paths.len());
    orchestrator.dispatch(Command::SetQuality(quality)).await?;
    orchestrator.dispatch(Command::SelectFiles(select_paths(paths))).await?;
    Ok(orchestrator.outcomes())
}

/// Writes the download artifact of every successful outcome into `dir`.
///
/// # Returns
/// Paths of the written files. Files without a successful outcome are skipped.
pub async fn save_downloads<E: ImageEncoder>(
    orchestrator: &Orchestrator<E>,
    dir: impl AsRef<Path>,
) -> CompressorResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for name in orchestrator.batch_names() {
        let Some(download) = orchestrator.download(&name) else {
            debug!("No download for {}", name);
            continue;
        };
        let path = write_file(dir.as_ref(), &download.file_name, &download.bytes).await?;
        debug!("Saved {} ({} bytes)", path.display(), download.bytes.len());
        written.push(path);
    }
    Ok(written)
}
