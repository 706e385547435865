//! Drives compression runs for the current batch and quality.
//!
//! Every change of batch or quality (and every reset) advances the current
//! [`RunId`]. A run launches one task per file, waits for all of them, and only
//! then stores the outcomes, provided it is still the current run. A run
//! overtaken while in flight is reported as [`RunReport::Superseded`] and its
//! outcomes, handles included, are dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use crate::core::{
    CompressionOutcome, CompressorConfig, Download, HandleRegistry, HandleStats,
    OutcomeSummary, Progress, ProgressType, Quality, ResultStore, RunId, SourceFile,
};
use crate::processing::encoder::{ImageEncoder, JpegReencoder};
use crate::processing::filter::filter_selection;
use crate::processing::task::settle_file;
use crate::utils::{CompressorResult, ErrorKind};

/// A user interaction the orchestrator reacts to.
#[derive(Debug, Clone)]
pub enum Command {
    /// Replace the batch with the images of a new selection
    SelectFiles(Vec<SourceFile>),
    /// Change the re-encode quality
    SetQuality(Quality),
    /// Drop the batch and all results
    Reset,
}

/// Where the orchestrator is in its `Idle → Processing → Settled` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "run", rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Processing(RunId),
    Settled(RunId),
}

/// What a dispatched command led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RunReport {
    /// Nothing to process (empty batch or reset)
    Idle,
    /// The command did not change batch or quality
    Unchanged,
    /// The run finished and its outcomes are now current
    Settled { run: RunId, succeeded: usize, failed: usize },
    /// A newer run started before this one finished; its outcomes were dropped
    Superseded { run: RunId },
}

struct Session {
    batch: Vec<SourceFile>,
    quality: Quality,
    current_run: RunId,
    phase: Phase,
    store: ResultStore,
    validation_error: Option<ErrorKind>,
}

/// Puts the session back to `Idle` if a run's future is dropped before it
/// settles. Tasks already on the blocking pool finish, but nothing collects
/// their outcomes.
struct PendingRun<'a> {
    session: &'a Mutex<Session>,
    run: RunId,
    finished: bool,
}

impl Drop for PendingRun<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut session = self.session.lock();
        if session.phase == Phase::Processing(self.run) {
            session.phase = Phase::Idle;
            warn!("Run {} abandoned before settling", self.run);
        }
    }
}

/// Owns the batch, the quality, the settled outcomes and their handles.
///
/// Methods take `&self`; share it behind an `Arc` to dispatch from several
/// tasks. The session lock is never held across an `.await`.
pub struct Orchestrator<E: ImageEncoder = JpegReencoder> {
    encoder: Arc<E>,
    registry: HandleRegistry,
    session: Mutex<Session>,
    progress: broadcast::Sender<Progress>,
}

impl Orchestrator<JpegReencoder> {
    pub fn new(config: &CompressorConfig) -> Self {
        Self::with_encoder(JpegReencoder, config)
    }
}

impl<E: ImageEncoder> Orchestrator<E> {
    pub fn with_encoder(encoder: E, config: &CompressorConfig) -> Self {
        let (progress, _) = broadcast::channel(config.progress_capacity.max(1));
        Self {
            encoder: Arc::new(encoder),
            registry: HandleRegistry::new(),
            session: Mutex::new(Session {
                batch: Vec::new(),
                quality: config.default_quality,
                current_run: RunId::default(),
                phase: Phase::Idle,
                store: ResultStore::default(),
                validation_error: None,
            }),
            progress,
        }
    }

    /// Apply `command` and, if it changed batch or quality, run the pipeline.
    ///
    /// Only a selection without images is an error; per-file failures are
    /// part of the settled outcomes.
    pub async fn dispatch(&self, command: Command) -> CompressorResult<RunReport> {
        match command {
            Command::SelectFiles(files) => self.select_files(files).await,
            Command::SetQuality(quality) => Ok(self.set_quality(quality).await),
            Command::Reset => {
                self.reset();
                Ok(RunReport::Idle)
            }
        }
    }

    /// Filter `files` into a new batch and compress it.
    ///
    /// On a validation error the current batch and results stay as they are.
    pub async fn select_files(&self, files: Vec<SourceFile>) -> CompressorResult<RunReport> {
        let batch = match filter_selection(files) {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Selection rejected: {}", e);
                self.session.lock().validation_error = Some(e.kind());
                return Err(e);
            }
        };

        {
            let mut session = self.session.lock();
            session.validation_error = None;
            session.batch = batch;
        }
        Ok(self.run_current().await)
    }

    /// Change the quality and re-run; a no-op if it is already `quality`.
    pub async fn set_quality(&self, quality: Quality) -> RunReport {
        {
            let mut session = self.session.lock();
            if session.quality == quality {
                return RunReport::Unchanged;
            }
            session.quality = quality;
        }
        self.run_current().await
    }

    /// Run again with the current batch and quality.
    pub async fn rerun(&self) -> RunReport {
        self.run_current().await
    }

    /// Drop the batch, the results and their handles. In-flight runs become stale.
    pub fn reset(&self) {
        let mut session = self.session.lock();
        let released = session.store.success_count();
        session.current_run = session.current_run.next();
        session.batch.clear();
        session.store = ResultStore::default();
        session.validation_error = None;
        session.phase = Phase::Idle;
        info!("Reset: batch cleared, {} handles released", released);
    }

    async fn run_current(&self) -> RunReport {
        let (run, batch, quality) = {
            let mut session = self.session.lock();
            let run = session.current_run.next();
            session.current_run = run;
            // Previous settled handles go before anything new is created.
            session.store = ResultStore::default();
            if session.batch.is_empty() {
                session.phase = Phase::Idle;
                return RunReport::Idle;
            }
            session.phase = Phase::Processing(run);
            (run, session.batch.clone(), session.quality)
        };

        let mut pending = PendingRun {
            session: &self.session,
            run,
            finished: false,
        };

        let total = batch.len();
        info!("Run {} started: {} files at quality {}", run, total, quality);
        self.emit(Progress::new(ProgressType::Start, run, 0, total, "processing"));

        let completed = AtomicUsize::new(0);
        let tasks = batch.iter().map(|file| {
            let encoder = Arc::clone(&self.encoder);
            let completed = &completed;
            async move {
                let outcome = settle_file(encoder, &self.registry, file, quality).await;
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                let error_kind = match &outcome {
                    CompressionOutcome::Failure { kind, .. } => Some(*kind),
                    CompressionOutcome::Success(_) => None,
                };
                self.emit(
                    Progress::new(ProgressType::Progress, run, done, total, "processing")
                        .for_file(file.name(), error_kind),
                );
                (file.name().to_string(), outcome)
            }
        });
        let outcomes = join_all(tasks).await;

        pending.finished = true;
        let mut session = self.session.lock();
        if session.current_run != run {
            drop(session);
            debug!("Run {} superseded, discarding {} outcomes", run, outcomes.len());
            drop(outcomes);
            self.emit(Progress::new(ProgressType::Superseded, run, total, total, "superseded"));
            return RunReport::Superseded { run };
        }

        let store = ResultStore::settled(run, outcomes);
        let succeeded = store.success_count();
        let failed = store.len() - succeeded;
        session.store = store;
        session.phase = Phase::Settled(run);
        drop(session);

        info!("Run {} settled: {} succeeded, {} failed", run, succeeded, failed);
        self.emit(Progress::new(ProgressType::Complete, run, total, total, "complete"));
        RunReport::Settled { run, succeeded, failed }
    }

    fn emit(&self, progress: Progress) {
        // No subscribers is fine.
        let _ = self.progress.send(progress);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Progress> {
        self.progress.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.session.lock().phase
    }

    pub fn quality(&self) -> Quality {
        self.session.lock().quality
    }

    pub fn current_run(&self) -> RunId {
        self.session.lock().current_run
    }

    pub fn batch_names(&self) -> Vec<String> {
        self.session
            .lock()
            .batch
            .iter()
            .map(|f| f.name().to_string())
            .collect()
    }

    /// Kind of the last selection error, cleared by the next valid selection.
    pub fn validation_error(&self) -> Option<ErrorKind> {
        self.session.lock().validation_error
    }

    /// Settled outcomes in batch order. Empty while processing.
    pub fn outcomes(&self) -> Vec<OutcomeSummary> {
        let session = self.session.lock();
        session
            .store
            .summaries(session.batch.iter().map(SourceFile::name))
    }

    /// Encoded bytes for previewing `name`.
    pub fn preview(&self, name: &str) -> Option<Arc<[u8]>> {
        match self.session.lock().store.get(name)? {
            CompressionOutcome::Success(image) => self.registry.resolve(image.handle.id()),
            CompressionOutcome::Failure { .. } => None,
        }
    }

    /// Download artifact for `name`; `None` means the download is disabled.
    pub fn download(&self, name: &str) -> Option<Download> {
        self.session.lock().store.download(name, &self.registry)
    }

    pub fn handle_stats(&self) -> HandleStats {
        self.registry.stats()
    }
}
