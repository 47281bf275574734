//! # Batch Controller
//!
//! Orchestratore del run: valida le opzioni, scansiona la directory e passa i file
//! uno alla volta ai processori, prima tutte le immagini e poi tutti i video.
//!
//! ## Garanzie:
//! - Un `CompressionOutcome` per ogni file trovato (salvo cancellazione)
//! - Un file fallito non interrompe mai il batch
//! - Solo opzioni non valide o root non leggibile abortiscono il run
//! - La cancellazione viene controllata tra un file e l'altro, mai durante un encode
//!
//! ## Esempio:
//! ```rust,ignore
//! let (stop_sender, stop_receiver) = broadcast::channel(1);
//! let mut controller = BatchController::new(options, Arc::new(SystemRunner::new()))
//!     .with_cancellation(stop_receiver);
//! let mut events: Vec<BatchEvent> = Vec::new();
//! let report = controller.run(Path::new("/photos"), &mut events)?;
//! ```

use crate::{
    config::CompressionOptions,
    error::CompressError,
    file_manager::{FileManager, MediaFile, MediaKind},
    optimizer::{
        progress_tracker::{ProgressTracker, Reporter},
        task_optimizer::TaskOptimizer,
    },
    outcome::{BatchReport, RunStatus},
    platform::ProcessRunner,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Runs a whole folder through the compressors
pub struct BatchController {
    options: CompressionOptions,
    runner: Arc<dyn ProcessRunner>,
    stop_receiver: Option<broadcast::Receiver<()>>,
}

impl BatchController {
    pub fn new(options: CompressionOptions, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            options,
            runner,
            stop_receiver: None,
        }
    }

    /// Stop between files once a message arrives on `stop_receiver`
    pub fn with_cancellation(mut self, stop_receiver: broadcast::Receiver<()>) -> Self {
        self.stop_receiver = Some(stop_receiver);
        self
    }

    /// Checks if a stop signal has been received.
    fn should_stop(&mut self) -> bool {
        if let Some(ref mut receiver) = self.stop_receiver {
            match receiver.try_recv() {
                Ok(_) => return true,
                Err(broadcast::error::TryRecvError::Empty) => return false,
                // Signal was sent but we missed it, treat as stop
                Err(broadcast::error::TryRecvError::Lagged(_)) => return true,
                // Sender was dropped, keep going
                Err(broadcast::error::TryRecvError::Closed) => return false,
            }
        }
        false
    }

    /// Compress every supported file under `root`.
    ///
    /// Returns an error only for invalid options or an unreadable root.
    pub fn run(&mut self, root: &Path, reporter: &mut dyn Reporter) -> Result<BatchReport, CompressError> {
        self.options.validate()?;

        let exclude_prefix = self
            .options
            .skip_existing_outputs
            .then_some(self.options.output_prefix.as_str());
        let files = FileManager::scan_filtered(root, self.options.recurse_subdirectories, exclude_prefix)?;

        if files.is_empty() {
            info!("No media files found in {}", root.display());
            reporter.on_log("No media files to process");
            return Ok(BatchReport {
                status: RunStatus::NothingToDo,
                outcomes: Vec::new(),
            });
        }

        let (images, videos): (Vec<MediaFile>, Vec<MediaFile>) =
            files.into_iter().partition(|f| f.kind == MediaKind::Image);
        let total = images.len() + videos.len();

        info!("📁 Found {} images and {} videos", images.len(), videos.len());
        reporter.on_log(&format!("Found {} images and {} videos", images.len(), videos.len()));

        let task = TaskOptimizer::new(self.options.clone(), self.runner.clone());
        let mut tracker = ProgressTracker::new(total);
        let mut outcomes = Vec::with_capacity(total);

        for (label, section) in [("images", &images), ("videos", &videos)] {
            if section.is_empty() {
                continue;
            }

            reporter.on_log(&format!("Compressing {} {}...", section.len(), label));
            if section.iter().any(MediaFile::is_heif) {
                reporter.on_log("HEIC/HEIF files found: this build has no HEIC decoder, they will be reported as failed");
            }

            for file in section.iter() {
                if self.should_stop() {
                    info!("🛑 Canceled after {} of {} files", tracker.processed(), total);
                    reporter.on_log("Canceled");
                    return Ok(BatchReport {
                        status: RunStatus::Canceled,
                        outcomes,
                    });
                }

                let outcome = task.process(file);
                debug!("{}", outcome.message);

                reporter.on_outcome(&outcome);
                reporter.on_log(&outcome.message);
                reporter.on_progress(tracker.advance());
                outcomes.push(outcome);
            }
        }

        info!("✅ Processed {} files", outcomes.len());
        Ok(BatchReport {
            status: RunStatus::Completed,
            outcomes,
        })
    }
}
