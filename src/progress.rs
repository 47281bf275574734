//! # Progress Display and Statistics Module
//!
//! Questo modulo gestisce la progress bar del CLI e le statistiche finali.
//!
//! ## Responsabilità:
//! - Progress bar visuale con `indicatif`, guidata dalle frazioni del batch
//! - Stampa dei messaggi di log sopra la barra senza romperla
//! - Statistiche aggregate calcolate dagli outcome (compressi, saltati, errori)
//! - Report finale con byte risparmiati e riduzione complessiva
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:02:15] [========================>---------------] 62% holiday.jpg: 2.1MB → 0.3MB (-85.7%)
//! ```
//!
//! ## Esempio:
//! ```rust,ignore
//! let progress = ProgressManager::new();
//! progress.log("Found 12 images and 2 videos");
//! progress.set_fraction(0.5);
//! let stats = BatchStats::from_outcomes(&report.outcomes);
//! progress.finish(&stats.format_summary());
//! ```

use crate::file_manager::FileManager;
use crate::outcome::{CompressionOutcome, OutcomeStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Bar resolution; fractions are mapped onto `0..=PROGRESS_SCALE`
const PROGRESS_SCALE: u64 = 1000;

/// Manages the terminal progress bar
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        let bar = ProgressBar::new(PROGRESS_SCALE);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Hidden bar, for non-interactive output
    pub fn hidden() -> Self {
        Self { bar: ProgressBar::hidden() }
    }

    /// Move the bar to `fraction` of the run
    pub fn set_fraction(&self, fraction: f64) {
        let position = (fraction.clamp(0.0, 1.0) * PROGRESS_SCALE as f64).round() as u64;
        self.bar.set_position(position);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Print a log line above the bar and show it as the current message
    pub fn log(&self, message: &str) {
        self.bar.println(message);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Stop the bar where it is
    pub fn abandon(&self, message: &str) {
        self.bar.abandon_with_message(message.to_string());
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate statistics over a batch's outcomes
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchStats {
    pub files_processed: usize,
    pub files_compressed: usize,
    pub files_skipped: usize,
    pub errors: usize,
    pub total_original_size: u64,
    pub total_final_size: u64,
    pub total_bytes_saved: u64,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outcomes(outcomes: &[CompressionOutcome]) -> Self {
        let mut stats = Self::new();
        for outcome in outcomes {
            stats.add(outcome);
        }
        stats
    }

    pub fn add(&mut self, outcome: &CompressionOutcome) {
        self.files_processed += 1;
        match outcome.status {
            OutcomeStatus::Compressed => self.files_compressed += 1,
            OutcomeStatus::Skipped => self.files_skipped += 1,
            OutcomeStatus::Failed => {
                self.errors += 1;
                return;
            }
        }

        self.total_original_size += outcome.original_size_bytes;
        self.total_final_size += outcome.final_size_bytes.unwrap_or(outcome.original_size_bytes);
        self.total_bytes_saved += outcome.bytes_saved();
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        if self.total_original_size > 0 {
            (self.total_bytes_saved as f64 / self.total_original_size as f64) * 100.0
        } else {
            0.0
        }
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Processed: {} files | Compressed: {} | Skipped: {} | Errors: {} | Total saved: {} ({:.2}%)",
            self.files_processed,
            self.files_compressed,
            self.files_skipped,
            self.errors,
            FileManager::format_size(self.total_bytes_saved),
            self.overall_reduction_percent()
        )
    }
}
