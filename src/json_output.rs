//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per chi integra il CLI
//! in un'altra applicazione (una GUI, uno script).
//!
//! ## Responsabilità:
//! - Emette un oggetto JSON per riga su stdout
//! - Converte gli eventi del batch e gli outcome in messaggi
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del run con le opzioni effettive
//! - `log`: Riga di log del batch
//! - `progress`: Frazione completata
//! - `file_complete`: Fine elaborazione di un file
//! - `complete`: Fine del run con statistiche finali
//! - `error`: Errore fatale

use crate::config::CompressionOptions;
use crate::file_manager::MediaKind;
use crate::optimizer::progress_tracker::BatchEvent;
use crate::outcome::{CompressionOutcome, OutcomeStatus, Resolution, RunStatus};
use crate::progress::BatchStats;
use serde::Serialize;
use std::path::PathBuf;

/// Tipo di messaggio JSON
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum JsonMessage {
    /// Inizio del run
    #[serde(rename = "start")]
    Start {
        input_dir: PathBuf,
        options: CompressionOptions,
    },

    #[serde(rename = "log")]
    Log { message: String },

    #[serde(rename = "progress")]
    Progress { fraction: f64, percentage: f64 },

    /// Fine elaborazione di un file specifico
    #[serde(rename = "file_complete")]
    FileComplete {
        path: PathBuf,
        kind: MediaKind,
        status: OutcomeStatus,
        output_path: Option<PathBuf>,
        original_size: u64,
        final_size: Option<u64>,
        reduction_percent: Option<f64>,
        resolution_before: Option<Resolution>,
        resolution_after: Option<Resolution>,
        quality: Option<u8>,
        message: String,
    },

    /// Run terminato
    #[serde(rename = "complete")]
    Complete {
        status: RunStatus,
        files_processed: usize,
        files_compressed: usize,
        files_skipped: usize,
        errors: usize,
        total_bytes_saved: u64,
        average_reduction: f64,
        duration_seconds: f64,
    },

    /// Errore fatale
    #[serde(rename = "error")]
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(input_dir: PathBuf, options: &CompressionOptions) -> Self {
        Self::Start {
            input_dir,
            options: options.clone(),
        }
    }

    pub fn file_complete(outcome: &CompressionOutcome) -> Self {
        Self::FileComplete {
            path: outcome.source_path.clone(),
            kind: outcome.kind,
            status: outcome.status,
            output_path: outcome.output_path.clone(),
            original_size: outcome.original_size_bytes,
            final_size: outcome.final_size_bytes,
            reduction_percent: outcome.reduction_percent,
            resolution_before: outcome.resolution_before,
            resolution_after: outcome.resolution_after,
            quality: outcome.quality,
            message: outcome.message.clone(),
        }
    }

    pub fn complete(status: RunStatus, stats: &BatchStats, duration_seconds: f64) -> Self {
        Self::Complete {
            status,
            files_processed: stats.files_processed,
            files_compressed: stats.files_compressed,
            files_skipped: stats.files_skipped,
            errors: stats.errors,
            total_bytes_saved: stats.total_bytes_saved,
            average_reduction: stats.overall_reduction_percent(),
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

impl From<&BatchEvent> for JsonMessage {
    fn from(event: &BatchEvent) -> Self {
        match event {
            BatchEvent::Progress(fraction) => Self::Progress {
                fraction: *fraction,
                percentage: fraction * 100.0,
            },
            BatchEvent::Log(message) => Self::Log { message: message.clone() },
            BatchEvent::Outcome(outcome) => Self::file_complete(outcome),
        }
    }
}
