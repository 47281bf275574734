//! # Compression Outcome Module
//!
//! Risultato per-file di una compressione e report complessivo del batch.
//!
//! ## Responsabilità:
//! - `CompressionOutcome`: un record immutabile per ogni file elaborato
//! - `OutcomeStatus`: Compressed / Skipped / Failed
//! - `RunStatus` e `BatchReport`: esito dell'intero run

use crate::error::CompressError;
use crate::file_manager::{FileManager, MediaFile, MediaKind};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Status of a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Compressed,
    Skipped,
    Failed,
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn long_side(&self) -> u32 {
        self.width.max(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Result of compressing one media file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionOutcome {
    pub source_path: PathBuf,
    pub kind: MediaKind,
    pub output_path: Option<PathBuf>,
    pub status: OutcomeStatus,
    pub original_size_bytes: u64,
    pub final_size_bytes: Option<u64>,
    pub resolution_before: Option<Resolution>,
    pub resolution_after: Option<Resolution>,
    pub reduction_percent: Option<f64>,
    /// JPEG quality that was kept, images only
    pub quality: Option<u8>,
    pub message: String,
}

impl CompressionOutcome {
    /// Build a `Failed` outcome; the original size is read best-effort.
    pub fn failed(file: &MediaFile, error: &CompressError) -> Self {
        Self {
            source_path: file.path.clone(),
            kind: file.kind,
            output_path: None,
            status: OutcomeStatus::Failed,
            original_size_bytes: FileManager::file_size(&file.path),
            final_size_bytes: None,
            resolution_before: None,
            resolution_after: None,
            reduction_percent: None,
            quality: None,
            message: format!("failed: {} - {}", file.file_name(), error),
        }
    }

    /// Bytes saved, zero unless a smaller output was produced
    pub fn bytes_saved(&self) -> u64 {
        self.final_size_bytes
            .map(|size| self.original_size_bytes.saturating_sub(size))
            .unwrap_or(0)
    }
}

/// How a batch run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    NothingToDo,
    Canceled,
}

/// Everything a batch run produced, in processing order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub status: RunStatus,
    pub outcomes: Vec<CompressionOutcome>,
}
