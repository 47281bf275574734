//! # Media Compressor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Opzioni di compressione e validazione
//! - `error`: Tassonomia degli errori (fatali e per-file)
//! - `file_manager`: Discovery e classificazione dei file media
//! - `image_processor`: Compressione immagini verso una dimensione obiettivo
//! - `video_processor`: Ricodifica video con ffmpeg
//! - `optimizer`: Batch, worker in background e reporting
//! - `outcome`: Risultati per-file e report del run
//! - `platform` / `tool_resolver`: Esecuzione e ricerca dei tool esterni
//! - `progress` / `json_output`: Presentazione per il CLI
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use media_compressor::{BatchController, CompressionOptions, SystemRunner};
//!
//! let mut controller = BatchController::new(CompressionOptions::default(), Arc::new(SystemRunner::new()));
//! let mut events = Vec::new();
//! let report = controller.run(&path, &mut events)?;
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod json_output;
pub mod optimizer;
pub mod outcome;
pub mod platform;
pub mod progress;
pub mod tool_resolver;
pub mod video_processor;

#[cfg(test)]
mod test_support;

pub use config::CompressionOptions;
pub use error::CompressError;
pub use file_manager::{FileManager, MediaFile, MediaKind};
pub use optimizer::{spawn_batch, BatchController, BatchEvent, Reporter};
pub use outcome::{BatchReport, CompressionOutcome, OutcomeStatus, Resolution, RunStatus};
pub use platform::{ProcessRunner, SystemRunner};
