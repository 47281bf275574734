//! # Error Types Module
//!
//! Questo modulo definisce la tassonomia degli errori della libreria.
//!
//! ## Categorie di errori:
//! - `NotADirectory`: La root da scansionare non esiste o non è una directory (fatale)
//! - `Config`: Opzioni di compressione non valide (fatale, prima di ogni file)
//! - `Decode`: Immagine corrotta o formato non decodificabile (per-file)
//! - `ToolMissing`: Tool esterno mancante, es. ffmpeg (per-file)
//! - `Encode`: Errore dell'encoder JPEG o di ffmpeg (per-file)
//! - `Io`: Errori di I/O (permessi, file spariti, disco pieno) (per-file)
//! - `Unexpected`: Tutto il resto (per-file)
//!
//! ## Propagazione:
//! - Gli errori fatali escono da `BatchController::run` prima di elaborare file
//! - Gli errori per-file vengono convertiti in un outcome `Failed` dal processore
//!   che li ha generati e non interrompono mai il batch
//!
//! ## Esempio:
//! ```rust,ignore
//! if runner.locate("ffmpeg").is_none() {
//!     return Err(CompressError::ToolMissing("ffmpeg".to_string()));
//! }
//! ```

use std::path::PathBuf;

/// Errors produced while scanning or compressing media
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("{0} is not installed or not on PATH")]
    ToolMissing(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl CompressError {
    /// Fatal errors abort the whole run; everything else becomes a `Failed` outcome.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotADirectory(_) | Self::Config(_))
    }
}

impl From<image::ImageError> for CompressError {
    fn from(err: image::ImageError) -> Self {
        use image::ImageError;

        match err {
            ImageError::IoError(e) => Self::Io(e),
            ImageError::Decoding(_) | ImageError::Unsupported(_) => Self::Decode(err.to_string()),
            ImageError::Encoding(_) => Self::Encode(err.to_string()),
            other => Self::Unexpected(other.to_string()),
        }
    }
}
