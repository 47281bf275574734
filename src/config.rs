//! # Configuration Management Module
//!
//! Questo modulo gestisce le opzioni di compressione di un run.
//!
//! ## Responsabilità:
//! - Definisce la struct `CompressionOptions` con tutti i parametri
//! - Valida i parametri una sola volta all'inizio del batch
//! - Supporta caricamento/salvataggio da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `target_size_kb`: Dimensione obiettivo delle immagini in KB (default: 300)
//! - `max_image_dimension_px`: Lato lungo massimo delle immagini (default: 2000)
//! - `max_video_height_px`: Altezza massima dei video (default: 1080)
//! - `recurse_subdirectories`: Include le sottocartelle (default: true)
//! - `output_prefix`: Prefisso dei file compressi (default: "compressed_")
//! - `video_codec` / `video_crf` / `video_preset`: Encoder video (libx264, 28, fast)
//! - `audio_codec` / `audio_bitrate`: Encoder audio (aac, 128k)
//! - `skip_existing_outputs`: Esclude dalla scansione i file che hanno già il prefisso
//!
//! ## Validazione:
//! - Dimensione obiettivo e risoluzioni devono essere > 0
//! - Il prefisso non può essere vuoto né contenere separatori di path
//! - Il CRF deve essere tra 0 e 51
//!
//! Nessuno stato viene persistito tra un run e l'altro: il file JSON è solo
//! un modo comodo per passare le opzioni.
//!
//! ## Esempio:
//! ```rust,ignore
//! let options = CompressionOptions {
//!     target_size_kb: 500,
//!     max_image_dimension_px: 2560,
//!     ..Default::default()
//! };
//! options.validate()?;
//! ```

use crate::error::CompressError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for a single compression run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionOptions {
    /// Target size for compressed images, in kilobytes
    pub target_size_kb: u32,
    /// Cap on the longer side of an image, in pixels
    pub max_image_dimension_px: u32,
    /// Cap on the height of a video, in pixels
    pub max_video_height_px: u32,
    /// Walk subdirectories instead of listing only direct children
    pub recurse_subdirectories: bool,
    /// Prepended to every output filename
    pub output_prefix: String,
    /// Video encoder passed to ffmpeg `-vcodec`
    pub video_codec: String,
    /// Constant rate factor (0-51, lower = better quality)
    pub video_crf: u8,
    /// Encoder speed preset
    pub video_preset: String,
    /// Audio encoder passed to ffmpeg `-acodec`
    pub audio_codec: String,
    /// Audio bitrate passed to ffmpeg `-b:a`
    pub audio_bitrate: String,
    /// Leave out files whose name already starts with `output_prefix`
    pub skip_existing_outputs: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            target_size_kb: 300,
            max_image_dimension_px: 2000,
            max_video_height_px: 1080,
            recurse_subdirectories: true,
            output_prefix: "compressed_".to_string(),
            video_codec: "libx264".to_string(),
            video_crf: 28,
            video_preset: "fast".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            skip_existing_outputs: false,
        }
    }
}

impl CompressionOptions {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), CompressError> {
        if self.target_size_kb == 0 {
            return Err(CompressError::Config("target size must be a positive number of KB".to_string()));
        }

        if self.max_image_dimension_px == 0 {
            return Err(CompressError::Config("max image dimension must be a positive number of pixels".to_string()));
        }

        if self.max_video_height_px == 0 {
            return Err(CompressError::Config("max video height must be a positive number of pixels".to_string()));
        }

        if self.output_prefix.is_empty() {
            return Err(CompressError::Config("output prefix must not be empty".to_string()));
        }

        if self.output_prefix.contains(['/', '\\']) {
            return Err(CompressError::Config(format!(
                "output prefix must not contain path separators: {:?}",
                self.output_prefix
            )));
        }

        if self.video_crf > 51 {
            return Err(CompressError::Config("video CRF must be between 0 and 51".to_string()));
        }

        for (name, value) in [
            ("video codec", &self.video_codec),
            ("video preset", &self.video_preset),
            ("audio codec", &self.audio_codec),
            ("audio bitrate", &self.audio_bitrate),
        ] {
            if value.trim().is_empty() {
                return Err(CompressError::Config(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }

    /// Target size in bytes
    pub fn target_size_bytes(&self) -> u64 {
        u64::from(self.target_size_kb) * 1024
    }

    /// Load configuration from file, falling back to defaults if it does not exist
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let options: CompressionOptions = serde_json::from_str(&content)?;
        options.validate()?;
        Ok(options)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
