//! # Image Processing Module
//!
//! Questo modulo comprime le immagini verso una dimensione obiettivo in KB,
//! interamente in memoria con il crate `image`.
//!
//! ## Pipeline di compressione
//!
//! 1. **Decodifica**: formato rilevato dal contenuto, con fallback sull'estensione.
//!    HEIC/HEIF non sono decodificabili in questa build (errore per-file).
//! 2. **Resize**: se il lato lungo supera `max_image_dimension_px`, entrambi i lati
//!    vengono scalati dello stesso fattore (arrotondamento al pixel, minimo 1) con
//!    filtro Lanczos3.
//! 3. **Normalizzazione colore**: i canali alpha vengono appiattiti su sfondo bianco;
//!    tutto diventa RGB a 8 bit.
//! 4. **Ricerca qualità**: JPEG a qualità 85, 80, ..., 10 finché la dimensione è entro
//!    il 10% sopra l'obiettivo. Al massimo 16 tentativi; se nessuno basta si tiene
//!    l'encoding a qualità 10.
//! 5. **Scrittura atomica**: i byte finali vanno in un file temporaneo nella stessa
//!    directory, poi rinominato sul path di output.
//!
//! ## Politica di report
//!
//! | Originale ≤ obiettivo | Ridimensionata | Stato        | Riduzione % |
//! |-----------------------|----------------|--------------|-------------|
//! | sì                    | no             | `Skipped`    | no          |
//! | sì                    | sì             | `Compressed` | no          |
//! | no                    | -              | `Compressed` | sì          |
//!
//! L'output viene scritto in tutti e tre i casi.
//!
//! ## Esempio
//!
//! ```rust,ignore
//! let processor = ImageProcessor::new(CompressionOptions::default());
//! let outcome = processor.compress(&media_file);
//! println!("{}", outcome.message);
//! ```

use crate::config::CompressionOptions;
use crate::error::CompressError;
use crate::file_manager::{FileManager, MediaFile};
use crate::optimizer::path_resolver::PathResolver;
use crate::outcome::{CompressionOutcome, OutcomeStatus, Resolution};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use std::fs::Permissions;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// First quality tried by the size search
pub const START_QUALITY: u8 = 85;
/// Last quality tried; its encoding is kept if nothing smaller fits
pub const MIN_QUALITY: u8 = 10;
/// Quality decrement between attempts
pub const QUALITY_STEP: u8 = 5;
/// Accepted overshoot of the target size
pub const SIZE_TOLERANCE: f64 = 1.1;

/// Result of the quality search
#[derive(Debug, Clone, PartialEq)]
pub struct QualitySearch {
    pub quality: u8,
    pub bytes: Vec<u8>,
    pub attempts: u32,
}

/// Walk the quality ladder until an encoding fits within the tolerance.
///
/// `encode` is called once per attempt with the quality to use.
pub fn search_quality<E, F>(mut encode: F, target_size_kb: u32) -> Result<QualitySearch, E>
where
    F: FnMut(u8) -> Result<Vec<u8>, E>,
{
    let limit_kb = f64::from(target_size_kb) * SIZE_TOLERANCE;
    let mut quality = START_QUALITY;
    let mut attempts = 0;

    loop {
        let bytes = encode(quality)?;
        attempts += 1;

        let size_kb = bytes.len() as f64 / 1024.0;
        debug!("JPEG quality {}: {:.1}KB (limit {:.1}KB)", quality, size_kb, limit_kb);

        if size_kb <= limit_kb || quality <= MIN_QUALITY {
            return Ok(QualitySearch { quality, bytes, attempts });
        }
        quality -= QUALITY_STEP;
    }
}

/// Dimensions after capping the longer side at `max_dimension`, aspect ratio kept
pub fn target_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dimension {
        return (width, height);
    }

    let ratio = f64::from(max_dimension) / f64::from(longest);
    let scale = |side: u32| ((f64::from(side) * ratio).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Convert to 8-bit RGB, compositing any alpha channel over white
pub fn flatten_to_rgb(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return match img {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        };
    }

    let rgba = img.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, CompressError> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.encode_image(rgb)?;
    Ok(buffer)
}

/// Write via a temp file in the same directory, then rename over `output_path`.
/// The temp file is created owner-only, so `permissions` are applied before the rename.
fn write_atomic(output_path: &Path, bytes: &[u8], permissions: Permissions) -> Result<(), CompressError> {
    let dir = output_path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(bytes)?;
    temp_file.flush()?;
    temp_file.as_file().set_permissions(permissions)?;
    temp_file.persist(output_path).map_err(|e| CompressError::Io(e.error))?;
    Ok(())
}

fn kb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0
}

/// Compresses still images towards a target size
pub struct ImageProcessor {
    options: CompressionOptions,
}

impl ImageProcessor {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }

    /// Compress one image. Never fails: errors become a `Failed` outcome.
    pub fn compress(&self, file: &MediaFile) -> CompressionOutcome {
        match self.try_compress(file) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Image compression failed for {}: {}", file.path.display(), e);
                CompressionOutcome::failed(file, &e)
            }
        }
    }

    fn try_compress(&self, file: &MediaFile) -> Result<CompressionOutcome, CompressError> {
        let name = file.file_name();

        if file.is_heif() {
            return Err(CompressError::Decode(
                "HEIC/HEIF codec is not available in this build".to_string(),
            ));
        }

        let metadata = std::fs::metadata(&file.path)?;
        let original_size = metadata.len();
        let img = image::io::Reader::open(&file.path)?
            .with_guessed_format()?
            .decode()?;

        let before = Resolution::new(img.width(), img.height());
        let (width, height) = target_dimensions(before.width, before.height, self.options.max_image_dimension_px);
        let resized = (width, height) != (before.width, before.height);

        let img = if resized {
            debug!("Resizing {} from {} to {}x{}", name, before, width, height);
            img.resize_exact(width, height, FilterType::Lanczos3)
        } else {
            img
        };
        let after = Resolution::new(img.width(), img.height());
        let rgb = flatten_to_rgb(img);

        let search = search_quality(|quality| encode_jpeg(&rgb, quality), self.options.target_size_kb)?;
        debug!(
            "{}: kept quality {} after {} attempt(s)",
            name, search.quality, search.attempts
        );

        let output_path = PathResolver::image_output_path(&file.path, &self.options.output_prefix)?;
        write_atomic(&output_path, &search.bytes, metadata.permissions())?;
        let final_size = search.bytes.len() as u64;

        let within_target = original_size <= self.options.target_size_bytes();
        let resolution_note = if resized {
            format!(" [{}→{}]", before, after)
        } else {
            String::new()
        };

        let (status, reduction_percent, message) = if within_target && !resized {
            (
                OutcomeStatus::Skipped,
                None,
                format!("skipped: {} (already {:.1}KB)", name, kb(original_size)),
            )
        } else if within_target {
            (
                OutcomeStatus::Compressed,
                None,
                format!(
                    "{}: {:.1}KB → {:.1}KB{}",
                    name,
                    kb(original_size),
                    kb(final_size),
                    resolution_note
                ),
            )
        } else {
            let reduction = FileManager::calculate_reduction(original_size, final_size);
            (
                OutcomeStatus::Compressed,
                Some(reduction),
                format!(
                    "{}: {:.1}KB → {:.1}KB (-{:.1}%){}",
                    name,
                    kb(original_size),
                    kb(final_size),
                    reduction,
                    resolution_note
                ),
            )
        };

        Ok(CompressionOutcome {
            source_path: file.path.clone(),
            kind: file.kind,
            output_path: Some(output_path),
            status,
            original_size_bytes: original_size,
            final_size_bytes: Some(final_size),
            resolution_before: Some(before),
            resolution_after: Some(after),
            reduction_percent,
            quality: Some(search.quality),
            message,
        })
    }
}
