//! # Path Resolution Module
//!
//! Centralizza il calcolo dei path di output.
//! Gli output finiscono sempre accanto alla sorgente, con il prefisso configurato:
//! - Immagini: `<prefix><stem>.jpg` (l'estensione sorgente viene scartata)
//! - Video: `<prefix><filename>` (estensione preservata)

use crate::error::CompressError;
use std::path::{Path, PathBuf};

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Output path for a compressed image
    pub fn image_output_path(input_path: &Path, prefix: &str) -> Result<PathBuf, CompressError> {
        let stem = input_path
            .file_stem()
            .ok_or_else(|| CompressError::Unexpected(format!("Invalid file name: {}", input_path.display())))?
            .to_string_lossy();

        Ok(input_path.with_file_name(format!("{}{}.jpg", prefix, stem)))
    }

    /// Output path for a transcoded video
    pub fn video_output_path(input_path: &Path, prefix: &str) -> Result<PathBuf, CompressError> {
        let name = input_path
            .file_name()
            .ok_or_else(|| CompressError::Unexpected(format!("Invalid file name: {}", input_path.display())))?
            .to_string_lossy();

        Ok(input_path.with_file_name(format!("{}{}", prefix, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_output_always_jpg() {
        let out = PathResolver::image_output_path(Path::new("/photos/trip/IMG_1.PNG"), "compressed_").unwrap();
        assert_eq!(out, PathBuf::from("/photos/trip/compressed_IMG_1.jpg"));

        let out = PathResolver::image_output_path(Path::new("/photos/a.b.webp"), "small-").unwrap();
        assert_eq!(out, PathBuf::from("/photos/small-a.b.jpg"));
    }

    #[test]
    fn test_video_output_keeps_extension() {
        let out = PathResolver::video_output_path(Path::new("/clips/holiday.MOV"), "compressed_").unwrap();
        assert_eq!(out, PathBuf::from("/clips/compressed_holiday.MOV"));
    }

    #[test]
    fn test_path_without_file_name_is_error() {
        assert!(PathResolver::image_output_path(Path::new("/"), "x_").is_err());
        assert!(PathResolver::video_output_path(Path::new("/"), "x_").is_err());
    }
}
