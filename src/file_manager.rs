//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei file media e le utilità sulle dimensioni.
//!
//! ## Responsabilità:
//! - Scansione (ricorsiva o solo primo livello) di una directory
//! - Classificazione immagine / video in base all'estensione (case-insensitive)
//! - Ordinamento deterministico dei risultati (lessicografico per path)
//! - Formattazione human-readable delle dimensioni e calcolo riduzione
//!
//! ## Formati supportati:
//! - **Immagini**: JPG, JPEG, PNG, GIF, BMP, WebP, TIFF, HEIC, HEIF
//! - **Video**: MP4, AVI, MOV, MKV, WMV, FLV, WebM
//!
//! ## Symlink:
//! La scansione ricorsiva non segue i symlink per evitare cicli.
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::scan(Path::new("/photos"), true)?;
//! for file in files {
//!     match file.kind {
//!         MediaKind::Image => { /* process image */ }
//!         MediaKind::Video => { /* process video */ }
//!     }
//! }
//! ```

use crate::error::CompressError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "heic", "heif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm"];

/// Kind of media, decided by file extension only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a path by its lower-cased extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Self::Video)
        } else {
            None
        }
    }
}

/// A discovered media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaFile {
    pub fn file_name(&self) -> String {
        self.path.file_name().unwrap_or_default().to_string_lossy().to_string()
    }

    /// True for HEIC/HEIF sources, which this build cannot decode
    pub fn is_heif(&self) -> bool {
        matches!(
            self.path.extension().map(|e| e.to_string_lossy().to_lowercase()).as_deref(),
            Some("heic") | Some("heif")
        )
    }
}

/// Manages file discovery
pub struct FileManager;

impl FileManager {
    /// Find all supported media files under `root`, sorted by path.
    ///
    /// Fails with `NotADirectory` when `root` is missing or cannot be listed.
    pub fn scan(root: &Path, recurse: bool) -> Result<Vec<MediaFile>, CompressError> {
        Self::scan_filtered(root, recurse, None)
    }

    /// Like [`FileManager::scan`], leaving out files whose name starts with `exclude_prefix`.
    pub fn scan_filtered(
        root: &Path,
        recurse: bool,
        exclude_prefix: Option<&str>,
    ) -> Result<Vec<MediaFile>, CompressError> {
        let root = root
            .canonicalize()
            .map_err(|_| CompressError::NotADirectory(root.to_path_buf()))?;
        if !root.is_dir() {
            return Err(CompressError::NotADirectory(root));
        }
        let entries = fs::read_dir(&root).map_err(|_| CompressError::NotADirectory(root.clone()))?;

        let candidates = if recurse {
            Self::walk(&root)
        } else {
            Self::list(&root, entries)
        };

        let mut files: Vec<MediaFile> = candidates
            .into_iter()
            .filter(|path| match exclude_prefix {
                Some(prefix) => !path
                    .file_name()
                    .map(|name| name.to_string_lossy().starts_with(prefix))
                    .unwrap_or(false),
                None => true,
            })
            .filter_map(|path| MediaKind::from_path(&path).map(|kind| MediaFile { path, kind }))
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Scan of {} found {} media files", root.display(), files.len());
        Ok(files)
    }

    fn walk(root: &Path) -> Vec<PathBuf> {
        WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Error reading directory entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect()
    }

    fn list(root: &Path, entries: fs::ReadDir) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() {
                        paths.push(path);
                    }
                }
                Err(e) => warn!("Error reading directory entry in {}: {}", root.display(), e),
            }
        }
        paths
    }

    /// Size of a file in bytes, 0 if it cannot be read
    pub fn file_size(path: &Path) -> u64 {
        fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction, 0 for an empty original
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    fn names(files: &[MediaFile]) -> Vec<String> {
        files.iter().map(|f| f.file_name()).collect()
    }

    #[test]
    fn test_classification_is_case_insensitive() {
        assert_eq!(MediaKind::from_path(Path::new("a/IMG_001.JPG")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("b.HeIc")), Some(MediaKind::Image));
        assert_eq!(MediaKind::from_path(Path::new("clip.MKV")), Some(MediaKind::Video));
        assert_eq!(MediaKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(MediaKind::from_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_scan_non_recursive_lists_direct_children() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("b.png"));
        touch(&temp_dir.path().join("a.mp4"));
        touch(&temp_dir.path().join("readme.md"));
        touch(&temp_dir.path().join("nested/c.jpg"));

        let files = FileManager::scan(temp_dir.path(), false).unwrap();
        assert_eq!(names(&files), vec!["a.mp4", "b.png"]);
        assert_eq!(files[0].kind, MediaKind::Video);
        assert_eq!(files[1].kind, MediaKind::Image);
        assert!(files.iter().all(|f| f.path.is_absolute()));
    }

    #[test]
    fn test_scan_recursive_is_sorted() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("z.webp"));
        touch(&temp_dir.path().join("nested/deeper/m.MOV"));
        touch(&temp_dir.path().join("nested/a.gif"));

        let files = FileManager::scan(temp_dir.path(), true).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        let mut sorted = paths.clone();
        sorted.sort();

        assert_eq!(files.len(), 3);
        assert_eq!(paths, sorted);
    }

    #[test]
    fn test_scan_missing_root_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let err = FileManager::scan(&missing, true).unwrap_err();
        assert!(matches!(err, CompressError::NotADirectory(_)));
    }

    #[test]
    fn test_scan_file_root_is_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("photo.jpg");
        touch(&file);

        let err = FileManager::scan(&file, false).unwrap_err();
        assert!(matches!(err, CompressError::NotADirectory(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_unreadable_root_is_fatal_in_both_modes() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let locked = temp_dir.path().join("locked");
        touch(&locked.join("a.jpg"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root ignores directory permissions
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let recursive = FileManager::scan(&locked, true);
        let top_level = FileManager::scan(&locked, false);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(recursive, Err(CompressError::NotADirectory(_))));
        assert!(matches!(top_level, Err(CompressError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_recursive_does_not_follow_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let real = temp_dir.path().join("real/a.jpg");
        touch(&real);
        symlink(temp_dir.path(), temp_dir.path().join("real/loop")).unwrap();
        symlink(&real, temp_dir.path().join("link.jpg")).unwrap();

        let files = FileManager::scan(temp_dir.path(), true).unwrap();
        assert_eq!(names(&files), vec!["a.jpg"]);
        assert!(files[0].path.ends_with("real/a.jpg"));
    }

    #[test]
    fn test_scan_filtered_excludes_prefixed_outputs() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("photo.png"));
        touch(&temp_dir.path().join("compressed_photo.jpg"));

        let files = FileManager::scan_filtered(temp_dir.path(), false, Some("compressed_")).unwrap();
        assert_eq!(names(&files), vec!["photo.png"]);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(FileManager::format_size(512), "512 B");
        assert_eq!(FileManager::format_size(2048), "2.00 KB");
        assert_eq!(FileManager::format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_calculate_reduction() {
        assert_eq!(FileManager::calculate_reduction(1000, 250), 75.0);
        assert_eq!(FileManager::calculate_reduction(0, 10), 0.0);
        assert!(FileManager::calculate_reduction(100, 120) < 0.0);
    }
}
