//! # Task Optimizer Module
//!
//! Worker per la compressione di singoli file.
//! Smista ogni `MediaFile` al processore giusto in base al tipo.

use crate::{
    config::CompressionOptions,
    file_manager::{MediaFile, MediaKind},
    image_processor::ImageProcessor,
    outcome::CompressionOutcome,
    platform::ProcessRunner,
    video_processor::VideoProcessor,
};
use std::sync::Arc;
use tracing::debug;

/// Compresses one file at a time
pub struct TaskOptimizer {
    image_processor: ImageProcessor,
    video_processor: VideoProcessor,
}

impl TaskOptimizer {
    pub fn new(options: CompressionOptions, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            image_processor: ImageProcessor::new(options.clone()),
            video_processor: VideoProcessor::new(options, runner),
        }
    }

    /// Processa un singolo file
    pub fn process(&self, file: &MediaFile) -> CompressionOutcome {
        debug!("Processing {} ({:?})", file.path.display(), file.kind);

        match file.kind {
            MediaKind::Image => self.image_processor.compress(file),
            MediaKind::Video => self.video_processor.transcode(file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::OutcomeStatus;
    use crate::test_support::{solid_image, FakeRunner};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dispatch_by_kind() {
        let temp_dir = TempDir::new().unwrap();
        let image_path = temp_dir.path().join("a.png");
        solid_image(10, 10, [1, 2, 3]).save(&image_path).unwrap();
        let video_path = temp_dir.path().join("b.mp4");
        fs::write(&video_path, vec![0u8; 64]).unwrap();

        let runner = Arc::new(FakeRunner::with_ffmpeg(32));
        let task = TaskOptimizer::new(CompressionOptions::default(), runner.clone());

        let image = task.process(&MediaFile { path: image_path, kind: MediaKind::Image });
        assert_eq!(image.status, OutcomeStatus::Skipped);
        assert!(runner.calls().is_empty());

        let video = task.process(&MediaFile { path: video_path, kind: MediaKind::Video });
        assert_eq!(video.status, OutcomeStatus::Compressed);
        assert_eq!(runner.ffmpeg_calls().len(), 1);
    }
}
