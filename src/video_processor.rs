//! # Video Processing Module
//!
//! Questo modulo gestisce la ricodifica dei video tramite FFmpeg.
//!
//! ## Responsabilità:
//! - Localizzazione di ffmpeg (tool bundled, poi PATH) tramite `ProcessRunner`
//! - Costruzione degli argomenti: scala l'altezza a `min(max, originale)`,
//!   larghezza derivata e pari, mai upscaling
//! - Controllo qualità tramite CRF e preset configurabili
//! - Ricodifica audio con codec e bitrate configurabili
//! - Analisi risoluzione con ffprobe (opzionale)
//!
//! ## Output:
//! Il file finisce accanto alla sorgente come `<prefix><nome originale>`,
//! estensione preservata.
//!
//! ## Controllo qualità (CRF):
//! - 0-17: Visualmente lossless (file grandi)
//! - 18-23: Alta qualità
//! - 24-28: Buona qualità (default 28, bilanciato)
//! - 29-35: Qualità accettabile (file piccoli)
//! - 36+: Bassa qualità (non raccomandato)
//!
//! ## Errori:
//! - ffmpeg assente → `ToolMissing`
//! - exit code non zero → errore generico "ffmpeg error", stderr solo nei log di debug
//!
//! ## Esempio:
//! ```rust,ignore
//! let processor = VideoProcessor::new(options, Arc::new(SystemRunner::new()));
//! let outcome = processor.transcode(&media_file);
//! ```

use crate::config::CompressionOptions;
use crate::error::CompressError;
use crate::file_manager::{FileManager, MediaFile};
use crate::optimizer::path_resolver::PathResolver;
use crate::outcome::{CompressionOutcome, OutcomeStatus, Resolution};
use crate::platform::ProcessRunner;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Handles video transcoding
pub struct VideoProcessor {
    options: CompressionOptions,
    runner: Arc<dyn ProcessRunner>,
}

impl VideoProcessor {
    pub fn new(options: CompressionOptions, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { options, runner }
    }

    /// Arguments for one ffmpeg invocation
    pub fn build_ffmpeg_args(&self, input_path: &Path, output_path: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input_path.to_string_lossy().to_string(),
            "-vf".to_string(),
            format!("scale=-2:min({}\\,ih)", self.options.max_video_height_px),
            "-vcodec".to_string(),
            self.options.video_codec.clone(),
            "-crf".to_string(),
            self.options.video_crf.to_string(),
            "-preset".to_string(),
            self.options.video_preset.clone(),
            "-acodec".to_string(),
            self.options.audio_codec.clone(),
            "-b:a".to_string(),
            self.options.audio_bitrate.clone(),
            "-y".to_string(),
            output_path.to_string_lossy().to_string(),
        ]
    }

    /// Transcode one video. Never fails: errors become a `Failed` outcome.
    pub fn transcode(&self, file: &MediaFile) -> CompressionOutcome {
        match self.try_transcode(file) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Video transcoding failed for {}: {}", file.path.display(), e);
                CompressionOutcome::failed(file, &e)
            }
        }
    }

    fn try_transcode(&self, file: &MediaFile) -> Result<CompressionOutcome, CompressError> {
        let ffmpeg = self
            .runner
            .locate("ffmpeg")
            .ok_or_else(|| CompressError::ToolMissing("ffmpeg".to_string()))?;

        let original_size = std::fs::metadata(&file.path)?.len();
        let output_path = PathResolver::video_output_path(&file.path, &self.options.output_prefix)?;

        let info = self.get_video_info(&file.path);
        if let Some(ref info) = info {
            debug!(
                "📊 {}: {} {} ({:.1}s, rotation {}°)",
                file.file_name(),
                info.codec,
                info.resolution(),
                info.duration,
                info.rotation
            );
        }
        let before = info.map(|info| info.resolution());
        let after = before.map(|res| scaled_video_resolution(res, self.options.max_video_height_px));

        debug!(
            "🎬 Transcoding {} (CRF: {}, preset: {}, audio: {})",
            file.file_name(),
            self.options.video_crf,
            self.options.video_preset,
            self.options.audio_bitrate
        );

        let args = self.build_ffmpeg_args(&file.path, &output_path);
        let start_time = std::time::Instant::now();
        let output = self.runner.run(&ffmpeg, &args)?;

        if !output.success {
            debug!(
                "ffmpeg exited with {:?} after {:.1}s: {}",
                output.code,
                start_time.elapsed().as_secs_f64(),
                output.stderr_lossy()
            );
            if output_path.exists() {
                if let Err(e) = std::fs::remove_file(&output_path) {
                    debug!("Could not remove partial output {}: {}", output_path.display(), e);
                }
            }
            return Err(CompressError::Encode("ffmpeg error".to_string()));
        }
        debug!("✅ ffmpeg finished in {:.1}s", start_time.elapsed().as_secs_f64());

        let final_size = std::fs::metadata(&output_path)?.len();
        let reduction = FileManager::calculate_reduction(original_size, final_size);

        let resolution_note = match (before, after) {
            (Some(b), Some(a)) if b != a => format!(" [{}→{}]", b, a),
            _ => String::new(),
        };

        Ok(CompressionOutcome {
            source_path: file.path.clone(),
            kind: file.kind,
            output_path: Some(output_path),
            status: OutcomeStatus::Compressed,
            original_size_bytes: original_size,
            final_size_bytes: Some(final_size),
            resolution_before: before,
            resolution_after: after,
            reduction_percent: Some(reduction),
            quality: None,
            message: format!(
                "{}: {:.1}MB → {:.1}MB (-{:.1}%){}",
                file.file_name(),
                mb(original_size),
                mb(final_size),
                reduction,
                resolution_note
            ),
        })
    }

    /// Probe the first video stream with ffprobe; `None` if unavailable or unparsable
    pub fn get_video_info(&self, video_path: &Path) -> Option<VideoInfo> {
        let ffprobe = self.runner.locate("ffprobe")?;
        let args: Vec<String> = [
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "-select_streams",
            "v:0",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain(std::iter::once(video_path.to_string_lossy().to_string()))
        .collect();

        let output = match self.runner.run(&ffprobe, &args) {
            Ok(output) if output.success => output,
            Ok(output) => {
                debug!("ffprobe failed for {}: {}", video_path.display(), output.stderr_lossy());
                return None;
            }
            Err(e) => {
                debug!("Failed to execute ffprobe: {}", e);
                return None;
            }
        };

        let info = VideoInfo::from_ffprobe_json(&String::from_utf8_lossy(&output.stdout));
        if info.is_none() {
            debug!("No video stream found by ffprobe in {}", video_path.display());
        }
        info
    }
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Resolution ffmpeg will produce for `scale=-2:min(max_height,ih)`
pub fn scaled_video_resolution(original: Resolution, max_height: u32) -> Resolution {
    if original.height == 0 || original.width == 0 {
        return original;
    }

    let height = original.height.min(max_height);
    let half_width = f64::from(original.width) * f64::from(height) / (2.0 * f64::from(original.height));
    let width = ((half_width.round() as u32) * 2).max(2);
    Resolution::new(width, height)
}

/// Video file information
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
    /// Display rotation in degrees, as stored in the container
    pub rotation: i32,
}

impl VideoInfo {
    /// Parse `ffprobe -print_format json -show_streams` output
    pub fn from_ffprobe_json(json: &str) -> Option<Self> {
        let info: serde_json::Value = serde_json::from_str(json).ok()?;

        let video_stream = info["streams"]
            .as_array()?
            .iter()
            .find(|s| s["codec_type"] == "video")?;

        let width = video_stream["width"].as_u64()? as u32;
        let height = video_stream["height"].as_u64()? as u32;
        let codec = video_stream["codec_name"].as_str().unwrap_or("unknown").to_string();
        let duration = info["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        let rotation = video_stream["side_data_list"]
            .as_array()
            .and_then(|list| list.iter().find_map(|d| d["rotation"].as_i64()))
            .or_else(|| {
                video_stream["tags"]["rotate"]
                    .as_str()
                    .and_then(|r| r.parse::<i64>().ok())
            })
            .unwrap_or(0) as i32;

        Some(Self { duration, width, height, codec, rotation })
    }

    /// Resolution as displayed; ffmpeg autorotates, so quarter turns swap the axes
    pub fn resolution(&self) -> Resolution {
        if self.rotation.rem_euclid(180) == 90 {
            Resolution::new(self.height, self.width)
        } else {
            Resolution::new(self.width, self.height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_manager::MediaKind;
    use crate::test_support::FakeRunner;
    use std::fs;
    use tempfile::TempDir;

    const PROBE_1080P: &str = r#"{
        "streams": [
            { "index": 0, "codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080 }
        ],
        "format": { "duration": "12.5" }
    }"#;

    fn video_fixture(dir: &Path, name: &str, size: usize) -> MediaFile {
        let path = dir.join(name);
        fs::write(&path, vec![1u8; size]).unwrap();
        MediaFile { path, kind: MediaKind::Video }
    }

    fn processor(runner: FakeRunner, options: CompressionOptions) -> (VideoProcessor, Arc<FakeRunner>) {
        let runner = Arc::new(runner);
        (VideoProcessor::new(options, runner.clone()), runner)
    }

    #[test]
    fn test_ffmpeg_arguments() {
        let (processor, _) = processor(FakeRunner::with_ffmpeg(10), CompressionOptions::default());
        let args = processor.build_ffmpeg_args(Path::new("/v/in.mov"), Path::new("/v/compressed_in.mov"));

        assert_eq!(
            args,
            vec![
                "-i", "/v/in.mov", "-vf", "scale=-2:min(1080\\,ih)", "-vcodec", "libx264", "-crf", "28",
                "-preset", "fast", "-acodec", "aac", "-b:a", "128k", "-y", "/v/compressed_in.mov",
            ]
        );
    }

    #[test]
    fn test_transcode_reports_reduction() {
        let temp_dir = TempDir::new().unwrap();
        let file = video_fixture(temp_dir.path(), "clip.mp4", 1000);
        let options = CompressionOptions { max_video_height_px: 720, ..Default::default() };
        let (processor, runner) = processor(FakeRunner::with_ffmpeg(250), options);

        let outcome = processor.transcode(&file);

        assert_eq!(outcome.status, OutcomeStatus::Compressed);
        assert_eq!(outcome.output_path, Some(temp_dir.path().join("compressed_clip.mp4")));
        assert_eq!(outcome.original_size_bytes, 1000);
        assert_eq!(outcome.final_size_bytes, Some(250));
        assert_eq!(outcome.reduction_percent, Some(75.0));
        assert_eq!(outcome.quality, None);
        assert_eq!(outcome.resolution_before, None);
        assert!(outcome.message.contains("(-75.0%)"));

        let calls = runner.ffmpeg_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains(&"scale=-2:min(720\\,ih)".to_string()));
    }

    #[test]
    fn test_missing_ffmpeg_fails_with_tool_name() {
        let temp_dir = TempDir::new().unwrap();
        let file = video_fixture(temp_dir.path(), "clip.mkv", 100);
        let (processor, runner) = processor(FakeRunner::without_tools(), CompressionOptions::default());

        let outcome = processor.transcode(&file);

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.original_size_bytes, 100);
        assert!(outcome.message.contains("ffmpeg"));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_nonzero_exit_is_generic_ffmpeg_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = video_fixture(temp_dir.path(), "clip.avi", 100);
        let runner = FakeRunner { ffmpeg_exit_code: 1, ..FakeRunner::with_ffmpeg(0) };
        let (processor, _) = processor(runner, CompressionOptions::default());

        let outcome = processor.transcode(&file);

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(outcome.message.contains("ffmpeg error"));
        assert!(!outcome.message.contains("Invalid data"));
        assert!(!temp_dir.path().join("compressed_clip.avi").exists());
    }

    #[test]
    fn test_probe_predicts_output_resolution() {
        let temp_dir = TempDir::new().unwrap();
        let file = video_fixture(temp_dir.path(), "wide.mp4", 4000);
        let runner = FakeRunner {
            tools: vec!["ffmpeg", "ffprobe"],
            output_bytes: 1000,
            probe_json: Some(PROBE_1080P.to_string()),
            ..Default::default()
        };
        let options = CompressionOptions { max_video_height_px: 720, ..Default::default() };
        let (processor, _) = processor(runner, options);

        let outcome = processor.transcode(&file);

        assert_eq!(outcome.resolution_before, Some(Resolution::new(1920, 1080)));
        assert_eq!(outcome.resolution_after, Some(Resolution::new(1280, 720)));
        assert!(outcome.message.contains("[1920x1080→1280x720]"));
    }

    #[test]
    fn test_rotated_clip_predicts_display_resolution() {
        let temp_dir = TempDir::new().unwrap();
        let file = video_fixture(temp_dir.path(), "phone.mov", 4000);
        let probe = r#"{
            "streams": [{
                "codec_type": "video", "codec_name": "hevc", "width": 1920, "height": 1080,
                "side_data_list": [{ "side_data_type": "Display Matrix", "rotation": -90 }]
            }],
            "format": { "duration": "3.0" }
        }"#;
        let runner = FakeRunner {
            tools: vec!["ffmpeg", "ffprobe"],
            output_bytes: 1000,
            probe_json: Some(probe.to_string()),
            ..Default::default()
        };
        let (processor, _) = processor(runner, CompressionOptions::default());

        let outcome = processor.transcode(&file);

        assert_eq!(outcome.resolution_before, Some(Resolution::new(1080, 1920)));
        assert_eq!(outcome.resolution_after, Some(Resolution::new(608, 1080)));
        assert!(outcome.message.contains("[1080x1920→608x1080]"));
    }

    #[test]
    fn test_failed_probe_leaves_resolution_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let file = video_fixture(temp_dir.path(), "odd.webm", 500);
        let runner = FakeRunner { tools: vec!["ffmpeg", "ffprobe"], output_bytes: 100, ..Default::default() };
        let (processor, _) = processor(runner, CompressionOptions::default());

        let outcome = processor.transcode(&file);
        assert_eq!(outcome.status, OutcomeStatus::Compressed);
        assert_eq!(outcome.resolution_before, None);
        assert_eq!(outcome.resolution_after, None);
    }

    #[test]
    fn test_scaled_resolution_never_upscales() {
        assert_eq!(scaled_video_resolution(Resolution::new(640, 360), 1080), Resolution::new(640, 360));
        assert_eq!(scaled_video_resolution(Resolution::new(3840, 2160), 1080), Resolution::new(1920, 1080));

        let portrait = scaled_video_resolution(Resolution::new(1080, 1920), 1080);
        assert_eq!(portrait.height, 1080);
        assert_eq!(portrait.width % 2, 0);
        assert_eq!(portrait.width, 608);
    }

    #[test]
    fn test_parse_ffprobe_json() {
        let info = VideoInfo::from_ffprobe_json(PROBE_1080P).unwrap();
        assert_eq!(info.resolution(), Resolution::new(1920, 1080));
        assert_eq!(info.codec, "h264");
        assert_eq!(info.duration, 12.5);

        assert_eq!(info.rotation, 0);

        let tagged = VideoInfo::from_ffprobe_json(
            r#"{ "streams": [{ "codec_type": "video", "width": 640, "height": 480, "tags": { "rotate": "270" } }] }"#,
        )
        .unwrap();
        assert_eq!(tagged.rotation, 270);
        assert_eq!(tagged.resolution(), Resolution::new(480, 640));

        assert!(VideoInfo::from_ffprobe_json(r#"{ "streams": [] }"#).is_none());
        assert!(VideoInfo::from_ffprobe_json("not json").is_none());
    }
}
