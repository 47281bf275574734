//! Fixtures shared by the unit tests: generated images and a scripted process runner.

use crate::platform::{ProcessOutput, ProcessRunner};
use image::{Rgb, RgbImage};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// RGB noise that JPEG cannot compress well
pub fn noisy_image(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed.wrapping_mul(2_654_435_761).wrapping_add(1);
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    })
}

pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

/// A `ProcessRunner` that never spawns anything.
///
/// `ffmpeg` writes `output_bytes` zero bytes to its last argument when it succeeds;
/// `ffprobe` prints `probe_json`.
#[derive(Default)]
pub struct FakeRunner {
    pub tools: Vec<&'static str>,
    pub ffmpeg_exit_code: i32,
    pub output_bytes: usize,
    pub probe_json: Option<String>,
    pub calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
}

impl FakeRunner {
    pub fn with_ffmpeg(output_bytes: usize) -> Self {
        Self {
            tools: vec!["ffmpeg"],
            output_bytes,
            ..Default::default()
        }
    }

    pub fn without_tools() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn ffmpeg_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|(program, _)| program.ends_with("ffmpeg"))
            .map(|(_, args)| args)
            .collect()
    }
}

impl ProcessRunner for FakeRunner {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        self.tools
            .contains(&tool)
            .then(|| PathBuf::from("/fake/bin").join(tool))
    }

    fn run(&self, program: &Path, args: &[String]) -> io::Result<ProcessOutput> {
        self.calls.lock().unwrap().push((program.to_path_buf(), args.to_vec()));

        if program.ends_with("ffprobe") {
            return Ok(match &self.probe_json {
                Some(json) => ProcessOutput {
                    success: true,
                    code: Some(0),
                    stdout: json.clone().into_bytes(),
                    stderr: Vec::new(),
                },
                None => ProcessOutput {
                    success: false,
                    code: Some(1),
                    stdout: Vec::new(),
                    stderr: b"probe failed".to_vec(),
                },
            });
        }

        if self.ffmpeg_exit_code != 0 {
            return Ok(ProcessOutput {
                success: false,
                code: Some(self.ffmpeg_exit_code),
                stdout: Vec::new(),
                stderr: b"Invalid data found when processing input".to_vec(),
            });
        }

        if let Some(output) = args.last() {
            std::fs::write(output, vec![0u8; self.output_bytes])?;
        }
        Ok(ProcessOutput {
            success: true,
            code: Some(0),
            ..Default::default()
        })
    }
}
