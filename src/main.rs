//! # Media Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Costruzione delle opzioni: file di configurazione, poi override da CLI
//! - Avvio del batch in background e rendering degli eventi
//!   (progress bar oppure JSON riga per riga)
//! - Ctrl-C richiede una cancellazione cooperativa tra un file e l'altro
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-compressor ~/Pictures/trip --target-kb 500 --max-dimension 2560 --verbose
//! media-compressor ~/Videos --max-video-height 720 --crf 30 --json
//! media-compressor --check-tools
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use media_compressor::json_output::JsonMessage;
use media_compressor::progress::{BatchStats, ProgressManager};
use media_compressor::tool_resolver::ToolPathResolver;
use media_compressor::{spawn_batch, BatchController, BatchEvent, CompressionOptions, RunStatus, SystemRunner};

#[derive(Parser)]
#[command(name = "media-compressor")]
#[command(about = "Shrink images and videos in a folder to a target size and resolution")]
struct Args {
    /// Directory containing media files to compress
    #[arg(required_unless_present = "check_tools")]
    media_directory: Option<PathBuf>,

    /// Target size for images, in KB
    #[arg(short, long)]
    target_kb: Option<u32>,

    /// Maximum length of an image's longer side, in pixels
    #[arg(short = 'd', long)]
    max_dimension: Option<u32>,

    /// Maximum video height, in pixels
    #[arg(short = 'H', long)]
    max_video_height: Option<u32>,

    /// Only process files directly inside the directory
    #[arg(long)]
    no_recursive: bool,

    /// Prefix for output filenames
    #[arg(short, long)]
    prefix: Option<String>,

    /// Video CRF value (0-51, lower = better quality)
    #[arg(short, long)]
    crf: Option<u8>,

    /// Video encoder preset
    #[arg(long)]
    preset: Option<String>,

    /// Video audio bitrate
    #[arg(short, long)]
    audio_bitrate: Option<String>,

    /// Ignore files that already carry the output prefix
    #[arg(long)]
    skip_compressed: bool,

    /// Load options from a JSON file (flags override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective options to a JSON file
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Emit one JSON object per line on stdout instead of a progress bar
    #[arg(long)]
    json: bool,

    /// Report whether ffmpeg/ffprobe can be found, then exit
    #[arg(long)]
    check_tools: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_overrides(&self, options: &mut CompressionOptions) {
        if let Some(target_kb) = self.target_kb {
            options.target_size_kb = target_kb;
        }
        if let Some(max_dimension) = self.max_dimension {
            options.max_image_dimension_px = max_dimension;
        }
        if let Some(max_video_height) = self.max_video_height {
            options.max_video_height_px = max_video_height;
        }
        if self.no_recursive {
            options.recurse_subdirectories = false;
        }
        if let Some(ref prefix) = self.prefix {
            options.output_prefix = prefix.clone();
        }
        if let Some(crf) = self.crf {
            options.video_crf = crf;
        }
        if let Some(ref preset) = self.preset {
            options.video_preset = preset.clone();
        }
        if let Some(ref audio_bitrate) = self.audio_bitrate {
            options.audio_bitrate = audio_bitrate.clone();
        }
        if self.skip_compressed {
            options.skip_existing_outputs = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if args.check_tools {
        let resolver = ToolPathResolver::new();
        println!("{}", resolver.get_tools_report());
        if resolver.required_tools_available() {
            println!("Videos can be transcoded.");
        } else {
            println!("Videos will be reported as failed until ffmpeg is installed.");
        }
        return Ok(());
    }

    let media_directory = args
        .media_directory
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Media directory is required"))?;

    let mut options = match args.config {
        Some(ref path) => CompressionOptions::from_file(path).await?,
        None => CompressionOptions::default(),
    };
    args.apply_overrides(&mut options);
    options.validate()?;

    if let Some(ref path) = args.save_config {
        options.save_to_file(path).await?;
        info!("Saved options to {}", path.display());
    }

    // Validate arguments
    if !media_directory.is_dir() {
        let message = format!("Media directory does not exist: {}", media_directory.display());
        if args.json {
            JsonMessage::error(message.clone(), None).emit();
        }
        return Err(anyhow::anyhow!(message));
    }

    let runner = Arc::new(SystemRunner::new());
    if let Err(instructions) = runner.resolver().check_tool_with_instructions("ffmpeg") {
        warn!("{}\nVideos will be reported as failed.", instructions);
    }

    let (stop_sender, stop_receiver) = broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("🛑 Stop requested, finishing current file...");
            let _ = stop_sender.send(());
        }
    });

    if args.json {
        JsonMessage::start(media_directory.clone(), &options).emit();
    }

    let start_time = Instant::now();
    let controller = BatchController::new(options, runner).with_cancellation(stop_receiver);
    let (handle, mut events) = spawn_batch(controller, media_directory);

    let progress = if args.json { ProgressManager::hidden() } else { ProgressManager::new() };

    while let Some(event) = events.recv().await {
        if args.json {
            JsonMessage::from(&event).emit();
            continue;
        }

        match event {
            BatchEvent::Progress(fraction) => progress.set_fraction(fraction),
            BatchEvent::Log(message) => progress.log(&message),
            BatchEvent::Outcome(_) => {}
        }
    }

    let report = match handle.await? {
        Ok(report) => report,
        Err(e) => {
            progress.abandon("Failed");
            if args.json {
                JsonMessage::error(e.to_string(), None).emit();
            }
            return Err(e.into());
        }
    };

    let stats = BatchStats::from_outcomes(&report.outcomes);
    let duration = start_time.elapsed().as_secs_f64();

    if args.json {
        JsonMessage::complete(report.status, &stats, duration).emit();
    } else {
        match report.status {
            RunStatus::Completed => progress.finish(&stats.format_summary()),
            RunStatus::NothingToDo => progress.finish("Nothing to do"),
            RunStatus::Canceled => progress.abandon(&format!("Canceled | {}", stats.format_summary())),
        }
    }

    info!("Finished in {:.1}s", duration);
    Ok(())
}
