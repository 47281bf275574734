//! # Platform-specific utilities
//!
//! Questo modulo centralizza l'esecuzione dei processi esterni (ffmpeg, ffprobe).
//!
//! ## Responsabilità:
//! - Trait `ProcessRunner`: localizza un tool ed esegue un processo
//! - `SystemRunner`: implementazione reale basata su `ToolPathResolver` e
//!   `std::process::Command`
//!
//! I processori video dipendono solo dal trait, così i test possono iniettare
//! un runner finto e verificare gli argomenti costruiti senza ffmpeg installato.

use crate::tool_resolver::ToolPathResolver;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Captured result of an external process
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Locates and runs external tools
pub trait ProcessRunner: Send + Sync {
    /// Resolve a tool name to an executable path, `None` if unavailable
    fn locate(&self, tool: &str) -> Option<PathBuf>;

    /// Run `program` with `args` to completion, capturing its output
    fn run(&self, program: &Path, args: &[String]) -> io::Result<ProcessOutput>;
}

/// Runs real processes on this machine
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    resolver: ToolPathResolver,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: ToolPathResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ToolPathResolver {
        &self.resolver
    }
}

impl ProcessRunner for SystemRunner {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        self.resolver.resolve_tool(tool)
    }

    fn run(&self, program: &Path, args: &[String]) -> io::Result<ProcessOutput> {
        debug!("Running {} {}", program.display(), args.join(" "));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        Ok(ProcessOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
