//! # Tool Path Resolver
//!
//! Finds the external encoder binaries (`ffmpeg`, `ffprobe`):
//! - Bundled next to the app, in the directory named by `MEDIA_COMPRESSOR_TOOLS_DIR`
//! - System-installed tools on `PATH`

use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Environment variable pointing at a directory of bundled tools
pub const TOOLS_DIR_ENV: &str = "MEDIA_COMPRESSOR_TOOLS_DIR";

/// Tools the compressor knows how to use, with whether they are required
const KNOWN_TOOLS: &[(&str, bool)] = &[("ffmpeg", true), ("ffprobe", false)];

/// Tool path resolver: bundled directory first, then `PATH`
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    tools_dir: Option<PathBuf>,
    search_path: Vec<PathBuf>,
}

impl ToolPathResolver {
    /// Create a resolver from the current environment
    pub fn new() -> Self {
        let tools_dir = env::var_os(TOOLS_DIR_ENV)
            .map(PathBuf::from)
            .filter(|dir| dir.is_dir());
        let search_path = env::var_os("PATH")
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();

        debug!("Tools directory: {:?}", tools_dir);
        Self { tools_dir, search_path }
    }

    /// Create a resolver with an explicit bundled directory and search path
    pub fn with_dirs(tools_dir: Option<PathBuf>, search_path: Vec<PathBuf>) -> Self {
        Self { tools_dir, search_path }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let file_name = Self::executable_name(tool_name);

        if let Some(ref tools_dir) = self.tools_dir {
            let bundled = tools_dir.join(&file_name);
            if bundled.is_file() {
                debug!("Using bundled tool: {} -> {:?}", tool_name, bundled);
                return Some(bundled);
            }
        }

        let found = self
            .search_path
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file());

        match found {
            Some(ref path) => debug!("Using system tool: {} -> {:?}", tool_name, path),
            None => debug!("Tool not found: {}", tool_name),
        }
        found
    }

    fn executable_name(tool_name: &str) -> String {
        if cfg!(windows) {
            format!("{}.exe", tool_name)
        } else {
            tool_name.to_string()
        }
    }

    /// Check if a tool is available and provide installation instructions if not
    pub fn check_tool_with_instructions(&self, tool_name: &str) -> Result<PathBuf, String> {
        self.resolve_tool(tool_name).ok_or_else(|| {
            format!(
                "Tool '{}' not found in {} or on PATH.\nTo install, run:\n  {}",
                tool_name,
                TOOLS_DIR_ENV,
                Self::install_instructions(tool_name)
            )
        })
    }

    fn install_instructions(tool_name: &str) -> &'static str {
        match tool_name {
            "ffmpeg" | "ffprobe" if cfg!(target_os = "macos") => "brew install ffmpeg",
            "ffmpeg" | "ffprobe" if cfg!(windows) => "winget install ffmpeg",
            "ffmpeg" | "ffprobe" => "sudo apt-get install ffmpeg",
            _ => "see the tool's documentation",
        }
    }

    /// Get a report of tool availability
    pub fn get_tools_report(&self) -> String {
        let mut report = String::new();
        report.push_str("Tool Availability\n");
        report.push_str(&format!("Bundled tools dir: {:?}\n\n", self.tools_dir));

        for (tool, required) in KNOWN_TOOLS {
            let role = if *required { "required for videos" } else { "optional, resolution info" };
            match self.resolve_tool(tool) {
                Some(path) => report.push_str(&format!("  ✅ {} ({}) -> {:?}\n", tool, role, path)),
                None => report.push_str(&format!(
                    "  ❌ {} ({}) install with: {}\n",
                    tool,
                    role,
                    Self::install_instructions(tool)
                )),
            }
        }

        report
    }

    /// True when every required tool resolves
    pub fn required_tools_available(&self) -> bool {
        KNOWN_TOOLS
            .iter()
            .filter(|(_, required)| *required)
            .all(|(tool, _)| self.resolve_tool(tool).is_some())
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}
