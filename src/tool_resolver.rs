//! # Tool Path Resolver
//!
//! Finds the external converters used for HEIC input on the system `PATH`.

use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Locates executables in a list of directories
#[derive(Debug, Clone)]
pub struct ToolPathResolver {
    search_path: Vec<PathBuf>,
}

impl ToolPathResolver {
    /// Create a resolver over the current `PATH`
    pub fn new() -> Self {
        let search_path = env::var_os("PATH")
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default();
        Self { search_path }
    }

    /// Create a resolver over an explicit list of directories
    pub fn with_search_path(search_path: Vec<PathBuf>) -> Self {
        Self { search_path }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        let file_name = format!("{}{}", tool_name, extension);

        let found = self
            .search_path
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file());

        match &found {
            Some(path) => debug!("Resolved tool {} -> {}", tool_name, path.display()),
            None => debug!("Tool not found: {}", tool_name),
        }
        found
    }

    /// Installation hint for a missing tool
    pub fn install_hint(tool_name: &str) -> String {
        match tool_name {
            "heif-convert" => "sudo apt-get install libheif-examples".to_string(),
            "magick" | "convert" => "sudo apt-get install imagemagick".to_string(),
            "sips" => "sips ships with macOS".to_string(),
            _ => format!("sudo apt-get install {}", tool_name),
        }
    }
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}
