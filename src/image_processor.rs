//! # Image Processor Module
//!
//! Questo modulo converte le foto HEIC/HEIF in JPEG utilizzando tool esterni.
//! Il crate `image` non decodifica HEIC, quindi è l'unico punto in cui
//! l'organizer lancia processi esterni.
//!
//! ## Strategia dei tool
//! **Priorità (dal migliore al peggiore):**
//! 1. **heif-convert** (libheif) - decoder nativo, mantiene il profilo colore
//! 2. **magick** (ImageMagick 7.x)
//! 3. **convert** (ImageMagick 6.x/legacy)
//! 4. **sips** - sempre presente su macOS
//!
//! Se un tool fallisce si prova il successivo disponibile. Se non ce n'è
//! nessuno il file fallisce con `MissingDependency` e il batch prosegue.

use crate::error::OrganizeError;
use crate::tool_resolver::ToolPathResolver;
use std::ffi::OsString;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Converters in order of preference
pub const HEIC_CONVERTERS: &[&str] = &["heif-convert", "magick", "convert", "sips"];

/// HEIC to JPEG transcoder backed by external tools
pub struct HeicConverter {
    resolver: ToolPathResolver,
    jpeg_quality: u8,
}

impl HeicConverter {
    pub fn new(resolver: ToolPathResolver, jpeg_quality: u8) -> Self {
        Self {
            resolver,
            jpeg_quality,
        }
    }

    /// Convert `input` into a JPEG at `output`.
    ///
    /// On failure no partial output is left behind.
    pub async fn convert_to_jpeg(&self, input: &Path, output: &Path) -> Result<(), OrganizeError> {
        let mut any_tool_available = false;

        for tool_name in HEIC_CONVERTERS {
            let Some(tool_path) = self.resolver.resolve_tool(tool_name) else {
                continue;
            };
            any_tool_available = true;

            match self.run_tool(tool_name, &tool_path, input, output).await {
                Ok(()) if output.is_file() => {
                    debug!("Converted {} with {}", input.display(), tool_name);
                    return Ok(());
                }
                Ok(()) => {
                    warn!("{} reported success but wrote no file for {}", tool_name, input.display());
                }
                Err(e) => {
                    warn!("{} failed for {}: {}, trying next tool", tool_name, input.display(), e);
                }
            }
            let _ = tokio::fs::remove_file(output).await;
        }

        if !any_tool_available {
            let hints: Vec<String> = HEIC_CONVERTERS
                .iter()
                .map(|tool| format!("{} ({})", tool, ToolPathResolver::install_hint(tool)))
                .collect();
            Err(OrganizeError::MissingDependency(format!(
                "No HEIC converter available. Install one of: {}",
                hints.join(", ")
            )))
        } else {
            Err(OrganizeError::Conversion(format!(
                "All HEIC converters failed for {}",
                input.display()
            )))
        }
    }

    async fn run_tool(
        &self,
        tool_name: &str,
        tool_path: &Path,
        input: &Path,
        output: &Path,
    ) -> Result<(), OrganizeError> {
        let args = converter_args(tool_name, input, output, self.jpeg_quality);
        debug!("Command: {:?} {:?}", tool_path, args);

        let result = Command::new(tool_path).args(&args).output().await?;
        if result.status.success() {
            Ok(())
        } else {
            Err(OrganizeError::Conversion(format!(
                "{} exited with {}: {}",
                tool_name,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )))
        }
    }
}

/// Command line for each supported converter
fn converter_args(tool_name: &str, input: &Path, output: &Path, quality: u8) -> Vec<OsString> {
    let quality = OsString::from(quality.to_string());
    let input = input.as_os_str().to_owned();
    let output = output.as_os_str().to_owned();
    let flag = |s: &str| OsString::from(s);

    match tool_name {
        "heif-convert" => vec![flag("-q"), quality, input, output],
        "magick" | "convert" => vec![input, flag("-quality"), quality, output],
        "sips" => vec![
            flag("-s"),
            flag("format"),
            flag("jpeg"),
            flag("-s"),
            flag("formatOptions"),
            quality,
            input,
            flag("--out"),
            output,
        ],
        _ => Vec::new(),
    }
}
