//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and credentials are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{RecapError, Result};
use crate::llm::{resolve_api_key, validate_api_key};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Working from a video needs yt-dlp and a usable provider.
    Video,
    /// Working from text only needs a usable provider.
    Text,
    /// Search only needs yt-dlp.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Video => {
            check_credentials(settings)?;
            check_tool(&settings.transcript.ytdlp_path)?;
        }
        Operation::Text => {
            check_credentials(settings)?;
        }
        Operation::Search => {
            check_tool(&settings.transcript.ytdlp_path)?;
        }
    }
    Ok(())
}

/// Check that the configured provider has a well-formed API key, if it needs one.
pub fn check_credentials(settings: &Settings) -> Result<()> {
    if settings.llm.api_key_env().is_none() {
        return Ok(());
    }
    match resolve_api_key(&settings.llm, None)? {
        Some(key) => validate_api_key(settings.llm.provider, &key),
        None => Err(RecapError::InvalidCredential(format!(
            "{} requires an API key",
            settings.llm.provider
        ))),
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(RecapError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RecapError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(RecapError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
