//! Translate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::{bail, Context, Result};
use std::io::Read;

/// Run the translate command.
pub async fn run_translate(
    to: &str,
    text: Option<String>,
    file: Option<String>,
    settings: Settings,
) -> Result<()> {
    let input = read_input(text, file.as_deref())?;
    if input.trim().is_empty() {
        bail!("Nothing to translate");
    }

    if let Err(e) = preflight::check(Operation::Text, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let progress = Output::generation_progress();
    let orchestrator = Orchestrator::new(settings)?.with_progress(progress.clone());

    let result = orchestrator.translate_text(&input, to).await;
    progress.finish_and_clear();

    match result {
        Ok(translation) => {
            println!("{}", translation);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to translate: {}", e));
            Err(e.into())
        }
    }
}

/// Take the text from `--text`, a file, or stdin for "-".
pub(crate) fn read_input(text: Option<String>, file: Option<&str>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    match file {
        Some("-") | None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_input_prefers_text() {
        let text = read_input(Some("hello".to_string()), Some("/nonexistent")).unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.txt");
        std::fs::write(&path, "Un résumé.").unwrap();

        let text = read_input(None, path.to_str()).unwrap();
        assert_eq!(text, "Un résumé.");
    }

    #[test]
    fn test_read_input_missing_file() {
        assert!(read_input(None, Some("/nonexistent/recap/summary.txt")).is_err());
    }
}
