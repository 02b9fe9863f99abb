//! Summarize command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::session::{default_export_name, write_export, ExportFormat, ExportOptions, Session};
use anyhow::{anyhow, Result};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Optional steps that follow the summary.
#[derive(Debug, Default)]
pub struct SummarizeExtras {
    pub translate: Option<String>,
    pub notes: bool,
    pub notes_language: Option<String>,
    pub recommend: bool,
    pub output: Option<String>,
    pub format: String,
}

/// Run the summarize command.
pub async fn run_summarize(url: &str, extras: SummarizeExtras, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Video, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let format = ExportFormat::from_str(&extras.format).map_err(|e| anyhow!(e))?;
    let export_dir = settings.export_dir();

    let progress = Output::generation_progress();
    let orchestrator = Orchestrator::new(settings)?.with_progress(progress.clone());
    let mut session = Session::new();

    Output::info(&format!("Processing: {}", url));
    let generated = generate(&orchestrator, &progress, &mut session, url, &extras).await;
    progress.finish_and_clear();
    if let Err(e) = generated {
        Output::error(&format!("Failed: {}", e));
        return Err(e.into());
    }

    if extras.recommend {
        let spinner = Output::spinner("Searching related videos...");
        let found = orchestrator.recommend(&mut session, None).await;
        spinner.finish_and_clear();
        match found {
            Ok(results) if results.is_empty() => Output::warning("No related videos found."),
            Ok(results) => {
                Output::header("Related videos");
                for rec in &results {
                    Output::recommendation(rec);
                }
            }
            // Search is best effort once the summary exists.
            Err(e) => Output::warning(&format!("Related video search failed: {}", e)),
        }
    }

    if let Some(name) = &extras.output {
        match export_session(&session, &export_dir, name, format)? {
            Some(path) => {
                println!();
                Output::success(&format!("Exported to {}", path.display()));
            }
            None => Output::warning("Nothing to export: every output is empty."),
        }
    }

    Ok(())
}

/// Summary, then the requested translation and notes. Output is printed
/// above the progress bar as each step finishes.
async fn generate(
    orchestrator: &Orchestrator,
    progress: &ProgressBar,
    session: &mut Session,
    url: &str,
    extras: &SummarizeExtras,
) -> crate::error::Result<()> {
    let summary = orchestrator.summarize_video(session, url).await?;
    print_above(progress, "Summary", &summary.text);

    if let Some(language) = &extras.translate {
        let text = orchestrator.translate(session, language).await?;
        print_above(progress, &format!("Translation ({})", language), &text);
    }

    if extras.notes {
        let text = orchestrator
            .notes(session, extras.notes_language.as_deref())
            .await?;
        print_above(progress, "Notes", &text);
    }

    Ok(())
}

fn print_above(progress: &ProgressBar, title: &str, body: &str) {
    progress.suspend(|| Output::section(title, body));
}

/// Write the session export, unless there is nothing in it.
fn export_session(
    session: &Session,
    dir: &Path,
    name: &str,
    format: ExportFormat,
) -> crate::error::Result<Option<PathBuf>> {
    if session.is_empty() {
        return Ok(None);
    }
    let options = ExportOptions {
        format,
        ..ExportOptions::default()
    };
    let content = session.export(&options);
    write_export(dir, &export_name(name), format, &content).map(Some)
}

/// "-" asks for a generated, timestamped name.
fn export_name(requested: &str) -> String {
    let requested = requested.trim();
    if requested.is_empty() || requested == "-" {
        default_export_name()
    } else {
        requested.to_string()
    }
}
