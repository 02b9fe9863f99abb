//! Notes command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::notes::SUPPORTED_LANGUAGES;
use crate::orchestrator::Orchestrator;
use crate::session::Session;
use anyhow::Result;

/// Run the notes command.
pub async fn run_notes(url: &str, language: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Video, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    if !SUPPORTED_LANGUAGES
        .iter()
        .any(|l| l.eq_ignore_ascii_case(language.trim()))
    {
        Output::warning(&format!(
            "No localized headings for {}; using English headings.",
            language
        ));
    }

    let progress = Output::generation_progress();
    let orchestrator = Orchestrator::new(settings)?.with_progress(progress.clone());
    let mut session = Session::new();

    Output::info(&format!("Processing: {}", url));
    let result = match orchestrator.load_video(&mut session, url).await {
        Ok(_) => orchestrator.notes(&mut session, Some(language)).await,
        Err(e) => Err(e),
    };
    progress.finish_and_clear();

    match result {
        Ok(notes) => {
            println!("{}", notes);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate notes: {}", e));
            Err(e.into())
        }
    }
}
