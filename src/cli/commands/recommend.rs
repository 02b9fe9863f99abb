//! Recommend command implementation.

use super::translate::read_input;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::recommend_with;
use crate::search::{create_search, VideoSearch};
use anyhow::{bail, Result};

/// Run the recommend command.
pub async fn run_recommend(
    query: Option<String>,
    from_summary: Option<String>,
    limit: Option<usize>,
    settings: Settings,
) -> Result<()> {
    if query.is_none() && from_summary.is_none() {
        bail!("Provide --query or --from-summary");
    }
    if query.as_deref().is_some_and(|q| q.trim().is_empty()) {
        bail!("Search query is empty");
    }

    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let summary = match &query {
        Some(_) => None,
        None => Some(read_input(None, from_summary.as_deref())?),
    };

    let search = create_search(&settings.transcript.ytdlp_path, &settings.search);
    let spinner = Output::spinner("Searching related videos...");

    let found = match (&query, &summary) {
        (Some(query), _) => {
            search
                .search(query.trim(), limit.unwrap_or(settings.search.max_results))
                .await
        }
        (None, summary) => {
            recommend_with(&search, &settings, summary.as_deref().unwrap_or_default(), limit).await
        }
    };
    spinner.finish_and_clear();

    match found {
        Ok(results) if results.is_empty() => {
            Output::warning("No related videos found.");
            Ok(())
        }
        Ok(results) => {
            Output::header(&format!("Related videos ({})", results.len()));
            for rec in &results {
                Output::recommendation(rec);
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
