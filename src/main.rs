//! Recap CLI entry point.

use anyhow::{anyhow, Result};
use clap::Parser;
use recap::cli::{commands, Cli, Commands};
use recap::config::{LlmProvider, Settings};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let mut settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging; the server falls back to the configured level
    let log_level = match (cli.verbose, &cli.command) {
        (0, Commands::Serve { .. }) => settings.general.log_level.clone(),
        (0, _) => "warn".to_string(),
        (1, _) => "info".to_string(),
        (2, _) => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("recap={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Command-line overrides
    if let Some(provider) = &cli.provider {
        settings.llm.provider = provider.parse::<LlmProvider>().map_err(|e| anyhow!(e))?;
    }
    if let Some(model) = &cli.model {
        settings.llm.model = Some(model.clone());
    }

    // Execute command
    match cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Summarize {
            url,
            translate,
            notes,
            notes_language,
            recommend,
            output,
            format,
        } => {
            let extras = commands::SummarizeExtras {
                translate,
                notes,
                notes_language,
                recommend,
                output,
                format,
            };
            commands::run_summarize(&url, extras, settings).await?;
        }

        Commands::Translate { to, text, file } => {
            commands::run_translate(&to, text, file, settings).await?;
        }

        Commands::Notes { url, language } => {
            commands::run_notes(&url, &language, settings).await?;
        }

        Commands::Recommend {
            query,
            from_summary,
            limit,
        } => {
            commands::run_recommend(query, from_summary, limit, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(&host, port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path)?;
        }
    }

    Ok(())
}
