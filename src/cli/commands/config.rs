//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: Option<PathBuf>) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            let updated = set_value(&settings, key, value)?;
            updated.save_to(&config_path)?;
            Output::success(&format!("Set {} = {}", key, value));
        }

        ConfigAction::Edit => {
            // Create default config if it doesn't exist
            if !config_path.exists() {
                settings.save_to(&config_path)?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

            Output::info(&format!("Opening config in {}...", editor));

            let status = std::process::Command::new(&editor)
                .arg(&config_path)
                .status();

            match status {
                Ok(s) if s.success() => {
                    Output::success("Config saved.");
                }
                Ok(_) => {
                    Output::warning("Editor exited with non-zero status.");
                }
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Return a copy of `settings` with the dotted `key` set to `value`.
///
/// The value is read as a TOML literal when possible (numbers, booleans,
/// arrays) and as a plain string otherwise. The result must still be a
/// valid configuration.
fn set_value(settings: &Settings, key: &str, value: &str) -> Result<Settings> {
    let mut root = toml::Value::try_from(settings).context("Failed to serialize config")?;

    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((last, path)) = parts.split_last() else {
        bail!("Empty configuration key");
    };

    let mut table = root
        .as_table_mut()
        .context("Configuration root is not a table")?;
    for part in path {
        table = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::map::Map::new()))
            .as_table_mut()
            .with_context(|| format!("'{}' is not a section", part))?;
    }

    table.insert(last.to_string(), parse_value(value));

    let updated: Settings = root
        .try_into()
        .with_context(|| format!("Invalid value for {}: {}", key, value))?;
    Ok(updated)
}

fn parse_value(raw: &str) -> toml::Value {
    let wrapped = format!("v = {}", raw);
    match toml::from_str::<toml::Table>(&wrapped) {
        Ok(mut table) => table
            .remove("v")
            .unwrap_or_else(|| toml::Value::String(raw.to_string())),
        Err(_) => toml::Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;

    #[test]
    fn test_set_nested_values() {
        let settings = Settings::default();

        let updated = set_value(&settings, "llm.provider", "openai").unwrap();
        assert_eq!(updated.llm.provider, LlmProvider::OpenAi);

        let updated = set_value(&updated, "tasks.summarize.chunk_size", "2000").unwrap();
        assert_eq!(updated.tasks.summarize.chunk_size, 2000);

        let updated = set_value(&updated, "llm.model", "gpt-4o").unwrap();
        assert_eq!(updated.llm.model.as_deref(), Some("gpt-4o"));
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let settings = Settings::default();
        assert!(set_value(&settings, "llm.provider", "mistral").is_err());
        assert!(set_value(&settings, "pipeline.max_retries", "many").is_err());
        assert!(set_value(&settings, "", "x").is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), toml::Value::Integer(42));
        assert_eq!(parse_value("true"), toml::Value::Boolean(true));
        assert_eq!(parse_value("groq"), toml::Value::String("groq".to_string()));
        assert_eq!(parse_value("\"quoted\""), toml::Value::String("quoted".to_string()));
    }

    #[test]
    fn test_set_saves_to_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let action = ConfigAction::Set {
            key: "search.max_results".to_string(),
            value: "9".to_string(),
        };

        run_config(&action, Settings::default(), Some(path.clone())).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.search.max_results, 9);
    }
}
