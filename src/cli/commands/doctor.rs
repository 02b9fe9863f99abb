//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{LlmProvider, Prompts, Settings};
use crate::llm::validate_api_key;
use crate::pipeline::TaskSpec;
use console::style;
use std::process::Command;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_group(title: &str, group: Vec<CheckResult>, checks: &mut Vec<CheckResult>) {
    println!("{}", style(title).bold());
    for check in &group {
        check.print();
    }
    println!();
    checks.extend(group);
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Recap Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    print_group(
        "External Tools",
        vec![check_tool(&settings.transcript.ytdlp_path)],
        &mut checks,
    );
    print_group("LLM Provider", check_provider(settings).await, &mut checks);
    print_group("Pipeline", check_pipeline(settings), &mut checks);
    print_group("Configuration", check_config(settings), &mut checks);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Recap.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Recap is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> CheckResult {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();
            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", install_hint_ytdlp()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", install_hint_ytdlp())
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), install_hint_ytdlp()),
    }
}

/// Check provider, model and credentials.
async fn check_provider(settings: &Settings) -> Vec<CheckResult> {
    let llm = &settings.llm;
    let mut results = vec![CheckResult::ok(
        "Provider",
        &format!("{} ({}, {})", llm.provider, llm.model_name(), llm.base_url()),
    )];

    if let Some(var) = llm.api_key_env() {
        results.push(check_api_key(llm.provider, &var, std::env::var(&var).ok()));
    }

    if llm.provider == LlmProvider::Ollama {
        results.push(check_ollama(&llm.base_url()).await);
    }

    results
}

fn check_api_key(provider: LlmProvider, var: &str, value: Option<String>) -> CheckResult {
    let hint = format!("Set with: export {}='...'", var);
    match value {
        None => CheckResult::error(var, "not set", &hint),
        Some(key) if key.trim().is_empty() => CheckResult::error(var, "empty", &hint),
        Some(key) => match validate_api_key(provider, &key) {
            Ok(()) => CheckResult::ok(var, &format!("configured ({})", mask_key(key.trim()))),
            Err(e) => CheckResult::error(var, &e.to_string(), &hint),
        },
    }
}

async fn check_ollama(base_url: &str) -> CheckResult {
    let url = format!("{}/api/tags", base_url.trim_end_matches('/'));
    let client = match reqwest::Client::builder().timeout(Duration::from_secs(3)).build() {
        Ok(client) => client,
        Err(e) => return CheckResult::error("Ollama", &e.to_string(), "Check your TLS setup"),
    };
    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => CheckResult::ok("Ollama", "reachable"),
        Ok(response) => CheckResult::warning(
            "Ollama",
            &format!("answered with HTTP {}", response.status().as_u16()),
            "Check llm.base_url",
        ),
        Err(_) => CheckResult::error(
            "Ollama",
            &format!("not reachable at {}", base_url),
            "Start it with: ollama serve",
        ),
    }
}

/// Check the size constants of every task.
fn check_pipeline(settings: &Settings) -> Vec<CheckResult> {
    let prompts = Prompts::default();
    let specs = [
        TaskSpec::summarize(settings, &prompts),
        TaskSpec::translate(settings, &prompts, "English"),
        TaskSpec::notes(settings, &prompts, "English"),
    ];

    let mut results: Vec<CheckResult> = specs
        .iter()
        .map(|spec| {
            let name = format!("tasks.{}", spec.task());
            let limits = spec.limits();
            match spec.validate() {
                Ok(()) => CheckResult::ok(
                    &name,
                    &format!(
                        "direct below {} chars, chunks of {}",
                        limits.direct_threshold, limits.chunk_size
                    ),
                ),
                Err(e) => CheckResult::error(
                    &name,
                    &e.to_string(),
                    "chunk_size must be above zero and below direct_threshold",
                ),
            }
        })
        .collect();

    let pipeline = &settings.pipeline;
    if pipeline.max_combine_rounds == 0 {
        results.push(CheckResult::warning(
            "pipeline.max_combine_rounds",
            "0 (treated as 1)",
            "Set it to 1 or more",
        ));
    }
    results
}

/// Check config file, prompt directory and export directory.
fn check_config(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        results.push(CheckResult::ok("Config file", &config_path.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: recap config edit",
        ));
    }

    if let Some(dir) = &settings.prompts.custom_dir {
        let path = Settings::expand_path(dir);
        match Prompts::load(Some(dir), None) {
            Ok(_) if path.is_dir() => {
                results.push(CheckResult::ok("Custom prompts", &path.display().to_string()))
            }
            Ok(_) => results.push(CheckResult::warning(
                "Custom prompts",
                &format!("{} does not exist", path.display()),
                "Defaults are used",
            )),
            Err(e) => results.push(CheckResult::error(
                "Custom prompts",
                &e.to_string(),
                "Fix the TOML syntax in the prompt files",
            )),
        }
    }

    let export_dir = settings.export_dir();
    if export_dir.is_dir() {
        results.push(CheckResult::ok("Export directory", &export_dir.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Export directory",
            &format!("{} (will be created)", export_dir.display()),
            "Directory will be created on first export",
        ));
    }

    results
}

/// Show only the ends of a secret.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TaskLimits;

    #[test]
    fn test_check_result_error() {
        let result = CheckResult::error("test", "failed", "fix it");
        assert_eq!(result.status, CheckStatus::Error);
        assert_eq!(result.hint, Some("fix it".to_string()));
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("gsk_1234567890abcdef"), "gsk_...cdef");
        assert_eq!(mask_key("short"), "****");
    }

    #[test]
    fn test_check_api_key() {
        let ok = check_api_key(LlmProvider::Groq, "GROQ_API_KEY", Some("gsk_1234567890abcdef".into()));
        assert_eq!(ok.status, CheckStatus::Ok);

        let bad = check_api_key(LlmProvider::Groq, "GROQ_API_KEY", Some("sk-1234567890".into()));
        assert_eq!(bad.status, CheckStatus::Error);

        let missing = check_api_key(LlmProvider::OpenAi, "OPENAI_API_KEY", None);
        assert_eq!(missing.message, "not set");
    }

    #[test]
    fn test_check_pipeline_flags_bad_limits() {
        let mut settings = Settings::default();
        assert!(check_pipeline(&settings)
            .iter()
            .all(|c| c.status == CheckStatus::Ok));

        settings.tasks.notes = TaskLimits {
            direct_threshold: 500,
            chunk_size: 900,
        };
        let results = check_pipeline(&settings);
        let notes = results.iter().find(|c| c.name == "tasks.notes").unwrap();
        assert_eq!(notes.status, CheckStatus::Error);
    }
}
