//! Prompt templates for Recap.
//!
//! Every task has a `map` template (applied to each chunk of the source text)
//! and a `combine` template (applied to joined partial results). Templates use
//! `{{name}}` placeholders; `{{text}}` always receives the text being processed.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompts {
    pub summarize: TaskPrompts,
    pub translate: TaskPrompts,
    pub notes: TaskPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Map and combine templates for one task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskPrompts {
    pub map: String,
    pub combine: String,
}

/// Prompt overrides read from a custom prompt file. Missing keys keep the default.
#[derive(Debug, Default, Deserialize)]
struct TaskPromptOverrides {
    map: Option<String>,
    combine: Option<String>,
}

impl TaskPrompts {
    fn apply(&mut self, overrides: TaskPromptOverrides) {
        if let Some(map) = overrides.map {
            self.map = map;
        }
        if let Some(combine) = overrides.combine {
            self.combine = combine;
        }
    }

    fn default_summarize() -> Self {
        Self {
            map: r#"Provide a detailed summary of the following content section. Capture all key points, important details, and main ideas.

Write the summary in the same language as the content. Do not translate it.

{{text}}

DETAILED SUMMARY:"#
                .to_string(),

            combine: r#"You are given multiple summaries from different sections of a video, in order. Combine them into one comprehensive, well-structured summary.

The final summary should:
- Be proportional to the total content length and importance
- Maintain logical flow and the original order of the sections
- Capture all essential information from all sections
- Include important examples, statistics, or quotes when relevant
- Be organized and easy to read
- Be written in the same language as the section summaries, without translating them

Section summaries:
{{text}}

FINAL COMPREHENSIVE SUMMARY:"#
                .to_string(),
        }
    }

    fn default_translate() -> Self {
        Self {
            map: r#"Translate the following text to {{target_language}} naturally and accurately. Preserve the meaning, tone, and structure. Reply with the translation only.

{{text}}"#
                .to_string(),

            combine: r#"The following {{target_language}} text was translated section by section. Merge it into one fluent, coherent {{target_language}} text. Keep every point and the original order; do not summarize or add commentary. Reply with the merged text only.

{{text}}"#
                .to_string(),
        }
    }

    fn default_notes() -> Self {
        Self {
            map: r#"Extract key information from the following content section IN {{language}}.
List the main topics, important points, and insights.

Content:
{{text}}

Key information:"#
                .to_string(),

            combine: r#"From the information provided below, create detailed, structured study notes IN {{language}}.

**Strictly adhere to the following formatting rules, using Markdown for headings and lists.**
**All content must be written in {{language}}.**

# 🔑 {{key_topics}}
* List 3-5 main topics covered.

# 💡 {{main_takeaways}}
* List 3 concise, most important takeaways.

# 📝 {{detailed_insights}}
1. Use numbered list for detailed insights, explaining each point in a complete sentence.
2. Ensure at least 4 detailed insights are provided.

# 🚀 {{actionable_steps}}
* List 2-3 specific actions a user can take based on the video content.

Generate the result in a proper format, entirely in {{language}}.
---

Information to organize:
{{text}}"#
                .to_string(),
        }
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            summarize: TaskPrompts::default_summarize(),
            translate: TaskPrompts::default_translate(),
            notes: TaskPrompts::default_notes(),
            variables: HashMap::new(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            if let Some(overrides) = read_overrides(&custom_path.join("summarize.toml"))? {
                prompts.summarize.apply(overrides);
            }
            if let Some(overrides) = read_overrides(&custom_path.join("translate.toml"))? {
                prompts.translate.apply(overrides);
            }
            if let Some(overrides) = read_overrides(&custom_path.join("notes.toml"))? {
                prompts.notes.apply(overrides);
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

fn read_overrides(path: &Path) -> crate::error::Result<Option<TaskPromptOverrides>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts_have_text_placeholder() {
        let prompts = Prompts::default();
        for task in [&prompts.summarize, &prompts.translate, &prompts.notes] {
            assert!(task.map.contains("{{text}}"));
            assert!(task.combine.contains("{{text}}"));
        }
        assert!(prompts.translate.map.contains("{{target_language}}"));
    }

    #[test]
    fn test_summarize_prompts_preserve_language() {
        let prompts = Prompts::default();
        assert!(prompts.summarize.map.contains("same language"));
        assert!(prompts.summarize.combine.contains("same language"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_provided_vars_override_custom_vars() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("audience".to_string(), "students".to_string());
        prompts.variables.insert("text".to_string(), "ignored".to_string());

        let mut vars = HashMap::new();
        vars.insert("text".to_string(), "body".to_string());

        let rendered = prompts.render_with_custom("For {{audience}}: {{text}}", &vars);
        assert_eq!(rendered, "For students: body");
    }

    #[test]
    fn test_custom_dir_overrides_single_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("summarize.toml"),
            "map = \"Summarize briefly: {{text}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.summarize.map, "Summarize briefly: {{text}}");
        assert_eq!(
            prompts.summarize.combine,
            TaskPrompts::default_summarize().combine
        );
        assert_eq!(prompts.notes, TaskPrompts::default_notes());
    }
}
