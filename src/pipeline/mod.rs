//! Chunked hierarchical text reduction.
//!
//! The same pipeline backs summaries, translations and study notes:
//!
//! 1. Inputs shorter than the task's direct threshold get one generation call.
//! 2. Longer inputs are split into fixed-size chunks and each chunk is mapped
//!    through the task's `map` template, sequentially and in order.
//! 3. The joined partial results are merged with the `combine` template,
//!    re-chunking and combining again while the result stays too long.
//!
//! Rate-limited calls are retried by [`RetryPolicy`]; every other failure
//! aborts the run with the task name and failing chunk attached.

mod chunker;
mod processor;
mod reducer;
mod retry;

pub use chunker::{char_len, chunk, Chunk};
pub use processor::SegmentProcessor;
pub use reducer::{HierarchicalReducer, Reduction};
pub use retry::RetryPolicy;

use crate::config::{Prompts, Settings, TaskLimits, TaskPrompts};
use crate::error::{RecapError, Result};
use crate::notes::NoteHeadings;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of work a pipeline run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Summarize,
    Translate,
    Notes,
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Task::Summarize => write!(f, "summarize"),
            Task::Translate => write!(f, "translate"),
            Task::Notes => write!(f, "notes"),
        }
    }
}

impl std::str::FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summarize" | "summary" => Ok(Task::Summarize),
            "translate" | "translation" => Ok(Task::Translate),
            "notes" => Ok(Task::Notes),
            _ => Err(format!("Unknown task: {}", s)),
        }
    }
}

/// Which of a task's two templates to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    /// First pass over each chunk of the source text.
    Map,
    /// Merge of joined partial results.
    Combine,
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateKind::Map => write!(f, "map"),
            TemplateKind::Combine => write!(f, "combine"),
        }
    }
}

/// Everything one pipeline run needs to know about its task.
///
/// Immutable once built; construct one per invocation.
#[derive(Debug, Clone)]
pub struct TaskSpec {
    task: Task,
    templates: TaskPrompts,
    short_input: TemplateKind,
    params: HashMap<String, String>,
    limits: TaskLimits,
}

impl TaskSpec {
    pub fn new(task: Task, templates: TaskPrompts, limits: TaskLimits) -> Self {
        Self {
            task,
            templates,
            short_input: TemplateKind::Map,
            params: HashMap::new(),
            limits,
        }
    }

    /// Add a named template parameter, e.g. `target_language`.
    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    /// Add custom variables. Parameters already set take precedence.
    pub fn with_variables(mut self, variables: &HashMap<String, String>) -> Self {
        for (key, value) in variables {
            self.params
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    /// Choose the template used when the input is below the direct threshold.
    pub fn with_short_input(mut self, kind: TemplateKind) -> Self {
        self.short_input = kind;
        self
    }

    /// Summary in the language of the source content.
    pub fn summarize(settings: &Settings, prompts: &Prompts) -> Self {
        Self::new(
            Task::Summarize,
            prompts.summarize.clone(),
            settings.tasks.summarize,
        )
        .with_variables(&prompts.variables)
    }

    /// Translation into `target_language`.
    pub fn translate(settings: &Settings, prompts: &Prompts, target_language: &str) -> Self {
        Self::new(
            Task::Translate,
            prompts.translate.clone(),
            settings.tasks.translate,
        )
        .with_param("target_language", target_language)
        .with_variables(&prompts.variables)
    }

    /// Structured study notes written in `language`.
    ///
    /// Short inputs go straight to the notes layout (the combine template).
    pub fn notes(settings: &Settings, prompts: &Prompts, language: &str) -> Self {
        let headings = NoteHeadings::for_language(language);
        Self::new(Task::Notes, prompts.notes.clone(), settings.tasks.notes)
            .with_param("language", language)
            .with_param("key_topics", headings.key_topics)
            .with_param("main_takeaways", headings.main_takeaways)
            .with_param("detailed_insights", headings.detailed_insights)
            .with_param("actionable_steps", headings.actionable_steps)
            .with_variables(&prompts.variables)
            .with_short_input(TemplateKind::Combine)
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn limits(&self) -> TaskLimits {
        self.limits
    }

    pub fn short_input(&self) -> TemplateKind {
        self.short_input
    }

    pub fn template(&self, kind: TemplateKind) -> &str {
        match kind {
            TemplateKind::Map => &self.templates.map,
            TemplateKind::Combine => &self.templates.combine,
        }
    }

    /// Render a template for `text`.
    ///
    /// Parameters are substituted before the text so placeholder-like
    /// sequences inside the text are left alone.
    pub fn render(&self, kind: TemplateKind, text: &str) -> String {
        Prompts::render(self.template(kind), &self.params).replace("{{text}}", text)
    }

    /// Check the size constants.
    pub fn validate(&self) -> Result<()> {
        let TaskLimits {
            direct_threshold,
            chunk_size,
        } = self.limits;
        if chunk_size == 0 {
            return Err(RecapError::Config(format!(
                "{}: chunk_size must be greater than zero",
                self.task
            )));
        }
        if chunk_size >= direct_threshold {
            return Err(RecapError::Config(format!(
                "{}: chunk_size ({}) must be smaller than direct_threshold ({})",
                self.task, chunk_size, direct_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory generator for pipeline tests.

    use crate::llm::{LlmError, TextGenerator};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    type Responder = Box<dyn Fn(usize, &str) -> Result<String, LlmError> + Send + Sync>;

    /// Records every prompt and answers through a closure of (call index, prompt).
    pub(crate) struct ScriptedGenerator {
        prompts: Mutex<Vec<String>>,
        responder: Responder,
    }

    impl ScriptedGenerator {
        pub(crate) fn new(
            responder: impl Fn(usize, &str) -> Result<String, LlmError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                responder: Box::new(responder),
            })
        }

        /// Always answers with `reply`.
        pub(crate) fn constant(reply: &str) -> Arc<Self> {
            let reply = reply.to_string();
            Self::new(move |_, _| Ok(reply.clone()))
        }

        pub(crate) fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            let index = {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                prompts.len() - 1
            };
            (self.responder)(index, prompt)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_spec() -> TaskSpec {
        TaskSpec::new(
            Task::Translate,
            TaskPrompts {
                map: "MAP[{{target_language}}]:{{text}}".to_string(),
                combine: "COMBINE:{{text}}".to_string(),
            },
            TaskLimits {
                direct_threshold: 2000,
                chunk_size: 1200,
            },
        )
        .with_param("target_language", "French")
    }

    #[test]
    fn test_task_parse_and_display() {
        assert_eq!("Summary".parse::<Task>().unwrap(), Task::Summarize);
        assert_eq!("notes".parse::<Task>().unwrap(), Task::Notes);
        assert!("quiz".parse::<Task>().is_err());
        assert_eq!(Task::Translate.to_string(), "translate");
        assert_eq!(TemplateKind::Combine.to_string(), "combine");
    }

    #[test]
    fn test_render_substitutes_params_and_text() {
        let spec = tagged_spec();
        assert_eq!(spec.render(TemplateKind::Map, "bonjour"), "MAP[French]:bonjour");
        assert_eq!(spec.render(TemplateKind::Combine, "x"), "COMBINE:x");
    }

    #[test]
    fn test_render_leaves_placeholders_in_text_alone() {
        let spec = tagged_spec();
        let rendered = spec.render(TemplateKind::Map, "literal {{target_language}}");
        assert_eq!(rendered, "MAP[French]:literal {{target_language}}");
    }

    #[test]
    fn test_validate_limits() {
        assert!(tagged_spec().validate().is_ok());

        let bad = TaskSpec::new(
            Task::Summarize,
            Prompts::default().summarize,
            TaskLimits {
                direct_threshold: 1000,
                chunk_size: 1000,
            },
        );
        assert!(matches!(bad.validate(), Err(RecapError::Config(_))));

        let zero = TaskSpec::new(
            Task::Summarize,
            Prompts::default().summarize,
            TaskLimits {
                direct_threshold: 1000,
                chunk_size: 0,
            },
        );
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_builders_use_configured_limits() {
        let settings = Settings::default();
        let prompts = Prompts::default();

        let summarize = TaskSpec::summarize(&settings, &prompts);
        assert_eq!(summarize.limits(), settings.tasks.summarize);
        assert_eq!(summarize.short_input(), TemplateKind::Map);

        let translate = TaskSpec::translate(&settings, &prompts, "German");
        assert_eq!(translate.limits().chunk_size, 1200);
        assert!(translate.render(TemplateKind::Map, "hi").contains("to German"));

        let notes = TaskSpec::notes(&settings, &prompts, "French");
        assert_eq!(notes.short_input(), TemplateKind::Combine);
        let rendered = notes.render(TemplateKind::Combine, "content");
        assert!(rendered.contains("Sujets Clés"));
        assert!(rendered.contains("IN French"));
        assert!(rendered.ends_with("content"));
    }

    #[test]
    fn test_custom_variables_do_not_override_task_params() {
        let settings = Settings::default();
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("target_language".to_string(), "Klingon".to_string());
        prompts.translate.map = "{{target_language}} for {{audience}}: {{text}}".to_string();
        prompts
            .variables
            .insert("audience".to_string(), "kids".to_string());

        let spec = TaskSpec::translate(&settings, &prompts, "Spanish");
        assert_eq!(spec.render(TemplateKind::Map, "t"), "Spanish for kids: t");
    }
}
