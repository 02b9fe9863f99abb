//! Configuration module for Recap.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, TaskPrompts};
pub use settings::{
    GeneralSettings, LlmProvider, LlmSettings, PipelineSettings, PromptSettings, SearchSettings,
    Settings, TaskLimits, TaskSettings, TranscriptSettings,
};
