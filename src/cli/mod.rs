//! CLI module for Recap.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Recap - YouTube summaries, translations and study notes
///
/// Fetches a video's transcript and reduces it with an LLM, chunk by chunk,
/// into a summary in the video's own language, a translation or structured notes.
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// LLM provider to use (openai, groq, ollama)
    #[arg(long, global = true, env = "RECAP_PROVIDER")]
    pub provider: Option<String>,

    /// Model to use (defaults to the provider's default)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check system requirements and configuration
    Doctor,

    /// Summarize a YouTube video in the language it is spoken in
    Summarize {
        /// YouTube URL or video ID
        url: String,

        /// Also translate the summary into this language
        #[arg(short, long)]
        translate: Option<String>,

        /// Also generate structured study notes
        #[arg(short, long)]
        notes: bool,

        /// Language for the notes (defaults to the translation language, else English)
        #[arg(long, requires = "notes")]
        notes_language: Option<String>,

        /// Also search for related videos
        #[arg(short, long)]
        recommend: bool,

        /// Export everything to a file (name without extension; "-" for a generated name)
        #[arg(short, long)]
        output: Option<String>,

        /// Export format (txt, md)
        #[arg(long, default_value = "txt")]
        format: String,
    },

    /// Translate text into another language
    Translate {
        /// Target language, e.g. "French"
        #[arg(short, long)]
        to: String,

        /// Text to translate
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file ("-" for stdin)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Generate structured study notes for a YouTube video
    Notes {
        /// YouTube URL or video ID
        url: String,

        /// Language to write the notes in
        #[arg(short, long, default_value = "English")]
        language: String,
    },

    /// Find videos related to a topic or summary
    Recommend {
        /// Search query
        #[arg(short, long, conflicts_with = "from_summary")]
        query: Option<String>,

        /// Derive the query from a summary text file ("-" for stdin)
        #[arg(long)]
        from_summary: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Start HTTP API server for integration with other systems
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "llm.provider" or "tasks.summarize.chunk_size")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
