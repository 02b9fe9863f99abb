//! Recap - YouTube summaries, translations and study notes
//!
//! Fetches a video's transcript and reduces it with an LLM into a summary in
//! the video's own language, a translation, or structured study notes.
//!
//! # Overview
//!
//! Recap allows you to:
//! - Summarize YouTube videos of any length
//! - Translate summaries (or any text) into another language
//! - Generate structured notes with localized headings
//! - Find related videos from a summary
//! - Export a session to text or Markdown
//!
//! Long inputs are split into chunks, each chunk is processed separately and
//! the partial results are combined until they fit in a single call.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `llm` - Text generation providers (OpenAI, Groq, Ollama)
//! - `pipeline` - Chunking, retries and hierarchical reduction
//! - `transcript` - Transcript retrieval through yt-dlp
//! - `notes` - Localized note headings and cleanup
//! - `search` - Related-video search
//! - `session` - Per-user working state and export
//! - `orchestrator` - Coordinates the above for each operation
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::Settings;
//! use recap::orchestrator::Orchestrator;
//! use recap::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!     let mut session = Session::new();
//!
//!     let summary = orchestrator
//!         .summarize_video(&mut session, "https://youtu.be/dQw4w9WgXcQ")
//!         .await?;
//!     println!("{}", summary.text);
//!
//!     let notes = orchestrator.notes(&mut session, Some("French")).await?;
//!     println!("{}", notes);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod notes;
pub mod orchestrator;
pub mod pipeline;
pub mod search;
pub mod session;
pub mod transcript;

pub use error::{RecapError, Result};
