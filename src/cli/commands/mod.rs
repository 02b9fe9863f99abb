//! CLI command implementations.

mod config;
mod doctor;
mod notes;
mod recommend;
mod serve;
mod summarize;
mod translate;

pub use config::run_config;
pub use doctor::run_doctor;
pub use notes::run_notes;
pub use recommend::run_recommend;
pub use serve::run_serve;
pub use summarize::{run_summarize, SummarizeExtras};
pub use translate::run_translate;
