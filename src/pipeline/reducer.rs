//! Map then combine, with bounded re-combination of oversized results.

use super::{char_len, chunk, SegmentProcessor, TaskSpec, TemplateKind};
use crate::config::PipelineSettings;
use crate::error::Result;
use crate::llm::TextGenerator;
use indicatif::ProgressBar;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A combine round must shorten the text by at least this share, in percent,
/// for another round to run.
const MIN_ROUND_SHRINK_PERCENT: usize = 5;

/// Outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    /// Final text, trimmed.
    pub text: String,
    /// Number of generation requests made, retries excluded.
    pub generation_calls: usize,
    /// Number of re-chunk and combine rounds after the map step.
    pub combine_rounds: usize,
}

impl Reduction {
    fn empty() -> Self {
        Self {
            text: String::new(),
            generation_calls: 0,
            combine_rounds: 0,
        }
    }
}

/// Drives the chunk, map and combine steps for any [`TaskSpec`].
pub struct HierarchicalReducer {
    processor: SegmentProcessor,
    max_combine_rounds: usize,
}

impl HierarchicalReducer {
    pub fn new(processor: SegmentProcessor, max_combine_rounds: usize) -> Self {
        Self {
            processor,
            max_combine_rounds: max_combine_rounds.max(1),
        }
    }

    pub fn from_settings(generator: Arc<dyn TextGenerator>, settings: &PipelineSettings) -> Self {
        Self::new(
            SegmentProcessor::from_settings(generator, settings),
            settings.max_combine_rounds as usize,
        )
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.processor = self.processor.with_progress(progress);
        self
    }

    /// Reduce `text` and return only the final text.
    pub async fn run(&self, spec: &TaskSpec, text: &str) -> Result<String> {
        Ok(self.reduce(spec, text).await?.text)
    }

    /// Reduce `text` according to `spec`.
    ///
    /// Blank input yields empty output without any generation call. Input
    /// below the direct threshold is handled in one call. Otherwise every
    /// chunk is mapped, and the joined results are combined once if short
    /// enough, or re-chunked and combined in rounds until they are. Rounds
    /// stop early once one no longer shortens the text noticeably.
    #[instrument(skip(self, spec, text), fields(task = %spec.task(), input_len = char_len(text)))]
    pub async fn reduce(&self, spec: &TaskSpec, text: &str) -> Result<Reduction> {
        spec.validate()?;
        let limits = spec.limits();

        if text.trim().is_empty() {
            return Ok(Reduction::empty());
        }

        if char_len(text) < limits.direct_threshold {
            let output = self
                .processor
                .generate_once(spec, spec.short_input(), text)
                .await?;
            return Ok(Reduction {
                text: output,
                generation_calls: 1,
                combine_rounds: 0,
            });
        }

        let chunks = chunk(text, limits.chunk_size)?;
        info!("{}: mapping {} chunks", spec.task(), chunks.len());
        let mut calls = chunks.len();
        let partials = self.processor.process(spec, TemplateKind::Map, &chunks).await?;
        let mut combined = partials.join("\n\n");

        if combined.trim().is_empty() {
            return Ok(Reduction {
                text: String::new(),
                generation_calls: calls,
                combine_rounds: 0,
            });
        }

        if char_len(&combined) <= limits.direct_threshold {
            let output = self
                .processor
                .generate_once(spec, TemplateKind::Combine, &combined)
                .await?;
            return Ok(Reduction {
                text: output,
                generation_calls: calls + 1,
                combine_rounds: 0,
            });
        }

        let mut rounds = 0;
        loop {
            let previous_len = char_len(&combined);
            let chunks = chunk(&combined, limits.chunk_size)?;
            info!(
                "{}: combine round {} over {} chunks",
                spec.task(),
                rounds + 1,
                chunks.len()
            );
            calls += chunks.len();
            let merged = self
                .processor
                .process(spec, TemplateKind::Combine, &chunks)
                .await?;
            combined = merged.join(" ").trim().to_string();
            rounds += 1;

            let len = char_len(&combined);
            if len <= limits.direct_threshold {
                break;
            }
            if len * 100 > previous_len * (100 - MIN_ROUND_SHRINK_PERCENT) {
                warn!(
                    "{}: combine round {} barely shortened the text ({} -> {} chars), returning as is",
                    spec.task(),
                    rounds,
                    previous_len,
                    len
                );
                break;
            }
            if rounds >= self.max_combine_rounds {
                warn!(
                    "{}: result still {} chars after {} combine rounds, returning as is",
                    spec.task(),
                    char_len(&combined),
                    rounds
                );
                break;
            }
        }

        Ok(Reduction {
            text: combined,
            generation_calls: calls,
            combine_rounds: rounds,
        })
    }
}
