//! Sequential per-chunk generation.

use super::{Chunk, RetryPolicy, TaskSpec, TemplateKind};
use crate::config::PipelineSettings;
use crate::error::{RecapError, Result};
use crate::llm::TextGenerator;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Applies one template to a sequence of chunks, one call at a time.
///
/// Calls run strictly in chunk order with a fixed pause between them, so
/// output `i` always corresponds to chunk `i`.
#[derive(Clone)]
pub struct SegmentProcessor {
    generator: Arc<dyn TextGenerator>,
    retry: RetryPolicy,
    inter_call_delay: Duration,
    progress: Option<ProgressBar>,
}

impl SegmentProcessor {
    pub fn new(generator: Arc<dyn TextGenerator>, retry: RetryPolicy, inter_call_delay: Duration) -> Self {
        Self {
            generator,
            retry,
            inter_call_delay,
            progress: None,
        }
    }

    pub fn from_settings(generator: Arc<dyn TextGenerator>, settings: &PipelineSettings) -> Self {
        Self::new(
            generator,
            RetryPolicy::from_settings(settings),
            Duration::from_millis(settings.inter_call_delay_ms),
        )
    }

    /// Report every generation call on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Run `kind` over every chunk and return the trimmed outputs in chunk order.
    ///
    /// The first failure aborts the run; later chunks are not attempted.
    pub async fn process(
        &self,
        spec: &TaskSpec,
        kind: TemplateKind,
        chunks: &[Chunk],
    ) -> Result<Vec<String>> {
        self.start_step(spec, kind, chunks.len());

        let mut outputs = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            if chunk.index > 0 && !self.inter_call_delay.is_zero() {
                tokio::time::sleep(self.inter_call_delay).await;
            }
            let output = self
                .call(spec, kind, &chunk.text, chunk.index, chunks.len())
                .await?;
            outputs.push(output);
        }
        Ok(outputs)
    }

    /// Single call over the whole text, used for short inputs and final merges.
    pub async fn generate_once(&self, spec: &TaskSpec, kind: TemplateKind, text: &str) -> Result<String> {
        self.start_step(spec, kind, 1);
        self.call(spec, kind, text, 0, 1).await
    }

    async fn call(
        &self,
        spec: &TaskSpec,
        kind: TemplateKind,
        text: &str,
        chunk_index: usize,
        chunk_count: usize,
    ) -> Result<String> {
        let prompt = spec.render(kind, text);
        debug!(
            "{} {} call {}/{} ({} chars)",
            spec.task(),
            kind,
            chunk_index + 1,
            chunk_count,
            prompt.len()
        );

        let result = self.retry.run(|| self.generator.generate(&prompt)).await;

        if let Some(pb) = &self.progress {
            pb.inc(1);
        }

        result
            .map(|text| text.trim().to_string())
            .map_err(|source| RecapError::Generation {
                task: spec.task(),
                step: kind,
                chunk_index,
                chunk_count,
                source,
            })
    }

    fn start_step(&self, spec: &TaskSpec, kind: TemplateKind, calls: usize) {
        if let Some(pb) = &self.progress {
            pb.inc_length(calls as u64);
            pb.set_message(format!("{} {}", spec.task(), kind));
        }
    }
}
