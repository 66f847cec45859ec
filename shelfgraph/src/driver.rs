//! Top-level driver: URL batches and the "more URLs" prompt
//!
//! Each URL is an independent pipeline run. A failing URL is reported and
//! the batch moves on to the next one.

use crate::extract::extract;
use crate::input::LineSource;
use crate::models::{Cutoff, EntityKind, PipelineRequest, SortMode};
use crate::pipeline::load_records;
use crate::render::ChartRenderer;
use crate::services::CatalogService;
use crate::visualize::{LoopOutcome, VisualizationLoop};
use shelfgraph_common::Result;
use tracing::{error, info, warn};

pub const MORE_URLS_PROMPT: &str = "Enter some more urls separated by spaces (Enter to cancel): ";

/// Settings shared by every URL of a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverOptions {
    pub kind: EntityKind,
    pub cutoff: Cutoff,
    pub sort_mode: SortMode,
    pub min_ratings_count: i64,
    pub interactive_cutoff: bool,
    pub interactive_more_urls: bool,
    pub fetch_concurrency: usize,
}

impl DriverOptions {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            cutoff: Cutoff::UNLIMITED,
            sort_mode: SortMode::PopularityOrder,
            min_ratings_count: 1,
            interactive_cutoff: false,
            interactive_more_urls: false,
            fetch_concurrency: 1,
        }
    }
}

/// Per-URL results of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    fn absorb(&mut self, other: BatchSummary) {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptState {
    AwaitUrls,
    Batch(Vec<String>),
    Done,
}

/// Runs pipelines for URLs against injected boundaries
pub struct Driver<'a> {
    service: &'a dyn CatalogService,
    renderer: &'a mut dyn ChartRenderer,
    input: &'a mut dyn LineSource,
    options: DriverOptions,
}

impl<'a> Driver<'a> {
    pub fn new(
        service: &'a dyn CatalogService,
        renderer: &'a mut dyn ChartRenderer,
        input: &'a mut dyn LineSource,
        options: DriverOptions,
    ) -> Self {
        Self {
            service,
            renderer,
            input,
            options,
        }
    }

    /// Process `urls`, then keep prompting for more if enabled
    pub async fn run(&mut self, urls: &[String]) -> BatchSummary {
        let mut summary = self.run_batch(urls).await;

        if !self.options.interactive_more_urls {
            return summary;
        }

        let mut state = PromptState::AwaitUrls;
        while state != PromptState::Done {
            state = match state {
                PromptState::AwaitUrls => match self.input.next_line(MORE_URLS_PROMPT) {
                    Ok(Some(line)) if !line.trim().is_empty() => {
                        PromptState::Batch(line.split_whitespace().map(str::to_string).collect())
                    }
                    Ok(_) => PromptState::Done,
                    Err(e) => {
                        warn!("Reading URLs failed, stopping: {}", e);
                        PromptState::Done
                    }
                },
                PromptState::Batch(urls) => {
                    summary.absorb(self.run_batch(&urls).await);
                    PromptState::AwaitUrls
                }
                PromptState::Done => PromptState::Done,
            };
        }

        summary
    }

    async fn run_batch(&mut self, urls: &[String]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for url in urls {
            match self.run_url(url).await {
                Ok(outcome) => {
                    info!(url = %url, renders = outcome.renders, "Finished");
                    summary.succeeded += 1;
                }
                Err(e) => {
                    error!(url = %url, "Skipping URL: {}", e);
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Run the whole pipeline for one URL
    pub async fn run_url(&mut self, url: &str) -> Result<LoopOutcome> {
        let entity = extract(url, self.options.kind)?;
        let request = PipelineRequest {
            entity,
            cutoff: self.options.cutoff,
            sort_mode: self.options.sort_mode,
            min_ratings_count: self.options.min_ratings_count,
        };

        info!(entity = %entity, "Loading works");
        let records = load_records(self.service, &request, self.options.fetch_concurrency).await?;

        VisualizationLoop::new(&records, request, self.options.interactive_cutoff)
            .run(&mut *self.renderer, &mut *self.input)
    }
}
