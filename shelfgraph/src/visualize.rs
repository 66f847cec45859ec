//! Render / re-cutoff loop
//!
//! State machine:
//! - `Render`: rank the loaded records under the current cutoff and draw them
//! - `AwaitCutoff`: read a new cutoff (only when interactive cutoff is on)
//! - `Done`: hand control back to the driver
//!
//! An empty line, end of input, `0`, or anything that is not an integer
//! cancels; any other integer becomes the new cutoff.

use crate::input::LineSource;
use crate::models::{Cutoff, EntityKind, PipelineRequest, SortMode, WorkRecord};
use crate::pipeline::rank;
use crate::render::ChartRenderer;
use shelfgraph_common::Result;
use tracing::{debug, warn};

pub const CUTOFF_PROMPT: &str = "New cut off number (Enter to cancel): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Render,
    AwaitCutoff,
    Done,
}

/// What the loop did before finishing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOutcome {
    pub renders: usize,
    pub final_cutoff: Cutoff,
}

/// Interpret one line typed at the cutoff prompt
///
/// `None` means cancel.
pub fn parse_cutoff_input(line: Option<&str>) -> Option<Cutoff> {
    let value: i64 = line?.trim().parse().ok()?;
    (value != 0).then_some(Cutoff(value))
}

/// Chart title for a request
pub fn chart_title(request: &PipelineRequest) -> String {
    let order = match (request.sort_mode, request.entity.kind) {
        (SortMode::RatingDescending, _) => "sorted by average rating",
        (SortMode::PopularityOrder, EntityKind::Collection) => "in series order",
        (SortMode::PopularityOrder, EntityKind::Author) => "in popularity order",
    };
    let scope = match request.cutoff.limit() {
        Some(n) => format!("top {}", n),
        None => "all works".to_string(),
    };
    format!("{} {}: {} ({})", request.entity.kind, request.entity.id, order, scope)
}

/// Drives rendering of one entity's records until cancelled
pub struct VisualizationLoop<'a> {
    records: &'a [WorkRecord],
    request: PipelineRequest,
    interactive_cutoff: bool,
}

impl<'a> VisualizationLoop<'a> {
    pub fn new(records: &'a [WorkRecord], request: PipelineRequest, interactive_cutoff: bool) -> Self {
        Self {
            records,
            request,
            interactive_cutoff,
        }
    }

    pub fn run(
        &self,
        renderer: &mut dyn ChartRenderer,
        input: &mut dyn LineSource,
    ) -> Result<LoopOutcome> {
        let mut request = self.request;
        let mut renders = 0;
        let mut state = LoopState::Render;

        while state != LoopState::Done {
            state = match state {
                LoopState::Render => {
                    let ranked = rank(self.records, request.sort_mode, request.cutoff);
                    let (labels, ratings) = ranked.series();
                    debug!(entity = %request.entity, cutoff = %request.cutoff, points = ranked.len(), "Rendering");
                    renderer.render_scatter(&chart_title(&request), &labels, &ratings, true)?;
                    renders += 1;

                    if self.interactive_cutoff {
                        LoopState::AwaitCutoff
                    } else {
                        LoopState::Done
                    }
                }
                LoopState::AwaitCutoff => {
                    let line = match input.next_line(CUTOFF_PROMPT) {
                        Ok(line) => line,
                        Err(e) => {
                            warn!("Reading cutoff failed, stopping: {}", e);
                            None
                        }
                    };
                    match parse_cutoff_input(line.as_deref()) {
                        Some(cutoff) => {
                            request = request.with_cutoff(cutoff);
                            LoopState::Render
                        }
                        None => LoopState::Done,
                    }
                }
                LoopState::Done => LoopState::Done,
            };
        }

        Ok(LoopOutcome {
            renders,
            final_cutoff: request.cutoff,
        })
    }
}
