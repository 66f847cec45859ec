//! Chart rendering boundary
//!
//! [`ChartRenderer`] receives one scatter series per render. The production
//! renderer writes each chart to its own SVG file.

use plotters::prelude::*;
use shelfgraph_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Highest rating on the catalog's scale
const RATING_SCALE_MAX: f64 = 5.0;

/// Draws a categorical scatter chart
pub trait ChartRenderer {
    /// Render `ratings` against the categories `labels`
    ///
    /// Called even when both sequences are empty. `suppress_x_ticks` hides
    /// the category tick labels.
    fn render_scatter(
        &mut self,
        title: &str,
        labels: &[String],
        ratings: &[f64],
        suppress_x_ticks: bool,
    ) -> Result<()>;
}

/// Writes numbered SVG scatter charts into a directory
pub struct SvgChartRenderer {
    output_dir: PathBuf,
    size: (u32, u32),
    rendered: usize,
    last_path: Option<PathBuf>,
}

impl SvgChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            size: (1280, 720),
            rendered: 0,
            last_path: None,
        }
    }

    /// File written by the most recent render
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }

    fn next_path(&mut self, title: &str) -> PathBuf {
        self.rendered += 1;
        self.output_dir
            .join(format!("{:03}-{}.svg", self.rendered, slug(title)))
    }
}

fn render_error(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}

/// Lowercase file-name-safe form of a chart title
pub fn slug(title: &str) -> String {
    let mut out = String::new();
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed: String = out.trim_matches('-').chars().take(60).collect();
    if trimmed.is_empty() {
        "chart".to_string()
    } else {
        trimmed
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render_scatter(
        &mut self,
        title: &str,
        labels: &[String],
        ratings: &[f64],
        suppress_x_ticks: bool,
    ) -> Result<()> {
        if labels.len() != ratings.len() {
            return Err(Error::Render(format!(
                "{} labels for {} ratings",
                labels.len(),
                ratings.len()
            )));
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.next_path(title);

        let x_max = labels.len().max(1) as f64;
        let y_max = ratings.iter().copied().fold(RATING_SCALE_MAX, f64::max);
        let label_for = |x: &f64| {
            if suppress_x_ticks || *x < 0.0 {
                String::new()
            } else {
                labels.get(x.floor() as usize).cloned().unwrap_or_default()
            }
        };

        {
            let root = SVGBackend::new(&path, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(title, ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(if suppress_x_ticks { 20 } else { 140 })
                .y_label_area_size(50)
                .build_cartesian_2d(0f64..x_max, 0f64..y_max)
                .map_err(render_error)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc("title")
                .y_desc("average rating")
                .x_label_formatter(&label_for)
                .draw()
                .map_err(render_error)?;

            chart
                .draw_series(
                    ratings
                        .iter()
                        .enumerate()
                        .map(|(i, rating)| Circle::new((i as f64 + 0.5, *rating), 4, BLUE.filled())),
                )
                .map_err(render_error)?;

            root.present().map_err(render_error)?;
        }

        info!(path = %path.display(), points = ratings.len(), "Chart written");
        self.last_path = Some(path);
        Ok(())
    }
}
