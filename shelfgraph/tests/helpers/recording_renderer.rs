//! Chart renderer that keeps what it was asked to draw

use shelfgraph::render::ChartRenderer;

#[derive(Debug, Clone, PartialEq)]
pub struct Render {
    pub title: String,
    pub labels: Vec<String>,
    pub ratings: Vec<f64>,
    pub suppress_x_ticks: bool,
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub renders: Vec<Render>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.renders.iter().map(|r| r.labels.len()).collect()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render_scatter(
        &mut self,
        title: &str,
        labels: &[String],
        ratings: &[f64],
        suppress_x_ticks: bool,
    ) -> shelfgraph::Result<()> {
        self.renders.push(Render {
            title: title.to_string(),
            labels: labels.to_vec(),
            ratings: ratings.to_vec(),
            suppress_x_ticks,
        });
        Ok(())
    }
}
