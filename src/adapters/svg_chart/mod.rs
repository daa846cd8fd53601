//! File-backed chart adapter writing SVG overlays into the images directory.

pub mod chart_svg;

use crate::domain::error::StockviewError;
use crate::domain::regime::RegimePoint;
use crate::ports::chart_port::{ChartArtifact, ChartPort};
use std::fs;
use std::path::PathBuf;

pub struct SvgChartAdapter {
    images_dir: PathBuf,
}

impl SvgChartAdapter {
    pub fn new(images_dir: PathBuf) -> Self {
        Self { images_dir }
    }
}

/// File stem for an artifact: anything outside `[A-Za-z0-9._-]` becomes `_`.
fn artifact_stem(name: &str) -> Result<String, StockviewError> {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        return Err(StockviewError::Render {
            reason: format!("invalid artifact name {name:?}"),
        });
    }
    Ok(stem)
}

impl ChartPort for SvgChartAdapter {
    fn render(
        &self,
        points: &[RegimePoint],
        title: &str,
        name: &str,
    ) -> Result<ChartArtifact, StockviewError> {
        let file_name = format!("{}.svg", artifact_stem(name)?);
        fs::create_dir_all(&self.images_dir)?;

        let path = self.images_dir.join(&file_name);
        fs::write(&path, chart_svg::generate_regime_svg(points, title))?;

        Ok(ChartArtifact {
            path,
            url: format!("images/{file_name}"),
        })
    }
}
