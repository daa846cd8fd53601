//! Chart rendering port trait.

use crate::domain::error::StockviewError;
use crate::domain::regime::RegimePoint;
use std::path::PathBuf;

/// Where a rendered chart landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartArtifact {
    /// Location on disk.
    pub path: PathBuf,
    /// Path relative to the static root, e.g. `images/AAPL.svg`.
    pub url: String,
}

pub trait ChartPort {
    /// Draw `points` (oldest-first) under `title` into an artifact named by
    /// `name`, overwriting any previous artifact of the same name.
    fn render(
        &self,
        points: &[RegimePoint],
        title: &str,
        name: &str,
    ) -> Result<ChartArtifact, StockviewError>;
}
