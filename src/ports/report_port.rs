//! Export artifact port.

use std::path::{Path, PathBuf};

use crate::domain::analysis::AnalysisResult;
use crate::domain::error::DivyieldError;

/// Port for writing one analysis result to a file under `output_dir`.
pub trait ReportPort {
    /// File name the artifact is written under.
    fn file_name(&self, result: &AnalysisResult) -> String;

    fn write(&self, result: &AnalysisResult, output_dir: &Path) -> Result<PathBuf, DivyieldError>;
}
