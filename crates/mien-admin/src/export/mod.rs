//! Export formatters: three independent, purely presentational
//! transforms of the same measurement sequence. Each is generated fully
//! in memory and written once, so partial files are not possible.

pub mod chart;
pub mod csv;
pub mod pdf;

use chrono::Local;
use mien_core::Session;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("session has no measurements to export")]
    EmptySession,
    #[error("could not write export file: {0}")]
    Io(#[from] std::io::Error),
    #[error("chart encode failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Write a fully generated artifact in one operation.
pub fn write_artifact(path: &std::path::Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes)?;
    Ok(())
}

/// `Report_<First>_<Last>_<yyyy-mm-dd>.<ext>` — the artifact naming the
/// dashboards use.
pub fn default_file_name(session: &Session, ext: &str) -> String {
    format!(
        "Report_{}_{}_{}.{}",
        session.first_name,
        session.last_name,
        Local::now().format("%Y-%m-%d"),
        ext
    )
}
