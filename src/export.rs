use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const REPORT_MEDIA_TYPE: &str = "text/markdown";

/// The report as a downloadable file.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDownload {
    pub filename: String,
    pub media_type: &'static str,
    pub contents: String,
}

pub fn report_filename(date: NaiveDate) -> String {
    format!("relatorio_{}.md", date.format("%Y-%m-%d"))
}

impl ReportDownload {
    pub fn new(report: &str, date: NaiveDate) -> Self {
        ReportDownload {
            filename: report_filename(date),
            media_type: REPORT_MEDIA_TYPE,
            contents: report.to_string(),
        }
    }

    /// Named after the current UTC date.
    pub fn today(report: &str) -> Self {
        Self::new(report, Utc::now().date_naive())
    }

    /// Writes the file into `dir`, replacing a same-day download.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating export directory {}", dir.display()))?;

        let path = dir.join(&self.filename);
        fs::write(&path, &self.contents)
            .with_context(|| format!("writing report to {}", path.display()))?;

        info!(path = %path.display(), bytes = self.contents.len(), "report downloaded");
        Ok(path)
    }
}
