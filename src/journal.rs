//! Append-only CSV log of session summaries.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::info;
use serde_derive::Deserialize;

use crate::error::{Error, Result};
use crate::session::SessionLogRow;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const HEADER: [&str; 7] = [
    "Timestamp",
    "Duration (s)",
    "Avg Engagement (%)",
    "Attentive (%)",
    "Writing (%)",
    "Inattentive (%)",
    "Sleeping (%)",
];

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Duration (s)")]
    duration: f64,
    #[serde(rename = "Avg Engagement (%)")]
    engagement: f64,
    #[serde(rename = "Attentive (%)")]
    attentive: f64,
    #[serde(rename = "Writing (%)")]
    writing: f64,
    #[serde(rename = "Inattentive (%)")]
    inattentive: f64,
    #[serde(rename = "Sleeping (%)")]
    sleeping: f64,
}

#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn append(&self, row: &SessionLogRow) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let needs_header = fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(HEADER)?;
        }

        writer.write_record(&[
            row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.1}", row.duration_secs),
            format!("{:.1}", row.avg_engagement_pct),
            format!("{:.1}", row.attentive_pct),
            format!("{:.1}", row.writing_pct),
            format!("{:.1}", row.inattentive_pct),
            format!("{:.1}", row.sleeping_pct),
        ])?;
        writer.flush()?;

        info!("session summary saved to {}", self.path.display());

        Ok(())
    }

    pub fn read_rows(&self) -> Result<Vec<SessionLogRow>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for (idx, rec) in reader.deserialize::<RawRow>().enumerate() {
            let raw = rec?;
            // header is line 1
            let timestamp = NaiveDateTime::parse_from_str(&raw.timestamp, TIMESTAMP_FORMAT)
                .map_err(|e| Error::parse(idx + 2, e))?;

            rows.push(SessionLogRow {
                timestamp,
                duration_secs: raw.duration,
                avg_engagement_pct: raw.engagement,
                attentive_pct: raw.attentive,
                writing_pct: raw.writing,
                inattentive_pct: raw.inattentive,
                sleeping_pct: raw.sleeping,
            });
        }

        Ok(rows)
    }
}
