//! Text report over the session log.

use std::fmt::Write;

use crate::journal::{HEADER, TIMESTAMP_FORMAT};
use crate::session::SessionLogRow;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub sessions: usize,
    pub total_duration_secs: f64,
    pub mean_engagement_pct: f64,
    pub best: SessionLogRow,
    pub worst: SessionLogRow,
}

impl ReportSummary {
    pub fn from_rows(rows: &[SessionLogRow]) -> Option<Self> {
        let first = rows.first()?;

        let mut best = first;
        let mut worst = first;
        for row in rows {
            if row.avg_engagement_pct > best.avg_engagement_pct {
                best = row;
            }
            if row.avg_engagement_pct < worst.avg_engagement_pct {
                worst = row;
            }
        }

        let n = rows.len() as f64;

        Some(Self {
            sessions: rows.len(),
            total_duration_secs: rows.iter().map(|r| r.duration_secs).sum(),
            mean_engagement_pct: rows.iter().map(|r| r.avg_engagement_pct).sum::<f64>() / n,
            best: best.clone(),
            worst: worst.clone(),
        })
    }
}

pub fn table(rows: &[SessionLogRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", HEADER.join(" | "));

    for r in rows {
        let _ = writeln!(
            out,
            "{} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1} | {:.1}",
            r.timestamp.format(TIMESTAMP_FORMAT),
            r.duration_secs,
            r.avg_engagement_pct,
            r.attentive_pct,
            r.writing_pct,
            r.inattentive_pct,
            r.sleeping_pct
        );
    }

    out
}

/// One bar per session, scaled so 100% fills the bar.
pub fn trend(rows: &[SessionLogRow]) -> String {
    let mut out = String::new();

    for r in rows {
        let pct = r.avg_engagement_pct.clamp(0.0, 100.0);
        let filled = (pct / 100.0 * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "{} {:>5.1}% {}{}",
            r.timestamp.format(TIMESTAMP_FORMAT),
            pct,
            "#".repeat(filled),
            ".".repeat(BAR_WIDTH - filled)
        );
    }

    out
}
