use chrono::NaiveDateTime;

use crate::stats::FrameStats;

/// One persisted session summary, percentages in `[0, 100]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionLogRow {
    pub timestamp: NaiveDateTime,
    pub duration_secs: f64,
    pub avg_engagement_pct: f64,
    pub attentive_pct: f64,
    pub writing_pct: f64,
    pub inattentive_pct: f64,
    pub sleeping_pct: f64,
}

/// Running sums over a whole session.
#[derive(Debug, Clone)]
pub struct SessionAccumulator {
    sums: FrameStats,
    frames_seen: u64,
    frames_total: u64,
    started_at: f64,
}

impl SessionAccumulator {
    pub fn new(started_at: f64) -> Self {
        Self {
            sums: FrameStats::default(),
            frames_seen: 0,
            frames_total: 0,
            started_at,
        }
    }

    /// Only frames with at least one person count as seen.
    pub fn push(&mut self, stats: &FrameStats) {
        self.frames_total += 1;

        if stats.total > 0 {
            self.sums += stats;
            self.frames_seen += 1;
        }
    }

    #[inline]
    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    #[inline]
    pub fn frames_total(&self) -> u64 {
        self.frames_total
    }

    #[inline]
    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    #[inline]
    pub fn sums(&self) -> &FrameStats {
        &self.sums
    }

    /// Produces the log row, or `None` when nobody was ever observed.
    pub fn finish(self, ended_at: f64, timestamp: NaiveDateTime) -> Option<SessionLogRow> {
        if self.frames_seen == 0 || self.sums.total == 0 {
            return None;
        }

        let total = self.sums.total as f64;
        let pct = |n: u32| n as f64 / total * 100.0;

        Some(SessionLogRow {
            timestamp,
            duration_secs: (ended_at - self.started_at).max(0.0),
            avg_engagement_pct: pct(self.sums.engaged()),
            attentive_pct: pct(self.sums.attentive),
            writing_pct: pct(self.sums.writing),
            inattentive_pct: pct(self.sums.inattentive),
            sleeping_pct: pct(self.sums.sleeping),
        })
    }
}
