use std::ops::AddAssign;

use crate::status::Status;

/// Per-frame counts of smoothed statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub total: u32,
    pub attentive: u32,
    pub writing: u32,
    pub inattentive: u32,
    pub sleeping: u32,
}

impl FrameStats {
    pub fn from_statuses<I: IntoIterator<Item = Status>>(statuses: I) -> Self {
        let mut stats = Self::default();
        for st in statuses {
            stats.push(st);
        }
        stats
    }

    #[inline]
    pub fn push(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Attentive => self.attentive += 1,
            Status::Writing => self.writing += 1,
            Status::Inattentive => self.inattentive += 1,
            Status::Sleeping => self.sleeping += 1,
        }
    }

    #[inline]
    pub fn engaged(&self) -> u32 {
        self.attentive + self.writing
    }

    /// Share of engaged people in percent, 0 for an empty frame.
    pub fn engagement_pct(&self) -> f64 {
        if self.total > 0 {
            100.0 * self.engaged() as f64 / self.total as f64
        } else {
            0.0
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl FromIterator<Status> for FrameStats {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        Self::from_statuses(iter)
    }
}

impl AddAssign<&FrameStats> for FrameStats {
    fn add_assign(&mut self, rhs: &FrameStats) {
        self.total += rhs.total;
        self.attentive += rhs.attentive;
        self.writing += rhs.writing;
        self.inattentive += rhs.inattentive;
        self.sleeping += rhs.sleeping;
    }
}
