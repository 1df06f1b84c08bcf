use log::{info, warn};

use crate::config::AlertConfig;
use crate::stats::FrameStats;

/// Raises an alert once engagement has stayed below the threshold for longer
/// than the hold time. Frames without anybody in them clear the timer.
#[derive(Debug, Clone)]
pub struct EngagementAlert {
    threshold_pct: f64,
    hold: f64,
    low_engagement_since: Option<f64>,
    active: bool,
}

impl EngagementAlert {
    pub fn new(config: &AlertConfig) -> Self {
        Self {
            threshold_pct: config.engagement_threshold_pct,
            hold: config.hold_secs,
            low_engagement_since: None,
            active: false,
        }
    }

    pub fn update(&mut self, stats: &FrameStats, now: f64) -> bool {
        let pct = stats.engagement_pct();

        if stats.total > 0 && pct < self.threshold_pct {
            match self.low_engagement_since {
                None => self.low_engagement_since = Some(now),
                Some(since) if now - since > self.hold => {
                    if !self.active {
                        warn!(
                            "engagement at {:.1}% for {:.0}s, alert raised",
                            pct,
                            now - since
                        );
                    }
                    self.active = true;
                }
                Some(_) => {}
            }
        } else {
            if self.active {
                info!("engagement recovered to {:.1}%, alert cleared", pct);
            }
            self.low_engagement_since = None;
            self.active = false;
        }

        self.active
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn low_engagement_since(&self) -> Option<f64> {
        self.low_engagement_since
    }
}

impl Default for EngagementAlert {
    fn default() -> Self {
        Self::new(&AlertConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_engaged() -> FrameStats {
        FrameStats {
            total: 4,
            attentive: 1,
            writing: 1,
            inattentive: 1,
            sleeping: 1,
        }
    }

    #[test]
    fn alert_needs_sustained_low_engagement() {
        let mut alert = EngagementAlert::default();
        let stats = half_engaged();

        for t in 0..=60 {
            assert!(!alert.update(&stats, t as f64), "raised early at t={}", t);
        }
        assert!(alert.update(&stats, 61.0));
        assert!(alert.is_active());
    }

    #[test]
    fn recovery_clears_timer_and_alert() {
        let mut alert = EngagementAlert::default();
        let low = half_engaged();
        let good = FrameStats {
            total: 2,
            attentive: 2,
            ..FrameStats::default()
        };

        alert.update(&low, 0.0);
        assert!(alert.update(&low, 70.0));

        assert!(!alert.update(&good, 71.0));
        assert_eq!(alert.low_engagement_since(), None);

        // the timer restarts from the next low frame
        assert!(!alert.update(&low, 72.0));
        assert!(!alert.update(&low, 130.0));
        assert!(alert.update(&low, 132.5));
    }

    #[test]
    fn empty_frames_reset_the_timer() {
        let mut alert = EngagementAlert::default();
        alert.update(&half_engaged(), 0.0);
        alert.update(&FrameStats::default(), 30.0);
        assert_eq!(alert.low_engagement_since(), None);
        assert!(!alert.update(&half_engaged(), 65.0));
    }

    #[test]
    fn engagement_at_threshold_is_not_low() {
        let mut alert = EngagementAlert::default();
        let stats = FrameStats {
            total: 5,
            attentive: 3,
            inattentive: 2,
            ..FrameStats::default()
        };
        alert.update(&stats, 0.0);
        assert_eq!(alert.low_engagement_since(), None);
    }
}
