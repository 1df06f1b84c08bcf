use chrono::NaiveDateTime;
use log::{debug, error, info, warn};

use crate::alert::EngagementAlert;
use crate::classifier::PostureClassifier;
use crate::config::Config;
use crate::frame::PoseFrame;
use crate::journal::SessionLog;
use crate::session::{SessionAccumulator, SessionLogRow};
use crate::smoother::StatusSmoother;
use crate::stats::FrameStats;
use crate::status::Status;

/// Outcome of one processed frame.
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub timestamp: f64,
    pub stats: FrameStats,
    pub engagement_pct: f64,
    pub alert_active: bool,
    pub tracks: Vec<(u32, Status)>,
}

/// Session row together with whether it reached the log.
#[derive(Debug, Clone)]
pub struct ClosedSession {
    pub row: SessionLogRow,
    pub saved: bool,
}

/// Runs classification, smoothing, aggregation and alerting over a stream
/// of frames, one frame at a time, in capture order.
pub struct Monitor {
    classifier: PostureClassifier,
    smoother: StatusSmoother,
    alert: EngagementAlert,
    session: Option<SessionAccumulator>,
    last_ts: f64,
}

impl Monitor {
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: PostureClassifier::new(&config.classifier),
            smoother: StatusSmoother::new(&config.smoother),
            alert: EngagementAlert::new(&config.alert),
            session: None,
            last_ts: 0.0,
        }
    }

    /// Starts the session clock at `started_at` instead of the first frame.
    pub fn with_start(config: &Config, started_at: f64) -> Self {
        let mut monitor = Self::new(config);
        monitor.session = Some(SessionAccumulator::new(started_at));
        monitor.last_ts = started_at;
        monitor
    }

    pub fn process(&mut self, frame: &PoseFrame) -> FrameReport {
        let now = frame.timestamp;
        let session = self
            .session
            .get_or_insert_with(|| SessionAccumulator::new(now));

        let mut tracks = Vec::with_capacity(frame.len());
        for det in frame.iter() {
            let raw = self.classifier.classify(det);
            let status = self.smoother.update(det.track_id, raw, now);
            tracks.push((det.track_id, status));
        }

        let evicted = self.smoother.evict_stale(now);
        if evicted > 0 {
            debug!("t={:.2}: evicted {} stale tracks", now, evicted);
        }

        let stats: FrameStats = tracks.iter().map(|&(_, st)| st).collect();
        let alert_active = self.alert.update(&stats, now);
        session.push(&stats);

        if now > self.last_ts {
            self.last_ts = now;
        }

        let engagement_pct = stats.engagement_pct();
        debug!(
            "t={:.2}: {} people, {} attentive, {} writing, {} inattentive, {} sleeping ({:.1}%)",
            now,
            stats.total,
            stats.attentive,
            stats.writing,
            stats.inattentive,
            stats.sleeping,
            engagement_pct
        );

        FrameReport {
            timestamp: now,
            stats,
            engagement_pct,
            alert_active,
            tracks,
        }
    }

    #[inline]
    pub fn alert_active(&self) -> bool {
        self.alert.is_active()
    }

    #[inline]
    pub fn smoother(&self) -> &StatusSmoother {
        &self.smoother
    }

    #[inline]
    pub fn classifier(&self) -> &PostureClassifier {
        &self.classifier
    }

    #[inline]
    pub fn last_timestamp(&self) -> f64 {
        self.last_ts
    }

    /// Closes the session at the latest frame time seen.
    pub fn finish(self, timestamp: NaiveDateTime) -> Option<SessionLogRow> {
        let ended_at = self.last_ts;
        self.finish_at(ended_at, timestamp)
    }

    pub fn finish_at(self, ended_at: f64, timestamp: NaiveDateTime) -> Option<SessionLogRow> {
        let session = self.session?;

        info!(
            "session over: {} frames, {} with people, {:.1}s",
            session.frames_total(),
            session.frames_seen(),
            ended_at - session.started_at()
        );

        session.finish(ended_at, timestamp)
    }

    /// Finishes the session and appends its row to `log`. A failed append is
    /// logged and reported through [`ClosedSession::saved`], never returned.
    pub fn close(self, log: &SessionLog, timestamp: NaiveDateTime) -> Option<ClosedSession> {
        let row = match self.finish(timestamp) {
            Some(row) => row,
            None => {
                warn!("nobody was detected, no session row written");
                return None;
            }
        };

        info!(
            "engagement {:.1}% over {:.1}s",
            row.avg_engagement_pct, row.duration_secs
        );

        let saved = match log.append(&row) {
            Ok(()) => true,
            Err(err) => {
                error!("could not write {}: {}", log.path().display(), err);
                false
            }
        };

        Some(ClosedSession { row, saved })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::tests::pose;
    use crate::detection::PoseDetection;
    use crate::keypoint::Joint;
    use chrono::NaiveDate;

    fn attentive(id: u32) -> PoseDetection {
        pose(
            id,
            &[
                (Joint::Nose, 100.0, 50.0, 0.9),
                (Joint::LeftShoulder, 80.0, 200.0, 0.9),
                (Joint::RightShoulder, 120.0, 200.0, 0.9),
            ],
        )
    }

    fn slumped(id: u32) -> PoseDetection {
        pose(
            id,
            &[
                (Joint::Nose, 100.0, 260.0, 0.9),
                (Joint::LeftShoulder, 80.0, 200.0, 0.9),
                (Joint::RightShoulder, 120.0, 200.0, 0.9),
            ],
        )
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn frame_report_counts_smoothed_statuses() {
        let mut monitor = Monitor::new(&Config::default());

        monitor.process(&PoseFrame::new(0.0, vec![slumped(1), attentive(2)]));
        let report = monitor.process(&PoseFrame::new(
            121.0,
            vec![slumped(1), attentive(2), slumped(3)],
        ));

        assert_eq!(report.tracks, [(1, Status::Sleeping), (2, Status::Attentive), (3, Status::Inattentive)]);
        assert_eq!(report.stats.total, 3);
        assert_eq!(report.stats.sleeping, 1);
        assert_eq!(monitor.smoother().len(), 3);
    }

    #[test]
    fn unseen_tracks_keep_their_state() {
        let mut monitor = Monitor::new(&Config::default());
        monitor.process(&PoseFrame::new(0.0, vec![slumped(1)]));
        monitor.process(&PoseFrame::new(50.0, vec![attentive(2)]));

        let st = monitor.smoother().state(1).unwrap();
        assert_eq!(st.status, Status::Inattentive);
        assert_eq!(st.last_change_time, 0.0);

        let report = monitor.process(&PoseFrame::new(125.0, vec![slumped(1)]));
        assert_eq!(report.tracks, [(1, Status::Sleeping)]);
    }

    #[test]
    fn alert_follows_low_engagement() {
        let mut monitor = Monitor::new(&Config::default());
        let frame = |t| PoseFrame::new(t, vec![slumped(1), attentive(2)]);

        assert!(!monitor.process(&frame(0.0)).alert_active);
        assert!(!monitor.process(&frame(60.0)).alert_active);
        assert!(monitor.process(&frame(61.0)).alert_active);
        assert!(monitor.alert_active());
    }

    #[test]
    fn session_row_uses_first_and_last_frame() {
        let mut monitor = Monitor::new(&Config::default());
        monitor.process(&PoseFrame::new(10.0, vec![attentive(1), slumped(2)]));
        monitor.process(&PoseFrame::new(20.0, Vec::new()));
        monitor.process(&PoseFrame::new(40.0, vec![attentive(1), attentive(2)]));

        let row = monitor.finish(now()).unwrap();
        assert_eq!(row.duration_secs, 30.0);
        assert_eq!(row.attentive_pct, 75.0);
        assert_eq!(row.inattentive_pct, 25.0);
        assert_eq!(row.avg_engagement_pct, 75.0);
    }

    #[test]
    fn session_without_people_writes_nothing() {
        let mut monitor = Monitor::with_start(&Config::default(), 0.0);
        monitor.process(&PoseFrame::new(1.0, Vec::new()));
        assert!(monitor.finish(now()).is_none());

        assert!(Monitor::new(&Config::default()).finish(now()).is_none());

        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("log.csv"));
        assert!(Monitor::new(&Config::default()).close(&log, now()).is_none());
        assert!(!log.exists());
    }

    #[test]
    fn close_appends_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("data").join("log.csv"));

        let mut monitor = Monitor::new(&Config::default());
        monitor.process(&PoseFrame::new(0.0, vec![attentive(1)]));
        monitor.process(&PoseFrame::new(5.0, vec![attentive(1)]));

        let closed = monitor.close(&log, now()).unwrap();
        assert!(closed.saved);
        assert_eq!(log.read_rows().unwrap(), [closed.row]);
    }

    #[test]
    fn unwritable_log_keeps_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "").unwrap();
        let log = SessionLog::new(blocker.join("log.csv"));

        let mut monitor = Monitor::new(&Config::default());
        monitor.process(&PoseFrame::new(0.0, vec![attentive(1), slumped(2)]));

        let closed = monitor.close(&log, now()).unwrap();
        assert!(!closed.saved);
        assert_eq!(closed.row.avg_engagement_pct, 50.0);
        assert!(!log.exists());
    }
}
