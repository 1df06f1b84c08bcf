pub mod alert;
pub mod classifier;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod detection;
pub mod error;
pub mod frame;
pub mod journal;
pub mod keypoint;
pub mod monitor;
pub mod report;
pub mod session;
pub mod smoother;
pub mod source;
pub mod stats;
pub mod status;

#[cfg(feature = "opencv")]
pub mod video;

pub use alert::EngagementAlert;
pub use classifier::PostureClassifier;
pub use config::Config;
pub use detection::PoseDetection;
pub use error::{Error, Result};
pub use frame::PoseFrame;
pub use journal::SessionLog;
pub use keypoint::{Joint, Keypoint, KeypointLayout};
pub use monitor::{ClosedSession, FrameReport, Monitor};
pub use session::{SessionAccumulator, SessionLogRow};
pub use smoother::{StatusSmoother, TrackState};
pub use source::{PoseSource, ReplaySource};
pub use stats::FrameStats;
pub use status::Status;

/// How a drained stream ended.
#[derive(Debug)]
pub struct StreamEnd {
    pub frames: u64,
    /// Set when the stream stopped on an unreadable frame instead of its end.
    pub error: Option<Error>,
}

/// Drains `source` through `monitor`, calling `on_frame` after every frame.
///
/// An unreadable frame ends the stream like end-of-input; frames processed
/// before it stay in the monitor's session.
pub fn run_source<S, F>(source: &mut S, monitor: &mut Monitor, mut on_frame: F) -> StreamEnd
where
    S: PoseSource + ?Sized,
    F: FnMut(&FrameReport),
{
    let mut frames = 0;

    loop {
        match source.next_frame() {
            Ok(Some(frame)) => {
                let report = monitor.process(&frame);
                on_frame(&report);
                frames += 1;
            }
            Ok(None) => return StreamEnd { frames, error: None },
            Err(err) => {
                log::error!("pose stream stopped after {} frames: {}", frames, err);
                return StreamEnd {
                    frames,
                    error: Some(err),
                };
            }
        }
    }
}
