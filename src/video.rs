//! Live display: video frames paired one-to-one with pose frames.

use log::{error, info, warn};
use opencv::{
    core::Mat,
    highgui,
    prelude::*,
    videoio,
};

use crate::config::DisplayConfig;
use crate::dashboard::{self, DashboardView};
use crate::error::{Error, Result};
use crate::monitor::Monitor;
use crate::source::PoseSource;

const KEY_ESC: i32 = 27;

pub enum VideoInput {
    Camera(i32),
    File(String),
}

impl VideoInput {
    /// Numeric arguments select a camera, anything else is a file path.
    pub fn parse(s: &str) -> Self {
        match s.parse::<i32>() {
            Ok(idx) => VideoInput::Camera(idx),
            Err(_) => VideoInput::File(s.to_string()),
        }
    }
}

/// Why playback stopped.
#[derive(Debug)]
pub enum Stop {
    EndOfVideo,
    EndOfPoses,
    UserQuit,
    /// Capture, pose stream or drawing failed mid-session.
    Failed(Error),
}

pub struct Player {
    cam: videoio::VideoCapture,
    window: String,
}

impl Player {
    pub fn open(input: &VideoInput, config: &DisplayConfig) -> Result<Self> {
        let cam = match input {
            VideoInput::Camera(idx) => {
                info!("opening camera {}", idx);
                videoio::VideoCapture::new(*idx, videoio::CAP_ANY)?
            }
            VideoInput::File(path) => {
                info!("opening video {}", path);
                videoio::VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };

        if !videoio::VideoCapture::is_opened(&cam)? {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "unable to open video stream",
            )
            .into());
        }

        let window = config.window_name.clone();
        if config.fullscreen {
            highgui::named_window(&window, highgui::WINDOW_NORMAL)?;
            highgui::set_window_property(
                &window,
                highgui::WND_PROP_FULLSCREEN,
                highgui::WINDOW_FULLSCREEN as f64,
            )?;
        } else {
            highgui::named_window(&window, highgui::WINDOW_AUTOSIZE)?;
        }

        Ok(Self { cam, window })
    }

    /// Plays until the video or the pose stream ends, or `q`/Esc is pressed.
    ///
    /// Errors after the window is up end playback as [`Stop::Failed`]; the
    /// frames processed so far stay in `monitor`.
    pub fn run<S: PoseSource + ?Sized>(&mut self, source: &mut S, monitor: &mut Monitor) -> Stop {
        let mut frame = Mat::default();
        let mut frames = 0u64;

        let stop = loop {
            match self.step(&mut frame, source, monitor) {
                Ok(None) => frames += 1,
                Ok(Some(stop)) => break stop,
                Err(err) => {
                    error!("playback stopped after {} frames: {}", frames, err);
                    break Stop::Failed(err);
                }
            }
        };

        if matches!(stop, Stop::EndOfPoses) {
            warn!("pose stream ended before the video");
        }

        stop
    }

    fn step<S: PoseSource + ?Sized>(
        &mut self,
        frame: &mut Mat,
        source: &mut S,
        monitor: &mut Monitor,
    ) -> Result<Option<Stop>> {
        if !self.cam.read(frame)? || frame.cols() == 0 || frame.rows() == 0 {
            return Ok(Some(Stop::EndOfVideo));
        }

        let poses = match source.next_frame()? {
            Some(poses) => poses,
            None => return Ok(Some(Stop::EndOfPoses)),
        };

        let report = monitor.process(&poses);

        for (det, &(id, status)) in poses.iter().zip(report.tracks.iter()) {
            if let Some(at) = monitor.classifier().label_anchor(det) {
                dashboard::draw_track_label(frame, id, status, at)?;
            }
        }

        let view = DashboardView::new(&report.stats, report.alert_active);
        dashboard::draw(frame, &view)?;
        highgui::imshow(&self.window, frame)?;

        let key = highgui::wait_key(1)?;
        if key == KEY_ESC || (key & 0xFF) == b'q' as i32 {
            return Ok(Some(Stop::UserQuit));
        }

        Ok(None)
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        let _ = self.cam.release();
        let _ = highgui::destroy_window(&self.window);
    }
}
