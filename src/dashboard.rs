//! Summary panel drawn over the video.
//!
//! [`DashboardView`] holds everything needed to draw the panel so the layout
//! can be checked without a display. Rendering onto an OpenCV image lives in
//! [`draw`] behind the `opencv` feature.

use crate::stats::FrameStats;
use crate::status::Status;

/// Colour in OpenCV channel order.
pub type Bgr = (u8, u8, u8);

pub const PANEL_RECT: (i32, i32, i32, i32) = (20, 20, 350, 210);
pub const PANEL_ALPHA: f64 = 0.6;
pub const PANEL_COLOR: Bgr = (0, 0, 0);
pub const ALERT_PANEL_COLOR: Bgr = (0, 0, 128);

const TEXT_ORIGIN: (i32, i32) = (40, 60);
const LINE_HEIGHT: i32 = 30;

pub fn status_color(status: Status) -> Bgr {
    match status {
        Status::Attentive => (0, 255, 0),
        Status::Writing => (0, 255, 255),
        Status::Inattentive => (0, 0, 255),
        Status::Sleeping => (128, 0, 128),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardLine {
    pub text: String,
    pub color: Bgr,
    pub origin: (i32, i32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub panel_color: Bgr,
    pub lines: Vec<DashboardLine>,
}

impl DashboardView {
    pub fn new(stats: &FrameStats, alert_active: bool) -> Self {
        let entries = [
            (format!("Total Students: {}", stats.total), (255, 255, 255)),
            (
                format!("Attentive: {}", stats.attentive),
                status_color(Status::Attentive),
            ),
            (
                format!("Writing: {}", stats.writing),
                status_color(Status::Writing),
            ),
            (
                format!("Inattentive: {}", stats.inattentive),
                status_color(Status::Inattentive),
            ),
            (
                format!("Sleeping: {}", stats.sleeping),
                status_color(Status::Sleeping),
            ),
            (
                format!("Engagement: {:.1}%", stats.engagement_pct()),
                (255, 255, 0),
            ),
        ];

        let lines = entries
            .into_iter()
            .enumerate()
            .map(|(idx, (text, color))| DashboardLine {
                text,
                color,
                origin: (TEXT_ORIGIN.0, TEXT_ORIGIN.1 + LINE_HEIGHT * idx as i32),
            })
            .collect();

        Self {
            panel_color: if alert_active {
                ALERT_PANEL_COLOR
            } else {
                PANEL_COLOR
            },
            lines,
        }
    }
}

#[cfg(feature = "opencv")]
pub use self::render::{draw, draw_track_label};

#[cfg(feature = "opencv")]
mod render {
    use opencv::{
        core::{self, Mat},
        imgproc,
        prelude::*,
    };

    use super::{Bgr, DashboardView, PANEL_ALPHA, PANEL_RECT};
    use crate::status::Status;

    #[inline]
    fn scalar((b, g, r): Bgr) -> core::Scalar {
        core::Scalar::new(b as f64, g as f64, r as f64, 0.0)
    }

    /// Blends the semi-transparent panel into `frame` and writes the counters.
    pub fn draw(frame: &mut Mat, view: &DashboardView) -> opencv::Result<()> {
        let mut overlay = frame.try_clone()?;
        let (x, y, w, h) = PANEL_RECT;

        imgproc::rectangle(
            &mut overlay,
            core::Rect::new(x, y, w, h),
            scalar(view.panel_color),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )?;

        let mut blended = Mat::default();
        core::add_weighted(
            &overlay,
            PANEL_ALPHA,
            &*frame,
            1.0 - PANEL_ALPHA,
            0.0,
            &mut blended,
            -1,
        )?;
        *frame = blended;

        for line in &view.lines {
            imgproc::put_text(
                frame,
                &line.text,
                core::Point::new(line.origin.0, line.origin.1),
                imgproc::FONT_HERSHEY_SIMPLEX,
                0.8,
                scalar(line.color),
                2,
                imgproc::LINE_AA,
                false,
            )?;
        }

        Ok(())
    }

    /// Writes the track id and status next to a person.
    pub fn draw_track_label(
        frame: &mut Mat,
        track_id: u32,
        status: Status,
        at: (f32, f32),
    ) -> opencv::Result<()> {
        imgproc::put_text(
            frame,
            &format!("{} {}", track_id, status),
            core::Point::new(at.0 as i32, (at.1 - 10.0) as i32),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            scalar(super::status_color(status)),
            1,
            imgproc::LINE_AA,
            false,
        )
    }
}
