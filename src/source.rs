//! Pose streams produced by an external detector/tracker.
//!
//! The replay format is one frame per line: `<timestamp>:<json array>`, where
//! every array element is a [`PoseDetection`]. A line without a `:` is a frame
//! in which nobody was detected.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use log::trace;

use crate::detection::PoseDetection;
use crate::error::{Error, Result};
use crate::frame::PoseFrame;

pub trait PoseSource {
    /// Next frame in capture order, `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<PoseFrame>>;
}

pub struct ReplaySource<R> {
    lines: io::Lines<R>,
    line_no: usize,
    frame_interval: f64,
    last_ts: Option<f64>,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R, frame_interval: f64) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            frame_interval,
            last_ts: None,
        }
    }

    fn parse_line(&self, line: &str) -> Result<PoseFrame> {
        let next_ts = self
            .last_ts
            .map(|ts| ts + self.frame_interval)
            .unwrap_or(0.0);

        let idx = match line.find(':') {
            Some(idx) => idx,
            None => return Ok(PoseFrame::new(next_ts, Vec::new())),
        };

        let (ts, vector) = line.split_at(idx);
        let ts = ts.trim();
        let timestamp = if ts.is_empty() {
            next_ts
        } else {
            ts.parse::<f64>()
                .map_err(|e| Error::parse(self.line_no, format!("bad timestamp `{}`: {}", ts, e)))?
        };

        let detections: Vec<PoseDetection> = serde_json::from_str(&vector[1..])
            .map_err(|e| Error::parse(self.line_no, e))?;

        Ok(PoseFrame::new(timestamp, detections))
    }
}

impl ReplaySource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P, frame_interval: f64) -> Result<Self> {
        let file = File::open(path)?;

        Ok(Self::new(BufReader::new(file), frame_interval))
    }
}

impl<R: BufRead> PoseSource for ReplaySource<R> {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        loop {
            let line = match self.lines.next() {
                Some(line) => line?,
                None => return Ok(None),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }

            let frame = self.parse_line(&line)?;
            trace!(
                "line {}: t={:.3} with {} detections",
                self.line_no,
                frame.timestamp,
                frame.len()
            );
            self.last_ts = Some(frame.timestamp);

            return Ok(Some(frame));
        }
    }
}

impl<S: PoseSource + ?Sized> PoseSource for Box<S> {
    #[inline]
    fn next_frame(&mut self) -> Result<Option<PoseFrame>> {
        (**self).next_frame()
    }
}
