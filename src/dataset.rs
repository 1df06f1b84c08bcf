//! Flattens labelled poses into a keypoint CSV for offline model work.
//!
//! Input is JSON lines of `{"label": "...", "kp": [[x, y, conf], ...]}`. Source
//! labels are mapped onto [`Status`] values; rows with unmapped labels are
//! dropped.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use log::{debug, warn};
use serde_derive::Deserialize;

use crate::error::{Error, Result};
use crate::keypoint::{Keypoint, KeypointLayout};
use crate::status::Status;

#[derive(Debug, Clone, Deserialize)]
pub struct LabelledPose {
    pub label: String,
    #[serde(rename = "kp")]
    pub keypoints: Vec<Keypoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: usize,
    pub skipped: usize,
}

pub fn header(layout: KeypointLayout) -> Vec<String> {
    let mut header = Vec::with_capacity(1 + layout.len() * 3);
    header.push("label".to_string());
    for i in 0..layout.len() {
        for v in ["x", "y", "conf"] {
            header.push(format!("kp_{}_{}", i, v));
        }
    }
    header
}

pub fn export<R: BufRead, W: Write>(
    input: R,
    output: W,
    layout: KeypointLayout,
    label_map: &BTreeMap<String, Status>,
) -> Result<ExportSummary> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record(header(layout))?;

    let mut summary = ExportSummary::default();

    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let pose: LabelledPose =
            serde_json::from_str(&line).map_err(|e| Error::parse(idx + 1, e))?;

        let status = match label_map.get(pose.label.trim()) {
            Some(status) => *status,
            None => {
                debug!("line {}: label `{}` not mapped, skipped", idx + 1, pose.label);
                summary.skipped += 1;
                continue;
            }
        };

        if pose.keypoints.len() > layout.len() {
            warn!(
                "line {}: {} keypoints, only the first {} are kept",
                idx + 1,
                pose.keypoints.len(),
                layout.len()
            );
        }

        let mut record = Vec::with_capacity(1 + layout.len() * 3);
        record.push(status.as_str().to_string());
        for i in 0..layout.len() {
            let kp = pose.keypoints.get(i).copied().unwrap_or_else(Keypoint::missing);
            record.push(kp.x().to_string());
            record.push(kp.y().to_string());
            record.push(kp.confidence.to_string());
        }

        writer.write_record(&record)?;
        summary.written += 1;
    }

    writer.flush()?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetConfig;
    use std::io::Cursor;

    #[test]
    fn header_covers_every_keypoint() {
        let h = header(KeypointLayout::Coco17);
        assert_eq!(h.len(), 1 + 17 * 3);
        assert_eq!(h[1], "kp_0_x");
        assert_eq!(h[51], "kp_16_conf");
    }

    #[test]
    fn maps_labels_and_pads_missing_keypoints() {
        let input = "{\"label\":\"sit\",\"kp\":[[1.5,2,0.75]]}\n\
                     {\"label\":\"raise_hand\",\"kp\":[]}\n\
                     \n\
                     {\"label\":\"down\",\"kp\":[[3,4,0.5],[5,6,0.25]]}\n";
        let mut out = Vec::new();

        let summary = export(
            Cursor::new(input),
            &mut out,
            KeypointLayout::Coco17,
            &DatasetConfig::default().label_map,
        )
        .unwrap();

        assert_eq!(summary, ExportSummary { written: 2, skipped: 1 });

        let text = String::from_utf8(out).unwrap();
        let rows: Vec<Vec<&str>> = text.lines().map(|l| l.split(',').collect()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[1][..4], ["ATTENTIVE", "1.5", "2", "0.75"]);
        assert_eq!(&rows[1][4..7], ["0", "0", "0"]);
        assert_eq!(&rows[2][..7], ["SLEEPING", "3", "4", "0.5", "5", "6", "0.25"]);
        assert!(rows.iter().all(|r| r.len() == 52));
    }

    #[test]
    fn broken_line_is_an_error() {
        let mut out = Vec::new();
        let res = export(
            Cursor::new("{\"label\":\"sit\",\"kp\":[[1]]}\n"),
            &mut out,
            KeypointLayout::Coco17,
            &DatasetConfig::default().label_map,
        );
        assert!(matches!(res, Err(Error::Parse { line: 1, .. })));
    }
}
