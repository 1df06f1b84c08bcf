//! Single-frame posture heuristics.
//!
//! The classifier only ever emits [`Status::Attentive`], [`Status::Writing`] or
//! [`Status::Inattentive`]; sleeping is a temporal property and is decided by
//! the [`crate::smoother`].

use crate::config::ClassifierConfig;
use crate::detection::PoseDetection;
use crate::keypoint::{Joint, KeypointLayout};
use crate::status::Status;

#[derive(Debug, Clone)]
pub struct PostureClassifier {
    layout: KeypointLayout,
    confidence_threshold: f32,
    raise_margin: f32,
}

impl PostureClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            layout: config.layout,
            confidence_threshold: config.confidence_threshold,
            raise_margin: config.raise_margin,
        }
    }

    #[inline]
    pub fn layout(&self) -> KeypointLayout {
        self.layout
    }

    pub fn classify(&self, det: &PoseDetection) -> Status {
        let kp = |joint| det.joint(self.layout, joint);
        let ok = |joint| kp(joint).is_confident(self.confidence_threshold);

        if !(ok(Joint::Nose) && ok(Joint::LeftShoulder) && ok(Joint::RightShoulder)) {
            return Status::Inattentive;
        }

        let shoulder_y = (kp(Joint::LeftShoulder).y() + kp(Joint::RightShoulder).y()) / 2.0;

        if kp(Joint::Nose).y() < shoulder_y - self.raise_margin {
            return Status::Attentive;
        }

        let hips_ok = ok(Joint::LeftHip) && ok(Joint::RightHip);
        let wrist_ok = ok(Joint::LeftWrist) || ok(Joint::RightWrist);

        if hips_ok && wrist_ok {
            let hip_y = (kp(Joint::LeftHip).y() + kp(Joint::RightHip).y()) / 2.0;
            let in_area = |y: f32| shoulder_y < y && y < hip_y;

            // wrist confidence is not re-checked per side here
            if in_area(kp(Joint::LeftWrist).y()) || in_area(kp(Joint::RightWrist).y()) {
                return Status::Writing;
            }
        }

        Status::Inattentive
    }

    /// Nose position for drawing a track label, when the nose clears the
    /// same confidence threshold used for classification.
    pub fn label_anchor(&self, det: &PoseDetection) -> Option<(f32, f32)> {
        let nose = det.joint(self.layout, Joint::Nose);
        if nose.is_confident(self.confidence_threshold) {
            Some((nose.x(), nose.y()))
        } else {
            None
        }
    }
}

impl Default for PostureClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}
