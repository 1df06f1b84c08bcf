use serde_derive::{Deserialize, Serialize};

use crate::keypoint::{Joint, Keypoint, KeypointLayout};

/// One tracked person as reported by the pose source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PoseDetection {
    #[serde(rename = "id")]
    pub track_id: u32,
    #[serde(rename = "kp")]
    pub keypoints: Vec<Keypoint>,
}

impl PoseDetection {
    pub fn new(track_id: u32, keypoints: Vec<Keypoint>) -> Self {
        Self {
            track_id,
            keypoints,
        }
    }

    /// Looks up a joint, treating joints past the end of the array as undetected.
    #[inline]
    pub fn joint(&self, layout: KeypointLayout, joint: Joint) -> Keypoint {
        self.keypoints
            .get(layout.index(joint))
            .copied()
            .unwrap_or_else(Keypoint::missing)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}
