use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Single 2-D keypoint in image coordinates (y grows downward).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Keypoint {
    pub pos: na::Point2<f32>,
    pub confidence: f32,
}

impl Keypoint {
    #[inline]
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self {
            pos: na::Point2::new(x, y),
            confidence,
        }
    }

    /// Placeholder for joints the detector did not report.
    #[inline]
    pub fn missing() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline(always)]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.confidence > threshold
    }
}

impl From<[f32; 3]> for Keypoint {
    fn from([x, y, confidence]: [f32; 3]) -> Self {
        Self::new(x, y, confidence)
    }
}

impl From<Keypoint> for [f32; 3] {
    fn from(kp: Keypoint) -> Self {
        [kp.pos.x, kp.pos.y, kp.confidence]
    }
}

/// Joints the posture heuristics look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
}

/// Index topology of the keypoint array produced by the pose model.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KeypointLayout {
    /// 33-point BlazePose / MediaPipe topology.
    #[default]
    BlazePose33,
    /// 17-point COCO topology (YOLO pose models).
    Coco17,
}

impl KeypointLayout {
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            KeypointLayout::BlazePose33 => 33,
            KeypointLayout::Coco17 => 17,
        }
    }

    pub fn index(&self, joint: Joint) -> usize {
        match self {
            KeypointLayout::BlazePose33 => match joint {
                Joint::Nose => 0,
                Joint::LeftShoulder => 11,
                Joint::RightShoulder => 12,
                Joint::LeftWrist => 15,
                Joint::RightWrist => 16,
                Joint::LeftHip => 23,
                Joint::RightHip => 24,
            },
            KeypointLayout::Coco17 => match joint {
                Joint::Nose => 0,
                Joint::LeftShoulder => 5,
                Joint::RightShoulder => 6,
                Joint::LeftWrist => 9,
                Joint::RightWrist => 10,
                Joint::LeftHip => 11,
                Joint::RightHip => 12,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypoint_deserializes_from_triple() {
        let kp: Keypoint = serde_json::from_str("[12.5, 40.0, 0.9]").unwrap();
        assert_eq!(kp, Keypoint::new(12.5, 40.0, 0.9));
        assert!(kp.is_confident(0.5));
        assert!(!Keypoint::new(0.0, 0.0, 0.5).is_confident(0.5));
    }

    #[test]
    fn layouts_place_joints_inside_the_array() {
        let joints = [
            Joint::Nose,
            Joint::LeftShoulder,
            Joint::RightShoulder,
            Joint::LeftWrist,
            Joint::RightWrist,
            Joint::LeftHip,
            Joint::RightHip,
        ];

        for layout in [KeypointLayout::BlazePose33, KeypointLayout::Coco17] {
            for joint in joints {
                assert!(layout.index(joint) < layout.len());
            }
        }

        assert_eq!(KeypointLayout::Coco17.index(Joint::LeftHip), 11);
        assert_eq!(KeypointLayout::BlazePose33.index(Joint::LeftHip), 23);
    }
}
