use crate::detection::PoseDetection;

#[derive(Debug, Clone, Default)]
pub struct PoseFrame {
    pub detections: Vec<PoseDetection>,
    pub timestamp: f64, // in seconds
}

impl PoseFrame {
    pub fn new(timestamp: f64, detections: Vec<PoseDetection>) -> Self {
        Self {
            detections,
            timestamp,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &PoseDetection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
