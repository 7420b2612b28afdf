use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// COCO 17-joint skeleton layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(usize)]
pub enum Joint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl Joint {
    pub const COUNT: usize = 17;

    pub const ALL: [Joint; Joint::COUNT] = [
        Joint::Nose,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    /// Face joints used as the "head" reference
    pub const HEAD: [Joint; 5] = [
        Joint::Nose,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftEar,
        Joint::RightEar,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftEye => "left_eye",
            Joint::RightEye => "right_eye",
            Joint::LeftEar => "left_ear",
            Joint::RightEar => "right_ear",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftWrist => "left_wrist",
            Joint::RightWrist => "right_wrist",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
            Joint::LeftAnkle => "left_ankle",
            Joint::RightAnkle => "right_ankle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|joint| joint.as_str() == name)
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('_', " "))
    }
}

/// Single joint detection in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Detection confidence in [0, 1]
    pub confidence: f32,
}

impl Keypoint {
    /// Out-of-range confidences are clamped; non-finite coordinates zero the confidence.
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        let confidence = if x.is_finite() && y.is_finite() && confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { x, y, confidence }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.confidence > threshold
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Tight box around visible keypoints; None when fewer than two are visible.
    pub fn from_keypoints(keypoints: &[Keypoint], threshold: f32) -> Option<Self> {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        let mut count = 0u32;

        for kp in keypoints.iter().filter(|kp| kp.is_visible(threshold)) {
            min_x = min_x.min(kp.x);
            min_y = min_y.min(kp.y);
            max_x = max_x.max(kp.x);
            max_y = max_y.max(kp.y);
            count += 1;
        }

        if count < 2 {
            return None;
        }

        Some(Self {
            x1: min_x,
            y1: min_y,
            x2: max_x,
            y2: max_y,
        })
    }
}

/// Visibility rules applied to every joint of a sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityPolicy {
    pub threshold: f32,
    pub min_visible_joints: usize,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            min_visible_joints: 8,
        }
    }
}

/// One frame of skeletal data. Always holds all 17 joints; missing ones carry
/// zero confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseSample {
    keypoints: [Keypoint; Joint::COUNT],
    bbox: Option<BoundingBox>,
    frame_id: u64,
    captured_at: Duration,
    policy: VisibilityPolicy,
}

impl PoseSample {
    pub fn new(keypoints: [Keypoint; Joint::COUNT], frame_id: u64, captured_at: Duration) -> Self {
        Self {
            keypoints,
            bbox: None,
            frame_id,
            captured_at,
            policy: VisibilityPolicy::default(),
        }
    }

    /// A sample with every joint at zero confidence
    pub fn empty(frame_id: u64, captured_at: Duration) -> Self {
        Self::new([Keypoint::missing(); Joint::COUNT], frame_id, captured_at)
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_policy(mut self, policy: VisibilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn get(&self, joint: Joint) -> &Keypoint {
        &self.keypoints[joint.index()]
    }

    pub fn keypoints(&self) -> &[Keypoint; Joint::COUNT] {
        &self.keypoints
    }

    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn captured_at(&self) -> Duration {
        self.captured_at
    }

    pub fn policy(&self) -> VisibilityPolicy {
        self.policy
    }

    pub fn is_visible(&self, joint: Joint) -> bool {
        self.get(joint).is_visible(self.policy.threshold)
    }

    pub fn all_visible(&self, joints: &[Joint]) -> bool {
        joints.iter().all(|&joint| self.is_visible(joint))
    }

    pub fn visible_count(&self) -> usize {
        self.keypoints
            .iter()
            .filter(|kp| kp.is_visible(self.policy.threshold))
            .count()
    }

    /// Unusable samples are treated as "no player detected".
    pub fn is_usable(&self) -> bool {
        self.visible_count() >= self.policy.min_visible_joints
    }

    pub fn average_confidence(&self) -> f32 {
        let sum: f32 = self.keypoints.iter().map(|k| k.confidence).sum();
        sum / Joint::COUNT as f32
    }

    /// Smallest y among visible joints in `joints` (image y grows downward).
    pub fn highest_y(&self, joints: &[Joint]) -> Option<f32> {
        joints
            .iter()
            .filter(|&&joint| self.is_visible(joint))
            .map(|&joint| self.get(joint).y)
            .reduce(f32::min)
    }

    /// Mean y of the visible joints in `joints`
    pub fn mean_y(&self, joints: &[Joint]) -> Option<f32> {
        let visible: Vec<f32> = joints
            .iter()
            .filter(|&&joint| self.is_visible(joint))
            .map(|&joint| self.get(joint).y)
            .collect();
        if visible.is_empty() {
            return None;
        }
        Some(visible.iter().sum::<f32>() / visible.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_with_visible(count: usize) -> PoseSample {
        let mut keypoints = [Keypoint::missing(); Joint::COUNT];
        for (i, kp) in keypoints.iter_mut().enumerate().take(count) {
            *kp = Keypoint::new(10.0 * i as f32, 20.0, 0.9);
        }
        PoseSample::new(keypoints, 1, Duration::ZERO)
    }

    #[test]
    fn test_joint_index_roundtrip() {
        assert_eq!(Joint::COUNT, 17);
        assert_eq!(Joint::from_index(0), Some(Joint::Nose));
        assert_eq!(Joint::from_index(16), Some(Joint::RightAnkle));
        assert_eq!(Joint::from_index(17), None);
        assert_eq!(Joint::from_name("left_knee"), Some(Joint::LeftKnee));
        assert_eq!(Joint::from_name("tail"), None);
    }

    #[test]
    fn test_joint_display_is_human_readable() {
        assert_eq!(Joint::LeftShoulder.to_string(), "left shoulder");
    }

    #[test]
    fn test_keypoint_visibility_is_strictly_above_threshold() {
        assert!(Keypoint::new(1.0, 1.0, 0.51).is_visible(0.5));
        assert!(!Keypoint::new(1.0, 1.0, 0.5).is_visible(0.5));
    }

    #[test]
    fn test_keypoint_sanitizes_input() {
        assert_eq!(Keypoint::new(1.0, 1.0, 1.7).confidence, 1.0);
        assert_eq!(Keypoint::new(f32::NAN, 1.0, 0.9).confidence, 0.0);
    }

    #[test]
    fn test_usable_needs_eight_visible_joints() {
        assert!(!sample_with_visible(7).is_usable());
        assert!(sample_with_visible(8).is_usable());
        assert!(!PoseSample::empty(0, Duration::ZERO).is_usable());
    }

    #[test]
    fn test_bbox_from_keypoints() {
        let sample = sample_with_visible(3);
        let bbox = BoundingBox::from_keypoints(sample.keypoints(), 0.5).unwrap();
        assert_eq!(bbox.width(), 20.0);
        assert_eq!(bbox.height(), 0.0);
        assert!(BoundingBox::from_keypoints(sample_with_visible(1).keypoints(), 0.5).is_none());
    }

    #[test]
    fn test_highest_y_ignores_hidden_joints() {
        let mut keypoints = [Keypoint::missing(); Joint::COUNT];
        keypoints[Joint::Nose.index()] = Keypoint::new(0.0, 50.0, 0.9);
        keypoints[Joint::LeftEye.index()] = Keypoint::new(0.0, 10.0, 0.1);
        let sample = PoseSample::new(keypoints, 0, Duration::ZERO);
        assert_eq!(sample.highest_y(&Joint::HEAD), Some(50.0));
        assert_eq!(sample.highest_y(&[Joint::LeftAnkle]), None);
    }
}
