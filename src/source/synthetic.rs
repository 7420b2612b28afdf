use super::PoseSource;
use crate::common::{BoundingBox, Clock, Joint, Keypoint, PoseSample, VisibilityPolicy};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const PRESET_CONFIDENCE: f32 = 0.9;

/// Canned skeletons in a 640x640 frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PosePreset {
    Standing,
    HandsUp,
    Jumping,
    JumpingJackOpen,
    Squatting,
    LungeBottom,
    PushupUp,
    PushupDown,
    ClimberLeftDrive,
    ClimberRightDrive,
    LyingDown,
    SitupUp,
    Seated,
    TwistLeft,
    TwistRight,
    KneeLeftUp,
    KneeRightUp,
}

type Table = [(f32, f32); Joint::COUNT];

// nose, l/r eye, l/r ear, l/r shoulder, l/r elbow, l/r wrist, l/r hip, l/r knee, l/r ankle
const STANDING: Table = [
    (320.0, 100.0),
    (310.0, 90.0),
    (330.0, 90.0),
    (300.0, 100.0),
    (340.0, 100.0),
    (280.0, 180.0),
    (360.0, 180.0),
    (250.0, 280.0),
    (390.0, 280.0),
    (240.0, 350.0),
    (400.0, 350.0),
    (290.0, 350.0),
    (350.0, 350.0),
    (285.0, 480.0),
    (355.0, 480.0),
    (280.0, 600.0),
    (360.0, 600.0),
];

// side view, shins vertical, thighs level with the knees
const SQUATTING: Table = [
    (210.0, 270.0),
    (205.0, 262.0),
    (215.0, 262.0),
    (200.0, 270.0),
    (220.0, 270.0),
    (200.0, 330.0),
    (220.0, 330.0),
    (260.0, 380.0),
    (280.0, 380.0),
    (320.0, 380.0),
    (340.0, 380.0),
    (180.0, 485.0),
    (200.0, 485.0),
    (300.0, 480.0),
    (320.0, 480.0),
    (300.0, 600.0),
    (320.0, 600.0),
];

const LUNGE_BOTTOM: Table = [
    (305.0, 240.0),
    (300.0, 232.0),
    (310.0, 232.0),
    (295.0, 240.0),
    (315.0, 240.0),
    (295.0, 300.0),
    (315.0, 300.0),
    (290.0, 370.0),
    (320.0, 370.0),
    (290.0, 430.0),
    (320.0, 430.0),
    (300.0, 450.0),
    (310.0, 450.0),
    (380.0, 455.0),
    (300.0, 540.0),
    (380.0, 560.0),
    (200.0, 545.0),
];

// side view plank on straight arms, head to the left
const PUSHUP_UP: Table = [
    (150.0, 390.0),
    (155.0, 382.0),
    (158.0, 382.0),
    (165.0, 385.0),
    (168.0, 385.0),
    (200.0, 400.0),
    (205.0, 400.0),
    (200.0, 470.0),
    (205.0, 470.0),
    (200.0, 540.0),
    (205.0, 540.0),
    (360.0, 410.0),
    (365.0, 410.0),
    (470.0, 420.0),
    (475.0, 420.0),
    (580.0, 430.0),
    (585.0, 430.0),
];

const PUSHUP_DOWN: Table = [
    (150.0, 475.0),
    (155.0, 467.0),
    (158.0, 467.0),
    (165.0, 470.0),
    (168.0, 470.0),
    (200.0, 480.0),
    (205.0, 480.0),
    (270.0, 480.0),
    (275.0, 480.0),
    (270.0, 540.0),
    (275.0, 540.0),
    (360.0, 488.0),
    (365.0, 488.0),
    (470.0, 480.0),
    (475.0, 480.0),
    (580.0, 472.0),
    (585.0, 472.0),
];

// on the back, knees bent, head to the left
const LYING_DOWN: Table = [
    (150.0, 510.0),
    (148.0, 502.0),
    (152.0, 502.0),
    (160.0, 505.0),
    (163.0, 505.0),
    (200.0, 520.0),
    (205.0, 520.0),
    (230.0, 530.0),
    (235.0, 530.0),
    (250.0, 510.0),
    (255.0, 510.0),
    (360.0, 520.0),
    (365.0, 520.0),
    (440.0, 450.0),
    (445.0, 450.0),
    (520.0, 520.0),
    (525.0, 520.0),
];

const SITUP_UP: Table = [
    (330.0, 350.0),
    (328.0, 342.0),
    (332.0, 342.0),
    (338.0, 346.0),
    (341.0, 346.0),
    (340.0, 400.0),
    (345.0, 400.0),
    (360.0, 430.0),
    (365.0, 430.0),
    (380.0, 440.0),
    (385.0, 440.0),
    (360.0, 520.0),
    (365.0, 520.0),
    (440.0, 450.0),
    (445.0, 450.0),
    (520.0, 520.0),
    (525.0, 520.0),
];

// facing the camera, seated with the torso leaned back
const SEATED: Table = [
    (320.0, 220.0),
    (310.0, 210.0),
    (330.0, 210.0),
    (300.0, 220.0),
    (340.0, 220.0),
    (280.0, 300.0),
    (360.0, 300.0),
    (290.0, 370.0),
    (350.0, 370.0),
    (310.0, 420.0),
    (330.0, 420.0),
    (290.0, 450.0),
    (350.0, 450.0),
    (270.0, 400.0),
    (370.0, 400.0),
    (260.0, 480.0),
    (380.0, 480.0),
];

impl PosePreset {
    pub const ALL: [PosePreset; 17] = [
        PosePreset::Standing,
        PosePreset::HandsUp,
        PosePreset::Jumping,
        PosePreset::JumpingJackOpen,
        PosePreset::Squatting,
        PosePreset::LungeBottom,
        PosePreset::PushupUp,
        PosePreset::PushupDown,
        PosePreset::ClimberLeftDrive,
        PosePreset::ClimberRightDrive,
        PosePreset::LyingDown,
        PosePreset::SitupUp,
        PosePreset::Seated,
        PosePreset::TwistLeft,
        PosePreset::TwistRight,
        PosePreset::KneeLeftUp,
        PosePreset::KneeRightUp,
    ];

    pub fn keypoints(self) -> [Keypoint; Joint::COUNT] {
        let mut table = match self {
            PosePreset::Squatting => SQUATTING,
            PosePreset::LungeBottom => LUNGE_BOTTOM,
            PosePreset::PushupUp
            | PosePreset::ClimberLeftDrive
            | PosePreset::ClimberRightDrive => PUSHUP_UP,
            PosePreset::PushupDown => PUSHUP_DOWN,
            PosePreset::LyingDown => LYING_DOWN,
            PosePreset::SitupUp => SITUP_UP,
            PosePreset::Seated | PosePreset::TwistLeft | PosePreset::TwistRight => SEATED,
            _ => STANDING,
        };

        let moved: &[(Joint, (f32, f32))] = match self {
            PosePreset::HandsUp => &[
                (Joint::LeftElbow, (260.0, 120.0)),
                (Joint::RightElbow, (380.0, 120.0)),
                (Joint::LeftWrist, (250.0, 40.0)),
                (Joint::RightWrist, (390.0, 40.0)),
            ],
            PosePreset::JumpingJackOpen => &[
                (Joint::LeftElbow, (230.0, 120.0)),
                (Joint::RightElbow, (410.0, 120.0)),
                (Joint::LeftWrist, (200.0, 60.0)),
                (Joint::RightWrist, (440.0, 60.0)),
                (Joint::LeftKnee, (245.0, 480.0)),
                (Joint::RightKnee, (395.0, 480.0)),
                (Joint::LeftAnkle, (200.0, 600.0)),
                (Joint::RightAnkle, (440.0, 600.0)),
            ],
            PosePreset::ClimberLeftDrive => &[
                (Joint::LeftKnee, (280.0, 450.0)),
                (Joint::LeftAnkle, (390.0, 470.0)),
            ],
            PosePreset::ClimberRightDrive => &[
                (Joint::RightKnee, (285.0, 450.0)),
                (Joint::RightAnkle, (395.0, 470.0)),
            ],
            PosePreset::TwistLeft => &[
                (Joint::LeftWrist, (250.0, 420.0)),
                (Joint::RightWrist, (270.0, 420.0)),
            ],
            PosePreset::TwistRight => &[
                (Joint::LeftWrist, (370.0, 420.0)),
                (Joint::RightWrist, (390.0, 420.0)),
            ],
            PosePreset::KneeLeftUp => &[
                (Joint::LeftKnee, (285.0, 360.0)),
                (Joint::LeftAnkle, (300.0, 470.0)),
            ],
            PosePreset::KneeRightUp => &[
                (Joint::RightKnee, (355.0, 360.0)),
                (Joint::RightAnkle, (340.0, 470.0)),
            ],
            _ => &[],
        };
        for &(joint, point) in moved {
            table[joint.index()] = point;
        }

        if self == PosePreset::Jumping {
            // whole body lifted off the floor, arms raised
            for point in table.iter_mut() {
                point.1 -= 50.0;
            }
            table[Joint::LeftWrist.index()] = (240.0, 20.0);
            table[Joint::RightWrist.index()] = (400.0, 20.0);
        }

        table.map(|(x, y)| Keypoint::new(x, y, PRESET_CONFIDENCE))
    }

    pub fn sample(self, frame_id: u64, captured_at: Duration) -> PoseSample {
        let keypoints = self.keypoints();
        let policy = VisibilityPolicy::default();
        let sample = PoseSample::new(keypoints, frame_id, captured_at);
        match BoundingBox::from_keypoints(&keypoints, policy.threshold) {
            Some(bbox) => sample.with_bbox(bbox),
            None => sample,
        }
    }
}

/// One step of a scripted session; `None` means nobody in view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptStep {
    pub preset: Option<PosePreset>,
    pub duration: Duration,
}

impl ScriptStep {
    pub fn pose(preset: PosePreset, duration: Duration) -> Self {
        Self {
            preset: Some(preset),
            duration,
        }
    }

    pub fn absent(duration: Duration) -> Self {
        Self {
            preset: None,
            duration,
        }
    }
}

/// Plays a timeline of presets against a clock, standing in for the detector.
pub struct ScriptedPoseSource {
    script: Vec<ScriptStep>,
    clock: Arc<dyn Clock>,
    started: Duration,
    looping: bool,
    jitter_px: f32,
    policy: VisibilityPolicy,
    rng: StdRng,
    frame_id: u64,
}

impl ScriptedPoseSource {
    pub fn new(script: Vec<ScriptStep>, clock: Arc<dyn Clock>) -> Self {
        let started = clock.now();
        Self {
            script,
            clock,
            started,
            looping: false,
            jitter_px: 0.0,
            policy: VisibilityPolicy::default(),
            rng: StdRng::seed_from_u64(0),
            frame_id: 0,
        }
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Uniform positional noise of up to `pixels` on every joint
    pub fn with_jitter(mut self, pixels: f32, seed: u64) -> Self {
        self.jitter_px = pixels.max(0.0);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_policy(mut self, policy: VisibilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn script_length(&self) -> Duration {
        self.script.iter().map(|step| step.duration).sum()
    }

    /// Preset active at `elapsed` into the script; the last step holds once finished.
    pub fn preset_at(&self, elapsed: Duration) -> Option<PosePreset> {
        let total = self.script_length();
        if total.is_zero() {
            return None;
        }
        let mut offset = if self.looping {
            Duration::from_nanos((elapsed.as_nanos() % total.as_nanos()) as u64)
        } else {
            elapsed
        };
        for step in &self.script {
            if offset < step.duration {
                return step.preset;
            }
            offset -= step.duration;
        }
        self.script.last().and_then(|step| step.preset)
    }

    fn render(&mut self, preset: PosePreset, captured_at: Duration) -> PoseSample {
        let mut keypoints = preset.keypoints();
        if self.jitter_px > 0.0 {
            for kp in keypoints.iter_mut() {
                let dx = self.rng.random_range(-self.jitter_px..=self.jitter_px);
                let dy = self.rng.random_range(-self.jitter_px..=self.jitter_px);
                *kp = Keypoint::new((kp.x + dx).max(0.0), (kp.y + dy).max(0.0), kp.confidence);
            }
        }
        let sample =
            PoseSample::new(keypoints, self.frame_id, captured_at).with_policy(self.policy);
        match BoundingBox::from_keypoints(&keypoints, self.policy.threshold) {
            Some(bbox) => sample.with_bbox(bbox),
            None => sample,
        }
    }
}

#[async_trait]
impl PoseSource for ScriptedPoseSource {
    async fn next_sample(&mut self) -> Option<PoseSample> {
        self.frame_id += 1;
        let now = self.clock.now();
        let preset = self.preset_at(now.saturating_sub(self.started))?;
        Some(self.render(preset, now))
    }

    fn name(&self) -> &'static str {
        "ScriptedPoseSource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ManualClock;

    #[test]
    fn every_preset_is_a_usable_sample() {
        for preset in PosePreset::ALL {
            let sample = preset.sample(1, Duration::ZERO);
            assert!(sample.is_usable(), "{preset:?} is not usable");
            assert!(sample.bbox().is_some());
        }
    }

    #[test]
    fn jumping_lifts_the_ankles() {
        let standing = PosePreset::Standing.keypoints();
        let jumping = PosePreset::Jumping.keypoints();
        let rise = standing[Joint::LeftAnkle.index()].y - jumping[Joint::LeftAnkle.index()].y;
        assert_eq!(rise, 50.0);
    }

    #[test]
    fn script_walks_the_timeline() {
        let clock = ManualClock::new();
        let source = ScriptedPoseSource::new(
            vec![
                ScriptStep::pose(PosePreset::Standing, Duration::from_secs(1)),
                ScriptStep::absent(Duration::from_secs(1)),
                ScriptStep::pose(PosePreset::HandsUp, Duration::from_secs(1)),
            ],
            Arc::new(clock),
        );
        assert_eq!(source.preset_at(Duration::from_millis(500)), Some(PosePreset::Standing));
        assert_eq!(source.preset_at(Duration::from_millis(1500)), None);
        assert_eq!(source.preset_at(Duration::from_millis(2500)), Some(PosePreset::HandsUp));
        assert_eq!(source.preset_at(Duration::from_secs(10)), Some(PosePreset::HandsUp));

        let looping = source.looping(true);
        assert_eq!(looping.preset_at(Duration::from_millis(3500)), Some(PosePreset::Standing));
    }

    #[tokio::test]
    async fn scripted_source_stamps_frames_with_clock_time() {
        let clock = ManualClock::new();
        let mut source = ScriptedPoseSource::new(
            vec![ScriptStep::pose(PosePreset::Standing, Duration::from_secs(5))],
            Arc::new(clock.clone()),
        )
        .with_jitter(2.0, 7);

        clock.advance(Duration::from_millis(40));
        let first = source.next_sample().await.unwrap();
        clock.advance(Duration::from_millis(40));
        let second = source.next_sample().await.unwrap();

        assert_eq!(first.frame_id(), 1);
        assert_eq!(second.frame_id(), 2);
        assert_eq!(second.captured_at(), Duration::from_millis(80));
        assert!(second.is_usable());
    }
}
