pub mod clock;
pub mod geometry;
pub mod pose;

pub use clock::{Clock, ManualClock, SystemClock};
pub use pose::{BoundingBox, Joint, Keypoint, PoseSample, VisibilityPolicy};
