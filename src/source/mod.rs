//! Where pose samples come from. The detector itself lives outside this crate;
//! anything that can produce samples implements [`PoseSource`].

pub mod feed;
pub mod synthetic;

pub use feed::{pose_feed, spawn_source_pump, FeedEvent, PoseFeed, PoseFeedSender};
pub use synthetic::{PosePreset, ScriptStep, ScriptedPoseSource};

use crate::common::PoseSample;
use async_trait::async_trait;

#[async_trait]
pub trait PoseSource: Send {
    /// Next detection, or `None` when nobody is in view.
    async fn next_sample(&mut self) -> Option<PoseSample>;

    fn name(&self) -> &'static str;
}
