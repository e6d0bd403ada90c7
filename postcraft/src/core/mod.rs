//! Core domain types for postcraft.
//!
//! This module contains:
//! - Stage names, kinds and progress percents
//! - Topic newtype
//! - Stage results and generated images

mod image;
mod result;
mod stage;
mod topic;

pub use image::GeneratedImage;
pub use result::{StageOutput, StageResult};
pub use stage::{StageKind, StageName, COMPLETE_PERCENT};
pub use topic::Topic;
