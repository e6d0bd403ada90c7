//! # Postcraft
//!
//! Turns a topic into a publishable social-media post and a matching image.
//!
//! A run passes the topic through six stages, strictly one after another:
//!
//! - **News Finder** searches the web for recent developments on the topic
//! - **Content Planner** turns them into an outline
//! - **Copywriter** drafts the post
//! - **Editor** approves the draft or rewrites it
//! - **Image Prompt Writer** describes an illustration
//! - **Image Generator** renders it
//!
//! Every stage output lands in a [`context::RunContext`]; the first failure
//! aborts the run and names the stage that caused it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use postcraft::prelude::*;
//!
//! let config = PostcraftConfig::from_env()?;
//! let key = ApiKey::from_env()?;
//! let backend = Arc::new(GeminiClient::new(&config, &key)?);
//!
//! let session = PostSession::open(&config, key, backend).await?;
//! let run = session.generate("electric cars", &LoggingProgressObserver::default()).await?;
//! println!("{}", run.final_text().unwrap_or_default());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod model;
pub mod observability;
pub mod pipeline;
pub mod session;
pub mod stages;
pub mod testing;
pub mod text;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ApiKey, PostcraftConfig};
    pub use crate::context::{Conversation, RunContext};
    pub use crate::core::{GeneratedImage, StageName, StageOutput, StageResult, Topic};
    pub use crate::errors::{
        ConfigError, GenerationError, OutputConflictError, PostcraftError, StageFailure,
    };
    pub use crate::model::{GeminiClient, GenerationBackend, ToolCapability};
    pub use crate::pipeline::{
        LoggingProgressObserver, NoOpProgressObserver, PostBundle, ProgressObserver, StageRunner,
    };
    pub use crate::session::PostSession;
    pub use crate::stages::{is_ready_to_publish, Stage, READY_TO_PUBLISH};
    pub use crate::text::{markdown_to_plain_text, trailing_hashtags};
    pub use std::sync::Arc;
}
