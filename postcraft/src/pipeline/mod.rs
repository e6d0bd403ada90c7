//! Running the stages and presenting the result.

mod bundle;
mod integration_tests;
mod progress;
mod runner;

pub use bundle::PostBundle;
pub use progress::{
    CollectingProgressObserver, LoggingProgressObserver, NoOpProgressObserver, ProgressEvent,
    ProgressObserver,
};
pub use runner::StageRunner;
