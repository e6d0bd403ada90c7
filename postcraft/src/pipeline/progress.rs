//! Progress observers.

use crate::core::{StageName, COMPLETE_PERCENT};
use tracing::{debug, info, Level};

/// Receives coarse progress as a run advances.
///
/// `notify` is called once per stage, just before the stage executes.
/// `complete` is called once after the last stage succeeds.
pub trait ProgressObserver: Send + Sync {
    /// A stage is about to start.
    fn notify(&self, stage: StageName, percent: u8);

    /// The run finished successfully.
    fn complete(&self) {}
}

impl<F> ProgressObserver for F
where
    F: Fn(Option<StageName>, u8) + Send + Sync,
{
    fn notify(&self, stage: StageName, percent: u8) {
        self(Some(stage), percent);
    }

    fn complete(&self) {
        self(None, COMPLETE_PERCENT);
    }
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgressObserver;

impl ProgressObserver for NoOpProgressObserver {
    fn notify(&self, _stage: StageName, _percent: u8) {}
}

/// Logs progress through `tracing`.
#[derive(Debug, Clone)]
pub struct LoggingProgressObserver {
    level: Level,
}

impl Default for LoggingProgressObserver {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingProgressObserver {
    /// Creates a logging observer at the given level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level observer.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl ProgressObserver for LoggingProgressObserver {
    fn notify(&self, stage: StageName, percent: u8) {
        if self.level == Level::DEBUG {
            debug!(stage = %stage, percent, "{}", stage.activity());
        } else {
            info!(stage = %stage, percent, "{}", stage.activity());
        }
    }

    fn complete(&self) {
        if self.level == Level::DEBUG {
            debug!(percent = COMPLETE_PERCENT, "Post ready");
        } else {
            info!(percent = COMPLETE_PERCENT, "Post ready");
        }
    }
}

/// One observed progress update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// The stage, or `None` for completion.
    pub stage: Option<StageName>,
    /// Percent complete.
    pub percent: u8,
}

/// Collects progress updates for later inspection.
#[derive(Debug, Default)]
pub struct CollectingProgressObserver {
    events: parking_lot::RwLock<Vec<ProgressEvent>>,
}

impl CollectingProgressObserver {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all updates in order.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.read().clone()
    }

    /// Returns the stages notified, in order.
    #[must_use]
    pub fn stages(&self) -> Vec<StageName> {
        self.events.read().iter().filter_map(|e| e.stage).collect()
    }

    /// Returns the reported percents, in order.
    #[must_use]
    pub fn percents(&self) -> Vec<u8> {
        self.events.read().iter().map(|e| e.percent).collect()
    }

    /// Returns true once completion was reported.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.events.read().iter().any(|e| e.stage.is_none())
    }

    /// Clears collected updates.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl ProgressObserver for CollectingProgressObserver {
    fn notify(&self, stage: StageName, percent: u8) {
        self.events.write().push(ProgressEvent {
            stage: Some(stage),
            percent,
        });
    }

    fn complete(&self) {
        self.events.write().push(ProgressEvent {
            stage: None,
            percent: COMPLETE_PERCENT,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_collecting_progress() {
        let observer = CollectingProgressObserver::new();
        observer.notify(StageName::NewsFinder, 5);
        observer.notify(StageName::ContentPlanner, 25);
        assert!(!observer.is_complete());

        observer.complete();

        assert_eq!(
            observer.stages(),
            vec![StageName::NewsFinder, StageName::ContentPlanner]
        );
        assert_eq!(observer.percents(), vec![5, 25, 100]);
        assert!(observer.is_complete());

        observer.clear();
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_closure_observer() {
        let seen = Mutex::new(Vec::new());
        let observer = |stage: Option<StageName>, percent: u8| seen.lock().push((stage, percent));

        observer.notify(StageName::Editor, 65);
        ProgressObserver::complete(&observer);

        assert_eq!(
            *seen.lock(),
            vec![(Some(StageName::Editor), 65), (None, 100)]
        );
    }

    #[test]
    fn test_logging_and_noop_do_not_panic() {
        LoggingProgressObserver::default().notify(StageName::Copywriter, 45);
        LoggingProgressObserver::debug().complete();
        NoOpProgressObserver.notify(StageName::Copywriter, 45);
        NoOpProgressObserver.complete();
    }
}
