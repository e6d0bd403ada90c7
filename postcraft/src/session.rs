//! Interactive sessions.
//!
//! A session holds a validated credential and the outcome of the latest run.
//! Only one run may be in flight per session at a time.

use crate::config::{ApiKey, PostcraftConfig};
use crate::context::RunContext;
use crate::core::Topic;
use crate::errors::{ConfigError, GenerationError, PostcraftError};
use crate::model::{GeminiClient, GenerationBackend};
use crate::pipeline::{PostBundle, ProgressObserver, StageRunner};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Debug, Default)]
struct SessionState {
    topic: Option<Topic>,
    last_run: Option<Arc<RunContext>>,
}

/// One user's post-generation session.
#[derive(Debug)]
pub struct PostSession {
    runner: StageRunner,
    in_flight: Mutex<()>,
    state: RwLock<SessionState>,
}

impl PostSession {
    /// Builds a [`GeminiClient`] carrying `key`, validates that same key and
    /// opens a session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidApiKey` if the client cannot be built, or `Rejected` if
    /// the service refuses the key.
    pub async fn connect(config: &PostcraftConfig, key: ApiKey) -> Result<Self, PostcraftError> {
        let backend = Arc::new(GeminiClient::new(config, &key)?);
        Self::open(config, key, backend).await
    }

    /// Validates the backend's credential and opens a session.
    ///
    /// The backend owns the credential it sends; `key` must be the one it was
    /// built with. The session keeps `key` only to refuse runs up front when
    /// no credential is configured. Use [`connect`](Self::connect) to derive
    /// both from one key.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` if the service refuses the key.
    pub async fn open(
        config: &PostcraftConfig,
        key: ApiKey,
        backend: Arc<dyn GenerationBackend>,
    ) -> Result<Self, PostcraftError> {
        match backend.list_models().await {
            Ok(models) => info!(models = models.len(), "API key accepted"),
            Err(GenerationError::BadResponse { code, description }) => {
                warn!(code, "API key rejected");
                return Err(ConfigError::Rejected { code, description }.into());
            }
            Err(GenerationError::Config(err)) => return Err(err.into()),
            Err(err) => {
                warn!(error = %err, "API key could not be validated");
                return Err(ConfigError::Rejected {
                    code: 0,
                    description: Some(err.to_string()),
                }
                .into());
            }
        }

        Ok(Self::from_runner(StageRunner::new(config, backend, Some(key))))
    }

    /// Wraps an already configured runner without validating anything.
    #[must_use]
    pub fn from_runner(runner: StageRunner) -> Self {
        Self {
            runner,
            in_flight: Mutex::new(()),
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Pins the run date for every run of this session.
    #[must_use]
    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.runner = self.runner.with_run_date(date);
        self
    }

    /// Returns the runner.
    #[must_use]
    pub fn runner(&self) -> &StageRunner {
        &self.runner
    }

    /// Generates a post for `topic`.
    ///
    /// On success the run is stored as the session's latest result. A failed
    /// run leaves the previous result in place.
    ///
    /// # Errors
    ///
    /// Returns `RunInProgress` if another run is in flight, `EmptyTopic` for a
    /// blank topic, or the runner's error.
    pub async fn generate(
        &self,
        topic: &str,
        observer: &dyn ProgressObserver,
    ) -> Result<Arc<RunContext>, PostcraftError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("rejected a second concurrent run");
            return Err(PostcraftError::RunInProgress);
        };

        let topic = Topic::new(topic)?;
        let run = Arc::new(self.runner.run(topic.clone(), observer).await?);

        let mut state = self.state.write();
        state.topic = Some(topic);
        state.last_run = Some(Arc::clone(&run));
        Ok(run)
    }

    /// The latest successful run.
    #[must_use]
    pub fn last_result(&self) -> Option<Arc<RunContext>> {
        self.state.read().last_run.clone()
    }

    /// The latest run as a presentation bundle.
    #[must_use]
    pub fn last_bundle(&self) -> Option<PostBundle> {
        self.last_result().and_then(|run| PostBundle::from_run(&run))
    }

    /// The topic of the latest successful run.
    #[must_use]
    pub fn current_topic(&self) -> Option<Topic> {
        self.state.read().topic.clone()
    }

    /// Clears stored results so the next post starts fresh.
    pub fn reset(&self) {
        *self.state.write() = SessionState::default();
    }

    /// Returns true while a run is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }
}
