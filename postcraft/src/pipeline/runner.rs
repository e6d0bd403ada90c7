//! Sequential stage runner.

use super::progress::ProgressObserver;
use crate::config::{ApiKey, PostcraftConfig};
use crate::context::RunContext;
use crate::core::{StageResult, Topic};
use crate::errors::{ConfigError, GenerationError, PostcraftError, StageFailure};
use crate::model::GenerationBackend;
use crate::stages::{default_stages, Stage, StageContext};
use chrono::{Local, NaiveDate, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, Instrument};

/// Runs the stages one after another against a shared run context.
///
/// Each stage waits for the previous one. The first failure aborts the run
/// and nothing is retried.
#[derive(Clone)]
pub struct StageRunner {
    backend: Arc<dyn GenerationBackend>,
    credential: Option<ApiKey>,
    stages: Vec<Arc<dyn Stage>>,
    stage_timeout: Duration,
    run_date: Option<NaiveDate>,
}

impl fmt::Debug for StageRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRunner")
            .field("stages", &self.stage_names())
            .field("stage_timeout", &self.stage_timeout)
            .field("run_date", &self.run_date)
            .field("has_credential", &self.credential.is_some())
            .finish_non_exhaustive()
    }
}

impl StageRunner {
    /// Creates a runner with the default six stages.
    #[must_use]
    pub fn new(
        config: &PostcraftConfig,
        backend: Arc<dyn GenerationBackend>,
        credential: Option<ApiKey>,
    ) -> Self {
        Self {
            backend,
            credential,
            stages: default_stages(config),
            stage_timeout: config.stage_timeout(),
            run_date: None,
        }
    }

    /// Replaces the stage list.
    #[must_use]
    pub fn with_stages(mut self, stages: Vec<Arc<dyn Stage>>) -> Self {
        self.stages = stages;
        self
    }

    /// Pins the date given to the News Finder.
    #[must_use]
    pub fn with_run_date(mut self, date: NaiveDate) -> Self {
        self.run_date = Some(date);
        self
    }

    /// Overrides the per-stage timeout.
    #[must_use]
    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Returns the stage names in run order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<crate::core::StageName> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Returns the per-stage timeout.
    #[must_use]
    pub fn stage_timeout(&self) -> Duration {
        self.stage_timeout
    }

    /// Runs every stage for `topic`.
    ///
    /// # Errors
    ///
    /// Returns `Config(MissingApiKey)` before any remote call when no
    /// credential is set, or `Stage` naming the first stage that failed.
    pub async fn run(
        &self,
        topic: Topic,
        observer: &dyn ProgressObserver,
    ) -> Result<RunContext, PostcraftError> {
        if self.credential.is_none() {
            return Err(ConfigError::MissingApiKey.into());
        }

        let run_date = self.run_date.unwrap_or_else(|| Local::now().date_naive());
        let run = RunContext::new(topic, run_date);
        let span = info_span!("run", run_id = %run.run_id(), topic = %run.topic());

        self.run_stages(run, observer).instrument(span).await
    }

    async fn run_stages(
        &self,
        mut run: RunContext,
        observer: &dyn ProgressObserver,
    ) -> Result<RunContext, PostcraftError> {
        let start = Instant::now();
        info!(stages = self.stages.len(), "run.started");

        for stage in &self.stages {
            let name = stage.name();
            observer.notify(name, name.progress_percent());
            info!(stage = %name, "stage.started");

            let started_at = Utc::now();
            let stage_start = Instant::now();
            let ctx = StageContext {
                run: &run,
                backend: self.backend.as_ref(),
                credential: self.credential.as_ref(),
            };
            let outcome = tokio::time::timeout(self.stage_timeout, stage.execute(&ctx))
                .await
                .unwrap_or_else(|_| {
                    Err(GenerationError::Timeout {
                        seconds: self.stage_timeout.as_secs_f64(),
                    })
                });
            let stage_duration_ms = stage_start.elapsed().as_secs_f64() * 1000.0;

            match outcome {
                Ok(output) => {
                    info!(
                        stage = %name,
                        duration_ms = stage_duration_ms,
                        output_len = output.len(),
                        "stage.completed"
                    );
                    run.record(StageResult::completed(name, output, started_at))?;
                }
                Err(source) => {
                    let failure = StageFailure::new(name, source);
                    error!(
                        stage = %name,
                        duration_ms = stage_duration_ms,
                        error = %failure.source,
                        "stage.failed"
                    );
                    return Err(failure.into());
                }
            }
        }

        observer.complete();
        info!(
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "run.completed"
        );
        Ok(run)
    }
}
