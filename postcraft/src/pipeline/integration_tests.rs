//! End-to-end tests for full runs against the stub backend.

#[cfg(test)]
mod tests {
    use crate::config::{ApiKey, PostcraftConfig};
    use crate::core::{StageName, Topic};
    use crate::errors::{ConfigError, GenerationError, PostcraftError};
    use crate::pipeline::{
        CollectingProgressObserver, NoOpProgressObserver, PostBundle, StageRunner,
    };
    use crate::session::PostSession;
    use crate::stages::{Stage, TextStage, NEWS_FINDER, READY_TO_PUBLISH};
    use crate::testing::StubBackend;
    use crate::text::trailing_hashtags;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    const DRAFT: &str = "Electric cars just got cheaper to run.\n\n#EV #CleanTech #Alura";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn key() -> Option<ApiKey> {
        Some(ApiKey::new("test-key").unwrap())
    }

    fn topic() -> Topic {
        Topic::new("electric cars").unwrap()
    }

    fn scripted() -> StubBackend {
        StubBackend::new()
            .with_response(StageName::NewsFinder, "1. Battery prices fell 20%")
            .with_response(StageName::ContentPlanner, "Theme: cheaper batteries")
            .with_response(StageName::Copywriter, DRAFT)
            .with_response(StageName::Editor, READY_TO_PUBLISH)
            .with_response(StageName::ImagePromptWriter, "A car charging at sunset")
    }

    fn runner_with(backend: &Arc<StubBackend>) -> StageRunner {
        let config = PostcraftConfig::default().with_image_output_path(None);
        StageRunner::new(&config, backend.clone(), key()).with_run_date(date())
    }

    #[tokio::test]
    async fn test_text_stages_run_in_order_with_non_empty_output() {
        let backend = Arc::new(scripted());
        let observer = CollectingProgressObserver::new();

        let run = assert_ok!(runner_with(&backend).run(topic(), &observer).await);

        assert_eq!(backend.called_stages(), StageName::ALL.to_vec());
        assert_eq!(run.stages(), StageName::ALL.to_vec());
        for stage in StageName::ALL.iter().take(5) {
            assert!(!run.text(*stage).unwrap().trim().is_empty(), "{stage} empty");
        }
        assert_eq!(observer.stages(), StageName::ALL.to_vec());
        assert!(observer.is_complete());
    }

    #[tokio::test]
    async fn test_upstream_outputs_flow_into_prompts() {
        let backend = Arc::new(scripted());

        assert_ok!(runner_with(&backend).run(topic(), &NoOpProgressObserver).await);

        let prompts: Vec<String> = backend
            .calls()
            .iter()
            .map(|c| c.request.prompt_text())
            .collect();
        assert_eq!(
            prompts[0],
            "Topic: electric cars\nToday's date: 18/10/2026"
        );
        assert!(prompts[1].contains("Found items: 1. Battery prices fell 20%"));
        assert!(prompts[2].contains("Post plan: Theme: cheaper batteries"));
        assert!(prompts[3].starts_with("Topic: electric cars\nDraft: Electric cars"));
        assert!(prompts[4].starts_with("Reviewed post: Electric cars"));
        assert_eq!(prompts[5], "A car charging at sunset\n");
    }

    #[tokio::test]
    async fn test_sentinel_keeps_draft_as_final_post() {
        let backend = Arc::new(scripted());

        let run = assert_ok!(runner_with(&backend).run(topic(), &NoOpProgressObserver).await);

        assert_eq!(run.review().unwrap().trim(), READY_TO_PUBLISH);
        assert_eq!(run.final_text(), run.draft());
    }

    #[tokio::test]
    async fn test_editor_rewrite_replaces_draft() {
        let rewrite = "Charging an EV now costs less than ever.\n\n#EV #Alura";
        let backend = Arc::new(scripted().with_response(StageName::Editor, rewrite));

        let run = assert_ok!(runner_with(&backend).run(topic(), &NoOpProgressObserver).await);

        let final_text = run.final_text().unwrap();
        assert_ne!(final_text, run.draft().unwrap());
        assert_eq!(final_text.trim(), rewrite);
    }

    #[tokio::test]
    async fn test_copywriter_closes_with_two_to_four_hashtags() {
        let backend = Arc::new(scripted());

        let run = assert_ok!(runner_with(&backend).run(topic(), &NoOpProgressObserver).await);

        let tags = trailing_hashtags(run.draft().unwrap());
        assert!((2..=4).contains(&tags.len()), "got {tags:?}");
        assert!(tags.iter().all(|t| t.starts_with('#')));
    }

    #[tokio::test]
    async fn test_missing_image_payload_is_not_a_failure() {
        let backend = Arc::new(scripted());

        let run = assert_ok!(runner_with(&backend).run(topic(), &NoOpProgressObserver).await);

        assert!(run.image().is_none());
        let bundle = PostBundle::from_run(&run).unwrap();
        assert!(!bundle.has_image);
    }

    #[tokio::test]
    async fn test_image_payload_is_returned_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated_image.png");
        let backend = Arc::new(scripted().with_image(vec![0x89, b'P', b'N', b'G'], "image/png"));
        let config = PostcraftConfig::default().with_image_output_path(Some(path.clone()));
        let runner = StageRunner::new(&config, backend.clone(), key()).with_run_date(date());

        let run = assert_ok!(runner.run(topic(), &NoOpProgressObserver).await);

        let image = run.image().unwrap();
        assert_eq!(image.bytes, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(std::fs::read(&path).unwrap(), image.bytes);
        assert_eq!(
            PostBundle::from_run(&run).unwrap().image_path,
            Some(path)
        );
    }

    #[tokio::test]
    async fn test_unsaved_image_reaches_the_json_bundle() {
        let backend = Arc::new(scripted().with_image(vec![1, 2, 3], "image/png"));

        let run = assert_ok!(runner_with(&backend).run(topic(), &NoOpProgressObserver).await);

        let bundle = PostBundle::from_run(&run).unwrap();
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["has_image"], true);
        assert!(json["image_path"].is_null());
        assert_eq!(json["image"]["bytes"], "AQID");
        assert_eq!(json["review"].as_str().unwrap().trim(), READY_TO_PUBLISH);
    }

    #[tokio::test]
    async fn test_failed_stage_stops_the_run() {
        for (index, failing) in StageName::ALL.iter().enumerate() {
            let backend = Arc::new(scripted().fail_for(*failing, 503, "overloaded"));
            let observer = CollectingProgressObserver::new();

            let err = assert_err!(runner_with(&backend).run(topic(), &observer).await);

            let PostcraftError::Stage(failure) = err else {
                panic!("expected a stage failure, got {err:?}");
            };
            assert_eq!(failure.stage, *failing);
            assert!(failure.to_string().contains(failing.label()));
            assert!(matches!(
                failure.source,
                GenerationError::BadResponse { code: 503, .. }
            ));
            assert_eq!(backend.called_stages(), StageName::ALL[..=index].to_vec());
            assert!(!observer.is_complete());
        }
    }

    #[tokio::test]
    async fn test_nth_call_failure_names_that_stage() {
        let backend = Arc::new(scripted().fail_on_call(3));

        let err = assert_err!(runner_with(&backend).run(topic(), &NoOpProgressObserver).await);

        assert!(matches!(
            err,
            PostcraftError::Stage(ref f) if f.stage == StageName::Copywriter
        ));
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_runs_are_deterministic() {
        let backend = Arc::new(scripted().with_image(vec![1, 2, 3], "image/png"));
        let runner = runner_with(&backend);

        let first = assert_ok!(runner.run(topic(), &NoOpProgressObserver).await);
        let first_prompts: Vec<String> =
            backend.calls().iter().map(|c| c.request.prompt_text()).collect();
        backend.reset();
        let second = assert_ok!(runner.run(topic(), &NoOpProgressObserver).await);
        let second_prompts: Vec<String> =
            backend.calls().iter().map(|c| c.request.prompt_text()).collect();

        for stage in StageName::ALL {
            assert_eq!(first.output(stage), second.output(stage), "{stage} differs");
        }
        assert_eq!(first_prompts, second_prompts);
        assert_ne!(first.run_id(), second.run_id());
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_calls() {
        let backend = Arc::new(scripted());
        let runner = StageRunner::new(&PostcraftConfig::default(), backend.clone(), None);

        let err = assert_err!(runner.run(topic(), &NoOpProgressObserver).await);

        assert!(matches!(
            err,
            PostcraftError::Config(ConfigError::MissingApiKey)
        ));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_slow_stage_times_out() {
        let backend =
            Arc::new(scripted().with_delay(StageName::Editor, Duration::from_secs(30)));
        let runner = runner_with(&backend).with_stage_timeout(Duration::from_millis(50));

        let err = assert_err!(runner.run(topic(), &NoOpProgressObserver).await);

        let PostcraftError::Stage(failure) = err else {
            panic!("expected a stage failure, got {err:?}");
        };
        assert_eq!(failure.stage, StageName::Editor);
        assert!(failure.is_timeout());
        assert_eq!(backend.call_count(), 4);
    }

    #[tokio::test]
    async fn test_duplicate_stage_is_an_output_conflict() {
        let backend = Arc::new(scripted());
        let stages: Vec<Arc<dyn Stage>> = vec![
            Arc::new(TextStage::new(NEWS_FINDER, "m")),
            Arc::new(TextStage::new(NEWS_FINDER, "m")),
        ];
        let runner = runner_with(&backend).with_stages(stages);

        let err = assert_err!(runner.run(topic(), &NoOpProgressObserver).await);

        assert!(matches!(err, PostcraftError::OutputConflict(_)));
    }

    #[tokio::test]
    async fn test_session_refuses_overlapping_runs() {
        let backend = Arc::new(
            scripted().with_delay(StageName::NewsFinder, Duration::from_millis(200)),
        );
        let config = PostcraftConfig::default().with_image_output_path(None);
        let session = PostSession::open(&config, ApiKey::new("k").unwrap(), backend.clone())
            .await
            .unwrap()
            .with_run_date(date());

        let (first, second) = tokio::join!(
            session.generate("electric cars", &NoOpProgressObserver),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                let busy = session.is_busy();
                (busy, session.generate("solar panels", &NoOpProgressObserver).await)
            }
        );

        assert_ok!(first);
        let (busy, second) = second;
        assert!(busy);
        assert!(matches!(second, Err(PostcraftError::RunInProgress)));
        assert_eq!(session.current_topic().unwrap().as_str(), "electric cars");
        assert_eq!(backend.call_count(), 6);
    }

    #[tokio::test]
    async fn test_failed_run_keeps_previous_result() {
        let backend = Arc::new(scripted().fail_on_call(7));
        let config = PostcraftConfig::default().with_image_output_path(None);
        let session = PostSession::open(&config, ApiKey::new("k").unwrap(), backend)
            .await
            .unwrap();

        let first = assert_ok!(session.generate("electric cars", &NoOpProgressObserver).await);
        let err = assert_err!(session.generate("solar panels", &NoOpProgressObserver).await);

        assert!(err.to_string().starts_with("Stage 'News Finder' failed"));
        assert_eq!(session.current_topic().unwrap().as_str(), "electric cars");
        assert_eq!(session.last_result().unwrap().run_id(), first.run_id());
    }
}
