use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use stylecast_core::error::{Error, Result};
use stylecast_core::message::{ActionAck, ActionKind, PushEvent};
use stylecast_core::settings::{SeedChoice, MAX_MODEL_IMAGES};
use stylecast_core::store::KeyValueStore;
use stylecast_imaging::{transcode_source, ImageSource, TranscodeOptions};

use crate::api::{TryOnApi, UNKNOWN_API_ERROR};
use crate::job::{Job, PollSchedule};
use crate::payload::{self, ModelInputs};
use crate::poll::{collect_outcome, poll_jobs};

/// Orchestrates one user action end to end: settings load, precondition
/// checks, garment transcode, job submission, and a spawned poll task
/// that delivers the outcome over the push channel. Control returns to
/// the initiator as soon as submissions are acknowledged.
pub struct ActionRunner {
    api: Arc<dyn TryOnApi>,
    store: Arc<dyn KeyValueStore>,
    push_tx: mpsc::Sender<PushEvent>,
    http: reqwest::Client,
    transcode: TranscodeOptions,
    schedule: PollSchedule,
}

impl ActionRunner {
    pub fn new(
        api: Arc<dyn TryOnApi>,
        store: Arc<dyn KeyValueStore>,
        push_tx: mpsc::Sender<PushEvent>,
    ) -> Self {
        Self {
            api,
            store,
            push_tx,
            http: reqwest::Client::new(),
            transcode: TranscodeOptions::default(),
            schedule: PollSchedule::default(),
        }
    }

    pub fn with_transcode(mut self, transcode: TranscodeOptions) -> Self {
        self.transcode = transcode;
        self
    }

    pub fn with_schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Try the page's garment on every configured reference image: one
    /// job per image, polled together.
    pub async fn try_on(&self, garment_src: &str) -> Result<ActionAck> {
        let settings = self.store.load_settings().await?;
        if !settings.has_api_key() {
            return Err(Error::Precondition(
                "API key not set. Add it in the extension settings.".to_string(),
            ));
        }
        if !settings.has_model_images() {
            return Err(Error::Precondition(
                "No model images set. Upload at least one in the extension settings.".to_string(),
            ));
        }

        let garment = transcode_source(
            &self.http,
            &ImageSource::parse(garment_src),
            &self.transcode,
        )
        .await?;

        let mut jobs = Vec::new();
        for (index, model_image) in settings
            .model_images
            .iter()
            .take(MAX_MODEL_IMAGES)
            .enumerate()
        {
            match self.api.run(&payload::try_on(model_image, &garment)).await {
                Ok(id) => jobs.push(Job::submitted(id, index)),
                // A bad credential fails every job identically; abort
                // the whole action before any polling.
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    warn!(input = index, error = %e, "Job submission failed");
                    jobs.push(Job::failed_submission(index, e.to_string()));
                }
            }
        }

        let job_ids: Vec<String> = jobs.iter().filter_map(|j| j.id.clone()).collect();
        if job_ids.is_empty() {
            let first = jobs
                .iter()
                .filter_map(|j| j.error.clone())
                .next()
                .unwrap_or_else(|| UNKNOWN_API_ERROR.to_string());
            return Err(Error::Api(first));
        }

        info!(jobs = job_ids.len(), "Try-on submitted");
        self.spawn_poll(ActionKind::TryOn, garment_src.to_string(), jobs);
        Ok(ActionAck {
            kind: ActionKind::TryOn,
            job_ids,
        })
    }

    pub async fn model_swap(&self, model_src: &str) -> Result<ActionAck> {
        self.single_model_action(ActionKind::ModelSwap, model_src).await
    }

    pub async fn model_variation(&self, model_src: &str) -> Result<ActionAck> {
        self.single_model_action(ActionKind::ModelVariation, model_src)
            .await
    }

    /// Swap and variation both submit exactly one job built from the
    /// page image plus the stored generation options.
    async fn single_model_action(&self, kind: ActionKind, model_src: &str) -> Result<ActionAck> {
        let mut settings = self.store.load_settings().await?;
        if !settings.has_api_key() {
            return Err(Error::Precondition(
                "API key not set. Add it in the extension settings.".to_string(),
            ));
        }

        let model_image = transcode_source(
            &self.http,
            &ImageSource::parse(model_src),
            &self.transcode,
        )
        .await?;

        let first_done = match kind {
            ActionKind::ModelSwap => settings.first_swap_done,
            ActionKind::ModelVariation => settings.first_variation_done,
            // Try-on payloads carry no seed; the flag is irrelevant.
            ActionKind::TryOn => true,
        };
        let seed = SeedChoice::resolve(settings.seed, first_done);
        let inputs = ModelInputs {
            model_image: &model_image,
            prompt: settings.prompt.as_deref(),
            seed,
            lora_url: settings.lora_url.as_deref(),
            output_format: settings.output_format,
            return_base64: settings.return_base64,
        };
        let request = match kind {
            ActionKind::ModelVariation => payload::model_variation(&inputs),
            _ => payload::model_swap(&inputs),
        };

        let id = self.api.run(&request).await?;

        // The one-time default seed was consumed; record it so the next
        // invocation omits the seed.
        if seed.consumes_first_run() {
            match kind {
                ActionKind::ModelSwap => settings.first_swap_done = true,
                ActionKind::ModelVariation => settings.first_variation_done = true,
                ActionKind::TryOn => {}
            }
            self.store.save_settings(&settings).await?;
        }

        info!(kind = kind.as_str(), job_id = %id, "Job submitted");
        self.spawn_poll(kind, model_src.to_string(), vec![Job::submitted(id.clone(), 0)]);
        Ok(ActionAck {
            kind,
            job_ids: vec![id],
        })
    }

    fn spawn_poll(&self, kind: ActionKind, source_url: String, mut jobs: Vec<Job>) {
        let api = Arc::clone(&self.api);
        let schedule = self.schedule.clone();
        let push_tx = self.push_tx.clone();
        tokio::spawn(async move {
            poll_jobs(api.as_ref(), &mut jobs, &schedule).await;
            let event = match collect_outcome(&jobs) {
                Ok(outputs) => PushEvent::ActionCompleted {
                    kind,
                    source_url,
                    outputs,
                },
                Err(e) => PushEvent::ActionFailed {
                    kind,
                    source_url,
                    error: e.to_string(),
                },
            };
            // A dropped receiver means the display context is gone; the
            // result is silently discarded.
            let _ = push_tx.send(event).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{StatusResponse, AUTH_ERROR_MESSAGE};
    use crate::testutil::{MockApi, TINY_PNG_DATA_URL};
    use stylecast_core::settings::Settings;
    use stylecast_core::store::MemoryStore;

    fn settings_with_models(count: usize) -> Settings {
        Settings {
            api_key: Some("fa-test".to_string()),
            model_images: (0..count)
                .map(|i| format!("data:image/jpeg;base64,AAA{}", i))
                .collect(),
            ..Settings::default()
        }
    }

    async fn runner_with(
        api: &Arc<MockApi>,
        settings: Settings,
    ) -> (ActionRunner, Arc<MemoryStore>, mpsc::Receiver<PushEvent>) {
        let store = Arc::new(MemoryStore::new());
        store.save_settings(&settings).await.unwrap();
        let (push_tx, push_rx) = mpsc::channel(8);
        let runner = ActionRunner::new(
            api.clone() as Arc<dyn TryOnApi>,
            store.clone() as Arc<dyn KeyValueStore>,
            push_tx,
        );
        (runner, store, push_rx)
    }

    #[tokio::test(start_paused = true)]
    async fn try_on_fans_out_one_job_per_model_image() {
        let api = Arc::new(MockApi::new());
        for i in 0..3 {
            api.queue_run_ok(&format!("j-{}", i));
            api.queue_status(&format!("j-{}", i), StatusResponse::completed(&[&format!("out-{}", i)]));
        }
        let (runner, _store, mut push_rx) = runner_with(&api, settings_with_models(3)).await;

        let ack = runner.try_on(TINY_PNG_DATA_URL).await.unwrap();
        assert_eq!(ack.job_ids, vec!["j-0", "j-1", "j-2"]);

        let payloads = api.run_payloads();
        assert_eq!(payloads.len(), 3);
        // Each job pairs one stored reference image with the transcoded garment.
        assert_eq!(payloads[1]["model_image"], "data:image/jpeg;base64,AAA1");
        assert!(payloads[0]["garment_image"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));

        match push_rx.recv().await.unwrap() {
            PushEvent::ActionCompleted { kind, outputs, .. } => {
                assert_eq!(kind, ActionKind::TryOn);
                assert_eq!(outputs, vec!["out-0", "out-1", "out-2"]);
            }
            other => panic!("unexpected push: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_aborts_without_polling() {
        let api = Arc::new(MockApi::new());
        api.queue_run_err(Error::Auth(AUTH_ERROR_MESSAGE.to_string()));
        let (runner, _store, mut push_rx) = runner_with(&api, settings_with_models(2)).await;

        let err = runner.try_on(TINY_PNG_DATA_URL).await.unwrap_err();
        assert!(err.is_auth());
        assert!(err.to_string().contains("Invalid or unauthorized API key"));
        assert_eq!(api.status_call_count(), 0);
        assert!(push_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_api_key_fails_before_any_network_call() {
        let api = Arc::new(MockApi::new());
        let mut settings = settings_with_models(1);
        settings.api_key = None;
        let (runner, _store, _push_rx) = runner_with(&api, settings).await;

        let err = runner.try_on(TINY_PNG_DATA_URL).await.unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        assert!(api.run_payloads().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_model_images_is_a_precondition_error() {
        let api = Arc::new(MockApi::new());
        let (runner, _store, _push_rx) = runner_with(&api, settings_with_models(0)).await;

        let err = runner.try_on(TINY_PNG_DATA_URL).await.unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_submission_failure_still_succeeds_overall() {
        let api = Arc::new(MockApi::new());
        api.queue_run_ok("j-0");
        api.queue_run_err(Error::Api("capacity".to_string()));
        api.queue_status("j-0", StatusResponse::completed(&["out-0"]));
        let (runner, _store, mut push_rx) = runner_with(&api, settings_with_models(2)).await;

        let ack = runner.try_on(TINY_PNG_DATA_URL).await.unwrap();
        assert_eq!(ack.job_ids, vec!["j-0"]);

        match push_rx.recv().await.unwrap() {
            PushEvent::ActionCompleted { outputs, .. } => {
                assert_eq!(outputs, vec!["out-0"]);
            }
            other => panic!("unexpected push: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn mixed_remote_outcomes_report_only_successes() {
        let api = Arc::new(MockApi::new());
        api.queue_run_ok("j-0");
        api.queue_run_ok("j-1");
        api.queue_status("j-0", StatusResponse::failed(Some("bad pose")));
        api.queue_status("j-1", StatusResponse::completed(&["out-1"]));
        let (runner, _store, mut push_rx) = runner_with(&api, settings_with_models(2)).await;

        runner.try_on(TINY_PNG_DATA_URL).await.unwrap();
        match push_rx.recv().await.unwrap() {
            PushEvent::ActionCompleted { outputs, .. } => {
                assert_eq!(outputs, vec!["out-1"]);
            }
            other => panic!("unexpected push: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn all_submissions_failing_is_synchronous_failure() {
        let api = Arc::new(MockApi::new());
        api.queue_run_err(Error::Api("capacity".to_string()));
        api.queue_run_err(Error::Api("capacity".to_string()));
        let (runner, _store, mut push_rx) = runner_with(&api, settings_with_models(2)).await;

        let err = runner.try_on(TINY_PNG_DATA_URL).await.unwrap_err();
        assert!(err.to_string().contains("capacity"));
        assert!(push_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn first_swap_uses_default_seed_then_omits_it() {
        let api = Arc::new(MockApi::new());
        api.queue_run_ok("s-0");
        api.queue_run_ok("s-1");
        api.queue_status("s-0", StatusResponse::completed(&["o-0"]));
        api.queue_status("s-1", StatusResponse::completed(&["o-1"]));

        let mut settings = settings_with_models(1);
        settings.seed = None;
        let (runner, store, mut push_rx) = runner_with(&api, settings).await;

        runner.model_swap(TINY_PNG_DATA_URL).await.unwrap();
        push_rx.recv().await.unwrap();

        let payloads = api.run_payloads();
        assert_eq!(payloads[0]["model_name"], "model-swap");
        assert_eq!(payloads[0]["inputs"]["seed"], 42);
        assert!(store.load_settings().await.unwrap().first_swap_done);

        runner.model_swap(TINY_PNG_DATA_URL).await.unwrap();
        push_rx.recv().await.unwrap();
        let payloads = api.run_payloads();
        assert!(payloads[1]["inputs"].get("seed").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn variation_first_run_flag_is_independent_of_swap() {
        let api = Arc::new(MockApi::new());
        api.queue_run_ok("v-0");
        api.queue_status("v-0", StatusResponse::completed(&["o-0"]));

        let mut settings = settings_with_models(1);
        settings.first_swap_done = true;
        let (runner, store, mut push_rx) = runner_with(&api, settings).await;

        runner.model_variation(TINY_PNG_DATA_URL).await.unwrap();
        push_rx.recv().await.unwrap();

        let payloads = api.run_payloads();
        assert_eq!(payloads[0]["model_name"], "model-variation");
        assert_eq!(payloads[0]["inputs"]["seed"], 42);
        let saved = store.load_settings().await.unwrap();
        assert!(saved.first_variation_done);
        assert!(saved.first_swap_done);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_seed_is_always_sent() {
        let api = Arc::new(MockApi::new());
        api.queue_run_ok("s-0");
        api.queue_status("s-0", StatusResponse::completed(&["o-0"]));

        let mut settings = settings_with_models(1);
        settings.seed = Some(777);
        settings.first_swap_done = true;
        let (runner, store, mut push_rx) = runner_with(&api, settings).await;

        runner.model_swap(TINY_PNG_DATA_URL).await.unwrap();
        push_rx.recv().await.unwrap();

        assert_eq!(api.run_payloads()[0]["inputs"]["seed"], 777);
        // Explicit seeds never touch the first-run bookkeeping.
        assert!(store.load_settings().await.unwrap().first_swap_done);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_single_job_pushes_failure() {
        let api = Arc::new(MockApi::new());
        api.queue_run_ok("s-0");
        api.queue_status("s-0", StatusResponse::processing());

        let (runner, _store, mut push_rx) = runner_with(&api, settings_with_models(1)).await;
        runner.model_swap(TINY_PNG_DATA_URL).await.unwrap();

        match push_rx.recv().await.unwrap() {
            PushEvent::ActionFailed { error, .. } => {
                assert!(error.contains("timed out after 3 minutes"));
            }
            other => panic!("unexpected push: {:?}", other),
        }
    }
}
