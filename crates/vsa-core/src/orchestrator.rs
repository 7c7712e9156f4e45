//! Submission lifecycle orchestration.
//!
//! The orchestrator owns the request counter and the lifecycle state. Each
//! submission is tagged with a fresh [`RequestId`]; after each suspension
//! point (validation, generation) the id is compared with the current one
//! and stale results are dropped without touching published state. In-flight
//! remote calls are never aborted, only ignored.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::watch;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;
use vsa_gemini::GenerationClient;
use vsa_models::{
    embed_url, has_http_scheme, AnalysisResult, AnalysisSnapshot, Language, LifecycleState,
    RequestId, SubmissionRequest, ValidationResult,
};

use crate::config::OrchestratorConfig;
use crate::error::{SubmissionError, SubmissionResult, UNKNOWN_ERROR_MESSAGE};
use crate::logging::RequestLogger;
use crate::metrics;
use crate::parser::parse_analysis;
use crate::validator::{UrlValidator, VALIDATION_FAILED_MESSAGE};

pub const SCHEME_HINT: &str = "URL must begin with http:// or https://";

/// Receives one-way notifications from the orchestrator.
///
/// Called outside the state lock, after the snapshot is published, so an
/// observer may read `Orchestrator::snapshot` from inside a callback.
/// Implementations must not block.
///
/// Callbacks are delivered in publication order when the orchestrator is
/// driven from a single thread (a `current_thread` runtime, as in the
/// session binary). On a multi-thread runtime two tasks can publish
/// back to back and their callbacks may interleave. The receiver from
/// `Orchestrator::subscribe` always holds the latest snapshot.
pub trait PresentationObserver: Send + Sync {
    /// Called on every lifecycle transition with `state.is_busy()`.
    fn on_loading_state_change(&self, is_loading: bool);

    /// Called whenever a new snapshot is published.
    fn on_snapshot(&self, _snapshot: &AnalysisSnapshot) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl PresentationObserver for NoopObserver {
    fn on_loading_state_change(&self, _is_loading: bool) {}
}

/// How a submission ended, from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; refocus the input field. No state change.
    EmptyInput,
    /// A submission is still validating; this one was dropped.
    Ignored,
    /// The validator rejected the reference; state is back to `Idle`.
    Rejected { id: RequestId, message: String },
    /// Analysis published; state is `Ready`.
    Ready { id: RequestId, analysis: AnalysisResult },
    /// Generation or parsing failed; state is `Error`.
    Failed { id: RequestId, error: SubmissionError },
    /// A newer submission became current first; the result was discarded.
    Superseded { id: RequestId },
}

impl SubmitOutcome {
    fn from_result(id: RequestId, result: SubmissionResult<AnalysisResult>) -> Self {
        match result {
            Ok(analysis) => SubmitOutcome::Ready { id, analysis },
            Err(SubmissionError::EmptyInput) => SubmitOutcome::EmptyInput,
            Err(SubmissionError::Superseded) => SubmitOutcome::Superseded { id },
            Err(SubmissionError::ValidationFailure(message)) => {
                SubmitOutcome::Rejected { id, message }
            }
            Err(error) => SubmitOutcome::Failed { id, error },
        }
    }

    /// Id issued for the submission, if one was issued.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            SubmitOutcome::EmptyInput | SubmitOutcome::Ignored => None,
            SubmitOutcome::Rejected { id, .. }
            | SubmitOutcome::Ready { id, .. }
            | SubmitOutcome::Failed { id, .. }
            | SubmitOutcome::Superseded { id } => Some(*id),
        }
    }

    /// Whether the caller should put focus back on the input field.
    pub fn should_refocus(&self) -> bool {
        matches!(self, SubmitOutcome::EmptyInput | SubmitOutcome::Rejected { .. })
    }

    /// Outcome label for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            SubmitOutcome::EmptyInput => "empty_input",
            SubmitOutcome::Ignored => "ignored",
            SubmitOutcome::Rejected { .. } => "rejected",
            SubmitOutcome::Ready { .. } => "ready",
            SubmitOutcome::Failed { .. } => "failed",
            SubmitOutcome::Superseded { .. } => "superseded",
        }
    }
}

/// Result of a language selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageChange {
    /// Same language as before.
    Unchanged,
    /// A pipeline is busy; the selector is locked.
    Locked,
    /// Stored for the next submission.
    Applied,
    /// The displayed reference was re-analyzed in the new language.
    Regenerated(SubmitOutcome),
}

struct Inner {
    last_issued: RequestId,
    /// Id whose results may still be committed
    current: Option<RequestId>,
    /// Validated request whose reference is on screen
    displayed: Option<SubmissionRequest>,
    language: Language,
    snapshot: AnalysisSnapshot,
    dirty: bool,
}

impl Inner {
    fn is_current(&self, id: RequestId) -> bool {
        self.current == Some(id)
    }

    fn issue_id(&mut self) -> RequestId {
        let id = self.last_issued.next();
        self.last_issued = id;
        self.current = Some(id);
        id
    }

    fn publish(&mut self, snapshot: AnalysisSnapshot) {
        self.snapshot = snapshot;
        self.dirty = true;
    }
}

struct Shared {
    validator: Arc<dyn UrlValidator>,
    generator: Arc<dyn GenerationClient>,
    observer: Arc<dyn PresentationObserver>,
    config: OrchestratorConfig,
    inner: Mutex<Inner>,
    snapshots: watch::Sender<AnalysisSnapshot>,
    session_id: String,
}

/// Drives validation, generation and parsing for user submissions and
/// publishes the resulting lifecycle state.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct Orchestrator {
    shared: Arc<Shared>,
}

impl Orchestrator {
    /// Create an orchestrator without a presentation observer.
    pub fn new(
        config: OrchestratorConfig,
        validator: Arc<dyn UrlValidator>,
        generator: Arc<dyn GenerationClient>,
    ) -> Self {
        Self::with_observer(config, validator, generator, Arc::new(NoopObserver))
    }

    /// Create an orchestrator that notifies `observer` of every published
    /// snapshot.
    pub fn with_observer(
        config: OrchestratorConfig,
        validator: Arc<dyn UrlValidator>,
        generator: Arc<dyn GenerationClient>,
        observer: Arc<dyn PresentationObserver>,
    ) -> Self {
        let language = config.default_language.clone();
        let initial = AnalysisSnapshot::idle(language.clone());
        let (snapshots, _) = watch::channel(initial.clone());
        let session_id = format!("session-{}", Uuid::new_v4());

        info!(
            session = %session_id,
            validate_input_url = config.validate_input_url,
            language = %language,
            "Orchestrator ready"
        );

        Self {
            shared: Arc::new(Shared {
                validator,
                generator,
                observer,
                config,
                inner: Mutex::new(Inner {
                    last_issued: RequestId::new(0),
                    current: None,
                    displayed: None,
                    language,
                    snapshot: initial,
                    dirty: false,
                }),
                snapshots,
                session_id,
            }),
        }
    }

    /// Current published state.
    pub fn snapshot(&self) -> AnalysisSnapshot {
        self.lock().snapshot.clone()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lock().snapshot.state
    }

    /// Language the next submission will use.
    pub fn language(&self) -> Language {
        self.lock().language.clone()
    }

    /// Whether a pipeline is validating or generating.
    pub fn is_loading(&self) -> bool {
        self.state().is_busy()
    }

    /// Receiver of every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Identifier attached to this orchestrator's log lines.
    pub fn session_id(&self) -> &str {
        &self.shared.session_id
    }

    /// Submit a reference for analysis and drive it to an outcome.
    ///
    /// Blank input is refused without a state change. While a submission is
    /// validating, new ones are ignored. In any other state the new
    /// submission supersedes whatever is in flight.
    pub async fn submit(&self, raw: &str) -> SubmitOutcome {
        let input = raw.trim();
        if input.is_empty() {
            debug!(session = %self.shared.session_id, "Empty submission, refocusing input");
            metrics::record_submission(SubmitOutcome::EmptyInput.label());
            return SubmitOutcome::EmptyInput;
        }

        let request = self.with_inner(|inner| {
            if inner.snapshot.state == LifecycleState::Validating {
                return None;
            }
            let id = inner.issue_id();
            let request = SubmissionRequest::new(id, input, inner.language.clone());
            inner.displayed = None;
            inner.publish(AnalysisSnapshot {
                state: LifecycleState::Validating,
                request_id: Some(id),
                ..AnalysisSnapshot::idle(request.language.clone())
            });
            Some(request)
        });

        let Some(request) = request else {
            debug!(session = %self.shared.session_id, "Validation in progress, ignoring submission");
            metrics::record_submission(SubmitOutcome::Ignored.label());
            return SubmitOutcome::Ignored;
        };

        let logger = RequestLogger::for_request(&request, "submit");
        let span = logger.create_span();
        async {
            logger.log_start(&request.basis);
            let result = self.validate_and_generate(&request, &logger).await;
            self.finish(&logger, SubmitOutcome::from_result(request.id, result))
        }
        .instrument(span)
        .await
    }

    /// Select the output language.
    ///
    /// Locked while a pipeline is busy. If a validated reference is on screen
    /// with a finished outcome, it is re-analyzed in the new language under a
    /// fresh id, without re-validation.
    pub async fn change_language(&self, language: impl Into<Language>) -> LanguageChange {
        enum Step {
            Locked,
            Unchanged,
            Applied,
            Regenerate(SubmissionRequest),
        }

        let language = language.into();
        let step = self.with_inner(|inner| {
            if inner.snapshot.state.is_busy() {
                return Step::Locked;
            }
            if inner.language == language {
                return Step::Unchanged;
            }
            inner.language = language.clone();

            let shown = inner
                .displayed
                .clone()
                .filter(|_| inner.snapshot.state.is_terminal());
            match shown {
                Some(shown) => {
                    let id = inner.issue_id();
                    Step::Regenerate(shown.with_language(id, language.clone()))
                }
                None => {
                    let mut snapshot = inner.snapshot.clone();
                    snapshot.language = language.clone();
                    snapshot.updated_at = Utc::now();
                    inner.publish(snapshot);
                    Step::Applied
                }
            }
        });

        match step {
            Step::Locked => {
                debug!(session = %self.shared.session_id, "Language selector locked while busy");
                LanguageChange::Locked
            }
            Step::Unchanged => LanguageChange::Unchanged,
            Step::Applied => LanguageChange::Applied,
            Step::Regenerate(request) => {
                let logger = RequestLogger::for_request(&request, "language_change");
                let span = logger.create_span();
                let outcome = async {
                    logger.log_start(&request.basis);
                    let result = self.generate(&request, &logger).await;
                    self.finish(&logger, SubmitOutcome::from_result(request.id, result))
                }
                .instrument(span)
                .await;
                LanguageChange::Regenerated(outcome)
            }
        }
    }

    /// The user edited the input: drop any outstanding submission and
    /// return to `Idle`.
    pub fn edit_input(&self) {
        self.with_inner(|inner| {
            let had_content = inner.snapshot.state != LifecycleState::Idle
                || inner.snapshot.notice.is_some()
                || inner.current.is_some();

            inner.current = None;
            inner.displayed = None;
            if had_content {
                inner.publish(AnalysisSnapshot::idle(inner.language.clone()));
            }
        });
    }

    async fn validate_and_generate(
        &self,
        request: &SubmissionRequest,
        logger: &RequestLogger,
    ) -> SubmissionResult<AnalysisResult> {
        if self.shared.config.validate_input_url {
            let validation = AssertUnwindSafe(self.shared.validator.validate(&request.basis))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| ValidationResult::invalid(VALIDATION_FAILED_MESSAGE));
            self.resolve_validation(request, validation)?;
            logger.log_stage("validated");
        }

        self.generate(request, logger).await
    }

    fn resolve_validation(
        &self,
        request: &SubmissionRequest,
        validation: ValidationResult,
    ) -> SubmissionResult<()> {
        self.with_inner(|inner| {
            if !inner.is_current(request.id) {
                metrics::record_stale_result("validation");
                return Err(SubmissionError::Superseded);
            }

            if let Some(message) = validation.error_message() {
                inner.current = None;
                inner.publish(AnalysisSnapshot {
                    notice: Some(message.clone()),
                    ..AnalysisSnapshot::idle(inner.language.clone())
                });
                return Err(SubmissionError::validation_failure(message));
            }

            Ok(())
        })
    }

    async fn generate(
        &self,
        request: &SubmissionRequest,
        logger: &RequestLogger,
    ) -> SubmissionResult<AnalysisResult> {
        let entered = self.with_inner(|inner| {
            if !inner.is_current(request.id) {
                return false;
            }
            inner.displayed = Some(request.clone());
            inner.publish(AnalysisSnapshot {
                state: LifecycleState::Generating,
                request_id: Some(request.id),
                reference: Some(request.basis.clone()),
                embed_url: embed_url(&request.basis),
                ..AnalysisSnapshot::idle(request.language.clone())
            });
            true
        });
        if !entered {
            metrics::record_stale_result("validation");
            return Err(SubmissionError::Superseded);
        }

        logger.log_stage("generating");
        let started = Instant::now();
        let result = self
            .call_generator(request)
            .await
            .and_then(|raw| parse_analysis(&raw));
        metrics::record_generation_latency(started.elapsed());

        self.resolve_generation(request, result)
    }

    async fn call_generator(&self, request: &SubmissionRequest) -> SubmissionResult<String> {
        let call = AssertUnwindSafe(
            self.shared
                .generator
                .generate(&request.basis, request.language.as_str()),
        )
        .catch_unwind();

        let joined = match self.shared.config.generation_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(joined) => joined,
                Err(_) => {
                    return Err(SubmissionError::generation_failed(format!(
                        "Generation timed out after {} seconds",
                        limit.as_secs()
                    )))
                }
            },
            None => call.await,
        };

        match joined {
            Ok(result) => result.map_err(|err| {
                warn!(
                    request_id = %request.id,
                    transient = err.is_transient(),
                    status = ?err.http_status(),
                    "Generation call failed: {}", err
                );
                SubmissionError::from(err)
            }),
            Err(_) => Err(SubmissionError::generation_failed(UNKNOWN_ERROR_MESSAGE)),
        }
    }

    fn resolve_generation(
        &self,
        request: &SubmissionRequest,
        result: SubmissionResult<AnalysisResult>,
    ) -> SubmissionResult<AnalysisResult> {
        self.with_inner(|inner| {
            if !inner.is_current(request.id) {
                metrics::record_stale_result("generation");
                return Err(SubmissionError::Superseded);
            }

            let mut snapshot = inner.snapshot.clone();
            snapshot.updated_at = Utc::now();
            match result {
                Ok(analysis) => {
                    snapshot.state = LifecycleState::Ready;
                    snapshot.analysis = Some(analysis.clone());
                    inner.publish(snapshot);
                    Ok(analysis)
                }
                Err(err) if err.enters_error_state() => {
                    snapshot.state = LifecycleState::Error;
                    snapshot.error = Some(err.to_string());
                    snapshot.hint = (!has_http_scheme(&request.basis)).then(|| SCHEME_HINT.to_string());
                    inner.publish(snapshot);
                    Err(err)
                }
                Err(err) => Err(err),
            }
        })
    }

    fn finish(&self, logger: &RequestLogger, outcome: SubmitOutcome) -> SubmitOutcome {
        match &outcome {
            SubmitOutcome::Ready { analysis, .. } => logger.log_ready(analysis.text.len()),
            SubmitOutcome::Rejected { message, .. } => logger.log_rejected(message),
            SubmitOutcome::Failed { error, .. } => logger.log_failure(error),
            SubmitOutcome::Superseded { .. } => logger.log_superseded(),
            SubmitOutcome::EmptyInput | SubmitOutcome::Ignored => {}
        }
        metrics::record_submission(outcome.label());
        outcome
    }

    /// Run `f` under the state lock and publish the snapshot if it changed.
    fn with_inner<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let (value, published) = {
            let mut inner = self.lock();
            let previous = inner.snapshot.state;
            let value = f(&mut *inner);

            let published = if inner.dirty {
                inner.dirty = false;
                let snapshot = inner.snapshot.clone();
                self.shared.snapshots.send_replace(snapshot.clone());
                Some((previous, snapshot))
            } else {
                None
            };
            (value, published)
        };

        if let Some((previous, snapshot)) = published {
            self.shared.observer.on_snapshot(&snapshot);
            if previous != snapshot.state {
                debug!(
                    session = %self.shared.session_id,
                    from = %previous,
                    to = %snapshot.state,
                    "Lifecycle transition"
                );
                self.shared
                    .observer
                    .on_loading_state_change(snapshot.state.is_busy());
            }
        }

        value
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use vsa_gemini::{GenerationError, GenerationResult};

    struct FixedValidator(ValidationResult);

    #[async_trait]
    impl UrlValidator for FixedValidator {
        async fn validate(&self, _raw: &str) -> ValidationResult {
            self.0.clone()
        }
    }

    struct FixedGenerator(Result<String, String>);

    #[async_trait]
    impl GenerationClient for FixedGenerator {
        async fn generate(&self, _basis: &str, _language: &str) -> GenerationResult<String> {
            self.0.clone().map_err(GenerationError::request_failed)
        }
    }

    struct PanickingGenerator;

    #[async_trait]
    impl GenerationClient for PanickingGenerator {
        async fn generate(&self, _basis: &str, _language: &str) -> GenerationResult<String> {
            panic!("generator exploded")
        }
    }

    struct PanickingValidator;

    #[async_trait]
    impl UrlValidator for PanickingValidator {
        async fn validate(&self, _raw: &str) -> ValidationResult {
            panic!("validator exploded")
        }
    }

    #[derive(Default)]
    struct CountingGenerator(AtomicUsize);

    #[async_trait]
    impl GenerationClient for CountingGenerator {
        async fn generate(&self, _basis: &str, _language: &str) -> GenerationResult<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(r#"{"analysis":"ok"}"#.to_string())
        }
    }

    fn orchestrator(validation: ValidationResult, generated: Result<&str, &str>) -> Orchestrator {
        Orchestrator::new(
            OrchestratorConfig::default(),
            Arc::new(FixedValidator(validation)),
            Arc::new(FixedGenerator(
                generated.map(str::to_string).map_err(str::to_string),
            )),
        )
    }

    #[tokio::test]
    async fn test_outcome_labels_and_ids() {
        let orch = orchestrator(ValidationResult::valid(), Ok(r#"{"analysis":"ok"}"#));
        let outcome = orch.submit("https://youtu.be/dQw4w9WgXcQ").await;
        assert_eq!(outcome.label(), "ready");
        assert_eq!(outcome.request_id(), Some(RequestId::new(1)));
        assert!(!outcome.should_refocus());
    }

    #[tokio::test]
    async fn test_error_hint_for_missing_scheme() {
        let orch = Orchestrator::new(
            OrchestratorConfig::default().without_validation(),
            Arc::new(FixedValidator(ValidationResult::valid())),
            Arc::new(FixedGenerator(Err("bad request".into()))),
        );

        orch.submit("youtu.be/dQw4w9WgXcQ").await;
        let snapshot = orch.snapshot();
        assert_eq!(snapshot.state, LifecycleState::Error);
        assert_eq!(snapshot.hint.as_deref(), Some(SCHEME_HINT));
    }

    #[tokio::test]
    async fn test_panicking_generator_becomes_generation_failure() {
        let orch = Orchestrator::new(
            OrchestratorConfig::default(),
            Arc::new(FixedValidator(ValidationResult::valid())),
            Arc::new(PanickingGenerator),
        );

        let outcome = orch.submit("https://youtu.be/dQw4w9WgXcQ").await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed {
                id: RequestId::new(1),
                error: SubmissionError::GenerationFailure(UNKNOWN_ERROR_MESSAGE.into()),
            }
        );
        assert_eq!(orch.state(), LifecycleState::Error);
    }

    #[tokio::test]
    async fn test_panicking_validator_rejects_without_generating() {
        let generator = Arc::new(CountingGenerator::default());
        let orch = Orchestrator::new(
            OrchestratorConfig::default(),
            Arc::new(PanickingValidator),
            generator.clone(),
        );

        let outcome = orch.submit("https://youtu.be/dQw4w9WgXcQ").await;
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                id: RequestId::new(1),
                message: VALIDATION_FAILED_MESSAGE.to_string(),
            }
        );

        let snapshot = orch.snapshot();
        assert_eq!(snapshot.state, LifecycleState::Idle);
        assert_eq!(snapshot.notice.as_deref(), Some("Failed to validate URL"));
        assert_eq!(generator.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_validation_skipped_when_disabled() {
        let orch = Orchestrator::new(
            OrchestratorConfig::default().without_validation(),
            Arc::new(FixedValidator(ValidationResult::invalid("never consulted"))),
            Arc::new(FixedGenerator(Ok(r#"{"analysis":"ok"}"#.into()))),
        );

        let outcome = orch.submit("https://youtu.be/dQw4w9WgXcQ").await;
        assert!(matches!(outcome, SubmitOutcome::Ready { .. }));
    }

    #[tokio::test]
    async fn test_edit_input_clears_result() {
        let orch = orchestrator(ValidationResult::valid(), Ok(r#"{"analysis":"ok"}"#));
        orch.submit("https://youtu.be/dQw4w9WgXcQ").await;
        assert_eq!(orch.state(), LifecycleState::Ready);

        orch.edit_input();
        let snapshot = orch.snapshot();
        assert_eq!(snapshot.state, LifecycleState::Idle);
        assert!(snapshot.analysis.is_none());
        assert!(snapshot.reference.is_none());
    }
}
