//! Test doubles shared by the orchestrator tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;
use vsa_core::{Orchestrator, OrchestratorConfig, PresentationObserver, UrlValidator};
use vsa_gemini::{GenerationClient, GenerationError, GenerationResult};
use vsa_models::{AnalysisSnapshot, LifecycleState, ValidationResult};

pub const VIDEO: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const OTHER_VIDEO: &str = "https://youtu.be/9bZkp7q19f0";

/// Model output wrapping `text` in the analysis envelope.
pub fn envelope(text: &str) -> String {
    format!(
        "Here you go: {} Let me know if you need anything else.",
        serde_json::json!({ "analysis": text })
    )
}

/// Validator returning the same result for every reference.
pub struct StaticValidator {
    result: ValidationResult,
    calls: AtomicUsize,
}

impl StaticValidator {
    pub fn valid() -> Arc<Self> {
        Self::returning(ValidationResult::valid())
    }

    pub fn returning(result: ValidationResult) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UrlValidator for StaticValidator {
    async fn validate(&self, _raw: &str) -> ValidationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Validator whose calls block until the test releases them.
#[derive(Default)]
pub struct GatedValidator {
    gates: Mutex<Vec<Option<oneshot::Sender<ValidationResult>>>>,
}

impl GatedValidator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.gates.lock().unwrap().len()
    }

    /// Resolve the `index`-th call.
    pub fn release(&self, index: usize, result: ValidationResult) {
        let gate = self.gates.lock().unwrap()[index]
            .take()
            .expect("validator gate already released");
        let _ = gate.send(result);
    }
}

#[async_trait]
impl UrlValidator for GatedValidator {
    async fn validate(&self, _raw: &str) -> ValidationResult {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push(Some(tx));
        rx.await
            .unwrap_or_else(|_| ValidationResult::invalid("validator gate dropped"))
    }
}

/// Generator returning a fixed response and recording each call.
pub struct StaticGenerator {
    response: Result<String, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StaticGenerator {
    pub fn ok(raw: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(raw.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            response: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// `(basis, language)` of every call so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationClient for StaticGenerator {
    async fn generate(&self, basis: &str, language: &str) -> GenerationResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((basis.to_string(), language.to_string()));
        self.response
            .clone()
            .map_err(GenerationError::request_failed)
    }
}

/// Generator whose calls block until the test releases them.
#[derive(Default)]
pub struct GatedGenerator {
    gates: Mutex<Vec<Option<oneshot::Sender<GenerationResult<String>>>>>,
    languages: Mutex<Vec<String>>,
}

impl GatedGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.gates.lock().unwrap().len()
    }

    pub fn languages(&self) -> Vec<String> {
        self.languages.lock().unwrap().clone()
    }

    pub fn release(&self, index: usize, result: GenerationResult<String>) {
        let gate = self.gates.lock().unwrap()[index]
            .take()
            .expect("generator gate already released");
        let _ = gate.send(result);
    }

    pub fn release_ok(&self, index: usize, text: &str) {
        self.release(index, Ok(envelope(text)));
    }
}

#[async_trait]
impl GenerationClient for GatedGenerator {
    async fn generate(&self, _basis: &str, language: &str) -> GenerationResult<String> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push(Some(tx));
        self.languages.lock().unwrap().push(language.to_string());
        rx.await
            .unwrap_or_else(|_| Err(GenerationError::request_failed("generator gate dropped")))
    }
}

/// Observer recording every notification.
#[derive(Default)]
pub struct RecordingObserver {
    loading: Mutex<Vec<bool>>,
    states: Mutex<Vec<LifecycleState>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn loading_flags(&self) -> Vec<bool> {
        self.loading.lock().unwrap().clone()
    }

    pub fn states(&self) -> Vec<LifecycleState> {
        self.states.lock().unwrap().clone()
    }
}

impl PresentationObserver for RecordingObserver {
    fn on_loading_state_change(&self, is_loading: bool) {
        self.loading.lock().unwrap().push(is_loading);
    }

    fn on_snapshot(&self, snapshot: &AnalysisSnapshot) {
        self.states.lock().unwrap().push(snapshot.state);
    }
}

pub fn orchestrator(
    validator: Arc<dyn UrlValidator>,
    generator: Arc<dyn GenerationClient>,
) -> Orchestrator {
    Orchestrator::new(OrchestratorConfig::default(), validator, generator)
}

/// Yield to spawned tasks until `condition` holds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
