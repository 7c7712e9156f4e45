//! Lifecycle states and the read-only snapshot handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::language::Language;
use crate::submission::RequestId;

/// UI-visible phase of the submission pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Waiting for input
    #[default]
    Idle,
    /// Checking the reference before generating
    Validating,
    /// Waiting on the generation call
    Generating,
    /// Analysis available
    Ready,
    /// Generation or parsing failed for the current submission
    Error,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Validating => "validating",
            LifecycleState::Generating => "generating",
            LifecycleState::Ready => "ready",
            LifecycleState::Error => "error",
        }
    }

    /// Whether a pipeline is in flight. This is the loading flag the
    /// presentation layer is notified of.
    pub fn is_busy(&self) -> bool {
        matches!(self, LifecycleState::Validating | LifecycleState::Generating)
    }

    /// Whether the current submission reached an outcome.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Ready | LifecycleState::Error)
    }

    /// Status line for the submit control.
    pub fn button_label(&self) -> &'static str {
        match self {
            LifecycleState::Validating => "Validating URL...",
            LifecycleState::Generating => "Analyzing...",
            _ => "Analyze Video",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Published view of the orchestrator state.
///
/// Snapshots are values; the presentation layer never mutates orchestrator state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub state: LifecycleState,
    /// Id of the current submission, if any
    pub request_id: Option<RequestId>,
    /// Reference being analyzed or displayed
    pub reference: Option<String>,
    /// Language used for the next (or current) submission
    pub language: Language,
    /// Embeddable player URL for the displayed reference
    pub embed_url: Option<String>,
    pub analysis: Option<AnalysisResult>,
    /// Error message while in `Error`
    pub error: Option<String>,
    /// Non-fatal message to show the user (validation rejections)
    pub notice: Option<String>,
    /// Extra guidance attached to an error
    pub hint: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisSnapshot {
    /// Empty `Idle` snapshot for `language`.
    pub fn idle(language: Language) -> Self {
        Self {
            state: LifecycleState::Idle,
            request_id: None,
            reference: None,
            language,
            embed_url: None,
            analysis: None,
            error: None,
            notice: None,
            hint: None,
            updated_at: Utc::now(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_busy()
    }

    /// Analysis text, only while `Ready`.
    pub fn analysis_text(&self) -> Option<&str> {
        match self.state {
            LifecycleState::Ready => self.analysis.as_ref().map(|a| a.text.as_str()),
            _ => None,
        }
    }
}
