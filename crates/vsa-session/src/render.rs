//! Terminal rendering of published snapshots.

use std::io::Write;
use std::sync::Mutex;

use tracing::debug;
use vsa_core::PresentationObserver;
use vsa_models::{AnalysisSnapshot, LifecycleState, RequestId};

pub const LOADING_MESSAGE: &str = "Analyzing video and generating script structure...";

/// Text to print for a snapshot, or `None` if nothing user-visible changed.
pub fn render_snapshot(snapshot: &AnalysisSnapshot) -> Option<String> {
    match snapshot.state {
        LifecycleState::Idle => snapshot.notice.as_ref().map(|n| format!("! {}", n)),
        LifecycleState::Validating => Some(snapshot.state.button_label().to_string()),
        LifecycleState::Generating => {
            let mut out = format!("{} ({})", LOADING_MESSAGE, snapshot.language);
            if let Some(embed) = &snapshot.embed_url {
                out.push_str(&format!("\n  player: {}", embed));
            }
            Some(out)
        }
        LifecycleState::Ready => snapshot.analysis_text().map(|text| {
            format!(
                "\n=== Analysis ({}) ===\n{}\n",
                snapshot.language,
                text.trim_end()
            )
        }),
        LifecycleState::Error => {
            let message = snapshot
                .error
                .as_deref()
                .unwrap_or(vsa_core::UNKNOWN_ERROR_MESSAGE);
            let mut out = format!("Error: {}", message);
            if let Some(hint) = &snapshot.hint {
                out.push_str(&format!("\n  {}", hint));
            }
            Some(out)
        }
    }
}

type Rendered = (LifecycleState, Option<RequestId>, Option<String>);

/// Prints snapshots to stdout as they are published.
#[derive(Default)]
pub struct TerminalObserver {
    last: Mutex<Option<Rendered>>,
}

impl TerminalObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationObserver for TerminalObserver {
    fn on_loading_state_change(&self, is_loading: bool) {
        debug!(is_loading, "Loading state changed");
    }

    fn on_snapshot(&self, snapshot: &AnalysisSnapshot) {
        let key = (snapshot.state, snapshot.request_id, snapshot.notice.clone());
        {
            let mut last = self
                .last
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if last.as_ref() == Some(&key) {
                return;
            }
            *last = Some(key);
        }

        if let Some(text) = render_snapshot(snapshot) {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{}", text);
            let _ = stdout.flush();
        }
    }
}
