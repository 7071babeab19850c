//! Progress and warning reporting.
//!
//! Core components never log directly; they receive a [`Reporter`] so callers
//! decide where messages go (tracing, workflow annotations, or a test buffer).

use std::cell::RefCell;

/// Sink for progress messages and recoverable warnings.
pub trait Reporter {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn debug(&self, _message: &str) {}
}

/// Forwards messages to `tracing`.
///
/// When `annotate` is set, warnings are also printed as GitHub Actions
/// `::warning::` workflow commands so they surface in the run summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter {
    pub annotate: bool,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable workflow annotations when running inside GitHub Actions.
    pub fn from_env() -> Self {
        let annotate = std::env::var("GITHUB_ACTIONS")
            .map(|v| v == "true")
            .unwrap_or(false);
        Self { annotate }
    }
}

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        if self.annotate {
            println!("::warning::{}", escape_workflow_data(message));
        }
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }
}

/// Collects messages in memory. Used by tests and by callers that want to
/// inspect warnings after a scan.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    infos: RefCell<Vec<String>>,
    warnings: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.borrow().clone()
    }
}

impl Reporter for RecordingReporter {
    fn info(&self, message: &str) {
        self.infos.borrow_mut().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }
}

/// Escape a message for use as workflow command data.
pub fn escape_workflow_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
