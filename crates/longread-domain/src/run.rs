//! Analysis runs - the transcript of one (document, kind) analysis

use crate::AnalysisKind;
use std::fmt;

/// Lifecycle of an analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// Not started yet
    Pending,

    /// Generation calls are streaming into the transcript
    Running,

    /// Every call finished successfully
    Completed,

    /// A call failed; the transcript keeps what was streamed before the failure
    Failed,
}

impl RunStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    /// Whether the run reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulated output and status for one analysis
///
/// The content is append-only while running and reset when a run starts.
/// A run owns its accumulator, so holding `&mut AnalysisRun` is what keeps a
/// single generation call in flight per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRun {
    kind: AnalysisKind,
    content: String,
    status: RunStatus,
    error: Option<String>,
}

impl AnalysisRun {
    /// Create a pending run for the given kind
    pub fn new(kind: AnalysisKind) -> Self {
        Self {
            kind,
            content: String::new(),
            status: RunStatus::Pending,
            error: None,
        }
    }

    /// The analysis kind
    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    /// The transcript accumulated so far
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Current status
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Failure description, set only when the run failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reset the transcript and mark the run as running
    pub fn start(&mut self) {
        self.content.clear();
        self.error = None;
        self.status = RunStatus::Running;
    }

    /// Append an increment and return the running total
    pub fn append(&mut self, delta: &str) -> &str {
        self.content.push_str(delta);
        &self.content
    }

    /// Mark the run as completed
    pub fn complete(&mut self) {
        self.status = RunStatus::Completed;
    }

    /// Mark the run as failed, keeping the partial transcript
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = RunStatus::Failed;
        self.error = Some(error.into());
    }
}
