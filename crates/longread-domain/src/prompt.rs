//! Prompt specification - the tunable half of a generation call

/// The `{system, user}` instruction pair for one analysis
///
/// The system instruction is passed through untouched. The user instruction
/// may get progress annotations appended by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromptSpec {
    /// System instruction (persona and focus)
    pub system: String,

    /// User instruction (task and output format)
    pub user: String,
}

impl PromptSpec {
    /// Create a new prompt spec
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// True when both instructions are blank
    pub fn is_empty(&self) -> bool {
        self.system.trim().is_empty() && self.user.trim().is_empty()
    }
}
