//! Prompt construction for analysis and condensation calls
//!
//! Every call sends the same message layout: the user instruction, an
//! optional directive, an optional progress line, a delimiter, then the text.

use longread_domain::{AnalysisKind, PromptSpec};

/// Line that separates instructions from the analyzed text
pub const CONTENT_DELIMITER: &str = "--- Text to analyze ---";

/// Builds the message for one generation call
#[derive(Debug, Clone)]
pub struct PromptBuilder<'a> {
    instruction: &'a str,
    directive: Option<&'a str>,
    progress: Option<(usize, usize)>,
}

impl<'a> PromptBuilder<'a> {
    /// Start from the user instruction
    pub fn new(instruction: &'a str) -> Self {
        Self {
            instruction,
            directive: None,
            progress: None,
        }
    }

    /// Add a directive after the instruction (used for synthesis)
    pub fn with_directive(mut self, directive: &'a str) -> Self {
        self.directive = Some(directive);
        self
    }

    /// Annotate the message with the zero-based part index out of `total`
    pub fn with_progress(mut self, index: usize, total: usize) -> Self {
        self.progress = Some((index, total));
        self
    }

    /// Build the message around `content`
    pub fn build(&self, content: &str) -> String {
        let mut message = String::with_capacity(self.instruction.len() + content.len() + 128);
        message.push_str(self.instruction.trim_end());

        if let Some(directive) = self.directive {
            message.push_str("\n\n");
            message.push_str(directive);
        }

        if let Some((index, total)) = self.progress {
            message.push_str(&format!(
                "\n\n(Currently analyzing part {}/{})",
                index + 1,
                total
            ));
        }

        message.push_str("\n\n");
        message.push_str(CONTENT_DELIMITER);
        message.push_str("\n\n");
        message.push_str(content);
        message
    }
}

/// Extra instruction for the whole-document synthesis pass
///
/// `None` means the kind's base instruction is reused as-is.
pub fn synthesis_directive(kind: AnalysisKind) -> Option<&'static str> {
    match kind {
        AnalysisKind::Outline => Some(
            "The text below is a set of per-part outlines of one long work. \
             Merge them into a single coherent outline of the whole work: \
             remove duplication across parts, keep the chronology, and mark the \
             major turning points.",
        ),
        AnalysisKind::Theme => Some(
            "The text below is a set of per-part theme analyses of one long work. \
             Synthesize them into a single analysis of the work's overarching \
             themes and how they develop from beginning to end.",
        ),
        _ => None,
    }
}

/// Built-in prompt for an analysis kind
pub fn default_prompt(kind: AnalysisKind) -> PromptSpec {
    let (system, user) = match kind {
        AnalysisKind::Summary => (
            "You are a careful literary editor. You write faithful, well-organized \
             summaries and never invent events that are not in the text.",
            "Write a detailed summary of the text. Cover the main storyline, the key \
             characters and what happens to them, and how the text ends. Use Markdown \
             headings for major sections.",
        ),
        AnalysisKind::Outline => (
            "You are a structural editor who reconstructs the plot architecture of \
             long fiction.",
            "Produce a chapter-level outline of the text. For each chapter or scene, \
             list the main events, the characters involved and what changes. Use a \
             nested Markdown list.",
        ),
        AnalysisKind::Style => (
            "You are a stylistics expert. You describe prose with concrete evidence \
             and short quotations.",
            "Analyze the writing style of the text: narrative voice and point of view, \
             sentence rhythm, vocabulary, dialogue, description and pacing. Support \
             each observation with a brief quotation.",
        ),
        AnalysisKind::Settings => (
            "You are a worldbuilding analyst who catalogs fictional settings precisely.",
            "Extract the world settings of the text: locations, factions and \
             organizations, power or magic systems, technology, history and social \
             rules. Group them under Markdown headings and note where each first \
             appears.",
        ),
        AnalysisKind::Relationships => (
            "You are a character analyst who tracks relationships between characters.",
            "List the principal characters of the text and describe the relationships \
             between them: family ties, alliances, rivalries and romances, and how \
             each relationship changes over the course of the text. End with a \
             compact relationship table.",
        ),
        AnalysisKind::Theme => (
            "You are a literary critic focused on themes and motifs.",
            "Identify the central themes and recurring motifs of the text. For each, \
             explain how it is expressed through plot, characters and imagery, citing \
             specific passages.",
        ),
        AnalysisKind::PlotHoles => (
            "You are a continuity editor who checks long fiction for logical \
             consistency.",
            "Find plot holes, continuity errors and logical inconsistencies in the \
             text: contradictory facts, unexplained character knowledge, timeline \
             problems and abandoned threads. For each issue, quote or locate the \
             conflicting passages and rate its severity.",
        ),
    };
    PromptSpec::new(system, user)
}

/// Built-in prompt for condensing one chunk into a digest entry
pub fn default_condense_prompt() -> PromptSpec {
    PromptSpec::new(
        "You compress long fiction into dense factual digests for later analysis. \
         Keep names, places, events and their order. Do not interpret or judge.",
        "Condense this part of a long text into a detailed digest. Preserve every \
         named character, location, faction and significant event in order, and \
         note relationships and world details as they appear. Write plain prose \
         without commentary.",
    )
}
