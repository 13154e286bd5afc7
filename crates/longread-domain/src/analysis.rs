//! Analysis kinds - which question is asked of a document

use std::fmt;

/// The requested analysis category
///
/// The kind decides both the default prompt and the generation strategy:
/// - Style is answered from a head/middle/tail sample of the document
/// - Every other kind walks the document chunk by chunk
/// - Outline, theme and summary get a whole-document synthesis pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisKind {
    /// Plot summary
    Summary,

    /// Structured outline of events and chapters
    Outline,

    /// Writing style critique
    Style,

    /// World-building and setting extraction
    Settings,

    /// Character relationships
    Relationships,

    /// Themes and motifs
    Theme,

    /// Plot hole and continuity audit
    PlotHoles,
}

impl AnalysisKind {
    /// Every kind, in display order
    pub const ALL: [AnalysisKind; 7] = [
        AnalysisKind::Summary,
        AnalysisKind::Outline,
        AnalysisKind::Style,
        AnalysisKind::Settings,
        AnalysisKind::Relationships,
        AnalysisKind::Theme,
        AnalysisKind::PlotHoles,
    ];

    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::Outline => "outline",
            AnalysisKind::Style => "style",
            AnalysisKind::Settings => "settings",
            AnalysisKind::Relationships => "relationships",
            AnalysisKind::Theme => "theme",
            AnalysisKind::PlotHoles => "plotholes",
        }
    }

    /// Parse a kind from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Some(AnalysisKind::Summary),
            "outline" => Some(AnalysisKind::Outline),
            "style" => Some(AnalysisKind::Style),
            "settings" => Some(AnalysisKind::Settings),
            "relationships" => Some(AnalysisKind::Relationships),
            "theme" => Some(AnalysisKind::Theme),
            "plotholes" | "plot-holes" | "plot_holes" => Some(AnalysisKind::PlotHoles),
            _ => None,
        }
    }

    /// Whether this kind is answered from a sample instead of full coverage
    pub fn uses_sampling(&self) -> bool {
        matches!(self, AnalysisKind::Style)
    }

    /// Whether a precomputed digest may replace the raw text for this kind
    pub fn accepts_digest(&self) -> bool {
        !matches!(self, AnalysisKind::Style | AnalysisKind::Summary)
    }

    /// Whether a multi-chunk run ends with a whole-document synthesis pass
    pub fn synthesizes(&self) -> bool {
        matches!(
            self,
            AnalysisKind::Outline | AnalysisKind::Theme | AnalysisKind::Summary
        )
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid analysis kind: {}", s))
    }
}
