//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use longread_domain::AnalysisKind;
use std::path::PathBuf;

/// Longread CLI - Analyze documents too long for a single model call.
#[derive(Debug, Parser)]
#[command(name = "longread")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format for tables
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LONGREAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (one line per item)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one or more analyses over a document
    Analyze(AnalyzeArgs),

    /// Precompute the digest of a document
    Digest(DigestArgs),

    /// Show how a document would be split
    Split(SplitArgs),

    /// Inspect prompts and templates
    Prompts(PromptsArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Text file to analyze
    pub file: PathBuf,

    /// Analysis kinds to run, in order
    #[arg(short, long = "kind", value_enum, required = true)]
    pub kinds: Vec<KindArg>,

    /// Template id to use as the prompt for its kind
    #[arg(short, long)]
    pub template: Option<String>,

    /// Condense the document first and analyze the digest where possible
    #[arg(long)]
    pub precompute: bool,

    /// Also write all results to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the digest command.
#[derive(Debug, Parser)]
pub struct DigestArgs {
    /// Text file to condense
    pub file: PathBuf,

    /// Write the digest to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the split command.
#[derive(Debug, Parser)]
pub struct SplitArgs {
    /// Text file to split
    pub file: PathBuf,
}

/// Arguments for prompt inspection.
#[derive(Debug, Parser)]
pub struct PromptsArgs {
    #[command(subcommand)]
    pub action: PromptsAction,
}

/// Prompt inspection actions.
#[derive(Debug, Subcommand)]
pub enum PromptsAction {
    /// List built-in and user templates
    List {
        /// Only templates for this kind
        #[arg(short, long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Show the prompt a kind will run with
    Show {
        /// Analysis kind
        #[arg(value_enum)]
        kind: KindArg,

        /// Show this template instead of the current prompt
        #[arg(short, long)]
        template: Option<String>,
    },
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

/// Analysis kind argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KindArg {
    /// Plot summary
    Summary,
    /// Chapter-level outline
    Outline,
    /// Writing style
    Style,
    /// World settings
    Settings,
    /// Character relationships
    Relationships,
    /// Themes and motifs
    Theme,
    /// Plot holes and continuity errors
    #[value(name = "plotholes", alias = "plot-holes")]
    PlotHoles,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<KindArg> for AnalysisKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Summary => AnalysisKind::Summary,
            KindArg::Outline => AnalysisKind::Outline,
            KindArg::Style => AnalysisKind::Style,
            KindArg::Settings => AnalysisKind::Settings,
            KindArg::Relationships => AnalysisKind::Relationships,
            KindArg::Theme => AnalysisKind::Theme,
            KindArg::PlotHoles => AnalysisKind::PlotHoles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_command() {
        let cli = Cli::parse_from([
            "longread",
            "analyze",
            "novel.txt",
            "--kind",
            "outline",
            "-k",
            "plot-holes",
            "--precompute",
        ]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.file, PathBuf::from("novel.txt"));
                assert_eq!(args.kinds, vec![KindArg::Outline, KindArg::PlotHoles]);
                assert!(args.precompute);
                assert!(args.output.is_none());
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_requires_kind() {
        assert!(Cli::try_parse_from(["longread", "analyze", "novel.txt"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["longread", "split", "a.txt", "-vv", "--no-color"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::Split(_)));
    }

    #[test]
    fn test_prompts_show() {
        let cli = Cli::parse_from(["longread", "prompts", "show", "plotholes"]);
        match cli.command {
            Command::Prompts(PromptsArgs {
                action: PromptsAction::Show { kind, template },
            }) => {
                assert_eq!(kind, KindArg::PlotHoles);
                assert!(template.is_none());
            }
            _ => panic!("Expected Prompts Show command"),
        }
    }

    #[test]
    fn test_kind_conversion() {
        let kind: AnalysisKind = KindArg::PlotHoles.into();
        assert_eq!(kind, AnalysisKind::PlotHoles);
    }
}
