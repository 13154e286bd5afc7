//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use longread_domain::{Chunk, ChunkObserver, ChunkStatus, StreamSink};
use longread_engine::{CondenseReport, PromptTemplate};
use std::io::Write;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const PREVIEW_CHARS: usize = 40;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format chunks with their condensation status.
    pub fn format_chunks(&self, chunks: &[Chunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_chunks_json(chunks),
            OutputFormat::Table => Ok(self.format_chunks_table(chunks)),
            OutputFormat::Quiet => Ok(chunks
                .iter()
                .map(|c| format!("{}\t{}\t{}", c.index() + 1, c.char_len(), c.status()))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_chunks_json(&self, chunks: &[Chunk]) -> Result<String> {
        let json_chunks: Vec<serde_json::Value> = chunks
            .iter()
            .map(|c| {
                serde_json::json!({
                    "part": c.index() + 1,
                    "chars": c.char_len(),
                    "status": c.status().as_str(),
                    "summary_chars": c.summary().chars().count(),
                    "preview": preview(c.text()),
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json_chunks)?)
    }

    fn format_chunks_table(&self, chunks: &[Chunk]) -> String {
        if chunks.is_empty() {
            return self.colorize("No chunks.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Part", "Chars", "Status", "Preview"]);

        for chunk in chunks {
            builder.push_record([
                (chunk.index() + 1).to_string(),
                chunk.char_len().to_string(),
                self.status_label(chunk.status()),
                preview(chunk.text()),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Format prompt templates.
    pub fn format_templates(&self, templates: &[&PromptTemplate]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json_templates: Vec<serde_json::Value> = templates
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "id": t.id,
                            "name": t.name,
                            "kind": t.kind.as_str(),
                            "builtin": t.is_builtin(),
                            "system": t.prompt.system,
                            "user": t.prompt.user,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json_templates)?)
            }
            OutputFormat::Quiet => Ok(templates
                .iter()
                .map(|t| t.id.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if templates.is_empty() {
                    return Ok(self.colorize("No templates found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Kind", "Name", "Origin"]);
                for t in templates {
                    let origin = if t.is_builtin() { "built-in" } else { "user" };
                    builder.push_record([t.id.as_str(), t.kind.as_str(), t.name.as_str(), origin]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
        }
    }

    /// One-line summary of a condense pass.
    pub fn condense_report(&self, report: &CondenseReport) -> String {
        let line = format!(
            "Condensed {} chunk(s), {} failed, {} already done",
            report.completed.len(),
            report.failed.len(),
            report.skipped.len()
        );
        if report.is_success() {
            self.success(&line)
        } else {
            self.warning(&line)
        }
    }

    /// Heading printed before each analysis.
    pub fn heading(&self, text: &str) -> String {
        if self.color_enabled {
            format!("# {}", text).as_str().bold().to_string()
        } else {
            format!("# {}", text)
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn status_label(&self, status: ChunkStatus) -> String {
        let color = match status {
            ChunkStatus::Pending => "",
            ChunkStatus::InProgress => "cyan",
            ChunkStatus::Completed => "green",
            ChunkStatus::Failed => "red",
        };
        self.colorize(status.as_str(), color)
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

/// First few chars of `text` on one line.
fn preview(text: &str) -> String {
    let flat: String = text
        .trim_start()
        .chars()
        .take(PREVIEW_CHARS + 1)
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut.trim_end())
    } else {
        flat.trim_end().to_string()
    }
}

/// Writes each new increment of a running transcript to `W`.
pub struct TranscriptWriter<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> TranscriptWriter<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Give back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TranscriptWriter<std::io::Stdout> {
    /// Writer over stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> StreamSink for TranscriptWriter<W> {
    fn on_update(&mut self, total: &str) {
        // A shorter total means the run restarted.
        if total.len() < self.written {
            self.written = 0;
        }
        let delta = &total[self.written..];
        if self.out.write_all(delta.as_bytes()).is_ok() {
            self.written = total.len();
            self.out.flush().ok();
        }
    }
}

/// Prints chunk status changes to stderr.
pub struct ChunkProgress<'a> {
    formatter: &'a Formatter,
    total: usize,
}

impl<'a> ChunkProgress<'a> {
    /// Progress printer for `total` chunks.
    pub fn new(formatter: &'a Formatter, total: usize) -> Self {
        Self { formatter, total }
    }
}

impl ChunkObserver for ChunkProgress<'_> {
    fn on_status(&mut self, index: usize, status: ChunkStatus) {
        let line = format!("Part {}/{} {}", index + 1, self.total, status);
        let line = match status {
            ChunkStatus::Completed => self.formatter.success(&line),
            ChunkStatus::Failed => self.formatter.error(&line),
            _ => self.formatter.info(&line),
        };
        eprintln!("{}", line);
    }
}
