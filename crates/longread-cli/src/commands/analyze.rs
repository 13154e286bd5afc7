//! Analyze command implementation.

use crate::cli::AnalyzeArgs;
use crate::commands::digest::build_digest;
use crate::commands::load_document;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{Formatter, TranscriptWriter};
use longread_domain::{AnalysisKind, AnalysisRun};
use longread_engine::{AnalysisInput, Analyzer, ChunkBook};
use longread_llm::create_backend;
use std::fs;
use std::sync::Arc;
use tracing::debug;

/// Execute the analyze command.
pub async fn execute_analyze(args: AnalyzeArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = load_document(&args.file)?;
    let backend = create_backend(&config.backend)?;

    let mut drafts = config.drafts()?;
    if let Some(id) = &args.template {
        let registry = config.registry()?;
        let template = registry
            .get(id)
            .ok_or_else(|| CliError::InvalidInput(format!("Unknown template '{}'", id)))?;
        debug!("Using template {} for {}", template.id, template.kind);
        drafts.apply_template(template);
    }

    let book: Option<ChunkBook> = if args.precompute {
        let book = build_digest(&document, config, Arc::clone(&backend), formatter).await?;
        if !book.is_complete() {
            eprintln!(
                "{}",
                formatter.warning("Digest incomplete; analyzing the full text instead")
            );
        }
        Some(book)
    } else {
        None
    };

    let analyzer = Analyzer::new(backend, config.engine.clone())?;

    let mut kinds: Vec<AnalysisKind> = Vec::new();
    for kind in args.kinds.iter().copied().map(AnalysisKind::from) {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    let mut report = String::new();
    let mut failed = 0;

    for kind in &kinds {
        println!("{}\n", formatter.heading(kind.as_str()));

        let mut run = AnalysisRun::new(*kind);
        let mut input = AnalysisInput::new(&document, drafts.get(*kind));
        if let Some(book) = &book {
            input = input.with_digest(book.digest());
        }

        let mut sink = TranscriptWriter::stdout();
        let result = analyzer.analyze(&mut run, input, &mut sink).await;
        println!("\n");

        if let Err(e) = result {
            failed += 1;
            eprintln!("{}", formatter.error(&format!("{} failed: {}", kind, e)));
        }
        report.push_str(&format!("# {}\n\n{}\n\n", kind, run.content()));
    }

    if let Some(path) = &args.output {
        fs::write(path, &report)?;
        eprintln!(
            "{}",
            formatter.success(&format!("Results written to {}", path.display()))
        );
    }

    if failed > 0 {
        return Err(CliError::Incomplete {
            failed,
            total: kinds.len(),
            what: "analyses",
        });
    }
    Ok(())
}
