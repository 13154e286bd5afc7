//! Digest command implementation.

use crate::cli::DigestArgs;
use crate::commands::load_document;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{ChunkProgress, Formatter};
use longread_domain::Document;
use longread_engine::{ChunkBook, Condenser};
use longread_llm::{create_backend, GenerationBackend};
use std::fs;
use std::sync::Arc;

/// Execute the digest command.
pub async fn execute_digest(args: DigestArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = load_document(&args.file)?;
    let backend = create_backend(&config.backend)?;

    let book = build_digest(&document, config, backend, formatter).await?;
    println!("{}", formatter.format_chunks(book.chunks())?);

    let Some(text) = book.digest().substitute_text() else {
        let failed = book.status_counts().failed;
        return Err(CliError::Incomplete {
            failed,
            total: book.len(),
            what: "chunk condensations",
        });
    };

    match args.output {
        Some(path) => {
            fs::write(&path, text)?;
            eprintln!(
                "{}",
                formatter.success(&format!("Digest written to {}", path.display()))
            );
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Split `document` and condense every chunk.
///
/// Failed chunks are reported but do not make this an error; check the
/// returned book for completeness.
pub async fn build_digest(
    document: &Document,
    config: &Config,
    backend: Arc<dyn GenerationBackend>,
    formatter: &Formatter,
) -> Result<ChunkBook> {
    let mut book = ChunkBook::split(document, &config.engine)?;
    eprintln!(
        "{}",
        formatter.info(&format!(
            "Condensing {} into {} part(s) with {}",
            document.name(),
            book.len(),
            backend.name()
        ))
    );

    let condenser = Condenser::new(backend, config.condense_prompt());
    let mut progress = ChunkProgress::new(formatter, book.len());
    let report = condenser.condense_pending(&mut book, &mut progress).await;

    for (index, error) in &report.failed {
        eprintln!("{}", formatter.error(&format!("Part {}: {}", index + 1, error)));
    }
    eprintln!("{}", formatter.condense_report(&report));
    Ok(book)
}
