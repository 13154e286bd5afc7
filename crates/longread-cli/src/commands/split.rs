//! Split command implementation.

use crate::cli::SplitArgs;
use crate::commands::load_document;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use longread_engine::ChunkBook;

/// Execute the split command.
pub async fn execute_split(args: SplitArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = load_document(&args.file)?;
    let book = ChunkBook::split(&document, &config.engine)?;

    println!("{}", formatter.format_chunks(book.chunks())?);
    eprintln!(
        "{}",
        formatter.info(&format!(
            "{} chars in {} part(s) (target {} chars per part)",
            document.char_len(),
            book.len(),
            config.engine.target_chunk_chars
        ))
    );
    Ok(())
}
