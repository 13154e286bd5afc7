//! Command implementations.

pub mod analyze;
pub mod config;
pub mod digest;
pub mod prompts;
pub mod split;

pub use self::analyze::execute_analyze;
pub use self::config::execute_config;
pub use self::digest::execute_digest;
pub use self::prompts::execute_prompts;
pub use self::split::execute_split;

use crate::error::{CliError, Result};
use longread_domain::Document;
use std::fs;
use std::path::Path;

/// Read a UTF-8 text file into a document.
pub fn load_document(path: &Path) -> Result<Document> {
    let bytes = fs::read(path)?;
    let size = bytes.len() as u64;
    let content = String::from_utf8(bytes).map_err(|_| {
        CliError::InvalidInput(format!("{} is not valid UTF-8 text", path.display()))
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Document::with_size(name, size, content))
}
