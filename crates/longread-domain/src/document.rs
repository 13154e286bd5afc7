//! Document module - the immutable input of every analysis

/// A fully decoded document supplied by a document provider
///
/// Documents are immutable once loaded. The size is the byte length of the
/// decoded content; chunking and sampling measure text in chars instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    size: u64,
    content: String,
}

impl Document {
    /// Create a document from decoded text, deriving its byte size
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// Create a document whose size was reported by the provider
    ///
    /// Providers that read from disk know the on-disk size, which can differ
    /// from the decoded length when the source used another encoding.
    pub fn with_size(name: impl Into<String>, size: u64, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            content: content.into(),
        }
    }

    /// Display name of the document
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes as reported by the provider
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The decoded text
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length of the content in chars
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// True when the content is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
