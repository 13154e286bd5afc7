//! Boundary-aware splitting of long documents
//!
//! The splitter walks the text from a cursor and cuts each chunk at the best
//! available boundary near the target size. For every preference level it
//! scans one window around the cutoff: the last boundary ending at or before
//! the cutoff (never before the minimum chunk size) wins, otherwise the first
//! one ending after it, up to the boundary window. A separator straddling the
//! cutoff counts as a boundary of its own level. Only then does the splitter
//! fall back to the next level. Only when no boundary exists anywhere in the window does it cut
//! exactly at the cutoff.
//!
//! Chunks are contiguous slices of the input: concatenating them yields the
//! input unchanged.

use crate::boundary::{self, char_offset, Level};

/// Splits text into contiguous chunks of roughly `target` chars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Splitter {
    target: usize,
    min: usize,
    window: usize,
}

impl Splitter {
    /// Create a splitter; `min` is clamped into `1..=target`
    pub fn new(target: usize, min: usize, window: usize) -> Self {
        let target = target.max(1);
        Self {
            target,
            min: min.clamp(1, target),
            window,
        }
    }

    /// Target chunk size in chars
    pub fn target(&self) -> usize {
        self.target
    }

    /// Split `text` into chunks
    ///
    /// Text of at most `target` chars (including the empty string) comes back
    /// as a single chunk equal to the input.
    pub fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut chunks = Vec::new();
        let mut cursor = 0;

        loop {
            let rest = &text[cursor..];
            let Some(cutoff) = char_offset(rest, self.target) else {
                chunks.push(rest);
                break;
            };

            let split = self.find_split(rest, cutoff);
            chunks.push(&rest[..split]);
            cursor += split;

            if cursor >= text.len() {
                break;
            }
        }

        chunks
    }

    /// Number of chunks `text` would split into
    pub fn count(&self, text: &str) -> usize {
        self.split(text).len()
    }

    fn find_split(&self, rest: &str, cutoff: usize) -> usize {
        let inner_chars = self.min.max(self.target.saturating_sub(self.window));
        let inner = char_offset(rest, inner_chars).unwrap_or(cutoff).min(cutoff);
        let ceiling = char_offset(rest, self.target + self.window).unwrap_or(rest.len());

        let window = &rest[inner..ceiling];
        let cutoff_in_window = cutoff - inner;

        for level in Level::PREFERENCE {
            let ends = boundary::ends(window, level);
            let behind = ends.iter().rev().find(|&&end| end <= cutoff_in_window);
            let ahead = ends.iter().find(|&&end| end > cutoff_in_window);
            if let Some(end) = behind.or(ahead) {
                return inner + end;
            }
        }

        cutoff
    }
}
