//! Text boundary detection shared by the splitter and the sampler
//!
//! All offsets are byte offsets into the searched slice and always land on a
//! char boundary. A returned offset points just past the boundary, so the
//! left side keeps its terminator.

/// Boundary levels in descending preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Paragraph,
    Line,
    Sentence,
    Whitespace,
}

impl Level {
    pub(crate) const PREFERENCE: [Level; 4] =
        [Level::Paragraph, Level::Line, Level::Sentence, Level::Whitespace];
}

const PARAGRAPH_BREAKS: [&str; 2] = ["\n\n", "\n\r\n"];

const SENTENCE_TERMINATORS: [char; 7] = ['。', '！', '？', '.', '!', '?', '…'];

/// Closing quotes and brackets that stay attached to the sentence they end
const CLOSERS: [char; 10] = ['"', '\'', '”', '’', '」', '』', '）', ')', '》', '】'];

/// Offset just past the last boundary of `level` in `s`
pub(crate) fn last(s: &str, level: Level) -> Option<usize> {
    match level {
        Level::Paragraph => PARAGRAPH_BREAKS
            .iter()
            .filter_map(|p| s.rfind(p).map(|i| i + p.len()))
            .max(),
        Level::Line => s.rfind('\n').map(|i| i + 1),
        Level::Sentence => s
            .char_indices()
            .rev()
            .find(|(_, c)| SENTENCE_TERMINATORS.contains(c))
            .map(|(i, c)| absorb_closers(s, i + c.len_utf8())),
        Level::Whitespace => s
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8()),
    }
}

/// Offset just past the first boundary of `level` in `s`
pub(crate) fn first(s: &str, level: Level) -> Option<usize> {
    match level {
        Level::Paragraph => PARAGRAPH_BREAKS
            .iter()
            .filter_map(|p| s.find(p).map(|i| i + p.len()))
            .min(),
        Level::Line => s.find('\n').map(|i| i + 1),
        Level::Sentence => s
            .char_indices()
            .find(|(_, c)| SENTENCE_TERMINATORS.contains(c))
            .map(|(i, c)| absorb_closers(s, i + c.len_utf8())),
        Level::Whitespace => s
            .char_indices()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8()),
    }
}

/// Offsets just past every boundary of `level` in `s`, ascending
///
/// Paragraph breaks may overlap, so a run of three newlines yields two ends.
pub(crate) fn ends(s: &str, level: Level) -> Vec<usize> {
    let mut ends: Vec<usize> = match level {
        Level::Paragraph => s
            .char_indices()
            .filter_map(|(i, _)| {
                PARAGRAPH_BREAKS
                    .iter()
                    .find(|p| s[i..].starts_with(**p))
                    .map(|p| i + p.len())
            })
            .collect(),
        Level::Line => s.match_indices('\n').map(|(i, _)| i + 1).collect(),
        Level::Sentence => s
            .char_indices()
            .filter(|(_, c)| SENTENCE_TERMINATORS.contains(c))
            .map(|(i, c)| absorb_closers(s, i + c.len_utf8()))
            .collect(),
        Level::Whitespace => s
            .char_indices()
            .filter(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .collect(),
    };
    ends.sort_unstable();
    ends.dedup();
    ends
}

/// Offset just past the first sentence end or line break in `s`
pub(crate) fn first_snap(s: &str) -> Option<usize> {
    [first(s, Level::Line), first(s, Level::Sentence)]
        .into_iter()
        .flatten()
        .min()
}

/// Offset just past the last sentence end or line break in `s`
pub(crate) fn last_snap(s: &str) -> Option<usize> {
    [last(s, Level::Line), last(s, Level::Sentence)]
        .into_iter()
        .flatten()
        .max()
}

fn absorb_closers(s: &str, mut end: usize) -> usize {
    for c in s[end..].chars() {
        if !CLOSERS.contains(&c) {
            break;
        }
        end += c.len_utf8();
    }
    end
}

/// Byte offset of the char at position `n`, or `None` if `s` has `n` chars or fewer
pub(crate) fn char_offset(s: &str, n: usize) -> Option<usize> {
    s.char_indices().nth(n).map(|(i, _)| i)
}
