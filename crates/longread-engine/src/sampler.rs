//! Head/middle/tail sampling for style analysis
//!
//! Style is judged from three windows of the document instead of the whole
//! text. Each window edge is nudged to the nearest sentence end or line break
//! so samples do not start or stop mid-sentence.

use crate::boundary::{self, char_offset};
use std::borrow::Cow;

/// Takes head, middle and tail samples from long texts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    threshold: usize,
    part: usize,
    snap: usize,
}

impl Sampler {
    /// Create a sampler
    pub fn new(threshold: usize, part: usize, snap: usize) -> Self {
        Self {
            threshold,
            part: part.max(1),
            snap,
        }
    }

    /// Whether `text` is long enough to be sampled
    pub fn applies(&self, text: &str) -> bool {
        char_offset(text, self.threshold).is_some()
    }

    /// Sample `text`, or return it unchanged when it is under the threshold
    pub fn sample<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !self.applies(text) {
            return Cow::Borrowed(text);
        }

        let n = text.chars().count();
        let part = self.part.min(n);
        let at = |pos: usize| char_offset(text, pos).unwrap_or(text.len());

        let head_end = self.snap_forward(text, part, n);

        let mid_nominal = (n / 2).saturating_sub(part / 2);
        let mid_start = self.snap_backward(text, mid_nominal).max(head_end);
        let mid_end = self.snap_forward(text, mid_nominal + part, n).max(mid_start);

        let tail_start = self.snap_backward(text, n - part).max(mid_end);

        let mut out = String::with_capacity(at(part) * 3 + 128);
        out.push_str(&text[..head_end]);
        push_elided(&mut out, &text[head_end..mid_start]);
        out.push_str(&text[mid_start..mid_end]);
        push_elided(&mut out, &text[mid_end..tail_start]);
        out.push_str(&text[tail_start..]);

        Cow::Owned(out)
    }

    /// Byte offset of char `pos`, moved forward to just past a boundary
    fn snap_forward(&self, text: &str, pos: usize, n: usize) -> usize {
        let start = char_offset(text, pos).unwrap_or(text.len());
        let end = char_offset(text, (pos + self.snap).min(n)).unwrap_or(text.len());
        boundary::first_snap(&text[start..end]).map_or(start, |off| start + off)
    }

    /// Byte offset of char `pos`, moved backward to just past a boundary
    fn snap_backward(&self, text: &str, pos: usize) -> usize {
        let end = char_offset(text, pos).unwrap_or(text.len());
        let start = char_offset(text, pos.saturating_sub(self.snap)).unwrap_or(text.len());
        boundary::last_snap(&text[start..end]).map_or(end, |off| start + off)
    }
}

fn push_elided(out: &mut String, omitted: &str) {
    if omitted.is_empty() {
        return;
    }
    out.push_str(&format!(
        "\n\n...[{} characters omitted]...\n\n",
        omitted.chars().count()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_is_unchanged() {
        let sampler = Sampler::new(100, 30, 10);
        let text = "A short story.";
        assert!(matches!(sampler.sample(text), Cow::Borrowed(t) if t == text));
        assert!(!sampler.applies(text));
    }

    #[test]
    fn test_text_at_threshold_is_unchanged() {
        let sampler = Sampler::new(10, 3, 1);
        assert_eq!(sampler.sample("0123456789"), "0123456789");
    }

    #[test]
    fn test_long_text_has_three_parts() {
        let sampler = Sampler::new(100, 20, 0);
        let text: String = "x".repeat(300);
        let sample = sampler.sample(&text);
        assert_eq!(sample.matches("characters omitted").count(), 2);
        assert!(sample.starts_with(&"x".repeat(20)));
        assert!(sample.ends_with(&"x".repeat(20)));
        assert!(sample.contains("[120 characters omitted]"));
    }

    #[test]
    fn test_edges_snap_to_sentences() {
        let sentence = "The cat sat. ";
        let text = sentence.repeat(40);
        let sampler = Sampler::new(100, 30, 20);
        let sample = sampler.sample(&text);

        let head = sample.split("\n\n...[").next().unwrap();
        assert!(head.ends_with('.'));
        let tail = sample.rsplit("]...\n\n").next().unwrap();
        assert!(tail.starts_with(' ') || tail.starts_with('T'));
    }

    #[test]
    fn test_multibyte_text() {
        let text = "春眠不觉晓。处处闻啼鸟。".repeat(50);
        let sampler = Sampler::new(200, 36, 12);
        let sample = sampler.sample(&text);
        assert!(sample.starts_with("春眠不觉晓。"));
        assert!(sample.ends_with("处处闻啼鸟。"));
    }

    proptest! {
        #[test]
        fn prop_sample_keeps_head_and_tail(
            text in "[a-z .\n]{120,400}",
            part in 1usize..40,
            snap in 0usize..20,
        ) {
            let sampler = Sampler::new(100, part, snap);
            let sample = sampler.sample(&text);
            let head: String = text.chars().take(part).collect();
            let tail: String = text.chars().skip(text.chars().count() - part).collect();
            prop_assert!(sample.starts_with(&head));
            prop_assert!(sample.ends_with(&tail));
        }
    }
}
