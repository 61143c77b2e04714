//! Line-level repair of extracted Arabic text.
//!
//! Upstream extraction damages Arabic in three ways: glyphs arrive as
//! presentation forms, words arrive as space-separated letters, and lines
//! arrive in visual instead of logical order. `TextDirectionNormalizer`
//! undoes all three so structural markers become contiguous tokens.

use std::borrow::Cow;
use std::sync::Arc;

use unicode_bidi::{BidiInfo, Level};
use unicode_normalization::UnicodeNormalization;

use super::glyphs::{is_arabic, is_arabic_letter, is_presentation_form, BIDI_CONTROLS};
use super::shaping::reshape;
use crate::patterns::LanguagePatternSet;
use crate::types::LogicalLine;

const RLE: char = '\u{202B}';
const PDF: char = '\u{202C}';
const LRI: char = '\u{2066}';
const PDI: char = '\u{2069}';

/// Average token length at or below which a line counts as fragmented.
const FRAGMENTED_TOKEN_LEN: f64 = 2.0;

/// Least gain in logical-order evidence before a line is reversed.
const MIN_ORDER_GAIN: usize = 2;

/// Definite article; logical text starts many words with it, visual text
/// ends them with its mirror.
const DEFINITE_ARTICLE: &str = "ال";

/// Repairs glyph forms, fragmentation and reading order line by line.
#[derive(Debug, Clone)]
pub struct TextDirectionNormalizer {
    patterns: Arc<LanguagePatternSet>,
    arabic_ratio_threshold: f64,
}

impl TextDirectionNormalizer {
    /// Create a normalizer. With `arabic_ratio_threshold == 0.0` every line
    /// containing Arabic is normalized.
    #[must_use]
    pub fn new(patterns: Arc<LanguagePatternSet>, arabic_ratio_threshold: f64) -> Self {
        Self {
            patterns,
            arabic_ratio_threshold,
        }
    }

    /// Split page-concatenated text into normalized logical lines.
    ///
    /// Lines are numbered from 1; form feeds (page breaks) count as line breaks.
    #[must_use]
    pub fn normalize_lines(&self, text: &str) -> Vec<LogicalLine> {
        text.split(['\n', '\u{000C}'])
            .enumerate()
            .map(|(i, raw)| {
                let raw = raw.trim_end_matches('\r');
                let normalized = if self.needs_fixing(raw) {
                    self.fix_arabic_text(raw)
                } else {
                    strip_controls(raw).trim().to_string()
                };
                LogicalLine::new(i + 1, raw, normalized)
            })
            .collect()
    }

    /// Whether a line shows any sign of extraction damage.
    #[must_use]
    pub fn needs_fixing(&self, line: &str) -> bool {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return false;
        }
        if line.chars().any(is_presentation_form) {
            return true;
        }
        if average_token_len(&tokens) <= FRAGMENTED_TOKEN_LEN {
            return true;
        }
        let ratio = arabic_ratio(line);
        ratio > 0.0 && ratio >= self.arabic_ratio_threshold
    }

    /// Repair a line into logical-order text with standard letters.
    ///
    /// Never fails: each stage degrades to its input when it cannot improve it.
    #[must_use]
    pub fn fix_arabic_text(&self, line: &str) -> String {
        let text = strip_controls(line);
        let text = self.map_presentation_forms(&text);
        let text = self.merge_fragments(&text);
        let text = self.restore_logical_order(&text);
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Render a line for display: repair it, join the glyphs, then lay it
    /// out in visual order (right-to-left base when Arabic dominates).
    #[must_use]
    pub fn to_display(&self, line: &str) -> String {
        let logical = self.fix_arabic_text(line);
        let shaped = reshape(&logical, self.patterns.glyphs());
        let base = arabic_majority(&logical).then(Level::rtl);
        reorder(&shaped, base)
    }

    /// Wrap an Arabic-majority line in an explicit right-to-left embedding,
    /// isolating digit and Latin runs so numbers keep left-to-right order.
    #[must_use]
    pub fn ensure_direction(&self, line: &str) -> String {
        let text = strip_controls(line);
        if !arabic_majority(&text) {
            return text.into_owned();
        }

        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len() + 8);
        out.push(RLE);

        let mut i = 0;
        while i < chars.len() {
            if is_ltr_strong(chars[i]) {
                let start = i;
                let mut end = i + 1;
                while end < chars.len() {
                    if is_ltr_strong(chars[end]) {
                        end += 1;
                    } else if is_ltr_joiner(chars[end])
                        && chars.get(end + 1).is_some_and(|c| is_ltr_strong(*c))
                    {
                        end += 2;
                    } else {
                        break;
                    }
                }
                out.push(LRI);
                out.extend(&chars[start..end]);
                out.push(PDI);
                i = end;
            } else {
                out.push(chars[i]);
                i += 1;
            }
        }

        out.push(PDF);
        out
    }

    /// Replace presentation glyphs with logical letters: the fixed table
    /// first, compatibility decomposition for anything it does not list.
    fn map_presentation_forms(&self, text: &str) -> String {
        let glyphs = self.patterns.glyphs();
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if let Some(letters) = glyphs.logical(c) {
                out.push_str(letters);
            } else if is_presentation_form(c) {
                out.extend(std::iter::once(c).nfkc());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Join runs of single-letter Arabic tokens back into words.
    ///
    /// In fragmented lines a run of two or more spaces marks a real word
    /// boundary. A merged run that starts with a structural keyword is
    /// split after it ("البابالأول" → "الباب الأول"). Elsewhere only runs
    /// spelling a keyword are merged, so letter lists ("أ ب ج") survive.
    fn merge_fragments(&self, text: &str) -> String {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() {
            return String::new();
        }
        let fragmented = average_token_len(&tokens) <= FRAGMENTED_TOKEN_LEN;
        let min_run = if fragmented { 2 } else { 3 };
        let keyword_only = !fragmented;

        let segments: Vec<&str> = if fragmented && text.contains("  ") {
            text.split("  ").filter(|s| !s.trim().is_empty()).collect()
        } else {
            vec![text]
        };

        let merged: Vec<String> = segments
            .iter()
            .map(|segment| self.merge_segment(segment, min_run, keyword_only))
            .collect();
        merged.join(" ")
    }

    fn merge_segment(&self, segment: &str, min_run: usize, keyword_only: bool) -> String {
        let mut words: Vec<String> = Vec::new();
        let mut run: Vec<&str> = Vec::new();

        for token in segment.split_whitespace() {
            if is_single_arabic_letter(token) {
                run.push(token);
            } else {
                self.flush_run(&mut run, &mut words, min_run, keyword_only);
                words.push(token.to_string());
            }
        }
        self.flush_run(&mut run, &mut words, min_run, keyword_only);

        words.join(" ")
    }

    fn flush_run(
        &self,
        run: &mut Vec<&str>,
        words: &mut Vec<String>,
        min_run: usize,
        keyword_only: bool,
    ) {
        let joined = run.concat();
        let spells_keyword = self
            .patterns
            .keywords()
            .iter()
            .any(|k| joined.starts_with(k.as_str()));
        if run.len() >= min_run && (!keyword_only || spells_keyword) {
            words.push(self.split_leading_keyword(&joined));
        } else {
            words.extend(run.iter().map(|t| (*t).to_string()));
        }
        run.clear();
    }

    fn split_leading_keyword(&self, word: &str) -> String {
        let mut keywords: Vec<&String> = self.patterns.keywords().iter().collect();
        keywords.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));
        for keyword in keywords {
            if let Some(rest) = word.strip_prefix(keyword.as_str()) {
                if !rest.is_empty() {
                    return format!("{keyword} {rest}");
                }
            }
        }
        word.to_string()
    }

    /// Reorder a line stored in visual order back to logical order.
    ///
    /// Short words read as other words when mirrored ("لك" / "كل"), so the
    /// reordered candidate is kept only on clear evidence: a structural
    /// keyword the input lacks, or a gain of `MIN_ORDER_GAIN`.
    fn restore_logical_order(&self, text: &str) -> String {
        if !text.chars().any(is_arabic) {
            return text.to_string();
        }
        let base = arabic_majority(text).then(Level::rtl);
        let candidate = reorder(text, base);
        if candidate.chars().count() != text.chars().count() {
            tracing::debug!(line = %text, "bidi reordering changed length, keeping input");
            return text.to_string();
        }

        let current = self.order_evidence(text);
        let reordered = self.order_evidence(&candidate);
        let gains_keyword = self.has_keyword(&candidate) && !self.has_keyword(text);
        if reordered >= current + MIN_ORDER_GAIN || (gains_keyword && reordered > current) {
            tracing::debug!(current, reordered, "line restored from visual order");
            candidate
        } else {
            text.to_string()
        }
    }

    /// Lexicon hits plus words carrying the definite article.
    fn order_evidence(&self, text: &str) -> usize {
        let definite = words(text)
            .filter(|w| w.starts_with(DEFINITE_ARTICLE) && w.chars().count() >= 4)
            .count();
        self.patterns.direction_score(text) + definite
    }

    fn has_keyword(&self, text: &str) -> bool {
        let keywords = self.patterns.keywords();
        words(text).any(|w| keywords.iter().any(|k| k == w))
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
}

/// Run the bidi reordering on every paragraph of a single line.
fn reorder(text: &str, base: Option<Level>) -> String {
    let info = BidiInfo::new(text, base);
    let mut out = String::with_capacity(text.len());
    for paragraph in &info.paragraphs {
        let line = paragraph.range.clone();
        let reordered: Cow<'_, str> = info.reorder_line(paragraph, line);
        out.push_str(&reordered);
    }
    out
}

fn strip_controls(text: &str) -> Cow<'_, str> {
    if text.contains(BIDI_CONTROLS) {
        Cow::Owned(text.chars().filter(|c| !BIDI_CONTROLS.contains(c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn average_token_len(tokens: &[&str]) -> f64 {
    if tokens.is_empty() {
        return 0.0;
    }
    let total: usize = tokens.iter().map(|t| t.chars().count()).sum();
    total as f64 / tokens.len() as f64
}

fn is_single_arabic_letter(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_arabic_letter(c))
}

/// Share of Arabic letters among all letters of the line.
fn arabic_ratio(text: &str) -> f64 {
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    if letters == 0 {
        return 0.0;
    }
    let arabic = text.chars().filter(|c| is_arabic_letter(*c)).count();
    arabic as f64 / letters as f64
}

fn arabic_majority(text: &str) -> bool {
    arabic_ratio(text) > 0.5
}

fn is_ltr_strong(c: char) -> bool {
    c.is_ascii_digit() || (c.is_alphabetic() && !is_arabic(c))
}

fn is_ltr_joiner(c: char) -> bool {
    matches!(c, '.' | ',' | '/' | ':' | '-')
}
