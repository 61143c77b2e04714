//! Table-of-contents detection.
//!
//! A statute's index repeats every heading of the body, usually with a
//! page number. Those lines must not become nodes, so the detector scans
//! the classified lines once and the pipeline forces every line inside
//! the detected ranges to Ignore.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::patterns::LanguagePatternSet;
use crate::types::{ClassifiedLine, ElementType, TocRange};

/// A page number after a dot or ellipsis leader ("أحكام عامة ..... 12").
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PAGE_LEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[.…_·]{2,}|…)\s*[0-9٠-٩۰-۹]{1,4}$").expect("valid regex")
});

/// A page number set apart by a tab or a wide gap.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PAGE_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\t|\s{2,})[0-9٠-٩۰-۹]{1,4}$").expect("valid regex")
});

/// A heading remainder that is nothing but a number.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PAGE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9٠-٩۰-۹]{1,4}$").expect("valid regex"));

/// A trailing number that cites a law, year or date rather than a page.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:لسنة|سنة|لعام|عام|رقم|بتاريخ)\s*[0-9٠-٩۰-۹]{1,4}$").expect("valid regex")
});

/// A line holding nothing but a page number.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static BARE_PAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s\-–—.(\[]*[0-9٠-٩۰-۹]{1,4}[\s\-–—.)\]]*$").expect("valid regex")
});

/// What a line can mean for TOC boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Blank,
    /// "الفهرس", "جدول المحتويات", ...
    Marker,
    /// A Branch/Chapter/Article heading carrying a page reference.
    Entry,
    /// A Branch/Chapter/Article heading without a page reference.
    Heading(ElementType),
    PageNumber,
    Text,
}

/// Finds table-of-contents ranges in a line sequence.
#[derive(Debug, Clone)]
pub struct TocDetector {
    patterns: Arc<LanguagePatternSet>,
    lookahead: usize,
}

impl TocDetector {
    #[must_use]
    pub fn new(patterns: Arc<LanguagePatternSet>, lookahead: usize) -> Self {
        Self { patterns, lookahead }
    }

    /// Detect disjoint TOC ranges, in source order, as 1-based line indices.
    ///
    /// Works on lines already classified, so nothing is classified twice.
    #[must_use]
    pub fn detect(&self, lines: &[ClassifiedLine]) -> Vec<TocRange> {
        let kinds = self.line_kinds(lines);
        let mut ranges = Vec::new();
        let mut pos = 0;

        while pos < kinds.len() {
            let end = match kinds[pos] {
                LineKind::Marker => self.find_end(&kinds, pos),
                // An unlabeled index needs two entries in a row and stops
                // at the first line that is not an entry.
                LineKind::Entry if next_signal(&kinds, pos) == Some(LineKind::Entry) => {
                    entry_run_end(&kinds, pos)
                }
                _ => {
                    pos += 1;
                    continue;
                }
            };
            let range = TocRange {
                start: lines[pos].line.index,
                end: lines[end].line.index,
            };
            tracing::debug!(start = range.start, end = range.end, "table of contents detected");
            ranges.push(range);
            pos = end + 1;
        }

        ranges
    }

    /// Last position (inclusive) of the range opened at `start`.
    fn find_end(&self, kinds: &[LineKind], start: usize) -> usize {
        let mut i = start + 1;
        while i < kinds.len() {
            match kinds[i] {
                // The body starts at a real heading.
                LineKind::Heading(_) => return i - 1,
                LineKind::PageNumber => {
                    let run_end = page_run_end(kinds, i);
                    let window = (run_end + 1)..kinds.len().min(run_end + 1 + self.lookahead);
                    if body_follows(&kinds[window]) {
                        return run_end;
                    }
                    i = run_end + 1;
                }
                _ => i += 1,
            }
        }
        kinds.len() - 1
    }

    fn line_kinds(&self, lines: &[ClassifiedLine]) -> Vec<LineKind> {
        let mut kinds: Vec<LineKind> = lines
            .iter()
            .map(|classified| {
                let text = classified.text().trim();
                if text.is_empty() {
                    return LineKind::Blank;
                }
                if self.patterns.is_toc_marker(text) {
                    return LineKind::Marker;
                }
                if BARE_PAGE.is_match(text) {
                    return LineKind::PageNumber;
                }
                match classified.element_type {
                    ElementType::Branch | ElementType::Chapter | ElementType::Article => {
                        let title = classified.extracted_title.as_deref().unwrap_or("");
                        if has_page_reference(title, text) {
                            LineKind::Entry
                        } else {
                            LineKind::Heading(classified.element_type)
                        }
                    }
                    _ => LineKind::Text,
                }
            })
            .collect();

        // Split layout: the page number sits alone on the next line.
        for pos in 0..kinds.len() {
            if matches!(kinds[pos], LineKind::Heading(_))
                && next_non_blank(&kinds, pos) == Some(LineKind::PageNumber)
                && previous_non_blank(&kinds, pos).is_some_and(|k| {
                    matches!(k, LineKind::Marker | LineKind::Entry | LineKind::PageNumber)
                })
            {
                kinds[pos] = LineKind::Entry;
            }
        }

        kinds
    }
}

/// Whether a body Branch/Chapter heading shows up in the window before
/// any further index entry.
fn body_follows(window: &[LineKind]) -> bool {
    for kind in window {
        match kind {
            LineKind::Heading(ElementType::Branch | ElementType::Chapter) => return true,
            LineKind::Entry | LineKind::Marker => return false,
            _ => {}
        }
    }
    false
}

/// Whether a heading ends in a page number rather than a citation.
fn has_page_reference(title: &str, text: &str) -> bool {
    let text = text.trim_end();
    if CITATION.is_match(text) {
        return false;
    }
    PAGE_ONLY.is_match(title.trim()) || PAGE_LEADER.is_match(text) || PAGE_GAP.is_match(text)
}

/// Last entry (or trailing page number) of an unlabeled index at `start`.
fn entry_run_end(kinds: &[LineKind], start: usize) -> usize {
    let mut end = start;
    for (offset, kind) in kinds[start + 1..].iter().enumerate() {
        match kind {
            LineKind::Entry | LineKind::PageNumber => end = start + 1 + offset,
            LineKind::Blank => {}
            _ => break,
        }
    }
    end
}

/// Kind of the next line that is neither blank nor a bare page number.
fn next_signal(kinds: &[LineKind], pos: usize) -> Option<LineKind> {
    kinds[pos + 1..]
        .iter()
        .copied()
        .find(|k| !matches!(k, LineKind::Blank | LineKind::PageNumber))
}

fn next_non_blank(kinds: &[LineKind], pos: usize) -> Option<LineKind> {
    kinds[pos + 1..]
        .iter()
        .copied()
        .find(|k| *k != LineKind::Blank)
}

fn previous_non_blank(kinds: &[LineKind], pos: usize) -> Option<LineKind> {
    kinds[..pos]
        .iter()
        .rev()
        .copied()
        .find(|k| *k != LineKind::Blank)
}

/// Last position of the run of page-number (and blank) lines starting at `pos`.
fn page_run_end(kinds: &[LineKind], pos: usize) -> usize {
    let mut end = pos;
    for (offset, kind) in kinds[pos..].iter().enumerate() {
        match kind {
            LineKind::PageNumber => end = pos + offset,
            LineKind::Blank => {}
            _ => break,
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::PatternClassifier;
    use crate::types::LogicalLine;
    use pretty_assertions::assert_eq;

    fn patterns() -> Arc<LanguagePatternSet> {
        Arc::new(LanguagePatternSet::arabic().unwrap())
    }

    fn detector() -> TocDetector {
        TocDetector::new(patterns(), 3)
    }

    fn lines(texts: &[&str]) -> Vec<ClassifiedLine> {
        let classifier = PatternClassifier::new(patterns());
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| classifier.classify(&LogicalLine::from_text(i + 1, *t)))
            .collect()
    }

    #[test]
    fn test_marker_opens_range_until_real_heading() {
        let doc = lines(&[
            "الفهرس",
            "الباب الأول: أحكام عامة ........ 3",
            "الباب الثاني: الحقوق .......... 7",
            "الباب الثالث: الواجبات ........ 12",
            "الباب الرابع: العقوبات ........ 18",
            "الباب الخامس: أحكام ختامية .... 25",
            "الباب الأول",
            "أحكام عامة",
            "المادة الأولى",
            "تسري أحكام هذا القانون.",
        ]);
        assert_eq!(detector().detect(&doc), vec![TocRange { start: 1, end: 6 }]);
    }

    #[test]
    fn test_unlabeled_index_needs_two_entries() {
        let doc = lines(&[
            "قانون العمل",
            "الفصل الأول 4",
            "الفصل الثاني 9",
            "الفصل الأول",
            "نص",
        ]);
        assert_eq!(detector().detect(&doc), vec![TocRange { start: 2, end: 3 }]);

        // A single article that happens to end in a number is body text.
        let doc = lines(&[
            "المادة 5 من القانون رقم 10",
            "نص المادة.",
            "المادة 6",
        ]);
        assert!(detector().detect(&doc).is_empty());
    }

    #[test]
    fn test_page_run_followed_by_branch_closes_range() {
        let doc = lines(&[
            "جدول المحتويات",
            "أحكام عامة",
            "الحقوق والواجبات",
            "- 2 -",
            "",
            "قانون الخدمة المدنية",
            "الباب الأول",
            "المادة 1",
        ]);
        assert_eq!(detector().detect(&doc), vec![TocRange { start: 1, end: 4 }]);
    }

    #[test]
    fn test_split_layout_entries() {
        let doc = lines(&[
            "Table of Contents",
            "الباب الأول أحكام عامة",
            "3",
            "الباب الثاني الحقوق",
            "8",
            "الباب الأول",
            "الفصل الأول",
        ]);
        let ranges = detector().detect(&doc);
        assert_eq!(ranges, vec![TocRange { start: 1, end: 5 }]);
    }

    #[test]
    fn test_range_runs_to_end_of_document() {
        let doc = lines(&["الفهرس", "المادة 1 ..... 2", "المادة 2 ..... 4"]);
        assert_eq!(detector().detect(&doc), vec![TocRange { start: 1, end: 3 }]);
    }

    #[test]
    fn test_document_without_index() {
        let doc = lines(&["الباب الأول", "المادة الأولى", "نص"]);
        assert!(detector().detect(&doc).is_empty());
    }

    #[test]
    fn test_articles_citing_years_are_not_an_index() {
        let doc = lines(&[
            "الباب الأول",
            "المادة 1 - يلغى القانون رقم 3 لسنة 1990",
            "المادة 2 - يلغى القرار رقم 7 لسنة 1995",
            "المادة 3",
            "يعمل بهذا القانون من تاريخ نشره.",
        ]);
        assert!(detector().detect(&doc).is_empty());
    }

    #[test]
    fn test_page_reference_evidence() {
        assert!(has_page_reference("أحكام عامة ..... 12", "الباب الأول: أحكام عامة ..... 12"));
        assert!(has_page_reference("أحكام عامة … 3", "الباب الأول أحكام عامة … 3"));
        assert!(has_page_reference("أحكام عامة 7", "الباب الأول أحكام عامة\t7"));
        assert!(has_page_reference("4", "الفصل الأول 4"));
        assert!(!has_page_reference("أحكام عامة 12", "الباب الأول أحكام عامة 12"));
        assert!(!has_page_reference("الصادر بالقانون رقم 15", "المادة 2 الصادر بالقانون رقم 15"));
    }

    #[test]
    fn test_unlabeled_index_stops_at_body_text() {
        let doc = lines(&[
            "الفصل الأول ..... 4",
            "الفصل الثاني ..... 9",
            "نص تمهيدي لا ينتمي إلى الفهرس",
            "المادة 1 - نص",
        ]);
        assert_eq!(detector().detect(&doc), vec![TocRange { start: 1, end: 2 }]);
    }
}
