//! Per-line structural classification.
//!
//! Classification is a short-circuit scan over the pattern set: noise
//! first, then the Branch, Chapter, Article and SubArticle groups in that
//! order. The first pattern that matches decides the element type and the
//! confidence (the pattern's weight). Anything left over is Content.

use std::sync::Arc;

use crate::config::{BLANK_CONFIDENCE, CONTENT_CONFIDENCE};
use crate::normalize::{is_arabic_mark, BIDI_CONTROLS, TATWEEL};
use crate::patterns::LanguagePatternSet;
use crate::types::{ClassifiedLine, ElementType, LogicalLine};

/// Characters trimmed from the start of a heading title.
const TITLE_LEAD: &[char] = &[':', '-', '–', '—', '.', '،', '(', ')', '[', ']', '…', '_'];

/// Classifies logical lines into element types.
#[derive(Debug, Clone)]
pub struct PatternClassifier {
    patterns: Arc<LanguagePatternSet>,
}

impl PatternClassifier {
    #[must_use]
    pub fn new(patterns: Arc<LanguagePatternSet>) -> Self {
        Self { patterns }
    }

    /// The pattern set this classifier scans.
    #[must_use]
    pub fn patterns(&self) -> &LanguagePatternSet {
        &self.patterns
    }

    /// Classify one line. Never fails: unmatched text is Content.
    #[must_use]
    pub fn classify(&self, line: &LogicalLine) -> ClassifiedLine {
        let text = matchable_text(&line.normalized_text);

        let classified = if text.is_empty() {
            ClassifiedLine::new(line.clone(), ElementType::Ignore, BLANK_CONFIDENCE)
        } else if let Some(noise) = self.patterns.noise().iter().find(|p| p.is_match(&text)) {
            ClassifiedLine::new(line.clone(), ElementType::Ignore, noise.weight)
                .with_pattern(noise.id.as_str())
        } else {
            self.match_groups(line, &text).unwrap_or_else(|| {
                ClassifiedLine::new(line.clone(), ElementType::Content, CONTENT_CONFIDENCE)
            })
        };

        tracing::trace!(
            line = line.index,
            element_type = %classified.element_type,
            confidence = classified.confidence,
            pattern = classified.matched_pattern_id.as_deref().unwrap_or("-"),
            "classified line"
        );
        classified
    }

    /// Element type only, for callers that do not need the extracted fields.
    #[must_use]
    pub fn element_type(&self, text: &str) -> ElementType {
        self.classify(&LogicalLine::from_text(0, text)).element_type
    }

    fn match_groups(&self, line: &LogicalLine, text: &str) -> Option<ClassifiedLine> {
        let set = self.patterns.as_ref();
        for group in set.groups() {
            for pattern in &group.patterns {
                let Some(found) = pattern.apply(text, set) else {
                    continue;
                };

                if found.number.is_none() {
                    if let Some(raw) = found.raw_number {
                        tracing::debug!(
                            line = line.index,
                            raw = %raw,
                            "numeral could not be normalized, leaving number empty"
                        );
                    }
                }

                let title = clean_title(found.remainder);
                return Some(
                    ClassifiedLine::new(line.clone(), found.element_type, found.weight)
                        .with_number(found.number)
                        .with_title(Some(title))
                        .with_pattern(found.pattern_id),
                );
            }
        }
        None
    }
}

/// Strip what never takes part in matching: direction controls, tatweel
/// and diacritics. Whitespace is collapsed.
fn matchable_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| !BIDI_CONTROLS.contains(c) && *c != TATWEEL && !is_arabic_mark(*c))
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Heading title: the marker remainder without separators or brackets.
fn clean_title(remainder: &str) -> String {
    remainder
        .trim_start_matches(|c: char| c.is_whitespace() || TITLE_LEAD.contains(&c))
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::TextDirectionNormalizer;
    use pretty_assertions::assert_eq;

    fn classifier() -> PatternClassifier {
        PatternClassifier::new(Arc::new(LanguagePatternSet::arabic().unwrap()))
    }

    fn classify(text: &str) -> ClassifiedLine {
        classifier().classify(&LogicalLine::from_text(1, text))
    }

    #[test]
    fn test_blank_line_is_ignored_with_full_confidence() {
        let c = classify("   ");
        assert_eq!(c.element_type, ElementType::Ignore);
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.matched_pattern_id, None);
    }

    #[test]
    fn test_canonical_headings() {
        let c = classify("الباب الأول: أحكام عامة");
        assert_eq!(c.element_type, ElementType::Branch);
        assert_eq!(c.confidence, 0.95);
        assert_eq!(c.extracted_number.as_deref(), Some("1"));
        assert_eq!(c.extracted_title.as_deref(), Some("أحكام عامة"));

        let c = classify("الفصل الثالث - التعريفات");
        assert_eq!(c.element_type, ElementType::Chapter);
        assert_eq!(c.extracted_number.as_deref(), Some("3"));
        assert_eq!(c.extracted_title.as_deref(), Some("التعريفات"));

        let c = classify("المادة الخامسة والعشرون");
        assert_eq!(c.element_type, ElementType::Article);
        assert_eq!(c.extracted_number.as_deref(), Some("25"));
        assert_eq!(c.extracted_title.as_deref(), Some(""));
    }

    #[test]
    fn test_numeric_fallback_has_lower_confidence() {
        let c = classify("مادة (٧)");
        assert_eq!(c.element_type, ElementType::Article);
        assert_eq!(c.confidence, 0.85);
        assert_eq!(c.extracted_number.as_deref(), Some("7"));
        assert_eq!(c.matched_pattern_id.as_deref(), Some("article.numeric"));
    }

    #[test]
    fn test_diacritics_and_tatweel_do_not_block_matching() {
        let c = classify("المـــادةُ الأولى");
        assert_eq!(c.element_type, ElementType::Article);
        assert_eq!(c.extracted_number.as_deref(), Some("1"));
    }

    #[test]
    fn test_sub_articles() {
        let c = classify("5- يجب على الموظف الالتزام بمواعيد العمل");
        assert_eq!(c.element_type, ElementType::SubArticle);
        assert_eq!(c.confidence, 0.80);
        assert_eq!(c.extracted_number.as_deref(), Some("5"));
        assert_eq!(
            c.extracted_title.as_deref(),
            Some("يجب على الموظف الالتزام بمواعيد العمل")
        );

        let c = classify("(ب) الإجازات السنوية");
        assert_eq!(c.element_type, ElementType::SubArticle);
        assert_eq!(c.extracted_number.as_deref(), Some("ب"));
    }

    #[test]
    fn test_page_noise_is_ignored() {
        for text in ["- 12 -", "١٥", "صفحة 3 من 40", "__________"] {
            let c = classify(text);
            assert_eq!(c.element_type, ElementType::Ignore, "{text}");
            assert_eq!(c.confidence, 0.90, "{text}");
        }
    }

    #[test]
    fn test_body_text_falls_back_to_content() {
        let c = classify("يعمل بهذا القانون من تاريخ نشره في الجريدة الرسمية.");
        assert_eq!(c.element_type, ElementType::Content);
        assert_eq!(c.confidence, 0.70);
        assert_eq!(c.extracted_number, None);
    }

    #[test]
    fn test_unmapped_ordinal_keeps_heading_type() {
        for (text, element_type) in [
            ("المادة الحادية والثلاثون", ElementType::Article),
            ("المادة الأخيرة", ElementType::Article),
            ("الباب التمهيدي", ElementType::Branch),
            ("المادة المئة", ElementType::Article),
        ] {
            let c = classify(text);
            assert_eq!(c.element_type, element_type, "{text}");
            assert_eq!(c.extracted_number, None, "{text}");
            assert_eq!(c.confidence, 0.80, "{text}");
        }
    }

    #[test]
    fn test_isolated_glyphs_classify_like_logical_text() {
        let patterns = Arc::new(LanguagePatternSet::arabic().unwrap());
        let normalizer = TextDirectionNormalizer::new(patterns.clone(), 0.0);
        let classifier = PatternClassifier::new(patterns);

        let lines = normalizer.normalize_lines("ﺍﻟﺒﺎﺏ ﺍﻷﻭﻝ\nالباب الأول");
        let glyphs = classifier.classify(&lines[0]);
        let logical = classifier.classify(&lines[1]);

        assert_eq!(glyphs.element_type, ElementType::Branch);
        assert_eq!(glyphs.element_type, logical.element_type);
        assert_eq!(glyphs.extracted_number.as_deref(), Some("1"));
        assert_eq!(glyphs.extracted_number, logical.extracted_number);
    }

    #[test]
    fn test_element_type_shortcut() {
        let classifier = classifier();
        assert_eq!(classifier.element_type("الفصل الثاني"), ElementType::Chapter);
        assert_eq!(classifier.element_type("نص عادي"), ElementType::Content);
    }
}
