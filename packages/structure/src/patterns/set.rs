//! Compiled, immutable pattern set injected into the pipeline components.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::Regex;

use super::numbers::normalize_numeral;
use super::ordinals::strip_hamza;
use super::profile::{DefaultLabels, MarkerSpec, PatternProfile, PatternSpec};
use crate::config::{ABBREVIATED_WEIGHT, CANONICAL_WEIGHT, NUMERIC_WEIGHT, ORDINAL_WORD_WEIGHT};
use crate::error::{Result, StructureError};
use crate::normalize::GlyphTable;
use crate::types::ElementType;

/// One compiled pattern with the outcome it produces.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub id: String,
    pub element_type: ElementType,
    pub weight: f64,
    regex: Regex,
}

/// A successful match of a pattern against a line.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch<'t> {
    pub pattern_id: &'t str,
    pub element_type: ElementType,
    pub weight: f64,
    /// Normalized number, if the marker carried one the set can read.
    pub number: Option<String>,
    /// Raw numeral or ordinal text as it appeared.
    pub raw_number: Option<&'t str>,
    /// Line text after the marker.
    pub remainder: &'t str,
}

impl CompiledPattern {
    fn compile(id: impl Into<String>, element_type: ElementType, weight: f64, pattern: &str) -> Result<Self> {
        let id = id.into();
        let regex = Regex::new(pattern).map_err(|source| StructureError::InvalidPattern {
            id: id.clone(),
            source,
        })?;
        Ok(Self {
            id,
            element_type,
            weight,
            regex,
        })
    }

    fn from_spec(spec: &PatternSpec, element_type: ElementType) -> Result<Self> {
        Self::compile(spec.id.clone(), element_type, spec.weight, &spec.pattern)
    }

    /// Whether the pattern matches the text at all.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Match the pattern and extract number and remainder.
    pub fn apply<'t>(&'t self, text: &'t str, set: &LanguagePatternSet) -> Option<PatternMatch<'t>> {
        let caps = self.regex.captures(text)?;
        let whole = caps.get(0)?;
        let marker_end = caps.name("marker").map_or(whole.end(), |m| m.end());

        let (raw_number, number) = if let Some(num) = caps.name("num") {
            (Some(num.as_str()), normalize_numeral(num.as_str()))
        } else if let Some(ord) = caps.name("ord") {
            (
                Some(ord.as_str()),
                set.ordinal_value(ord.as_str()).map(|v| v.to_string()),
            )
        } else if let Some(letter) = caps.name("letter") {
            (Some(letter.as_str()), Some(letter.as_str().to_string()))
        } else {
            (None, None)
        };

        Some(PatternMatch {
            pattern_id: &self.id,
            element_type: self.element_type,
            weight: self.weight,
            number,
            raw_number,
            remainder: &text[marker_end..],
        })
    }
}

/// Patterns for one element type, in priority order.
#[derive(Debug, Clone)]
pub struct PatternGroup {
    pub element_type: ElementType,
    pub patterns: Vec<CompiledPattern>,
}

/// Immutable language data shared by the normalizer, classifier and TOC detector.
#[derive(Debug, Clone)]
pub struct LanguagePatternSet {
    name: String,
    groups: Vec<PatternGroup>,
    noise: Vec<CompiledPattern>,
    ordinals: HashMap<String, u32>,
    toc_markers: HashSet<String>,
    letters: Vec<String>,
    keywords: Vec<String>,
    lexicon: HashSet<String>,
    labels: DefaultLabels,
    glyphs: GlyphTable,
}

impl LanguagePatternSet {
    /// The built-in Arabic pattern set.
    pub fn arabic() -> Result<Self> {
        Self::from_profile(&PatternProfile::arabic())
    }

    /// Load and compile a profile from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        Self::from_profile(&PatternProfile::from_yaml_file(path)?)
    }

    /// Compile a profile.
    pub fn from_profile(profile: &PatternProfile) -> Result<Self> {
        profile.validate()?;

        let ordinal_alternation = alternation(profile.ordinals.iter().map(|o| o.word.as_str()));
        let prefixes = alternation(profile.number_prefixes.iter().map(String::as_str));

        let mut groups = Vec::new();
        for (element_type, spec) in [
            (ElementType::Branch, &profile.branch),
            (ElementType::Chapter, &profile.chapter),
            (ElementType::Article, &profile.article),
        ] {
            groups.push(PatternGroup {
                element_type,
                patterns: heading_patterns(element_type, spec, &ordinal_alternation, &prefixes)?,
            });
        }

        groups.push(PatternGroup {
            element_type: ElementType::SubArticle,
            patterns: profile
                .sub_article
                .iter()
                .map(|spec| CompiledPattern::from_spec(spec, ElementType::SubArticle))
                .collect::<Result<_>>()?,
        });

        let noise: Vec<CompiledPattern> = profile
            .noise
            .iter()
            .map(|spec| CompiledPattern::from_spec(spec, ElementType::Ignore))
            .collect::<Result<_>>()?;

        let mut ordinals = HashMap::new();
        for entry in &profile.ordinals {
            ordinals.insert(collapse_whitespace(&entry.word), entry.value);
            ordinals.insert(collapse_whitespace(&strip_hamza(&entry.word)), entry.value);
        }

        let keywords = profile
            .branch
            .keywords
            .iter()
            .chain(&profile.chapter.keywords)
            .chain(&profile.article.keywords)
            .cloned()
            .collect();

        Ok(Self {
            name: profile.name.clone(),
            groups,
            noise,
            ordinals,
            toc_markers: profile.toc_markers.iter().map(|m| marker_key(m)).collect(),
            letters: profile.sub_article_letters.clone(),
            keywords,
            lexicon: profile.direction_lexicon.iter().cloned().collect(),
            labels: profile.labels.clone(),
            glyphs: GlyphTable::arabic(),
        })
    }

    /// Profile name, recorded in extraction logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pattern groups in classification priority order
    /// (Branch, Chapter, Article, SubArticle).
    #[must_use]
    pub fn groups(&self) -> &[PatternGroup] {
        &self.groups
    }

    /// Patterns for page furniture.
    #[must_use]
    pub fn noise(&self) -> &[CompiledPattern] {
        &self.noise
    }

    /// Value of a spelled-out ordinal, tolerant of spacing and hamza spelling.
    #[must_use]
    pub fn ordinal_value(&self, word: &str) -> Option<u32> {
        let key = collapse_whitespace(word);
        self.ordinals
            .get(&key)
            .or_else(|| self.ordinals.get(&strip_hamza(&key)))
            .copied()
    }

    /// 1-based position of a sub-article letter in the numbering sequence.
    #[must_use]
    pub fn letter_position(&self, letter: &str) -> Option<usize> {
        let letter = strip_hamza(letter.trim());
        self.letters
            .iter()
            .position(|l| strip_hamza(l) == letter)
            .map(|p| p + 1)
    }

    /// Whether the whole line is a table-of-contents marker.
    #[must_use]
    pub fn is_toc_marker(&self, line: &str) -> bool {
        self.toc_markers.contains(&marker_key(line))
    }

    /// Structural keywords of all heading levels.
    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Count tokens that are structural keywords or frequent words.
    ///
    /// Reversed text scores near zero, logical text scores high.
    #[must_use]
    pub fn direction_score(&self, text: &str) -> usize {
        text.split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|t| self.lexicon.contains(*t) || self.keywords.iter().any(|k| k == t))
            .count()
    }

    #[must_use]
    pub fn labels(&self) -> &DefaultLabels {
        &self.labels
    }

    #[must_use]
    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }
}

fn heading_patterns(
    element_type: ElementType,
    spec: &MarkerSpec,
    ordinals: &str,
    prefixes: &str,
) -> Result<Vec<CompiledPattern>> {
    let level = element_type.as_str();
    let keywords = alternation(spec.keywords.iter().map(String::as_str));
    let prefix = if prefixes.is_empty() {
        String::new()
    } else {
        format!(r"(?:(?:{prefixes})\s*)?")
    };
    let numeral = r"[(\[]?\s*(?P<num>[0-9٠-٩۰-۹]+|[IVXLCDM]+)\s*[)\]]?";
    let end = r"(?:[\s:.\-–—،]|$)";

    let mut patterns = vec![
        CompiledPattern::compile(
            format!("{level}.canonical"),
            element_type,
            CANONICAL_WEIGHT,
            // A following "و…" word means a compound the table lacks.
            &format!(r"^(?P<marker>(?:{keywords})\s+(?P<ord>{ordinals}))(?:\s*$|\s+[^\sو]|[^\w\s])"),
        )?,
        CompiledPattern::compile(
            format!("{level}.numeric"),
            element_type,
            NUMERIC_WEIGHT,
            &format!(r"^(?P<marker>(?:{keywords})\s*{prefix}{numeral}){end}"),
        )?,
        // Any definite word (plus one "و" word) standing alone after the
        // keyword. The number stays empty unless the table knows the word.
        CompiledPattern::compile(
            format!("{level}.ordinal_word"),
            element_type,
            ORDINAL_WORD_WEIGHT,
            &format!(r"^(?P<marker>(?:{keywords})\s+(?P<ord>ال\w+(?:\s+و\w+)?))\s*(?:[:\-–—.،]|$)"),
        )?,
    ];

    if !spec.abbreviations.is_empty() {
        let abbreviations = alternation(spec.abbreviations.iter().map(String::as_str));
        patterns.push(CompiledPattern::compile(
            format!("{level}.abbreviated"),
            element_type,
            ABBREVIATED_WEIGHT,
            &format!(r"^(?P<marker>(?:{abbreviations})\s*[./]?\s*[(\[]?\s*(?P<num>[0-9٠-٩۰-۹]+)\s*[)\]]?){end}"),
        )?);
    }

    Ok(patterns)
}

/// Escaped regex alternation, longest first so leftmost-first matching
/// prefers "الحادي عشر" over "الحادي".
fn alternation<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let mut words: Vec<&str> = words.filter(|w| !w.trim().is_empty()).collect();
    words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    words.dedup();
    words
        .iter()
        .map(|w| regex::escape(w.trim()).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn marker_key(text: &str) -> String {
    collapse_whitespace(text.trim().trim_end_matches([':', '：', '.']))
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> LanguagePatternSet {
        LanguagePatternSet::arabic().unwrap()
    }

    fn first_match<'t>(set: &'t LanguagePatternSet, text: &'t str) -> Option<PatternMatch<'t>> {
        set.groups()
            .iter()
            .flat_map(|g| g.patterns.iter())
            .find_map(|p| p.apply(text, set))
    }

    #[test]
    fn test_group_order() {
        assert_eq!(set().name(), "arabic");
        let types: Vec<_> = set().groups().iter().map(|g| g.element_type).collect();
        assert_eq!(
            types,
            vec![
                ElementType::Branch,
                ElementType::Chapter,
                ElementType::Article,
                ElementType::SubArticle
            ]
        );
    }

    #[test]
    fn test_canonical_branch_match() {
        let set = set();
        let m = first_match(&set, "الباب الأول: أحكام عامة").unwrap();
        assert_eq!(m.pattern_id, "branch.canonical");
        assert_eq!(m.number.as_deref(), Some("1"));
        assert_eq!(m.remainder, ": أحكام عامة");
    }

    #[test]
    fn test_compound_ordinal_prefers_longest() {
        let set = set();
        let m = first_match(&set, "المادة الحادية عشرة").unwrap();
        assert_eq!(m.number.as_deref(), Some("11"));
        assert_eq!(m.remainder, "");
    }

    #[test]
    fn test_numeric_article_match() {
        let set = set();
        let m = first_match(&set, "المادة (١٢) تعريفات").unwrap();
        assert_eq!(m.pattern_id, "article.numeric");
        assert_eq!(m.number.as_deref(), Some("12"));
        assert_eq!(m.remainder.trim(), "تعريفات");

        let m = first_match(&set, "مادة رقم 7").unwrap();
        assert_eq!(m.number.as_deref(), Some("7"));
    }

    #[test]
    fn test_roman_chapter_match() {
        let set = set();
        let m = first_match(&set, "الفصل IV").unwrap();
        assert_eq!(m.element_type, ElementType::Chapter);
        assert_eq!(m.number.as_deref(), Some("4"));
    }

    #[test]
    fn test_abbreviated_article_match() {
        let set = set();
        let m = first_match(&set, "م. 15 - يعمل بهذا القانون").unwrap();
        assert_eq!(m.pattern_id, "article.abbreviated");
        assert_eq!(m.number.as_deref(), Some("15"));
    }

    #[test]
    fn test_ordinal_word_outside_table() {
        let set = set();
        let m = first_match(&set, "المادة الحادية والثلاثون").unwrap();
        assert_eq!(m.pattern_id, "article.ordinal_word");
        assert_eq!(m.element_type, ElementType::Article);
        assert_eq!(m.raw_number, Some("الحادية والثلاثون"));
        assert_eq!(m.number, None);

        let m = first_match(&set, "الباب التمهيدي: أحكام عامة").unwrap();
        assert_eq!(m.element_type, ElementType::Branch);
        assert_eq!(m.remainder, ": أحكام عامة");

        // The unit alone must not be read as the number.
        let m = first_match(&set, "المادة الثانية والثلاثون").unwrap();
        assert_eq!(m.pattern_id, "article.ordinal_word");
        assert_eq!(m.number, None);

        // A definite word followed by more text is a sentence, not a heading.
        assert!(first_match(&set, "المادة السابقة تنص على ذلك").is_none());
    }

    #[test]
    fn test_keyword_inside_sentence_does_not_match() {
        let set = set();
        assert!(first_match(&set, "يجب أن تكون المادة متاحة").is_none());
        assert!(first_match(&set, "الباب مفتوح للجميع").is_none());
    }

    #[test]
    fn test_ordinal_value_tolerates_spelling() {
        let set = set();
        assert_eq!(set.ordinal_value("الاول"), Some(1));
        assert_eq!(set.ordinal_value("الثاني   عشر"), Some(12));
        assert_eq!(set.ordinal_value("المئة"), None);
    }

    #[test]
    fn test_letter_position() {
        let set = set();
        assert_eq!(set.letter_position("أ"), Some(1));
        assert_eq!(set.letter_position("ا"), Some(1));
        assert_eq!(set.letter_position("د"), Some(4));
        assert_eq!(set.letter_position("x"), None);
    }

    #[test]
    fn test_toc_marker() {
        let set = set();
        assert!(set.is_toc_marker("الفهرس"));
        assert!(set.is_toc_marker("  جدول   المحتويات: "));
        assert!(set.is_toc_marker("TABLE OF CONTENTS"));
        assert!(!set.is_toc_marker("الفهرس العام للقوانين"));
    }

    #[test]
    fn test_direction_score() {
        let set = set();
        assert!(set.direction_score("تسري أحكام هذا القانون على جميع العاملين") >= 2);
        assert_eq!(set.direction_score("نيلماعلا عيمج ىلع"), 0);
    }

    #[test]
    fn test_invalid_pattern_reports_id() {
        let mut profile = PatternProfile::arabic();
        profile.noise.push(PatternSpec::new("noise.broken", "([", 0.9));
        let err = LanguagePatternSet::from_profile(&profile).unwrap_err();
        assert!(matches!(err, StructureError::InvalidPattern { ref id, .. } if id == "noise.broken"));
    }
}
