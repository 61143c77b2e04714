//! Declarative language profile behind a `LanguagePatternSet`.
//!
//! A profile is plain data (serde), so alternate profiles and test
//! fixtures can be loaded from YAML instead of editing code.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ordinals::arabic_ordinals;
use crate::config::{NOISE_CONFIDENCE, SUB_ARTICLE_WEIGHT};
use crate::error::{Result, StructureError};

/// Keywords introducing one heading level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    /// Full keywords ("الباب", "باب").
    pub keywords: Vec<String>,
    /// Abbreviated keywords that must be followed by a numeral ("م").
    #[serde(default)]
    pub abbreviations: Vec<String>,
}

impl MarkerSpec {
    #[must_use]
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            abbreviations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_abbreviations(mut self, abbreviations: &[&str]) -> Self {
        self.abbreviations = abbreviations.iter().map(|k| (*k).to_string()).collect();
        self
    }
}

/// A raw regex with its identifier and confidence weight.
///
/// Named groups: `num` (numeral), `letter` (sub-article letter) and
/// `marker` (the span to strip; defaults to the whole match).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub id: String,
    pub pattern: String,
    pub weight: f64,
}

impl PatternSpec {
    #[must_use]
    pub fn new(id: &str, pattern: &str, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            pattern: pattern.to_string(),
            weight,
        }
    }
}

/// One spelled-out ordinal and its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalEntry {
    pub word: String,
    pub value: u32,
}

impl OrdinalEntry {
    #[must_use]
    pub fn new(word: impl Into<String>, value: u32) -> Self {
        Self {
            word: word.into(),
            value,
        }
    }
}

/// Labels synthesized for nodes without a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultLabels {
    pub branch: String,
    pub chapter: String,
    pub article: String,
    pub sub_article: String,
    pub implicit_branch: String,
    pub document: String,
}

/// Complete data for one language/numbering scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternProfile {
    pub name: String,
    pub branch: MarkerSpec,
    pub chapter: MarkerSpec,
    pub article: MarkerSpec,
    /// Sub-article patterns in priority order.
    pub sub_article: Vec<PatternSpec>,
    /// Page furniture classified as Ignore.
    #[serde(default)]
    pub noise: Vec<PatternSpec>,
    /// Words allowed between a keyword and its numeral ("رقم").
    #[serde(default)]
    pub number_prefixes: Vec<String>,
    pub ordinals: Vec<OrdinalEntry>,
    /// Whole-line markers opening a table of contents.
    pub toc_markers: Vec<String>,
    /// Sub-article letters in numbering order.
    #[serde(default)]
    pub sub_article_letters: Vec<String>,
    /// Frequent words used to tell logical from reversed line order.
    #[serde(default)]
    pub direction_lexicon: Vec<String>,
    pub labels: DefaultLabels,
}

impl PatternProfile {
    /// Load a profile from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let profile: Self = serde_yaml_ng::from_str(&raw)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check the profile has what the classifier needs.
    pub fn validate(&self) -> Result<()> {
        for (level, spec) in [
            ("branch", &self.branch),
            ("chapter", &self.chapter),
            ("article", &self.article),
        ] {
            if spec.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(StructureError::InvalidProfile(format!(
                    "{}: no {level} keywords",
                    self.name
                )));
            }
        }
        for spec in self.sub_article.iter().chain(self.noise.iter()) {
            if !(0.0..=1.0).contains(&spec.weight) {
                return Err(StructureError::InvalidProfile(format!(
                    "{}: weight of '{}' must be within [0, 1]",
                    self.name, spec.id
                )));
            }
        }
        if self.ordinals.is_empty() {
            return Err(StructureError::InvalidProfile(format!(
                "{}: ordinal table is empty",
                self.name
            )));
        }
        Ok(())
    }

    /// The built-in profile for Arabic statutes.
    #[must_use]
    pub fn arabic() -> Self {
        const DIGITS: &str = "[0-9٠-٩۰-۹]";
        let numbered = format!(r"^(?P<marker>(?P<num>{DIGITS}{{1,3}})\s*[-–—).]\s*)[^0-9٠-٩۰-۹\s]");
        let parenthesized = format!(r"^(?P<marker>[(\[]\s*(?P<num>{DIGITS}{{1,3}})\s*[)\]]\s*)\S");
        let page_number = format!(r"^[-–—\s]*{DIGITS}{{1,4}}[-–—\s]*$");
        let page_label = format!(
            r"^(?:الصفحة|صفحة|ص)\s*[.:]?\s*{DIGITS}{{1,4}}(?:\s*(?:من|/)\s*{DIGITS}{{1,4}})?$"
        );

        Self {
            name: "arabic".to_string(),
            branch: MarkerSpec::new(&["الباب", "باب"]),
            chapter: MarkerSpec::new(&["الفصل", "فصل"]),
            article: MarkerSpec::new(&["المادة", "مادة"]).with_abbreviations(&["م"]),
            sub_article: vec![
                PatternSpec::new("sub_article.numbered", &numbered, SUB_ARTICLE_WEIGHT),
                PatternSpec::new("sub_article.parenthesized", &parenthesized, SUB_ARTICLE_WEIGHT),
                PatternSpec::new(
                    "sub_article.lettered",
                    r"^(?P<marker>(?P<letter>[أبجدهوزحطيكلمنسعفصقرشتثخذضظغ])\s*[-–—)]\s*)\S",
                    SUB_ARTICLE_WEIGHT,
                ),
                PatternSpec::new(
                    "sub_article.parenthesized_letter",
                    r"^(?P<marker>[(\[]\s*(?P<letter>[أبجدهوزحطيكلمنسعفصقرشتثخذضظغ])\s*[)\]]\s*)\S",
                    SUB_ARTICLE_WEIGHT,
                ),
            ],
            noise: vec![
                PatternSpec::new("noise.page_number", &page_number, NOISE_CONFIDENCE),
                PatternSpec::new("noise.page_label", &page_label, NOISE_CONFIDENCE),
                PatternSpec::new("noise.rule", r"^[-–—_=*.·…\s]{3,}$", NOISE_CONFIDENCE),
            ],
            number_prefixes: vec!["رقم".to_string()],
            ordinals: arabic_ordinals(),
            toc_markers: [
                "الفهرس",
                "فهرس",
                "فهرس المحتويات",
                "جدول المحتويات",
                "المحتويات",
                "Table of Contents",
                "Contents",
            ]
            .iter()
            .map(|m| (*m).to_string())
            .collect(),
            sub_article_letters: "أ ب ج د ه و ز ح ط ي ك ل م ن س ع ف ص ق ر ش ت ث خ ذ ض ظ غ"
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            direction_lexicon: [
                "في", "من", "على", "إلى", "الى", "أن", "ان", "التي", "الذي", "هذا", "هذه", "عن",
                "أو", "او", "لا", "ما", "مع", "كل", "القانون", "المادة", "الباب", "الفصل",
            ]
            .iter()
            .map(|w| (*w).to_string())
            .collect(),
            labels: DefaultLabels {
                branch: "الباب".to_string(),
                chapter: "الفصل".to_string(),
                article: "المادة".to_string(),
                sub_article: "البند".to_string(),
                implicit_branch: "باب غير مسمى".to_string(),
                document: "وثيقة بدون عنوان".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arabic_profile_is_valid() {
        let profile = PatternProfile::arabic();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.sub_article_letters[0], "أ");
        assert_eq!(profile.sub_article_letters[4], "ه");
    }

    #[test]
    fn test_profile_without_keywords_is_rejected() {
        let mut profile = PatternProfile::arabic();
        profile.chapter.keywords.clear();
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().contains("chapter"));
    }

    #[test]
    fn test_profile_yaml_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.yaml");
        let yaml = serde_yaml_ng::to_string(&PatternProfile::arabic()).unwrap();
        std::fs::write(&path, yaml).unwrap();

        let loaded = PatternProfile::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, PatternProfile::arabic());
    }
}
