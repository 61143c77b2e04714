//! Configuration constants and validation for the extraction pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StructureError};

/// Default confidence below which nodes are flagged for manual review.
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.70;

/// Lines scanned after a run of bare page numbers when closing a TOC range.
pub const DEFAULT_TOC_LOOKAHEAD: usize = 3;

/// Confidence of the Content fallback classification.
pub const CONTENT_CONFIDENCE: f64 = 0.70;

/// Confidence of blank-line classification.
pub const BLANK_CONFIDENCE: f64 = 1.0;

/// Confidence of page-noise classification (bare page numbers, footers).
pub const NOISE_CONFIDENCE: f64 = 0.90;

/// Weight of canonical (spelled-out ordinal) heading patterns.
pub const CANONICAL_WEIGHT: f64 = 0.95;

/// Weight of numeric fallback heading patterns.
pub const NUMERIC_WEIGHT: f64 = 0.85;

/// Weight of headings whose ordinal word is outside the ordinal table
/// ("المادة الحادية والثلاثون", "الباب التمهيدي").
pub const ORDINAL_WORD_WEIGHT: f64 = 0.80;

/// Weight of abbreviated fallback patterns ("م 12").
pub const ABBREVIATED_WEIGHT: f64 = 0.80;

/// Weight of sub-article patterns.
pub const SUB_ARTICLE_WEIGHT: f64 = 0.80;

/// Confidence of a branch synthesized for a chapter without one.
pub const IMPLICIT_BRANCH_CONFIDENCE: f64 = 0.50;

/// Longest article marker remainder still treated as a title.
pub const DEFAULT_MAX_TITLE_CHARS: usize = 100;

/// Content shorter than this (in characters) is dropped without a warning.
pub const TRIVIAL_CONTENT_CHARS: usize = 3;

/// Penalty subtracted from the overall confidence per distinct error.
pub const ERROR_PENALTY: f64 = 0.1;

/// Text wrap width for article content in output files.
pub const TEXT_WRAP_WIDTH: usize = 100;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "QANUN_";

/// What to do with a Chapter line that appears before any Branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanChapterPolicy {
    /// Drop the chapter and record a warning.
    #[default]
    Drop,
    /// Open an unnamed branch to hold the chapter.
    ImplicitBranch,
}

impl OrphanChapterPolicy {
    /// Parse a policy name as used in YAML and environment variables.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "implicit_branch" | "implicit-branch" => Ok(Self::ImplicitBranch),
            other => Err(StructureError::InvalidConfig(format!(
                "unknown orphan chapter policy '{other}'. Expected 'drop' or 'implicit_branch'"
            ))),
        }
    }
}

/// Tunable settings for one pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Nodes below this confidence are listed for manual review.
    pub confidence_floor: f64,
    /// Lookahead after bare page numbers when closing a TOC range.
    pub toc_lookahead: usize,
    pub orphan_chapter_policy: OrphanChapterPolicy,
    /// Arabic share above which a line is normalized. `0.0` normalizes
    /// every line containing Arabic.
    pub arabic_ratio_threshold: f64,
    /// Longest article marker remainder still treated as a title.
    pub max_title_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            toc_lookahead: DEFAULT_TOC_LOOKAHEAD,
            orphan_chapter_policy: OrphanChapterPolicy::default(),
            arabic_ratio_threshold: 0.0,
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `QANUN_*` environment overrides on top of this configuration.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Keys: `CONFIDENCE_FLOOR`, `TOC_LOOKAHEAD`, `ORPHAN_CHAPTER_POLICY`,
    /// `ARABIC_RATIO_THRESHOLD`, `MAX_TITLE_CHARS`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup("CONFIDENCE_FLOOR") {
            self.confidence_floor = parse_value("CONFIDENCE_FLOOR", &v)?;
        }
        if let Some(v) = lookup("TOC_LOOKAHEAD") {
            self.toc_lookahead = parse_value("TOC_LOOKAHEAD", &v)?;
        }
        if let Some(v) = lookup("ORPHAN_CHAPTER_POLICY") {
            self.orphan_chapter_policy = OrphanChapterPolicy::parse(&v)?;
        }
        if let Some(v) = lookup("ARABIC_RATIO_THRESHOLD") {
            self.arabic_ratio_threshold = parse_value("ARABIC_RATIO_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("MAX_TITLE_CHARS") {
            self.max_title_chars = parse_value("MAX_TITLE_CHARS", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Set the orphan chapter policy.
    #[must_use]
    pub fn with_orphan_chapter_policy(mut self, policy: OrphanChapterPolicy) -> Self {
        self.orphan_chapter_policy = policy;
        self
    }

    /// Set the confidence floor.
    #[must_use]
    pub fn with_confidence_floor(mut self, floor: f64) -> Self {
        self.confidence_floor = floor;
        self
    }

    /// Check every value is within its allowed range.
    pub fn validate(&self) -> Result<()> {
        validate_confidence_floor(self.confidence_floor)?;
        validate_ratio(self.arabic_ratio_threshold)?;
        if self.max_title_chars == 0 {
            return Err(StructureError::InvalidConfig(
                "max_title_chars must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        StructureError::InvalidConfig(format!("{ENV_PREFIX}{key}: cannot parse '{value}'"))
    })
}

/// Validate a confidence floor.
///
/// # Examples
/// ```
/// use qanun_structure::config::validate_confidence_floor;
///
/// assert!(validate_confidence_floor(0.7).is_ok());
/// assert!(validate_confidence_floor(1.5).is_err());
/// ```
pub fn validate_confidence_floor(floor: f64) -> Result<()> {
    if (0.0..=1.0).contains(&floor) {
        Ok(())
    } else {
        Err(StructureError::InvalidConfig(format!(
            "confidence_floor must be within [0, 1], got {floor}"
        )))
    }
}

fn validate_ratio(ratio: f64) -> Result<()> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(StructureError::InvalidConfig(format!(
            "arabic_ratio_threshold must be within [0, 1], got {ratio}"
        )))
    }
}
