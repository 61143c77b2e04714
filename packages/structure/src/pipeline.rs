//! End-to-end extraction: normalize → classify → detect TOC → build → validate.
//!
//! Each line is classified once; the TOC detector and the builder both
//! read those results.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::builder::HierarchyBuilder;
use crate::classify::PatternClassifier;
use crate::config::{PipelineConfig, BLANK_CONFIDENCE};
use crate::error::{Result, StructureError};
use crate::normalize::TextDirectionNormalizer;
use crate::patterns::LanguagePatternSet;
use crate::toc::TocDetector;
use crate::types::{
    ClassificationStats, ClassifiedLine, DocumentStructure, ElementType, ProcessingReport,
    TocRange,
};
use crate::validate::{StructureValidator, ValidationOutcome};

/// Pattern id recorded on lines forced to Ignore inside a TOC range.
pub const TOC_PATTERN_ID: &str = "toc";

/// Everything one extraction run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// True when the validator found no errors.
    pub success: bool,
    pub message: String,
    pub structure: DocumentStructure,
    pub stats: ClassificationStats,
    /// Builder and validator findings plus timing.
    pub report: ProcessingReport,
    pub validation: ValidationOutcome,
}

/// Composes the pipeline components around one shared pattern set.
///
/// Each `extract` call keeps all of its state local, so one orchestrator
/// can serve many documents, including from several threads.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    config: PipelineConfig,
    patterns: Arc<LanguagePatternSet>,
    normalizer: TextDirectionNormalizer,
    classifier: PatternClassifier,
    toc: TocDetector,
    validator: StructureValidator,
}

impl Orchestrator {
    /// Create an orchestrator after validating the configuration.
    pub fn new(config: PipelineConfig, patterns: LanguagePatternSet) -> Result<Self> {
        config.validate()?;
        let patterns = Arc::new(patterns);
        Ok(Self {
            normalizer: TextDirectionNormalizer::new(patterns.clone(), config.arabic_ratio_threshold),
            classifier: PatternClassifier::new(patterns.clone()),
            toc: TocDetector::new(patterns.clone(), config.toc_lookahead),
            validator: StructureValidator::new(patterns.clone())
                .with_confidence_floor(config.confidence_floor),
            patterns,
            config,
        })
    }

    /// Default configuration with the built-in Arabic patterns.
    pub fn arabic() -> Result<Self> {
        Self::new(PipelineConfig::default(), LanguagePatternSet::arabic()?)
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn normalizer(&self) -> &TextDirectionNormalizer {
        &self.normalizer
    }

    /// Extract the structure of one document.
    ///
    /// Fails only for blank input. Everything else is reported in the
    /// returned `Extraction`, including a tree with validation errors.
    pub fn extract(&self, text: &str, name_hint: Option<&str>) -> Result<Extraction> {
        if text.trim().is_empty() {
            return Err(StructureError::EmptyInput);
        }
        let started = Instant::now();

        let lines = self.normalizer.normalize_lines(text);
        let lines_processed = lines.len();
        let classified: Vec<ClassifiedLine> =
            lines.iter().map(|line| self.classifier.classify(line)).collect();
        let toc_ranges = self.toc.detect(&classified);
        let unlabeled: Vec<TocRange> = toc_ranges
            .iter()
            .copied()
            .filter(|range| {
                !lines
                    .get(range.start - 1)
                    .is_some_and(|line| self.patterns.is_toc_marker(line.normalized_text.trim()))
            })
            .collect();

        let mut stats = ClassificationStats {
            toc_ranges: toc_ranges.clone(),
            ..ClassificationStats::default()
        };
        let mut builder = HierarchyBuilder::new(self.patterns.clone())
            .with_orphan_chapter_policy(self.config.orphan_chapter_policy)
            .with_max_title_chars(self.config.max_title_chars);

        for line in classified {
            let line = if toc_ranges.iter().any(|r| r.contains(line.line.index)) {
                stats.toc_lines += 1;
                ClassifiedLine::new(line.line, ElementType::Ignore, BLANK_CONFIDENCE)
                    .with_pattern(TOC_PATTERN_ID)
            } else {
                line
            };
            stats.record(line.element_type);
            builder.push(line);
        }

        let (structure, mut report) = builder.finish(name_hint);
        for range in &unlabeled {
            report.warn(format!(
                "Lines {}-{}: skipped as an unlabeled table of contents; check they are not body headings",
                range.start, range.end
            ));
        }
        let validation = self.validator.validate(&structure);
        report.merge(validation.report.clone());
        report.processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        report.text_length = text.chars().count();
        report.lines_processed = lines_processed;

        let message = format!(
            "Extracted {} branch(es), {} chapter(s), {} article(s) ({} orphan); {} warning(s), {} error(s)",
            structure.total_branches,
            structure.total_chapters,
            structure.total_articles,
            structure.orphan_articles.len(),
            report.warnings.len(),
            report.errors.len()
        );
        tracing::info!(
            profile = self.patterns.name(),
            lines = lines_processed,
            toc_lines = stats.toc_lines,
            confidence = structure.structure_confidence,
            valid = validation.is_valid,
            "extraction finished"
        );

        Ok(Extraction {
            success: validation.is_valid,
            message,
            structure,
            stats,
            report,
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrphanChapterPolicy;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_input_is_fatal() {
        let orchestrator = Orchestrator::arabic().unwrap();
        assert!(matches!(
            orchestrator.extract(" \n\t\n", None),
            Err(StructureError::EmptyInput)
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PipelineConfig::default().with_confidence_floor(2.0);
        let result = Orchestrator::new(config, LanguagePatternSet::arabic().unwrap());
        assert!(matches!(result, Err(StructureError::InvalidConfig(_))));
    }

    #[test]
    fn test_extract_simple_document() {
        let orchestrator = Orchestrator::arabic().unwrap();
        let text = "الباب الأول\nالفصل الأول\nالمادة الأولى\nنص المادة.";
        let extraction = orchestrator.extract(text, Some("قانون تجريبي")).unwrap();

        assert!(extraction.success);
        assert_eq!(extraction.structure.title, "قانون تجريبي");
        assert_eq!(extraction.structure.total_articles, 1);
        assert_eq!(extraction.report.lines_processed, 4);
        assert_eq!(extraction.report.text_length, text.chars().count());
        assert_eq!(extraction.stats.branch_lines, 1);
        assert_eq!(extraction.stats.content_lines, 1);
        assert!(extraction.message.contains("1 article(s)"));
    }

    #[test]
    fn test_no_articles_is_not_successful() {
        let orchestrator = Orchestrator::arabic().unwrap();
        let extraction = orchestrator.extract("مقدمة عامة بلا مواد", None).unwrap();

        assert!(!extraction.success);
        assert!(!extraction.validation.is_valid);
        assert!(extraction.report.errors.iter().any(|e| e.contains("missing content")));
        assert_eq!(extraction.structure.structure_confidence, 0.0);
    }

    #[test]
    fn test_toc_lines_are_forced_to_ignore() {
        let orchestrator = Orchestrator::arabic().unwrap();
        let text = "الفهرس\nالباب الأول 3\nالباب الثاني 9\nالباب الأول\nالمادة 1\nنص";
        let extraction = orchestrator.extract(text, None).unwrap();

        assert_eq!(extraction.stats.toc_lines, 3);
        assert_eq!(extraction.structure.total_branches, 1);
        assert_eq!(extraction.structure.branches[0].source_line, 4);
    }

    #[test]
    fn test_policy_from_config_reaches_builder() {
        let config =
            PipelineConfig::default().with_orphan_chapter_policy(OrphanChapterPolicy::ImplicitBranch);
        let orchestrator = Orchestrator::new(config, LanguagePatternSet::arabic().unwrap()).unwrap();
        let extraction = orchestrator.extract("الفصل الأول\nالمادة 1\nنص", None).unwrap();
        assert!(extraction.structure.branches[0].implicit);
    }

    #[test]
    fn test_articles_ending_in_a_year_are_kept() {
        let orchestrator = Orchestrator::arabic().unwrap();
        let text = "الباب الأول\n\
                    المادة 1 - يلغى القانون رقم 3 لسنة 1990\n\
                    المادة 2 - يلغى القرار رقم 7 لسنة 1995\n\
                    المادة 3\n\
                    يعمل بهذا القانون.\n\
                    المادة 4\n\
                    ينشر هذا القانون.";
        let extraction = orchestrator.extract(text, None).unwrap();

        assert!(extraction.stats.toc_ranges.is_empty());
        assert_eq!(extraction.stats.toc_lines, 0);
        assert_eq!(extraction.structure.total_articles, 4);
    }

    #[test]
    fn test_unlabeled_index_is_reported() {
        let orchestrator = Orchestrator::arabic().unwrap();
        let text = "الباب الأول ..... 3\nالباب الثاني ..... 8\nالباب الأول\nالمادة 1\nنص";
        let extraction = orchestrator.extract(text, None).unwrap();

        assert_eq!(extraction.stats.toc_lines, 2);
        assert!(extraction
            .report
            .warnings
            .iter()
            .any(|w| w.starts_with("Lines 1-2: skipped as an unlabeled table of contents")));
    }
}
