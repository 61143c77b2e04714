//! Global consistency checks over a built structure.
//!
//! The validator only reads the tree. Every finding lands in the report;
//! nothing here returns an error.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CONFIDENCE_FLOOR, ERROR_PENALTY};
use crate::patterns::LanguagePatternSet;
use crate::types::{ArticleNode, DocumentStructure, ProcessingReport};

/// Result of validating one structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// True iff no errors were found.
    pub is_valid: bool,
    /// `1.0 - 0.1` per distinct error, floored at `0.0`.
    pub confidence_penalty: f64,
    pub report: ProcessingReport,
}

/// A node as seen by the numbering check.
struct Numbered<'a> {
    kind: &'static str,
    number: Option<&'a str>,
    source_line: usize,
}

/// Checks numbering, nesting, coverage and confidence.
#[derive(Debug, Clone)]
pub struct StructureValidator {
    patterns: Arc<LanguagePatternSet>,
    confidence_floor: f64,
}

impl StructureValidator {
    #[must_use]
    pub fn new(patterns: Arc<LanguagePatternSet>) -> Self {
        Self {
            patterns,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
        }
    }

    /// Set the confidence below which nodes are listed for review.
    #[must_use]
    pub fn with_confidence_floor(mut self, floor: f64) -> Self {
        self.confidence_floor = floor;
        self
    }

    #[must_use]
    pub fn validate(&self, structure: &DocumentStructure) -> ValidationOutcome {
        let mut report = ProcessingReport::default();

        self.check_numbering(structure, &mut report);
        check_hierarchy(structure, &mut report);
        check_coverage(structure, &mut report);
        self.check_confidence(structure, &mut report);

        let distinct_errors = report.errors.iter().collect::<HashSet<_>>().len();
        let confidence_penalty = (1.0 - ERROR_PENALTY * distinct_errors as f64).max(0.0);
        let is_valid = report.errors.is_empty();

        if is_valid {
            tracing::debug!(warnings = report.warnings.len(), "structure is valid");
        } else {
            tracing::warn!(errors = distinct_errors, "structure has errors");
        }

        ValidationOutcome {
            is_valid,
            confidence_penalty,
            report,
        }
    }

    fn check_numbering(&self, structure: &DocumentStructure, report: &mut ProcessingReport) {
        let branches: Vec<Numbered<'_>> = structure
            .branches
            .iter()
            .filter(|b| !b.implicit)
            .map(|b| Numbered {
                kind: "branch",
                number: b.number.as_deref(),
                source_line: b.source_line,
            })
            .collect();
        self.check_sequence(&branches, report);

        for branch in &structure.branches {
            let chapters: Vec<Numbered<'_>> = branch
                .chapters
                .iter()
                .map(|c| Numbered {
                    kind: "chapter",
                    number: c.number.as_deref(),
                    source_line: c.source_line,
                })
                .collect();
            self.check_sequence(&chapters, report);

            for chapter in &branch.chapters {
                self.check_articles(&chapter.articles, report);
            }
            self.check_articles(&branch.articles, report);
        }
        self.check_articles(&structure.orphan_articles, report);
    }

    fn check_articles(&self, articles: &[ArticleNode], report: &mut ProcessingReport) {
        let numbered: Vec<Numbered<'_>> = articles
            .iter()
            .map(|a| Numbered {
                kind: "article",
                number: a.number.as_deref(),
                source_line: a.source_line,
            })
            .collect();
        self.check_sequence(&numbered, report);

        for article in articles {
            let subs: Vec<Numbered<'_>> = article
                .sub_articles
                .iter()
                .map(|s| Numbered {
                    kind: "sub-article",
                    number: s.number.as_deref(),
                    source_line: s.source_line,
                })
                .collect();
            self.check_sequence(&subs, report);
        }
    }

    /// Numbers within one sibling list must be present, readable and non-decreasing.
    fn check_sequence(&self, nodes: &[Numbered<'_>], report: &mut ProcessingReport) {
        let mut previous: Option<(usize, &str)> = None;

        for node in nodes {
            let Some(number) = node.number else {
                report.warn(format!(
                    "{} at line {} has no number",
                    node.kind, node.source_line
                ));
                continue;
            };
            let Some(value) = self.numeric_value(number) else {
                report.warn(format!(
                    "{} at line {} has non-numeric number '{number}'",
                    node.kind, node.source_line
                ));
                continue;
            };

            if let Some((prev_value, prev_number)) = previous {
                if value < prev_value {
                    report.warn(format!(
                        "{} {number} at line {} comes after {prev_number}; numbering goes backwards",
                        node.kind, node.source_line
                    ));
                } else if value > prev_value + 1 {
                    report.warn(format!(
                        "{} numbering gap between {prev_number} and {number} (line {})",
                        node.kind, node.source_line
                    ));
                }
            }
            previous = Some((value, number));
        }
    }

    fn numeric_value(&self, number: &str) -> Option<usize> {
        number
            .parse::<usize>()
            .ok()
            .or_else(|| self.patterns.letter_position(number))
    }

    fn check_confidence(&self, structure: &DocumentStructure, report: &mut ProcessingReport) {
        let low: Vec<String> = structure
            .nodes()
            .into_iter()
            .filter(|n| n.confidence < self.confidence_floor)
            .map(|n| format!("{} '{}' (line {}, {:.2})", n.kind, n.label, n.source_line, n.confidence))
            .collect();
        if !low.is_empty() {
            report.suggest(format!(
                "Recommend manual review of {} node(s) below confidence {:.2}: {}",
                low.len(),
                self.confidence_floor,
                low.join("; ")
            ));
        }
    }
}

fn check_hierarchy(structure: &DocumentStructure, report: &mut ProcessingReport) {
    for branch in &structure.branches {
        for chapter in &branch.chapters {
            if chapter.branch_ref != branch.order_index {
                report.error(format!(
                    "Hierarchy mismatch: chapter at line {} references branch {} but sits in branch {}",
                    chapter.source_line, chapter.branch_ref, branch.order_index
                ));
            }
            for article in &chapter.articles {
                check_refs(
                    article,
                    Some(chapter.branch_ref),
                    Some(chapter.order_index),
                    report,
                );
            }
        }
        for article in &branch.articles {
            check_refs(article, Some(branch.order_index), None, report);
        }
    }
    for article in &structure.orphan_articles {
        check_refs(article, None, None, report);
    }
}

fn check_refs(
    article: &ArticleNode,
    branch: Option<usize>,
    chapter: Option<usize>,
    report: &mut ProcessingReport,
) {
    let nodes = std::iter::once(article).chain(article.sub_articles.iter());
    for node in nodes {
        if node.branch_ref != branch || node.chapter_ref != chapter {
            report.error(format!(
                "Hierarchy mismatch: article at line {} references branch {:?}/chapter {:?}, expected {:?}/{:?}",
                node.source_line, node.branch_ref, node.chapter_ref, branch, chapter
            ));
        }
    }
}

fn check_coverage(structure: &DocumentStructure, report: &mut ProcessingReport) {
    if structure.total_articles == 0 {
        report.error("missing content: no articles detected");
        return;
    }
    if structure.total_branches == 0 {
        report.warn(format!(
            "No branches detected; {} article(s) have no enclosing branch",
            structure.total_articles
        ));
    }
    if structure.total_chapters == 0 {
        report.warn("No chapters detected; articles attach directly to branches or the document");
    }
}
