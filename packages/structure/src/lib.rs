//! Qanun Structure - Recover the hierarchy of Arabic legal documents.
//!
//! This crate turns the raw text an upstream PDF/OCR step produced for a
//! statute into a tree of Branches (الباب), Chapters (الفصل), Articles
//! (المادة) and sub-articles, with a confidence score per node and a
//! report of everything that looked wrong.
//!
//! # Example
//!
//! ```
//! use qanun_structure::Orchestrator;
//!
//! let orchestrator = Orchestrator::arabic().unwrap();
//! let text = "الباب الأول\nالفصل الأول\nالمادة الأولى\nنص المادة.";
//! let extraction = orchestrator.extract(text, Some("قانون")).unwrap();
//!
//! assert!(extraction.success);
//! assert_eq!(extraction.structure.total_articles, 1);
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants, `PipelineConfig` and validation
//! - [`types`]: Lines, tree nodes and the processing report
//! - [`error`]: Error types and Result alias
//! - [`patterns`]: Language pattern data injected into every component
//! - [`normalize`]: Glyph, fragmentation and reading-order repair
//! - [`classify`]: Per-line classification with confidence
//! - [`toc`]: Table-of-contents detection
//! - [`builder`]: State machine building the tree
//! - [`validate`]: Numbering, nesting, coverage and confidence checks
//! - [`pipeline`]: The orchestrator composing the stages
//! - [`output`]: YAML/JSON output
//! - [`cli`]: Command-line interface

pub mod builder;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod normalize;
pub mod output;
pub mod patterns;
pub mod pipeline;
pub mod toc;
pub mod types;
pub mod validate;

// Re-export commonly used items
pub use builder::HierarchyBuilder;
pub use classify::PatternClassifier;
pub use config::{OrphanChapterPolicy, PipelineConfig};
pub use error::{Result, StructureError};
pub use normalize::TextDirectionNormalizer;
pub use patterns::{LanguagePatternSet, PatternProfile};
pub use pipeline::{Extraction, Orchestrator};
pub use toc::TocDetector;
pub use types::{
    ArticleNode, BranchNode, ChapterNode, ClassifiedLine, DocumentStructure, ElementType,
    LogicalLine, ProcessingReport, TocRange,
};
pub use validate::{StructureValidator, ValidationOutcome};
