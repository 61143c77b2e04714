//! Core data types for structure extraction.
//!
//! Lines flow through the pipeline as `LogicalLine` → `ClassifiedLine` and
//! end up as nodes of a `DocumentStructure`:
//!
//! ```text
//! DocumentStructure
//! ├── BranchNode (الباب)
//! │   ├── ChapterNode (الفصل)
//! │   │   └── ArticleNode (المادة)
//! │   │       └── ArticleNode (sub-article)
//! │   └── ArticleNode (direct, no chapter)
//! └── orphan ArticleNode (no enclosing branch)
//! ```

use serde::{Deserialize, Serialize};

/// Structural role of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    /// Top-level subdivision (الباب).
    Branch,
    /// Subdivision inside a branch (الفصل).
    Chapter,
    /// Atomic legal provision (المادة).
    Article,
    /// Numbered or lettered point inside an article.
    SubArticle,
    /// Body text.
    Content,
    /// Blank lines, page noise, table-of-contents entries.
    Ignore,
}

impl ElementType {
    /// Get the string value used in logs and output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::Chapter => "chapter",
            Self::Article => "article",
            Self::SubArticle => "sub_article",
            Self::Content => "content",
            Self::Ignore => "ignore",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One source line before and after direction normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based position in the source text.
    pub index: usize,
    /// Text exactly as extracted.
    pub raw_text: String,
    /// Text in logical order with standard letters.
    pub normalized_text: String,
    /// True when the normalized text is blank.
    pub is_empty: bool,
}

impl LogicalLine {
    /// Create a new logical line.
    #[must_use]
    pub fn new(index: usize, raw_text: impl Into<String>, normalized_text: impl Into<String>) -> Self {
        let normalized_text = normalized_text.into();
        let is_empty = normalized_text.trim().is_empty();
        Self {
            index,
            raw_text: raw_text.into(),
            normalized_text,
            is_empty,
        }
    }

    /// Create a line whose raw text is already logical.
    #[must_use]
    pub fn from_text(index: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(index, text.clone(), text)
    }
}

/// A line with its classification outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLine {
    pub line: LogicalLine,
    pub element_type: ElementType,
    /// Classification confidence in `[0, 1]`.
    pub confidence: f64,
    /// Normalized number ("1", "12", "أ").
    pub extracted_number: Option<String>,
    /// Line text with the marker removed.
    pub extracted_title: Option<String>,
    /// Identifier of the pattern that matched (e.g. "article.canonical").
    pub matched_pattern_id: Option<String>,
}

impl ClassifiedLine {
    /// Create a classification without number, title or pattern.
    #[must_use]
    pub fn new(line: LogicalLine, element_type: ElementType, confidence: f64) -> Self {
        Self {
            line,
            element_type,
            confidence,
            extracted_number: None,
            extracted_title: None,
            matched_pattern_id: None,
        }
    }

    /// Set the extracted number.
    #[must_use]
    pub fn with_number(mut self, number: Option<String>) -> Self {
        self.extracted_number = number;
        self
    }

    /// Set the extracted title.
    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.extracted_title = title;
        self
    }

    /// Set the matched pattern identifier.
    #[must_use]
    pub fn with_pattern(mut self, pattern_id: impl Into<String>) -> Self {
        self.matched_pattern_id = Some(pattern_id.into());
        self
    }

    /// The text the builder works with.
    #[must_use]
    pub fn text(&self) -> &str {
        self.line.normalized_text.trim()
    }
}

/// An article, or a sub-article nested in one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleNode {
    pub number: Option<String>,
    pub title: String,
    pub content: String,
    pub confidence: f64,
    pub order_index: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_articles: Vec<ArticleNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// 1-based line the node was created from.
    pub source_line: usize,
    /// Order index of the enclosing branch, if any.
    pub branch_ref: Option<usize>,
    /// Order index of the enclosing chapter, if any.
    pub chapter_ref: Option<usize>,
}

impl ArticleNode {
    /// Create an empty article node.
    #[must_use]
    pub fn new(number: Option<String>, title: impl Into<String>, confidence: f64, source_line: usize) -> Self {
        Self {
            number,
            title: title.into(),
            content: String::new(),
            confidence,
            order_index: 0,
            sub_articles: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
            source_line,
            branch_ref: None,
            chapter_ref: None,
        }
    }

    /// Append a line of text to the content accumulator.
    pub fn append_content(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.content.is_empty() {
            self.content.push('\n');
        }
        self.content.push_str(text);
    }

    /// Append a sub-article, assigning its order index.
    pub fn push_sub_article(&mut self, mut sub: ArticleNode) {
        sub.order_index = self.sub_articles.len();
        sub.branch_ref = self.branch_ref;
        sub.chapter_ref = self.chapter_ref;
        self.sub_articles.push(sub);
    }
}

/// A chapter inside a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterNode {
    pub number: Option<String>,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub order_index: usize,
    pub articles: Vec<ArticleNode>,
    pub source_line: usize,
    /// Order index of the parent branch.
    pub branch_ref: usize,
}

impl ChapterNode {
    /// Create an empty chapter node.
    #[must_use]
    pub fn new(number: Option<String>, title: impl Into<String>, confidence: f64, source_line: usize) -> Self {
        Self {
            number,
            title: title.into(),
            description: String::new(),
            confidence,
            order_index: 0,
            articles: Vec::new(),
            source_line,
            branch_ref: 0,
        }
    }

    /// Append an article, assigning its order index and parent references.
    pub fn push_article(&mut self, mut article: ArticleNode) {
        article.order_index = self.articles.len();
        article.branch_ref = Some(self.branch_ref);
        article.chapter_ref = Some(self.order_index);
        self.articles.push(article);
    }
}

/// A top-level branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNode {
    pub number: Option<String>,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub order_index: usize,
    pub chapters: Vec<ChapterNode>,
    /// Articles directly under the branch, outside any chapter.
    pub articles: Vec<ArticleNode>,
    pub source_line: usize,
    /// True when the branch was synthesized for a chapter without one.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub implicit: bool,
}

impl BranchNode {
    /// Create an empty branch node.
    #[must_use]
    pub fn new(number: Option<String>, title: impl Into<String>, confidence: f64, source_line: usize) -> Self {
        Self {
            number,
            title: title.into(),
            description: String::new(),
            confidence,
            order_index: 0,
            chapters: Vec::new(),
            articles: Vec::new(),
            source_line,
            implicit: false,
        }
    }

    /// Append a chapter, assigning its order index and parent reference.
    pub fn push_chapter(&mut self, mut chapter: ChapterNode) {
        chapter.order_index = self.chapters.len();
        chapter.branch_ref = self.order_index;
        self.chapters.push(chapter);
    }

    /// Append a direct article, assigning its order index and parent reference.
    pub fn push_article(&mut self, mut article: ArticleNode) {
        article.order_index = self.articles.len();
        article.branch_ref = Some(self.order_index);
        article.chapter_ref = None;
        self.articles.push(article);
    }
}

/// Flattened view of one tree node, used for aggregate checks.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSummary {
    pub kind: ElementType,
    pub label: String,
    pub confidence: f64,
    pub source_line: usize,
}

/// The recovered document hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub title: String,
    pub branches: Vec<BranchNode>,
    pub orphan_articles: Vec<ArticleNode>,
    pub total_branches: usize,
    pub total_chapters: usize,
    /// Top-level articles (chapter, direct and orphan); sub-articles excluded.
    pub total_articles: usize,
    pub total_sub_articles: usize,
    pub structure_confidence: f64,
}

impl DocumentStructure {
    /// Iterate over every top-level article in source order per container.
    pub fn articles(&self) -> impl Iterator<Item = &ArticleNode> {
        self.branches
            .iter()
            .flat_map(|b| {
                b.chapters
                    .iter()
                    .flat_map(|c| c.articles.iter())
                    .chain(b.articles.iter())
            })
            .chain(self.orphan_articles.iter())
    }

    /// Flatten every node of the tree.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeSummary> {
        let mut nodes = Vec::new();
        for branch in &self.branches {
            nodes.push(NodeSummary {
                kind: ElementType::Branch,
                label: branch.title.clone(),
                confidence: branch.confidence,
                source_line: branch.source_line,
            });
            for chapter in &branch.chapters {
                nodes.push(NodeSummary {
                    kind: ElementType::Chapter,
                    label: chapter.title.clone(),
                    confidence: chapter.confidence,
                    source_line: chapter.source_line,
                });
            }
        }
        for article in self.articles() {
            nodes.push(NodeSummary {
                kind: ElementType::Article,
                label: article.title.clone(),
                confidence: article.confidence,
                source_line: article.source_line,
            });
            for sub in &article.sub_articles {
                nodes.push(NodeSummary {
                    kind: ElementType::SubArticle,
                    label: sub.title.clone(),
                    confidence: sub.confidence,
                    source_line: sub.source_line,
                });
            }
        }
        nodes
    }

    /// Recompute counts and the mean node confidence.
    ///
    /// A tree without articles scores 0.0 whatever headings it holds.
    pub fn refresh_totals(&mut self) {
        self.total_branches = self.branches.len();
        self.total_chapters = self.branches.iter().map(|b| b.chapters.len()).sum();
        self.total_articles = self.articles().count();
        self.total_sub_articles = self.articles().map(|a| a.sub_articles.len()).sum();

        let nodes = self.nodes();
        self.structure_confidence = if self.total_articles == 0 {
            0.0
        } else {
            nodes.iter().map(|n| n.confidence).sum::<f64>() / nodes.len() as f64
        };
    }

    /// True when the tree holds no nodes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.orphan_articles.is_empty()
    }
}

/// Findings and timing for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingReport {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub suggestions: Vec<String>,
    pub processing_time_ms: u64,
    pub text_length: usize,
    pub lines_processed: usize,
}

impl ProcessingReport {
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn suggest(&mut self, message: impl Into<String>) {
        self.suggestions.push(message.into());
    }

    /// Move all findings of `other` into this report.
    pub fn merge(&mut self, other: ProcessingReport) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        self.suggestions.extend(other.suggestions);
    }
}

/// Inclusive range of 1-based line indices forming a table of contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocRange {
    pub start: usize,
    pub end: usize,
}

impl TocRange {
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end + 1 - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Line-level counts gathered while classifying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub lines_total: usize,
    pub branch_lines: usize,
    pub chapter_lines: usize,
    pub article_lines: usize,
    pub sub_article_lines: usize,
    pub content_lines: usize,
    pub ignored_lines: usize,
    /// Lines forced to Ignore because they sit inside a TOC range.
    pub toc_lines: usize,
    pub toc_ranges: Vec<TocRange>,
}

impl ClassificationStats {
    /// Count one classified line.
    pub fn record(&mut self, element_type: ElementType) {
        self.lines_total += 1;
        match element_type {
            ElementType::Branch => self.branch_lines += 1,
            ElementType::Chapter => self.chapter_lines += 1,
            ElementType::Article => self.article_lines += 1,
            ElementType::SubArticle => self.sub_article_lines += 1,
            ElementType::Content => self.content_lines += 1,
            ElementType::Ignore => self.ignored_lines += 1,
        }
    }
}
