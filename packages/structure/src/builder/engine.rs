//! Streaming tree construction.

use std::sync::Arc;

use super::state::{transition, BuilderState, SideEffect};
use crate::config::{OrphanChapterPolicy, DEFAULT_MAX_TITLE_CHARS, IMPLICIT_BRANCH_CONFIDENCE};
use crate::patterns::{DefaultLabels, LanguagePatternSet};
use crate::types::{
    ArticleNode, BranchNode, ChapterNode, ClassifiedLine, DocumentStructure, ProcessingReport,
};

/// Sentence-final punctuation marking an article remainder as body text.
const SENTENCE_END: &[char] = &['.', '۔', '؟', '?', '!', '؛', ';'];

/// Longest text quoted in a warning.
const PREVIEW_CHARS: usize = 40;

/// Where the current article lives. Nodes are only appended, so the
/// current article is always the last one of its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArticleSlot {
    Chapter,
    Branch,
    Orphan,
}

/// Turns classified lines into a `DocumentStructure`, one line at a time.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use qanun_structure::builder::HierarchyBuilder;
/// use qanun_structure::patterns::LanguagePatternSet;
/// use qanun_structure::types::{ClassifiedLine, ElementType, LogicalLine};
///
/// let patterns = Arc::new(LanguagePatternSet::arabic().unwrap());
/// let mut builder = HierarchyBuilder::new(patterns);
/// builder.push(
///     ClassifiedLine::new(LogicalLine::from_text(1, "المادة 1"), ElementType::Article, 0.85)
///         .with_number(Some("1".into())),
/// );
/// let (structure, _report) = builder.finish(None);
/// assert_eq!(structure.orphan_articles.len(), 1);
/// ```
#[derive(Debug)]
pub struct HierarchyBuilder {
    patterns: Arc<LanguagePatternSet>,
    policy: OrphanChapterPolicy,
    max_title_chars: usize,
    state: BuilderState,
    current: Option<ArticleSlot>,
    structure: DocumentStructure,
    report: ProcessingReport,
}

impl HierarchyBuilder {
    /// Create a builder with the default policy (drop orphan chapters).
    #[must_use]
    pub fn new(patterns: Arc<LanguagePatternSet>) -> Self {
        Self {
            patterns,
            policy: OrphanChapterPolicy::default(),
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
            state: BuilderState::NoContext,
            current: None,
            structure: DocumentStructure::default(),
            report: ProcessingReport::default(),
        }
    }

    /// Set the policy for chapters that appear before any branch.
    #[must_use]
    pub fn with_orphan_chapter_policy(mut self, policy: OrphanChapterPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the longest article remainder still used as a title.
    #[must_use]
    pub fn with_max_title_chars(mut self, max: usize) -> Self {
        self.max_title_chars = max;
        self
    }

    /// Build a whole document at once.
    pub fn build(
        mut self,
        lines: impl IntoIterator<Item = ClassifiedLine>,
        name_hint: Option<&str>,
    ) -> (DocumentStructure, ProcessingReport) {
        for line in lines {
            self.push(line);
        }
        self.finish(name_hint)
    }

    /// Feed one classified line.
    pub fn push(&mut self, line: ClassifiedLine) {
        let (next, effect) = transition(self.state, &line, self.current.is_some(), self.policy);
        tracing::trace!(
            line = line.line.index,
            from = ?self.state,
            to = ?next,
            effect = ?effect,
            "builder transition"
        );
        self.state = next;

        match effect {
            SideEffect::OpenBranch => self.open_branch(&line),
            SideEffect::OpenChapter => self.open_chapter(&line),
            SideEffect::OpenImplicitBranchAndChapter => {
                self.open_implicit_branch(&line);
                self.open_chapter(&line);
            }
            SideEffect::DropOrphanChapter => {
                self.current = None;
                tracing::warn!(line = line.line.index, "chapter without enclosing branch dropped");
                self.report.warn(format!(
                    "Line {}: chapter '{}' has no enclosing branch and was dropped",
                    line.line.index,
                    preview(line.text())
                ));
            }
            SideEffect::OpenArticle => self.open_article(&line),
            SideEffect::AppendSubArticle => self.append_sub_article(&line),
            SideEffect::AppendContent => {
                if let Some(article) = self.current_article_mut() {
                    article.append_content(line.text());
                }
            }
            SideEffect::DescribeHeading => self.describe_heading(line.text()),
            SideEffect::DropUnattached => {
                tracing::debug!(line = line.line.index, "unattached content dropped");
                self.report.warn(format!(
                    "Line {}: unattached content dropped: '{}'",
                    line.line.index,
                    preview(line.text())
                ));
            }
            SideEffect::DropTrivial | SideEffect::Skip => {}
        }
    }

    /// Close the stream: fill in default labels and compute the totals.
    #[must_use]
    pub fn finish(mut self, name_hint: Option<&str>) -> (DocumentStructure, ProcessingReport) {
        let labels = self.patterns.labels().clone();
        self.structure.title = name_hint
            .map(str::trim)
            .filter(|hint| !hint.is_empty())
            .map_or_else(|| labels.document.clone(), str::to_string);

        for branch in &mut self.structure.branches {
            if branch.title.is_empty() {
                branch.title = default_label(&labels.branch, branch.number.as_deref(), branch.order_index);
            }
            for chapter in &mut branch.chapters {
                if chapter.title.is_empty() {
                    chapter.title =
                        default_label(&labels.chapter, chapter.number.as_deref(), chapter.order_index);
                }
                label_articles(&mut chapter.articles, &labels);
            }
            label_articles(&mut branch.articles, &labels);
        }
        label_articles(&mut self.structure.orphan_articles, &labels);

        self.structure.refresh_totals();
        tracing::debug!(
            branches = self.structure.total_branches,
            chapters = self.structure.total_chapters,
            articles = self.structure.total_articles,
            orphans = self.structure.orphan_articles.len(),
            "hierarchy built"
        );
        (self.structure, self.report)
    }

    fn open_branch(&mut self, line: &ClassifiedLine) {
        let mut branch = BranchNode::new(
            line.extracted_number.clone(),
            line.extracted_title.clone().unwrap_or_default(),
            line.confidence,
            line.line.index,
        );
        branch.order_index = self.structure.branches.len();
        self.structure.branches.push(branch);
        self.current = None;
    }

    fn open_implicit_branch(&mut self, line: &ClassifiedLine) {
        let mut branch = BranchNode::new(
            None,
            self.patterns.labels().implicit_branch.clone(),
            IMPLICIT_BRANCH_CONFIDENCE,
            line.line.index,
        );
        branch.implicit = true;
        branch.order_index = self.structure.branches.len();
        self.structure.branches.push(branch);
        tracing::info!(line = line.line.index, "implicit branch opened for orphan chapter");
        self.report.warn(format!(
            "Line {}: chapter before any branch; placed in an implicit branch",
            line.line.index
        ));
    }

    fn open_chapter(&mut self, line: &ClassifiedLine) {
        let chapter = ChapterNode::new(
            line.extracted_number.clone(),
            line.extracted_title.clone().unwrap_or_default(),
            line.confidence,
            line.line.index,
        );
        if let Some(branch) = self.structure.branches.last_mut() {
            branch.push_chapter(chapter);
        }
        self.current = None;
    }

    fn open_article(&mut self, line: &ClassifiedLine) {
        let remainder = line.extracted_title.as_deref().unwrap_or("").trim();
        let inline_text = remainder.chars().count() > self.max_title_chars
            || remainder.ends_with(SENTENCE_END);

        let title = if inline_text { "" } else { remainder };
        let mut article = ArticleNode::new(
            line.extracted_number.clone(),
            title,
            line.confidence,
            line.line.index,
        );
        if inline_text {
            article.append_content(remainder);
        }

        let slot = match self.state {
            BuilderState::InBranchAndChapter => ArticleSlot::Chapter,
            BuilderState::InBranch => ArticleSlot::Branch,
            BuilderState::NoContext => ArticleSlot::Orphan,
        };
        match slot {
            ArticleSlot::Chapter => {
                if let Some(chapter) = self
                    .structure
                    .branches
                    .last_mut()
                    .and_then(|b| b.chapters.last_mut())
                {
                    chapter.push_article(article);
                }
            }
            ArticleSlot::Branch => {
                if let Some(branch) = self.structure.branches.last_mut() {
                    branch.push_article(article);
                }
            }
            ArticleSlot::Orphan => {
                article.order_index = self.structure.orphan_articles.len();
                tracing::debug!(line = line.line.index, "article without enclosing branch");
                self.structure.orphan_articles.push(article);
            }
        }
        self.current = Some(slot);
    }

    fn append_sub_article(&mut self, line: &ClassifiedLine) {
        let mut sub = ArticleNode::new(
            line.extracted_number.clone(),
            "",
            line.confidence,
            line.line.index,
        );
        sub.append_content(line.extracted_title.as_deref().unwrap_or(""));
        if let Some(article) = self.current_article_mut() {
            article.push_sub_article(sub);
        }
    }

    /// Text between a heading and its first article: the heading's title
    /// if it has none yet, otherwise part of its description.
    fn describe_heading(&mut self, text: &str) {
        let Some(branch) = self.structure.branches.last_mut() else {
            return;
        };
        let (title, description) = match self.state {
            BuilderState::InBranchAndChapter => match branch.chapters.last_mut() {
                Some(chapter) => (&mut chapter.title, &mut chapter.description),
                None => (&mut branch.title, &mut branch.description),
            },
            _ => (&mut branch.title, &mut branch.description),
        };
        if title.is_empty() {
            *title = text.to_string();
        } else {
            if !description.is_empty() {
                description.push('\n');
            }
            description.push_str(text);
        }
    }

    fn current_article_mut(&mut self) -> Option<&mut ArticleNode> {
        match self.current? {
            ArticleSlot::Chapter => self
                .structure
                .branches
                .last_mut()?
                .chapters
                .last_mut()?
                .articles
                .last_mut(),
            ArticleSlot::Branch => self.structure.branches.last_mut()?.articles.last_mut(),
            ArticleSlot::Orphan => self.structure.orphan_articles.last_mut(),
        }
    }
}

fn label_articles(articles: &mut [ArticleNode], labels: &DefaultLabels) {
    for article in articles {
        if article.title.is_empty() {
            article.title = default_label(&labels.article, article.number.as_deref(), article.order_index);
        }
        for sub in &mut article.sub_articles {
            if sub.title.is_empty() {
                sub.title = default_label(&labels.sub_article, sub.number.as_deref(), sub.order_index);
            }
        }
    }
}

/// "المادة 7"; position-based when the node has no number.
fn default_label(prefix: &str, number: Option<&str>, order_index: usize) -> String {
    match number {
        Some(number) => format!("{prefix} {number}"),
        None => format!("{prefix} {}", order_index + 1),
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}…")
    }
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

    fn classify_all(texts: &[&str]) -> Vec<ClassifiedLine> {
        let classifier = PatternClassifier::new(patterns());
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| classifier.classify(&LogicalLine::from_text(i + 1, *t)))
            .collect()
    }

    fn build(texts: &[&str]) -> (DocumentStructure, ProcessingReport) {
        HierarchyBuilder::new(patterns()).build(classify_all(texts), None)
    }

    #[test]
    fn test_branch_chapter_article() {
        let (doc, report) = build(&["الباب الأول", "الفصل الأول", "المادة الأولى", "نص المادة."]);

        assert_eq!(doc.total_branches, 1);
        assert_eq!(doc.total_chapters, 1);
        assert_eq!(doc.total_articles, 1);
        assert!(doc.orphan_articles.is_empty());

        let article = &doc.branches[0].chapters[0].articles[0];
        assert_eq!(article.content, "نص المادة.");
        assert_eq!(article.number.as_deref(), Some("1"));
        assert_eq!(article.branch_ref, Some(0));
        assert_eq!(article.chapter_ref, Some(0));
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_article_without_context_is_orphan() {
        let (doc, _) = build(&["المادة الأولى", "نص يتيم."]);
        assert_eq!(doc.total_branches, 0);
        assert_eq!(doc.orphan_articles.len(), 1);
        assert_eq!(doc.orphan_articles[0].content, "نص يتيم.");
        assert_eq!(doc.orphan_articles[0].branch_ref, None);
        assert_eq!(doc.total_articles, 1);
    }

    #[test]
    fn test_sub_article_attaches_to_open_article() {
        let (doc, _) = build(&[
            "المادة 3",
            "على الموظف ما يلي:",
            "5- يجب على الموظف احترام مواعيد العمل",
            "6- يجب على الموظف المحافظة على أسرار العمل",
        ]);
        assert_eq!(doc.total_articles, 1);
        assert_eq!(doc.total_sub_articles, 2);

        let article = &doc.orphan_articles[0];
        assert_eq!(article.content, "على الموظف ما يلي:");
        let sub = &article.sub_articles[0];
        assert_eq!(sub.number.as_deref(), Some("5"));
        assert_eq!(sub.content, "يجب على الموظف احترام مواعيد العمل");
        assert_eq!(sub.title, "البند 5");
        assert_eq!(article.sub_articles[1].order_index, 1);
    }

    #[test]
    fn test_direct_branch_articles_and_order_indices() {
        let (doc, _) = build(&[
            "الباب الأول",
            "المادة 1",
            "المادة 2",
            "الباب الثاني",
            "الفصل الأول",
            "المادة 3",
            "الفصل الثاني",
            "المادة 4",
            "المادة 5",
        ]);

        assert_eq!(doc.branches[0].articles.len(), 2);
        assert_eq!(doc.branches[0].articles[1].order_index, 1);
        let second = &doc.branches[1];
        assert_eq!(second.order_index, 1);
        assert_eq!(second.chapters[1].order_index, 1);
        let indices: Vec<usize> = second.chapters[1].articles.iter().map(|a| a.order_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(second.chapters[1].articles[0].chapter_ref, Some(1));
        assert_eq!(doc.total_articles, 5);
    }

    #[test]
    fn test_heading_text_becomes_title_then_description() {
        let (doc, _) = build(&[
            "الباب الأول",
            "أحكام عامة",
            "يتضمن هذا الباب التعريفات",
            "الفصل الأول: التعريفات",
            "في تطبيق أحكام هذا القانون",
            "المادة 1",
        ]);
        let branch = &doc.branches[0];
        assert_eq!(branch.title, "أحكام عامة");
        assert_eq!(branch.description, "يتضمن هذا الباب التعريفات");
        assert_eq!(branch.chapters[0].title, "التعريفات");
        assert_eq!(branch.chapters[0].description, "في تطبيق أحكام هذا القانون");
    }

    #[test]
    fn test_orphan_chapter_dropped_by_default() {
        let (doc, report) = build(&["الفصل الأول", "المادة 1", "نص"]);
        assert_eq!(doc.total_branches, 0);
        assert_eq!(doc.total_chapters, 0);
        assert_eq!(doc.orphan_articles.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("no enclosing branch"));
    }

    #[test]
    fn test_orphan_chapter_implicit_branch() {
        let builder = HierarchyBuilder::new(patterns())
            .with_orphan_chapter_policy(OrphanChapterPolicy::ImplicitBranch);
        let (doc, _) = builder.build(classify_all(&["الفصل الأول", "المادة 1", "نص"]), None);

        assert_eq!(doc.total_branches, 1);
        let branch = &doc.branches[0];
        assert!(branch.implicit);
        assert_eq!(branch.title, "باب غير مسمى");
        assert_eq!(branch.confidence, 0.5);
        assert_eq!(branch.chapters[0].articles.len(), 1);
        assert!(doc.orphan_articles.is_empty());
    }

    #[test]
    fn test_long_article_remainder_becomes_content() {
        let (doc, _) = build(&[
            "المادة 1: يعمل بهذا القانون اعتبارا من تاريخ نشره.",
            "المادة 2 - نطاق التطبيق",
        ]);
        let first = &doc.orphan_articles[0];
        assert_eq!(first.title, "المادة 1");
        assert_eq!(first.content, "يعمل بهذا القانون اعتبارا من تاريخ نشره.");
        assert_eq!(doc.orphan_articles[1].title, "نطاق التطبيق");
    }

    #[test]
    fn test_unattached_content_warns_unless_trivial() {
        let (doc, report) = build(&["مقدمة القانون", "ب", "المادة 1"]);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("مقدمة القانون"));
        assert_eq!(doc.total_articles, 1);
    }

    #[test]
    fn test_default_labels_and_document_title() {
        let (doc, _) = build(&["الباب الثاني", "المادة السابعة"]);
        assert_eq!(doc.title, "وثيقة بدون عنوان");
        assert_eq!(doc.branches[0].title, "الباب 2");
        assert_eq!(doc.branches[0].articles[0].title, "المادة 7");

        let (doc, _) = HierarchyBuilder::new(patterns())
            .build(classify_all(&["المادة 1"]), Some("  قانون العمل "));
        assert_eq!(doc.title, "قانون العمل");
    }

    #[test]
    fn test_every_article_lands_in_exactly_one_container() {
        let (doc, _) = build(&[
            "المادة 1",
            "الباب الأول",
            "المادة 2",
            "الفصل الأول",
            "المادة 3",
            "الباب الثاني",
            "المادة 4",
        ]);
        let in_chapters: usize = doc
            .branches
            .iter()
            .flat_map(|b| &b.chapters)
            .map(|c| c.articles.len())
            .sum();
        let direct: usize = doc.branches.iter().map(|b| b.articles.len()).sum();
        assert_eq!(doc.total_articles, in_chapters + direct + doc.orphan_articles.len());
        assert_eq!((in_chapters, direct, doc.orphan_articles.len()), (1, 2, 1));
    }

    #[test]
    fn test_heading_beyond_ordinal_table_is_its_own_article() {
        let (doc, _) = build(&[
            "الباب الأول",
            "المادة الثلاثون",
            "نص المادة الثلاثين.",
            "المادة الحادية والثلاثون",
            "نص المادة الحادية والثلاثين.",
        ]);
        let articles = &doc.branches[0].articles;
        assert_eq!(doc.total_articles, 2);
        assert_eq!(articles[0].number.as_deref(), Some("30"));
        assert_eq!(articles[0].content, "نص المادة الثلاثين.");
        assert_eq!(articles[1].number, None);
        assert_eq!(articles[1].content, "نص المادة الحادية والثلاثين.");
    }
}
