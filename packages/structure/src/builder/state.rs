//! Builder state machine, kept free of tree mutation so every transition
//! can be tested on its own.

use crate::config::{OrphanChapterPolicy, TRIVIAL_CONTENT_CHARS};
use crate::types::{ClassifiedLine, ElementType};

/// Heading context the next line is read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuilderState {
    /// No branch opened yet.
    #[default]
    NoContext,
    InBranch,
    InBranchAndChapter,
}

/// What the engine does to the tree for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Push a branch and clear the current article.
    OpenBranch,
    /// Push a chapter under the latest branch and clear the current article.
    OpenChapter,
    /// Synthesize an unnamed branch, then push the chapter into it.
    OpenImplicitBranchAndChapter,
    /// Chapter with no branch to hold it.
    DropOrphanChapter,
    /// Push an article into the innermost open container.
    OpenArticle,
    /// Append a sub-article to the current article.
    AppendSubArticle,
    /// Append the line to the current article's content.
    AppendContent,
    /// Text after a heading and before its first article.
    DescribeHeading,
    /// Content with nowhere to go, worth a warning.
    DropUnattached,
    /// Content with nowhere to go, too short to mention.
    DropTrivial,
    Skip,
}

/// Compute the next state and the side effect for one classified line.
///
/// `has_article` tells whether the current-article pointer is set.
#[must_use]
pub fn transition(
    state: BuilderState,
    line: &ClassifiedLine,
    has_article: bool,
    policy: OrphanChapterPolicy,
) -> (BuilderState, SideEffect) {
    match line.element_type {
        ElementType::Branch => (BuilderState::InBranch, SideEffect::OpenBranch),
        ElementType::Chapter => match (state, policy) {
            (BuilderState::InBranch | BuilderState::InBranchAndChapter, _) => {
                (BuilderState::InBranchAndChapter, SideEffect::OpenChapter)
            }
            (BuilderState::NoContext, OrphanChapterPolicy::ImplicitBranch) => (
                BuilderState::InBranchAndChapter,
                SideEffect::OpenImplicitBranchAndChapter,
            ),
            (BuilderState::NoContext, OrphanChapterPolicy::Drop) => {
                (BuilderState::NoContext, SideEffect::DropOrphanChapter)
            }
        },
        ElementType::Article => (state, SideEffect::OpenArticle),
        ElementType::SubArticle if has_article => (state, SideEffect::AppendSubArticle),
        ElementType::SubArticle | ElementType::Content => {
            (state, content_effect(state, line, has_article))
        }
        ElementType::Ignore => (state, SideEffect::Skip),
    }
}

fn content_effect(state: BuilderState, line: &ClassifiedLine, has_article: bool) -> SideEffect {
    if has_article {
        SideEffect::AppendContent
    } else if state != BuilderState::NoContext {
        SideEffect::DescribeHeading
    } else if line.text().chars().count() < TRIVIAL_CONTENT_CHARS {
        SideEffect::DropTrivial
    } else {
        SideEffect::DropUnattached
    }
}
