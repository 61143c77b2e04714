//! Text cleanup and wrapping for output files.

use std::sync::LazyLock;

use regex::Regex;
use textwrap::{fill, Options};

use crate::config::TEXT_WRAP_WIDTH;

/// Whitespace before Arabic or Latin punctuation ("نص ، نص" → "نص، نص").
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+([،؛؟:.,;!?)\]])").expect("valid regex"));

/// Runs of spaces and tabs inside a line.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static INNER_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

/// Normalize spacing left behind by extraction.
///
/// Fixes:
/// - repeated spaces inside a line
/// - whitespace before punctuation
///
/// # Examples
/// ```
/// use qanun_structure::output::normalize_text;
///
/// assert_eq!(normalize_text("نص   المادة ، وتعديلاتها ."), "نص المادة، وتعديلاتها.");
/// ```
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.lines()
        .map(|line| {
            let line = INNER_SPACES.replace_all(line.trim(), " ");
            SPACE_BEFORE_PUNCT.replace_all(&line, "$1").into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap text at the given width, keeping line breaks between paragraphs.
#[must_use]
pub fn wrap_text(text: &str, width: usize) -> String {
    let options = Options::new(width);
    text.lines()
        .map(|line| fill(line, &options))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check if text is long enough to be worth wrapping.
#[must_use]
pub fn should_wrap_text(text: &str) -> bool {
    text.lines().any(|l| l.chars().count() > TEXT_WRAP_WIDTH)
}

/// Normalize, then wrap at the default width when needed.
#[must_use]
pub fn prepare_text(text: &str) -> String {
    let normalized = normalize_text(text);
    if should_wrap_text(&normalized) {
        wrap_text(&normalized, TEXT_WRAP_WIDTH)
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_breaks_long_lines() {
        let text = "تسري أحكام هذا القانون على جميع العاملين في الجهات الحكومية والمؤسسات العامة";
        let wrapped = wrap_text(text, 30);
        assert!(wrapped.contains('\n'));
        assert!(wrapped.lines().all(|l| l.chars().count() <= 30));
    }

    #[test]
    fn test_wrap_text_keeps_line_breaks() {
        let wrapped = wrap_text("أولا\nثانيا", 100);
        assert_eq!(wrapped, "أولا\nثانيا");
    }

    #[test]
    fn test_should_wrap_text() {
        assert!(!should_wrap_text("نص قصير"));
        assert!(should_wrap_text(&"كلمة ".repeat(30)));
    }

    #[test]
    fn test_prepare_text_short_text_is_only_normalized() {
        assert_eq!(prepare_text("  نص  قصير ."), "نص قصير.");
    }
}
