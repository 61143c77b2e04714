//! Contextual shaping of logical Arabic into presentation glyphs.
//!
//! Only used when rendering for display; classification always works on
//! logical letters.

use super::glyphs::{Form, GlyphTable, Joining, LAM};

/// Replace every Arabic letter with the glyph for its joining context.
///
/// Lam followed by an alef variant becomes a single lam-alef ligature.
#[must_use]
pub fn reshape(text: &str, glyphs: &GlyphTable) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let joins_before = previous_joins_forward(&chars, i, glyphs);

        if c == LAM {
            if let Some(&next) = chars.get(i + 1) {
                if let Some(ligature) = glyphs.lam_alef(next, joins_before) {
                    out.push(ligature);
                    i += 2;
                    continue;
                }
            }
        }

        let shaped = match glyphs.joining(c) {
            Joining::Dual => {
                let form = match (joins_before, next_accepts_join(&chars, i, glyphs)) {
                    (true, true) => Form::Medial,
                    (true, false) => Form::Final,
                    (false, true) => Form::Initial,
                    (false, false) => Form::Isolated,
                };
                glyphs.glyph(c, form)
            }
            Joining::Right => {
                let form = if joins_before { Form::Final } else { Form::Isolated };
                glyphs.glyph(c, form)
            }
            Joining::NonJoining => glyphs.glyph(c, Form::Isolated),
            Joining::Transparent => None,
        };

        out.push(shaped.unwrap_or(c));
        i += 1;
    }

    out
}

/// Whether the nearest non-transparent character before `i` connects forward.
fn previous_joins_forward(chars: &[char], i: usize, glyphs: &GlyphTable) -> bool {
    chars[..i]
        .iter()
        .rev()
        .find(|c| glyphs.joining(**c) != Joining::Transparent)
        .is_some_and(|c| glyphs.joining(*c) == Joining::Dual)
}

/// Whether the nearest non-transparent character after `i` accepts a connection.
fn next_accepts_join(chars: &[char], i: usize, glyphs: &GlyphTable) -> bool {
    chars[i + 1..]
        .iter()
        .find(|c| glyphs.joining(**c) != Joining::Transparent)
        .is_some_and(|c| matches!(glyphs.joining(*c), Joining::Dual | Joining::Right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reshape_word() {
        let glyphs = GlyphTable::arabic();
        // beh initial, alef final, beh isolated (alef does not join forward)
        assert_eq!(reshape("باب", &glyphs), "\u{FE91}\u{FE8E}\u{FE8F}");
    }

    #[test]
    fn test_reshape_medial() {
        let glyphs = GlyphTable::arabic();
        // meem initial, hah medial, meem medial, dal final
        assert_eq!(reshape("محمد", &glyphs), "\u{FEE3}\u{FEA4}\u{FEE4}\u{FEAA}");
    }

    #[test]
    fn test_reshape_lam_alef() {
        let glyphs = GlyphTable::arabic();
        assert_eq!(reshape("لا", &glyphs), "\u{FEFB}");
        // After a dual-joining letter the final ligature is used.
        assert_eq!(reshape("سلا", &glyphs), "\u{FEB3}\u{FEFC}");
    }

    #[test]
    fn test_reshape_keeps_non_arabic() {
        let glyphs = GlyphTable::arabic();
        assert_eq!(reshape("Article 12", &glyphs), "Article 12");
    }
}
