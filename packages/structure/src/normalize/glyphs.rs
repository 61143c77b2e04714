//! Arabic presentation-form table.
//!
//! PDF extractors often emit the contextual glyphs a font drew (U+FE80..U+FEFC)
//! instead of the logical letters. The same table maps those glyphs back to
//! letters and, in the other direction, picks the glyph for a letter in
//! context when text is rendered for display.

use std::collections::HashMap;

/// How a letter connects to its neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joining {
    /// Never connects (hamza, non-Arabic).
    NonJoining,
    /// Connects to the preceding letter only (alef, dal, reh, waw).
    Right,
    /// Connects on both sides.
    Dual,
    /// Diacritics; ignored when looking for neighbours.
    Transparent,
}

/// Contextual glyph form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    Isolated = 0,
    Final = 1,
    Initial = 2,
    Medial = 3,
}

/// (letter, first presentation form, number of forms). Forms are laid out
/// isolated, final, initial, medial.
const LETTER_FORMS: &[(char, u32, u8)] = &[
    ('\u{0621}', 0xFE80, 1), // hamza
    ('\u{0622}', 0xFE81, 2), // alef with madda
    ('\u{0623}', 0xFE83, 2), // alef with hamza above
    ('\u{0624}', 0xFE85, 2), // waw with hamza
    ('\u{0625}', 0xFE87, 2), // alef with hamza below
    ('\u{0626}', 0xFE89, 4), // yeh with hamza
    ('\u{0627}', 0xFE8D, 2), // alef
    ('\u{0628}', 0xFE8F, 4), // beh
    ('\u{0629}', 0xFE93, 2), // teh marbuta
    ('\u{062A}', 0xFE95, 4), // teh
    ('\u{062B}', 0xFE99, 4), // theh
    ('\u{062C}', 0xFE9D, 4), // jeem
    ('\u{062D}', 0xFEA1, 4), // hah
    ('\u{062E}', 0xFEA5, 4), // khah
    ('\u{062F}', 0xFEA9, 2), // dal
    ('\u{0630}', 0xFEAB, 2), // thal
    ('\u{0631}', 0xFEAD, 2), // reh
    ('\u{0632}', 0xFEAF, 2), // zain
    ('\u{0633}', 0xFEB1, 4), // seen
    ('\u{0634}', 0xFEB5, 4), // sheen
    ('\u{0635}', 0xFEB9, 4), // sad
    ('\u{0636}', 0xFEBD, 4), // dad
    ('\u{0637}', 0xFEC1, 4), // tah
    ('\u{0638}', 0xFEC5, 4), // zah
    ('\u{0639}', 0xFEC9, 4), // ain
    ('\u{063A}', 0xFECD, 4), // ghain
    ('\u{0641}', 0xFED1, 4), // feh
    ('\u{0642}', 0xFED5, 4), // qaf
    ('\u{0643}', 0xFED9, 4), // kaf
    ('\u{0644}', 0xFEDD, 4), // lam
    ('\u{0645}', 0xFEE1, 4), // meem
    ('\u{0646}', 0xFEE5, 4), // noon
    ('\u{0647}', 0xFEE9, 4), // heh
    ('\u{0648}', 0xFEED, 2), // waw
    ('\u{0649}', 0xFEEF, 2), // alef maksura
    ('\u{064A}', 0xFEF1, 4), // yeh
];

/// (alef variant, isolated lam-alef ligature, final lam-alef ligature).
const LAM_ALEF: &[(char, u32, u32)] = &[
    ('\u{0622}', 0xFEF5, 0xFEF6),
    ('\u{0623}', 0xFEF7, 0xFEF8),
    ('\u{0625}', 0xFEF9, 0xFEFA),
    ('\u{0627}', 0xFEFB, 0xFEFC),
];

pub const LAM: char = '\u{0644}';
pub const TATWEEL: char = '\u{0640}';

/// Bidirectional control characters stripped before matching.
pub const BIDI_CONTROLS: &[char] = &[
    '\u{200E}', '\u{200F}', '\u{061C}', '\u{202A}', '\u{202B}', '\u{202C}', '\u{202D}',
    '\u{202E}', '\u{2066}', '\u{2067}', '\u{2068}', '\u{2069}',
];

/// Lookup tables between presentation glyphs and logical letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphTable {
    to_logical: HashMap<char, String>,
    forms: HashMap<char, (u32, u8)>,
    lam_alef: HashMap<char, (u32, u32)>,
}

impl GlyphTable {
    /// The standard Arabic table.
    #[must_use]
    pub fn arabic() -> Self {
        let mut to_logical = HashMap::new();
        let mut forms = HashMap::new();
        for &(letter, first, count) in LETTER_FORMS {
            forms.insert(letter, (first, count));
            for offset in 0..u32::from(count) {
                if let Some(glyph) = char::from_u32(first + offset) {
                    to_logical.insert(glyph, letter.to_string());
                }
            }
        }

        let mut lam_alef = HashMap::new();
        for &(alef, isolated, final_form) in LAM_ALEF {
            lam_alef.insert(alef, (isolated, final_form));
            for cp in [isolated, final_form] {
                if let Some(glyph) = char::from_u32(cp) {
                    to_logical.insert(glyph, format!("{LAM}{alef}"));
                }
            }
        }

        Self {
            to_logical,
            forms,
            lam_alef,
        }
    }

    /// Logical letters for a presentation glyph in the table.
    #[must_use]
    pub fn logical(&self, glyph: char) -> Option<&str> {
        self.to_logical.get(&glyph).map(String::as_str)
    }

    /// Number of glyphs the table knows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_logical.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_logical.is_empty()
    }

    /// Joining class of a logical character.
    #[must_use]
    pub fn joining(&self, c: char) -> Joining {
        if is_arabic_mark(c) {
            return Joining::Transparent;
        }
        if c == TATWEEL {
            return Joining::Dual;
        }
        match self.forms.get(&c) {
            Some((_, 4)) => Joining::Dual,
            Some((_, 2)) => Joining::Right,
            _ => Joining::NonJoining,
        }
    }

    /// Presentation glyph for a letter in the given form, if it has one.
    #[must_use]
    pub fn glyph(&self, letter: char, form: Form) -> Option<char> {
        let (first, count) = *self.forms.get(&letter)?;
        let index = form as u32;
        if index < u32::from(count) {
            char::from_u32(first + index)
        } else if count == 2 {
            // Right-joining letters have no initial/medial glyphs.
            char::from_u32(first + if index == 3 { 1 } else { 0 })
        } else {
            char::from_u32(first)
        }
    }

    /// Lam-alef ligature for the given alef, joined to the preceding letter or not.
    #[must_use]
    pub fn lam_alef(&self, alef: char, joined_before: bool) -> Option<char> {
        let (isolated, final_form) = *self.lam_alef.get(&alef)?;
        char::from_u32(if joined_before { final_form } else { isolated })
    }
}

impl Default for GlyphTable {
    fn default() -> Self {
        Self::arabic()
    }
}

/// Whether a character belongs to one of the Arabic blocks.
#[must_use]
pub fn is_arabic(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{08A0}'..='\u{08FF}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFF}'
    )
}

/// Whether a character is an Arabic letter (not a digit, mark or punctuation).
#[must_use]
pub fn is_arabic_letter(c: char) -> bool {
    is_arabic(c) && c.is_alphabetic() && !is_arabic_mark(c)
}

/// Whether a character is in a presentation-form block.
#[must_use]
pub fn is_presentation_form(c: char) -> bool {
    matches!(c, '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
}

/// Harakat and other combining marks.
#[must_use]
pub fn is_arabic_mark(c: char) -> bool {
    matches!(c,
        '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06DC}'
        | '\u{06DF}'..='\u{06E4}'
        | '\u{06E7}'
        | '\u{06E8}'
        | '\u{06EA}'..='\u{06ED}'
    )
}
