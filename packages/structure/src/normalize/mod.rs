//! Arabic text repair: presentation glyphs, fragmented words and reading order.
//!
//! - [`glyphs`]: presentation-form table and script predicates
//! - [`shaping`]: contextual glyph selection for display
//! - [`direction`]: the line normalizer used by the pipeline

mod direction;
mod glyphs;
mod shaping;

pub use direction::TextDirectionNormalizer;
pub use glyphs::{
    is_arabic, is_arabic_letter, is_arabic_mark, is_presentation_form, Form, GlyphTable, Joining,
    BIDI_CONTROLS, TATWEEL,
};
pub use shaping::reshape;
