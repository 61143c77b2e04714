//! Language pattern data: marker keywords, ordinal words, TOC markers and
//! the compiled regex groups the classifier scans in priority order.
//!
//! Pattern data is injected at construction time (no module-level tables),
//! so tests and alternate numbering schemes can supply their own profile.

mod numbers;
mod ordinals;
mod profile;
mod set;

pub use numbers::{ascii_digits, normalize_numeral, roman_to_decimal};
pub use ordinals::{arabic_ordinals, strip_hamza};
pub use profile::{DefaultLabels, MarkerSpec, OrdinalEntry, PatternProfile, PatternSpec};
pub use set::{CompiledPattern, LanguagePatternSet, PatternGroup, PatternMatch};
