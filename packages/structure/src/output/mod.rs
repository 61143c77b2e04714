//! Structure file output (YAML or JSON).

mod text;
mod writer;

pub use text::{normalize_text, prepare_text, should_wrap_text, wrap_text};
pub use writer::{document_slug, generate_json, generate_yaml, save_extraction, OutputFormat};
