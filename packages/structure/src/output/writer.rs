//! Structure file writer.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;

use super::text::prepare_text;
use crate::error::Result;
use crate::pipeline::Extraction;
use crate::types::{ArticleNode, ClassificationStats, DocumentStructure, ProcessingReport};

/// Regex for slug generation - matches anything but word characters, whitespace and dashes.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SLUG_NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

/// Regex for slug generation - matches whitespace and dashes.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static SLUG_SPACE_DASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }
}

/// Full document representation for serialization.
#[derive(Debug, Serialize)]
struct OutputDocument<'a> {
    #[serde(rename = "$id")]
    id: String,
    name: &'a str,
    extracted_at: String,
    success: bool,
    message: &'a str,
    structure: DocumentStructure,
    stats: &'a ClassificationStats,
    report: &'a ProcessingReport,
}

/// Build a file-name-safe identifier from a document title.
///
/// Arabic letters are kept; punctuation is dropped and whitespace becomes `_`.
///
/// # Examples
/// ```
/// use qanun_structure::output::document_slug;
///
/// assert_eq!(document_slug("قانون العمل (معدل)"), "قانون_العمل_معدل");
/// assert_eq!(document_slug("Labour Law 2020"), "labour_law_2020");
/// assert_eq!(document_slug("..."), "document");
/// ```
#[must_use]
pub fn document_slug(title: &str) -> String {
    let text = title.to_lowercase();
    let text = SLUG_NON_WORD.replace_all(&text, "");
    let text = SLUG_SPACE_DASH.replace_all(&text, "_");
    let slug = text.trim_matches('_');
    if slug.is_empty() {
        "document".to_string()
    } else {
        slug.to_string()
    }
}

fn generate_document<'a>(
    extraction: &'a Extraction,
    extracted_at: DateTime<Utc>,
) -> OutputDocument<'a> {
    let mut structure = extraction.structure.clone();
    for branch in &mut structure.branches {
        for chapter in &mut branch.chapters {
            prepare_articles(&mut chapter.articles);
        }
        prepare_articles(&mut branch.articles);
    }
    prepare_articles(&mut structure.orphan_articles);

    OutputDocument {
        id: document_slug(&extraction.structure.title),
        name: &extraction.structure.title,
        extracted_at: extracted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        success: extraction.success,
        message: &extraction.message,
        structure,
        stats: &extraction.stats,
        report: &extraction.report,
    }
}

fn prepare_articles(articles: &mut [ArticleNode]) {
    for article in articles {
        article.content = prepare_text(&article.content);
        prepare_articles(&mut article.sub_articles);
    }
}

/// Generate the YAML text for an extraction.
pub fn generate_yaml(extraction: &Extraction, extracted_at: DateTime<Utc>) -> Result<String> {
    let document = generate_document(extraction, extracted_at);
    let yaml = serde_yaml_ng::to_string(&document)?;
    let lines: Vec<&str> = yaml.lines().map(str::trim_end).collect();
    Ok(format!("---\n{}\n", lines.join("\n")))
}

/// Generate the JSON text for an extraction.
pub fn generate_json(extraction: &Extraction, extracted_at: DateTime<Utc>) -> Result<String> {
    let document = generate_document(extraction, extracted_at);
    let mut json = serde_json::to_string_pretty(&document)?;
    json.push('\n');
    Ok(json)
}

/// Save an extraction as `{slug}.{yaml|json}` in `output_dir`.
///
/// Uses atomic write pattern: writes to temp file, syncs to disk, then renames.
///
/// # Returns
/// Path to the saved file
pub fn save_extraction(
    extraction: &Extraction,
    output_dir: &Path,
    format: OutputFormat,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let slug = document_slug(&extraction.structure.title);
    let extension = format.extension();
    let output_file = output_dir.join(format!("{slug}.{extension}"));
    let temp_file = output_dir.join(format!(".{slug}.{extension}.tmp"));

    let now = Utc::now();
    let content = match format {
        OutputFormat::Yaml => generate_yaml(extraction, now)?,
        OutputFormat::Json => generate_json(extraction, now)?,
    };

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if output_file.exists() {
        fs::remove_file(&output_file)?;
    }

    fs::rename(&temp_file, &output_file)?;
    tracing::debug!(path = %output_file.display(), "structure written");

    Ok(output_file)
}
