//! Command-line interface.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::PipelineConfig;
use crate::error::{Result, StructureError};
use crate::output::{save_extraction, OutputFormat};
use crate::patterns::LanguagePatternSet;
use crate::pipeline::{Extraction, Orchestrator};

/// Most findings of each kind printed after an extraction.
const MAX_LISTED_FINDINGS: usize = 10;

/// Qanun Structure - Recover the hierarchy of Arabic legal documents.
#[derive(Parser)]
#[command(name = "qanun-structure")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Pipeline configuration file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Language pattern profile (YAML); the built-in Arabic profile by default
    #[arg(long, global = true)]
    pub profile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the structure of one text file.
    Extract {
        /// Extracted document text (UTF-8)
        file: PathBuf,

        /// Document name (default: the file name)
        #[arg(short, long)]
        name: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract the structure of many text files.
    Batch {
        /// Extracted document texts (UTF-8)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Print the normalized lines of a text file.
    Normalize {
        /// Extracted document text (UTF-8)
        file: PathBuf,

        /// Render shaped, visually ordered text for display
        #[arg(long)]
        display: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output directory (default: current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,
}

impl OutputArgs {
    fn dir(&self) -> &Path {
        self.output.as_deref().unwrap_or(Path::new("."))
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let orchestrator = build_orchestrator(cli.config.as_deref(), cli.profile.as_deref())?;

    match cli.command {
        Commands::Extract { file, name, output } => {
            extract_command(&orchestrator, &file, name.as_deref(), &output)
        }
        Commands::Batch { files, output } => batch_command(&orchestrator, &files, &output),
        Commands::Normalize { file, display } => normalize_command(&orchestrator, &file, display),
    }
}

/// Load configuration and patterns, applying `QANUN_*` overrides.
fn build_orchestrator(config: Option<&Path>, profile: Option<&Path>) -> Result<Orchestrator> {
    let config = match config {
        Some(path) => PipelineConfig::from_yaml_file(path)?,
        None => PipelineConfig::default(),
    }
    .with_env_overrides()?;

    let patterns = match profile {
        Some(path) => LanguagePatternSet::from_yaml_file(path)?,
        None => LanguagePatternSet::arabic()?,
    };

    Orchestrator::new(config, patterns)
}

fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        StructureError::Io(std::io::Error::new(
            e.kind(),
            format!("Cannot read {}: {e}", path.display()),
        ))
    })
}

fn name_from_path(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// Execute the extract command.
fn extract_command(
    orchestrator: &Orchestrator,
    file: &Path,
    name: Option<&str>,
    output: &OutputArgs,
) -> Result<()> {
    let text = read_document(file)?;
    let name = name.map(String::from).or_else(|| name_from_path(file));

    println!("{} {}", style("Extracting").bold(), style(file.display()).cyan());
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Analyzing structure...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let extraction = match orchestrator.extract(&text, name.as_deref()) {
        Ok(extraction) => extraction,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Saving structure...");
    let output_path = match save_extraction(&extraction, output.dir(), output.format) {
        Ok(path) => path,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    print_summary(&extraction);

    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        output_path.display()
    );

    Ok(())
}

fn print_summary(extraction: &Extraction) {
    let structure = &extraction.structure;
    let report = &extraction.report;

    println!("  Title: {}", style(&structure.title).green());
    println!("  Branches: {}", structure.total_branches);
    println!("  Chapters: {}", structure.total_chapters);
    println!(
        "  Articles: {} ({} sub-articles, {} orphan)",
        structure.total_articles,
        structure.total_sub_articles,
        structure.orphan_articles.len()
    );
    println!("  Confidence: {:.2}", structure.structure_confidence);
    if extraction.stats.toc_lines > 0 {
        println!("  Table of contents lines skipped: {}", extraction.stats.toc_lines);
    }

    if !report.errors.is_empty() {
        println!("  Errors: {}", style(report.errors.len()).red().bold());
        for error in report.errors.iter().take(MAX_LISTED_FINDINGS) {
            println!("    {} {error}", style("✗").red());
        }
    }
    if !report.warnings.is_empty() {
        println!("  Warnings: {}", style(report.warnings.len()).yellow().bold());
        for warning in report.warnings.iter().take(MAX_LISTED_FINDINGS) {
            println!("    {} {warning}", style("!").yellow());
        }
        if report.warnings.len() > MAX_LISTED_FINDINGS {
            println!("    ... and {} more", report.warnings.len() - MAX_LISTED_FINDINGS);
        }
    }
    for suggestion in &report.suggestions {
        println!("  {} {suggestion}", style("Suggestion:").cyan());
    }
}

/// Execute the batch command. Each document runs independently.
fn batch_command(orchestrator: &Orchestrator, files: &[PathBuf], output: &OutputArgs) -> Result<()> {
    let pb = ProgressBar::new(files.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let mut failures: Vec<(PathBuf, StructureError)> = Vec::new();
    let mut saved = 0usize;

    for file in files {
        pb.set_message(file.display().to_string());
        let result = read_document(file).and_then(|text| {
            let extraction = orchestrator.extract(&text, name_from_path(file).as_deref())?;
            save_extraction(&extraction, output.dir(), output.format)
        });
        match result {
            Ok(path) => {
                saved += 1;
                tracing::debug!(input = %file.display(), output = %path.display(), "document saved");
            }
            Err(e) => {
                tracing::warn!(input = %file.display(), error = %e, "document failed");
                failures.push((file.clone(), e));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!(
        "{} {saved} of {} documents",
        style("Extracted").green().bold(),
        files.len()
    );
    for (file, error) in &failures {
        println!("  {} {}: {error}", style("✗").red(), file.display());
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(StructureError::BatchFailed {
            failed: failures.len(),
            total: files.len(),
        })
    }
}

/// Execute the normalize command.
fn normalize_command(orchestrator: &Orchestrator, file: &Path, display: bool) -> Result<()> {
    let text = read_document(file)?;
    let normalizer = orchestrator.normalizer();

    for line in normalizer.normalize_lines(&text) {
        if display {
            println!("{}", normalizer.to_display(&line.raw_text));
        } else {
            println!("{}", line.normalized_text);
        }
    }
    Ok(())
}
