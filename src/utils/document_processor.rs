use crate::config::Config;
use crate::core::parser::{DocxParser, Parser};
use crate::core::sections::Section;
use crate::core::writer::{BatchReport, DocxWriter, Placement, Selection, Status, Writer};
use crate::mmap_reader::{read_document, DocumentBytes};
use crate::review::{self, parse_review, Review, ReviewGenerator, ReviewOptions};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix for annotated output files.
pub const OUTPUT_PREFIX: &str = "REVIEW_";

/// File-level pipeline: read a manuscript, get a review for it, write the annotated copy.
pub struct DocumentProcessor {
    parser: DocxParser,
    writer: DocxWriter,
}

impl DocumentProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            parser: DocxParser,
            writer: DocxWriter::new(config.author.as_str()),
        }
    }

    fn read(&self, input: &Path) -> Result<DocumentBytes> {
        let bytes = read_document(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
        debug!(
            "Read {} bytes from {}{}",
            bytes.len(),
            input.display(),
            if bytes.is_mapped() { " (mapped)" } else { "" }
        );
        Ok(bytes)
    }

    /// Plain text of the manuscript, one line per paragraph.
    pub fn extract_text(&self, input: &Path) -> Result<String> {
        let bytes = self.read(input)?;
        let manuscript = self
            .parser
            .parse(&bytes)
            .with_context(|| format!("Failed to parse {}", input.display()))?;
        info!(
            "Extracted {} paragraphs ({} words) from {}",
            manuscript.paragraphs.len(),
            manuscript.word_count(),
            input.display()
        );
        Ok(manuscript.text())
    }

    /// Generate a review for the manuscript at `input`.
    pub async fn review<G: ReviewGenerator>(
        &self,
        generator: &G,
        input: &Path,
        options: &ReviewOptions,
    ) -> Result<Review> {
        let text = self.extract_text(input)?;
        let review = review::generate_review(generator, &text, options)
            .await
            .context("Review generation failed")?;
        info!("Received feedback for {} sections", review.iter().count());
        Ok(review)
    }

    /// Insert `selection` into a copy of `input` and write it to `output`.
    pub fn annotate(
        &self,
        input: &Path,
        selection: &Selection,
        output: &Path,
    ) -> Result<BatchReport> {
        if selection.is_empty() {
            warn!("No sections selected, output will match the input");
        }
        let original = self.read(input)?;
        let annotated = self
            .writer
            .write_annotations(&original, selection)
            .with_context(|| format!("Failed to annotate {}", input.display()))?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output, &annotated.bytes)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Successfully created annotated file: {}", output.display());
        Ok(annotated.report)
    }
}

/// `dir/paper.docx` → `dir/REVIEW_paper.docx`.
pub fn output_path_for(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.docx".to_string());
    input.with_file_name(format!("{}{}", OUTPUT_PREFIX, name))
}

pub fn load_review(path: &Path) -> Result<Review> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read review {}", path.display()))?;
    parse_review(&raw).with_context(|| format!("Invalid review file {}", path.display()))
}

pub fn save_review(review: &Review, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(review)?;
    fs::write(path, json).with_context(|| format!("Failed to write review {}", path.display()))?;
    info!("Saved review to {}", path.display());
    Ok(())
}

/// Selection for the named sections, or every section when none are named.
pub fn select_sections(review: &Review, sections: &[Section]) -> Selection {
    if sections.is_empty() {
        review.all()
    } else {
        review.select(sections)
    }
}

/// One line per section for terminal output.
pub fn format_report(report: &BatchReport) -> String {
    report
        .items
        .iter()
        .map(|item| {
            let outcome = match &item.status {
                Status::Inserted { comment_id } => format!(
                    "comment {} on paragraph {}",
                    comment_id,
                    item.placement.block() + 1
                ),
                Status::Skipped { reason } => format!("skipped: {}", reason),
                Status::Failed { error } => format!("failed: {}", error),
            };
            let fallback = match item.placement {
                Placement::Fallback { .. } => " (heading not found)",
                Placement::Heading { .. } => "",
            };
            format!("{:<12} {}{}", item.section, outcome, fallback)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
