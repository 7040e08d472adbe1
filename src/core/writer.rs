use crate::core::anchor::inject_anchor;
use crate::core::comments::{add_comment, CommentMeta, DEFAULT_AUTHOR};
use crate::core::document::Document;
use crate::core::locator::find_heading;
use crate::core::sections::aliases_for;
use crate::error::{Result, ReviewError};
use chrono::{DateTime, Utc};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

/// Feedback to insert, keyed by section name, in the order it should be applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    entries: Vec<SelectionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub section: String,
    pub feedback: String,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add feedback for a section, replacing earlier feedback for the same key in place.
    pub fn push(&mut self, section: impl Into<String>, feedback: impl Into<String>) {
        let section = section.into();
        let feedback = feedback.into();
        match self.entries.iter_mut().find(|e| e.section == section) {
            Some(entry) => entry.feedback = feedback,
            None => self.entries.push(SelectionEntry { section, feedback }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Selection {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for (section, feedback) in iter {
            selection.push(section, feedback);
        }
        selection
    }
}

/// Where a comment was anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Placement {
    /// On the paragraph matching one of the section's headings
    Heading { block: usize },
    /// On the first paragraph, because no heading matched
    Fallback { block: usize },
}

impl Placement {
    pub fn block(self) -> usize {
        match self {
            Placement::Heading { block } | Placement::Fallback { block } => block,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    Inserted { comment_id: u32 },
    Skipped { reason: String },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentOutcome {
    pub section: String,
    pub placement: Placement,
    #[serde(flatten)]
    pub status: Status,
}

/// Per-section results of one batch, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub items: Vec<CommentOutcome>,
}

impl BatchReport {
    /// Identifiers of the comments that were inserted.
    pub fn inserted(&self) -> Vec<u32> {
        self.items
            .iter()
            .filter_map(|item| match item.status {
                Status::Inserted { comment_id } => Some(comment_id),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &CommentOutcome> {
        self.items
            .iter()
            .filter(|item| matches!(item.status, Status::Failed { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &CommentOutcome> {
        self.items
            .iter()
            .filter(|item| matches!(item.status, Status::Skipped { .. }))
    }
}

/// The rewritten package and what happened to each selected section.
#[derive(Debug, Clone)]
pub struct Annotated {
    pub bytes: Vec<u8>,
    pub report: BatchReport,
}

/// Writer is responsible for writing review comments back into a .docx package
pub trait Writer {
    /// Apply `selection` to a copy of `original` and return the new package bytes.
    fn write_annotations(&self, original: &[u8], selection: &Selection) -> Result<Annotated>;
}

/// DocxWriter anchors each selected section's feedback on the section heading, falling
/// back to the first paragraph with a `[section]: ` label when no heading matches.
#[derive(Debug, Clone)]
pub struct DocxWriter {
    author: String,
    date: Option<DateTime<Utc>>,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR)
    }
}

impl DocxWriter {
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            date: None,
        }
    }

    /// Stamp every comment with a fixed date instead of the current time.
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    fn comment_block(
        &self,
        doc: &mut Document,
        block: usize,
        text: &str,
        meta: &CommentMeta,
    ) -> Result<Status> {
        let missing =
            || ReviewError::CommentSynthesis(format!("paragraph {} does not exist", block));
        let blank = doc.block_text(block).ok_or_else(missing)?.trim().is_empty();
        if blank {
            return Ok(Status::Skipped {
                reason: format!("paragraph {} is blank", block),
            });
        }

        let Some(comment_id) = add_comment(doc, text, meta)? else {
            return Ok(Status::Skipped {
                reason: "feedback text is empty".to_string(),
            });
        };

        let names = doc.names().clone();
        let paragraph = doc.block_mut(block).ok_or_else(missing)?;
        inject_anchor(paragraph, comment_id, &names);
        Ok(Status::Inserted { comment_id })
    }
}

impl Writer for DocxWriter {
    fn write_annotations(&self, original: &[u8], selection: &Selection) -> Result<Annotated> {
        let mut doc = Document::open(original)?;
        if doc.is_blank() {
            error!("Document is empty, no comments can be inserted");
            return Err(ReviewError::DocumentEmpty);
        }

        // Anchoring only adds markers, so block text is stable for the whole batch.
        let blocks = doc.block_texts();
        let meta = CommentMeta::new(self.author.as_str(), self.date.unwrap_or_else(Utc::now));
        let mut report = BatchReport::default();

        for entry in selection.iter() {
            let (placement, text) = match find_heading(&blocks, aliases_for(&entry.section)) {
                Some(block) => (Placement::Heading { block }, entry.feedback.clone()),
                None => {
                    warn!(
                        "No heading found for section '{}', using the first paragraph",
                        entry.section
                    );
                    (
                        Placement::Fallback { block: 0 },
                        format!("[{}]: {}", entry.section, entry.feedback),
                    )
                }
            };

            let status = if entry.feedback.trim().is_empty() {
                Status::Skipped {
                    reason: "feedback text is empty".to_string(),
                }
            } else {
                match self.comment_block(&mut doc, placement.block(), &text, &meta) {
                    Ok(status) => status,
                    Err(e) => {
                        error!("Failed to insert comment for section '{}': {}", entry.section, e);
                        Status::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            };

            if let Status::Skipped { reason } = &status {
                warn!("Skipped section '{}': {}", entry.section, reason);
            }
            report.items.push(CommentOutcome {
                section: entry.section.clone(),
                placement,
                status,
            });
        }

        let bytes = doc.save()?;
        info!(
            "Inserted {} of {} comments",
            report.inserted().len(),
            selection.len()
        );
        Ok(Annotated { bytes, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::W_NS;
    use crate::core::fixtures;
    use chrono::TimeZone;

    fn writer() -> DocxWriter {
        DocxWriter::default().with_date(Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap())
    }

    fn comment_texts(bytes: &[u8]) -> Vec<(u32, String)> {
        let mut doc = Document::open(bytes).unwrap();
        let part = crate::core::comments::resolve_comments(&mut doc).unwrap();
        part.ids()
            .into_iter()
            .map(|id| (id, part.comment_text(id).unwrap_or_default()))
            .collect()
    }

    #[test]
    fn heading_match_gets_the_plain_feedback() {
        let original = fixtures::docx(&["A study", "INTRODUCTION", "Body"]);
        let selection: Selection = [("Pendahuluan", "Needs citations")].into_iter().collect();

        let annotated = writer().write_annotations(&original, &selection).unwrap();

        assert_eq!(
            annotated.report.items[0].placement,
            Placement::Heading { block: 1 }
        );
        assert_eq!(comment_texts(&annotated.bytes), vec![(1, "Needs citations".to_string())]);
    }

    #[test]
    fn missing_heading_falls_back_to_first_paragraph_with_label() {
        let original = fixtures::docx(&["A study", "Body"]);
        let selection: Selection = [("Referensi", "Add DOI links")].into_iter().collect();

        let annotated = writer().write_annotations(&original, &selection).unwrap();

        assert_eq!(
            annotated.report.items[0].placement,
            Placement::Fallback { block: 0 }
        );
        assert_eq!(
            comment_texts(&annotated.bytes),
            vec![(1, "[Referensi]: Add DOI links".to_string())]
        );
    }

    #[test]
    fn ids_increase_across_the_batch() {
        let original = fixtures::docx(&["TITLE", "ABSTRACT", "CONCLUSION"]);
        let selection: Selection = [
            ("Abstrak", "Too long"),
            ("Kesimpulan", "Restate findings"),
            ("Hasil", "Missing"),
        ]
        .into_iter()
        .collect();

        let annotated = writer().write_annotations(&original, &selection).unwrap();
        assert_eq!(annotated.report.inserted(), vec![1, 2, 3]);
        assert_eq!(annotated.report.failures().count(), 0);
    }

    #[test]
    fn blank_document_is_rejected() {
        let original = fixtures::docx(&["", "  "]);
        let selection: Selection = [("Judul", "x")].into_iter().collect();
        let err = writer().write_annotations(&original, &selection).unwrap_err();
        assert!(matches!(err, ReviewError::DocumentEmpty));
    }

    #[test]
    fn blank_first_paragraph_fallback_is_skipped_not_dropped() {
        let original = fixtures::docx(&["", "INTRODUCTION"]);
        let selection: Selection = [("Pendahuluan", "ok"), ("Referensi", "orphan")]
            .into_iter()
            .collect();

        let annotated = writer().write_annotations(&original, &selection).unwrap();
        assert_eq!(annotated.report.inserted(), vec![1]);
        let skipped: Vec<&str> = annotated.report.skipped().map(|o| o.section.as_str()).collect();
        assert_eq!(skipped, vec!["Referensi"]);
    }

    #[test]
    fn empty_feedback_is_skipped() {
        let original = fixtures::docx(&["INTRODUCTION"]);
        let selection: Selection = [("Pendahuluan", "  ")].into_iter().collect();
        let annotated = writer().write_annotations(&original, &selection).unwrap();
        assert!(annotated.report.inserted().is_empty());
        assert_eq!(annotated.report.skipped().count(), 1);
    }

    #[test]
    fn structure_failure_is_isolated_per_section() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="comments.xml"/></Relationships>"#;
        let document = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>TITLE</w:t></w:r></w:p></w:body></w:document>"#;
        let original = fixtures::package(&[
            ("_rels/.rels", fixtures::PACKAGE_RELS),
            ("word/document.xml", document),
            ("word/_rels/document.xml.rels", rels),
        ]);
        let selection: Selection = [("Judul", "a"), ("Abstrak", "b")].into_iter().collect();

        let annotated = writer().write_annotations(&original, &selection).unwrap();
        assert_eq!(annotated.report.failures().count(), 2);
        assert!(!annotated.bytes.is_empty());
    }

    #[test]
    fn original_bytes_are_not_touched() {
        let original = fixtures::docx(&["INTRODUCTION"]);
        let copy = original.clone();
        let selection: Selection = [("Pendahuluan", "x")].into_iter().collect();
        writer().write_annotations(&original, &selection).unwrap();
        assert_eq!(original, copy);
    }

    #[test]
    fn selection_push_replaces_duplicate_keys() {
        let mut selection = Selection::new();
        selection.push("Judul", "one");
        selection.push("Abstrak", "two");
        selection.push("Judul", "three");
        let entries: Vec<(&str, &str)> = selection
            .iter()
            .map(|e| (e.section.as_str(), e.feedback.as_str()))
            .collect();
        assert_eq!(entries, vec![("Judul", "three"), ("Abstrak", "two")]);
    }

    #[test]
    fn default_namespace_document_gets_qualified_anchors() {
        let document = r#"<document xmlns="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><body><p><r><t>A study</t></r></p><p><pPr><pStyle/></pPr><r><t>RESEARCH METHODOLOGY</t></r></p></body></document>"#;
        let original = fixtures::package(&[
            ("_rels/.rels", fixtures::PACKAGE_RELS),
            ("word/document.xml", document),
        ]);
        let selection: Selection = [("Metodologi", "Describe the sample")].into_iter().collect();

        let annotated = writer().write_annotations(&original, &selection).unwrap();
        assert_eq!(annotated.report.inserted(), vec![1]);

        let doc = Document::open(&annotated.bytes).unwrap();
        assert_eq!(doc.block_texts(), vec!["A study", "RESEARCH METHODOLOGY"]);

        let main = crate::core::package::Package::open(&annotated.bytes).unwrap();
        let main = String::from_utf8(main.part("word/document.xml").unwrap().to_vec()).unwrap();
        let tree = roxmltree::Document::parse(&main).unwrap();
        let heading = tree
            .descendants()
            .filter(|n| n.has_tag_name((W_NS, "p")))
            .nth(1)
            .unwrap();
        let kinds: Vec<&str> = heading
            .children()
            .filter(|n| n.is_element())
            .map(|n| n.tag_name().name())
            .collect();
        assert_eq!(kinds, vec!["pPr", "commentRangeStart", "r", "commentRangeEnd", "r"]);
        let start = heading.children().find(|n| n.has_tag_name((W_NS, "commentRangeStart")));
        assert_eq!(start.unwrap().attribute((W_NS, "id")), Some("1"));
        assert_eq!(comment_texts(&annotated.bytes), vec![(1, "Describe the sample".to_string())]);
    }
}
