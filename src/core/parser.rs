use crate::core::document::Document;
use crate::error::Result;

/// Plain-text view of a manuscript, one entry per body paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manuscript {
    pub paragraphs: Vec<String>,
}

impl Manuscript {
    /// Paragraphs joined with newlines, as sent to the review generator.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    pub fn word_count(&self) -> usize {
        self.paragraphs
            .iter()
            .map(|p| p.split_whitespace().count())
            .sum()
    }
}

pub trait Parser {
    /// Parse the bytes of a document package into its paragraph text
    fn parse(&self, bytes: &[u8]) -> Result<Manuscript>;
}

/// DocxParser: reads the body paragraphs of `word/document.xml` (or wherever the package
/// points its main part).
pub struct DocxParser;

impl Parser for DocxParser {
    fn parse(&self, bytes: &[u8]) -> Result<Manuscript> {
        let doc = Document::open(bytes)?;
        Ok(Manuscript {
            paragraphs: doc.block_texts(),
        })
    }
}

pub fn extract_text(bytes: &[u8]) -> Result<String> {
    Ok(DocxParser.parse(bytes)?.text())
}
