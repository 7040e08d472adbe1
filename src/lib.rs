pub mod core {
    pub mod anchor;
    pub mod comments;
    pub mod document;
    pub mod locator;
    pub mod package;
    pub mod parser;
    pub mod sections;
    pub mod writer;
    pub mod xml;

    #[cfg(test)]
    pub(crate) mod fixtures;
}

pub mod utils {
    pub mod document_processor;
}

pub mod config;
pub mod error;
pub mod mmap_reader;
pub mod review;

pub use crate::config::Config;
pub use crate::core::document::Document;
pub use crate::core::sections::Section;
pub use crate::core::writer::{Annotated, BatchReport, DocxWriter, Selection, Writer};
pub use crate::error::{Result, ReviewError};

/// Insert `selection` into a copy of the document in `original` using the default author.
pub fn annotate(original: &[u8], selection: &Selection) -> Result<Annotated> {
    DocxWriter::default().write_annotations(original, selection)
}
