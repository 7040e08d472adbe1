use thiserror::Error;

/// Errors raised by the review engine.
///
/// `DocumentEmpty` and `UpstreamGeneration` abort a whole request. `DocumentStructure` and
/// `CommentSynthesis` are scoped to a single comment and are collected into the batch report
/// by the writer instead of being propagated.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Every paragraph of the document is blank
    #[error("document is empty, no comments can be inserted")]
    DocumentEmpty,

    /// The package is missing a part or a part is malformed
    #[error("invalid document structure: {0}")]
    DocumentStructure(String),

    /// Building or anchoring one comment failed
    #[error("failed to insert comment: {0}")]
    CommentSynthesis(String),

    /// The review generator failed or returned unusable output
    #[error("review generation failed: {0}")]
    UpstreamGeneration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
