use thiserror::Error;

use crate::representation::RepresentationKind;

#[derive(Error, Debug)]
pub enum PdfFileError {
    #[error("Invalid document value: {0}")]
    InvalidDocumentValue(String),

    #[error("Unhandled PDF representation: expected {expected}, found {found}")]
    UnhandledRepresentation {
        expected: RepresentationKind,
        found: RepresentationKind,
    },

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Failed to extract PDF content: {0}")]
    ExtractionError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<tokio::task::JoinError> for PdfFileError {
    fn from(e: tokio::task::JoinError) -> Self {
        PdfFileError::TaskFailed(e.to_string())
    }
}
