//! Validation hooks for request schemas
//!
//! Values arrive type-erased from the validation layer; a schema either
//! recovers the concrete type or rejects the value.

use std::any::Any;

use crate::error::PdfFileError;
use crate::file::PdfFile;

/// A validation rule over type-erased values
pub trait Schema {
    type Output;

    fn validate(&self, value: Box<dyn Any + Send>) -> Result<Self::Output, PdfFileError>;
}

/// Accepts only [`PdfFile`] instances
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfFileSchema;

impl PdfFileSchema {
    /// Predicate form of the rule
    pub fn is_pdf_file(value: &dyn Any) -> bool {
        value.is::<PdfFile>()
    }
}

impl Schema for PdfFileSchema {
    type Output = PdfFile;

    fn validate(&self, value: Box<dyn Any + Send>) -> Result<PdfFile, PdfFileError> {
        value
            .downcast::<PdfFile>()
            .map(|file| *file)
            .map_err(|_| PdfFileError::InvalidDocumentValue("value is not a PdfFile".into()))
    }
}

/// Applies an item schema to every element of a list
#[derive(Debug, Clone, Copy, Default)]
pub struct ListSchema<S> {
    item: S,
}

impl<S> ListSchema<S> {
    pub fn new(item: S) -> Self {
        Self { item }
    }
}

impl<S: Schema> Schema for ListSchema<S> {
    type Output = Vec<S::Output>;

    fn validate(&self, value: Box<dyn Any + Send>) -> Result<Self::Output, PdfFileError> {
        let items = value
            .downcast::<Vec<Box<dyn Any + Send>>>()
            .map_err(|_| PdfFileError::InvalidDocumentValue("value is not a list".into()))?;

        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                self.item.validate(item).map_err(|e| match e {
                    PdfFileError::InvalidDocumentValue(msg) => {
                        PdfFileError::InvalidDocumentValue(format!("[{}]: {}", i, msg))
                    }
                    other => other,
                })
            })
            .collect()
    }
}
