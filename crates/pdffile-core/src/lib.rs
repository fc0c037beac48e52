//! Interchangeable PDF representations
//!
//! A [`PdfFile`] can be read as raw bytes, as a structural `lopdf::Document`,
//! or as a [`ParsedPdf`] for content extraction, whichever it currently holds.
//! Conversions happen on demand and the result is cached on the file:
//!
//! - `raw_bytes`: serialize / export the cached model
//! - `structural`: load bytes with lopdf (metadata untouched)
//! - `parsed`: load bytes for page info and text extraction

pub mod error;
pub mod file;
pub mod parsed;
pub mod representation;
pub mod schema;
pub mod structural;
pub mod upload;

pub use error::PdfFileError;
pub use file::{ConversionStats, PdfFile};
pub use parsed::{DocumentInfo, PageInfo, ParsedPdf};
pub use representation::{Representation, RepresentationKind};
pub use schema::{ListSchema, PdfFileSchema, Schema};
pub use structural::{load_document, page_count, save_document, LoadOptions};
pub use upload::UploadedFile;
