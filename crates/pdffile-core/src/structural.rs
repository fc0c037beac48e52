//! Structural model adapter backed by lopdf
//!
//! Loading never touches document metadata unless the caller opts in with
//! [`LoadOptions::update_metadata`].

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object};
use serde::Deserialize;
use tracing::{trace, warn};

use crate::error::PdfFileError;

/// Producer string written when metadata updates are enabled
pub const PRODUCER: &str = concat!("pdffile-core ", env!("CARGO_PKG_VERSION"));

/// Options for loading bytes into a structural model
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Stamp `Producer`, `ModDate` and `CreationDate` (when missing) into the
    /// Info dictionary after loading
    pub update_metadata: bool,
}

/// Load raw bytes into a structural model
pub fn load_document(bytes: &[u8], options: &LoadOptions) -> Result<Document, PdfFileError> {
    let mut doc =
        Document::load_mem(bytes).map_err(|e| PdfFileError::ParseError(e.to_string()))?;

    strip_xref_streams(&mut doc);

    if options.update_metadata {
        stamp_metadata(&mut doc, Utc::now());
    }

    Ok(doc)
}

/// Serialize a structural model back to bytes
///
/// Saving what [`load_document`] returned reproduces the loaded bytes.
pub fn save_document(doc: &mut Document) -> Result<Vec<u8>, PdfFileError> {
    strip_xref_streams(doc);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfFileError::SerializationError(format!("Save failed: {}", e)))?;
    Ok(buffer)
}

/// Parse PDF bytes and return page count
pub fn page_count(bytes: &[u8]) -> Result<u32, PdfFileError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfFileError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}

/// Remove cross-reference streams kept from a previous load
///
/// The writer emits a fresh XRef stream after the highest object id, so a
/// stale one would shift every id on the next save.
fn strip_xref_streams(doc: &mut Document) {
    let before = doc.objects.len();
    doc.objects.retain(|_, obj| !is_xref_stream(obj));

    if doc.objects.len() != before {
        doc.max_id = doc.objects.keys().map(|&(id, _)| id).max().unwrap_or(0);
        trace!(
            removed = before - doc.objects.len(),
            max_id = doc.max_id,
            "Dropped XRef streams"
        );
    }
}

fn is_xref_stream(obj: &Object) -> bool {
    match obj {
        Object::Stream(stream) => matches!(
            stream.dict.get(b"Type"),
            Ok(Object::Name(name)) if name.as_slice() == b"XRef"
        ),
        _ => false,
    }
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSSZ`)
fn pdf_date(at: DateTime<Utc>) -> String {
    at.format("D:%Y%m%d%H%M%SZ").to_string()
}

fn stamp_metadata(doc: &mut Document, at: DateTime<Utc>) {
    let info_id = match doc.trailer.get(b"Info").and_then(Object::as_reference) {
        Ok(id) => id,
        Err(_) => {
            let id = doc.add_object(Dictionary::new());
            doc.trailer.set("Info", Object::Reference(id));
            id
        }
    };

    let stamp = pdf_date(at);
    match doc.get_object_mut(info_id).and_then(Object::as_dict_mut) {
        Ok(info) => {
            info.set("Producer", Object::string_literal(PRODUCER));
            info.set("ModDate", Object::string_literal(stamp.clone()));
            if !info.has(b"CreationDate") {
                info.set("CreationDate", Object::string_literal(stamp));
            }
        }
        Err(e) => {
            warn!(error = %e, "Info entry is not a dictionary, metadata left as-is");
        }
    }
}
