//! Parsed, extraction-oriented PDF model
//!
//! Holds the exact bytes it was loaded from together with page geometry and
//! document info read through lopdf. Text is extracted with pdf-extract on
//! first request and memoized.

use std::sync::Arc;

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::PdfFileError;

/// US Letter, used when no MediaBox can be resolved
const DEFAULT_PAGE_SIZE: (f64, f64) = (612.0, 792.0);

/// Limit on Parent hops when resolving inherited page attributes
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Geometry of a single page
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageInfo {
    /// 1-indexed page number
    pub number: u32,
    pub width: f64,
    pub height: f64,
}

/// Entries of the document Info dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

/// A loaded PDF ready for content extraction
#[derive(Debug)]
pub struct ParsedPdf {
    data: Arc<[u8]>,
    version: String,
    encrypted: bool,
    pages: Vec<PageInfo>,
    info: DocumentInfo,
    text: OnceCell<String>,
}

impl ParsedPdf {
    /// Load a document from raw bytes
    ///
    /// Parsing runs on the blocking pool; a panic inside the parser is
    /// reported as [`PdfFileError::TaskFailed`].
    pub async fn load(data: Vec<u8>) -> Result<Self, PdfFileError> {
        let data: Arc<[u8]> = data.into();
        let source = Arc::clone(&data);
        let (version, encrypted, pages, info) =
            tokio::task::spawn_blocking(move || read_structure(&source)).await??;

        debug!(pages = pages.len(), bytes = data.len(), "Parsed PDF loaded");

        Ok(Self {
            data,
            version,
            encrypted,
            pages,
            info,
            text: OnceCell::new(),
        })
    }

    /// Export the exact bytes this model was loaded from
    pub async fn get_data(&self) -> Vec<u8> {
        self.data.to_vec()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page geometry for a 1-indexed page number
    pub fn page(&self, number: u32) -> Option<&PageInfo> {
        self.pages.iter().find(|p| p.number == number)
    }

    pub fn pages(&self) -> &[PageInfo] {
        &self.pages
    }

    pub fn info(&self) -> &DocumentInfo {
        &self.info
    }

    /// PDF version from the file header (e.g. "1.7")
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Full document text, extracted once
    pub async fn text(&self) -> Result<&str, PdfFileError> {
        let text = self
            .text
            .get_or_try_init(|| async {
                let data = Arc::clone(&self.data);
                tokio::task::spawn_blocking(move || {
                    pdf_extract::extract_text_from_mem(&data)
                        .map_err(|e| PdfFileError::ExtractionError(e.to_string()))
                })
                .await?
            })
            .await?;
        Ok(text.as_str())
    }
}

type Structure = (String, bool, Vec<PageInfo>, DocumentInfo);

fn read_structure(data: &[u8]) -> Result<Structure, PdfFileError> {
    let doc = Document::load_mem(data).map_err(|e| PdfFileError::ExtractionError(e.to_string()))?;

    let pages = doc
        .get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            let (width, height) = page_size(&doc, page_id);
            PageInfo {
                number,
                width,
                height,
            }
        })
        .collect();

    Ok((
        doc.version.clone(),
        doc.is_encrypted(),
        pages,
        read_info(&doc),
    ))
}

/// Resolve the page size from its MediaBox, walking up the page tree
fn page_size(doc: &Document, page_id: ObjectId) -> (f64, f64) {
    let mut current = doc.get_dictionary(page_id).ok();

    for _ in 0..MAX_INHERITANCE_DEPTH {
        let Some(dict) = current else { break };

        if let Some(rect) = dict.get(b"MediaBox").ok().and_then(|obj| parse_rect(doc, obj)) {
            return (rect[2] - rect[0], rect[3] - rect[1]);
        }

        current = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }

    DEFAULT_PAGE_SIZE
}

fn parse_rect(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let arr = match obj {
        Object::Array(a) => a,
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
        _ => return None,
    };

    if arr.len() != 4 {
        return None;
    }

    let mut values = [0.0f64; 4];
    for (slot, obj) in values.iter_mut().zip(arr) {
        *slot = number(doc, obj)?;
    }
    Some(values)
}

fn number(doc: &Document, obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        Object::Reference(id) => match doc.get_object(*id).ok()? {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r as f64),
            _ => None,
        },
        _ => None,
    }
}

fn read_info(doc: &Document) -> DocumentInfo {
    let Some(info) = doc
        .trailer
        .get(b"Info")
        .and_then(|obj| match obj {
            Object::Reference(id) => doc.get_dictionary(*id),
            other => other.as_dict(),
        })
        .ok()
    else {
        return DocumentInfo::default();
    };

    DocumentInfo {
        title: text_entry(info, b"Title"),
        author: text_entry(info, b"Author"),
        subject: text_entry(info, b"Subject"),
        creator: text_entry(info, b"Creator"),
        producer: text_entry(info, b"Producer"),
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, otherwise lossy UTF-8)
fn text_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let bytes = dict.get(key).ok()?.as_str().ok()?;

    let decoded = if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}
