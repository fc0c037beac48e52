//! The three interchangeable shapes a PDF can be held in

use std::fmt;

use lopdf::Document;
use serde::{Deserialize, Serialize};

use crate::parsed::ParsedPdf;

/// Identifies which representation a [`crate::PdfFile`] currently caches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepresentationKind {
    /// Byte-exact serialization of the document
    RawBytes,
    /// Editable object graph (`lopdf::Document`)
    Structural,
    /// Extraction-oriented model ([`ParsedPdf`])
    Parsed,
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepresentationKind::RawBytes => write!(f, "raw_bytes"),
            RepresentationKind::Structural => write!(f, "structural"),
            RepresentationKind::Parsed => write!(f, "parsed"),
        }
    }
}

/// A live representation of a PDF document
///
/// The variant is the kind, so the tag and the payload can never disagree.
#[derive(Debug)]
pub enum Representation {
    RawBytes(Vec<u8>),
    Structural(Box<Document>),
    Parsed(ParsedPdf),
}

impl Representation {
    pub fn kind(&self) -> RepresentationKind {
        match self {
            Representation::RawBytes(_) => RepresentationKind::RawBytes,
            Representation::Structural(_) => RepresentationKind::Structural,
            Representation::Parsed(_) => RepresentationKind::Parsed,
        }
    }

    pub fn as_raw_bytes(&self) -> Option<&[u8]> {
        match self {
            Representation::RawBytes(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    pub fn as_structural(&self) -> Option<&Document> {
        match self {
            Representation::Structural(doc) => Some(&**doc),
            _ => None,
        }
    }

    pub fn as_structural_mut(&mut self) -> Option<&mut Document> {
        match self {
            Representation::Structural(doc) => Some(&mut **doc),
            _ => None,
        }
    }

    pub fn as_parsed(&self) -> Option<&ParsedPdf> {
        match self {
            Representation::Parsed(parsed) => Some(parsed),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for Representation {
    fn from(bytes: Vec<u8>) -> Self {
        Representation::RawBytes(bytes)
    }
}

impl From<Document> for Representation {
    fn from(doc: Document) -> Self {
        Representation::Structural(Box::new(doc))
    }
}

impl From<ParsedPdf> for Representation {
    fn from(parsed: ParsedPdf) -> Self {
        Representation::Parsed(parsed)
    }
}
