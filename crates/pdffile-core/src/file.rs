//! PDF file with a lazily converted, cached representation
//!
//! A [`PdfFile`] holds exactly one [`Representation`] at a time. Asking for a
//! different one converts, replaces the cached value, and returns it, so
//! reading can mutate the file. Repeating the same request is free.
//!
//! Conversions work on copies and only commit on success: a failed or
//! dropped conversion leaves the previous representation in place.

use lopdf::Document;
use serde::Serialize;
use tracing::{debug, error, instrument, trace};

use crate::error::PdfFileError;
use crate::parsed::ParsedPdf;
use crate::representation::{Representation, RepresentationKind};
use crate::structural::{load_document, save_document, LoadOptions};
use crate::upload::UploadedFile;

/// Number of underlying library calls a file has made
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Structural model serialized to bytes
    pub serializations: u32,
    /// Bytes exported from a parsed model
    pub data_exports: u32,
    /// Bytes loaded into a structural model
    pub structural_loads: u32,
    /// Bytes loaded into a parsed model
    pub parsed_loads: u32,
}

impl ConversionStats {
    pub fn total(&self) -> u32 {
        self.serializations + self.data_exports + self.structural_loads + self.parsed_loads
    }
}

#[derive(Debug)]
pub struct PdfFile {
    original_filename: String,
    filename: String,
    representation: Representation,
    stats: ConversionStats,
}

impl PdfFile {
    pub fn new(
        original_filename: impl Into<String>,
        representation: impl Into<Representation>,
    ) -> Self {
        let original_filename = original_filename.into();
        Self {
            filename: original_filename.clone(),
            original_filename,
            representation: representation.into(),
            stats: ConversionStats::default(),
        }
    }

    /// Create a file whose display name differs from the name it arrived with
    pub fn with_filename(
        original_filename: impl Into<String>,
        representation: impl Into<Representation>,
        filename: impl Into<String>,
    ) -> Self {
        let mut file = Self::new(original_filename, representation);
        file.filename = filename.into();
        file
    }

    pub fn from_upload(upload: UploadedFile) -> Self {
        Self::new(upload.original_filename, upload.buffer)
    }

    pub fn from_uploads(uploads: impl IntoIterator<Item = UploadedFile>) -> Vec<Self> {
        uploads.into_iter().map(Self::from_upload).collect()
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    /// Kind of the representation currently cached
    pub fn kind(&self) -> RepresentationKind {
        self.representation.kind()
    }

    pub fn representation(&self) -> &Representation {
        &self.representation
    }

    pub fn stats(&self) -> ConversionStats {
        self.stats
    }

    pub fn set_raw_bytes(&mut self, bytes: Vec<u8>) {
        self.representation = Representation::RawBytes(bytes);
    }

    pub fn set_structural(&mut self, doc: Document) {
        self.representation = Representation::Structural(Box::new(doc));
    }

    pub fn set_parsed(&mut self, parsed: ParsedPdf) {
        self.representation = Representation::Parsed(parsed);
    }

    /// Swap in a new representation, returning the previous one
    pub fn replace_representation(&mut self, representation: Representation) -> Representation {
        std::mem::replace(&mut self.representation, representation)
    }

    pub fn into_representation(self) -> Representation {
        self.representation
    }

    /// Return the representation of `kind`, converting and caching it first
    /// if a different one is held
    #[instrument(skip(self), fields(filename = %self.filename))]
    pub async fn get_or_convert(
        &mut self,
        kind: RepresentationKind,
    ) -> Result<&mut Representation, PdfFileError> {
        match kind {
            RepresentationKind::RawBytes => {
                self.raw_bytes().await?;
            }
            RepresentationKind::Structural => {
                self.structural().await?;
            }
            RepresentationKind::Parsed => {
                self.parsed().await?;
            }
        }
        Ok(&mut self.representation)
    }

    /// Raw bytes of the document
    ///
    /// A structural model is serialized, a parsed model exports its data.
    /// Either way the bytes replace the cached model.
    ///
    /// Serialization runs on a clone of the structural model so the cached
    /// one survives a failed or dropped call. Peak memory for that step is
    /// roughly twice the model size.
    pub async fn raw_bytes(&mut self) -> Result<&[u8], PdfFileError> {
        let current = self.representation.kind();
        let converted = match &self.representation {
            Representation::RawBytes(_) => None,
            Representation::Structural(doc) => {
                let mut doc = Document::clone(doc);
                let bytes = tokio::task::spawn_blocking(move || save_document(&mut doc)).await??;
                self.stats.serializations += 1;
                Some(bytes)
            }
            Representation::Parsed(parsed) => {
                let bytes = parsed.get_data().await;
                self.stats.data_exports += 1;
                Some(bytes)
            }
        };

        match converted {
            Some(bytes) => self.commit(Representation::RawBytes(bytes)),
            None => self.cache_hit(current),
        }

        let found = self.representation.kind();
        match self.representation.as_raw_bytes() {
            Some(bytes) => Ok(bytes),
            None => Err(unhandled(&self.filename, RepresentationKind::RawBytes, found)),
        }
    }

    /// Structural model of the document
    ///
    /// Loaded from [`raw_bytes`](Self::raw_bytes) with metadata updates
    /// disabled. The returned model can be edited in place.
    pub async fn structural(&mut self) -> Result<&mut Document, PdfFileError> {
        let current = self.representation.kind();
        if current == RepresentationKind::Structural {
            self.cache_hit(current);
        } else {
            let data = self.raw_bytes().await?.to_vec();
            let doc = tokio::task::spawn_blocking(move || {
                load_document(&data, &LoadOptions::default())
            })
            .await??;
            self.stats.structural_loads += 1;
            self.commit(Representation::Structural(Box::new(doc)));
        }

        let found = self.representation.kind();
        match self.representation.as_structural_mut() {
            Some(doc) => Ok(doc),
            None => Err(unhandled(&self.filename, RepresentationKind::Structural, found)),
        }
    }

    /// Parsed model of the document, loaded from [`raw_bytes`](Self::raw_bytes)
    pub async fn parsed(&mut self) -> Result<&ParsedPdf, PdfFileError> {
        let current = self.representation.kind();
        if current == RepresentationKind::Parsed {
            self.cache_hit(current);
        } else {
            let data = self.raw_bytes().await?.to_vec();
            let parsed = ParsedPdf::load(data).await?;
            self.stats.parsed_loads += 1;
            self.commit(Representation::Parsed(parsed));
        }

        let found = self.representation.kind();
        match self.representation.as_parsed() {
            Some(parsed) => Ok(parsed),
            None => Err(unhandled(&self.filename, RepresentationKind::Parsed, found)),
        }
    }

    fn commit(&mut self, representation: Representation) {
        debug!(
            filename = %self.filename,
            from = %self.representation.kind(),
            to = %representation.kind(),
            "Converted PDF representation"
        );
        self.representation = representation;
    }

    fn cache_hit(&self, kind: RepresentationKind) {
        trace!(filename = %self.filename, %kind, "PDF representation cache hit");
    }
}

fn unhandled(
    filename: &str,
    expected: RepresentationKind,
    found: RepresentationKind,
) -> PdfFileError {
    error!(
        filename,
        %expected,
        %found,
        "Unhandled PDF representation after conversion"
    );
    PdfFileError::UnhandledRepresentation { expected, found }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_filename_defaults_to_original() {
        let file = PdfFile::new("a.pdf", vec![1, 2, 3]);
        assert_eq!(file.original_filename(), "a.pdf");
        assert_eq!(file.filename(), "a.pdf");
        assert_eq!(file.kind(), RepresentationKind::RawBytes);
    }

    #[test]
    fn test_filename_override() {
        let mut file = PdfFile::with_filename("a.pdf", vec![1], "renamed.pdf");
        assert_eq!(file.original_filename(), "a.pdf");
        assert_eq!(file.filename(), "renamed.pdf");

        file.set_filename("b.pdf");
        assert_eq!(file.filename(), "b.pdf");
        assert_eq!(file.original_filename(), "a.pdf");
    }

    #[test]
    fn test_from_uploads_preserves_order() {
        let files = PdfFile::from_uploads(vec![
            UploadedFile::new("one.pdf", vec![1]),
            UploadedFile::new("two.pdf", vec![2]),
        ]);
        let names: Vec<&str> = files.iter().map(PdfFile::original_filename).collect();
        assert_eq!(names, vec!["one.pdf", "two.pdf"]);
        assert!(files.iter().all(|f| f.kind() == RepresentationKind::RawBytes));
    }

    #[test]
    fn test_replace_representation_returns_previous() {
        let mut file = PdfFile::new("a.pdf", vec![1, 2]);
        let previous = file.replace_representation(Representation::from(Document::new()));
        assert_eq!(previous.as_raw_bytes(), Some(&[1u8, 2][..]));
        assert_eq!(file.kind(), RepresentationKind::Structural);

        file.set_raw_bytes(vec![3]);
        assert_eq!(file.kind(), RepresentationKind::RawBytes);
    }

    #[test]
    fn test_set_structural_then_into_representation() {
        let mut file = PdfFile::new("a.pdf", vec![1]);
        file.set_structural(Document::with_version("1.5"));

        let rep = file.into_representation();
        assert_eq!(rep.as_structural().map(|doc| doc.version.as_str()), Some("1.5"));
    }

    #[tokio::test]
    async fn test_cached_raw_bytes_need_no_conversion() {
        let mut file = PdfFile::new("a.pdf", b"not really a pdf".to_vec());
        assert_eq!(file.raw_bytes().await.unwrap(), b"not really a pdf");
        assert_eq!(file.stats().total(), 0);
    }

    #[tokio::test]
    async fn test_get_or_convert_returns_requested_kind() {
        let mut file = PdfFile::new("a.pdf", vec![9, 9]);
        let rep = file
            .get_or_convert(RepresentationKind::RawBytes)
            .await
            .unwrap();
        assert_eq!(rep.kind(), RepresentationKind::RawBytes);
    }

    #[test]
    fn test_unhandled_error_message() {
        let err = unhandled(
            "a.pdf",
            RepresentationKind::Parsed,
            RepresentationKind::RawBytes,
        );
        assert_eq!(
            err.to_string(),
            "Unhandled PDF representation: expected parsed, found raw_bytes"
        );
    }
}
