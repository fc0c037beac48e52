use serde::Deserialize;

/// A file handed over by an upload layer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    /// Name the client sent the file under
    pub original_filename: String,
    pub buffer: Vec<u8>,
}

impl UploadedFile {
    pub fn new(original_filename: impl Into<String>, buffer: Vec<u8>) -> Self {
        Self {
            original_filename: original_filename.into(),
            buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploaded_file_deserializes() {
        let json = r#"{"original_filename":"a.pdf","buffer":[37,80,68,70]}"#;
        let file: UploadedFile = serde_json::from_str(json).unwrap();
        assert_eq!(file, UploadedFile::new("a.pdf", b"%PDF".to_vec()));
    }
}
