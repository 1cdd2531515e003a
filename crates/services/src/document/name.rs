use std::fmt;

use crate::error::DocumentNameError;

const ACCEPTED_EXTENSIONS: [&str; 2] = [".docx", ".doc"];

/// File name of a Word document, checked before any upload is attempted.
///
/// The extension check is case-sensitive: `exam.DOCX` is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName(String);

impl DocumentName {
    /// # Errors
    ///
    /// Returns `DocumentNameError::Empty` for a blank name and
    /// `DocumentNameError::UnsupportedExtension` for anything but `.docx`/`.doc`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, DocumentNameError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(DocumentNameError::Empty);
        }
        if !ACCEPTED_EXTENSIONS.iter().any(|ext| raw.ends_with(ext)) {
            return Err(DocumentNameError::UnsupportedExtension(raw));
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw document bytes plus the validated name they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    pub name: DocumentName,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    #[must_use]
    pub fn new(name: DocumentName, bytes: Vec<u8>) -> Self {
        Self { name, bytes }
    }
}
