//! Upload limits.

use crate::validate::{file_extension, ValidationError};
use serde::{Deserialize, Serialize};

const MB: u64 = 1024 * 1024;

/// Room for the non-file form fields and multipart framing.
const FORM_OVERHEAD_BYTES: u64 = MB;

/// Size ceilings and the image extension allow-list.
///
/// Immutable once built; the server shares one instance across requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest accepted presentation upload.
    pub max_document_bytes: u64,
    /// Largest accepted image upload.
    pub max_image_bytes: u64,
    /// Ceiling on the total uncompressed size of a presentation's entries.
    pub max_unpacked_bytes: u64,
    /// Lowercase image extensions accepted, in display order.
    pub allowed_image_extensions: Vec<String>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_document_bytes: 50 * MB,
            max_image_bytes: 10 * MB,
            max_unpacked_bytes: 512 * MB,
            allowed_image_extensions: ["png", "jpg", "jpeg", "gif", "bmp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Limits {
    /// Limits with the document and image ceilings given in megabytes.
    pub fn with_megabytes(document_mb: u64, image_mb: u64) -> Self {
        Self {
            max_document_bytes: document_mb.saturating_mul(MB),
            max_image_bytes: image_mb.saturating_mul(MB),
            ..Self::default()
        }
    }

    /// Largest request body that can carry both uploads.
    pub fn max_request_bytes(&self) -> u64 {
        self.max_document_bytes
            .saturating_add(self.max_image_bytes)
            .saturating_add(FORM_OVERHEAD_BYTES)
    }

    /// Reject a presentation larger than the document ceiling.
    pub fn check_document(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_document_bytes {
            return Err(ValidationError::TooLarge {
                what: "PowerPoint file",
                size,
                max: self.max_document_bytes,
            });
        }
        Ok(())
    }

    /// Reject an image with a disallowed extension or over the image ceiling.
    ///
    /// The extension is checked first, so a disallowed file never has its
    /// size reported.
    pub fn check_image(&self, filename: &str, size: u64) -> Result<(), ValidationError> {
        if !self.image_extension_allowed(filename) {
            return Err(ValidationError::InvalidImageFormat {
                allowed: self.allowed_image_extensions.join(", "),
            });
        }
        if size > self.max_image_bytes {
            return Err(ValidationError::TooLarge {
                what: "Image",
                size,
                max: self.max_image_bytes,
            });
        }
        Ok(())
    }

    /// Whether a filename carries an allow-listed image extension (case-insensitive).
    pub fn image_extension_allowed(&self, filename: &str) -> bool {
        file_extension(filename).is_some_and(|ext| {
            self.allowed_image_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = Limits::default();
        assert_eq!(limits.max_document_bytes, 52_428_800);
        assert_eq!(limits.max_image_bytes, 10_485_760);
        assert_eq!(limits.max_request_bytes(), 52_428_800 + 10_485_760 + 1_048_576);
    }

    #[test]
    fn test_huge_megabytes_saturate() {
        let limits = Limits::with_megabytes(u64::MAX, u64::MAX / 2);
        assert_eq!(limits.max_document_bytes, u64::MAX);
        assert_eq!(limits.max_image_bytes, u64::MAX);
        assert_eq!(limits.max_request_bytes(), u64::MAX);
    }

    #[test]
    fn test_document_ceiling() {
        let limits = Limits::default();
        assert!(limits.check_document(limits.max_document_bytes).is_ok());

        let err = limits
            .check_document(limits.max_document_bytes + 1)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "PowerPoint file too large: 50.00MB (max: 50.0MB)"
        );
    }

    #[test]
    fn test_image_checks() {
        let limits = Limits::default();
        assert!(limits.check_image("photo.PNG", 1024).is_ok());
        assert!(limits.check_image("archive.tar.jpeg", 1024).is_ok());

        let err = limits.check_image("photo.webp", 1024).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid image format. Allowed: png, jpg, jpeg, gif, bmp"
        );
        assert!(limits.check_image("noextension", 1024).is_err());

        let err = limits.check_image("big.png", 15 * MB).unwrap_err();
        assert_eq!(err.to_string(), "Image too large: 15.00MB (max: 10.0MB)");
    }

    #[test]
    fn test_deserialize_partial() {
        let limits: Limits = serde_json::from_str(r#"{"max_image_bytes": 5}"#).unwrap();
        assert_eq!(limits.max_image_bytes, 5);
        assert_eq!(limits.max_document_bytes, Limits::default().max_document_bytes);
    }

    #[test]
    fn test_with_megabytes() {
        let limits = Limits::with_megabytes(2, 1);
        assert_eq!(limits.max_document_bytes, 2 * MB);
        assert_eq!(limits.max_image_bytes, MB);
        assert_eq!(limits.allowed_image_extensions.len(), 5);
    }
}
