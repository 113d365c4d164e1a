//! Request input validation.
//!
//! Messages are user facing and are returned verbatim in error responses.

use thiserror::Error;

const MB: f64 = 1024.0 * 1024.0;

/// Input rejected before any document work starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The form has no presentation part.
    #[error("No PowerPoint file uploaded")]
    NoFile,

    /// The presentation part has an empty filename.
    #[error("No file selected")]
    NoFileSelected,

    /// The presentation's filename does not end in `.pptx`.
    #[error("File must be a .pptx PowerPoint file")]
    NotPptx,

    /// An upload exceeds its size ceiling.
    #[error("{what} too large: {:.2}MB (max: {:.1}MB)", megabytes(.size), megabytes(.max))]
    TooLarge {
        /// What was uploaded ("PowerPoint file" or "Image").
        what: &'static str,
        /// Actual size in bytes.
        size: u64,
        /// Ceiling in bytes.
        max: u64,
    },

    /// The layout name is missing or blank.
    #[error("Layout name is required")]
    LayoutRequired,

    /// The body text is missing or blank.
    #[error("Content text is required")]
    TextRequired,

    /// The image extension is not allow-listed.
    #[error("Invalid image format. Allowed: {allowed}")]
    InvalidImageFormat {
        /// Comma separated allow-list.
        allowed: String,
    },

    /// The position is below zero.
    #[error("Position cannot be negative")]
    NegativePosition,

    /// The position is not an integer.
    #[error("Position must be a valid number")]
    InvalidPosition,

    /// The request body exceeded the server's body limit.
    #[error("Upload too large: request body exceeds {limit} bytes")]
    RequestTooLarge {
        /// Body limit in bytes.
        limit: u64,
    },
}

fn megabytes(bytes: &u64) -> f64 {
    *bytes as f64 / MB
}

/// Parse the optional insertion position.
///
/// Absent or blank means 0. Surrounding whitespace and a leading `+` are
/// accepted; anything else that is not an integer is rejected.
pub fn parse_position(raw: Option<&str>) -> Result<usize, ValidationError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(0),
        Some(raw) => raw,
    };

    match raw.parse::<i64>() {
        Ok(value) if value < 0 => Err(ValidationError::NegativePosition),
        Ok(value) => Ok(usize::try_from(value).unwrap_or(usize::MAX)),
        // Integers too large for i64 are still positions; they clamp to the end.
        Err(_) if is_unsigned_integer(raw) => Ok(usize::MAX),
        Err(_) if raw.starts_with('-') && is_unsigned_integer(&raw[1..]) => {
            Err(ValidationError::NegativePosition)
        }
        Err(_) => Err(ValidationError::InvalidPosition),
    }
}

fn is_unsigned_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Whether a filename names a `.pptx` file (case-insensitive).
pub fn is_pptx_filename(filename: &str) -> bool {
    file_extension(filename).is_some_and(|ext| ext == "pptx")
}

/// Lowercased extension after the last dot, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Trim a text field, mapping blank input to `None`.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position(None), Ok(0));
        assert_eq!(parse_position(Some("")), Ok(0));
        assert_eq!(parse_position(Some(" 3 ")), Ok(3));
        assert_eq!(parse_position(Some("+2")), Ok(2));
        assert_eq!(parse_position(Some("999")), Ok(999));
        assert_eq!(
            parse_position(Some("99999999999999999999999")),
            Ok(usize::MAX)
        );
    }

    #[test]
    fn test_parse_position_rejects() {
        assert_eq!(
            parse_position(Some("-1")),
            Err(ValidationError::NegativePosition)
        );
        assert_eq!(
            parse_position(Some("-99999999999999999999999")),
            Err(ValidationError::NegativePosition)
        );
        assert_eq!(
            parse_position(Some("abc")),
            Err(ValidationError::InvalidPosition)
        );
        assert_eq!(
            parse_position(Some("1.5")),
            Err(ValidationError::InvalidPosition)
        );
        assert_eq!(parse_position(Some("+")), Err(ValidationError::InvalidPosition));
    }

    #[test]
    fn test_pptx_filename() {
        assert!(is_pptx_filename("deck.pptx"));
        assert!(is_pptx_filename("DECK.PPTX"));
        assert!(!is_pptx_filename("deck.ppt"));
        assert!(!is_pptx_filename("pptx"));
        assert!(!is_pptx_filename("deck.pptx.zip"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::TooLarge {
                what: "PowerPoint file",
                size: 60 * 1024 * 1024,
                max: 50 * 1024 * 1024,
            }
            .to_string(),
            "PowerPoint file too large: 60.00MB (max: 50.0MB)"
        );
        assert_eq!(
            ValidationError::RequestTooLarge { limit: 1024 }.to_string(),
            "Upload too large: request body exceeds 1024 bytes"
        );
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Title ")), Some("Title"));
        assert_eq!(non_blank(Some(" \n ")), None);
        assert_eq!(non_blank(None), None);
    }
}
