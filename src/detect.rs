//! Format detection for Office Open XML packages.
//!
//! Uploads are only trusted after the archive's `[Content_Types].xml` says it
//! is a presentation; Word and Excel packages are rejected by name.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Content type for DOCX main document part.
const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";

/// Content type for XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Content type for PPTX presentation part.
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

/// Macro-enabled and template presentations share the presentation part layout.
const PPTX_VARIANT_CONTENT_TYPES: [&str; 3] = [
    "application/vnd.ms-powerpoint.presentation.macroEnabled.main+xml",
    "application/vnd.openxmlformats-officedocument.presentationml.template.main+xml",
    "application/vnd.ms-powerpoint.template.macroEnabled.main+xml",
];

/// Detected Office document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Microsoft Word document (.docx)
    Docx,
    /// Microsoft Excel workbook (.xlsx)
    Xlsx,
    /// Microsoft PowerPoint presentation (.pptx)
    Pptx,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Docx => "docx",
            FormatType::Xlsx => "xlsx",
            FormatType::Pptx => "pptx",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Docx => "Word Document",
            FormatType::Xlsx => "Excel Workbook",
            FormatType::Pptx => "PowerPoint Presentation",
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the format of an opened package.
///
/// Inspects `[Content_Types].xml` first and falls back to the top-level
/// folder layout when the content types are inconclusive.
pub fn detect_format(container: &OoxmlContainer) -> Result<FormatType> {
    let content_types = container.read_xml("[Content_Types].xml")?;

    if content_types.contains(PPTX_CONTENT_TYPE)
        || PPTX_VARIANT_CONTENT_TYPES
            .iter()
            .any(|ct| content_types.contains(ct))
    {
        Ok(FormatType::Pptx)
    } else if content_types.contains(DOCX_CONTENT_TYPE) {
        Ok(FormatType::Docx)
    } else if content_types.contains(XLSX_CONTENT_TYPE) {
        Ok(FormatType::Xlsx)
    } else {
        detect_by_folder_structure(&container.list_files())
    }
}

/// Fallback detection by checking folder structure.
fn detect_by_folder_structure(names: &[String]) -> Result<FormatType> {
    let has_word = names.iter().any(|n| n.starts_with("word/"));
    let has_xl = names.iter().any(|n| n.starts_with("xl/"));
    let has_ppt = names.iter().any(|n| n.starts_with("ppt/"));

    match (has_word, has_xl, has_ppt) {
        (true, false, false) => Ok(FormatType::Docx),
        (false, true, false) => Ok(FormatType::Xlsx),
        (false, false, true) => Ok(FormatType::Pptx),
        _ => Err(Error::UnknownFormat),
    }
}

/// Fail unless the package is a presentation.
pub fn ensure_presentation(container: &OoxmlContainer) -> Result<()> {
    match detect_format(container)? {
        FormatType::Pptx => Ok(()),
        other => Err(Error::UnsupportedFormat(format!(
            "expected a PowerPoint Presentation, found a {}",
            other
        ))),
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleDeck;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn package(entries: &[(&str, &str)]) -> OoxmlContainer {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, body) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        let bytes = zip.finish().unwrap().into_inner();
        OoxmlContainer::from_bytes(bytes, u64::MAX).unwrap()
    }

    #[test]
    fn test_format_type_display() {
        assert_eq!(FormatType::Docx.to_string(), "Word Document");
        assert_eq!(FormatType::Xlsx.to_string(), "Excel Workbook");
        assert_eq!(FormatType::Pptx.to_string(), "PowerPoint Presentation");
    }

    #[test]
    fn test_format_type_extension() {
        assert_eq!(FormatType::Docx.extension(), "docx");
        assert_eq!(FormatType::Pptx.extension(), "pptx");
    }

    #[test]
    fn test_is_zip_file() {
        assert!(is_zip_file(&[0x50, 0x4B, 0x03, 0x04, 0x00]));
        assert!(!is_zip_file(&[0x00, 0x00, 0x00, 0x00]));
        assert!(!is_zip_file(&[0x50, 0x4B])); // Too short
    }

    #[test]
    fn test_detect_sample_presentation() {
        let bytes = SampleDeck::new().build().unwrap();
        assert!(is_zip_file(&bytes));
        let container = OoxmlContainer::from_bytes(bytes, u64::MAX).unwrap();
        assert_eq!(detect_format(&container).unwrap(), FormatType::Pptx);
        assert!(ensure_presentation(&container).is_ok());
    }

    #[test]
    fn test_word_package_is_rejected() {
        let container = package(&[(
            "[Content_Types].xml",
            r#"<Types><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
        )]);
        assert_eq!(detect_format(&container).unwrap(), FormatType::Docx);
        let err = ensure_presentation(&container).unwrap_err();
        assert!(err.to_string().contains("Word Document"));
    }

    #[test]
    fn test_folder_structure_fallback() {
        let container = package(&[
            ("[Content_Types].xml", "<Types/>"),
            ("ppt/presentation.xml", "<p:presentation/>"),
        ]);
        assert_eq!(detect_format(&container).unwrap(), FormatType::Pptx);

        let container = package(&[("[Content_Types].xml", "<Types/>"), ("misc.txt", "x")]);
        assert!(matches!(detect_format(&container), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_missing_content_types() {
        let container = package(&[("ppt/presentation.xml", "<p:presentation/>")]);
        assert!(matches!(
            detect_format(&container),
            Err(Error::MissingComponent(_))
        ));
    }
}
