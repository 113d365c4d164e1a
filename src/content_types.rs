//! `[Content_Types].xml`: default (by extension) and override (by part name)
//! content types of a package.

use crate::error::{Error, Result};
use crate::xml::{Element, XmlDocument};

/// Part name of the content types stream.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Content type of a slide part.
pub const SLIDE_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// Parsed content types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Parse the content types stream.
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = XmlDocument::parse(xml)?;
        if !doc.root.is("Types") {
            return Err(Error::InvalidData(format!(
                "unexpected content types root <{}>",
                doc.root.name
            )));
        }

        let mut types = Self::default();
        for element in doc.root.elements() {
            match element.local_name() {
                "Default" => {
                    if let (Some(ext), Some(ct)) =
                        (element.attr("Extension"), element.attr("ContentType"))
                    {
                        types.defaults.push((ext.to_string(), ct.to_string()));
                    }
                }
                "Override" => {
                    if let (Some(part), Some(ct)) =
                        (element.attr("PartName"), element.attr("ContentType"))
                    {
                        types.overrides.push((part.to_string(), ct.to_string()));
                    }
                }
                _ => {}
            }
        }
        Ok(types)
    }

    /// Content type registered for a part, override first.
    ///
    /// `part` is a package part name without the leading slash.
    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        let part_name = format!("/{}", part.trim_start_matches('/'));
        if let Some((_, ct)) = self
            .overrides
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&part_name))
        {
            return Some(ct);
        }

        let ext = part.rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, ct)| ct.as_str())
    }

    /// Part names (without leading slash) overridden with `content_type`.
    pub fn parts_with_type(&self, content_type: &str) -> Vec<String> {
        self.overrides
            .iter()
            .filter(|(_, ct)| ct == content_type)
            .map(|(name, _)| name.trim_start_matches('/').to_string())
            .collect()
    }

    /// Register an override for a part, replacing an existing one.
    pub fn add_override(&mut self, part: &str, content_type: &str) {
        let part_name = format!("/{}", part.trim_start_matches('/'));
        match self
            .overrides
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&part_name))
        {
            Some(existing) => existing.1 = content_type.to_string(),
            None => self
                .overrides
                .push((part_name, content_type.to_string())),
        }
    }

    /// Register a default for an extension unless one exists.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        if !self
            .defaults
            .iter()
            .any(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        {
            self.defaults
                .push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Build the XML tree.
    pub fn to_document(&self) -> XmlDocument {
        let mut root = Element::new("Types").with_attr("xmlns", CONTENT_TYPES_NS);
        for (ext, ct) in &self.defaults {
            root.push(
                Element::new("Default")
                    .with_attr("Extension", ext.as_str())
                    .with_attr("ContentType", ct.as_str()),
            );
        }
        for (part, ct) in &self.overrides {
            root.push(
                Element::new("Override")
                    .with_attr("PartName", part.as_str())
                    .with_attr("ContentType", ct.as_str()),
            );
        }
        XmlDocument::new(root)
    }
}
