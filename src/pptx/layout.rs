//! Slide masters, slide layouts and layout resolution by name.

use super::placeholder::Placeholder;
use crate::xml::XmlDocument;
use serde::Serialize;
use tracing::debug;

/// A slide layout (`ppt/slideLayouts/slideLayoutN.xml`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideLayout {
    /// Position in the master's `p:sldLayoutIdLst`.
    pub index: usize,
    /// `p:cSld/@name`, empty when unnamed.
    pub name: String,
    /// `p:sldLayout/@type` when declared (`title`, `obj`, `blank`, ...).
    pub layout_type: Option<String>,
    /// Package part name, without the leading slash.
    pub part_name: String,
    /// Placeholders in document order.
    pub placeholders: Vec<Placeholder>,
}

impl SlideLayout {
    /// Read a layout part.
    pub fn from_document(index: usize, part_name: &str, doc: &XmlDocument) -> Self {
        let name = doc
            .root
            .child("cSld")
            .and_then(|c_sld| c_sld.attr("name"))
            .unwrap_or_default()
            .to_string();
        let placeholders = doc
            .root
            .path(&["cSld", "spTree"])
            .map(Placeholder::collect)
            .unwrap_or_default();

        Self {
            index,
            name,
            layout_type: doc.root.attr("type").map(str::to_string),
            part_name: part_name.to_string(),
            placeholders,
        }
    }

    /// Whether any placeholder takes body text.
    pub fn has_content_placeholder(&self) -> bool {
        self.placeholders
            .iter()
            .any(|ph| ph.kind.accepts_body_text())
    }

    /// Placeholders copied onto a slide created from this layout.
    pub fn cloneable_placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.placeholders
            .iter()
            .filter(|ph| !ph.kind.is_footer_like())
    }

    /// Summary used by the layout listing.
    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            index: self.index,
            name: self.name.clone(),
            layout_type: self
                .layout_type
                .clone()
                .unwrap_or_else(|| "custom".to_string()),
        }
    }
}

/// A slide master and its layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideMaster {
    pub part_name: String,
    pub layouts: Vec<SlideLayout>,
    pub placeholders: Vec<Placeholder>,
}

impl SlideMaster {
    /// Whether `part_name` is one of this master's layouts.
    pub fn owns_layout(&self, part_name: &str) -> bool {
        self.layouts.iter().any(|layout| layout.part_name == part_name)
    }
}

/// Layout metadata as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutInfo {
    pub index: usize,
    pub name: String,
    /// Declared layout type, or `custom`.
    #[serde(rename = "type")]
    pub layout_type: String,
}

/// Which resolution tier selected a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMatch {
    /// Case-sensitive name equality.
    Exact,
    /// Case-insensitive substring of the layout name.
    Partial,
    /// No name matched; first layout with a body or object placeholder.
    ContentFallback,
    /// No name matched and no layout has content; the first layout.
    FirstFallback,
}

impl LayoutMatch {
    /// Whether the layout was chosen without regard to the requested name.
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::ContentFallback | Self::FirstFallback)
    }
}

/// Pick a layout for `requested`.
///
/// Returns `None` only when `layouts` is empty.
pub fn resolve_layout<'a>(
    layouts: &'a [SlideLayout],
    requested: &str,
) -> Option<(&'a SlideLayout, LayoutMatch)> {
    if let Some(layout) = layouts.iter().find(|layout| layout.name == requested) {
        return Some((layout, LayoutMatch::Exact));
    }

    let needle = requested.to_lowercase();
    if let Some(layout) = layouts
        .iter()
        .find(|layout| layout.name.to_lowercase().contains(&needle))
    {
        debug!(requested, layout = %layout.name, "partial layout match");
        return Some((layout, LayoutMatch::Partial));
    }

    if let Some(layout) = layouts.iter().find(|layout| layout.has_content_placeholder()) {
        return Some((layout, LayoutMatch::ContentFallback));
    }

    layouts
        .first()
        .map(|layout| (layout, LayoutMatch::FirstFallback))
}
