//! PowerPoint (PPTX) presentations.
//!
//! A [`Presentation`] is opened from bytes, slides are added from one of the
//! first master's layouts, edited through [`Slide`], and the package is
//! written back out. Only the parts that change are re-serialized; every other
//! entry is carried through byte for byte.

pub mod image;
pub mod layout;
pub mod placeholder;
pub mod presentation;
pub mod slide;
mod text;

pub use self::image::{Crop, ImageData};
pub use layout::{resolve_layout, LayoutInfo, LayoutMatch, SlideLayout, SlideMaster};
pub use placeholder::{Extent, Placeholder, PlaceholderKind, ShapeElement};
pub use presentation::Presentation;
pub use slide::Slide;

/// XML namespaces.
pub(crate) mod ns {
    pub const PRESENTATION: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
    pub const DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
    pub const RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
}

/// Relationship types.
pub(crate) mod rel_type {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
}
