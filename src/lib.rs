//! # slidemaker
//!
//! Insert slides into PowerPoint presentations by layout name.
//!
//! This library opens a `.pptx` package, builds a new slide from one of the
//! first slide master's layouts, fills in a title, body text and an optional
//! image, moves the slide to the requested position and writes the package
//! back out.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slidemaker::{add_slide, Limits, SlideRequest};
//!
//! let deck = std::fs::read("deck.pptx")?;
//! let request = SlideRequest::new("Title and Content", "Revenue grew 12%")
//!     .with_title("Q3 Results")
//!     .at_position(1);
//!
//! let insertion = add_slide(deck, &request, &Limits::default())?;
//! std::fs::write("deck-updated.pptx", &insertion.bytes)?;
//! println!("used layout {}", insertion.report.layout_used);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Listing Layouts
//!
//! ```no_run
//! use slidemaker::{list_layouts, Limits};
//!
//! let listing = list_layouts(std::fs::read("deck.pptx")?, &Limits::default())?;
//! for layout in &listing.layouts {
//!     println!("{}: {} ({})", layout.index, layout.name, layout.layout_type);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Lower-Level Editing
//!
//! [`Presentation`] and [`Slide`] expose the individual steps (adding,
//! moving and filling slides) for callers that need more control than
//! [`add_slide`] gives.

pub mod config;
pub mod container;
pub mod content_types;
pub mod detect;
pub mod error;
pub mod insert;
pub mod pptx;
#[cfg(any(test, feature = "testing"))]
pub mod sample;
pub mod units;
pub mod validate;
pub mod xml;

// Re-exports
pub use config::Limits;
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use detect::{detect_format, FormatType};
pub use error::{Error, Result};
pub use insert::{
    add_slide, list_layouts, ContentPlacement, ImageOutcome, ImageUpload, InsertReport,
    LayoutListing, PositionOutcome, SlideInsertion, SlideRequest, TitleOutcome,
};
pub use pptx::{LayoutInfo, LayoutMatch, Presentation, Slide};
pub use validate::ValidationError;

use std::path::Path;

/// Insert a slide into the presentation at `input` and write the result to `output`.
///
/// # Example
///
/// ```no_run
/// use slidemaker::{add_slide_to_file, Limits, SlideRequest};
///
/// let request = SlideRequest::new("Blank", "Notes for later");
/// let report = add_slide_to_file("deck.pptx", "deck-out.pptx", &request, &Limits::default())?;
/// println!("slide {} of {}", report.position.applied + 1, report.total_slides);
/// # Ok::<(), slidemaker::Error>(())
/// ```
pub fn add_slide_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    request: &SlideRequest,
    limits: &Limits,
) -> Result<InsertReport> {
    let document = std::fs::read(input.as_ref())?;
    let insertion = add_slide(document, request, limits)?;
    std::fs::write(output.as_ref(), &insertion.bytes)?;
    Ok(insertion.report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleDeck;

    #[test]
    fn test_add_slide_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pptx");
        let output = dir.path().join("out.pptx");
        std::fs::write(&input, SampleDeck::new().slides(1).build().unwrap()).unwrap();

        let request = SlideRequest::new("Section Header", "Part two").with_title("Two");
        let report = add_slide_to_file(&input, &output, &request, &Limits::default()).unwrap();
        assert_eq!(report.total_slides, 2);

        let presentation = Presentation::open(&output).unwrap();
        assert_eq!(presentation.slide(0).unwrap().title().as_deref(), Some("Two"));
        assert_eq!(presentation.slide(1).unwrap().title().as_deref(), Some("Slide 1"));
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = add_slide_to_file(
            dir.path().join("nope.pptx"),
            dir.path().join("out.pptx"),
            &SlideRequest::new("Blank", "x"),
            &Limits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
