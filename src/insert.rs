//! The slide insertion pipeline.
//!
//! validate → open → resolve layout → add slide → reposition → title →
//! body content → image → serialize. Repositioning, title and image failures
//! are logged and reported but never fail the request; a body that cannot be
//! placed anywhere does.

use crate::config::Limits;
use crate::error::{Error, Result};
use crate::pptx::rel_type;
use crate::pptx::{
    resolve_layout, Extent, ImageData, LayoutInfo, LayoutMatch, Placeholder, PlaceholderKind,
    Presentation, Slide,
};
use crate::units::inches;
use crate::validate::{non_blank, ValidationError};
use serde::Serialize;
use tracing::{debug, info, warn};

/// An image file uploaded alongside the request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// What to put on the new slide and where.
#[derive(Debug, Clone)]
pub struct SlideRequest {
    layout: String,
    title: Option<String>,
    text: String,
    image: Option<ImageUpload>,
    position: usize,
}

impl SlideRequest {
    /// A request for a slide on `layout` holding `text`, inserted first.
    ///
    /// Inputs are trimmed.
    pub fn new(layout: impl AsRef<str>, text: impl AsRef<str>) -> Self {
        Self {
            layout: layout.as_ref().trim().to_string(),
            title: None,
            text: text.as_ref().trim().to_string(),
            image: None,
            position: 0,
        }
    }

    /// Set the title; blank titles are ignored.
    pub fn with_title(mut self, title: impl AsRef<str>) -> Self {
        self.title = non_blank(Some(title.as_ref())).map(str::to_string);
        self
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Requested slide index; clamped to the slide count when applied.
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> Option<&ImageUpload> {
        self.image.as_ref()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Check the request's own fields: layout, text, then the image.
    pub fn validate(&self, limits: &Limits) -> std::result::Result<(), ValidationError> {
        if self.layout.is_empty() {
            return Err(ValidationError::LayoutRequired);
        }
        if self.text.is_empty() {
            return Err(ValidationError::TextRequired);
        }
        if let Some(image) = &self.image {
            limits.check_image(&image.filename, image.data.len() as u64)?;
        }
        Ok(())
    }
}

/// Where the new slide ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionOutcome {
    pub requested: usize,
    pub applied: usize,
    pub moved: bool,
}

/// What happened to the title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TitleOutcome {
    /// No title was requested.
    Skipped,
    Set,
    /// The layout has no title placeholder.
    NoPlaceholder,
    Failed { reason: String },
}

/// Where the body text went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentPlacement {
    Placeholder { name: String },
    TextBox { name: String },
}

/// What happened to the image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImageOutcome {
    /// No image was uploaded.
    Skipped,
    Placeholder { name: String },
    Shape { name: String },
    Failed { reason: String },
}

/// Per-step outcome of an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertReport {
    pub layout_requested: String,
    pub layout_used: String,
    pub layout_match: LayoutMatch,
    pub position: PositionOutcome,
    pub title: TitleOutcome,
    pub content: ContentPlacement,
    pub image: ImageOutcome,
    pub total_slides: usize,
}

/// The modified presentation and how it was built.
#[derive(Debug, Clone)]
pub struct SlideInsertion {
    pub bytes: Vec<u8>,
    pub report: InsertReport,
}

/// Layouts of a presentation's first master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutListing {
    pub total_slides: usize,
    pub layouts: Vec<LayoutInfo>,
}

/// List the layouts of the first slide master.
pub fn list_layouts(document: Vec<u8>, limits: &Limits) -> Result<LayoutListing> {
    limits.check_document(document.len() as u64)?;
    let presentation = Presentation::from_bytes(document, limits.max_unpacked_bytes)?;
    let layouts = presentation.layout_infos()?;
    debug!(layouts = layouts.len(), "listed layouts");

    Ok(LayoutListing {
        total_slides: presentation.slide_count(),
        layouts,
    })
}

/// Insert a slide into `document` as described by `request`.
///
/// # Example
///
/// ```
/// use slidemaker::sample::SampleDeck;
/// use slidemaker::{add_slide, Limits, SlideRequest};
///
/// let deck = SampleDeck::new().slides(2).build()?;
/// let request = SlideRequest::new("Title and Content", "Revenue grew 12%")
///     .with_title("Results")
///     .at_position(1);
/// let insertion = add_slide(deck, &request, &Limits::default())?;
/// assert_eq!(insertion.report.position.applied, 1);
/// assert_eq!(insertion.report.total_slides, 3);
/// # Ok::<(), slidemaker::Error>(())
/// ```
pub fn add_slide(document: Vec<u8>, request: &SlideRequest, limits: &Limits) -> Result<SlideInsertion> {
    limits.check_document(document.len() as u64)?;
    request.validate(limits)?;

    let mut presentation = Presentation::from_bytes(document, limits.max_unpacked_bytes)?;

    let layouts = presentation.layouts()?;
    let (layout, layout_match) =
        resolve_layout(layouts, request.layout()).ok_or(Error::NoSlideLayouts)?;
    let layout_index = layout.index;
    let layout_used = layout.name.clone();
    if layout_match.is_fallback() {
        warn!(
            requested = request.layout(),
            used = %layout_used,
            tier = ?layout_match,
            "no layout matched by name, using fallback"
        );
    } else {
        debug!(requested = request.layout(), used = %layout_used, tier = ?layout_match, "resolved layout");
    }

    let count_before = presentation.slide_count();
    let appended = presentation.add_slide(layout_index)?;
    let position = reposition(&mut presentation, appended, request.position(), count_before);

    let mut slide = presentation.slide(position.applied)?;
    let title = set_title(&mut slide, request.title());
    let content = place_content(&mut slide, request.text())?;
    let image = match request.image() {
        Some(upload) => place_image(&mut presentation, &mut slide, upload),
        None => ImageOutcome::Skipped,
    };
    presentation.store_slide(&slide)?;

    let bytes = presentation
        .to_bytes()
        .map_err(|e| Error::Save(e.to_string()))?;

    let report = InsertReport {
        layout_requested: request.layout().to_string(),
        layout_used,
        layout_match,
        position,
        title,
        content,
        image,
        total_slides: presentation.slide_count(),
    };
    info!(
        layout = %report.layout_used,
        tier = ?report.layout_match,
        position = report.position.applied,
        total_slides = report.total_slides,
        bytes = bytes.len(),
        "slide inserted"
    );

    Ok(SlideInsertion { bytes, report })
}

/// Move the appended slide to the requested index, clamped to `[0, count_before]`.
///
/// A failed move leaves the slide at the end.
fn reposition(
    presentation: &mut Presentation,
    appended: usize,
    requested: usize,
    count_before: usize,
) -> PositionOutcome {
    let target = requested.min(count_before);
    if target >= appended {
        return PositionOutcome {
            requested,
            applied: appended,
            moved: false,
        };
    }

    match presentation.move_slide(appended, target) {
        Ok(applied) => PositionOutcome {
            requested,
            applied,
            moved: true,
        },
        Err(e) => {
            warn!(error = %e, target, "could not reposition slide, leaving it last");
            PositionOutcome {
                requested,
                applied: appended,
                moved: false,
            }
        }
    }
}

fn set_title(slide: &mut Slide, title: Option<&str>) -> TitleOutcome {
    let Some(title) = title else {
        return TitleOutcome::Skipped;
    };
    match slide.set_title(title) {
        Ok(true) => TitleOutcome::Set,
        Ok(false) => {
            debug!("layout has no title placeholder");
            TitleOutcome::NoPlaceholder
        }
        Err(e) => {
            warn!(error = %e, "could not set title");
            TitleOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

fn place_content(slide: &mut Slide, text: &str) -> Result<ContentPlacement> {
    match slide.fill_body_placeholder(text) {
        Ok(Some(placeholder)) => {
            return Ok(ContentPlacement::Placeholder {
                name: placeholder.name,
            })
        }
        Ok(None) => debug!("no body placeholder, adding a text box"),
        Err(e) => warn!(error = %e, "could not write body placeholder, adding a text box"),
    }

    slide
        .add_text_box(text)
        .map(|name| ContentPlacement::TextBox { name })
        .map_err(|e| Error::ContentPlacement(e.to_string()))
}

fn place_image(
    presentation: &mut Presentation,
    slide: &mut Slide,
    upload: &ImageUpload,
) -> ImageOutcome {
    let result = ImageData::decode(&upload.filename, upload.data.clone())
        .and_then(|image| insert_image(presentation, slide, &image));
    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = %e, filename = %upload.filename, "could not add image");
            ImageOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}

fn insert_image(
    presentation: &mut Presentation,
    slide: &mut Slide,
    image: &ImageData,
) -> Result<ImageOutcome> {
    let media = presentation.add_media(image)?;
    let rel_id = slide.relate_to(&media, rel_type::IMAGE);

    let pictures: Vec<Placeholder> = slide
        .placeholders()
        .into_iter()
        .filter(|ph| ph.kind == PlaceholderKind::Picture)
        .collect();
    for placeholder in pictures {
        let Some(view) = presentation.placeholder_extent(slide, &placeholder) else {
            debug!(name = %placeholder.name, "picture placeholder has no extent, skipping");
            continue;
        };
        match slide.fill_picture_placeholder(&placeholder, &rel_id, image, &view) {
            Ok(()) => {
                return Ok(ImageOutcome::Placeholder {
                    name: placeholder.name,
                })
            }
            Err(e) => warn!(error = %e, name = %placeholder.name, "could not use picture placeholder"),
        }
    }

    // 4in tall at (6.5in, 2in), no wider than 3in.
    let height = inches(4.0);
    let width = image.scaled_width(height).min(inches(3.0));
    let name = slide.add_picture(
        &rel_id,
        image,
        Extent {
            x: inches(6.5),
            y: inches(2.0),
            cx: width,
            cy: height,
        },
    )?;
    Ok(ImageOutcome::Shape { name })
}
