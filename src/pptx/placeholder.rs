//! Placeholder shapes (`p:ph`) on masters, layouts and slides.

use crate::xml::Element;
use serde::Serialize;

/// Semantic kind of a placeholder (`p:ph/@type`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    /// Generic content placeholder; the default when `type` is absent.
    Object,
    Picture,
    Chart,
    Table,
    Diagram,
    Media,
    ClipArt,
    Date,
    Footer,
    SlideNumber,
    Header,
    SlideImage,
    /// A type this crate does not know, kept verbatim.
    Other(String),
}

impl PlaceholderKind {
    /// Parse a `p:ph/@type` value. `None` is the OOXML default, object.
    pub fn from_ooxml(value: Option<&str>) -> Self {
        match value.unwrap_or("obj") {
            "title" => Self::Title,
            "ctrTitle" => Self::CenterTitle,
            "subTitle" => Self::Subtitle,
            "body" => Self::Body,
            "obj" => Self::Object,
            "pic" => Self::Picture,
            "chart" => Self::Chart,
            "tbl" => Self::Table,
            "dgm" => Self::Diagram,
            "media" => Self::Media,
            "clipArt" => Self::ClipArt,
            "dt" => Self::Date,
            "ftr" => Self::Footer,
            "sldNum" => Self::SlideNumber,
            "hdr" => Self::Header,
            "sldImg" => Self::SlideImage,
            other => Self::Other(other.to_string()),
        }
    }

    /// The `p:ph/@type` value.
    pub fn as_ooxml(&self) -> &str {
        match self {
            Self::Title => "title",
            Self::CenterTitle => "ctrTitle",
            Self::Subtitle => "subTitle",
            Self::Body => "body",
            Self::Object => "obj",
            Self::Picture => "pic",
            Self::Chart => "chart",
            Self::Table => "tbl",
            Self::Diagram => "dgm",
            Self::Media => "media",
            Self::ClipArt => "clipArt",
            Self::Date => "dt",
            Self::Footer => "ftr",
            Self::SlideNumber => "sldNum",
            Self::Header => "hdr",
            Self::SlideImage => "sldImg",
            Self::Other(value) => value,
        }
    }

    /// Shape name prefix PowerPoint uses for a new placeholder of this kind.
    pub fn base_name(&self) -> &str {
        match self {
            Self::Title | Self::CenterTitle => "Title",
            Self::Subtitle => "Subtitle",
            Self::Body => "Text Placeholder",
            Self::Object => "Content Placeholder",
            Self::Picture => "Picture Placeholder",
            Self::Chart => "Chart Placeholder",
            Self::Table => "Table Placeholder",
            Self::Diagram => "SmartArt Placeholder",
            Self::Media => "Media Placeholder",
            Self::ClipArt => "ClipArt Placeholder",
            Self::Date => "Date Placeholder",
            Self::Footer => "Footer Placeholder",
            Self::SlideNumber => "Slide Number Placeholder",
            Self::Header => "Header Placeholder",
            Self::SlideImage => "Slide Image Placeholder",
            Self::Other(_) => "Placeholder",
        }
    }

    /// Kind of the master placeholder a layout placeholder inherits from.
    pub fn master_kind(&self) -> PlaceholderKind {
        match self {
            Self::Title | Self::CenterTitle => Self::Title,
            Self::Date | Self::Footer | Self::SlideNumber | Self::Header | Self::SlideImage => {
                self.clone()
            }
            _ => Self::Body,
        }
    }

    /// Title or center title.
    pub fn is_title(&self) -> bool {
        matches!(self, Self::Title | Self::CenterTitle)
    }

    /// Body or object: where slide content text goes.
    pub fn accepts_body_text(&self) -> bool {
        matches!(self, Self::Body | Self::Object)
    }

    /// Kinds that get an empty text body when cloned onto a new slide.
    pub fn has_text_frame(&self) -> bool {
        matches!(
            self,
            Self::Title | Self::CenterTitle | Self::Subtitle | Self::Body | Self::Object
        )
    }

    /// Date, footer and slide number are not cloned onto new slides.
    pub fn is_footer_like(&self) -> bool {
        matches!(self, Self::Date | Self::Footer | Self::SlideNumber)
    }
}

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extent {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Extent {
    /// Read `spPr/a:xfrm` (or `p:xfrm` on graphic frames) of a shape.
    pub fn from_shape(shape: &Element) -> Option<Self> {
        let xfrm = shape
            .path(&["spPr", "xfrm"])
            .or_else(|| shape.child("xfrm"))?;
        let off = xfrm.child("off")?;
        let ext = xfrm.child("ext")?;
        Some(Self {
            x: off.attr("x")?.parse().ok()?,
            y: off.attr("y")?.parse().ok()?,
            cx: ext.attr("cx")?.parse().ok()?,
            cy: ext.attr("cy")?.parse().ok()?,
        })
    }
}

/// Element kind of the shape carrying a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeElement {
    /// `p:sp`, the only kind with a writable text frame.
    Shape,
    /// `p:pic`
    Picture,
    /// `p:graphicFrame`
    GraphicFrame,
    Other,
}

/// A placeholder shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    /// `cNvPr/@id`, unique within the part.
    pub shape_id: u32,
    /// `cNvPr/@name`
    pub name: String,
    pub kind: PlaceholderKind,
    /// `p:ph/@idx`, 0 when absent.
    pub idx: u32,
    /// `p:ph/@orient == "vert"`
    pub vertical: bool,
    /// `p:ph/@sz` when not the default (`full`).
    pub size: Option<String>,
    /// Extent declared on this shape itself.
    pub extent: Option<Extent>,
    pub element: ShapeElement,
}

impl Placeholder {
    /// Read the placeholder carried by a top-level shape, if any.
    pub fn from_shape(shape: &Element) -> Option<Self> {
        let non_visual = non_visual_props(shape)?;
        let ph = non_visual.path(&["nvPr", "ph"])?;
        let c_nv_pr = non_visual.child("cNvPr")?;

        let element = match shape.local_name() {
            "sp" => ShapeElement::Shape,
            "pic" => ShapeElement::Picture,
            "graphicFrame" => ShapeElement::GraphicFrame,
            _ => ShapeElement::Other,
        };

        Some(Self {
            shape_id: c_nv_pr.attr("id").and_then(|id| id.parse().ok()).unwrap_or(0),
            name: c_nv_pr.attr("name").unwrap_or_default().to_string(),
            kind: PlaceholderKind::from_ooxml(ph.attr("type")),
            idx: ph.attr("idx").and_then(|idx| idx.parse().ok()).unwrap_or(0),
            vertical: ph.attr("orient") == Some("vert"),
            size: ph.attr("sz").filter(|sz| *sz != "full").map(str::to_string),
            extent: Extent::from_shape(shape),
            element,
        })
    }

    /// Placeholders of a shape tree, in document order.
    pub fn collect(sp_tree: &Element) -> Vec<Self> {
        sp_tree.elements().filter_map(Self::from_shape).collect()
    }

    /// Name PowerPoint gives a clone of this placeholder with shape id `id`.
    pub fn clone_name(&self, id: u32) -> String {
        let base = self.kind.base_name();
        if self.vertical {
            format!("Vertical {} {}", base, id.saturating_sub(1))
        } else {
            format!("{} {}", base, id.saturating_sub(1))
        }
    }
}

/// The `nv*Pr` child of a shape (`p:nvSpPr`, `p:nvPicPr`, ...).
pub(crate) fn non_visual_props(shape: &Element) -> Option<&Element> {
    shape.elements().find(|child| {
        let name = child.local_name();
        name.starts_with("nv") && name.ends_with("Pr")
    })
}

/// `cNvPr/@id` of a top-level shape.
pub(crate) fn shape_id(shape: &Element) -> Option<u32> {
    non_visual_props(shape)?
        .child("cNvPr")?
        .attr("id")?
        .parse()
        .ok()
}
