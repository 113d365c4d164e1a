//! Slide parts: placeholders, text, text boxes and pictures.

use super::image::ImageData;
use super::layout::SlideLayout;
use super::placeholder::{
    non_visual_props, shape_id, Extent, Placeholder, PlaceholderKind, ShapeElement,
};
use super::text::{self, Prefixes};
use super::{ns, rel_type};
use crate::container::{OoxmlContainer, Relationships};
use crate::error::{Error, Result};
use crate::units::inches;
use crate::xml::{Element, Node, XmlDocument};
use tracing::debug;

/// A slide part with its relationships.
///
/// Obtained from [`Presentation::slide`](super::Presentation::slide); edits
/// stay local until the slide is handed back with
/// [`Presentation::store_slide`](super::Presentation::store_slide).
#[derive(Debug, Clone)]
pub struct Slide {
    part_name: String,
    document: XmlDocument,
    relationships: Relationships,
}

impl Slide {
    pub(crate) fn new(part_name: &str, document: XmlDocument, relationships: Relationships) -> Self {
        Self {
            part_name: part_name.to_string(),
            document,
            relationships,
        }
    }

    /// A new slide bound to `layout`, carrying clones of the layout's placeholders.
    ///
    /// Date, footer and slide number placeholders are not cloned.
    pub(crate) fn from_layout(part_name: &str, layout: &SlideLayout) -> Result<Self> {
        let root = Element::new("p:sld")
            .with_attr("xmlns:a", ns::DRAWING)
            .with_attr("xmlns:r", ns::RELATIONSHIPS)
            .with_attr("xmlns:p", ns::PRESENTATION);
        let pf = Prefixes::of(&root);

        let sp_tree = pf
            .p("spTree")
            .with_child(
                pf.p("nvGrpSpPr")
                    .with_child(pf.p("cNvPr").with_attr("id", "1").with_attr("name", ""))
                    .with_child(pf.p("cNvGrpSpPr"))
                    .with_child(pf.p("nvPr")),
            )
            .with_child(pf.p("grpSpPr"));
        let root = root
            .with_child(pf.p("cSld").with_child(sp_tree))
            .with_child(pf.p("clrMapOvr").with_child(pf.a("masterClrMapping")));

        let mut relationships = Relationships::new();
        relationships.add_internal(
            rel_type::SLIDE_LAYOUT,
            &OoxmlContainer::relative_target(part_name, &layout.part_name),
        );

        let mut slide = Self::new(part_name, XmlDocument::new(root), relationships);
        for placeholder in layout.cloneable_placeholders() {
            slide.clone_placeholder(placeholder)?;
        }
        Ok(slide)
    }

    fn clone_placeholder(&mut self, placeholder: &Placeholder) -> Result<()> {
        let pf = self.prefixes();
        let id = self.next_shape_id();

        let mut ph = pf.p("ph");
        if placeholder.kind != PlaceholderKind::Object {
            ph.set_attr("type", placeholder.kind.as_ooxml());
        }
        if placeholder.vertical {
            ph.set_attr("orient", "vert");
        }
        if let Some(size) = &placeholder.size {
            ph.set_attr("sz", size.as_str());
        }
        if placeholder.idx != 0 {
            ph.set_attr("idx", placeholder.idx.to_string());
        }

        let mut sp = pf
            .p("sp")
            .with_child(
                pf.p("nvSpPr")
                    .with_child(
                        pf.p("cNvPr")
                            .with_attr("id", id.to_string())
                            .with_attr("name", placeholder.clone_name(id)),
                    )
                    .with_child(
                        pf.p("cNvSpPr")
                            .with_child(pf.a("spLocks").with_attr("noGrp", "1")),
                    )
                    .with_child(pf.p("nvPr").with_child(ph)),
            )
            .with_child(pf.p("spPr"));
        if placeholder.kind.has_text_frame() {
            sp.push(text::empty_text_body(&pf));
        }

        self.append_shape(sp)
    }

    pub fn part_name(&self) -> &str {
        &self.part_name
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Part name of the layout this slide is built on.
    pub fn layout_part(&self) -> Option<String> {
        self.relationships
            .get_by_type(rel_type::SLIDE_LAYOUT)
            .first()
            .map(|rel| OoxmlContainer::resolve_path(&self.part_name, &rel.target))
    }

    fn prefixes(&self) -> Prefixes {
        Prefixes::of(&self.document.root)
    }

    fn sp_tree(&self) -> Result<&Element> {
        self.document
            .root
            .path(&["cSld", "spTree"])
            .ok_or_else(|| Error::MissingComponent(format!("p:spTree in {}", self.part_name)))
    }

    fn sp_tree_mut(&mut self) -> Result<&mut Element> {
        let part_name = &self.part_name;
        self.document
            .root
            .path_mut(&["cSld", "spTree"])
            .ok_or_else(|| Error::MissingComponent(format!("p:spTree in {}", part_name)))
    }

    /// Add a shape at the end of the shape tree (before any `p:extLst`).
    fn append_shape(&mut self, shape: Element) -> Result<()> {
        let sp_tree = self.sp_tree_mut()?;
        match sp_tree.position_of("extLst") {
            Some(index) => sp_tree.insert(index, shape),
            None => sp_tree.push(shape),
        }
        Ok(())
    }

    /// Top-level shape with the given `cNvPr/@id`.
    fn shape_mut(&mut self, id: u32) -> Result<&mut Element> {
        self.sp_tree_mut()?
            .elements_mut()
            .find(|shape| shape_id(shape) == Some(id))
            .ok_or_else(|| Error::MissingComponent(format!("shape {}", id)))
    }

    /// One more than the largest shape id used anywhere on the slide.
    pub fn next_shape_id(&self) -> u32 {
        self.document
            .root
            .descendants_named("cNvPr")
            .into_iter()
            .filter_map(|c_nv_pr| c_nv_pr.attr("id")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Placeholders in document order.
    pub fn placeholders(&self) -> Vec<Placeholder> {
        self.sp_tree().map(Placeholder::collect).unwrap_or_default()
    }

    /// Text of the title placeholder, if the slide has one with a text body.
    pub fn title(&self) -> Option<String> {
        let sp_tree = self.sp_tree().ok()?;
        let title = self.placeholders().into_iter().find(|ph| ph.kind.is_title())?;
        sp_tree
            .elements()
            .find(|shape| shape_id(shape) == Some(title.shape_id))?
            .child("txBody")
            .map(text::text_of)
    }

    /// Text of every top-level shape that has a text body.
    pub fn shape_texts(&self) -> Vec<String> {
        self.sp_tree()
            .map(|sp_tree| {
                sp_tree
                    .elements()
                    .filter_map(|shape| shape.child("txBody"))
                    .map(text::text_of)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of top-level pictures.
    pub fn picture_count(&self) -> usize {
        self.sp_tree()
            .map(|sp_tree| sp_tree.children_named("pic").count())
            .unwrap_or(0)
    }

    /// Set the title placeholder's text, one paragraph per line.
    ///
    /// Returns `false` when the slide has no title placeholder.
    pub fn set_title(&mut self, title: &str) -> Result<bool> {
        let Some(placeholder) = self
            .placeholders()
            .into_iter()
            .find(|ph| ph.kind.is_title())
        else {
            return Ok(false);
        };
        if placeholder.element != ShapeElement::Shape {
            return Err(Error::InvalidData(format!(
                "title placeholder {} has no text frame",
                placeholder.name
            )));
        }

        let pf = self.prefixes();
        let title = text::normalize_newlines(title);
        let shape = self.shape_mut(placeholder.shape_id)?;
        let tx_body = text_body_mut(shape, &pf)?;
        tx_body.remove_children_named("p");
        for line in title.split('\n') {
            let mut p = pf.a("p");
            for run in text::runs(&pf, line, &['\u{000B}']) {
                p.push(run);
            }
            tx_body.push(p);
        }
        Ok(true)
    }

    /// Write body text into the first body or object placeholder that takes it.
    ///
    /// Existing paragraphs are cleared and the text becomes one left-aligned
    /// paragraph at level 0 with word wrap and 0.1in left/top insets.
    /// Returns the placeholder written, or `None` when no placeholder could
    /// take the text.
    pub fn fill_body_placeholder(&mut self, body: &str) -> Result<Option<Placeholder>> {
        let pf = self.prefixes();
        let body = text::normalize_newlines(body);

        for placeholder in self.placeholders() {
            if !placeholder.kind.accepts_body_text() {
                continue;
            }
            if placeholder.element != ShapeElement::Shape {
                debug!(name = %placeholder.name, "placeholder has no text frame, skipping");
                continue;
            }

            match self.write_body(placeholder.shape_id, &pf, &body) {
                Ok(()) => return Ok(Some(placeholder)),
                Err(e) => {
                    debug!(
                        name = %placeholder.name,
                        error = %e,
                        "could not write placeholder, trying the next"
                    );
                }
            }
        }

        Ok(None)
    }

    fn write_body(&mut self, shape_id: u32, pf: &Prefixes, body: &str) -> Result<()> {
        let shape = self.shape_mut(shape_id)?;
        let tx_body = text_body_mut(shape, pf)?;
        write_single_paragraph(tx_body, pf, body);

        let body_pr = body_pr_mut(tx_body, pf)?;
        body_pr.set_attr("wrap", "square");
        body_pr.set_attr("lIns", inches(0.1).to_string());
        body_pr.set_attr("tIns", inches(0.1).to_string());
        Ok(())
    }

    /// Add a 9in x 5in text box at (0.5in, 1.8in) holding `body`.
    ///
    /// Returns the new shape's name.
    pub fn add_text_box(&mut self, body: &str) -> Result<String> {
        let pf = self.prefixes();
        let id = self.next_shape_id();
        let name = format!("TextBox {}", id - 1);
        let body = text::normalize_newlines(body);

        let mut paragraph = text::paragraph(&pf, &body);
        paragraph.insert(0, pf.a("pPr").with_attr("algn", "l"));

        let sp = pf
            .p("sp")
            .with_child(
                pf.p("nvSpPr")
                    .with_child(
                        pf.p("cNvPr")
                            .with_attr("id", id.to_string())
                            .with_attr("name", name.as_str()),
                    )
                    .with_child(pf.p("cNvSpPr").with_attr("txBox", "1"))
                    .with_child(pf.p("nvPr")),
            )
            .with_child(
                pf.p("spPr")
                    .with_child(xfrm(
                        &pf,
                        Extent {
                            x: inches(0.5),
                            y: inches(1.8),
                            cx: inches(9.0),
                            cy: inches(5.0),
                        },
                    ))
                    .with_child(rect_geometry(&pf))
                    .with_child(pf.a("noFill")),
            )
            .with_child(
                pf.p("txBody")
                    .with_child(
                        pf.a("bodyPr")
                            .with_attr("wrap", "square")
                            .with_attr("lIns", "0")
                            .with_attr("tIns", "0")
                            .with_child(pf.a("spAutoFit")),
                    )
                    .with_child(pf.a("lstStyle"))
                    .with_child(paragraph),
            );

        self.append_shape(sp)?;
        Ok(name)
    }

    /// Relationship from this slide to `target_part`, reusing an existing one.
    pub fn relate_to(&mut self, target_part: &str, rel_type: &str) -> String {
        let target = OoxmlContainer::relative_target(&self.part_name, target_part);
        if let Some(existing) = self
            .relationships
            .iter()
            .find(|rel| !rel.external && rel.rel_type == rel_type && rel.target == target)
        {
            return existing.id.clone();
        }
        self.relationships.add_internal(rel_type, &target)
    }

    /// Replace a picture placeholder with a picture bound to it.
    ///
    /// The placeholder's `p:ph` is kept so the picture inherits the layout's
    /// position, and the image is cropped to fill `view` without distortion.
    pub fn fill_picture_placeholder(
        &mut self,
        placeholder: &Placeholder,
        rel_id: &str,
        image: &ImageData,
        view: &Extent,
    ) -> Result<()> {
        let pf = self.prefixes();
        let shape = self.shape_mut(placeholder.shape_id)?;
        let ph = non_visual_props(shape)
            .and_then(|nv| nv.path(&["nvPr", "ph"]))
            .cloned()
            .ok_or_else(|| Error::MissingComponent(format!("p:ph on {}", placeholder.name)))?;

        let mut src_rect = pf.a("srcRect");
        for (name, value) in image.fill_crop(view).attributes() {
            src_rect.set_attr(name, value);
        }
        let mut blip_fill =
            pf.p("blipFill")
                .with_child(pf.a("blip").with_attr(pf.r("embed"), rel_id));
        if !src_rect.attributes.is_empty() {
            blip_fill.push(src_rect);
        }
        blip_fill.push(pf.a("stretch").with_child(pf.a("fillRect")));

        let pic = pf
            .p("pic")
            .with_child(
                pf.p("nvPicPr")
                    .with_child(
                        pf.p("cNvPr")
                            .with_attr("id", placeholder.shape_id.to_string())
                            .with_attr("name", placeholder.name.as_str())
                            .with_attr("descr", image.description()),
                    )
                    .with_child(
                        pf.p("cNvPicPr").with_child(
                            pf.a("picLocks")
                                .with_attr("noGrp", "1")
                                .with_attr("noChangeAspect", "1"),
                        ),
                    )
                    .with_child(pf.p("nvPr").with_child(ph)),
            )
            .with_child(blip_fill)
            .with_child(pf.p("spPr"));

        *shape = pic;
        Ok(())
    }

    /// Add a free-standing picture. Returns the new shape's name.
    pub fn add_picture(&mut self, rel_id: &str, image: &ImageData, extent: Extent) -> Result<String> {
        let pf = self.prefixes();
        let id = self.next_shape_id();
        let name = format!("Picture {}", id - 1);

        let pic = pf
            .p("pic")
            .with_child(
                pf.p("nvPicPr")
                    .with_child(
                        pf.p("cNvPr")
                            .with_attr("id", id.to_string())
                            .with_attr("name", name.as_str())
                            .with_attr("descr", image.description()),
                    )
                    .with_child(
                        pf.p("cNvPicPr")
                            .with_child(pf.a("picLocks").with_attr("noChangeAspect", "1")),
                    )
                    .with_child(pf.p("nvPr")),
            )
            .with_child(
                pf.p("blipFill")
                    .with_child(pf.a("blip").with_attr(pf.r("embed"), rel_id))
                    .with_child(pf.a("stretch").with_child(pf.a("fillRect"))),
            )
            .with_child(
                pf.p("spPr")
                    .with_child(xfrm(&pf, extent))
                    .with_child(rect_geometry(&pf)),
            );

        self.append_shape(pic)?;
        Ok(name)
    }
}

/// The shape's `p:txBody`, added after `p:spPr` when missing.
fn text_body_mut<'a>(shape: &'a mut Element, pf: &Prefixes) -> Result<&'a mut Element> {
    if shape.child("txBody").is_none() {
        let body = text::empty_text_body(pf);
        match shape.position_of("extLst") {
            Some(index) => shape.insert(index, body),
            None => shape.push(body),
        }
    }
    shape
        .child_mut("txBody")
        .ok_or_else(|| Error::MissingComponent("p:txBody".to_string()))
}

/// The text body's `a:bodyPr`, added as its first child when missing.
fn body_pr_mut<'a>(tx_body: &'a mut Element, pf: &Prefixes) -> Result<&'a mut Element> {
    if tx_body.child("bodyPr").is_none() {
        tx_body.insert(0, pf.a("bodyPr"));
    }
    tx_body
        .child_mut("bodyPr")
        .ok_or_else(|| Error::MissingComponent("a:bodyPr".to_string()))
}

/// Clear a text body down to its first paragraph and write `body` into it.
///
/// Paragraph properties and end-of-paragraph run properties survive.
fn write_single_paragraph(tx_body: &mut Element, pf: &Prefixes, body: &str) {
    let mut seen_first = false;
    tx_body.children.retain(|node| match node {
        Node::Element(element) if element.is("p") => {
            let keep = !seen_first;
            seen_first = true;
            keep
        }
        _ => true,
    });
    if !seen_first {
        tx_body.push(pf.a("p"));
    }

    let Some(p) = tx_body.child_mut("p") else {
        return;
    };
    p.children.retain(|node| {
        !matches!(node, Node::Element(element)
            if matches!(element.local_name(), "r" | "br" | "fld"))
    });

    if p.child("pPr").is_none() {
        p.insert(0, pf.a("pPr"));
    }
    if let Some(p_pr) = p.child_mut("pPr") {
        p_pr.set_attr("algn", "l");
        p_pr.remove_attr("lvl");
    }

    let runs = text::runs(pf, body, &['\n', '\u{000B}']);
    let mut at = p.position_of("endParaRPr").unwrap_or(p.children.len());
    for run in runs {
        p.insert(at, run);
        at += 1;
    }
}

fn xfrm(pf: &Prefixes, extent: Extent) -> Element {
    pf.a("xfrm")
        .with_child(
            pf.a("off")
                .with_attr("x", extent.x.to_string())
                .with_attr("y", extent.y.to_string()),
        )
        .with_child(
            pf.a("ext")
                .with_attr("cx", extent.cx.to_string())
                .with_attr("cy", extent.cy.to_string()),
        )
}

fn rect_geometry(pf: &Prefixes) -> Element {
    pf.a("prstGeom")
        .with_attr("prst", "rect")
        .with_child(pf.a("avLst"))
}
