//! The presentation package: slide list, masters, layouts and media.

use super::image::ImageData;
use super::layout::{LayoutInfo, SlideLayout, SlideMaster};
use super::placeholder::{Extent, Placeholder};
use super::slide::Slide;
use super::{ns, rel_type};
use crate::container::{OoxmlContainer, Relationships};
use crate::content_types::{ContentTypes, CONTENT_TYPES_PART, SLIDE_CONTENT_TYPE};
use crate::detect::{ensure_presentation, is_zip_file};
use crate::error::{Error, Result};
use crate::xml::{Element, Node, XmlDocument};
use std::path::Path;
use tracing::debug;

/// Smallest slide id PowerPoint accepts.
const MIN_SLIDE_ID: u32 = 256;
/// Largest slide id PowerPoint accepts.
const MAX_SLIDE_ID: u32 = 2_147_483_647;

/// `p:presentation` children that come after `p:sldIdLst`.
const SLIDE_LIST_SUCCESSORS: [&str; 11] = [
    "sldSz",
    "notesSz",
    "smartTags",
    "embeddedFontLst",
    "custShowLst",
    "photoAlbum",
    "custDataLst",
    "kinsoku",
    "defaultTextStyle",
    "modifyVerifier",
    "extLst",
];

/// An opened presentation.
///
/// # Example
///
/// ```no_run
/// use slidemaker::Presentation;
///
/// let mut presentation = Presentation::open("deck.pptx")?;
/// let index = presentation.add_slide(1)?;
/// let mut slide = presentation.slide(index)?;
/// slide.set_title("Agenda")?;
/// presentation.store_slide(&slide)?;
/// presentation.move_slide(index, 0)?;
/// presentation.save("deck-with-agenda.pptx")?;
/// # Ok::<(), slidemaker::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Presentation {
    container: OoxmlContainer,
    content_types: ContentTypes,
    part_name: String,
    document: XmlDocument,
    relationships: Relationships,
    masters: Vec<SlideMaster>,
}

impl Presentation {
    /// Open a presentation file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(bytes, u64::MAX)
    }

    /// Open a presentation from bytes.
    ///
    /// `max_unpacked` bounds the package's total uncompressed size. Any
    /// failure to read the package is reported as
    /// [`Error::CorruptPresentation`].
    pub fn from_bytes(bytes: Vec<u8>, max_unpacked: u64) -> Result<Self> {
        Self::load(bytes, max_unpacked).map_err(|e| match e {
            Error::CorruptPresentation(_) => e,
            other => Error::CorruptPresentation(other.to_string()),
        })
    }

    fn load(bytes: Vec<u8>, max_unpacked: u64) -> Result<Self> {
        if !is_zip_file(&bytes) {
            return Err(Error::CorruptPresentation(
                "file is not a ZIP package".to_string(),
            ));
        }

        let container = OoxmlContainer::from_bytes(bytes, max_unpacked)?;
        ensure_presentation(&container)?;

        let content_types = ContentTypes::parse(&container.read_xml(CONTENT_TYPES_PART)?)?;
        let part_name = container
            .read_package_relationships()?
            .get_by_type(rel_type::OFFICE_DOCUMENT)
            .first()
            .map(|rel| OoxmlContainer::resolve_path("", &rel.target))
            .unwrap_or_else(|| "ppt/presentation.xml".to_string());

        let document = container.read_document(&part_name)?;
        if !document.root.is("presentation") {
            return Err(Error::InvalidData(format!(
                "{} has root <{}>, expected p:presentation",
                part_name, document.root.name
            )));
        }
        let relationships = container.read_relationships(&part_name)?;
        let masters = load_masters(&container, &part_name, &document, &relationships)?;

        debug!(
            part = %part_name,
            masters = masters.len(),
            parts = container.list_files().len(),
            "opened presentation"
        );

        Ok(Self {
            container,
            content_types,
            part_name,
            document,
            relationships,
            masters,
        })
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slide_list()
            .map(|list| list.children_named("sldId").count())
            .unwrap_or(0)
    }

    /// Slide size in EMU from `p:sldSz`.
    pub fn slide_size(&self) -> Option<(i64, i64)> {
        let size = self.document.root.child("sldSz")?;
        Some((size.attr("cx")?.parse().ok()?, size.attr("cy")?.parse().ok()?))
    }

    /// Slide masters in `p:sldMasterIdLst` order.
    pub fn masters(&self) -> &[SlideMaster] {
        &self.masters
    }

    /// Layouts of the first slide master.
    pub fn layouts(&self) -> Result<&[SlideLayout]> {
        self.masters
            .first()
            .map(|master| master.layouts.as_slice())
            .ok_or(Error::NoSlideMaster)
    }

    /// Index, name and type of each layout of the first slide master.
    pub fn layout_infos(&self) -> Result<Vec<LayoutInfo>> {
        Ok(self.layouts()?.iter().map(SlideLayout::info).collect())
    }

    /// Slide part names in presentation order.
    pub fn slide_parts(&self) -> Result<Vec<String>> {
        let Some(list) = self.slide_list() else {
            return Ok(Vec::new());
        };
        list.children_named("sldId")
            .map(|sld_id| self.slide_part_of(sld_id))
            .collect()
    }

    fn slide_part_of(&self, sld_id: &Element) -> Result<String> {
        let rel_id = sld_id
            .prefixed_attr("id")
            .ok_or_else(|| Error::InvalidData("p:sldId without r:id".to_string()))?;
        let rel = self
            .relationships
            .get(rel_id)
            .ok_or_else(|| Error::MissingComponent(format!("relationship {}", rel_id)))?;
        Ok(OoxmlContainer::resolve_path(&self.part_name, &rel.target))
    }

    fn slide_list(&self) -> Option<&Element> {
        self.document.root.child("sldIdLst")
    }

    /// Read the slide at `index`.
    pub fn slide(&self, index: usize) -> Result<Slide> {
        let count = self.slide_count();
        let sld_id = self
            .slide_list()
            .and_then(|list| list.children_named("sldId").nth(index))
            .ok_or(Error::SlideOutOfRange { index, count })?;
        let part_name = self.slide_part_of(sld_id)?;

        let document = self.container.read_document(&part_name)?;
        let relationships = self.container.read_relationships(&part_name)?;
        Ok(Slide::new(&part_name, document, relationships))
    }

    /// Write an edited slide back into the package.
    pub fn store_slide(&mut self, slide: &Slide) -> Result<()> {
        if !self.container.exists(slide.part_name()) {
            return Err(Error::MissingComponent(slide.part_name().to_string()));
        }
        self.container
            .put_document(slide.part_name(), slide.document())?;
        self.container
            .put_relationships(slide.part_name(), slide.relationships())
    }

    /// Append a new slide built from the first master's layout at `layout_index`.
    ///
    /// Returns the new slide's index, which is always the last.
    pub fn add_slide(&mut self, layout_index: usize) -> Result<usize> {
        let layout = self
            .layouts()?
            .get(layout_index)
            .cloned()
            .ok_or_else(|| Error::InvalidData(format!("no layout at index {}", layout_index)))?;

        let part_name = self.next_slide_part_name();
        let slide = Slide::from_layout(&part_name, &layout)?;
        self.container.put_document(&part_name, slide.document())?;
        self.container
            .put_relationships(&part_name, slide.relationships())?;
        self.content_types
            .add_override(&part_name, SLIDE_CONTENT_TYPE);

        let target = OoxmlContainer::relative_target(&self.part_name, &part_name);
        let rel_id = self.relationships.add_internal(rel_type::SLIDE, &target);
        let slide_id = self.next_slide_id()?;
        self.append_slide_id(slide_id, &rel_id);
        self.flush()?;

        debug!(
            part = %part_name,
            layout = %layout.name,
            slide_id,
            rel_id = %rel_id,
            "added slide"
        );
        Ok(self.slide_count() - 1)
    }

    /// Move the slide at `from` to `to`, keeping every other slide's relative order.
    ///
    /// `to` is clamped to the last index. Only `p:sldIdLst` is reordered; the
    /// slide's id, relationship and part are untouched. Returns the final index.
    pub fn move_slide(&mut self, from: usize, to: usize) -> Result<usize> {
        let list = self
            .document
            .root
            .child_mut("sldIdLst")
            .ok_or_else(|| Error::MissingComponent("p:sldIdLst".to_string()))?;

        let positions = slide_id_positions(list);
        let count = positions.len();
        if from >= count {
            return Err(Error::SlideOutOfRange { index: from, count });
        }
        let to = to.min(count - 1);
        if from == to {
            return Ok(to);
        }

        let node = list.children.remove(positions[from]);
        let remaining = slide_id_positions(list);
        let at = match remaining.get(to) {
            Some(&position) => position,
            None => remaining.last().map_or(list.children.len(), |&last| last + 1),
        };
        list.children.insert(at, node);

        self.flush()?;
        debug!(from, to, "moved slide");
        Ok(to)
    }

    /// Store image bytes as a new media part and return its part name.
    ///
    /// The part is named after the detected format (`ppt/media/image3.png`).
    pub fn add_media(&mut self, image: &ImageData) -> Result<String> {
        let extension = image.extension();
        let part_name = (1u32..)
            .map(|n| self.sibling(&format!("media/image{}.{}", n, extension)))
            .find(|candidate| !self.container.exists(candidate))
            .ok_or_else(|| Error::InvalidData("no free media part name".to_string()))?;

        self.container.put(&part_name, image.bytes().to_vec());
        self.content_types
            .ensure_default(extension, image.content_type());
        self.flush()?;
        Ok(part_name)
    }

    /// Extent a slide placeholder renders at.
    ///
    /// Taken from the placeholder itself, else the layout placeholder with the
    /// same `idx`, else the master placeholder of the matching base type.
    pub fn placeholder_extent(&self, slide: &Slide, placeholder: &Placeholder) -> Option<Extent> {
        if let Some(extent) = placeholder.extent {
            return Some(extent);
        }

        let layout_part = slide.layout_part()?;
        let (master, layout) = self.masters.iter().find_map(|master| {
            master
                .layouts
                .iter()
                .find(|layout| layout.part_name == layout_part)
                .map(|layout| (master, layout))
        })?;

        let inherited = layout
            .placeholders
            .iter()
            .find(|ph| ph.idx == placeholder.idx)?;
        if let Some(extent) = inherited.extent {
            return Some(extent);
        }

        let base = inherited.kind.master_kind();
        master
            .placeholders
            .iter()
            .find(|ph| ph.kind == base)
            .and_then(|ph| ph.extent)
    }

    /// Serialize the package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.container.to_bytes()
    }

    /// Write the package to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_bytes()?)?;
        Ok(())
    }

    /// Part name next to the presentation part (`ppt/<relative>`).
    fn sibling(&self, relative: &str) -> String {
        match self.part_name.rsplit_once('/') {
            Some((dir, _)) => format!("{}/{}", dir, relative),
            None => relative.to_string(),
        }
    }

    /// `slideN.xml` with the smallest unused N above the current slide count.
    fn next_slide_part_name(&self) -> String {
        let mut n = self.slide_count() + 1;
        loop {
            let candidate = self.sibling(&format!("slides/slide{}.xml", n));
            if !self.container.exists(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// One above the largest slide id, or the first free id once that overflows.
    fn next_slide_id(&self) -> Result<u32> {
        let mut used: Vec<u32> = self
            .slide_list()
            .map(|list| {
                list.children_named("sldId")
                    .filter_map(|sld_id| sld_id.attr("id")?.parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        let Some(&max) = used.iter().max() else {
            return Ok(MIN_SLIDE_ID);
        };
        if max < MAX_SLIDE_ID {
            return Ok((max + 1).max(MIN_SLIDE_ID));
        }

        used.sort_unstable();
        (MIN_SLIDE_ID..=MAX_SLIDE_ID)
            .find(|id| used.binary_search(id).is_err())
            .ok_or_else(|| Error::InvalidData("no free slide id".to_string()))
    }

    fn append_slide_id(&mut self, slide_id: u32, rel_id: &str) {
        let root = &mut self.document.root;
        let bound = root.namespace_prefix(ns::RELATIONSHIPS).map(str::to_string);
        let r_prefix = match bound {
            Some(prefix) => prefix,
            None => {
                root.set_attr("xmlns:r", ns::RELATIONSHIPS);
                "r".to_string()
            }
        };
        let element_prefix = root.prefix().map(str::to_string);
        let qualify = |local: &str| match &element_prefix {
            Some(prefix) => format!("{}:{}", prefix, local),
            None => local.to_string(),
        };
        let sld_id = Element::new(qualify("sldId"))
            .with_attr("id", slide_id.to_string())
            .with_attr(format!("{}:id", r_prefix), rel_id);

        if root.child("sldIdLst").is_none() {
            let list = Element::new(qualify("sldIdLst"));
            let at = root
                .children
                .iter()
                .position(|node| {
                    matches!(node, Node::Element(element)
                        if SLIDE_LIST_SUCCESSORS.contains(&element.local_name()))
                })
                .unwrap_or(root.children.len());
            root.insert(at, list);
        }
        if let Some(list) = root.child_mut("sldIdLst") {
            list.push(sld_id);
        }
    }

    /// Write the presentation part, its relationships and the content types back.
    fn flush(&mut self) -> Result<()> {
        self.container.put_document(&self.part_name, &self.document)?;
        self.container
            .put_relationships(&self.part_name, &self.relationships)?;
        self.container
            .put_document(CONTENT_TYPES_PART, &self.content_types.to_document())
    }
}

/// Node indices of the `p:sldId` children.
fn slide_id_positions(list: &Element) -> Vec<usize> {
    list.children
        .iter()
        .enumerate()
        .filter(|(_, node)| matches!(node, Node::Element(element) if element.is("sldId")))
        .map(|(i, _)| i)
        .collect()
}

fn load_masters(
    container: &OoxmlContainer,
    part_name: &str,
    document: &XmlDocument,
    relationships: &Relationships,
) -> Result<Vec<SlideMaster>> {
    let Some(list) = document.root.child("sldMasterIdLst") else {
        return Ok(Vec::new());
    };

    let mut masters = Vec::new();
    for master_id in list.children_named("sldMasterId") {
        let master_part = resolve_rel(part_name, master_id, relationships)?;
        let master_doc = container.read_document(&master_part)?;
        let master_rels = container.read_relationships(&master_part)?;

        let layouts = match master_doc.root.child("sldLayoutIdLst") {
            Some(layout_list) => layout_list
                .children_named("sldLayoutId")
                .enumerate()
                .map(|(index, layout_id)| {
                    let layout_part = resolve_rel(&master_part, layout_id, &master_rels)?;
                    let layout_doc = container.read_document(&layout_part)?;
                    Ok(SlideLayout::from_document(index, &layout_part, &layout_doc))
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let placeholders = master_doc
            .root
            .path(&["cSld", "spTree"])
            .map(Placeholder::collect)
            .unwrap_or_default();

        masters.push(SlideMaster {
            part_name: master_part,
            layouts,
            placeholders,
        });
    }
    Ok(masters)
}

/// Part targeted by an element's `r:id`.
fn resolve_rel(source: &str, element: &Element, relationships: &Relationships) -> Result<String> {
    let rel_id = element
        .prefixed_attr("id")
        .ok_or_else(|| Error::InvalidData(format!("<{}> without r:id", element.name)))?;
    let rel = relationships
        .get(rel_id)
        .ok_or_else(|| Error::MissingComponent(format!("relationship {} of {}", rel_id, source)))?;
    Ok(OoxmlContainer::resolve_path(source, &rel.target))
}
