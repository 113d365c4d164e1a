//! Synthetic presentations for tests, benchmarks and demos.
//!
//! [`SampleDeck`] writes a small but structurally complete `.pptx`: one
//! slide master with the usual title/body/footer placeholders, a configurable
//! list of layouts, and N slides titled "Slide 1", "Slide 2", ...

use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument";

/// A placeholder on a sample layout.
#[derive(Debug, Clone)]
pub struct SamplePlaceholder {
    /// `p:ph/@type`; `None` writes an untyped (object) placeholder.
    pub ph_type: Option<&'static str>,
    pub idx: u32,
    /// `(x, y, cx, cy)` in EMU; `None` inherits from the master.
    pub extent: Option<(i64, i64, i64, i64)>,
}

/// A layout in a sample deck.
#[derive(Debug, Clone)]
pub struct SampleLayout {
    pub name: String,
    pub layout_type: Option<&'static str>,
    pub placeholders: Vec<SamplePlaceholder>,
}

impl SampleLayout {
    /// An untyped layout with no placeholders.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout_type: None,
            placeholders: Vec::new(),
        }
    }

    pub fn with_type(mut self, layout_type: &'static str) -> Self {
        self.layout_type = Some(layout_type);
        self
    }

    pub fn with_placeholder(
        mut self,
        ph_type: Option<&'static str>,
        idx: u32,
        extent: Option<(i64, i64, i64, i64)>,
    ) -> Self {
        self.placeholders.push(SamplePlaceholder {
            ph_type,
            idx,
            extent,
        });
        self
    }

    fn with_footers(self) -> Self {
        self.with_placeholder(Some("dt"), 10, None)
            .with_placeholder(Some("ftr"), 11, None)
            .with_placeholder(Some("sldNum"), 12, None)
    }

    /// The five layouts every sample deck gets unless told otherwise.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("Title Slide")
                .with_type("title")
                .with_placeholder(Some("ctrTitle"), 0, Some((685_800, 2_130_425, 7_772_400, 1_470_025)))
                .with_placeholder(Some("subTitle"), 1, Some((1_371_600, 3_886_200, 6_400_800, 1_752_600)))
                .with_footers(),
            Self::new("Title and Content")
                .with_type("obj")
                .with_placeholder(Some("title"), 0, None)
                .with_placeholder(None, 1, None)
                .with_footers(),
            Self::new("Section Header")
                .with_type("secHead")
                .with_placeholder(Some("title"), 0, Some((722_313, 4_406_900, 7_772_400, 1_362_075)))
                .with_placeholder(Some("body"), 1, Some((722_313, 2_906_713, 7_772_400, 1_500_187))),
            Self::new("Picture with Caption")
                .with_type("picTx")
                .with_placeholder(Some("title"), 0, Some((1_792_288, 4_800_600, 5_486_400, 566_738)))
                .with_placeholder(Some("pic"), 1, Some((1_792_288, 612_775, 5_486_400, 4_114_800)))
                .with_placeholder(Some("body"), 2, Some((1_792_288, 5_367_338, 5_486_400, 804_862))),
            Self::new("Blank").with_type("blank").with_footers(),
        ]
    }
}

/// Builder for a synthetic presentation.
///
/// ```
/// use slidemaker::sample::SampleDeck;
/// use slidemaker::Presentation;
///
/// let bytes = SampleDeck::new().slides(3).build()?;
/// let presentation = Presentation::from_bytes(bytes, u64::MAX)?;
/// assert_eq!(presentation.slide_count(), 3);
/// # Ok::<(), slidemaker::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SampleDeck {
    slides: usize,
    layouts: Vec<SampleLayout>,
    master: bool,
}

impl Default for SampleDeck {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleDeck {
    /// No slides, the default layouts.
    pub fn new() -> Self {
        Self {
            slides: 0,
            layouts: SampleLayout::defaults(),
            master: true,
        }
    }

    /// Number of existing slides.
    pub fn slides(mut self, count: usize) -> Self {
        self.slides = count;
        self
    }

    /// Replace the master's layouts; an empty list gives a master without layouts.
    pub fn layouts(mut self, layouts: Vec<SampleLayout>) -> Self {
        self.layouts = layouts;
        self
    }

    /// Leave out the slide master (and with it every layout).
    pub fn without_master(mut self) -> Self {
        self.master = false;
        self
    }

    /// Write the package.
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let layouts: &[SampleLayout] = if self.master { &self.layouts } else { &[] };
        // Existing slides use "Title and Content" when there is one.
        let slide_layout = match layouts.len() {
            0 => None,
            1 => Some(1),
            _ => Some(2),
        };

        let mut parts: Vec<(String, String)> = vec![
            ("[Content_Types].xml".to_string(), self.content_types(layouts.len())),
            ("_rels/.rels".to_string(), package_rels()),
            ("ppt/presentation.xml".to_string(), self.presentation()),
            ("ppt/_rels/presentation.xml.rels".to_string(), self.presentation_rels()),
            ("ppt/theme/theme1.xml".to_string(), theme()),
        ];

        if self.master {
            parts.push(("ppt/slideMasters/slideMaster1.xml".to_string(), master(layouts.len())));
            parts.push((
                "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
                master_rels(layouts.len()),
            ));
        }
        for (i, layout) in layouts.iter().enumerate() {
            let n = i + 1;
            parts.push((format!("ppt/slideLayouts/slideLayout{}.xml", n), layout_xml(layout)));
            parts.push((
                format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
                rels(&[(
                    "rId1",
                    "slideMaster",
                    "../slideMasters/slideMaster1.xml".to_string(),
                )]),
            ));
        }
        for i in 0..self.slides {
            let n = i + 1;
            parts.push((format!("ppt/slides/slide{}.xml", n), slide_xml(n)));
            let slide_rels = match slide_layout {
                Some(layout) => rels(&[(
                    "rId1",
                    "slideLayout",
                    format!("../slideLayouts/slideLayout{}.xml", layout),
                )]),
                None => rels(&[]),
            };
            parts.push((format!("ppt/slides/_rels/slide{}.xml.rels", n), slide_rels));
        }

        for (name, body) in parts {
            zip.start_file(name, options)?;
            zip.write_all(body.as_bytes())?;
        }
        Ok(zip.finish()?.into_inner())
    }

    fn content_types(&self, layouts: usize) -> String {
        let mut overrides = vec![
            (
                "/ppt/presentation.xml".to_string(),
                format!("{}.presentationml.presentation.main+xml", CT_BASE),
            ),
            (
                "/ppt/theme/theme1.xml".to_string(),
                format!("{}.theme+xml", CT_BASE),
            ),
        ];
        if self.master {
            overrides.push((
                "/ppt/slideMasters/slideMaster1.xml".to_string(),
                format!("{}.presentationml.slideMaster+xml", CT_BASE),
            ));
        }
        for n in 1..=layouts {
            overrides.push((
                format!("/ppt/slideLayouts/slideLayout{}.xml", n),
                format!("{}.presentationml.slideLayout+xml", CT_BASE),
            ));
        }
        for n in 1..=self.slides {
            overrides.push((
                format!("/ppt/slides/slide{}.xml", n),
                format!("{}.presentationml.slide+xml", CT_BASE),
            ));
        }

        let mut xml = format!(
            r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#,
            XML_DECL
        );
        for (part, ct) in overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                part, ct
            ));
        }
        xml.push_str("</Types>");
        xml
    }

    fn presentation(&self) -> String {
        let mut xml = format!("{}<p:presentation {} saveSubsetFonts=\"1\">", XML_DECL, NAMESPACES);
        if self.master {
            xml.push_str(
                r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            );
        }
        if self.slides > 0 {
            xml.push_str("<p:sldIdLst>");
            for i in 0..self.slides {
                xml.push_str(&format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 2));
            }
            xml.push_str("</p:sldIdLst>");
        }
        xml.push_str(
            r#"<p:sldSz cx="9144000" cy="6858000" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/><p:defaultTextStyle/></p:presentation>"#,
        );
        xml
    }

    fn presentation_rels(&self) -> String {
        let mut entries = Vec::new();
        if self.master {
            entries.push((
                "rId1".to_string(),
                "slideMaster",
                "slideMasters/slideMaster1.xml".to_string(),
            ));
        }
        for i in 0..self.slides {
            entries.push((
                format!("rId{}", i + 2),
                "slide",
                format!("slides/slide{}.xml", i + 1),
            ));
        }
        entries.push((
            format!("rId{}", self.slides + 2),
            "theme",
            "theme/theme1.xml".to_string(),
        ));
        let borrowed: Vec<_> = entries
            .iter()
            .map(|(id, kind, target)| (id.as_str(), *kind, target.clone()))
            .collect();
        rels(&borrowed)
    }
}

fn package_rels() -> String {
    rels(&[("rId1", "officeDocument", "ppt/presentation.xml".to_string())])
}

fn rels(entries: &[(&str, &str, String)]) -> String {
    let mut xml = format!(r#"{}<Relationships xmlns="{}">"#, XML_DECL, RELS_NS);
    for (id, kind, target) in entries {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL_BASE, kind, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn theme() -> String {
    format!(
        r#"{}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements/></a:theme>"#,
        XML_DECL
    )
}

fn placeholder_sp(id: u32, name: &str, ph: &SamplePlaceholder) -> String {
    let mut ph_attrs = String::new();
    if let Some(ph_type) = ph.ph_type {
        ph_attrs.push_str(&format!(r#" type="{}""#, ph_type));
    }
    if ph.idx != 0 {
        ph_attrs.push_str(&format!(r#" idx="{}""#, ph.idx));
    }
    let sp_pr = match ph.extent {
        Some((x, y, cx, cy)) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr>"#,
            x, y, cx, cy
        ),
        None => "<p:spPr/>".to_string(),
    };
    let tx_body = match ph.ph_type {
        Some("pic") => "",
        _ => "<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang=\"en-US\"/></a:p></p:txBody>",
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph{}/></p:nvPr></p:nvSpPr>{}{}</p:sp>"#,
        id,
        escape(name),
        ph_attrs,
        sp_pr,
        tx_body
    )
}

fn shape_tree(shapes: &str) -> String {
    format!(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree>"#,
        shapes
    )
}

fn master(layouts: usize) -> String {
    let placeholders = [
        SamplePlaceholder {
            ph_type: Some("title"),
            idx: 0,
            extent: Some((457_200, 274_638, 8_229_600, 1_143_000)),
        },
        SamplePlaceholder {
            ph_type: Some("body"),
            idx: 1,
            extent: Some((457_200, 1_600_200, 8_229_600, 4_525_963)),
        },
        SamplePlaceholder {
            ph_type: Some("dt"),
            idx: 2,
            extent: Some((457_200, 6_356_350, 2_133_600, 365_125)),
        },
        SamplePlaceholder {
            ph_type: Some("ftr"),
            idx: 3,
            extent: Some((3_124_200, 6_356_350, 2_895_600, 365_125)),
        },
        SamplePlaceholder {
            ph_type: Some("sldNum"),
            idx: 4,
            extent: Some((6_553_200, 6_356_350, 2_133_600, 365_125)),
        },
    ];
    let names = [
        "Title Placeholder 1",
        "Text Placeholder 2",
        "Date Placeholder 3",
        "Footer Placeholder 4",
        "Slide Number Placeholder 5",
    ];
    let shapes: String = placeholders
        .iter()
        .zip(names)
        .enumerate()
        .map(|(i, (ph, name))| placeholder_sp(i as u32 + 2, name, ph))
        .collect();

    let mut layout_ids = String::new();
    if layouts > 0 {
        layout_ids.push_str("<p:sldLayoutIdLst>");
        for i in 0..layouts {
            layout_ids.push_str(&format!(
                r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
                2_147_483_649u64 + i as u64,
                i + 1
            ));
        }
        layout_ids.push_str("</p:sldLayoutIdLst>");
    }

    format!(
        r#"{}<p:sldMaster {}><p:cSld>{}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>{}</p:sldMaster>"#,
        XML_DECL,
        NAMESPACES,
        shape_tree(&shapes),
        layout_ids
    )
}

fn master_rels(layouts: usize) -> String {
    let mut entries: Vec<(String, &str, String)> = (1..=layouts)
        .map(|n| {
            (
                format!("rId{}", n),
                "slideLayout",
                format!("../slideLayouts/slideLayout{}.xml", n),
            )
        })
        .collect();
    entries.push((
        format!("rId{}", layouts + 1),
        "theme",
        "../theme/theme1.xml".to_string(),
    ));
    let borrowed: Vec<_> = entries
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.clone()))
        .collect();
    rels(&borrowed)
}

fn layout_xml(layout: &SampleLayout) -> String {
    let shapes: String = layout
        .placeholders
        .iter()
        .enumerate()
        .map(|(i, ph)| {
            let id = i as u32 + 2;
            let base = match ph.ph_type {
                Some("title") | Some("ctrTitle") => "Title",
                Some("subTitle") => "Subtitle",
                Some("body") => "Text Placeholder",
                Some("pic") => "Picture Placeholder",
                Some("dt") => "Date Placeholder",
                Some("ftr") => "Footer Placeholder",
                Some("sldNum") => "Slide Number Placeholder",
                Some(_) => "Placeholder",
                None => "Content Placeholder",
            };
            placeholder_sp(id, &format!("{} {}", base, id - 1), ph)
        })
        .collect();
    let type_attr = layout
        .layout_type
        .map(|t| format!(r#" type="{}""#, t))
        .unwrap_or_default();

    format!(
        r#"{}<p:sldLayout {}{} preserve="1"><p:cSld name="{}">{}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        XML_DECL,
        NAMESPACES,
        type_attr,
        escape(layout.name.as_str()),
        shape_tree(&shapes)
    )
}

fn slide_xml(n: usize) -> String {
    let title = format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>Slide {}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        n
    );
    format!(
        r#"{}<p:sld {}><p:cSld>{}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        XML_DECL,
        NAMESPACES,
        shape_tree(&title)
    )
}

/// A solid-color PNG of the given size.
pub fn sample_png(width: u32, height: u32) -> Result<Vec<u8>> {
    let image = RgbImage::from_pixel(width, height, Rgb([0x2f, 0x6f, 0xb5]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| Error::Image(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::OoxmlContainer;

    #[test]
    fn test_default_deck_parts() {
        let bytes = SampleDeck::new().slides(2).build().unwrap();
        let container = OoxmlContainer::from_bytes(bytes, u64::MAX).unwrap();
        for part in [
            "[Content_Types].xml",
            "ppt/presentation.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout5.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide2.xml.rels",
        ] {
            assert!(container.exists(part), "missing {}", part);
        }
        assert!(!container.exists("ppt/slides/slide3.xml"));
    }

    #[test]
    fn test_without_master() {
        let bytes = SampleDeck::new().without_master().build().unwrap();
        let container = OoxmlContainer::from_bytes(bytes, u64::MAX).unwrap();
        assert!(!container.exists("ppt/slideMasters/slideMaster1.xml"));
        assert!(!container.exists("ppt/slideLayouts/slideLayout1.xml"));
    }

    #[test]
    fn test_layout_names_are_escaped() {
        let bytes = SampleDeck::new()
            .layouts(vec![SampleLayout::new("Q&A <live>")])
            .build()
            .unwrap();
        let container = OoxmlContainer::from_bytes(bytes, u64::MAX).unwrap();
        let layout = container
            .read_document("ppt/slideLayouts/slideLayout1.xml")
            .unwrap();
        assert_eq!(layout.root.child("cSld").unwrap().attr("name"), Some("Q&A <live>"));
    }

    #[test]
    fn test_sample_png() {
        let png = sample_png(3, 2).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
