//! Minimal XML element tree for editing OOXML parts.
//!
//! Parts that slidemaker modifies (`presentation.xml`, slides, `.rels`,
//! `[Content_Types].xml`) are parsed into an [`Element`] tree with quick-xml,
//! edited in place, and written back. Attribute order, text, CDATA and
//! comments survive the round trip. Lookups compare local names so that
//! documents using unusual namespace prefixes still resolve.

use crate::error::{Error, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// A node in an element's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A child element.
    Element(Element),
    /// Character data (already unescaped).
    Text(String),
    /// A CDATA section.
    CData(String),
    /// A comment, kept verbatim.
    Comment(String),
}

/// An XML element with its qualified name, attributes and content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Qualified name as written, e.g. `p:sldId`.
    pub name: String,
    /// Attributes in document order, values unescaped.
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

/// Returns the local part of a qualified name (`p:sp` -> `sp`).
pub fn local_name(qname: &str) -> &str {
    qname.rsplit_once(':').map_or(qname, |(_, local)| local)
}

/// Returns the prefix of a qualified name, if any (`p:sp` -> `p`).
pub fn prefix(qname: &str) -> Option<&str> {
    qname.split_once(':').map(|(prefix, _)| prefix)
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    /// Builder: append a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Local part of this element's name.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Namespace prefix of this element's name.
    pub fn prefix(&self) -> Option<&str> {
        prefix(&self.name)
    }

    /// Whether the element's local name is `local`.
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Attribute value by exact qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of a namespaced attribute by local name, e.g. `r:id` or `r:embed`.
    ///
    /// Namespace declarations (`xmlns:*`) and unprefixed attributes are skipped,
    /// so `prefixed_attr("id")` never returns a plain `id`.
    pub fn prefixed_attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| match key.split_once(':') {
                Some((prefix, name)) => prefix != "xmlns" && name == local,
                None => false,
            })
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing one with the same name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Remove an attribute by exact qualified name.
    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.retain(|(key, _)| key != name);
    }

    /// Prefix bound to `uri` by an `xmlns:*` declaration on this element.
    pub fn namespace_prefix(&self, uri: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, value)| key.starts_with("xmlns:") && value == uri)
            .map(|(key, _)| &key["xmlns:".len()..])
    }

    /// Child elements, skipping text and comments.
    pub fn elements(&self) -> impl Iterator<Item = &Element> + '_ {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Mutable child elements.
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> + '_ {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Child elements with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |element| element.is(local))
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.elements().find(|element| element.is(local))
    }

    /// First child element with the given local name, mutably.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.elements_mut().find(|element| element.is(local))
    }

    /// Follow a chain of local names from this element.
    pub fn path(&self, locals: &[&str]) -> Option<&Element> {
        locals
            .iter()
            .try_fold(self, |element, local| element.child(local))
    }

    /// Follow a chain of local names from this element, mutably.
    pub fn path_mut(&mut self, locals: &[&str]) -> Option<&mut Element> {
        let mut current = self;
        for local in locals {
            current = current.child_mut(local)?;
        }
        Some(current)
    }

    /// All descendant elements with the given local name, in document order.
    pub fn descendants_named<'a>(&'a self, local: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_named(local, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, local: &str, found: &mut Vec<&'a Element>) {
        for element in self.elements() {
            if element.is(local) {
                found.push(element);
            }
            element.collect_named(local, found);
        }
    }

    /// Node index of the first child element with the given local name.
    pub fn position_of(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(element) if element.is(local)))
    }

    /// Append a child element.
    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Insert a child element at a node index (clamped to the end).
    pub fn insert(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, Node::Element(child));
    }

    /// Remove every child element with the given local name.
    pub fn remove_children_named(&mut self, local: &str) {
        self.children
            .retain(|node| !matches!(node, Node::Element(element) if element.is(local)));
    }

    /// Concatenated character data of this element and its descendants.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, text: &mut String) {
        for node in &self.children {
            match node {
                Node::Element(element) => element.collect_text(text),
                Node::Text(value) | Node::CData(value) => text.push_str(value),
                Node::Comment(_) => {}
            }
        }
    }
}

/// A parsed XML part: the root element. The declaration is regenerated on write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// The document element.
    pub root: Element,
}

impl XmlDocument {
    /// Wrap a root element.
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse XML text into an element tree.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        // Keep whitespace: a:t content is significant.
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => stack.push(element_from_start(&e)?),
                Ok(Event::Empty(e)) => {
                    let element = element_from_start(&e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::XmlParse("unbalanced end tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(Node::CData(String::from_utf8_lossy(&e).into_owned()));
                    }
                }
                Ok(Event::Comment(e)) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(Node::Comment(String::from_utf8_lossy(&e).into_owned()));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlParse(format!(
                        "{} (at byte {})",
                        e,
                        reader.buffer_position()
                    )))
                }
                // Declaration, doctype and processing instructions are not kept.
                Ok(_) => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(Error::XmlParse(format!("unclosed element <{}>", open.name)));
        }

        root.map(Self::new)
            .ok_or_else(|| Error::XmlParse("document has no root element".to_string()))
    }

    /// Serialize with a standalone UTF-8 declaration.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(write_error)?;
        writer.get_mut().write_all(b"\r\n")?;
        write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::XmlParse(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(Error::XmlParse("multiple root elements".to_string())),
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(write_error)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for child in &element.children {
        match child {
            Node::Element(child) => write_element(writer, child)?,
            Node::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
            Node::CData(text) => writer
                .write_event(Event::CData(BytesCData::new(text.as_str())))
                .map_err(write_error)?,
            Node::Comment(text) => writer
                .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
                .map_err(write_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_error)?;

    Ok(())
}

fn write_error(err: impl std::fmt::Display) -> Error {
    Error::XmlWrite(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRESENTATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst><p:sldId id="256" r:id="rId2"/><p:sldId id="257" r:id="rId3"/></p:sldIdLst><p:sldSz cx="9144000" cy="6858000"/></p:presentation>"#;

    #[test]
    fn test_parse_and_navigate() {
        let doc = XmlDocument::parse(PRESENTATION).unwrap();
        assert_eq!(doc.root.name, "p:presentation");
        assert!(doc.root.is("presentation"));

        let ids: Vec<_> = doc
            .root
            .child("sldIdLst")
            .unwrap()
            .children_named("sldId")
            .map(|e| (e.attr("id").unwrap(), e.prefixed_attr("id").unwrap()))
            .collect();
        assert_eq!(ids, vec![("256", "rId2"), ("257", "rId3")]);

        let size = doc.root.path(&["sldSz"]).unwrap();
        assert_eq!(size.attr("cx"), Some("9144000"));
    }

    #[test]
    fn test_namespace_prefix_lookup() {
        let doc = XmlDocument::parse(PRESENTATION).unwrap();
        assert_eq!(
            doc.root.namespace_prefix(
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships"
            ),
            Some("r")
        );
        assert_eq!(doc.root.namespace_prefix("urn:missing"), None);
    }

    #[test]
    fn test_round_trip_preserves_text_and_escapes() {
        let xml = r#"<a:p xmlns:a="urn:a"><a:r><a:t xml:space="preserve">  Q&amp;A &lt;draft&gt;  </a:t></a:r></a:p>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        assert_eq!(doc.root.text(), "  Q&A <draft>  ");

        let bytes = doc.to_bytes().unwrap();
        let written = String::from_utf8(bytes).unwrap();
        assert!(written.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(written.contains("Q&amp;A &lt;draft&gt;"));

        let reparsed = XmlDocument::parse(&written).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_attribute_values_are_escaped_on_write() {
        let root = Element::new("p:cSld").with_attr("name", "Title & \"Content\"");
        let written = String::from_utf8(XmlDocument::new(root).to_bytes().unwrap()).unwrap();
        assert!(written.contains("name=\"Title &amp; &quot;Content&quot;\""));

        let reparsed = XmlDocument::parse(&written).unwrap();
        assert_eq!(reparsed.root.attr("name"), Some("Title & \"Content\""));
    }

    #[test]
    fn test_edit_helpers() {
        let mut list = Element::new("p:sldIdLst")
            .with_child(Element::new("p:sldId").with_attr("id", "256"))
            .with_child(Element::new("p:sldId").with_attr("id", "257"));

        list.insert(0, Element::new("p:extLst"));
        assert_eq!(list.position_of("extLst"), Some(0));

        list.remove_children_named("extLst");
        assert_eq!(list.elements().count(), 2);

        let first = list.child_mut("sldId").unwrap();
        first.set_attr("id", "300");
        first.remove_attr("missing");
        assert_eq!(list.child("sldId").unwrap().attr("id"), Some("300"));
    }

    #[test]
    fn test_descendants_named() {
        let xml = r#"<p:txBody xmlns:p="urn:p" xmlns:a="urn:a"><a:p><a:r><a:t>One</a:t></a:r></a:p><a:p><a:r><a:t>Two</a:t></a:r></a:p></p:txBody>"#;
        let doc = XmlDocument::parse(xml).unwrap();
        let texts: Vec<_> = doc
            .root
            .descendants_named("t")
            .into_iter()
            .map(Element::text)
            .collect();
        assert_eq!(texts, vec!["One", "Two"]);
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("<a>").is_err());
        assert!(XmlDocument::parse("   ").is_err());
    }
}
