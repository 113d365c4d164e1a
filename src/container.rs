//! ZIP container abstraction for OOXML packages.
//!
//! The whole package is held in memory: every entry is read up front, parts
//! are replaced or added while a presentation is edited, and the archive is
//! rebuilt on save with the original entry order preserved.

use crate::error::{Error, Result};
use crate::xml::{Element, XmlDocument};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Namespace of package relationship parts.
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// A relationship entry from a .rels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative or absolute)
    pub target: String,
    /// Whether the target is external
    pub external: bool,
}

/// Ordered collection of relationships parsed from a .rels file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relationships {
    items: Vec<Relationship>,
}

impl Relationships {
    /// Create a new empty relationships collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `.rels` part.
    pub fn parse(xml: &str) -> Result<Self> {
        if xml.trim().is_empty() {
            return Ok(Self::new());
        }

        let doc = XmlDocument::parse(xml)?;
        let mut rels = Self::new();

        for element in doc.root.children_named("Relationship") {
            let id = element.attr("Id").unwrap_or_default();
            if id.is_empty() {
                continue;
            }
            rels.items.push(Relationship {
                id: id.to_string(),
                rel_type: element.attr("Type").unwrap_or_default().to_string(),
                target: element.attr("Target").unwrap_or_default().to_string(),
                external: element
                    .attr("TargetMode")
                    .is_some_and(|mode| mode.eq_ignore_ascii_case("external")),
            });
        }

        Ok(rels)
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.items.iter().find(|rel| rel.id == id)
    }

    /// Get relationships by type, in document order.
    pub fn get_by_type(&self, rel_type: &str) -> Vec<&Relationship> {
        self.items
            .iter()
            .filter(|rel| rel.rel_type == rel_type)
            .collect()
    }

    /// All relationships in document order.
    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a relationship.
    pub fn add(&mut self, rel: Relationship) {
        self.items.push(rel);
    }

    /// The first `rIdN` not already in use, counting from 1.
    pub fn next_id(&self) -> String {
        (1..)
            .map(|n| format!("rId{}", n))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or_else(|| format!("rId{}", self.items.len() + 1))
    }

    /// Add an internal relationship under a fresh ID, returning the ID.
    pub fn add_internal(&mut self, rel_type: &str, target: &str) -> String {
        let id = self.next_id();
        self.add(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            external: false,
        });
        id
    }

    /// Serialize to a `.rels` part.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut root = Element::new("Relationships").with_attr("xmlns", RELATIONSHIPS_NS);
        for rel in &self.items {
            let mut element = Element::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if rel.external {
                element.set_attr("TargetMode", "External");
            }
            root.push(element);
        }
        XmlDocument::new(root).to_bytes()
    }
}

/// Fix XML encoding declaration from UTF-16 to UTF-8.
///
/// When we decode UTF-16 XML to a Rust String (UTF-8), the XML declaration
/// still says encoding="UTF-16". This causes quick-xml to fail when it tries
/// to re-interpret the already-decoded UTF-8 string as UTF-16.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
///
/// OOXML files are typically UTF-8 encoded, but some (especially older
/// or non-standard documents) may use UTF-16 encoding.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    // UTF-8 BOM: EF BB BF
    if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)));
    }

    // UTF-16 LE BOM: FF FE
    if bytes.len() >= 2 && bytes[0] == 0xFF && bytes[1] == 0xFE {
        let content = decode_utf16(&bytes[2..], u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    // UTF-16 BE BOM: FE FF
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let content = decode_utf16(&bytes[2..], u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // UTF-16 without BOM has null bytes beside every ASCII character
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                decode_utf16(bytes, u16::from_le_bytes)
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                decode_utf16(bytes, u16::from_be_bytes)
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

/// Decode UTF-16 bytes with the given byte order.
fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// One archive entry.
#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
}

/// OOXML container: an in-memory, editable ZIP archive.
///
/// Entry names are package part names without the leading slash
/// (`ppt/presentation.xml`).
#[derive(Clone)]
pub struct OoxmlContainer {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl OoxmlContainer {
    /// Open an OOXML container from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use slidemaker::container::OoxmlContainer;
    ///
    /// let container = OoxmlContainer::open("deck.pptx")?;
    /// assert!(container.exists("[Content_Types].xml"));
    /// # Ok::<(), slidemaker::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file), u64::MAX)
    }

    /// Create an OOXML container from a byte vector.
    ///
    /// `max_unpacked` bounds the sum of the entries' uncompressed sizes.
    pub fn from_bytes(data: Vec<u8>, max_unpacked: u64) -> Result<Self> {
        Self::from_reader(Cursor::new(data), max_unpacked)
    }

    /// Create an OOXML container from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R, max_unpacked: u64) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        let declared: u64 = (0..archive.len())
            .filter_map(|i| archive.by_index_raw(i).ok().map(|file| file.size()))
            .sum();
        if declared > max_unpacked {
            return Err(Error::InvalidData(format!(
                "archive unpacks to {} bytes (limit {})",
                declared, max_unpacked
            )));
        }

        let mut container = Self {
            entries: Vec::with_capacity(archive.len()),
            index: HashMap::new(),
        };

        // Declared sizes can lie, so the ceiling also applies to inflated bytes.
        let mut inflated: u64 = 0;
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let remaining = max_unpacked - inflated;
            let mut data = Vec::with_capacity(file.size().min(remaining) as usize);
            (&mut file)
                .take(remaining.saturating_add(1))
                .read_to_end(&mut data)?;
            inflated = inflated.saturating_add(data.len() as u64);
            if inflated > max_unpacked {
                return Err(Error::InvalidData(format!(
                    "archive unpacks to more than {} bytes (at entry {})",
                    max_unpacked, name
                )));
            }
            container.put(&name, data);
        }

        Ok(container)
    }

    /// Read an XML file from the archive as a string.
    ///
    /// Handles different encodings:
    /// - UTF-8 (with or without BOM)
    /// - UTF-16 LE (with BOM: FF FE)
    /// - UTF-16 BE (with BOM: FE FF)
    pub fn read_xml(&self, path: &str) -> Result<String> {
        decode_xml_bytes(self.read_binary(path)?)
    }

    /// Read and parse an XML part into an element tree.
    pub fn read_document(&self, path: &str) -> Result<XmlDocument> {
        XmlDocument::parse(&self.read_xml(path)?)
    }

    /// Read a binary file from the archive.
    pub fn read_binary(&self, path: &str) -> Result<&[u8]> {
        self.index
            .get(path)
            .map(|&i| self.entries[i].data.as_slice())
            .ok_or_else(|| Error::MissingComponent(path.to_string()))
    }

    /// Check if a file exists in the archive.
    pub fn exists(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// List all files in the archive, in archive order.
    pub fn list_files(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    /// List files matching a prefix.
    pub fn list_files_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.name.starts_with(prefix))
            .map(|entry| entry.name.clone())
            .collect()
    }

    /// Replace a part's bytes, or append a new part.
    pub fn put(&mut self, path: &str, data: Vec<u8>) {
        match self.index.get(path) {
            Some(&i) => self.entries[i].data = data,
            None => {
                self.index.insert(path.to_string(), self.entries.len());
                self.entries.push(Entry {
                    name: path.to_string(),
                    data,
                });
            }
        }
    }

    /// Serialize an element tree into a part.
    pub fn put_document(&mut self, path: &str, doc: &XmlDocument) -> Result<()> {
        let bytes = doc.to_bytes()?;
        self.put(path, bytes);
        Ok(())
    }

    /// Read and parse relationships for a part.
    ///
    /// A part without a `.rels` file has no relationships.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = Self::rels_path(part_path);
        if !self.exists(&rels_path) {
            return Ok(Relationships::new());
        }
        Relationships::parse(&self.read_xml(&rels_path)?)
    }

    /// Read package-level relationships (_rels/.rels).
    pub fn read_package_relationships(&self) -> Result<Relationships> {
        self.read_relationships("")
    }

    /// Write relationships for a part.
    pub fn put_relationships(&mut self, part_path: &str, rels: &Relationships) -> Result<()> {
        let bytes = rels.to_xml()?;
        self.put(&Self::rels_path(part_path), bytes);
        Ok(())
    }

    /// Path of the `.rels` part belonging to `part_path`.
    ///
    /// `ppt/slides/slide1.xml` -> `ppt/slides/_rels/slide1.xml.rels`
    pub fn rels_path(part_path: &str) -> String {
        if part_path.is_empty() || part_path == "/" {
            return "_rels/.rels".to_string();
        }
        match part_path.rsplit_once('/') {
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => format!("_rels/{}.rels", part_path),
        }
    }

    /// Build the ZIP archive.
    ///
    /// `[Content_Types].xml` is written first, then every other entry in
    /// its original order.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let content_types = self
            .entries
            .iter()
            .filter(|entry| entry.name == "[Content_Types].xml");
        let others = self
            .entries
            .iter()
            .filter(|entry| entry.name != "[Content_Types].xml");

        for entry in content_types.chain(others) {
            zip.start_file(entry.name.as_str(), options)?;
            zip.write_all(&entry.data)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Resolve a relative path from a base path.
    pub fn resolve_path(base: &str, relative: &str) -> String {
        if let Some(stripped) = relative.strip_prefix('/') {
            return stripped.to_string();
        }

        let mut parts: Vec<&str> = base.split('/').collect();
        // Drop the base file name, keep its directory.
        parts.pop();

        for component in relative.split('/') {
            match component {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                name => parts.push(name),
            }
        }

        parts.join("/")
    }

    /// Relative relationship target from the part `from` to the part `to`.
    ///
    /// `ppt/slides/slide3.xml` -> `ppt/slideLayouts/slideLayout2.xml` gives
    /// `../slideLayouts/slideLayout2.xml`.
    pub fn relative_target(from: &str, to: &str) -> String {
        let from_dir: Vec<&str> = match from.rsplit_once('/') {
            Some((dir, _)) => dir.split('/').collect(),
            None => Vec::new(),
        };
        let to_parts: Vec<&str> = to.split('/').collect();

        let common = from_dir
            .iter()
            .zip(&to_parts)
            .take_while(|(a, b)| a == b)
            .count();
        // The file name itself is never shared.
        let common = common.min(to_parts.len().saturating_sub(1));

        let mut target: Vec<&str> = vec![".."; from_dir.len() - common];
        target.extend(&to_parts[common..]);
        target.join("/")
    }
}

impl std::fmt::Debug for OoxmlContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OoxmlContainer")
            .field("files", &self.entries.len())
            .finish()
    }
}
