//! ZIP package container, relationships, and content types.

use std::io::{Cursor, Read, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::namespaces;
use super::xml;
use crate::error::{Error, Result};
use crate::model::Element;

/// Part name of the content-types manifest.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// Part name of the package-level relationships.
pub const ROOT_RELS_PART: &str = "_rels/.rels";

/// An Open Packaging Conventions container held fully in memory.
///
/// Parts keep their original order so a write-back produces an archive
/// with the same layout as the input.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Read a package from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Read a package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let mut parts = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut buf)?;
            parts.push((entry.name().to_string(), buf));
        }

        let package = Self { parts };
        if !package.contains(CONTENT_TYPES_PART) {
            return Err(Error::InvalidPackage(format!(
                "missing {}",
                CONTENT_TYPES_PART
            )));
        }
        log::debug!("Read package with {} parts", package.parts.len());
        Ok(package)
    }

    /// The smallest valid word-processing package: an empty body and style sheet.
    pub fn minimal() -> Self {
        let content_types = format!(
            "{decl}<Types xmlns=\"{ns}\">\
             <Default Extension=\"rels\" ContentType=\"{rels}\"/>\
             <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
             <Override PartName=\"/word/document.xml\" ContentType=\"{doc}\"/>\
             <Override PartName=\"/word/styles.xml\" ContentType=\"{styles}\"/>\
             </Types>",
            decl = xml::XML_DECLARATION,
            ns = namespaces::CONTENT_TYPES,
            rels = namespaces::CT_RELATIONSHIPS,
            doc = namespaces::CT_DOCUMENT,
            styles = namespaces::CT_STYLES,
        );
        let root_rels = format!(
            "{decl}<Relationships xmlns=\"{ns}\">\
             <Relationship Id=\"rId1\" Type=\"{rel}\" Target=\"word/document.xml\"/>\
             </Relationships>",
            decl = xml::XML_DECLARATION,
            ns = namespaces::PACKAGE_RELATIONSHIPS,
            rel = namespaces::REL_OFFICE_DOCUMENT,
        );
        let document_rels = format!(
            "{decl}<Relationships xmlns=\"{ns}\">\
             <Relationship Id=\"rId1\" Type=\"{rel}\" Target=\"styles.xml\"/>\
             </Relationships>",
            decl = xml::XML_DECLARATION,
            ns = namespaces::PACKAGE_RELATIONSHIPS,
            rel = namespaces::REL_STYLES,
        );
        let document = format!(
            "{decl}<w:document xmlns:w=\"{w}\"><w:body/></w:document>",
            decl = xml::XML_DECLARATION,
            w = namespaces::WORDML,
        );
        let styles = format!(
            "{decl}<w:styles xmlns:w=\"{w}\"/>",
            decl = xml::XML_DECLARATION,
            w = namespaces::WORDML,
        );

        Self {
            parts: vec![
                (CONTENT_TYPES_PART.to_string(), content_types.into_bytes()),
                (ROOT_RELS_PART.to_string(), root_rels.into_bytes()),
                ("word/document.xml".to_string(), document.into_bytes()),
                (
                    "word/_rels/document.xml.rels".to_string(),
                    document_rels.into_bytes(),
                ),
                ("word/styles.xml".to_string(), styles.into_bytes()),
            ],
        }
    }

    /// Check if the package has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Check whether a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    /// Raw bytes of a part.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Parse a part as XML.
    pub fn xml_part(&self, name: &str) -> Result<Option<Element>> {
        self.part(name).map(xml::parse).transpose()
    }

    /// Insert or replace a part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = data,
            None => self.parts.push((name.to_string(), data)),
        }
    }

    /// Serialize an element into a part.
    pub fn set_xml_part(&mut self, name: &str, root: &Element) {
        self.set_part(name, xml::to_xml(root).into_bytes());
    }

    /// Part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// Name of the main document part, from the package relationships.
    pub fn main_document_part(&self) -> Result<String> {
        let rels = self.relationships_for("")?;
        Ok(rels
            .find_by_type(namespaces::REL_OFFICE_DOCUMENT)
            .map(|(_, target)| target)
            .unwrap_or_else(|| "word/document.xml".to_string()))
    }

    /// Relationships whose source is `part` (empty string for the package itself).
    pub fn relationships_for(&self, part: &str) -> Result<Relationships> {
        let rels_part = rels_part_name(part);
        let root = match self.xml_part(&rels_part)? {
            Some(root) => root,
            None => Element::new("Relationships")
                .with_attr("xmlns", namespaces::PACKAGE_RELATIONSHIPS),
        };
        Ok(Relationships {
            part_name: rels_part,
            base_dir: parent_dir(part).to_string(),
            root,
        })
    }

    /// Store relationships back into their part.
    pub fn set_relationships(&mut self, rels: &Relationships) {
        self.set_xml_part(&rels.part_name, &rels.root);
    }

    /// Parsed content-types manifest.
    pub fn content_types(&self) -> Result<ContentTypes> {
        let root = self
            .xml_part(CONTENT_TYPES_PART)?
            .ok_or_else(|| Error::InvalidPackage(format!("missing {}", CONTENT_TYPES_PART)))?;
        Ok(ContentTypes { root })
    }

    /// Store the content-types manifest.
    pub fn set_content_types(&mut self, types: &ContentTypes) {
        self.set_xml_part(CONTENT_TYPES_PART, &types.root);
    }

    /// Write the package as a ZIP archive, manifest first.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let manifest = self.parts.iter().filter(|(n, _)| n == CONTENT_TYPES_PART);
        let rest = self.parts.iter().filter(|(n, _)| n != CONTENT_TYPES_PART);
        for (name, data) in manifest.chain(rest) {
            writer.start_file(name.as_str(), options)?;
            writer.write_all(data)?;
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Relationships part for a source part (`word/document.xml` → `word/_rels/document.xml.rels`).
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part.is_empty() => ROOT_RELS_PART.to_string(),
        None => format!("_rels/{}.rels", part),
    }
}

fn parent_dir(part: &str) -> &str {
    part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Resolve a relationship target against the source part's directory.
fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// A relationships part.
#[derive(Debug, Clone)]
pub struct Relationships {
    part_name: String,
    base_dir: String,
    root: Element,
}

impl Relationships {
    /// Resolved part name of an internal relationship.
    pub fn target_of(&self, id: &str) -> Option<String> {
        self.root
            .elements()
            .find(|r| r.attr("Id") == Some(id) && r.attr("TargetMode") != Some("External"))
            .and_then(|r| r.attr("Target"))
            .map(|t| resolve_target(&self.base_dir, t))
    }

    /// First internal relationship of a type, as `(id, resolved part name)`.
    pub fn find_by_type(&self, rel_type: &str) -> Option<(String, String)> {
        self.root
            .elements()
            .find(|r| r.attr("Type") == Some(rel_type) && r.attr("TargetMode") != Some("External"))
            .and_then(|r| {
                let id = r.attr("Id")?;
                let target = r.attr("Target")?;
                Some((id.to_string(), resolve_target(&self.base_dir, target)))
            })
    }

    /// Check whether an id is taken.
    pub fn contains(&self, id: &str) -> bool {
        self.root.elements().any(|r| r.attr("Id") == Some(id))
    }

    /// Add or replace a relationship; `target` is relative to the source part.
    pub fn set(&mut self, id: &str, rel_type: &str, target: &str) {
        self.root
            .children
            .retain(|n| !matches!(n, crate::model::Node::Element(e) if e.attr("Id") == Some(id)));
        self.root.push(
            Element::new("Relationship")
                .with_attr("Id", id)
                .with_attr("Type", rel_type)
                .with_attr("Target", target),
        );
    }

    /// Directory of the source part, for building relative targets.
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }
}

/// The `[Content_Types].xml` manifest.
#[derive(Debug, Clone)]
pub struct ContentTypes {
    root: Element,
}

impl ContentTypes {
    /// Declare the content type of a part unless already declared.
    pub fn ensure_override(&mut self, part_name: &str, content_type: &str) {
        let key = format!("/{}", part_name.trim_start_matches('/'));
        let exists = self
            .root
            .elements()
            .any(|e| e.name == "Override" && e.attr("PartName") == Some(key.as_str()));
        if !exists {
            self.root.push(
                Element::new("Override")
                    .with_attr("PartName", key)
                    .with_attr("ContentType", content_type),
            );
        }
    }

    /// Declare the content type of an extension unless already declared.
    pub fn ensure_default(&mut self, extension: &str, content_type: &str) {
        let exists = self.root.elements().any(|e| {
            e.name == "Default"
                && e.attr("Extension")
                    .is_some_and(|x| x.eq_ignore_ascii_case(extension))
        });
        if !exists {
            // Defaults must precede overrides.
            let default = crate::model::Node::Element(
                Element::new("Default")
                    .with_attr("Extension", extension)
                    .with_attr("ContentType", content_type),
            );
            self.root.children.insert(0, default);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rels_part_name() {
        assert_eq!(rels_part_name("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_part_name(""), "_rels/.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("word", "styles.xml"), "word/styles.xml");
        assert_eq!(resolve_target("word", "/word/media/a.png"), "word/media/a.png");
        assert_eq!(resolve_target("word/sub", "../header1.xml"), "word/header1.xml");
        assert_eq!(resolve_target("", "word/document.xml"), "word/document.xml");
    }

    #[test]
    fn test_minimal_roundtrip() {
        let package = Package::minimal();
        let bytes = package.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"PK\x03\x04");

        let reread = Package::from_bytes(&bytes).unwrap();
        assert_eq!(reread.main_document_part().unwrap(), "word/document.xml");
        let rels = reread.relationships_for("word/document.xml").unwrap();
        let (_, styles) = rels.find_by_type(namespaces::REL_STYLES).unwrap();
        assert_eq!(styles, "word/styles.xml");
    }

    #[test]
    fn test_content_type_registration_is_idempotent() {
        let mut package = Package::minimal();
        let mut types = package.content_types().unwrap();
        types.ensure_override("word/header1.xml", namespaces::CT_HEADER);
        types.ensure_override("/word/header1.xml", namespaces::CT_HEADER);
        types.ensure_default("png", "image/png");
        types.ensure_default("PNG", "image/png");
        package.set_content_types(&types);

        let root = package.xml_part(CONTENT_TYPES_PART).unwrap().unwrap();
        let headers = root
            .elements()
            .filter(|e| e.attr("PartName") == Some("/word/header1.xml"))
            .count();
        let pngs = root
            .elements()
            .filter(|e| e.attr("Extension") == Some("png"))
            .count();
        assert_eq!(headers, 1);
        assert_eq!(pngs, 1);
    }

    #[test]
    fn test_rejects_non_package() {
        assert!(Package::from_bytes(b"not a zip").is_err());
    }
}
