//! DOCX package codec.
//!
//! Reads a `.docx` into a [`Document`] and writes it back. Only the main
//! document body, the style sheet, and the default header/footer are
//! interpreted; every other part is copied through unchanged.

pub mod namespaces;
mod package;
mod reader;
mod schema;
mod writer;
pub mod xml;

pub use package::{rels_part_name, ContentTypes, Package, Relationships};

use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{Document, Element, HeaderFooter, HeaderFooterKind, Node, PartReference};

/// Relationship id used for a header part created by this crate.
pub const HEADER_REL_ID: &str = "rIdTexwordHeader";

/// Relationship id used for a footer part created by this crate.
pub const FOOTER_REL_ID: &str = "rIdTexwordFooter";

/// Read a `.docx` file.
pub fn read_docx<P: AsRef<Path>>(path: P) -> Result<Document> {
    let data = std::fs::read(path.as_ref())?;
    read_docx_bytes(&data)
}

/// Read a `.docx` from bytes.
pub fn read_docx_bytes(data: &[u8]) -> Result<Document> {
    let package = Package::from_bytes(data)?;
    let main_part = package.main_document_part()?;
    let root = package
        .xml_part(&main_part)?
        .ok_or_else(|| Error::InvalidPackage(format!("missing main part {}", main_part)))?;
    if root.local_name() != "document" {
        return Err(Error::InvalidPackage(format!(
            "unexpected root <{}> in {}",
            root.name, main_part
        )));
    }

    let rels = package.relationships_for(&main_part)?;
    let mut doc = Document::new();
    doc.attributes = root.attributes.clone();

    for child in root.into_elements() {
        if child.name == "w:body" {
            let (body, section) = reader::body(child);
            doc.body = body;
            if let Some(section) = section {
                doc.section = section;
            }
        } else {
            doc.prelude.push(child);
        }
    }

    if let Some((_, styles_part)) = rels.find_by_type(namespaces::REL_STYLES) {
        if let Some(styles) = package.xml_part(&styles_part)? {
            doc.styles = reader::style_sheet(styles);
        }
    }

    doc.header = read_header_footer(
        &package,
        &rels,
        doc.section.default_header(),
        HeaderFooterKind::Header,
    )?;
    doc.footer = read_header_footer(
        &package,
        &rels,
        doc.section.default_footer(),
        HeaderFooterKind::Footer,
    )?;

    log::debug!(
        "Read document: {} blocks, {} styles",
        doc.body.len(),
        doc.styles.styles.len()
    );
    doc.package = package;
    Ok(doc)
}

fn read_header_footer(
    package: &Package,
    rels: &Relationships,
    rel_id: Option<&str>,
    kind: HeaderFooterKind,
) -> Result<Option<HeaderFooter>> {
    let Some(rel_id) = rel_id else {
        return Ok(None);
    };
    let Some(part_name) = rels.target_of(rel_id) else {
        log::warn!("Relationship {} has no target part", rel_id);
        return Ok(None);
    };
    let Some(root) = package.xml_part(&part_name)? else {
        log::warn!("Referenced part {} is missing", part_name);
        return Ok(None);
    };
    Ok(Some(HeaderFooter {
        kind,
        part_name: Some(part_name),
        rel_id: Some(rel_id.to_string()),
        attributes: root.attributes.clone(),
        blocks: reader::blocks(root.into_elements()),
    }))
}

/// Write a document to a `.docx` file.
pub fn write_docx<P: AsRef<Path>>(doc: &Document, path: P) -> Result<()> {
    let bytes = to_docx_bytes(doc)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serialize a document to `.docx` bytes.
pub fn to_docx_bytes(doc: &Document) -> Result<Vec<u8>> {
    let mut package = if doc.package.is_empty() {
        Package::minimal()
    } else {
        doc.package.clone()
    };
    let main_part = package.main_document_part()?;
    let mut rels = package.relationships_for(&main_part)?;
    let mut types = package.content_types()?;
    let mut section = doc.section.clone();

    for part in [&doc.header, &doc.footer].into_iter().flatten() {
        let (root_name, rel_type, content_type, default_id, refs) = match part.kind {
            HeaderFooterKind::Header => (
                "w:hdr",
                namespaces::REL_HEADER,
                namespaces::CT_HEADER,
                HEADER_REL_ID,
                &mut section.header_refs,
            ),
            HeaderFooterKind::Footer => (
                "w:ftr",
                namespaces::REL_FOOTER,
                namespaces::CT_FOOTER,
                FOOTER_REL_ID,
                &mut section.footer_refs,
            ),
        };

        let part_name = match &part.part_name {
            Some(name) => name.clone(),
            None => format!("word/texword_{}.xml", &root_name[2..]),
        };
        if part.rel_id.is_none() {
            let target = relative_target(rels.base_dir(), &part_name);
            rels.set(default_id, rel_type, &target);
            types.ensure_override(&part_name, content_type);
            refs.retain(|r| r.kind != "default");
            refs.push(PartReference {
                kind: "default".into(),
                id: default_id.into(),
            });
        }

        let mut root = Element::new(root_name);
        root.attributes = part.attributes.clone();
        for block in writer::blocks(&part.blocks) {
            root.push(block);
        }
        // Header and footer parts must hold at least one paragraph.
        if part.blocks.is_empty() {
            root.push(Element::new("w:p"));
        }
        package.set_xml_part(&part_name, &root);
    }

    for media in &doc.media {
        let part_name = format!("word/media/{}", media.file_name);
        let extension = media.file_name.rsplit('.').next().unwrap_or("png");
        types.ensure_default(extension, namespaces::image_content_type(extension));
        rels.set(
            &media.rel_id,
            namespaces::REL_IMAGE,
            &relative_target(rels.base_dir(), &part_name),
        );
        package.set_part(&part_name, media.data.clone());
    }

    if !doc.styles.is_empty() {
        let styles_part = match rels.find_by_type(namespaces::REL_STYLES) {
            Some((_, part)) => part,
            None => {
                let part = "word/styles.xml".to_string();
                rels.set("rIdTexwordStyles", namespaces::REL_STYLES, "styles.xml");
                types.ensure_override(&part, namespaces::CT_STYLES);
                part
            }
        };
        package.set_xml_part(&styles_part, &writer::style_sheet(&doc.styles));
    }

    let mut root = Element::new("w:document");
    root.attributes = doc.attributes.clone();
    for prelude in &doc.prelude {
        root.push(prelude.clone());
    }
    let mut body = Element::new("w:body");
    body.children = writer::blocks(&doc.body)
        .into_iter()
        .map(Node::Element)
        .collect();
    body.push(writer::section_properties(&section));
    root.push(body);
    package.set_xml_part(&main_part, &root);

    package.set_relationships(&rels);
    package.set_content_types(&types);
    package.to_bytes()
}

fn relative_target(base_dir: &str, part_name: &str) -> String {
    let prefix = format!("{}/", base_dir);
    match part_name.strip_prefix(&prefix) {
        Some(relative) if !base_dir.is_empty() => relative.to_string(),
        _ => format!("/{}", part_name),
    }
}
