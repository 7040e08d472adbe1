// src/core/package.rs
use crate::core::xml::{self, Element};
use crate::error::{Result, ReviewError};
use std::io::{Cursor, Read, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const RT_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// One stored entry of the package. Names carry no leading slash (`word/document.xml`).
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub data: Vec<u8>,
}

/// ZIP-packaged part store. Entry order is kept so a saved package lists its parts the
/// way the source did, with new parts appended at the end.
#[derive(Debug, Clone)]
pub struct Package {
    parts: Vec<Part>,
}

impl Package {
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ReviewError::DocumentStructure(format!("not a .docx package: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part { name, data });
        }

        if parts.is_empty() {
            return Err(ReviewError::DocumentStructure(
                "package contains no parts".to_string(),
            ));
        }
        Ok(Self { parts })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.part(name).is_some()
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    /// Replace a part's content, or append the part if the package does not have it yet.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        match self.parts.iter_mut().find(|p| p.name == name) {
            Some(part) => part.data = data,
            None => self.parts.push(Part {
                name: name.to_string(),
                data,
            }),
        }
    }

    /// The part the package-level officeDocument relationship points to.
    pub fn main_document_part_name(&self) -> Result<String> {
        let package_rels = self.relationships("")?;
        if let Some(rel) = package_rels.find_by_type(RT_OFFICE_DOCUMENT) {
            let name = resolve_target("", &rel.target);
            if self.contains(&name) {
                return Ok(name);
            }
            return Err(ReviewError::DocumentStructure(format!(
                "main document part {} is missing",
                name
            )));
        }
        if self.contains(DEFAULT_MAIN_PART) {
            return Ok(DEFAULT_MAIN_PART.to_string());
        }
        Err(ReviewError::DocumentStructure(
            "package has no main document part".to_string(),
        ))
    }

    /// Relationships whose source is `source_part` (`""` for the package itself).
    /// A missing relationship part yields an empty set.
    pub fn relationships(&self, source_part: &str) -> Result<Relationships> {
        let rels_name = rels_part_name(source_part);
        match self.part(&rels_name) {
            Some(data) => Relationships::parse(source_part, data),
            None => Ok(Relationships::new(source_part)),
        }
    }

    pub fn set_relationships(&mut self, rels: &Relationships) -> Result<()> {
        let data = rels.to_bytes()?;
        self.set_part(&rels.part_name(), data);
        Ok(())
    }

    /// Register a content-type `Override` for a part, once.
    pub fn add_content_type_override(&mut self, part_name: &str, content_type: &str) -> Result<()> {
        let mut types = match self.part(CONTENT_TYPES_PART) {
            Some(data) => xml::parse(data)?,
            None => Element::new("Types").with_attr("xmlns", CONTENT_TYPES_NS),
        };

        let part_uri = format!("/{}", part_name);
        let registered = types
            .children_named("Override")
            .any(|el| el.attr("PartName").is_some_and(|p| p.eq_ignore_ascii_case(&part_uri)));
        if registered {
            return Ok(());
        }

        types.push(
            Element::new("Override")
                .with_attr("PartName", part_uri)
                .with_attr("ContentType", content_type),
        );
        self.set_part(CONTENT_TYPES_PART, xml::to_bytes(&types)?);
        Ok(())
    }

    /// Write every part into a fresh deflated archive.
    pub fn save(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for part in &self.parts {
            writer.start_file(part.name.as_str(), options)?;
            writer.write_all(&part.data)?;
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// The relationship set of one source part.
#[derive(Debug, Clone)]
pub struct Relationships {
    source: String,
    items: Vec<Relationship>,
}

impl Relationships {
    pub fn new(source_part: &str) -> Self {
        Self {
            source: source_part.to_string(),
            items: Vec::new(),
        }
    }

    pub fn parse(source_part: &str, data: &[u8]) -> Result<Self> {
        let root = xml::parse(data)?;
        let items = root
            .children_named("Relationship")
            .filter_map(|el| {
                Some(Relationship {
                    id: el.attr("Id")?.to_string(),
                    rel_type: el.attr("Type")?.to_string(),
                    target: el.attr("Target")?.to_string(),
                    external: el.attr("TargetMode") == Some("External"),
                })
            })
            .collect();
        Ok(Self {
            source: source_part.to_string(),
            items,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut root = Element::new("Relationships").with_attr("xmlns", RELS_NS);
        for rel in &self.items {
            let mut el = Element::new("Relationship")
                .with_attr("Id", rel.id.as_str())
                .with_attr("Type", rel.rel_type.as_str())
                .with_attr("Target", rel.target.as_str());
            if rel.external {
                el.set_attr("TargetMode", "External");
            }
            root.push(el);
        }
        xml::to_bytes(&root)
    }

    pub fn part_name(&self) -> String {
        rels_part_name(&self.source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.items.iter()
    }

    pub fn find_by_type(&self, rel_type: &str) -> Option<&Relationship> {
        self.items.iter().find(|r| r.rel_type == rel_type && !r.external)
    }

    /// Part name of the first internal target with the given type.
    pub fn target_part_name(&self, rel_type: &str) -> Option<String> {
        self.find_by_type(rel_type)
            .map(|rel| resolve_target(&self.source, &rel.target))
    }

    /// `rId{n}` one past the highest numeric id in use.
    pub fn next_id(&self) -> String {
        let max = self
            .items
            .iter()
            .filter_map(|r| r.id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("rId{}", max + 1)
    }

    /// Add an internal relationship to `target_part` and return its id.
    pub fn add(&mut self, rel_type: &str, target_part: &str) -> String {
        let id = self.next_id();
        self.items.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.to_string(),
            target: relative_target(&self.source, target_part),
            external: false,
        });
        id
    }
}

pub fn part_dir(part_name: &str) -> &str {
    match part_name.rfind('/') {
        Some(idx) => &part_name[..idx],
        None => "",
    }
}

/// `word/document.xml` → `word/_rels/document.xml.rels`, `""` → `_rels/.rels`.
pub fn rels_part_name(source_part: &str) -> String {
    let dir = part_dir(source_part);
    let file = &source_part[source_part.rfind('/').map_or(0, |i| i + 1)..];
    if dir.is_empty() {
        format!("_rels/{}.rels", file)
    } else {
        format!("{}/_rels/{}.rels", dir, file)
    }
}

/// Resolve a relationship target against its source part into a part name.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let joined = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        let dir = part_dir(source_part);
        if dir.is_empty() {
            target.to_string()
        } else {
            format!("{}/{}", dir, target)
        }
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
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

fn relative_target(source_part: &str, target_part: &str) -> String {
    let dir = part_dir(source_part);
    if dir.is_empty() {
        return target_part.to_string();
    }
    match target_part.strip_prefix(dir).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) => rest.to_string(),
        None => format!("/{}", target_part),
    }
}
