use crate::core::document::{Document, WordNames, W_NS};
use crate::core::package::{part_dir, Package};
use crate::core::xml::{self, Element};
use crate::error::{Result, ReviewError};
use chrono::{DateTime, Utc};
use log::{debug, info};

pub const RT_COMMENTS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
pub const CT_COMMENTS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml";

pub const DEFAULT_AUTHOR: &str = "AI Reviewer";
const FALLBACK_INITIALS: &str = "A";

/// Who wrote a comment and when.
#[derive(Debug, Clone)]
pub struct CommentMeta {
    pub author: String,
    pub date: DateTime<Utc>,
}

impl CommentMeta {
    pub fn new(author: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            author: author.into(),
            date,
        }
    }

    pub fn initials(&self) -> String {
        self.author
            .chars()
            .next()
            .map(String::from)
            .unwrap_or_else(|| FALLBACK_INITIALS.to_string())
    }
}

impl Default for CommentMeta {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHOR, Utc::now())
    }
}

/// The `w:comments` part of a document: its part name and parsed root.
#[derive(Debug, Clone)]
pub struct CommentsPart {
    name: String,
    root: Element,
    names: WordNames,
}

impl CommentsPart {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comments(&self) -> impl Iterator<Item = &Element> {
        self.names.children(&self.root, "comment")
    }

    /// Identifiers of the records in the part, in document order.
    pub fn ids(&self) -> Vec<u32> {
        let key = self.names.qname("id");
        self.comments()
            .filter_map(|c| c.attr(&key).and_then(|id| id.parse().ok()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.comments().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifier for the next record: current record count plus one.
    pub fn next_id(&self) -> u32 {
        self.len() as u32 + 1
    }

    /// Body text of the comment with the given identifier.
    pub fn comment_text(&self, id: u32) -> Option<String> {
        let id = id.to_string();
        let key = self.names.qname("id");
        let comment = self
            .comments()
            .find(|c| c.attr(&key) == Some(id.as_str()))?;
        Some(
            comment
                .descendants()
                .into_iter()
                .filter(|el| self.names.is(&el.name, "t"))
                .map(Element::text)
                .collect(),
        )
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        xml::to_bytes(&self.root)
    }

    fn push(&mut self, comment: Element) {
        self.root.push(comment);
    }
}

/// Find the document's comments part, or create and register one.
///
/// An existing `comments` relationship from the main part is always reused, so repeated
/// calls never add a second part or relationship.
pub fn resolve_comments(doc: &mut Document) -> Result<&mut CommentsPart> {
    let part = match doc.comments.take() {
        Some(part) => part,
        None => load_or_create(&mut doc.package, &doc.main_part)?,
    };
    Ok(doc.comments.insert(part))
}

fn load_or_create(package: &mut Package, main_part: &str) -> Result<CommentsPart> {
    let mut rels = package.relationships(main_part).map_err(|e| {
        ReviewError::DocumentStructure(format!("unreadable relationships for {}: {}", main_part, e))
    })?;

    if let Some(name) = rels.target_part_name(RT_COMMENTS) {
        let data = package.part(&name).ok_or_else(|| {
            ReviewError::DocumentStructure(format!("comments part {} is missing", name))
        })?;
        let mut root = xml::parse(data).map_err(|e| {
            ReviewError::DocumentStructure(format!("malformed comments part {}: {}", name, e))
        })?;
        let names = WordNames::bind(&mut root);
        debug!("Reusing comments part {}", name);
        return Ok(CommentsPart { name, root, names });
    }

    let name = free_part_name(package, part_dir(main_part));
    let mut root = Element::new("w:comments").with_attr("xmlns:w", W_NS);
    let names = WordNames::bind(&mut root);
    let data = xml::to_bytes(&root)?;

    package
        .add_content_type_override(&name, CT_COMMENTS)
        .map_err(|e| {
            ReviewError::DocumentStructure(format!("unreadable content types: {}", e))
        })?;
    package.set_part(&name, data);
    let rel_id = rels.add(RT_COMMENTS, &name);
    package.set_relationships(&rels)?;
    info!("Created comments part {} ({})", name, rel_id);

    Ok(CommentsPart { name, root, names })
}

fn free_part_name(package: &Package, dir: &str) -> String {
    let join = |file: &str| {
        if dir.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", dir, file)
        }
    };
    let mut name = join("comments.xml");
    let mut n = 1;
    while package.contains(&name) {
        name = join(&format!("comments{}.xml", n));
        n += 1;
    }
    name
}

/// Append one comment record and write the part back into the package.
///
/// Returns the allocated identifier, or `None` when the text is blank and nothing was
/// added. Identifiers come from the record count, so calls against one document must
/// not interleave.
pub fn add_comment(doc: &mut Document, text: &str, meta: &CommentMeta) -> Result<Option<u32>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let part = resolve_comments(doc)?;
    let id = part.next_id();
    let comment = comment_element(id, text, meta, &part.names);
    part.push(comment);

    let data = part
        .to_bytes()
        .map_err(|e| ReviewError::CommentSynthesis(format!("serializing comments: {}", e)))?;
    let name = part.name().to_string();
    doc.package.set_part(&name, data);

    debug!("Added comment {} ({} chars) to {}", id, text.chars().count(), name);
    Ok(Some(id))
}

fn comment_element(id: u32, text: &str, meta: &CommentMeta, names: &WordNames) -> Element {
    let w = |local: &str| Element::new(names.qname(local));
    let val = names.qname("val");

    let paragraph = w("p")
        .with_child(w("pPr").with_child(w("pStyle").with_attr(val.as_str(), "CommentText")))
        .with_child(
            w("r")
                .with_child(
                    w("rPr").with_child(w("rStyle").with_attr(val.as_str(), "CommentReference")),
                )
                .with_child(w("annotationRef")),
        )
        .with_child(w("r").with_child(w("t").with_attr("xml:space", "preserve").with_text(text)));

    w("comment")
        .with_attr(names.qname("id"), id.to_string())
        .with_attr(names.qname("author"), meta.author.as_str())
        .with_attr(
            names.qname("date"),
            meta.date.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        )
        .with_attr(names.qname("initials"), meta.initials())
        .with_child(paragraph)
}
