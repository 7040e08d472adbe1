use crate::core::comments::CommentsPart;
use crate::core::package::Package;
use crate::core::xml::{self, Element};
use crate::error::{Result, ReviewError};
use log::debug;

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Elements that wrap runs inside a paragraph without being runs themselves.
const RUN_CONTAINERS: &[&str] = &[
    "hyperlink",
    "smartTag",
    "ins",
    "fldSimple",
    "sdt",
    "sdtContent",
    "customXml",
];

/// How one part spells WordprocessingML names: `w:p`, `x:p` or a plain `p` under a
/// default namespace.
///
/// Only declarations on the part's root element are read. Any prefix bound to [`W_NS`]
/// there matches; new elements and attributes are written with one preferred prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordNames {
    /// Bound prefixes, `None` standing for the default namespace
    bound: Vec<Option<String>>,
    prefix: String,
}

impl WordNames {
    /// Read the bindings declared on `root`.
    ///
    /// A part that binds the namespace only as the default gets a `w` prefix (or `w1`,
    /// `w2`, ... if taken) declared on its root, since WordprocessingML attributes must be
    /// qualified. A part that never declares it is read with the literal `w:` prefix.
    pub fn bind(root: &mut Element) -> Self {
        let mut bound: Vec<Option<String>> = root
            .attributes
            .iter()
            .filter(|(_, value)| value == W_NS)
            .filter_map(|(key, _)| match key.as_str() {
                "xmlns" => Some(None),
                other => other.strip_prefix("xmlns:").map(|p| Some(p.to_string())),
            })
            .collect();
        if bound.is_empty() {
            return Self::conventional();
        }

        let preferred = bound
            .iter()
            .flatten()
            .find(|p| p.as_str() == "w")
            .or_else(|| bound.iter().flatten().next())
            .cloned();
        let prefix = match preferred {
            Some(prefix) => prefix,
            None => {
                let prefix = free_prefix(root);
                root.set_attr(format!("xmlns:{}", prefix), W_NS);
                bound.push(Some(prefix.clone()));
                prefix
            }
        };
        Self { bound, prefix }
    }

    /// The `w:` spelling Word itself writes.
    pub fn conventional() -> Self {
        Self {
            bound: vec![Some("w".to_string())],
            prefix: "w".to_string(),
        }
    }

    /// Local part of `name` when it is in the WordprocessingML namespace.
    pub fn local<'a>(&self, name: &'a str) -> Option<&'a str> {
        let (prefix, local) = match name.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, name),
        };
        self.bound
            .iter()
            .any(|bound| bound.as_deref() == prefix)
            .then_some(local)
    }

    pub fn is(&self, name: &str, local: &str) -> bool {
        self.local(name) == Some(local)
    }

    /// Qualified name for a new element or attribute.
    pub fn qname(&self, local: &str) -> String {
        format!("{}:{}", self.prefix, local)
    }

    pub fn child<'a>(&self, parent: &'a Element, local: &str) -> Option<&'a Element> {
        parent.elements().find(|el| self.is(&el.name, local))
    }

    pub fn children<'a>(
        &'a self,
        parent: &'a Element,
        local: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        parent.elements().filter(move |el| self.is(&el.name, local))
    }
}

fn free_prefix(root: &Element) -> String {
    let mut prefix = "w".to_string();
    let mut n = 0;
    while root.attr(&format!("xmlns:{}", prefix)).is_some() {
        n += 1;
        prefix = format!("w{}", n);
    }
    prefix
}

/// An opened word-processing package with its main part loaded as a mutable tree.
///
/// Blocks are the direct paragraph children of the body, addressed by their position in
/// that sequence. The comments part is loaded or created on first use through
/// [`crate::core::comments::resolve_comments`].
pub struct Document {
    pub(crate) package: Package,
    pub(crate) main_part: String,
    pub(crate) root: Element,
    pub(crate) names: WordNames,
    pub(crate) comments: Option<CommentsPart>,
}

impl Document {
    /// Open a document from the raw package bytes. The bytes are only read.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let package = Package::open(bytes)?;
        let main_part = package.main_document_part_name()?;
        let data = package.part(&main_part).ok_or_else(|| {
            ReviewError::DocumentStructure(format!("main document part {} is missing", main_part))
        })?;
        let mut root = xml::parse(data)?;
        let names = WordNames::bind(&mut root);
        if names.child(&root, "body").is_none() {
            return Err(ReviewError::DocumentStructure(format!(
                "{} has no body element",
                main_part
            )));
        }
        debug!("Opened {} with {} parts", main_part, package.part_names().count());

        Ok(Self {
            package,
            main_part,
            root,
            names,
            comments: None,
        })
    }

    pub fn names(&self) -> &WordNames {
        &self.names
    }

    fn body(&self) -> Option<&Element> {
        self.names.child(&self.root, "body")
    }

    fn paragraphs(&self) -> impl Iterator<Item = &Element> {
        self.body()
            .into_iter()
            .flat_map(|body| self.names.children(body, "p"))
    }

    pub fn block_count(&self) -> usize {
        self.paragraphs().count()
    }

    pub fn block(&self, index: usize) -> Option<&Element> {
        self.paragraphs().nth(index)
    }

    pub fn block_mut(&mut self, index: usize) -> Option<&mut Element> {
        let names = &self.names;
        self.root
            .elements_mut()
            .find(|el| names.is(&el.name, "body"))?
            .elements_mut()
            .filter(|el| names.is(&el.name, "p"))
            .nth(index)
    }

    pub fn block_text(&self, index: usize) -> Option<String> {
        self.block(index).map(|p| paragraph_text(p, &self.names))
    }

    /// Plain text of every block, in document order.
    pub fn block_texts(&self) -> Vec<String> {
        self.paragraphs()
            .map(|p| paragraph_text(p, &self.names))
            .collect()
    }

    /// True when there are no blocks or every block is whitespace only.
    pub fn is_blank(&self) -> bool {
        self.block_texts().iter().all(|text| text.trim().is_empty())
    }

    pub fn comments(&self) -> Option<&CommentsPart> {
        self.comments.as_ref()
    }

    /// Serialize the main part back into the package and write a new archive.
    ///
    /// The comments part needs no flush here: every insertion writes it back to the
    /// package as soon as the record is appended.
    pub fn save(&mut self) -> Result<Vec<u8>> {
        let data = xml::to_bytes(&self.root)?;
        self.package.set_part(&self.main_part, data);
        self.package.save()
    }
}

/// Text of one paragraph the way a reader sees it: run text, tabs and line breaks.
pub fn paragraph_text(paragraph: &Element, names: &WordNames) -> String {
    let mut text = String::new();
    collect_runs(paragraph, names, &mut text);
    text
}

fn collect_runs(container: &Element, names: &WordNames, out: &mut String) {
    for child in container.elements() {
        match names.local(&child.name) {
            Some("r") => run_text(child, names, out),
            Some(local) if RUN_CONTAINERS.contains(&local) => collect_runs(child, names, out),
            _ => {}
        }
    }
}

fn run_text(run: &Element, names: &WordNames, out: &mut String) {
    for child in run.elements() {
        match names.local(&child.name) {
            Some("t") => out.push_str(&child.text()),
            Some("tab") => out.push('\t'),
            Some("br") | Some("cr") => out.push('\n'),
            Some("noBreakHyphen") => out.push('-'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures;

    #[test]
    fn blocks_are_body_paragraphs_in_order() {
        let doc = Document::open(&fixtures::docx(&["TITLE", "", "Body text"])).unwrap();
        assert_eq!(doc.block_count(), 3);
        assert_eq!(doc.block_texts(), vec!["TITLE", "", "Body text"]);
        assert!(!doc.is_blank());
    }

    #[test]
    fn paragraph_text_joins_runs_tabs_and_hyperlinks() {
        let body = r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>RESEARCH</w:t></w:r><w:r><w:tab/></w:r><w:hyperlink r:id="rId9"><w:r><w:t>METHOD</w:t></w:r></w:hyperlink><w:del><w:r><w:delText>gone</w:delText></w:r></w:del></w:p>"#;
        let doc = Document::open(&fixtures::docx_with_body(body)).unwrap();
        assert_eq!(doc.block_text(0).as_deref(), Some("RESEARCH\tMETHOD"));
    }

    #[test]
    fn whitespace_only_document_is_blank() {
        let doc = Document::open(&fixtures::docx(&["", "   ", ""])).unwrap();
        assert!(doc.is_blank());

        let empty = Document::open(&fixtures::docx(&[])).unwrap();
        assert_eq!(empty.block_count(), 0);
        assert!(empty.is_blank());
    }

    #[test]
    fn tables_are_not_blocks() {
        let body = format!(
            "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}",
            fixtures::paragraph("before"),
            fixtures::paragraph("cell"),
            fixtures::paragraph("after")
        );
        let doc = Document::open(&fixtures::docx_with_body(&body)).unwrap();
        assert_eq!(doc.block_texts(), vec!["before", "after"]);
    }

    #[test]
    fn package_without_main_part_is_rejected() {
        let bytes = fixtures::package(&[("[Content_Types].xml", fixtures::CONTENT_TYPES)]);
        let err = Document::open(&bytes).err().unwrap();
        assert!(matches!(err, ReviewError::DocumentStructure(_)));
    }

    #[test]
    fn default_namespace_documents_are_read() {
        let document = r#"<document xmlns="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><body><p><r><t>INTRODUCTION</t></r></p><p><hyperlink><r><t>link</t></r></hyperlink></p></body></document>"#;
        let bytes = fixtures::package(&[
            ("_rels/.rels", fixtures::PACKAGE_RELS),
            ("word/document.xml", document),
        ]);

        let doc = Document::open(&bytes).unwrap();
        assert_eq!(doc.block_texts(), vec!["INTRODUCTION", "link"]);
        assert_eq!(doc.names().qname("id"), "w:id");
        assert_eq!(doc.root.attr("xmlns:w"), Some(W_NS));
    }

    #[test]
    fn other_prefixes_bound_to_the_namespace_are_read() {
        let document = r#"<x:document xmlns:x="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><x:body><x:p><x:r><x:t>ABSTRACT</x:t></x:r></x:p></x:body></x:document>"#;
        let bytes = fixtures::package(&[
            ("_rels/.rels", fixtures::PACKAGE_RELS),
            ("word/document.xml", document),
        ]);

        let doc = Document::open(&bytes).unwrap();
        assert_eq!(doc.block_texts(), vec!["ABSTRACT"]);
        assert_eq!(doc.names().qname("p"), "x:p");
        assert_eq!(doc.root.attr("xmlns:w"), None);
    }

    #[test]
    fn foreign_prefix_is_not_mistaken_for_word_markup() {
        let mut root = Element::new("w:document")
            .with_attr("xmlns:w", W_NS)
            .with_attr("xmlns:v", "urn:schemas-microsoft-com:vml");
        let names = WordNames::bind(&mut root);
        assert!(names.is("w:p", "p"));
        assert!(!names.is("v:p", "p"));
        assert!(!names.is("p", "p"));
    }

    #[test]
    fn save_round_trips_unmodified_text() {
        let mut doc = Document::open(&fixtures::docx(&["A & B", "  spaced  "])).unwrap();
        let bytes = doc.save().unwrap();
        let reopened = Document::open(&bytes).unwrap();
        assert_eq!(reopened.block_texts(), vec!["A & B", "  spaced  "]);
    }
}
