use crate::core::document::WordNames;
use crate::core::xml::Element;

/// Anchor comment `id` on a paragraph so it covers the whole paragraph.
///
/// The range start goes before any content (right after `w:pPr`, which must stay the first
/// child), the range end after all existing content, and the reference mark in a new run
/// at the very end. Paragraph text is unchanged.
pub fn inject_anchor(paragraph: &mut Element, id: u32, names: &WordNames) {
    let id = id.to_string();
    let marker = |local: &str| {
        Element::new(names.qname(local)).with_attr(names.qname("id"), id.as_str())
    };

    let start_at = paragraph
        .position_where(|el| names.is(&el.name, "pPr"))
        .map_or(0, |idx| idx + 1);
    paragraph.insert(start_at, marker("commentRangeStart"));

    paragraph.push(marker("commentRangeEnd"));

    let reference_run = Element::new(names.qname("r")).with_child(marker("commentReference"));
    paragraph.push(reference_run);
}
