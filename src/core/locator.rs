/// Position of the first block whose trimmed text equals one of `aliases`.
///
/// Two passes over the whole sequence: an exact, case-sensitive pass first, then a
/// case-insensitive one. An exact match anywhere beats a case-insensitive match earlier
/// in the document. Blank blocks are never matched.
pub fn find_heading<S: AsRef<str>>(blocks: &[S], aliases: &[&str]) -> Option<usize> {
    let exact = blocks.iter().position(|block| {
        let text = block.as_ref().trim();
        !text.is_empty() && aliases.iter().any(|alias| text == *alias)
    });
    if exact.is_some() {
        return exact;
    }

    let lowered: Vec<String> = aliases.iter().map(|alias| alias.to_lowercase()).collect();
    blocks.iter().position(|block| {
        let text = block.as_ref().trim().to_lowercase();
        !text.is_empty() && lowered.iter().any(|alias| text == *alias)
    })
}
