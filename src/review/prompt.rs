use crate::core::sections::Section;
use crate::review::options::ReviewOptions;

/// Build the generation prompt for one manuscript.
pub fn build_prompt(manuscript: &str, options: &ReviewOptions) -> String {
    let template = Section::ALL
        .iter()
        .map(|section| format!("\"{}\": \"...\"", section.key()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Act as {role}. Write in: {language}. Critique level: {level}.\n\
         Review the manuscript and answer with a single plain JSON object and nothing else.\n\
         IMPORTANT: use single quotes (') inside the review text, never double quotes (\").\n\
         JSON format:\n\
         {{{template}}}\n\
         Manuscript:\n\
         {manuscript}\n",
        role = options.role.label(),
        language = options.language.label(),
        level = options.level.label(),
        template = template,
        manuscript = manuscript,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::options::{CritiqueLevel, OutputLanguage, ReviewerRole};

    #[test]
    fn prompt_carries_options_keys_and_text() {
        let options = ReviewOptions {
            role: ReviewerRole::Technical,
            language: OutputLanguage::English,
            level: CritiqueLevel::Severe,
        };
        let prompt = build_prompt("INTRODUCTION\nWe study things.", &options);

        assert!(prompt.contains("Reviewer 2 (Teknis)"));
        assert!(prompt.contains("Write in: English"));
        assert!(prompt.contains("Sangat Kritis"));
        for section in Section::ALL {
            assert!(prompt.contains(&format!("\"{}\"", section.key())));
        }
        assert!(prompt.ends_with("We study things.\n"));
    }
}
