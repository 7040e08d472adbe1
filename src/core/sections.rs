use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The seven manuscript parts a review covers. Keys are the names the review JSON uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "Judul")]
    Title,
    #[serde(rename = "Abstrak")]
    Abstract,
    #[serde(rename = "Pendahuluan")]
    Introduction,
    #[serde(rename = "Metodologi")]
    Methodology,
    #[serde(rename = "Hasil")]
    Results,
    #[serde(rename = "Kesimpulan")]
    Conclusion,
    #[serde(rename = "Referensi")]
    References,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Title,
        Section::Abstract,
        Section::Introduction,
        Section::Methodology,
        Section::Results,
        Section::Conclusion,
        Section::References,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Section::Title => "Judul",
            Section::Abstract => "Abstrak",
            Section::Introduction => "Pendahuluan",
            Section::Methodology => "Metodologi",
            Section::Results => "Hasil",
            Section::Conclusion => "Kesimpulan",
            Section::References => "Referensi",
        }
    }

    /// Heading strings recognised for this section, English and Indonesian.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Section::Title => &["JUDUL", "TITLE"],
            Section::Abstract => &["Abstrak", "Abstract", "ABSTRAK", "ABSTRACT"],
            Section::Introduction => &["INTRODUCTION", "PENDAHULUAN"],
            Section::Methodology => &[
                "RESEARCH METHODOLOGY",
                "METODOLOGI PENELITIAN",
                "RESEARCH METHOD",
                "METODE PENELITIAN",
            ],
            Section::Results => &["RESULT AND DISCUSSION", "HASIL DAN PEMBAHASAN"],
            Section::Conclusion => &["CONCLUSION", "KESIMPULAN"],
            Section::References => &["REFERENCES", "REFERENSI"],
        }
    }
}

/// Aliases for a section key; keys outside the table have none.
pub fn aliases_for(key: &str) -> &'static [&'static str] {
    key.parse::<Section>().map(Section::aliases).unwrap_or(&[])
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.key() == s)
            .ok_or_else(|| format!("unknown section '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_section_has_aliases() {
        for section in Section::ALL {
            let aliases = section.aliases();
            assert!((2..=4).contains(&aliases.len()), "{} has {} aliases", section, aliases.len());
        }
    }

    #[test]
    fn keys_parse_back() {
        for section in Section::ALL {
            assert_eq!(section.key().parse::<Section>().unwrap(), section);
        }
        assert!("Lampiran".parse::<Section>().is_err());
    }

    #[test]
    fn unknown_keys_have_no_aliases() {
        assert!(aliases_for("Lampiran").is_empty());
        assert_eq!(aliases_for("Referensi"), &["REFERENCES", "REFERENSI"]);
    }

    #[test]
    fn serde_uses_review_keys() {
        assert_eq!(serde_json::to_string(&Section::Methodology).unwrap(), "\"Metodologi\"");
    }
}
