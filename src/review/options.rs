use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which reviewer the generator plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    /// Reviewer 1: substance and argument
    #[default]
    Substance,
    /// Reviewer 2: technical and formal quality
    Technical,
}

impl ReviewerRole {
    pub fn label(self) -> &'static str {
        match self {
            ReviewerRole::Substance => "Reviewer 1 (Substansi)",
            ReviewerRole::Technical => "Reviewer 2 (Teknis)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLanguage {
    #[default]
    Indonesian,
    English,
}

impl OutputLanguage {
    pub fn label(self) -> &'static str {
        match self {
            OutputLanguage::Indonesian => "Bahasa Indonesia",
            OutputLanguage::English => "English",
        }
    }
}

/// How hard the review should be, mildest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CritiqueLevel {
    Mild,
    #[default]
    Moderate,
    Severe,
}

impl CritiqueLevel {
    pub fn label(self) -> &'static str {
        match self {
            CritiqueLevel::Mild => "Cukup Kritis",
            CritiqueLevel::Moderate => "Kritis",
            CritiqueLevel::Severe => "Sangat Kritis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReviewOptions {
    pub role: ReviewerRole,
    pub language: OutputLanguage,
    pub level: CritiqueLevel,
}
