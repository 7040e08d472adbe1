use crate::core::sections::Section;
use crate::core::writer::Selection;
use crate::error::{Result, ReviewError};
use log::warn;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Generated feedback for all seven sections, in the order the generator returned them.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    entries: Vec<(Section, String)>,
}

impl Review {
    pub fn get(&self, section: Section) -> Option<&str> {
        self.entries
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Section, &str)> {
        self.entries.iter().map(|(s, text)| (*s, text.as_str()))
    }

    /// Feedback for the chosen sections, keeping review order.
    pub fn select(&self, sections: &[Section]) -> Selection {
        self.iter()
            .filter(|(section, _)| sections.contains(section))
            .map(|(section, text)| (section.key(), text))
            .collect()
    }

    pub fn all(&self) -> Selection {
        self.iter()
            .map(|(section, text)| (section.key(), text))
            .collect()
    }
}

impl Serialize for Review {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (section, text) in &self.entries {
            map.serialize_entry(section.key(), text)?;
        }
        map.end()
    }
}

/// Parse raw generator output into a [`Review`].
///
/// The JSON object is cut out between the first `{` and the last `}`, so code fences and
/// commentary around it are ignored. All seven section keys must be present with string
/// values; unknown keys are dropped.
pub fn parse_review(raw: &str) -> Result<Review> {
    let (start, end) = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => {
            return Err(ReviewError::UpstreamGeneration(
                "response contains no JSON object".to_string(),
            ))
        }
    };

    let object: Map<String, Value> = serde_json::from_str(&raw[start..=end]).map_err(|e| {
        ReviewError::UpstreamGeneration(format!("response is not valid JSON: {}", e))
    })?;

    let mut entries = Vec::with_capacity(Section::ALL.len());
    for (key, value) in object {
        let Ok(section) = key.parse::<Section>() else {
            warn!("Ignoring unexpected review key '{}'", key);
            continue;
        };
        match value {
            Value::String(text) => entries.push((section, text)),
            other => {
                return Err(ReviewError::UpstreamGeneration(format!(
                    "value for '{}' is not a string: {}",
                    key, other
                )))
            }
        }
    }

    let missing: Vec<&str> = Section::ALL
        .iter()
        .filter(|section| !entries.iter().any(|(s, _)| s == *section))
        .map(|section| section.key())
        .collect();
    if !missing.is_empty() {
        return Err(ReviewError::UpstreamGeneration(format!(
            "response is missing sections: {}",
            missing.join(", ")
        )));
    }

    Ok(Review { entries })
}
