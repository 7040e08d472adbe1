//! Review generation: prompt building, the model client and response parsing.

pub mod gemini;
pub mod options;
pub mod prompt;
pub mod response;

pub use gemini::{GeminiClient, ReviewGenerator};
pub use options::{CritiqueLevel, OutputLanguage, ReviewOptions, ReviewerRole};
pub use response::{parse_review, Review};

use crate::error::Result;
use log::info;

/// Prompt the generator with the manuscript text and parse its answer.
pub async fn generate_review<G: ReviewGenerator>(
    generator: &G,
    manuscript: &str,
    options: &ReviewOptions,
) -> Result<Review> {
    let prompt = prompt::build_prompt(manuscript, options);
    info!(
        "Requesting review as {} ({}, {})",
        options.role.label(),
        options.language.label(),
        options.level.label()
    );
    let raw = generator.generate(&prompt).await?;
    parse_review(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReviewError;
    use std::sync::Mutex;

    struct Scripted {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ReviewGenerator for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(ReviewError::UpstreamGeneration)
        }
    }

    #[tokio::test]
    async fn generated_review_is_parsed() {
        let generator = Scripted {
            reply: Ok("```json\n{\"Judul\":\"a\",\"Abstrak\":\"b\",\"Pendahuluan\":\"c\",\"Metodologi\":\"d\",\"Hasil\":\"e\",\"Kesimpulan\":\"f\",\"Referensi\":\"g\"}\n```".to_string()),
            prompts: Mutex::new(Vec::new()),
        };
        let review = generate_review(&generator, "MANUSCRIPT BODY", &ReviewOptions::default())
            .await
            .unwrap();

        assert_eq!(review.get(crate::core::sections::Section::Results), Some("e"));
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("MANUSCRIPT BODY"));
    }

    #[tokio::test]
    async fn generator_failure_is_surfaced() {
        let generator = Scripted {
            reply: Err("quota exceeded".to_string()),
            prompts: Mutex::new(Vec::new()),
        };
        let err = generate_review(&generator, "text", &ReviewOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
