// src/main.rs
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use reviewer_rs::config::Config;
use reviewer_rs::review::{CritiqueLevel, GeminiClient, OutputLanguage, ReviewOptions, ReviewerRole};
use reviewer_rs::utils::document_processor::{
    format_report, load_review, output_path_for, save_review, select_sections, DocumentProcessor,
};
use reviewer_rs::Section;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "reviewer",
    about = "Anchor AI manuscript review comments on .docx section headings"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the plain text of a manuscript
    Extract { input: PathBuf },
    /// Generate a review and write it as JSON
    Review {
        input: PathBuf,
        #[command(flatten)]
        generation: GenerationArgs,
        /// Where to write the review JSON (stdout if omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Insert comments from a review JSON file into a copy of the manuscript
    Annotate {
        input: PathBuf,
        #[arg(long)]
        review: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Generate a review and insert it in one go
    Run {
        input: PathBuf,
        #[command(flatten)]
        generation: GenerationArgs,
        #[command(flatten)]
        output: OutputArgs,
        /// Also keep the generated review JSON
        #[arg(long)]
        save_review: Option<PathBuf>,
    },
}

#[derive(Args)]
struct GenerationArgs {
    #[arg(long, value_enum, default_value_t = ReviewerRole::Substance)]
    role: ReviewerRole,
    #[arg(long, value_enum, default_value_t = OutputLanguage::Indonesian)]
    language: OutputLanguage,
    #[arg(long, value_enum, default_value_t = CritiqueLevel::Moderate)]
    level: CritiqueLevel,
    /// Gemini API key (defaults to GEMINI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    model: Option<String>,
}

impl GenerationArgs {
    fn options(&self) -> ReviewOptions {
        ReviewOptions {
            role: self.role,
            language: self.language,
            level: self.level,
        }
    }

    fn client(&self, config: &Config) -> anyhow::Result<GeminiClient> {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => config.require_api_key()?.to_string(),
        };
        let model = self.model.clone().unwrap_or_else(|| config.model.clone());
        Ok(GeminiClient::new(api_key)
            .with_model(model)
            .with_base_url(config.base_url.as_str()))
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Sections to insert, by review key (all when omitted)
    #[arg(long, value_delimiter = ',')]
    sections: Vec<Section>,
    /// Output file (defaults to REVIEW_<input name> next to the input)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Comment author
    #[arg(long)]
    author: Option<String>,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()).await {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env();

    match cli.command {
        Command::Extract { input } => {
            let processor = DocumentProcessor::new(&config);
            println!("{}", processor.extract_text(&input)?);
        }
        Command::Review { input, generation, out } => {
            let processor = DocumentProcessor::new(&config);
            let client = generation.client(&config)?;
            let review = processor.review(&client, &input, &generation.options()).await?;
            match out {
                Some(path) => save_review(&review, &path)?,
                None => println!("{}", serde_json::to_string_pretty(&review)?),
            }
        }
        Command::Annotate { input, review, output } => {
            if let Some(author) = &output.author {
                config.author = author.clone();
            }
            let processor = DocumentProcessor::new(&config);
            let review = load_review(&review)?;
            let selection = select_sections(&review, &output.sections);
            let out = output.out.unwrap_or_else(|| output_path_for(&input));
            let report = processor.annotate(&input, &selection, &out)?;
            println!("{}", format_report(&report));
            println!("✅ Saved {}", out.display());
        }
        Command::Run { input, generation, output, save_review: review_path } => {
            if let Some(author) = &output.author {
                config.author = author.clone();
            }
            let processor = DocumentProcessor::new(&config);
            let client = generation.client(&config)?;
            let review = processor
                .review(&client, &input, &generation.options())
                .await
                .with_context(|| format!("No comments were inserted into {}", input.display()))?;
            if let Some(path) = review_path {
                save_review(&review, &path)?;
            }
            let selection = select_sections(&review, &output.sections);
            let out = output.out.unwrap_or_else(|| output_path_for(&input));
            let report = processor.annotate(&input, &selection, &out)?;
            println!("{}", format_report(&report));
            info!("Review run finished for {}", input.display());
            println!("✅ Saved {}", out.display());
        }
    }

    Ok(())
}
