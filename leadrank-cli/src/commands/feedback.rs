//! Feedback commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use leadrank_learn::{FeedbackMetadata, OutcomeType};
use leadrank_store::{FeedbackEntry, FeedbackRepository, NewFeedback};
use tracing::info;

use super::open_feedback;
use crate::config::ConfigLoader;

#[derive(Args)]
pub struct FeedbackArgs {
    #[command(subcommand)]
    pub command: FeedbackCommands,
}

#[derive(Subcommand)]
pub enum FeedbackCommands {
    /// Record feedback for a lead
    Add(AddArgs),
    /// Import a JSON array of feedback records
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// List recent feedback
    List {
        /// Window in days (defaults to the configured window)
        #[arg(long)]
        days: Option<u32>,
    },
}

#[derive(Args)]
pub struct AddArgs {
    /// Lead ID
    #[arg(long)]
    pub lead: String,
    /// Outcome (helpful, not_helpful, contacted)
    #[arg(long, default_value = "contacted")]
    pub outcome: String,
    /// Recommendation the feedback refers to
    #[arg(long)]
    pub recommendation: Option<String>,
    /// Lead stage
    #[arg(long)]
    pub stage: Option<String>,
    /// Lead source
    #[arg(long)]
    pub source: Option<String>,
    /// Normalized recency in [0, 1]
    #[arg(long)]
    pub recency: Option<f64>,
    /// Normalized interaction count in [0, 1]
    #[arg(long)]
    pub count: Option<f64>,
    /// Normalized sentiment in [0, 1]
    #[arg(long)]
    pub sentiment: Option<f64>,
    /// Normalized intent in [0, 1]
    #[arg(long)]
    pub intent: Option<f64>,
}

impl AddArgs {
    fn into_feedback(self) -> NewFeedback {
        let metadata = FeedbackMetadata {
            stage: self.stage,
            stage_malformed: false,
            source: self.source,
            recency_norm: self.recency,
            count_norm: self.count,
            sentiment_norm: self.sentiment,
            intent_norm: self.intent,
        };
        NewFeedback {
            lead_id: self.lead,
            outcome_type: Some(OutcomeType::from(self.outcome.as_str())),
            recommendation_id: self.recommendation,
            metadata: Some(metadata),
        }
    }
}

pub async fn run(args: FeedbackArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let repo = open_feedback(&config).await?;

    match args.command {
        FeedbackCommands::Add(add) => {
            if add.lead.trim().is_empty() {
                anyhow::bail!("--lead must not be empty");
            }
            let entry = repo.append(add.into_feedback()).await?;
            println!("{}", serde_json::to_string_pretty(&entry)?);
        }
        FeedbackCommands::Import { file } => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let batch = parse_import(&contents)
                .with_context(|| format!("failed to parse {}", file.display()))?;
            let total = repo.append_all(batch).await?.len();
            info!(imported = total, file = %file.display(), "feedback imported");
            println!("Imported {} feedback records", total);
        }
        FeedbackCommands::List { days } => {
            let days = days.unwrap_or(config.feedback.window_days);
            let entries = repo.get_recent(days).await?;
            if entries.is_empty() {
                println!("No feedback in the last {} days.", days);
                return Ok(());
            }
            println!("{}", render_table(&entries));
        }
    }
    Ok(())
}

/// Parse an import file, skipping records without a lead id
fn parse_import(contents: &str) -> Result<Vec<NewFeedback>> {
    let batch: Vec<NewFeedback> = serde_json::from_str(contents)?;
    Ok(batch
        .into_iter()
        .filter(|f| !f.lead_id.trim().is_empty())
        .collect())
}

fn render_table(entries: &[FeedbackEntry]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Created").fg(Color::Cyan),
        Cell::new("Lead").fg(Color::Cyan),
        Cell::new("Outcome").fg(Color::Cyan),
        Cell::new("Stage").fg(Color::Cyan),
        Cell::new("Source").fg(Color::Cyan),
    ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(entry.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(&entry.lead_id),
            Cell::new(&entry.outcome_type),
            Cell::new(entry.metadata.stage.as_deref().unwrap_or("-")),
            Cell::new(entry.metadata.source.as_deref().unwrap_or("-")),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_args() -> AddArgs {
        AddArgs {
            lead: "lead-1".into(),
            outcome: "helpful".into(),
            recommendation: None,
            stage: Some("customer".into()),
            source: None,
            recency: Some(0.9),
            count: None,
            sentiment: None,
            intent: None,
        }
    }

    #[test]
    fn test_add_args_into_feedback() {
        let feedback = add_args().into_feedback();
        assert_eq!(feedback.outcome_type, Some(OutcomeType::Helpful));
        let metadata = feedback.metadata.unwrap();
        assert_eq!(metadata.stage.as_deref(), Some("customer"));
        assert_eq!(metadata.recency_norm, Some(0.9));
        assert!(metadata.count_norm.is_none());
    }

    #[test]
    fn test_unknown_outcome_kept_as_other() {
        let mut args = add_args();
        args.outcome = "ignored".into();
        assert_eq!(
            args.into_feedback().outcome_type,
            Some(OutcomeType::Other("ignored".into()))
        );
    }

    #[test]
    fn test_parse_import_skips_blank_leads() {
        let json = r#"[
            {"leadId": "a", "outcomeType": "helpful", "metadata": {"stage": "qualified"}},
            {"leadId": "", "outcomeType": "helpful"},
            {"leadId": "b"}
        ]"#;
        let batch = parse_import(json).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(batch[1].outcome_type.is_none());
    }

    #[test]
    fn test_parse_import_rejects_non_array() {
        assert!(parse_import(r#"{"leadId": "a"}"#).is_err());
    }
}
