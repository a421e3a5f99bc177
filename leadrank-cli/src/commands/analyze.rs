//! Text signal commands

use anyhow::Result;
use clap::{Args, Subcommand};
use leadrank_signals::{analyze_sentiment, extract_intent, intent_norm};
use serde_json::json;

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(subcommand)]
    pub command: AnalyzeCommands,
}

#[derive(Subcommand)]
pub enum AnalyzeCommands {
    /// Score the sentiment of a message
    Sentiment {
        /// Message text
        text: String,
    },
    /// Detect buying intent in a message
    Intent {
        /// Message body
        text: String,
        /// Message subject
        #[arg(long)]
        subject: Option<String>,
    },
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    match args.command {
        AnalyzeCommands::Sentiment { text } => {
            let analysis = analyze_sentiment(&text);
            let output = json!({
                "sentiment": analysis.sentiment,
                "score": analysis.score,
                "confidence": analysis.confidence,
                "keywords": analysis.keywords,
                "sentimentNorm": analysis.normalized(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        AnalyzeCommands::Intent { text, subject } => {
            let signals = extract_intent(&text, subject.as_deref());
            let output = json!({
                "signals": signals,
                "intentNorm": intent_norm(&signals),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
