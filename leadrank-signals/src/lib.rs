//! leadrank-signals - Text signals for lead feedback
//!
//! Produces the `sentimentNorm` and `intentNorm` values that callers attach
//! to feedback metadata before learning.

pub mod error;
pub mod intent;
pub mod sentiment;

pub use error::{Result, SignalError};
pub use intent::{
    IntentDetector, IntentPattern, IntentSignal, IntentStrength, extract_intent, intent_norm,
};
pub use sentiment::{
    KeywordSentimentAnalyzer, Sentiment, SentimentAnalysis, SentimentAnalyzer, SentimentLexicon,
    analyze_sentiment,
};
