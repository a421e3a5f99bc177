//! leadrank-store - Storage collaborators for the learning core
//!
//! The learning core never persists anything. This crate holds what the
//! caller needs around it: a feedback history queried by recency window, a
//! versioned scoring configuration with rollback, and a TTL cache for
//! recommendation results.

pub mod cache;
pub mod config;
pub mod error;
pub mod feedback;

pub use cache::{DEFAULT_CACHE_TTL, RecommendationCache, TeamMetrics, cache_key};
pub use config::{
    ConfigPatch, ConfigVersion, JsonConfigStore, MAX_SYSTEM_PROMPT_LEN, MAX_VERSIONS,
    MemoryConfigStore, ScoringConfig, ScoringConfigStore, ScoringWeights, ScoringWeightsPatch,
};
pub use error::{Result, StoreError};
pub use feedback::{
    FeedbackEntry, FeedbackRepository, JsonFeedbackRepository, MemoryFeedbackRepository,
    NewFeedback,
};
