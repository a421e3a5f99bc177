//! Feedback history
//!
//! Append-only log of feedback entries, queried by recency window to build
//! the batch handed to the learning core.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use leadrank_learn::{FeedbackMetadata, FeedbackRecord, OutcomeType};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;

/// Feedback file name inside a data directory
const FEEDBACK_FILE: &str = "feedback.json";

/// Feedback as submitted, before the store assigns an id and timestamp
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFeedback {
    pub lead_id: String,
    #[serde(default)]
    pub outcome_type: Option<OutcomeType>,
    #[serde(default)]
    pub recommendation_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<FeedbackMetadata>,
}

impl NewFeedback {
    pub fn new(lead_id: impl Into<String>, outcome_type: OutcomeType) -> Self {
        Self {
            lead_id: lead_id.into(),
            outcome_type: Some(outcome_type),
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: FeedbackMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_recommendation(mut self, recommendation_id: impl Into<String>) -> Self {
        self.recommendation_id = Some(recommendation_id.into());
        self
    }
}

/// A stored feedback entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub id: String,
    pub lead_id: String,
    pub outcome_type: OutcomeType,
    pub recommendation_id: Option<String>,
    pub metadata: FeedbackMetadata,
    pub created_at: DateTime<Utc>,
}

impl FeedbackEntry {
    /// Stamp a submission with an id and creation time.
    ///
    /// Missing outcome defaults to `contacted`, missing metadata to empty.
    pub fn from_new(new: NewFeedback, created_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("fb_{}", Uuid::now_v7().simple()),
            lead_id: new.lead_id,
            outcome_type: new.outcome_type.unwrap_or_default(),
            recommendation_id: new.recommendation_id,
            metadata: new.metadata.unwrap_or_default(),
            created_at,
        }
    }

    /// The record shape the learning core consumes
    pub fn to_record(&self) -> FeedbackRecord {
        FeedbackRecord::new(self.lead_id.clone(), self.outcome_type.clone())
            .with_metadata(self.metadata.clone())
    }
}

/// Feedback storage
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Store a submission, returning the stamped entry
    async fn append(&self, feedback: NewFeedback) -> Result<FeedbackEntry>;

    /// Store a batch as one write; on error nothing from the batch is kept
    async fn append_all(&self, batch: Vec<NewFeedback>) -> Result<Vec<FeedbackEntry>>;

    /// Entries created at or after `since`, oldest first
    async fn get_since(&self, since: DateTime<Utc>) -> Result<Vec<FeedbackEntry>>;

    /// Number of stored entries
    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Entries from the last `window_days` days
    async fn get_recent(&self, window_days: u32) -> Result<Vec<FeedbackEntry>> {
        let since = Utc::now() - Duration::days(i64::from(window_days));
        self.get_since(since).await
    }
}

fn entries_since(entries: &[FeedbackEntry], since: DateTime<Utc>) -> Vec<FeedbackEntry> {
    entries
        .iter()
        .filter(|e| e.created_at >= since)
        .cloned()
        .collect()
}

fn stamp_all(batch: Vec<NewFeedback>) -> Vec<FeedbackEntry> {
    let now = Utc::now();
    batch
        .into_iter()
        .map(|feedback| FeedbackEntry::from_new(feedback, now))
        .collect()
}

/// In-memory feedback repository
#[derive(Default)]
pub struct MemoryFeedbackRepository {
    entries: RwLock<Vec<FeedbackEntry>>,
}

impl MemoryFeedbackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-stamped entry, e.g. when replaying history
    pub async fn insert(&self, entry: FeedbackEntry) {
        self.entries.write().await.push(entry);
    }
}

#[async_trait]
impl FeedbackRepository for MemoryFeedbackRepository {
    async fn append(&self, feedback: NewFeedback) -> Result<FeedbackEntry> {
        let entry = FeedbackEntry::from_new(feedback, Utc::now());
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn append_all(&self, batch: Vec<NewFeedback>) -> Result<Vec<FeedbackEntry>> {
        let stamped = stamp_all(batch);
        self.entries.write().await.extend(stamped.iter().cloned());
        Ok(stamped)
    }

    async fn get_since(&self, since: DateTime<Utc>) -> Result<Vec<FeedbackEntry>> {
        Ok(entries_since(&self.entries.read().await, since))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

/// File-backed feedback repository (JSON array on disk)
pub struct JsonFeedbackRepository {
    entries: RwLock<Vec<FeedbackEntry>>,
    file_path: PathBuf,
}

impl JsonFeedbackRepository {
    /// Load entries from `data_dir`, or start empty
    pub async fn open(data_dir: &Path) -> Result<Self> {
        let file_path = data_dir.join(FEEDBACK_FILE);

        let entries = if file_path.exists() {
            let content = fs::read_to_string(&file_path).await?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };

        Ok(Self {
            entries: RwLock::new(entries),
            file_path,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    async fn persist(&self, entries: &[FeedbackEntry]) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.file_path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl FeedbackRepository for JsonFeedbackRepository {
    async fn append(&self, feedback: NewFeedback) -> Result<FeedbackEntry> {
        let entry = FeedbackEntry::from_new(feedback, Utc::now());
        let mut entries = self.entries.write().await;
        entries.push(entry.clone());
        if let Err(e) = self.persist(&entries).await {
            entries.pop();
            return Err(e);
        }
        debug!(id = %entry.id, total = entries.len(), "feedback appended");
        Ok(entry)
    }

    async fn append_all(&self, batch: Vec<NewFeedback>) -> Result<Vec<FeedbackEntry>> {
        let stamped = stamp_all(batch);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.extend(stamped.iter().cloned());
        if let Err(e) = self.persist(&entries).await {
            entries.truncate(before);
            return Err(e);
        }
        debug!(added = stamped.len(), total = entries.len(), "feedback batch appended");
        Ok(stamped)
    }

    async fn get_since(&self, since: DateTime<Utc>) -> Result<Vec<FeedbackEntry>> {
        Ok(entries_since(&self.entries.read().await, since))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}
