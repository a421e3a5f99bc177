//! Feedback records supplied by callers

use std::fmt;
use std::str::FromStr;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// What the user said about a recommendation
///
/// Only `Helpful` and `NotHelpful` carry a learning signal. Unknown strings
/// survive a round trip through `Other` so callers can store them as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum OutcomeType {
    Helpful,
    NotHelpful,
    /// Lead was contacted; the default when no outcome is given
    #[default]
    Contacted,
    Other(String),
}

impl OutcomeType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Helpful => "helpful",
            Self::NotHelpful => "not_helpful",
            Self::Contacted => "contacted",
            Self::Other(s) => s,
        }
    }

    /// Binary label used by the learners: `Some(true)` for helpful,
    /// `Some(false)` for not helpful, `None` for everything else.
    pub fn label(&self) -> Option<bool> {
        match self {
            Self::Helpful => Some(true),
            Self::NotHelpful => Some(false),
            _ => None,
        }
    }
}

impl From<&str> for OutcomeType {
    fn from(s: &str) -> Self {
        match s {
            "helpful" => Self::Helpful,
            "not_helpful" => Self::NotHelpful,
            "contacted" => Self::Contacted,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OutcomeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OutcomeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

/// Pipeline stage of a lead, in one-hot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Prospect,
    Qualified,
    Opportunity,
    Customer,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Prospect,
        Stage::Qualified,
        Stage::Opportunity,
        Stage::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prospect => "prospect",
            Self::Qualified => "qualified",
            Self::Opportunity => "opportunity",
            Self::Customer => "customer",
        }
    }

    /// Position of this stage in the one-hot block of a feature vector
    pub fn index(self) -> usize {
        match self {
            Self::Prospect => 0,
            Self::Qualified => 1,
            Self::Opportunity => 2,
            Self::Customer => 3,
        }
    }
}

/// Error type for parsing Stage from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStageError(String);

impl fmt::Display for ParseStageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown stage: {}", self.0)
    }
}

impl std::error::Error for ParseStageError {}

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prospect" => Ok(Self::Prospect),
            "qualified" => Ok(Self::Qualified),
            "opportunity" => Ok(Self::Opportunity),
            "customer" => Ok(Self::Customer),
            _ => Err(ParseStageError(s.to_string())),
        }
    }
}

/// Context captured alongside a piece of feedback
///
/// Every field is optional. Values of the wrong JSON type decode as absent,
/// so a malformed field only drops that record from the paths that need it.
/// A stage of the wrong type is remembered in `stage_malformed` so the
/// feature encoding does not mistake it for a missing stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawFeedbackMetadata")]
pub struct FeedbackMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// A stage was supplied but was not a string
    #[serde(skip_serializing_if = "is_false")]
    pub stage_malformed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency_norm: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_norm: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_norm: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent_norm: Option<f64>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Wire shape of [`FeedbackMetadata`] before type checks
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFeedbackMetadata {
    #[serde(default)]
    stage: Option<TextSlot>,
    #[serde(default, deserialize_with = "lenient_flag")]
    stage_malformed: bool,
    #[serde(default)]
    source: Option<TextSlot>,
    #[serde(default, deserialize_with = "lenient_number")]
    recency_norm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    count_norm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    sentiment_norm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    intent_norm: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextSlot {
    Text(String),
    Other(IgnoredAny),
}

impl TextSlot {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s),
            Self::Other(_) => None,
        }
    }
}

impl From<RawFeedbackMetadata> for FeedbackMetadata {
    fn from(raw: RawFeedbackMetadata) -> Self {
        let (stage, stage_malformed) = match raw.stage {
            Some(TextSlot::Text(s)) => (Some(s), false),
            Some(TextSlot::Other(_)) => (None, true),
            None => (None, raw.stage_malformed),
        };
        Self {
            stage,
            stage_malformed,
            source: raw.source.and_then(TextSlot::into_text),
            recency_norm: raw.recency_norm,
            count_norm: raw.count_norm,
            sentiment_norm: raw.sentiment_norm,
            intent_norm: raw.intent_norm,
        }
    }
}

impl FeedbackMetadata {
    /// Metadata with every field absent
    pub const EMPTY: FeedbackMetadata = FeedbackMetadata {
        stage: None,
        stage_malformed: false,
        source: None,
        recency_norm: None,
        count_norm: None,
        sentiment_norm: None,
        intent_norm: None,
    };

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self.stage_malformed = false;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_recency(mut self, value: f64) -> Self {
        self.recency_norm = Some(value);
        self
    }

    pub fn with_count(mut self, value: f64) -> Self {
        self.count_norm = Some(value);
        self
    }

    pub fn with_sentiment(mut self, value: f64) -> Self {
        self.sentiment_norm = Some(value);
        self
    }

    pub fn with_intent(mut self, value: f64) -> Self {
        self.intent_norm = Some(value);
        self
    }

    /// Stage key for counting; empty strings count as absent
    pub fn stage_key(&self) -> Option<&str> {
        self.stage.as_deref().filter(|s| !s.is_empty())
    }

    /// Source key for counting; empty strings count as absent
    pub fn source_key(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }
}

/// One piece of feedback on a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub lead_id: String,
    #[serde(default)]
    pub outcome_type: OutcomeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FeedbackMetadata>,
}

impl FeedbackRecord {
    pub fn new(lead_id: impl Into<String>, outcome_type: OutcomeType) -> Self {
        Self {
            lead_id: lead_id.into(),
            outcome_type,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: FeedbackMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Metadata, or the empty set when none was attached
    pub fn metadata(&self) -> &FeedbackMetadata {
        self.metadata.as_ref().unwrap_or(&FeedbackMetadata::EMPTY)
    }
}

/// Decode a JSON array of feedback records
pub fn parse_feedback_json(json: &str) -> crate::Result<Vec<FeedbackRecord>> {
    Ok(serde_json::from_str(json)?)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Slot {
        Number(f64),
        Other(IgnoredAny),
    }

    Ok(match Slot::deserialize(deserializer)? {
        Slot::Number(n) => Some(n),
        Slot::Other(_) => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Slot {
        Flag(bool),
        Other(IgnoredAny),
    }

    Ok(matches!(Slot::deserialize(deserializer)?, Slot::Flag(true)))
}
