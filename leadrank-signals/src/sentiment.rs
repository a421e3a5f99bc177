//! Keyword-based sentiment analysis
//!
//! Each whitespace-separated word is checked against the positive, negative
//! and neutral lists in that order, by substring containment. The first list
//! with a hit claims the word.

use serde::{Deserialize, Serialize};
use tracing::trace;

const POSITIVE_KEYWORDS: &[&str] = &[
    "excellent",
    "great",
    "awesome",
    "fantastic",
    "love",
    "amazing",
    "perfect",
    "wonderful",
    "outstanding",
    "impressed",
    "excited",
    "interested",
    "yes",
    "definitely",
    "absolutely",
    "looking forward",
    "thank you",
    "appreciate",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "terrible",
    "awful",
    "hate",
    "horrible",
    "disappointed",
    "frustrated",
    "angry",
    "upset",
    "no",
    "never",
    "not interested",
    "waste of time",
    "expensive",
    "overpriced",
    "complicated",
    "difficult",
    "problem",
    "issue",
];

const NEUTRAL_KEYWORDS: &[&str] = &[
    "okay",
    "fine",
    "maybe",
    "perhaps",
    "consider",
    "think about",
    "let me check",
    "not sure",
    "unclear",
    "question",
    "information",
];

/// Score above which text is labelled positive (and below the negation, negative)
const LABEL_THRESHOLD: f64 = 0.1;
/// Keyword density multiplier for confidence
const DENSITY_SCALE: f64 = 4.0;
/// Questions shorter than this many characters get a mild neutral reading
const SHORT_QUESTION_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

/// Result of analyzing one piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    /// In [-1, 1]
    pub score: f64,
    /// In [0, 1]
    pub confidence: f64,
    /// Words that matched a keyword, in text order
    pub keywords: Vec<String>,
}

impl SentimentAnalysis {
    fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            score: 0.0,
            confidence: 0.0,
            keywords: Vec::new(),
        }
    }

    /// Score mapped from [-1, 1] to [0, 1], the range used for `sentimentNorm`
    pub fn normalized(&self) -> f64 {
        ((self.score + 1.0) / 2.0).clamp(0.0, 1.0)
    }
}

/// Anything that can label text with a sentiment
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> SentimentAnalysis;

    /// Short identifier for logs
    fn name(&self) -> &'static str;
}

/// Keyword lists used by [`KeywordSentimentAnalyzer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentLexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub neutral: Vec<String>,
}

impl Default for SentimentLexicon {
    fn default() -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            positive: owned(POSITIVE_KEYWORDS),
            negative: owned(NEGATIVE_KEYWORDS),
            neutral: owned(NEUTRAL_KEYWORDS),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Polarity {
    Positive,
    Negative,
    Neutral,
}

/// Lexicon-driven analyzer
#[derive(Debug, Clone, Default)]
pub struct KeywordSentimentAnalyzer {
    lexicon: SentimentLexicon,
}

impl KeywordSentimentAnalyzer {
    pub fn new(lexicon: SentimentLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &SentimentLexicon {
        &self.lexicon
    }

    fn classify(&self, word: &str) -> Option<Polarity> {
        let hit = |list: &[String]| list.iter().any(|kw| word.contains(kw.as_str()));
        if hit(&self.lexicon.positive) {
            Some(Polarity::Positive)
        } else if hit(&self.lexicon.negative) {
            Some(Polarity::Negative)
        } else if hit(&self.lexicon.neutral) {
            Some(Polarity::Neutral)
        } else {
            None
        }
    }
}

impl SentimentAnalyzer for KeywordSentimentAnalyzer {
    fn analyze(&self, text: &str) -> SentimentAnalysis {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();

        let (mut positive, mut negative, mut neutral) = (0usize, 0usize, 0usize);
        let mut keywords = Vec::new();
        for word in &words {
            match self.classify(word) {
                Some(Polarity::Positive) => positive += 1,
                Some(Polarity::Negative) => negative += 1,
                Some(Polarity::Neutral) => neutral += 1,
                None => continue,
            }
            keywords.push(word.to_string());
        }

        let total = positive + negative + neutral;
        trace!(positive, negative, neutral, words = words.len(), "sentiment keyword counts");

        if total > 0 {
            let score = (positive as f64 - negative as f64) / total as f64;
            let confidence = (total as f64 / words.len() as f64 * DENSITY_SCALE).min(1.0);
            let sentiment = if score > LABEL_THRESHOLD {
                Sentiment::Positive
            } else if score < -LABEL_THRESHOLD {
                Sentiment::Negative
            } else {
                Sentiment::Neutral
            };
            return SentimentAnalysis {
                sentiment,
                score,
                confidence,
                keywords,
            };
        }

        // No keywords: fall back on punctuation
        if text.contains('!') && !text.contains('?') {
            SentimentAnalysis {
                sentiment: Sentiment::Positive,
                score: 0.3,
                confidence: 0.3,
                keywords,
            }
        } else if text.contains('?') && text.chars().count() < SHORT_QUESTION_LEN {
            SentimentAnalysis {
                sentiment: Sentiment::Neutral,
                score: 0.1,
                confidence: 0.4,
                keywords,
            }
        } else {
            SentimentAnalysis::neutral()
        }
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Analyze text with the built-in lexicon
pub fn analyze_sentiment(text: &str) -> SentimentAnalysis {
    KeywordSentimentAnalyzer::default().analyze(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let result = analyze_sentiment("This is excellent, we love it");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.keywords, vec!["excellent,", "love"]);
        // 2 keywords / 6 words * 4, capped
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_negative_text() {
        let result = analyze_sentiment("pricing seems expensive and the setup is complicated");
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.score, -1.0);
    }

    #[test]
    fn test_mixed_text_is_neutral() {
        let result = analyze_sentiment("great product but too expensive");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.keywords.len(), 2);
    }

    #[test]
    fn test_positive_list_wins_over_negative() {
        // "nonono-yes" contains both "no" and "yes"; positive is checked first
        let result = analyze_sentiment("nonono-yes");
        assert_eq!(result.sentiment, Sentiment::Positive);
    }

    #[test]
    fn test_substring_match_is_greedy() {
        // "know" contains "no"
        let result = analyze_sentiment("I know");
        assert_eq!(result.sentiment, Sentiment::Negative);
    }

    #[test]
    fn test_confidence_scales_with_density() {
        let text = "maybe we can talk about it some other time later on";
        let result = analyze_sentiment(text);
        // one neutral keyword in 11 words
        assert!((result.confidence - 4.0 / 11.0).abs() < 1e-12);
        assert_eq!(result.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_exclamation_without_keywords() {
        let result = analyze_sentiment("See you Tuesday!");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.score, 0.3);
        assert_eq!(result.confidence, 0.3);
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn test_short_question_without_keywords() {
        let result = analyze_sentiment("When can we meet?");
        assert_eq!(result.sentiment, Sentiment::Neutral);
        assert_eq!(result.score, 0.1);
        assert_eq!(result.confidence, 0.4);
    }

    #[test]
    fn test_short_question_counts_characters_not_bytes() {
        // 43 characters, well over 50 bytes in UTF-8
        let text = "Когда мы сможем встретиться на этой неделе?";
        assert!(text.len() >= SHORT_QUESTION_LEN);
        let result = analyze_sentiment(text);
        assert_eq!(result.score, 0.1);
        assert_eq!(result.confidence, 0.4);
    }

    #[test]
    fn test_empty_text() {
        let result = analyze_sentiment("");
        assert_eq!(result, SentimentAnalysis::neutral());
    }

    #[test]
    fn test_normalized_range() {
        assert_eq!(analyze_sentiment("awesome").normalized(), 1.0);
        assert_eq!(analyze_sentiment("awful").normalized(), 0.0);
        assert_eq!(analyze_sentiment("").normalized(), 0.5);
    }

    #[test]
    fn test_custom_lexicon() {
        let analyzer = KeywordSentimentAnalyzer::new(SentimentLexicon {
            positive: vec!["ship".into()],
            negative: vec![],
            neutral: vec![],
        });
        let result = analyzer.analyze("ready to ship");
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(analyzer.name(), "keyword");
    }
}
