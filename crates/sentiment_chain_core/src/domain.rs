//! crates/sentiment_chain_core/src/domain.rs
//!
//! Defines the core data structures for the application. The analysis types
//! derive `Serialize` because they are returned to the browser verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three sentiment classes produced by the sentiment classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// Maps a classifier label to a sentiment.
    ///
    /// Accepts the plain class names as well as the generic `LABEL_n` names
    /// some hosted checkpoints report.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "negative" | "label_0" => Some(Self::Negative),
            "neutral" | "label_1" => Some(Self::Neutral),
            "positive" | "label_2" => Some(Self::Positive),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Negative => "negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single class with its probability mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// The soft-max distribution a classifier returned for one input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassScores(pub Vec<LabelScore>);

impl ClassScores {
    /// Returns the class with the highest probability. The first maximum wins on ties.
    pub fn top(&self) -> Option<&LabelScore> {
        self.0.iter().fold(None, |best: Option<&LabelScore>, candidate| match best {
            Some(b) if b.score >= candidate.score => Some(b),
            _ => Some(candidate),
        })
    }
}

impl From<Vec<LabelScore>> for ClassScores {
    fn from(scores: Vec<LabelScore>) -> Self {
        Self(scores)
    }
}

/// What the caller asked us to analyze.
#[derive(Debug, Clone)]
pub enum AnalysisRequest {
    Text(String),
    Url(String),
    Csv(Vec<u8>),
}

/// The scored, adjusted reading of one sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SentenceResult {
    pub sentence: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub hate_speech: bool,
    pub hate_confidence: f64,
    pub bad_word: bool,
}

/// The aggregated analysis of a whole input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnalysisResult {
    pub text: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub hate_speech: bool,
    pub details: Vec<SentenceResult>,
}

/// One chat exchange, archived to IPFS after a successful reply.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub user_id: String,
    pub original_text: Option<String>,
    pub analysis_results: Option<serde_json::Value>,
    pub gemini_reply: String,
    pub created_at: DateTime<Utc>,
}

/// Rounds a probability to the four decimal places shown to users.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(pairs: &[(&str, f64)]) -> ClassScores {
        pairs
            .iter()
            .map(|(label, score)| LabelScore {
                label: label.to_string(),
                score: *score,
            })
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn top_picks_highest_probability() {
        let dist = scores(&[("negative", 0.1), ("neutral", 0.3), ("positive", 0.6)]);
        assert_eq!(dist.top().map(|s| s.label.as_str()), Some("positive"));
    }

    #[test]
    fn top_prefers_first_on_ties() {
        let dist = scores(&[("negative", 0.5), ("positive", 0.5)]);
        assert_eq!(dist.top().map(|s| s.label.as_str()), Some("negative"));
        assert!(ClassScores::default().top().is_none());
    }

    #[test]
    fn sentiment_labels_map_case_insensitively() {
        assert_eq!(Sentiment::from_label("Positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::from_label("LABEL_0"), Some(Sentiment::Negative));
        assert_eq!(Sentiment::from_label("joy"), None);
    }

    #[test]
    fn sentiment_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Neutral).unwrap();
        assert_eq!(json, "\"neutral\"");
    }

    #[test]
    fn sentiment_displays_as_its_wire_name() {
        for sentiment in [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive] {
            let json = serde_json::to_string(&sentiment).unwrap();
            assert_eq!(format!("\"{sentiment}\""), json);
        }
    }

    #[test]
    fn round4_keeps_four_decimals() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(0.6), 0.6);
    }
}
