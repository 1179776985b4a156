//! crates/sentiment_chain_core/src/analyzer.rs
//!
//! Runs the sentence pipeline: split, normalize, score with both classifiers,
//! adjust, and aggregate.

use crate::domain::{round4, AnalysisResult, ClassScores, SentenceResult, Sentiment};
use crate::ports::{PortError, PortResult, TextClassifier};
use crate::rules::{self, TOXICITY_THRESHOLD};
use crate::text;
use std::sync::Arc;
use tracing::debug;

/// Default name of the toxic class reported by the toxicity model.
pub const DEFAULT_TOXIC_LABEL: &str = "toxic";

/// Sentiment and toxicity analysis over a pair of classifiers.
///
/// The toxicity classifier is optional; without it every sentence is scored
/// as non-toxic.
#[derive(Clone)]
pub struct Analyzer {
    sentiment: Arc<dyn TextClassifier>,
    toxicity: Option<Arc<dyn TextClassifier>>,
    toxic_label: String,
}

impl Analyzer {
    pub fn new(
        sentiment: Arc<dyn TextClassifier>,
        toxicity: Option<Arc<dyn TextClassifier>>,
        toxic_label: impl Into<String>,
    ) -> Self {
        Self {
            sentiment,
            toxicity,
            toxic_label: toxic_label.into(),
        }
    }

    pub fn has_toxicity(&self) -> bool {
        self.toxicity.is_some()
    }

    /// Analyzes `input` sentence by sentence and aggregates the result.
    pub async fn analyze(&self, input: &str) -> PortResult<AnalysisResult> {
        let sentences = text::split_sentences(input);
        debug!(sentences = sentences.len(), "Analyzing text");

        let mut details = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            details.push(self.score_sentence(&sentence).await?);
        }

        let (sentiment, confidence) = rules::aggregate(&details);
        debug!(%sentiment, confidence, "Text analyzed");
        Ok(AnalysisResult {
            text: input.to_string(),
            sentiment,
            confidence,
            hate_speech: details.iter().any(|d| d.hate_speech),
            details,
        })
    }

    async fn score_sentence(&self, raw: &str) -> PortResult<SentenceResult> {
        let sentence = text::normalize(raw);
        let bad_word = rules::contains_profanity(&sentence);

        let scores = self.sentiment.classify(&sentence).await?;
        let (sentiment, confidence) = top_sentiment(&scores)?;

        let (hate_speech, hate_confidence) = match &self.toxicity {
            Some(classifier) => {
                let scores = classifier.classify(&sentence).await?;
                self.toxicity_reading(&scores)
            }
            None => (false, 0.0),
        };

        let (sentiment, confidence) = rules::adjust(sentiment, confidence, hate_speech, bad_word);
        debug!(%sentiment, confidence, hate_speech, bad_word, "Sentence scored");

        Ok(SentenceResult {
            sentence,
            sentiment,
            confidence: round4(confidence),
            hate_speech,
            hate_confidence: round4(hate_confidence),
            bad_word,
        })
    }

    /// Returns whether the top class is the toxic one with enough mass, plus that mass.
    fn toxicity_reading(&self, scores: &ClassScores) -> (bool, f64) {
        match scores.top() {
            Some(top) => {
                let label = top.label.trim();
                let is_toxic_class = label.eq_ignore_ascii_case(&self.toxic_label)
                    || label.eq_ignore_ascii_case("LABEL_1");
                (is_toxic_class && top.score > TOXICITY_THRESHOLD, top.score)
            }
            None => (false, 0.0),
        }
    }
}

fn top_sentiment(scores: &ClassScores) -> PortResult<(Sentiment, f64)> {
    let top = scores
        .top()
        .ok_or_else(|| PortError::Upstream("Sentiment classifier returned no classes".to_string()))?;
    let sentiment = Sentiment::from_label(&top.label).ok_or_else(|| {
        PortError::Upstream(format!("Unknown sentiment label '{}'", top.label))
    })?;
    Ok((sentiment, top.score))
}
