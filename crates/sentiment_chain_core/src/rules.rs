//! crates/sentiment_chain_core/src/rules.rs
//!
//! Confidence adjustments that blend the toxicity signal and a profanity
//! lexicon into the sentiment reading, and the majority-vote aggregation
//! over sentence results.

use crate::domain::{round4, SentenceResult, Sentiment};

/// A toxicity reading only counts when its class probability exceeds this value.
pub const TOXICITY_THRESHOLD: f64 = 0.75;

/// Positive readings of toxic sentences below this confidence become neutral.
const TOXIC_POSITIVE_CEILING: f64 = 0.85;
/// Positive readings of profane sentences below this confidence become neutral.
const PROFANE_POSITIVE_CEILING: f64 = 0.75;
/// Confidence assigned to a downgraded positive reading.
const DOWNGRADED_CONFIDENCE: f64 = 0.6;
/// Upper bound for the confidence of a neutral, profane sentence.
const PROFANE_NEUTRAL_CAP: f64 = 0.5;

pub const PROFANITY_LEXICON: &[&str] = &[
    "retard", "idiot", "stupid", "moron", "fool", "dumb", "trash", "garbage", "bastard", "ass",
    "shit", "fuck", "dick", "bitch",
];

/// Case-insensitive substring match against [`PROFANITY_LEXICON`].
pub fn contains_profanity(sentence: &str) -> bool {
    let lower = sentence.to_lowercase();
    PROFANITY_LEXICON.iter().any(|word| lower.contains(word))
}

/// Applies the adjustment rules to one sentence reading.
///
/// The toxic rule runs first. The lexicon rules then see its output, so a
/// toxic, profane sentence that was downgraded to neutral is also capped.
pub fn adjust(
    sentiment: Sentiment,
    confidence: f64,
    toxic: bool,
    profane: bool,
) -> (Sentiment, f64) {
    let (mut sentiment, mut confidence) = (sentiment, confidence);

    if toxic && sentiment == Sentiment::Positive && confidence < TOXIC_POSITIVE_CEILING {
        sentiment = Sentiment::Neutral;
        confidence = DOWNGRADED_CONFIDENCE;
    }

    if profane {
        if sentiment == Sentiment::Positive && confidence < PROFANE_POSITIVE_CEILING {
            sentiment = Sentiment::Neutral;
            confidence = DOWNGRADED_CONFIDENCE;
        } else if sentiment == Sentiment::Neutral {
            confidence = confidence.min(PROFANE_NEUTRAL_CAP);
        }
    }

    (sentiment, confidence)
}

/// Majority vote over sentence labels.
///
/// A label wins only with strictly more votes than each of the other two;
/// anything else is neutral. The confidence is the mean over the sentences that
/// agree with the winner, or 0.0 when none do.
pub fn aggregate(details: &[SentenceResult]) -> (Sentiment, f64) {
    let count = |label: Sentiment| details.iter().filter(|d| d.sentiment == label).count();
    let (positive, negative, neutral) = (
        count(Sentiment::Positive),
        count(Sentiment::Negative),
        count(Sentiment::Neutral),
    );

    let overall = if positive > negative && positive > neutral {
        Sentiment::Positive
    } else if negative > positive && negative > neutral {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };

    let agreeing: Vec<f64> = details
        .iter()
        .filter(|d| d.sentiment == overall)
        .map(|d| d.confidence)
        .collect();
    let confidence = if agreeing.is_empty() {
        0.0
    } else {
        round4(agreeing.iter().sum::<f64>() / agreeing.len() as f64)
    };

    (overall, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(sentiment: Sentiment, confidence: f64) -> SentenceResult {
        SentenceResult {
            sentence: String::new(),
            sentiment,
            confidence,
            hate_speech: false,
            hate_confidence: 0.0,
            bad_word: false,
        }
    }

    #[test]
    fn toxic_positive_below_ceiling_becomes_neutral() {
        assert_eq!(
            adjust(Sentiment::Positive, 0.80, true, false),
            (Sentiment::Neutral, 0.6)
        );
    }

    #[test]
    fn toxic_downgrade_ignores_second_positive_rule() {
        // The profane-positive guard no longer matches once the toxic rule has fired,
        // only the neutral cap applies.
        let (sentiment, confidence) = adjust(Sentiment::Positive, 0.80, true, true);
        assert_eq!(sentiment, Sentiment::Neutral);
        assert_eq!(confidence, 0.5);
    }

    #[test]
    fn confident_toxic_positive_is_kept() {
        assert_eq!(
            adjust(Sentiment::Positive, 0.9, true, false),
            (Sentiment::Positive, 0.9)
        );
    }

    #[test]
    fn profane_positive_below_ceiling_becomes_neutral() {
        assert_eq!(
            adjust(Sentiment::Positive, 0.7, false, true),
            (Sentiment::Neutral, 0.6)
        );
        assert_eq!(
            adjust(Sentiment::Positive, 0.8, false, true),
            (Sentiment::Positive, 0.8)
        );
    }

    #[test]
    fn profane_neutral_is_clamped_downward_only() {
        assert_eq!(
            adjust(Sentiment::Neutral, 0.9, false, true),
            (Sentiment::Neutral, 0.5)
        );
        assert_eq!(
            adjust(Sentiment::Neutral, 0.4, false, true),
            (Sentiment::Neutral, 0.4)
        );
    }

    #[test]
    fn negative_readings_are_untouched() {
        assert_eq!(
            adjust(Sentiment::Negative, 0.55, true, true),
            (Sentiment::Negative, 0.55)
        );
    }

    #[test]
    fn lexicon_matches_substrings_case_insensitively() {
        assert!(contains_profanity("What an IDIOT"));
        assert!(contains_profanity("classic mistake")); // "ass" inside "classic"
        assert!(!contains_profanity("What a lovely day"));
    }

    #[test]
    fn three_way_tie_is_neutral() {
        let details = vec![
            detail(Sentiment::Positive, 0.9),
            detail(Sentiment::Negative, 0.8),
            detail(Sentiment::Neutral, 0.7),
        ];
        assert_eq!(aggregate(&details), (Sentiment::Neutral, 0.7));
    }

    #[test]
    fn two_way_tie_without_neutral_votes_scores_zero() {
        let details = vec![
            detail(Sentiment::Positive, 0.9),
            detail(Sentiment::Negative, 0.8),
        ];
        assert_eq!(aggregate(&details), (Sentiment::Neutral, 0.0));
    }

    #[test]
    fn majority_averages_agreeing_confidences() {
        let details = vec![
            detail(Sentiment::Negative, 0.9),
            detail(Sentiment::Negative, 0.6),
            detail(Sentiment::Positive, 0.99),
        ];
        assert_eq!(aggregate(&details), (Sentiment::Negative, 0.75));
    }

    #[test]
    fn empty_input_defaults_to_neutral_zero() {
        assert_eq!(aggregate(&[]), (Sentiment::Neutral, 0.0));
    }
}
