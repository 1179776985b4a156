//! crates/sentiment_chain_core/src/text.rs
//!
//! Text preparation ahead of classification: placeholder substitution for
//! mentions and links, and sentence splitting for longer inputs.

use regex::Regex;
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

/// Inputs longer than this many characters are split into sentences.
pub const SPLIT_THRESHOLD: usize = 100;

pub const USER_PLACEHOLDER: &str = "@user";
pub const URL_PLACEHOLDER: &str = "http";

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("mention pattern is valid"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("url pattern is valid"));

/// Words that end in a period without ending the sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr.", "mrs.", "ms.", "dr.", "prof.", "sr.", "jr.", "st.", "vs.", "etc.", "e.g.", "i.e.",
    "inc.", "ltd.", "co.", "no.", "fig.", "approx.", "dept.", "est.", "jan.", "feb.", "aug.",
    "sept.", "oct.", "nov.", "dec.", "u.s.", "a.m.", "p.m.",
];

/// Replaces `@handle` mentions and `http(s)://` links with fixed placeholders.
pub fn normalize(text: &str) -> String {
    let text = MENTION_RE.replace_all(text, USER_PLACEHOLDER);
    URL_RE.replace_all(&text, URL_PLACEHOLDER).into_owned()
}

/// Splits `text` into sentences.
///
/// Short inputs (at most [`SPLIT_THRESHOLD`] characters) are returned whole and
/// untouched. Longer inputs are cut at Unicode (UAX #29) sentence boundaries,
/// then a boundary that follows a known abbreviation or an initial is undone.
pub fn split_sentences(text: &str) -> Vec<String> {
    if text.chars().count() <= SPLIT_THRESHOLD {
        return vec![text.to_string()];
    }

    let mut sentences = Vec::new();
    let mut pending = String::new();
    for piece in text.split_sentence_bounds() {
        pending.push_str(piece);
        if !ends_with_abbreviation(pending.trim_end()) {
            push_trimmed(&mut sentences, &pending);
            pending.clear();
        }
    }
    push_trimmed(&mut sentences, &pending);

    if sentences.is_empty() {
        sentences.push(text.trim().to_string());
    }
    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        sentences.push(piece.to_string());
    }
}

fn ends_with_abbreviation(piece: &str) -> bool {
    let Some(word) = piece.split_whitespace().last() else {
        return false;
    };
    let word = word.trim_start_matches(['(', '"', '\'', '“', '‘']);
    let lower = word.to_lowercase();
    if ABBREVIATIONS.contains(&lower.as_str()) {
        return true;
    }
    // Single-letter initials such as "J." in "J. R. R. Tolkien".
    let mut it = word.chars();
    matches!((it.next(), it.next(), it.next()), (Some(l), Some('.'), None) if l.is_alphabetic())
}
