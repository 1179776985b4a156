//! crates/sentiment_chain_core/src/prompt.rs
//!
//! Renders the prompt sent to the chat backend for a follow-up question.

/// Maximum number of characters of serialized analysis embedded in a prompt.
pub const MAX_ANALYSIS_CHARS: usize = 2500;

/// Reply used when the chat backend withholds every candidate.
pub const FALLBACK_REPLY: &str = "I cannot provide an answer.";

const GENERIC_CONTEXT: &str = "The user has not provided specific document text or analysis results yet. \
Answer generally or ask them to analyze first.";

/// Builds the chat prompt for `question`.
///
/// The analysis context is only used when both the original text and the
/// analysis results are present; otherwise the model is told no analysis exists.
pub fn build_chat_prompt(
    question: &str,
    original_text: Option<&str>,
    analysis: Option<&serde_json::Value>,
) -> String {
    let context = match (original_text, analysis) {
        (Some(text), Some(analysis)) if !text.is_empty() && !is_empty_json(analysis) => {
            analysis_context(text, analysis)
        }
        _ => GENERIC_CONTEXT.to_string(),
    };

    format!(
        "
You are a helpful AI assistant in the 'SentimentChain' app.
Use ONLY the provided context below. Do not hallucinate.

{context}

User Question:
{question}

Answer:
"
    )
}

fn analysis_context(text: &str, analysis: &serde_json::Value) -> String {
    let serialized = serde_json::to_string_pretty(analysis).unwrap_or_else(|_| analysis.to_string());
    let truncated: String = serialized.chars().take(MAX_ANALYSIS_CHARS).collect();
    let ellipsis = if serialized.chars().count() > MAX_ANALYSIS_CHARS {
        "..."
    } else {
        ""
    };

    format!(
        "\n--- Original Text Snippet ---\n{text}\n\n--- Analysis Results ---\n{truncated}{ellipsis}\n"
    )
}

fn is_empty_json(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::Object(o) => o.is_empty(),
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
    }
}
