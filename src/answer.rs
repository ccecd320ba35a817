//! Interpretation of raw model output into a structured answer.
//!
//! Model output is untrusted: it may not be JSON at all, or may be JSON with
//! fields missing. Interpretation therefore never fails: a malformed
//! structured response degrades to a raw-text result flagged as such, so the
//! caller can still surface something usable.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sentinel used when a structured response carries no `answer` field.
pub const NO_ANSWER: &str = "No answer";

/// How the caller wants the model's answer interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AnswerFormat {
    /// Parse the response as the structured answer schema.
    #[default]
    Structured,
    /// Pass the response through untouched.
    FreeText,
}

/// A page-level citation supporting an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based page number.
    pub page: u32,
    /// Short supporting snippet from that page.
    pub quote: String,
}

/// The parsed answer the model is asked to produce.
#[derive(Debug, Clone, Serialize)]
pub struct StructuredAnswer {
    pub answer: String,
    /// Two-letter language tag.
    pub language: String,
    pub citations: Vec<Citation>,
    /// Model-reported confidence in [0, 1].
    pub confidence: f32,
}

/// Outcome of interpreting a model response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QaResult {
    /// The response parsed as the structured schema.
    Structured(StructuredAnswer),
    /// The raw response text. `degraded` is true when a structured answer
    /// was requested but the response did not parse.
    RawText { text: String, degraded: bool },
}

/// Wire shape of the model's JSON response. All fields optional so that a
/// partially conforming response still maps to a usable answer.
#[derive(Debug, Deserialize)]
struct WireAnswer {
    answer: Option<String>,
    language: Option<String>,
    #[serde(default)]
    citations: Vec<WireCitation>,
    confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct WireCitation {
    page: Option<u32>,
    quote: Option<String>,
}

/// Interpret raw model text under the requested format.
pub fn interpret(raw: &str, format: AnswerFormat) -> QaResult {
    match format {
        AnswerFormat::FreeText => QaResult::RawText {
            text: raw.to_string(),
            degraded: false,
        },
        AnswerFormat::Structured => match serde_json::from_str::<WireAnswer>(raw) {
            Ok(wire) => QaResult::Structured(StructuredAnswer {
                answer: wire.answer.unwrap_or_else(|| NO_ANSWER.to_string()),
                language: wire.language.unwrap_or_else(|| "en".to_string()),
                citations: wire
                    .citations
                    .into_iter()
                    .map(|c| Citation {
                        page: c.page.unwrap_or(0),
                        quote: c.quote.unwrap_or_default(),
                    })
                    .collect(),
                confidence: wire.confidence.unwrap_or(0.0),
            }),
            Err(e) => {
                tracing::debug!("model output did not parse as structured answer: {}", e);
                QaResult::RawText {
                    text: raw.to_string(),
                    degraded: true,
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::INSUFFICIENT_ANSWER;

    #[test]
    fn test_interpret_well_formed_response() {
        let raw = r#"{"answer":"X","language":"en","citations":[{"page":1,"quote":"q"}],"confidence":0.9}"#;
        match interpret(raw, AnswerFormat::Structured) {
            QaResult::Structured(a) => {
                assert_eq!(a.answer, "X");
                assert_eq!(a.language, "en");
                assert_eq!(
                    a.citations,
                    vec![Citation {
                        page: 1,
                        quote: "q".to_string()
                    }]
                );
                assert!((a.confidence - 0.9).abs() < f32::EPSILON);
            }
            other => panic!("expected structured answer, got {:?}", other),
        }
    }

    #[test]
    fn test_interpret_defaults_for_missing_fields() {
        match interpret("{}", AnswerFormat::Structured) {
            QaResult::Structured(a) => {
                assert_eq!(a.answer, NO_ANSWER);
                assert_eq!(a.language, "en");
                assert!(a.citations.is_empty());
                assert_eq!(a.confidence, 0.0);
            }
            other => panic!("expected structured answer, got {:?}", other),
        }
    }

    #[test]
    fn test_interpret_non_json_degrades_to_raw_text() {
        match interpret("plain text", AnswerFormat::Structured) {
            QaResult::RawText { text, degraded } => {
                assert_eq!(text, "plain text");
                assert!(degraded);
            }
            other => panic!("expected raw text, got {:?}", other),
        }
    }

    #[test]
    fn test_interpret_free_text_never_parses() {
        let raw = r#"{"answer":"still raw"}"#;
        match interpret(raw, AnswerFormat::FreeText) {
            QaResult::RawText { text, degraded } => {
                assert_eq!(text, raw);
                assert!(!degraded);
            }
            other => panic!("expected raw text, got {:?}", other),
        }
    }

    #[test]
    fn test_insufficient_answer_needs_no_citation() {
        let raw = serde_json::json!({
            "answer": INSUFFICIENT_ANSWER,
            "language": "en",
            "confidence": 0.2
        })
        .to_string();
        match interpret(&raw, AnswerFormat::Structured) {
            QaResult::Structured(a) => {
                assert_eq!(a.answer, INSUFFICIENT_ANSWER);
                assert!(a.citations.is_empty());
            }
            other => panic!("expected structured answer, got {:?}", other),
        }
    }

    #[test]
    fn test_substantive_answer_preserves_citations() {
        let raw = serde_json::json!({
            "answer": "Tighten to 12 Nm.",
            "language": "en",
            "citations": [
                {"page": 3, "quote": "torque: 12 Nm"},
                {"page": 7, "quote": "see table 2"}
            ],
            "confidence": 0.8
        })
        .to_string();
        match interpret(&raw, AnswerFormat::Structured) {
            QaResult::Structured(a) => {
                assert_eq!(a.citations.len(), 2);
                assert_eq!(a.citations[0].page, 3);
                assert_eq!(a.citations[0].quote, "torque: 12 Nm");
                assert_eq!(a.citations[1].page, 7);
            }
            other => panic!("expected structured answer, got {:?}", other),
        }
    }
}
