//! Prompt assembly: a bounded, page-tagged text block interpolated into a
//! fixed instruction template.
//!
//! The template is a static contract with the answer interpreter: the model
//! is told the exact output JSON schema and the exact insufficiency string,
//! and [`crate::answer`] depends on both.

use std::path::Path;

use crate::extract::Page;

/// Default character budget for the assembled block. Keeps the downstream
/// model call within context-window and cost limits.
pub const DEFAULT_MAX_CHARS: usize = 120_000;

/// Canonical answer when the documents do not support a substantive one.
pub const INSUFFICIENT_ANSWER: &str =
    "The provided PDF does not contain enough information to answer this question.";

/// System message for structured (JSON) answers.
pub const SYSTEM_STRUCTURED: &str =
    "You only answer from the provided PDF content. Return valid JSON only.";

/// System message for free-text answers.
pub const SYSTEM_FREE_TEXT: &str = "You only answer from the provided PDF content.";

/// Instruction template. `{pdf_text_block}` and `{user_question}` are
/// substituted by [`build_prompt`].
const ANSWER_TEMPLATE: &str = r#"You are an assistant that answers questions strictly from the provided PDF content.

Output JSON schema (return valid JSON only, no extra text):
{
  "answer": "<concise answer or the exact string: The provided PDF does not contain enough information to answer this question.>",
  "language": "en|zh",
  "citations": [
    {
      "page": <integer page number, 1-based>,
      "quote": "<short supporting snippet from that page>"
    }
  ],
  "confidence": <float 0..1>
}

Rules:
- Use only the PDF content below.
- If uncertain or unsupported by the text, use the exact insufficiency string above.
- Keep "answer" ≤ 120 words unless the question explicitly asks for a long explanation.
- Always include at least one citation when you provide a substantive answer.
- Match the user's language (English/Chinese) for "answer" and "language".
- Do not invent references.

PDF CONTENT (paged):
{pdf_text_block}

QUESTION:
{user_question}
"#;

/// Assemble one or more documents' page sequences into a single paged text
/// block no longer than `max_chars`.
///
/// Documents are visited in the given order, pages in page order. Each chunk
/// is a `=== <basename> — Page <n> ===` header, the page text, and a trailing
/// newline; chunks are separated by a blank line. Assembly stops before the
/// first chunk that would push the total past the budget; no partial chunk is
/// ever emitted.
pub fn build_paged_block(docs: &[(&str, &[Page])], max_chars: usize) -> String {
    let mut block = String::new();

    for (label, pages) in docs {
        let name = basename(label);
        for page in *pages {
            let chunk = format!("=== {} — Page {} ===\n{}\n", name, page.number, page.text);
            // The separator between chunks counts against the budget too.
            let separator = if block.is_empty() { 0 } else { 1 };
            if block.len() + separator + chunk.len() > max_chars {
                return block;
            }
            if separator == 1 {
                block.push('\n');
            }
            block.push_str(&chunk);
        }
    }

    block
}

/// Interpolate the paged block and the question into the instruction
/// template.
pub fn build_prompt(pdf_text_block: &str, question: &str) -> String {
    ANSWER_TEMPLATE
        .replace("{pdf_text_block}", pdf_text_block)
        .replace("{user_question}", question)
}

fn basename(label: &str) -> &str {
    Path::new(label)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Page, PageMethod};

    fn page(number: u32, text: &str) -> Page {
        Page {
            number,
            text: text.to_string(),
            method: PageMethod::Embedded,
        }
    }

    #[test]
    fn test_block_tags_pages_with_basename() {
        let pages = vec![page(1, "alpha"), page(2, "beta")];
        let block = build_paged_block(&[("/docs/manual.pdf", pages.as_slice())], DEFAULT_MAX_CHARS);

        assert!(block.starts_with("=== manual.pdf — Page 1 ===\nalpha\n"));
        assert!(block.contains("=== manual.pdf — Page 2 ===\nbeta\n"));
    }

    #[test]
    fn test_block_preserves_document_then_page_order() {
        let first = vec![page(1, "a1"), page(2, "a2")];
        let second = vec![page(1, "b1")];
        let block = build_paged_block(
            &[("a.pdf", first.as_slice()), ("b.pdf", second.as_slice())],
            DEFAULT_MAX_CHARS,
        );

        let a1 = block.find("a.pdf — Page 1").unwrap();
        let a2 = block.find("a.pdf — Page 2").unwrap();
        let b1 = block.find("b.pdf — Page 1").unwrap();
        assert!(a1 < a2 && a2 < b1);
    }

    #[test]
    fn test_block_never_exceeds_budget() {
        let pages: Vec<Page> = (1..=50)
            .map(|n| page(n, &"x".repeat(200)))
            .collect();

        for budget in [0, 100, 500, 1000, 5000] {
            let block = build_paged_block(&[("doc.pdf", pages.as_slice())], budget);
            assert!(
                block.len() <= budget,
                "budget {} exceeded: {}",
                budget,
                block.len()
            );
        }
    }

    #[test]
    fn test_block_truncates_whole_chunks_only() {
        let pages = vec![page(1, "first page text"), page(2, "second page text")];
        let one_chunk = format!("=== doc.pdf — Page 1 ===\n{}\n", "first page text");

        // Budget fits the first chunk but not the second.
        let block = build_paged_block(&[("doc.pdf", pages.as_slice())], one_chunk.len() + 5);
        assert_eq!(block, one_chunk);
        assert!(!block.contains("second"));
    }

    #[test]
    fn test_block_empty_page_still_tagged() {
        let pages = vec![page(1, "")];
        let block = build_paged_block(&[("doc.pdf", pages.as_slice())], DEFAULT_MAX_CHARS);
        assert_eq!(block, "=== doc.pdf — Page 1 ===\n\n");
    }

    #[test]
    fn test_prompt_interpolates_block_and_question() {
        let prompt = build_prompt("PAGED BLOCK HERE", "What is the torque spec?");
        assert!(prompt.contains("PAGED BLOCK HERE"));
        assert!(prompt.contains("QUESTION:\nWhat is the torque spec?"));
        assert!(!prompt.contains("{pdf_text_block}"));
        assert!(!prompt.contains("{user_question}"));
    }

    #[test]
    fn test_template_states_schema_and_insufficiency_contract() {
        let prompt = build_prompt("", "");
        for field in ["\"answer\"", "\"language\"", "\"citations\"", "\"confidence\"", "\"page\"", "\"quote\""] {
            assert!(prompt.contains(field), "missing field {}", field);
        }
        assert!(prompt.contains(INSUFFICIENT_ANSWER));
    }
}
