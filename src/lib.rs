//! docask - PDF question answering with OCR fallback.
//!
//! Extracts per-page text from PDF documents (falling back to OCR when the
//! text layer is sparse), assembles a bounded page-tagged prompt, and
//! delegates answer synthesis to an external language-model service whose
//! structured response is interpreted defensively.

pub mod answer;
pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod server;
