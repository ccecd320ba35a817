//! Page-level extraction with an ordered fallback chain per mode.

use std::path::Path;
use std::process::Command;

use super::{handle_cmd_output, ExtractError, ExtractionMode, Page, PageMethod, TesseractOcr};

/// Resolution for the OCR fallback: 2x the 72 DPI PDF user-space baseline.
const OCR_FALLBACK_DPI: u32 = 144;

/// Resolution for the unconditional full-document render.
const FULL_RENDER_DPI: u32 = 200;

/// Default minimum trimmed length for a page's embedded text to count as
/// usable without OCR.
const MIN_USABLE_CHARS: usize = 50;

/// One way of pulling text off a page. Each extraction mode is an ordered
/// list of these, tried in sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    /// Embedded text layer (pdftotext -layout).
    Embedded,
    /// Rasterize the page and run Tesseract at the given resolution.
    /// Only runs when the text so far is below the usable threshold, and
    /// its result only wins when strictly longer than the text so far.
    Ocr { dpi: u32 },
    /// Positional text blocks in content-stream order (pdftotext -raw).
    /// Only runs when the text so far is blank or OCR failed outright.
    Blocks,
}

/// Ordered strategy chain for an extraction mode.
pub fn plan(mode: ExtractionMode) -> &'static [PageStrategy] {
    match mode {
        ExtractionMode::DirectOnly => &[PageStrategy::Embedded, PageStrategy::Blocks],
        ExtractionMode::OcrPrimary => &[
            PageStrategy::Embedded,
            PageStrategy::Ocr {
                dpi: OCR_FALLBACK_DPI,
            },
            PageStrategy::Blocks,
        ],
        ExtractionMode::ImageRenderOcr => &[PageStrategy::Ocr {
            dpi: FULL_RENDER_DPI,
        }],
    }
}

/// Extracts an ordered sequence of page texts from a PDF.
pub struct PageExtractor {
    min_usable_chars: usize,
    ocr: TesseractOcr,
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self {
            min_usable_chars: MIN_USABLE_CHARS,
            ocr: TesseractOcr::new(),
        }
    }
}

impl PageExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum usable embedded-text length.
    pub fn with_min_usable_chars(mut self, min_chars: usize) -> Self {
        self.min_usable_chars = min_chars;
        self
    }

    /// Set the Tesseract language.
    pub fn with_language(mut self, lang: &str) -> Self {
        self.ocr = TesseractOcr::new().with_language(lang);
        self
    }

    /// Extract one entry per source page. An unreadable document or missing
    /// tooling yields an empty vector; no error crosses this boundary.
    pub fn extract(&self, path: &Path, mode: ExtractionMode) -> Vec<Page> {
        let Some(page_count) = self.page_count(path) else {
            tracing::warn!("could not determine page count for {}", path.display());
            return Vec::new();
        };
        if page_count == 0 {
            return Vec::new();
        }

        match mode {
            ExtractionMode::ImageRenderOcr => self.extract_rendered(path, page_count),
            _ => (1..=page_count)
                .map(|number| self.extract_page(path, number, mode))
                .collect(),
        }
    }

    /// Get the page count of a PDF via pdfinfo.
    pub fn page_count(&self, path: &Path) -> Option<u32> {
        let output = Command::new("pdfinfo").arg(path).output().ok()?;
        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            if line.starts_with("Pages:") {
                return line.split_whitespace().nth(1).and_then(|s| s.parse().ok());
            }
        }
        None
    }

    /// Run one page through the mode's strategy chain.
    fn extract_page(&self, path: &Path, number: u32, mode: ExtractionMode) -> Page {
        let source = PdfPage {
            extractor: self,
            path,
            number,
        };
        self.run_chain(number, mode, &source)
    }

    /// The strategy loop itself, fed by a [`PageSource`] so the merge rules
    /// can be exercised without shelling out.
    fn run_chain(&self, number: u32, mode: ExtractionMode, source: &dyn PageSource) -> Page {
        let mut text = String::new();
        let mut method = PageMethod::Embedded;
        let mut ocr_failed = false;

        for strategy in plan(mode) {
            match strategy {
                PageStrategy::Embedded => {
                    if let Ok(t) = source.embedded() {
                        text = t;
                    }
                }
                PageStrategy::Ocr { dpi } => {
                    if text.trim().len() >= self.min_usable_chars {
                        continue;
                    }
                    match source.ocr(*dpi) {
                        // Keep whichever candidate is longer; a shorter OCR
                        // result never replaces the embedded text.
                        Ok(t) if t.trim().len() > text.trim().len() => {
                            text = t;
                            method = PageMethod::Ocr;
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!("OCR failed for page {}: {}", number, e);
                            ocr_failed = true;
                        }
                    }
                }
                PageStrategy::Blocks => {
                    if !text.trim().is_empty() && !ocr_failed {
                        continue;
                    }
                    if let Ok(t) = source.blocks() {
                        if !t.trim().is_empty() {
                            text = t;
                            method = PageMethod::Blocks;
                        }
                    }
                }
            }
        }

        Page {
            number,
            text: text.trim().to_string(),
            method,
        }
    }

    /// Rasterize the whole document once and OCR each page. A page whose OCR
    /// fails still produces an empty entry so the count stays true.
    fn extract_rendered(&self, path: &Path, page_count: u32) -> Vec<Page> {
        let rendered = match self.ocr.rasterize_document(path, FULL_RENDER_DPI) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("full-document render failed for {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        (1..=page_count)
            .map(|number| {
                let text = rendered
                    .page(number)
                    .and_then(|image| match self.ocr.ocr_image(image) {
                        Ok(t) => Some(t),
                        Err(e) => {
                            tracing::warn!("OCR failed for page {}: {}", number, e);
                            None
                        }
                    })
                    .unwrap_or_default();
                Page {
                    number,
                    text: text.trim().to_string(),
                    method: PageMethod::Ocr,
                }
            })
            .collect()
    }

    /// Embedded text layer for a single page.
    fn embedded_text(&self, path: &Path, page: u32) -> Result<String, ExtractError> {
        self.pdftotext(path, page, "-layout")
    }

    /// Positional text blocks for a single page, in content-stream order.
    fn block_text(&self, path: &Path, page: u32) -> Result<String, ExtractError> {
        self.pdftotext(path, page, "-raw")
    }

    fn pdftotext(&self, path: &Path, page: u32, layout_flag: &str) -> Result<String, ExtractError> {
        let page_str = page.to_string();
        let output = Command::new("pdftotext")
            .args([layout_flag, "-enc", "UTF-8", "-f", &page_str, "-l", &page_str])
            .arg(path)
            .arg("-") // Output to stdout
            .output();

        handle_cmd_output(
            output,
            "pdftotext (install poppler-utils)",
            &format!("pdftotext failed on page {}", page),
        )
    }
}

/// Per-page text sources the strategy chain draws from.
trait PageSource {
    fn embedded(&self) -> Result<String, ExtractError>;
    fn ocr(&self, dpi: u32) -> Result<String, ExtractError>;
    fn blocks(&self) -> Result<String, ExtractError>;
}

/// The real sources: poppler and Tesseract against one page of a PDF.
struct PdfPage<'a> {
    extractor: &'a PageExtractor,
    path: &'a Path,
    number: u32,
}

impl PageSource for PdfPage<'_> {
    fn embedded(&self) -> Result<String, ExtractError> {
        self.extractor.embedded_text(self.path, self.number)
    }

    fn ocr(&self, dpi: u32) -> Result<String, ExtractError> {
        self.extractor.ocr.ocr_pdf_page(self.path, self.number, dpi)
    }

    fn blocks(&self) -> Result<String, ExtractError> {
        self.extractor.block_text(self.path, self.number)
    }
}
