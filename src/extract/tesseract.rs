//! Page rasterization and Tesseract OCR.
//!
//! Uses pdftoppm to render PDF pages to PNG and the tesseract command line
//! for recognition. Both are invoked per page except for the full-document
//! render used by the image-render-ocr mode.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use super::{check_cmd_status, handle_cmd_output, ExtractError};

/// Tesseract-based OCR over rasterized PDF pages.
pub struct TesseractOcr {
    language: String,
}

/// Rasterized pages of a document, in page order. The backing temp
/// directory lives as long as this value.
pub struct RenderedPages {
    _dir: TempDir,
    pages: Vec<PathBuf>,
}

impl RenderedPages {
    /// Image path for a 1-based page number, if that page was rendered.
    pub fn page(&self, number: u32) -> Option<&Path> {
        let index = number.checked_sub(1)? as usize;
        self.pages.get(index).map(|p| p.as_path())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self {
            language: "eng".to_string(),
        }
    }

    /// Set the Tesseract language.
    pub fn with_language(mut self, lang: &str) -> Self {
        self.language = lang.to_string();
        self
    }

    /// OCR a single page of a PDF, rendering it at the given resolution.
    pub fn ocr_pdf_page(
        &self,
        pdf_path: &Path,
        page: u32,
        dpi: u32,
    ) -> Result<String, ExtractError> {
        let temp_dir = TempDir::new()?;
        let image_path = self.rasterize_page(pdf_path, page, dpi, temp_dir.path())?;
        self.ocr_image(&image_path)
    }

    /// Run Tesseract on an image file.
    pub fn ocr_image(&self, image_path: &Path) -> Result<String, ExtractError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        handle_cmd_output(output, "tesseract (install tesseract-ocr)", "tesseract failed")
    }

    /// Render every page of a PDF to PNG at the given resolution.
    pub fn rasterize_document(
        &self,
        pdf_path: &Path,
        dpi: u32,
    ) -> Result<RenderedPages, ExtractError> {
        let temp_dir = TempDir::new()?;
        let dpi_str = dpi.to_string();

        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi_str])
            .arg(pdf_path)
            .arg(temp_dir.path().join("page"))
            .status();

        check_cmd_status(
            status,
            "pdftoppm (install poppler-utils)",
            "pdftoppm failed to convert PDF",
        )?;

        let mut pages: Vec<PathBuf> = std::fs::read_dir(temp_dir.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|ext| ext == "png").unwrap_or(false))
            .collect();
        pages.sort();

        if pages.is_empty() {
            return Err(ExtractError::Failed(
                "no images generated from PDF".to_string(),
            ));
        }

        Ok(RenderedPages {
            _dir: temp_dir,
            pages,
        })
    }

    /// Render a single page to PNG, returning the image path.
    fn rasterize_page(
        &self,
        pdf_path: &Path,
        page: u32,
        dpi: u32,
        output_dir: &Path,
    ) -> Result<PathBuf, ExtractError> {
        let page_str = page.to_string();
        let dpi_str = dpi.to_string();

        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi_str, "-f", &page_str, "-l", &page_str])
            .arg(pdf_path)
            .arg(output_dir.join("page"))
            .status();

        check_cmd_status(
            status,
            "pdftoppm (install poppler-utils)",
            &format!("pdftoppm failed to convert page {}", page),
        )?;

        find_page_image(output_dir, page).ok_or_else(|| {
            ExtractError::Failed(format!("no image generated for page {}", page))
        })
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the image file for a specific page number.
///
/// pdftoppm names files page-01.png, page-02.png, and so on, widening the
/// number for longer documents: page-001.png.
fn find_page_image(dir: &Path, page_num: u32) -> Option<PathBuf> {
    for digits in [1, 2, 3, 4] {
        let filename = format!("page-{:0width$}.png", page_num, width = digits);
        let path = dir.join(&filename);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_page_image_widths() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("page-003.png"), b"").unwrap();
        let found = find_page_image(dir.path(), 3).unwrap();
        assert!(found.ends_with("page-003.png"));
        assert!(find_page_image(dir.path(), 4).is_none());
    }

    #[test]
    fn test_rendered_pages_lookup() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("page-01.png");
        let second = dir.path().join("page-02.png");
        let rendered = RenderedPages {
            _dir: dir,
            pages: vec![first.clone(), second],
        };
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered.page(1), Some(first.as_path()));
        assert_eq!(rendered.page(3), None);
        assert_eq!(rendered.page(0), None);
    }
}
