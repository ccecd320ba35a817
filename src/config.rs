//! Service configuration.
//!
//! Defaults plus environment overrides, with `.env` loading handled in main
//! before anything reads the environment.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;

/// Service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Bind host for the web server.
    pub host: String,
    /// Bind port for the web server.
    pub port: u16,
    /// Allowed CORS origins; "*" means permissive.
    pub cors_origins: Vec<String>,
    /// Directory holding the served PDF documents.
    pub pdf_dir: PathBuf,
    /// Model client configuration.
    pub llm: LlmConfig,
}

impl Settings {
    /// Base default without env overrides.
    pub fn base_default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".to_string()],
            pdf_dir: PathBuf::from("./pdfs"),
            llm: LlmConfig::base_default(),
        }
    }

    /// Settings from defaults plus environment overrides.
    ///
    /// Supported env vars: `HOST`, `PORT`, `CORS_ORIGINS` (comma-separated),
    /// `PDF_BASE_PATH`, and the `LLM_*` family (see [`LlmConfig`]).
    pub fn from_env() -> Self {
        Self::base_default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }
        if let Ok(val) = std::env::var("CORS_ORIGINS") {
            self.cors_origins = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(val) = std::env::var("PDF_BASE_PATH") {
            self.pdf_dir = PathBuf::from(val);
        }
        self.llm = self.llm.with_env_overrides();
        self
    }

    /// The document registry: every `.pdf` under the base directory, keyed
    /// by file stem, in stable order. Rescanned on each call; the set is
    /// expected to be small and fixed.
    pub fn available_pdfs(&self) -> BTreeMap<String, PathBuf> {
        let mut pdfs = BTreeMap::new();
        let Ok(entries) = std::fs::read_dir(&self.pdf_dir) else {
            return pdfs;
        };
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            let is_pdf = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if !is_pdf {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                pdfs.insert(stem.to_string(), path);
            }
        }
        pdfs
    }

    /// Resolve a request's document identifier: a registry name first, then
    /// a literal path.
    pub fn resolve_pdf(&self, name: &str) -> PathBuf {
        self.available_pdfs()
            .remove(name)
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_defaults() {
        let settings = Settings::base_default();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.pdf_dir, PathBuf::from("./pdfs"));
        assert_eq!(settings.cors_origins, vec!["http://localhost:3000"]);
    }

    #[test]
    fn test_registry_scans_pdfs_only() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("manual.pdf"), b"%PDF-").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"nope").unwrap();
        std::fs::write(dir.path().join("mesh.PDF"), b"%PDF-").unwrap();

        let mut settings = Settings::base_default();
        settings.pdf_dir = dir.path().to_path_buf();

        let pdfs = settings.available_pdfs();
        assert_eq!(
            pdfs.keys().cloned().collect::<Vec<_>>(),
            vec!["manual".to_string(), "mesh".to_string()]
        );
    }

    #[test]
    fn test_resolve_falls_back_to_literal_path() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("manual.pdf"), b"%PDF-").unwrap();

        let mut settings = Settings::base_default();
        settings.pdf_dir = dir.path().to_path_buf();

        assert_eq!(settings.resolve_pdf("manual"), dir.path().join("manual.pdf"));
        assert_eq!(
            settings.resolve_pdf("/elsewhere/other.pdf"),
            PathBuf::from("/elsewhere/other.pdf")
        );
    }

    #[test]
    fn test_missing_registry_dir_is_empty() {
        let mut settings = Settings::base_default();
        settings.pdf_dir = PathBuf::from("/nonexistent/pdfs");
        assert!(settings.available_pdfs().is_empty());
    }
}
