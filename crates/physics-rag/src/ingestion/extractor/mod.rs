//! Format-dispatching text extraction
//!
//! Every format is a type implementing [`Extractor`]. The [`ExtractorRegistry`]
//! maps lowercased extensions to strategies; it is built once at startup and
//! only read afterwards. Files with an unregistered extension are read as
//! UTF-8 text.

mod literate;
mod markup;
mod office;
mod pdf;
mod structured;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::extension_key;

pub use literate::{RMarkdownExtractor, ScriptExtractor};
pub use markup::{HtmlExtractor, XmlExtractor};
pub use office::{DocxExtractor, PptxExtractor};
pub use pdf::{OcrConfig, OcrPdfExtractor, TextPdfExtractor};
pub use structured::{JsonExtractor, YamlExtractor};

/// Produces plain text from one file
pub trait Extractor: Send + Sync {
    /// Extract the text content of `path`
    fn extract(&self, path: &Path) -> Result<String>;

    /// Strategy name for logging
    fn name(&self) -> &str;
}

/// Extension → strategy lookup table
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Empty registry; everything falls back to plain text
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in format
    pub fn with_defaults(ocr: &OcrConfig) -> Result<Self> {
        let mut registry = Self::new();

        registry.register(".docx", Arc::new(DocxExtractor));
        registry.register(".pptx", Arc::new(PptxExtractor));
        registry.register(".pdf", Arc::new(TextPdfExtractor::default()));
        registry.register(".scan.pdf", Arc::new(OcrPdfExtractor::new(ocr.clone())));

        let html: Arc<dyn Extractor> = Arc::new(HtmlExtractor);
        registry.register(".html", Arc::clone(&html));
        registry.register(".htm", html);
        registry.register(".xml", Arc::new(XmlExtractor));

        registry.register(".json", Arc::new(JsonExtractor));
        let yaml: Arc<dyn Extractor> = Arc::new(YamlExtractor);
        registry.register(".yaml", Arc::clone(&yaml));
        registry.register(".yml", yaml);

        registry.register(".rmd", Arc::new(RMarkdownExtractor::new()?));
        let script: Arc<dyn Extractor> = Arc::new(ScriptExtractor);
        for ext in [".py", ".r", ".m"] {
            registry.register(ext, Arc::clone(&script));
        }

        Ok(registry)
    }

    /// Register (or replace) the strategy for an extension such as `.md`
    pub fn register(&mut self, extension: &str, extractor: Arc<dyn Extractor>) {
        let key = extension.to_lowercase();
        let key = if key.starts_with('.') { key } else { format!(".{}", key) };
        self.extractors.insert(key, extractor);
    }

    /// Strategy registered for an exact extension key
    pub fn get(&self, extension: &str) -> Option<&Arc<dyn Extractor>> {
        self.extractors.get(&extension.to_lowercase())
    }

    /// Strategy for a path. Compound suffixes like `.scan.pdf` win over the
    /// final extension.
    pub fn resolve(&self, path: &Path) -> Option<&Arc<dyn Extractor>> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let compound = self
            .extractors
            .iter()
            .filter(|(key, _)| key.matches('.').count() > 1 && file_name.ends_with(key.as_str()))
            .max_by_key(|(key, _)| key.len())
            .map(|(_, extractor)| extractor);

        compound.or_else(|| self.extractors.get(&extension_key(path)))
    }

    /// Extract text from `path`, falling back to UTF-8 for unknown extensions
    pub fn extract(&self, path: &Path) -> Result<String> {
        match self.resolve(path) {
            Some(extractor) => {
                tracing::debug!("Extracting {} with {}", path.display(), extractor.name());
                extractor.extract(path)
            }
            None => read_text_lossy(path),
        }
    }

    /// Registered extension keys, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

/// Read a file and decode it as UTF-8, replacing invalid sequences
pub(crate) fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes = read_bytes(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Read a file, reporting failures as extraction errors
pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::extraction(path, e.to_string()))
}

/// Read a file that must be valid UTF-8
pub(crate) fn read_utf8(path: &Path) -> Result<String> {
    String::from_utf8(read_bytes(path)?)
        .map_err(|e| Error::extraction(path, format!("not valid UTF-8: {}", e)))
}
