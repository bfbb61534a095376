//! R-markdown notebooks and plain script files
//!
//! Best-effort stripping, not parsing: code chunks are removed from notebooks
//! and line comments from scripts.

use regex::Regex;
use std::path::Path;

use super::{read_text_lossy, Extractor};
use crate::error::{Error, Result};

/// An executable chunk from its ```` ```{r ```` opener to the next fence.
/// An unterminated chunk runs to the end of the document.
const CODE_CHUNK_PATTERN: &str = r"(?s)```\{r.*?(?:```|\z)";

/// Prose of an `.Rmd` notebook without its code chunks or heading markers
pub struct RMarkdownExtractor {
    code_chunk: Regex,
}

impl RMarkdownExtractor {
    pub fn new() -> Result<Self> {
        let code_chunk = Regex::new(CODE_CHUNK_PATTERN)
            .map_err(|e| Error::internal(format!("invalid code chunk pattern: {}", e)))?;
        Ok(Self { code_chunk })
    }

    fn strip(&self, source: &str) -> String {
        let prose = self.code_chunk.replace_all(source, "");
        prose
            .split('\n')
            .map(|line| {
                let line = line.trim();
                line.strip_prefix('#').map_or(line, str::trim_start)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Extractor for RMarkdownExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        Ok(self.strip(&read_text_lossy(path)?))
    }

    fn name(&self) -> &str {
        "rmd"
    }
}

/// Python, R and MATLAB sources with `#` / `%` comments cut off
pub struct ScriptExtractor;

impl ScriptExtractor {
    fn strip(source: &str) -> String {
        source
            .split('\n')
            .map(|line| match line.find(['#', '%']) {
                Some(idx) => line[..idx].trim(),
                None => line.trim(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Extractor for ScriptExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        Ok(Self::strip(&read_text_lossy(path)?))
    }

    fn name(&self) -> &str {
        "script"
    }
}
