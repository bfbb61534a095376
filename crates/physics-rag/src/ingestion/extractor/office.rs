//! Word (.docx) and PowerPoint (.pptx) packages
//!
//! Both are zip archives of XML parts. Text runs are concatenated and a line
//! break is emitted at every closing paragraph element (`</w:p>`, `</a:p>`).

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use super::Extractor;
use crate::error::{Error, Result};

const DOCX_BODY: &str = "word/document.xml";
const PPTX_SLIDE_PREFIX: &str = "ppt/slides/slide";

/// Reads `word/document.xml`
pub struct DocxExtractor;

impl Extractor for DocxExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let mut archive = open_archive(path)?;
        let raw = read_part(&mut archive, DOCX_BODY)
            .map_err(|e| Error::extraction(path, e))?;
        Ok(paragraph_text(&raw))
    }

    fn name(&self) -> &str {
        "docx"
    }
}

/// Reads every `ppt/slides/slideN.xml`, in slide order
pub struct PptxExtractor;

impl Extractor for PptxExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let mut archive = open_archive(path)?;

        let mut slides: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| slide_number(name).map(|n| (n, name.to_string())))
            .collect();
        slides.sort();

        if slides.is_empty() {
            return Err(Error::extraction(path, "presentation has no slide parts"));
        }

        let mut texts = Vec::with_capacity(slides.len());
        for (_, name) in slides {
            let raw = read_part(&mut archive, &name).map_err(|e| Error::extraction(path, e))?;
            texts.push(paragraph_text(&raw));
        }

        Ok(texts.join("\n"))
    }

    fn name(&self) -> &str {
        "pptx"
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| Error::extraction(path, e.to_string()))?;
    ZipArchive::new(file).map_err(|e| Error::extraction(path, format!("not a zip package: {}", e)))
}

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> std::result::Result<Vec<u8>, String> {
    let mut part = archive
        .by_name(name)
        .map_err(|e| format!("missing part {}: {}", name, e))?;

    let mut raw = Vec::new();
    part.read_to_end(&mut raw)
        .map_err(|e| format!("failed to read {}: {}", name, e))?;
    Ok(raw)
}

/// `ppt/slides/slide12.xml` → 12; anything else (rels, layouts) → None
fn slide_number(name: &str) -> Option<u32> {
    name.strip_prefix(PPTX_SLIDE_PREFIX)?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

/// Concatenate character data, breaking lines at closing `p` elements.
///
/// Malformed XML stops the walk; whatever was collected so far is returned.
pub(crate) fn paragraph_text(raw: &[u8]) -> String {
    let mut reader = Reader::from_reader(raw);
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(e)) => match e.unescape() {
                Ok(unescaped) => text.push_str(&unescaped),
                Err(_) => text.push_str(&String::from_utf8_lossy(&e)),
            },
            Ok(Event::CData(e)) => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"p" {
                    text.push('\n');
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!("XML parse stopped early: {}", e);
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    text
}
