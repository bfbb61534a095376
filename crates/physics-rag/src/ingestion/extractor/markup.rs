//! HTML and generic XML

use quick_xml::events::Event;
use quick_xml::Reader;
use scraper::{Html, Node};
use std::path::Path;

use super::{read_utf8, Extractor};
use crate::error::{Error, Result};

/// Elements whose text is never rendered
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Visible text of an HTML document
pub struct HtmlExtractor;

impl Extractor for HtmlExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let html = read_utf8(path)?;
        Ok(visible_text(&html))
    }

    fn name(&self) -> &str {
        "html"
    }
}

fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();

    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join(" ")
}

/// All character data of an XML document
pub struct XmlExtractor;

impl Extractor for XmlExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let xml = read_utf8(path)?;
        let mut reader = Reader::from_str(&xml);
        let mut parts: Vec<String> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    push_trimmed(&mut parts, &text);
                }
                Ok(Event::CData(e)) => push_trimmed(&mut parts, &String::from_utf8_lossy(&e)),
                Ok(Event::Eof) => break,
                Err(e) if parts.is_empty() => {
                    return Err(Error::extraction(path, format!("malformed XML: {}", e)));
                }
                Err(e) => {
                    tracing::warn!(
                        "Malformed XML in {} at byte {}, keeping text read so far: {}",
                        path.display(),
                        reader.buffer_position(),
                        e
                    );
                    break;
                }
                _ => {}
            }
        }

        Ok(parts.join(" "))
    }

    fn name(&self) -> &str {
        "xml"
    }
}

fn push_trimmed(parts: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}
