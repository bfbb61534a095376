//! JSON and YAML documents
//!
//! Both are parsed into a generic tree and flattened to the mapping keys and
//! string leaves, depth-first. Keys are kept because they usually label the
//! values next to them. Numbers, booleans and nulls carry no searchable text
//! and are dropped.

use std::path::Path;

use super::{read_bytes, Extractor};
use crate::error::{Error, Result};

pub struct JsonExtractor;

impl Extractor for JsonExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let value: serde_json::Value = serde_json::from_slice(&read_bytes(path)?)
            .map_err(|e| Error::extraction(path, format!("invalid JSON: {}", e)))?;

        let mut parts = Vec::new();
        collect_json(&value, &mut parts);
        Ok(parts.join(" "))
    }

    fn name(&self) -> &str {
        "json"
    }
}

fn collect_json<'a>(value: &'a serde_json::Value, out: &mut Vec<&'a str>) {
    use serde_json::Value;

    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|item| collect_json(item, out)),
        Value::Object(map) => {
            for (key, item) in map {
                out.push(key);
                collect_json(item, out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

pub struct YamlExtractor;

impl Extractor for YamlExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let value: serde_yaml::Value = serde_yaml::from_slice(&read_bytes(path)?)
            .map_err(|e| Error::extraction(path, format!("invalid YAML: {}", e)))?;

        let mut parts = Vec::new();
        collect_yaml(&value, &mut parts);
        Ok(parts.join(" "))
    }

    fn name(&self) -> &str {
        "yaml"
    }
}

fn collect_yaml<'a>(value: &'a serde_yaml::Value, out: &mut Vec<&'a str>) {
    use serde_yaml::Value;

    match value {
        Value::String(s) => out.push(s),
        Value::Sequence(items) => items.iter().for_each(|item| collect_yaml(item, out)),
        Value::Mapping(map) => {
            for (key, item) in map {
                if let Value::String(key) = key {
                    out.push(key);
                }
                collect_yaml(item, out);
            }
        }
        Value::Tagged(tagged) => collect_yaml(&tagged.value, out),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
