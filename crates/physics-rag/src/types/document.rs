//! Source files, chunks and the points persisted to the vector store

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A knowledge file discovered during an ingestion run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Full path of the file
    pub path: PathBuf,
    /// File name, used as the payload `source`
    pub name: String,
    /// Lowercased extension including the dot (e.g. `.pdf`), empty if none
    pub extension: String,
}

impl SourceFile {
    /// Describe a file by its path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let extension = extension_key(&path);

        Self {
            path,
            name,
            extension,
        }
    }
}

/// Lowercased `.ext` of a path, or an empty string
pub fn extension_key(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// One chunk of a source file, the unit of embedding and retrieval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed chunk text, never empty
    pub text: String,
    /// Name of the source file
    pub source_name: String,
    /// Zero-based position within the source's chunk sequence
    pub index: usize,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(text: impl Into<String>, source_name: impl Into<String>, index: usize) -> Self {
        Self {
            text: text.into(),
            source_name: source_name.into(),
            index,
        }
    }
}

/// Metadata stored next to each vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPayload {
    /// Chunk text handed back at query time
    pub text: String,
    /// Source file name
    pub source: String,
    /// Chunk index within the source
    pub index: usize,
}

/// Durable unit written to the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Fresh identifier, one per chunk per run
    pub id: String,
    /// Embedding of the chunk text
    pub vector: Vec<f32>,
    /// Chunk metadata
    pub payload: PointPayload,
}

impl Point {
    /// Build a point for an embedded chunk under a newly generated id
    pub fn from_chunk(chunk: Chunk, vector: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            vector,
            payload: PointPayload {
                text: chunk.text,
                source: chunk.source_name,
                index: chunk.index,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_extension_is_lowercased() {
        let file = SourceFile::new("/kb/Lecture.DOCX");
        assert_eq!(file.name, "Lecture.DOCX");
        assert_eq!(file.extension, ".docx");

        let file = SourceFile::new("/kb/README");
        assert_eq!(file.extension, "");
    }

    #[test]
    fn test_points_get_distinct_ids() {
        let a = Point::from_chunk(Chunk::new("entropy", "a.txt", 0), vec![0.1, 0.2]);
        let b = Point::from_chunk(Chunk::new("entropy", "a.txt", 0), vec![0.1, 0.2]);

        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert_eq!(a.payload.source, "a.txt");
        assert_eq!(a.payload.index, 0);
    }

    #[test]
    fn test_point_serializes_like_qdrant_expects() {
        let point = Point::from_chunk(Chunk::new("heat", "t.txt", 2), vec![1.0]);
        let value = serde_json::to_value(&point).unwrap();

        assert_eq!(value["payload"]["text"], "heat");
        assert_eq!(value["payload"]["source"], "t.txt");
        assert_eq!(value["payload"]["index"], 2);
        assert_eq!(value["vector"][0], 1.0);
    }
}
