//! Knowledge-directory ingestion: extraction, chunking, embedding, storage

mod chunker;
pub mod extractor;
mod pipeline;

pub use chunker::TextChunker;
pub use extractor::{Extractor, ExtractorRegistry, OcrConfig};
pub use pipeline::{IngestPipeline, IngestReport, SkippedFile};
