//! Query-time retrieval and answer orchestration

pub mod query;

pub use query::QueryEngine;
