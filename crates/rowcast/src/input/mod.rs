//! Tabular input: reading, sanitizing and parsing delimited data.

mod parser;
mod source;

pub use parser::{Reader, ReaderConfig};
pub use source::{DataTable, SourceMetadata};
