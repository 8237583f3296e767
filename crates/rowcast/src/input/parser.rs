//! Delimited-text reader with delimiter detection and encoding handling.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::{ImportError, Result};

use super::source::{DataTable, SourceMetadata};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b',', b';', b'\t'];

/// Lines sampled when auto-detecting the delimiter.
const DETECTION_SAMPLE: usize = 10;

/// Windows line separators, including the doubled form some exports produce.
static LINE_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r\r?\n?").expect("valid line separator pattern"));

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Quote character.
    pub quote: u8,
    /// Source encoding label, e.g. "windows-1252" (None = UTF-8).
    /// Input is always decoded to UTF-8; invalid sequences are stripped.
    pub encoding: Option<String>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            encoding: None,
        }
    }
}

enum Source {
    Content(String),
    Path(PathBuf),
    Stream(Option<Box<dyn Read>>),
}

/// Reads, sanitizes and parses delimited input into a [`DataTable`].
///
/// Construction accepts raw text content, a readable byte stream, or a file
/// path. The input is parsed once and memoized; repeated calls to
/// [`header`](Reader::header) or [`rows`](Reader::rows) reuse the parse.
pub struct Reader {
    source: Source,
    config: ReaderConfig,
    bytes: Option<Vec<u8>>,
    table: Option<DataTable>,
    metadata: Option<SourceMetadata>,
}

impl Reader {
    /// Create a reader over in-memory text content.
    pub fn from_content(content: impl Into<String>) -> Self {
        Self::new(Source::Content(content.into()))
    }

    /// Create a reader over a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::new(Source::Path(path.as_ref().to_path_buf()))
    }

    /// Create a reader over a readable byte stream.
    pub fn from_stream(stream: impl Read + 'static) -> Self {
        Self::new(Source::Stream(Some(Box::new(stream))))
    }

    fn new(source: Source) -> Self {
        Self {
            source,
            config: ReaderConfig::default(),
            bytes: None,
            table: None,
            metadata: None,
        }
    }

    /// Replace the reader configuration.
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// The header as an ordered sequence of cell strings.
    pub fn header(&mut self) -> Result<&[String]> {
        Ok(&self.table()?.headers)
    }

    /// The data rows, each an ordered sequence of cell strings of the same
    /// width as the header. Blank cells are empty strings.
    pub fn rows(&mut self) -> Result<&[Vec<String>]> {
        Ok(&self.table()?.rows)
    }

    /// Metadata about the parsed input.
    pub fn metadata(&mut self) -> Result<&SourceMetadata> {
        self.table()?;
        match &self.metadata {
            Some(metadata) => Ok(metadata),
            None => unreachable!("metadata recorded alongside the parsed table"),
        }
    }

    fn table(&mut self) -> Result<&DataTable> {
        if self.table.is_none() {
            self.parse()?;
        }
        match &self.table {
            Some(table) => Ok(table),
            None => unreachable!("table cached by parse"),
        }
    }

    fn parse(&mut self) -> Result<()> {
        let config = self.config.clone();
        let path = match &self.source {
            Source::Path(path) => Some(path.clone()),
            _ => None,
        };

        let (hash, size_bytes, text) = {
            let bytes = self.read_bytes()?;
            let mut hasher = Sha256::new();
            hasher.update(bytes);
            let hash = format!("sha256:{:x}", hasher.finalize());
            let text = decode(bytes, config.encoding.as_deref())?;
            (hash, bytes.len() as u64, text)
        };

        let text = LINE_SEPARATORS.replace_all(&text, "\n").into_owned();

        let delimiter = match config.delimiter {
            Some(delimiter) => delimiter,
            None => detect_delimiter(&text, config.quote),
        };

        let table = parse_text(&text, delimiter, config.quote)?;

        self.metadata = Some(SourceMetadata {
            path,
            hash,
            size_bytes,
            format: format_name(delimiter),
            encoding: config.encoding.unwrap_or_else(|| "utf-8".to_string()),
            row_count: table.row_count(),
            column_count: table.column_count(),
            parsed_at: chrono::Utc::now(),
        });
        self.table = Some(table);

        Ok(())
    }

    fn read_bytes(&mut self) -> Result<&[u8]> {
        if self.bytes.is_none() {
            let bytes = match &mut self.source {
                Source::Content(text) => std::mem::take(text).into_bytes(),
                Source::Path(path) => fs::read(&path).map_err(|e| ImportError::Io {
                    path: path.clone(),
                    source: e,
                })?,
                Source::Stream(stream) => {
                    let mut stream = stream.take().ok_or_else(|| {
                        ImportError::EmptyData("input stream already consumed".to_string())
                    })?;
                    let mut buffer = Vec::new();
                    stream
                        .read_to_end(&mut buffer)
                        .map_err(ImportError::Read)?;
                    buffer
                }
            };
            self.bytes = Some(bytes);
        }
        match &self.bytes {
            Some(bytes) => Ok(bytes),
            None => unreachable!("bytes cached above"),
        }
    }
}

/// Decode raw bytes from the given encoding label into UTF-8.
///
/// Invalid byte sequences are stripped rather than carried through.
fn decode(bytes: &[u8], label: Option<&str>) -> Result<String> {
    let encoding = match label {
        Some(label) => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| ImportError::UnsupportedEncoding(label.to_string()))?,
        None => encoding_rs::UTF_8,
    };

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Ok(text.replace('\u{FFFD}', ""))
    } else {
        Ok(text.into_owned())
    }
}

/// Parse normalized text into a header row plus uniform-width data rows.
fn parse_text(text: &str, delimiter: u8, quote: u8) -> Result<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .quote(quote)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record?.iter().map(|cell| cell.trim().to_string()).collect(),
        None => return Err(ImportError::EmptyData("no header row found".to_string())),
    };
    if headers.is_empty() {
        return Err(ImportError::EmptyData("no columns found".to_string()));
    }

    let expected_cols = headers.len();
    let mut rows = Vec::new();

    for result in records {
        let record = result?;
        let mut row: Vec<String> = record.iter().map(|cell| cell.trim().to_string()).collect();

        // Pad short rows, truncate long ones
        while row.len() < expected_cols {
            row.push(String::new());
        }
        row.truncate(expected_cols);

        rows.push(row);
    }

    Ok(DataTable::new(headers, rows, delimiter))
}

/// Detect the delimiter by minimizing the per-line count variance over a
/// sample of lines. Ties go to the delimiter with the higher mean count.
fn detect_delimiter(text: &str, quote: u8) -> u8 {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(DETECTION_SAMPLE)
        .collect();

    let mut best = b',';
    let mut best_variance = f64::INFINITY;
    let mut best_mean = 0.0_f64;

    for &delimiter in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delimiter, quote))
            .collect();
        if counts.is_empty() {
            continue;
        }

        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
        if mean == 0.0 {
            continue;
        }

        let variance = counts
            .iter()
            .map(|&c| (c as f64 - mean).powi(2))
            .sum::<f64>()
            / counts.len() as f64;

        if variance < best_variance || (variance == best_variance && mean > best_mean) {
            best_variance = variance;
            best_mean = mean;
            best = delimiter;
        }
    }

    best
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8, quote: u8) -> usize {
    let delim_char = delimiter as char;
    let quote_char = quote as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            c if c == quote_char => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

fn format_name(delimiter: u8) -> String {
    match delimiter {
        b',' => "csv",
        b';' => "csv-semicolon",
        b'\t' => "tsv",
        _ => "delimited",
    }
    .to_string()
}
