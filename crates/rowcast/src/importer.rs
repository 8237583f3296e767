//! The import façade: wires reader, header resolution, rows and runner
//! together and owns the report.

use std::io::Read;
use std::path::Path;
use std::rc::Rc;

use crate::config::Config;
use crate::error::Result;
use crate::input::{Reader, ReaderConfig};
use crate::model::ImportRecord;
use crate::report::{Report, Status};
use crate::row::Row;
use crate::runner::Runner;
use crate::schema::Header;

/// One import of one input against one configuration.
///
/// The importer owns its own copy of the configuration, the parsed input,
/// the resolved header and the report, so concurrent imports of different
/// inputs never share state. Structural input problems (unreadable file,
/// malformed data) never escape as errors from [`run`](Importer::run);
/// they become a [`Status::InvalidCsvFile`] report carrying the parser's
/// message.
pub struct Importer<M> {
    reader: Reader,
    config: Config<M>,
    header: Option<Rc<Header<M>>>,
    report: Report<M>,
}

impl<M: ImportRecord> Importer<M> {
    /// Import from in-memory text content.
    pub fn from_content(content: impl Into<String>, config: Config<M>) -> Self {
        Self::new(Reader::from_content(content), config)
    }

    /// Import from a file path.
    pub fn from_path(path: impl AsRef<Path>, config: Config<M>) -> Self {
        Self::new(Reader::from_path(path), config)
    }

    /// Import from a readable byte stream.
    pub fn from_stream(stream: impl Read + 'static, config: Config<M>) -> Self {
        Self::new(Reader::from_stream(stream), config)
    }

    fn new(reader: Reader, config: Config<M>) -> Self {
        Self {
            reader,
            config,
            header: None,
            report: Report::new(),
        }
    }

    /// Override the reader configuration (delimiter, quote character,
    /// source encoding).
    pub fn with_reader_config(mut self, reader_config: ReaderConfig) -> Self {
        self.reader = self.reader.with_config(reader_config);
        self
    }

    /// The configuration this import runs against.
    pub fn config(&self) -> &Config<M> {
        &self.config
    }

    /// The report as accumulated so far.
    pub fn report(&self) -> &Report<M> {
        &self.report
    }

    /// The resolved header for the input.
    pub fn header(&mut self) -> Result<&Rc<Header<M>>> {
        if self.header.is_none() {
            let column_names: Vec<String> = self.reader.header()?.to_vec();
            let header = Header::new(self.config.column_definitions().to_vec(), column_names);
            self.header = Some(Rc::new(header));
        }
        match self.header.as_ref() {
            Some(header) => Ok(header),
            None => unreachable!("header resolved above"),
        }
    }

    /// One row per data record, in input order, numbered from line 2.
    pub fn rows(&mut self) -> Result<Vec<Row<M>>> {
        let header = Rc::clone(self.header()?);
        let rows = self.reader.rows()?;

        Ok(rows
            .iter()
            .enumerate()
            .map(|(index, cells)| {
                Row::new(
                    Rc::clone(&header),
                    index + 2,
                    cells.clone(),
                    self.config.identifier_spec().clone(),
                    self.config.after_build_hooks().to_vec(),
                )
            })
            .collect())
    }

    /// Check and cache header validity.
    ///
    /// The first evaluation transitions the report to `Pending` (noting
    /// extra columns) or `InvalidHeader` (noting missing and extra
    /// columns). A malformed input stream instead sets
    /// `InvalidCsvFile` with the parser's error text.
    pub fn valid_header(&mut self) -> bool {
        if self.report.status() == Status::Pending {
            let resolution = match self.header() {
                Ok(header) => Ok((
                    header.valid(),
                    to_strings(header.missing_required_columns()),
                    to_strings(header.extra_columns()),
                )),
                Err(error) => Err(error.to_string()),
            };

            self.report = match resolution {
                Ok((true, _, extra)) => Report::pending_with_extra(extra),
                Ok((false, missing, extra)) => Report::invalid_header(missing, extra),
                Err(message) => Report::invalid_csv_file(message),
            };
        }

        self.header.as_ref().is_some_and(|header| header.valid())
    }

    /// Run the import and return the report.
    ///
    /// An invalid header returns the already-set report without invoking
    /// the runner; a malformed input surfacing during row materialization
    /// is converted to an `InvalidCsvFile` report rather than propagated.
    pub fn run(&mut self) -> &Report<M> {
        if self.valid_header() {
            match self.rows() {
                Ok(rows) => {
                    let report = std::mem::take(&mut self.report);
                    self.report = Runner::call(rows, &self.config, report);
                }
                Err(error) => {
                    self.report = Report::invalid_csv_file(error.to_string());
                }
            }
        }

        &self.report
    }
}

fn to_strings(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}
