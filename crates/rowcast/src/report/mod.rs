//! The aggregated, bucketed outcome of one import run.

mod message;
mod persistence;

use serde::{Deserialize, Serialize};

use crate::row::Row;
use crate::runner::{Operation, Outcome};

/// Lifecycle state of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The import has not started.
    Pending,
    /// Required columns are missing from the input header.
    InvalidHeader,
    /// The input could not be parsed at all.
    InvalidCsvFile,
    /// The runner is persisting rows.
    InProgress,
    /// The run finished (individual rows may still have failed).
    Done,
    /// The abort policy halted the run on a row failure.
    Aborted,
}

/// The report of one import run.
///
/// Built incrementally by the runner: each processed row lands in exactly
/// one of six buckets by its (create/update) × (success/failure/skip)
/// classification. Never mutated after the runner returns.
pub struct Report<M> {
    status: Status,
    missing_columns: Vec<String>,
    extra_columns: Vec<String>,
    parser_error: Option<String>,
    created_rows: Vec<Row<M>>,
    updated_rows: Vec<Row<M>>,
    failed_to_create_rows: Vec<Row<M>>,
    failed_to_update_rows: Vec<Row<M>>,
    create_skipped_rows: Vec<Row<M>>,
    update_skipped_rows: Vec<Row<M>>,
}

impl<M> Report<M> {
    /// An empty, pending report.
    pub fn new() -> Self {
        Self {
            status: Status::Pending,
            missing_columns: Vec::new(),
            extra_columns: Vec::new(),
            parser_error: None,
            created_rows: Vec::new(),
            updated_rows: Vec::new(),
            failed_to_create_rows: Vec::new(),
            failed_to_update_rows: Vec::new(),
            create_skipped_rows: Vec::new(),
            update_skipped_rows: Vec::new(),
        }
    }

    pub(crate) fn pending_with_extra(extra_columns: Vec<String>) -> Self {
        Self {
            extra_columns,
            ..Self::new()
        }
    }

    pub(crate) fn invalid_header(missing_columns: Vec<String>, extra_columns: Vec<String>) -> Self {
        Self {
            status: Status::InvalidHeader,
            missing_columns,
            extra_columns,
            ..Self::new()
        }
    }

    pub(crate) fn invalid_csv_file(parser_error: String) -> Self {
        Self {
            status: Status::InvalidCsvFile,
            parser_error: Some(parser_error),
            ..Self::new()
        }
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    /// Route a classified row into its bucket and return a reference to
    /// it.
    pub(crate) fn add(&mut self, operation: Operation, outcome: Outcome, row: Row<M>) -> &Row<M> {
        let bucket = match (operation, outcome) {
            (Operation::Create, Outcome::Success) => &mut self.created_rows,
            (Operation::Update, Outcome::Success) => &mut self.updated_rows,
            (Operation::Create, Outcome::Failure) => &mut self.failed_to_create_rows,
            (Operation::Update, Outcome::Failure) => &mut self.failed_to_update_rows,
            (Operation::Create, Outcome::Skip) => &mut self.create_skipped_rows,
            (Operation::Update, Outcome::Skip) => &mut self.update_skipped_rows,
        };
        bucket.push(row);
        &bucket[bucket.len() - 1]
    }

    /// Current lifecycle state.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Declared columns with no matching input column, recorded when the
    /// header was found invalid.
    pub fn missing_columns(&self) -> &[String] {
        &self.missing_columns
    }

    /// Input columns matching no declared column.
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// The parser's error text, when the input could not be parsed.
    pub fn parser_error(&self) -> Option<&str> {
        self.parser_error.as_deref()
    }

    /// Rows created successfully.
    pub fn created_rows(&self) -> &[Row<M>] {
        &self.created_rows
    }

    /// Rows updated successfully.
    pub fn updated_rows(&self) -> &[Row<M>] {
        &self.updated_rows
    }

    /// Rows that failed while creating a new record.
    pub fn failed_to_create_rows(&self) -> &[Row<M>] {
        &self.failed_to_create_rows
    }

    /// Rows that failed while updating an existing record.
    pub fn failed_to_update_rows(&self) -> &[Row<M>] {
        &self.failed_to_update_rows
    }

    /// Skipped rows that would have created a new record.
    pub fn create_skipped_rows(&self) -> &[Row<M>] {
        &self.create_skipped_rows
    }

    /// Skipped rows that would have updated an existing record.
    pub fn update_skipped_rows(&self) -> &[Row<M>] {
        &self.update_skipped_rows
    }

    /// Rows persisted successfully: created plus updated.
    pub fn valid_rows(&self) -> Vec<&Row<M>> {
        self.created_rows.iter().chain(&self.updated_rows).collect()
    }

    /// Rows that failed persistence: failed to create plus failed to
    /// update.
    pub fn invalid_rows(&self) -> Vec<&Row<M>> {
        self.failed_to_create_rows
            .iter()
            .chain(&self.failed_to_update_rows)
            .collect()
    }

    /// Valid plus invalid rows.
    pub fn all_rows(&self) -> Vec<&Row<M>> {
        let mut rows = self.valid_rows();
        rows.extend(self.invalid_rows());
        rows
    }

    /// Whether the run finished with no failed row.
    pub fn success(&self) -> bool {
        self.status == Status::Done && self.invalid_rows().is_empty()
    }

    /// A human-readable status message.
    pub fn message(&self) -> String {
        message::render(self)
    }

    /// A serializable snapshot of this report's state.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            status: self.status,
            missing_columns: self.missing_columns.clone(),
            extra_columns: self.extra_columns.clone(),
            parser_error: self.parser_error.clone(),
            created: self.created_rows.len(),
            updated: self.updated_rows.len(),
            failed_to_create: self.failed_to_create_rows.len(),
            failed_to_update: self.failed_to_update_rows.len(),
            create_skipped: self.create_skipped_rows.len(),
            update_skipped: self.update_skipped_rows.len(),
            message: self.message(),
        }
    }
}

impl<M> Default for Report<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable snapshot of a [`Report`]: status, column lists and bucket
/// counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub status: Status,
    pub missing_columns: Vec<String>,
    pub extra_columns: Vec<String>,
    pub parser_error: Option<String>,
    pub created: usize,
    pub updated: usize,
    pub failed_to_create: usize,
    pub failed_to_update: usize,
    pub create_skipped: usize,
    pub update_skipped: usize,
    pub message: String,
}
