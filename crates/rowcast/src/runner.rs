//! Transactional batch persistence: persist every row, classify each
//! outcome, honor abort/skip policy, drive after-save hooks.

use crate::config::{AfterSave, Config, OnInvalid, TransactionMode};
use crate::model::ImportRecord;
use crate::report::{Report, Status};
use crate::row::Row;

/// Whether a row targets a new or an already-persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
}

/// What happened to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Persisted successfully.
    Success,
    /// Carried validation errors or failed to save.
    Failure,
    /// Excluded from persistence by its skip flag.
    Skip,
}

/// Internal control-flow signal raised when the abort policy halts the
/// run. Never surfaces to callers; always converted to
/// [`Status::Aborted`].
struct ImportAborted;

/// Iterates the materialized rows, persists each one and classifies it
/// into the report's buckets.
pub struct Runner<M> {
    rows: Vec<Row<M>>,
    when_invalid: OnInvalid,
    transaction: TransactionMode,
    after_save: Vec<AfterSave<M>>,
    report: Report<M>,
}

impl<M: ImportRecord> Runner<M> {
    /// Persist the rows' models and return the finished report.
    pub fn call(rows: Vec<Row<M>>, config: &Config<M>, report: Report<M>) -> Report<M> {
        Self {
            rows,
            when_invalid: config.invalid_policy(),
            transaction: config.transaction_mode(),
            after_save: config.after_save_hooks().to_vec(),
            report,
        }
        .run()
    }

    fn run(mut self) -> Report<M> {
        // An empty import always succeeds.
        if self.rows.is_empty() {
            self.report.set_status(Status::Done);
            return self.report;
        }

        self.report.set_status(Status::InProgress);

        let result = match self.transaction {
            TransactionMode::AllRows => M::transaction(|| self.persist_rows()),
            TransactionMode::EachRow | TransactionMode::None => self.persist_rows(),
        };

        match result {
            Ok(()) => self.report.set_status(Status::Done),
            Err(ImportAborted) => self.report.set_status(Status::Aborted),
        }

        self.report
    }

    fn persist_rows(&mut self) -> Result<(), ImportAborted> {
        for row in std::mem::take(&mut self.rows) {
            match self.transaction {
                TransactionMode::EachRow => M::transaction(|| self.persist_row(row))?,
                TransactionMode::AllRows | TransactionMode::None => self.persist_row(row)?,
            }
        }
        Ok(())
    }

    fn persist_row(&mut self, mut row: Row<M>) -> Result<(), ImportAborted> {
        // Materializing the model also runs after-build hooks, which may
        // set the skip flag; classify create-vs-update before saving
        // flips the persisted state.
        let operation = if row.model().persisted() {
            Operation::Update
        } else {
            Operation::Create
        };

        let outcome = if row.skipped() {
            Outcome::Skip
        } else if !row.errors().is_empty() {
            Outcome::Failure
        } else if row.model().save() {
            Outcome::Success
        } else {
            Outcome::Failure
        };

        let aborts = self.when_invalid == OnInvalid::Abort && outcome == Outcome::Failure;

        // Bucket placement happens before the abort check so the report
        // always reflects the triggering row.
        let row = self.report.add(operation, outcome, row);

        for hook in &self.after_save {
            match hook {
                AfterSave::NoArgs(hook) => hook(),
                AfterSave::Model(hook) => {
                    if let Some(model) = row.built_model() {
                        hook(model);
                    }
                }
                AfterSave::ModelAndAttributes(hook) => {
                    if let Some(model) = row.built_model() {
                        hook(model, row.csv_attributes());
                    }
                }
            }
        }

        if aborts {
            Err(ImportAborted)
        } else {
            Ok(())
        }
    }
}
