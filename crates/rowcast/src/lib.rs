//! Rowcast: declarative CSV-to-model import pipeline.
//!
//! Rowcast maps tabular input onto domain model instances and persists
//! them, producing a structured outcome report. Host applications declare
//! which input columns feed which model attributes, how columns are
//! located in the header, how existing records are found for
//! update-vs-create decisions, and what happens when rows fail.
//!
//! # Core Principles
//!
//! - **Declarative**: one [`Config`] value describes the whole mapping
//! - **Forgiving headers**: "First Name", "first_name" and "FIRST NAME"
//!   all find the same column
//! - **Everything in the report**: row failures are recorded, not thrown
//!
//! # Example
//!
//! ```
//! use rowcast::{ColumnDefinition, Config, ImportRecord, Importer};
//!
//! #[derive(Default)]
//! struct User {
//!     email: Option<String>,
//!     persisted: bool,
//! }
//!
//! impl ImportRecord for User {
//!     fn build() -> Self {
//!         User::default()
//!     }
//!     fn persisted(&self) -> bool {
//!         self.persisted
//!     }
//!     fn save(&mut self) -> bool {
//!         self.persisted = true;
//!         true
//!     }
//!     fn attribute(&self, name: &str) -> Option<String> {
//!         match name {
//!             "email" => self.email.clone(),
//!             _ => None,
//!         }
//!     }
//!     fn set_attribute(&mut self, name: &str, value: String) {
//!         if name == "email" {
//!             self.email = Some(value);
//!         }
//!     }
//!     fn find_by(_criteria: &[(String, Option<String>)]) -> Option<Self> {
//!         None
//!     }
//!     fn validation_errors(&self) -> Vec<(String, String)> {
//!         Vec::new()
//!     }
//! }
//!
//! let config = Config::new()
//!     .column(ColumnDefinition::new("email").required())
//!     .identifier(["email"]);
//!
//! let mut import = Importer::<User>::from_content("email\nbob@example.com\n", config);
//! let report = import.run();
//!
//! assert!(report.success());
//! assert_eq!(report.message(), "Import completed: 1 created");
//! ```

pub mod config;
pub mod error;
pub mod importer;
pub mod input;
pub mod model;
pub mod report;
pub mod row;
pub mod runner;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{AfterBuild, AfterSave, Config, IdentifierSpec, OnInvalid, TransactionMode};
pub use error::{ImportError, Result};
pub use importer::Importer;
pub use input::{DataTable, Reader, ReaderConfig, SourceMetadata};
pub use model::ImportRecord;
pub use report::{Report, ReportSummary, Status};
pub use row::{Row, RowControl};
pub use runner::{Operation, Outcome, Runner};
pub use schema::{Column, ColumnDefinition, Header, MatchQuery, Transform};
