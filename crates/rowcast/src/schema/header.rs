//! Header resolution: pairing input columns with column definitions.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::column::{Column, ColumnDefinition};

/// Invisible characters injected by some spreadsheet exports
/// (zero-width spaces, BOMs, control characters).
static NON_PRINTABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{C}").expect("valid non-printable pattern"));

/// The resolved pairing of all input columns to their (possibly absent)
/// column definitions for one import.
///
/// Input column names are sanitized (non-printable characters stripped)
/// before any comparison. For each input column the first definition, in
/// declaration order, whose match rule succeeds wins. Immutable once
/// constructed; one header is shared across all rows of an import.
pub struct Header<M> {
    column_definitions: Vec<ColumnDefinition<M>>,
    columns: Vec<Column<M>>,
    matched: Vec<bool>,
}

impl<M> Header<M> {
    /// Resolve the given input column names against the definitions.
    pub fn new(column_definitions: Vec<ColumnDefinition<M>>, column_names: Vec<String>) -> Self {
        let mut matched = vec![false; column_definitions.len()];

        let columns = column_names
            .into_iter()
            .map(|raw_name| {
                let name = NON_PRINTABLE.replace_all(&raw_name, "").into_owned();
                let index = column_definitions
                    .iter()
                    .position(|definition| definition.matches(&name));
                if let Some(index) = index {
                    matched[index] = true;
                }
                Column::new(name, index.map(|i| column_definitions[i].clone()))
            })
            .collect();

        Self {
            column_definitions,
            columns,
            matched,
        }
    }

    /// The resolved columns, in input order.
    pub fn columns(&self) -> &[Column<M>] {
        &self.columns
    }

    /// The sanitized input column names, in input order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name())
    }

    /// Valid iff no required column is missing. Extra columns and missing
    /// non-required columns never block validity.
    pub fn valid(&self) -> bool {
        self.missing_required_columns().is_empty()
    }

    /// Names of the definitions marked required.
    pub fn required_columns(&self) -> Vec<&str> {
        self.column_definitions
            .iter()
            .filter(|definition| definition.is_required())
            .map(|definition| definition.name())
            .collect()
    }

    /// Names of required definitions with no matching input column.
    pub fn missing_required_columns(&self) -> Vec<&str> {
        self.unmatched_definitions()
            .filter(|definition| definition.is_required())
            .map(|definition| definition.name())
            .collect()
    }

    /// Names of all definitions with no matching input column, required
    /// or not.
    pub fn missing_columns(&self) -> Vec<&str> {
        self.unmatched_definitions()
            .map(|definition| definition.name())
            .collect()
    }

    /// Input columns matching no definition.
    pub fn extra_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| column.definition().is_none())
            .map(|column| column.name())
            .collect()
    }

    /// The input column name feeding the given model attribute, if any
    /// matched column targets it.
    pub fn column_name_for_attribute(&self, attribute: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|column| {
                column
                    .definition()
                    .is_some_and(|definition| definition.target_attribute() == attribute)
            })
            .map(|column| column.name())
    }

    fn unmatched_definitions(&self) -> impl Iterator<Item = &ColumnDefinition<M>> {
        self.column_definitions
            .iter()
            .zip(&self.matched)
            .filter(|(_, matched)| !**matched)
            .map(|(definition, _)| definition)
    }
}

impl<M> fmt::Debug for Header<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("column_definitions", &self.column_definitions)
            .field("columns", &self.columns)
            .finish()
    }
}
