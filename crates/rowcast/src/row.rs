//! Row materialization: cell resolution, find-or-build, transforms and
//! after-build hooks.

use std::rc::Rc;

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;

use crate::config::{AfterBuild, IdentifierSpec};
use crate::model::ImportRecord;
use crate::schema::{Header, Transform};

/// A row's view of its own pipeline state, handed to after-build hooks.
///
/// Marking the row skipped here is the one sanctioned way a hook may
/// change control flow; everything else a hook does should go through the
/// model it receives.
pub struct RowControl<'a> {
    skip: bool,
    line_number: usize,
    csv_attributes: &'a IndexMap<String, String>,
}

impl RowControl<'_> {
    /// Exclude this row from persistence. It will be recorded in a
    /// skipped bucket, never a failed or successful one. Idempotent.
    pub fn skip(&mut self) {
        self.skip = true;
    }

    /// Whether the row is currently marked skipped.
    pub fn skipped(&self) -> bool {
        self.skip
    }

    /// The row's 1-based line number (the header is line 1).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The row's input-name → raw-cell map.
    pub fn csv_attributes(&self) -> &IndexMap<String, String> {
        self.csv_attributes
    }
}

/// One data record: its raw cells, the shared header, and the
/// materialized target model.
///
/// The model is memoized: repeated [`model`](Row::model) calls return the
/// same instance, and after-build hooks run exactly once.
pub struct Row<M> {
    header: Rc<Header<M>>,
    line_number: usize,
    cells: Vec<String>,
    identifier: IdentifierSpec<M>,
    after_build: Vec<AfterBuild<M>>,
    skip: bool,
    csv_attributes: OnceCell<IndexMap<String, String>>,
    model: Option<M>,
}

impl<M: ImportRecord> Row<M> {
    /// Create a row from its raw cells. `line_number` is 1-based with the
    /// header counted as line 1, so the first data row is line 2.
    pub fn new(
        header: Rc<Header<M>>,
        line_number: usize,
        cells: Vec<String>,
        identifier: IdentifierSpec<M>,
        after_build: Vec<AfterBuild<M>>,
    ) -> Self {
        Self {
            header,
            line_number,
            cells,
            identifier,
            after_build,
            skip: false,
            csv_attributes: OnceCell::new(),
            model: None,
        }
    }

    /// The header shared by all rows of this import.
    pub fn header(&self) -> &Header<M> {
        &self.header
    }

    /// The row's 1-based line number (the header is line 1).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Mark this row as excluded from persistence. Idempotent.
    pub fn skip(&mut self) {
        self.skip = true;
    }

    /// Whether this row is excluded from persistence.
    pub fn skipped(&self) -> bool {
        self.skip
    }

    /// The mapping from input column name to raw cell value, in input
    /// order. Blank cells are empty strings.
    pub fn csv_attributes(&self) -> &IndexMap<String, String> {
        self.csv_attributes.get_or_init(|| {
            self.header
                .column_names()
                .enumerate()
                .map(|(index, name)| {
                    let value = self.cells.get(index).cloned().unwrap_or_default();
                    (name.to_string(), value)
                })
                .collect()
        })
    }

    /// The model to be persisted.
    ///
    /// On first access: finds or builds the target record via the
    /// identifier specification, applies every column transform, then runs
    /// the after-build hooks in registration order. Later accesses return
    /// the same instance without re-running any of that.
    pub fn model(&mut self) -> &mut M {
        if self.model.is_none() {
            let model = self.materialize();
            self.model = Some(model);
        }
        match self.model.as_mut() {
            Some(model) => model,
            None => unreachable!("model materialized above"),
        }
    }

    /// The materialized model, if [`model`](Row::model) has run.
    pub fn built_model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    /// The model's validation errors, re-keyed by input column name where
    /// a column feeds the erroring attribute. Empty before the model is
    /// materialized.
    pub fn errors(&self) -> IndexMap<String, Vec<String>> {
        let mut errors: IndexMap<String, Vec<String>> = IndexMap::new();

        if let Some(model) = self.model.as_ref() {
            for (attribute, message) in model.validation_errors() {
                let key = self
                    .header
                    .column_name_for_attribute(&attribute)
                    .map(str::to_string)
                    .unwrap_or(attribute);
                errors.entry(key).or_default().push(message);
            }
        }

        errors
    }

    fn materialize(&mut self) -> M {
        let mut model = self.find_or_build();
        self.apply_columns(&mut model);

        let mut control = RowControl {
            skip: self.skip,
            line_number: self.line_number,
            csv_attributes: self.csv_attributes(),
        };
        for hook in &self.after_build {
            hook.call(&mut model, &mut control);
        }
        let skip = control.skip;
        self.skip = skip;

        model
    }

    fn find_or_build(&self) -> M {
        self.find_existing().unwrap_or_else(M::build)
    }

    /// Look up an existing record through the identifier specification,
    /// using a scratch instance to compute the identifying values.
    fn find_existing(&self) -> Option<M> {
        if matches!(self.identifier, IdentifierSpec::None) {
            return None;
        }

        let mut scratch = M::build();
        self.apply_columns(&mut scratch);

        let attributes = match &self.identifier {
            IdentifierSpec::Attributes(names) => names.clone(),
            IdentifierSpec::Derived(derive) => derive(&scratch),
            IdentifierSpec::None => return None,
        };
        if attributes.is_empty() {
            return None;
        }

        let criteria: Vec<(String, Option<String>)> = attributes
            .into_iter()
            .map(|name| {
                let value = scratch.attribute(&name);
                (name, value)
            })
            .collect();

        M::find_by(&criteria)
    }

    /// Apply every matched column's transform to the given model. Cell
    /// values are cloned per assignment, so a transform can never mutate a
    /// value shared with another row.
    fn apply_columns(&self, model: &mut M) {
        for column in self.header.columns() {
            let Some(definition) = column.definition() else {
                continue;
            };

            let value = self
                .csv_attributes()
                .get(column.name())
                .cloned()
                .unwrap_or_default();

            match definition.transform() {
                Transform::Identity => model.set_attribute(definition.target_attribute(), value),
                Transform::MapValue(map) => {
                    model.set_attribute(definition.target_attribute(), map(&value));
                }
                Transform::MutateModel(mutate) => mutate(&value, model),
                Transform::MutateModelWithColumn(mutate) => mutate(&value, model, column),
            }
        }
    }
}
