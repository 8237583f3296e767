//! Per-import configuration: column definitions, identifiers, policies
//! and hooks.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::row::RowControl;
use crate::schema::ColumnDefinition;

/// What to do when a row fails to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnInvalid {
    /// Record the failure and keep going.
    #[default]
    Skip,
    /// Record the failure and halt the entire run.
    Abort,
}

/// Storage transaction granularity for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionMode {
    /// No transaction scopes are opened.
    None,
    /// One transaction per row.
    EachRow,
    /// One transaction around the whole run.
    #[default]
    AllRows,
}

/// How existing records are found for update-vs-create decisions.
pub enum IdentifierSpec<M> {
    /// Never look up; every row builds a fresh record.
    None,
    /// Look up by equality on these attributes' current values.
    Attributes(Vec<String>),
    /// Derive the attribute list from the row's scratch record. An empty
    /// result skips the lookup.
    Derived(Rc<dyn Fn(&M) -> Vec<String>>),
}

impl<M> Clone for IdentifierSpec<M> {
    fn clone(&self) -> Self {
        match self {
            IdentifierSpec::None => IdentifierSpec::None,
            IdentifierSpec::Attributes(names) => IdentifierSpec::Attributes(names.clone()),
            IdentifierSpec::Derived(f) => IdentifierSpec::Derived(Rc::clone(f)),
        }
    }
}

impl<M> fmt::Debug for IdentifierSpec<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierSpec::None => f.write_str("None"),
            IdentifierSpec::Attributes(names) => f.debug_tuple("Attributes").field(names).finish(),
            IdentifierSpec::Derived(_) => f.write_str("Derived"),
        }
    }
}

/// Hook invoked once per row after its model is materialized.
///
/// Receives the model and the row's [`RowControl`], the one place a hook
/// may redirect pipeline control flow (by marking the row skipped).
pub struct AfterBuild<M>(Rc<dyn Fn(&mut M, &mut RowControl<'_>)>);

impl<M> AfterBuild<M> {
    pub fn new(hook: impl Fn(&mut M, &mut RowControl<'_>) + 'static) -> Self {
        Self(Rc::new(hook))
    }

    pub(crate) fn call(&self, model: &mut M, control: &mut RowControl<'_>) {
        (self.0)(model, control);
    }
}

impl<M> Clone for AfterBuild<M> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

/// Hook invoked once per row after the persistence attempt, in one of
/// three shapes chosen at registration time.
pub enum AfterSave<M> {
    /// Called with no arguments.
    NoArgs(Rc<dyn Fn()>),
    /// Called with the row's model.
    Model(Rc<dyn Fn(&M)>),
    /// Called with the row's model and its input-name → raw-cell map.
    ModelAndAttributes(Rc<dyn Fn(&M, &IndexMap<String, String>)>),
}

impl<M> Clone for AfterSave<M> {
    fn clone(&self) -> Self {
        match self {
            AfterSave::NoArgs(f) => AfterSave::NoArgs(Rc::clone(f)),
            AfterSave::Model(f) => AfterSave::Model(Rc::clone(f)),
            AfterSave::ModelAndAttributes(f) => AfterSave::ModelAndAttributes(Rc::clone(f)),
        }
    }
}

/// The declarative state of one importer: target column mapping,
/// identifier specification, invalid-row policy, hooks and transaction
/// granularity.
///
/// A config is an explicit value built by the host application and handed
/// to each [`Importer`](crate::Importer); every import instance owns its
/// own copy, so concurrent imports never share mutable state. A per-run
/// override is just a modified clone.
pub struct Config<M> {
    column_definitions: Vec<ColumnDefinition<M>>,
    identifier: IdentifierSpec<M>,
    when_invalid: OnInvalid,
    transaction: TransactionMode,
    after_build: Vec<AfterBuild<M>>,
    after_save: Vec<AfterSave<M>>,
}

impl<M> Config<M> {
    /// An empty configuration: no columns, no identifier, skip-on-invalid,
    /// whole-run transaction.
    pub fn new() -> Self {
        Self {
            column_definitions: Vec::new(),
            identifier: IdentifierSpec::None,
            when_invalid: OnInvalid::default(),
            transaction: TransactionMode::default(),
            after_build: Vec::new(),
            after_save: Vec::new(),
        }
    }

    /// Declare one mapped column. Declaration order is matching precedence
    /// order.
    pub fn column(mut self, definition: ColumnDefinition<M>) -> Self {
        self.column_definitions.push(definition);
        self
    }

    /// Find existing records by equality on these attributes.
    pub fn identifier<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier =
            IdentifierSpec::Attributes(attributes.into_iter().map(Into::into).collect());
        self
    }

    /// Derive the identifier attributes from each row's scratch record.
    pub fn identify_with(mut self, derive: impl Fn(&M) -> Vec<String> + 'static) -> Self {
        self.identifier = IdentifierSpec::Derived(Rc::new(derive));
        self
    }

    /// Set the invalid-row policy.
    pub fn when_invalid(mut self, policy: OnInvalid) -> Self {
        self.when_invalid = policy;
        self
    }

    /// Set the storage transaction granularity.
    pub fn transaction(mut self, mode: TransactionMode) -> Self {
        self.transaction = mode;
        self
    }

    /// Register a hook run once per row after its model is materialized.
    pub fn after_build(mut self, hook: impl Fn(&mut M, &mut RowControl<'_>) + 'static) -> Self {
        self.after_build.push(AfterBuild::new(hook));
        self
    }

    /// Register an after-save hook receiving the row's model.
    pub fn after_save(mut self, hook: impl Fn(&M) + 'static) -> Self {
        self.after_save.push(AfterSave::Model(Rc::new(hook)));
        self
    }

    /// Register an after-save hook taking no arguments.
    pub fn after_save_always(mut self, hook: impl Fn() + 'static) -> Self {
        self.after_save.push(AfterSave::NoArgs(Rc::new(hook)));
        self
    }

    /// Register an after-save hook receiving the model and the row's
    /// input-name → raw-cell map.
    pub fn after_save_with_attributes(
        mut self,
        hook: impl Fn(&M, &IndexMap<String, String>) + 'static,
    ) -> Self {
        self.after_save
            .push(AfterSave::ModelAndAttributes(Rc::new(hook)));
        self
    }

    /// The declared column definitions, in precedence order.
    pub fn column_definitions(&self) -> &[ColumnDefinition<M>] {
        &self.column_definitions
    }

    /// The identifier specification.
    pub fn identifier_spec(&self) -> &IdentifierSpec<M> {
        &self.identifier
    }

    /// The invalid-row policy.
    pub fn invalid_policy(&self) -> OnInvalid {
        self.when_invalid
    }

    /// The storage transaction granularity.
    pub fn transaction_mode(&self) -> TransactionMode {
        self.transaction
    }

    /// The registered after-build hooks, in registration order.
    pub fn after_build_hooks(&self) -> &[AfterBuild<M>] {
        &self.after_build
    }

    /// The registered after-save hooks, in registration order.
    pub fn after_save_hooks(&self) -> &[AfterSave<M>] {
        &self.after_save
    }
}

impl<M> Default for Config<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Config<M> {
    fn clone(&self) -> Self {
        Self {
            column_definitions: self.column_definitions.clone(),
            identifier: self.identifier.clone(),
            when_invalid: self.when_invalid,
            transaction: self.transaction,
            after_build: self.after_build.clone(),
            after_save: self.after_save.clone(),
        }
    }
}
