//! Column definitions and the matching rules that locate them in a header.

use std::fmt;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

static BRACKET_DATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*\[(.*)\]").expect("valid bracket pattern"));

/// How a column definition is located among the input columns.
///
/// Identifier and string queries are forgiving of casing and spacing, so
/// "First Name", "first_name" and "FIRST NAME" all find the same column.
/// Pattern queries match the original, non-normalized column name, giving
/// full control including accent- or punctuation-sensitive matches.
#[derive(Debug, Clone)]
pub enum MatchQuery {
    /// Equal iff the lowercased input name, with whitespace runs collapsed
    /// to single underscores, equals the identifier.
    Ident(String),
    /// Equal iff the lowercased input name equals the lowercased text
    /// (no whitespace normalization).
    Text(String),
    /// Equal iff the raw input name matches the pattern.
    Pattern(Regex),
    /// True iff any of the queries matches, evaluated in order.
    AnyOf(Vec<MatchQuery>),
}

impl MatchQuery {
    /// An identifier-style query, e.g. `ident("first_name")`.
    pub fn ident(name: impl Into<String>) -> Self {
        MatchQuery::Ident(name.into())
    }

    /// A literal-text query, e.g. `text("First Name")`.
    pub fn text(text: impl Into<String>) -> Self {
        MatchQuery::Text(text.into())
    }

    /// A regular-expression query over the raw column name.
    pub fn pattern(pattern: Regex) -> Self {
        MatchQuery::Pattern(pattern)
    }

    /// A query matching when any of the given queries matches.
    pub fn any_of(queries: impl IntoIterator<Item = MatchQuery>) -> Self {
        MatchQuery::AnyOf(queries.into_iter().collect())
    }

    /// Whether this query matches the given input column name.
    pub fn matches(&self, column_name: &str) -> bool {
        match self {
            MatchQuery::Ident(ident) => normalize_identifier(column_name) == *ident,
            MatchQuery::Text(text) => column_name.to_lowercase() == text.to_lowercase(),
            MatchQuery::Pattern(pattern) => pattern.is_match(column_name),
            MatchQuery::AnyOf(queries) => queries.iter().any(|query| query.matches(column_name)),
        }
    }
}

impl From<Regex> for MatchQuery {
    fn from(pattern: Regex) -> Self {
        MatchQuery::Pattern(pattern)
    }
}

/// Lowercase a column name and collapse whitespace runs to underscores for
/// identifier-style comparison.
fn normalize_identifier(column_name: &str) -> String {
    WHITESPACE_RUNS
        .replace_all(&column_name.to_lowercase(), "_")
        .into_owned()
}

/// How a cell value reaches the model.
///
/// The shape is fixed at definition construction, so each row applies its
/// transform without any runtime shape inspection.
pub enum Transform<M> {
    /// Assign the raw cell value to the target attribute.
    Identity,
    /// Compute a new value from the cell and assign it to the target
    /// attribute.
    MapValue(Rc<dyn Fn(&str) -> String>),
    /// Mutate the model directly from the cell value; no assignment is
    /// performed by the pipeline.
    MutateModel(Rc<dyn Fn(&str, &mut M)>),
    /// Like `MutateModel`, but also receives the matched column, for cases
    /// where the target attribute depends on the input column identity.
    MutateModelWithColumn(Rc<dyn Fn(&str, &mut M, &Column<M>)>),
}

impl<M> Clone for Transform<M> {
    fn clone(&self) -> Self {
        match self {
            Transform::Identity => Transform::Identity,
            Transform::MapValue(f) => Transform::MapValue(Rc::clone(f)),
            Transform::MutateModel(f) => Transform::MutateModel(Rc::clone(f)),
            Transform::MutateModelWithColumn(f) => Transform::MutateModelWithColumn(Rc::clone(f)),
        }
    }
}

impl<M> fmt::Debug for Transform<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Transform::Identity => "Identity",
            Transform::MapValue(_) => "MapValue",
            Transform::MutateModel(_) => "MutateModel",
            Transform::MutateModelWithColumn(_) => "MutateModelWithColumn",
        };
        f.write_str(name)
    }
}

/// Declares one target attribute and the rule used to find its column among
/// the input columns, plus an optional value transform and a required flag.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use rowcast::{ColumnDefinition, MatchQuery};
///
/// struct User {
///     email: Option<String>,
/// }
///
/// // the input column "email" feeds the `email` attribute
/// let _: ColumnDefinition<User> = ColumnDefinition::new("email");
///
/// // the input column matching /email/i feeds the `email` attribute
/// let _: ColumnDefinition<User> = ColumnDefinition::new("email")
///     .matched_by(Regex::new("(?i)email").unwrap().into());
///
/// // "First name" or "Prénom" feeds the `first_name` attribute
/// let _: ColumnDefinition<User> = ColumnDefinition::new("first_name")
///     .matched_by(MatchQuery::any_of([
///         MatchQuery::pattern(Regex::new("(?i)first ?name").unwrap()),
///         MatchQuery::pattern(Regex::new("(?i)pr(é|e)nom").unwrap()),
///     ]));
///
/// // the input column "first_name" feeds the `f_name` attribute
/// let _: ColumnDefinition<User> = ColumnDefinition::new("first_name").to_attribute("f_name");
///
/// // email is downcased on the way in
/// let _: ColumnDefinition<User> =
///     ColumnDefinition::new("email").map_value(|email| email.to_lowercase());
///
/// // `confirmed` drives a different attribute on the model
/// let _: ColumnDefinition<User> = ColumnDefinition::new("confirmed")
///     .mutate_model(|confirmed: &str, user: &mut User| {
///         if confirmed == "true" {
///             user.email = None;
///         }
///     });
/// ```
pub struct ColumnDefinition<M> {
    name: String,
    target: Option<String>,
    matcher: Option<MatchQuery>,
    transform: Transform<M>,
    required: bool,
}

impl<M> ColumnDefinition<M> {
    /// Create a definition whose column is matched by its name,
    /// identifier-style, and whose cell value is assigned as-is.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: None,
            matcher: None,
            transform: Transform::Identity,
            required: false,
        }
    }

    /// Assign the value to a different model attribute than the
    /// definition's name.
    pub fn to_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.target = Some(attribute.into());
        self
    }

    /// Override the matching rule. When set, the query fully replaces the
    /// name for matching purposes; the name remains the canonical
    /// identifier used for missing/required reporting.
    pub fn matched_by(mut self, query: MatchQuery) -> Self {
        self.matcher = Some(query);
        self
    }

    /// Mark this column as required for a valid header.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Transform the cell value before it is assigned to the target
    /// attribute.
    pub fn map_value(mut self, transform: impl Fn(&str) -> String + 'static) -> Self {
        self.transform = Transform::MapValue(Rc::new(transform));
        self
    }

    /// Let the transform mutate the model directly from the cell value.
    pub fn mutate_model(mut self, transform: impl Fn(&str, &mut M) + 'static) -> Self {
        self.transform = Transform::MutateModel(Rc::new(transform));
        self
    }

    /// Like [`mutate_model`](Self::mutate_model), but the transform also
    /// receives the matched column.
    pub fn mutate_model_with_column(
        mut self,
        transform: impl Fn(&str, &mut M, &Column<M>) + 'static,
    ) -> Self {
        self.transform = Transform::MutateModelWithColumn(Rc::new(transform));
        self
    }

    /// The canonical identifier of this definition.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The model attribute this column feeds: the `to_attribute` override
    /// when present, the definition name otherwise.
    pub fn target_attribute(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.name)
    }

    /// The transform applied to this column's cell values.
    pub fn transform(&self) -> &Transform<M> {
        &self.transform
    }

    /// Whether a matching input column is required for a valid header.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether this definition matches the given input column name. The
    /// `matched_by` query applies when present; otherwise the definition
    /// name is compared identifier-style.
    pub fn matches(&self, column_name: &str) -> bool {
        match &self.matcher {
            Some(query) => query.matches(column_name),
            None => normalize_identifier(column_name) == self.name,
        }
    }
}

impl<M> Clone for ColumnDefinition<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            target: self.target.clone(),
            matcher: self.matcher.clone(),
            transform: self.transform.clone(),
            required: self.required,
        }
    }
}

impl<M> fmt::Debug for ColumnDefinition<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDefinition")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("matcher", &self.matcher)
            .field("transform", &self.transform)
            .field("required", &self.required)
            .finish()
    }
}

/// A column from the input paired with the definition that matched it,
/// if any.
pub struct Column<M> {
    name: String,
    definition: Option<ColumnDefinition<M>>,
}

impl<M> Column<M> {
    pub(crate) fn new(name: String, definition: Option<ColumnDefinition<M>>) -> Self {
        Self { name, definition }
    }

    /// The sanitized input column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The definition that matched this column, if any.
    pub fn definition(&self) -> Option<&ColumnDefinition<M>> {
        self.definition.as_ref()
    }

    /// The bracket payload of a keyed column name, e.g. `"high"` for a
    /// column named `priority[high]`.
    pub fn keyed_data(&self) -> Option<&str> {
        BRACKET_DATA
            .captures(&self.name)
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str())
    }
}

impl<M> Clone for Column<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            definition: self.definition.clone(),
        }
    }
}

impl<M> fmt::Debug for Column<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("definition", &self.definition)
            .finish()
    }
}
