//! Property-based tests for column matching, header resolution and
//! delimiter detection.
//!
//! These use proptest to generate random inputs and verify that the
//! matching and resolution invariants hold under all conditions.

use proptest::prelude::*;

use rowcast::{ColumnDefinition, Header, MatchQuery, Reader};

/// Matching and resolution never touch persistence, so a unit model will
/// do.
struct Blank;

// =============================================================================
// Test Strategies
// =============================================================================

/// Generate identifier-style names: lowercase words joined by underscores.
fn identifier() -> impl Strategy<Value = String> {
    "[a-z]{1,8}(_[a-z]{1,8}){0,3}"
}

/// Generate printable ASCII text.
fn ascii_text() -> impl Strategy<Value = String> {
    "[ -~]{1,40}"
}

/// Generate arbitrary unicode column names (edge cases).
fn unicode_name() -> impl Strategy<Value = String> {
    "\\PC{0,30}"
}

/// Respell an identifier the way a spreadsheet header might: underscores
/// become runs of spaces, and the whole name may be uppercased.
fn respell(ident: &str, spaces: usize, uppercase: bool) -> String {
    let spaced = ident.replace('_', &" ".repeat(spaces));
    if uppercase {
        spaced.to_uppercase()
    } else {
        spaced
    }
}

// =============================================================================
// Column matching properties
// =============================================================================

proptest! {
    /// Identifier matching is insensitive to casing and to the
    /// spaces-vs-underscores spelling of the name.
    #[test]
    fn ident_matching_survives_respelling(
        ident in identifier(),
        spaces in 1usize..4,
        uppercase in any::<bool>(),
    ) {
        let query = MatchQuery::ident(ident.clone());
        let respelled = respell(&ident, spaces, uppercase);
        prop_assert!(query.matches(&respelled));
        prop_assert!(query.matches(&ident));
    }

    /// A definition with no explicit query matches its own name under any
    /// respelling, and matching never mutates the outcome across calls.
    #[test]
    fn definition_name_matching_is_deterministic(
        ident in identifier(),
        spaces in 1usize..4,
        uppercase in any::<bool>(),
    ) {
        let definition: ColumnDefinition<Blank> = ColumnDefinition::new(ident.clone());
        let respelled = respell(&ident, spaces, uppercase);
        let first = definition.matches(&respelled);
        let second = definition.matches(&respelled);
        prop_assert!(first);
        prop_assert_eq!(first, second);
    }

    /// Text queries are case-insensitive over ASCII.
    #[test]
    fn text_matching_is_case_insensitive(text in ascii_text()) {
        let query = MatchQuery::text(text.clone());
        prop_assert!(query.matches(&text));
        prop_assert!(query.matches(&text.to_uppercase()));
        prop_assert!(query.matches(&text.to_lowercase()));
    }

    /// Matching never panics, whatever the column name looks like.
    #[test]
    fn matching_never_panics(ident in identifier(), name in unicode_name()) {
        let query = MatchQuery::ident(ident);
        let _ = query.matches(&name);
    }
}

// =============================================================================
// Header resolution properties
// =============================================================================

proptest! {
    /// A header is valid exactly when no required definition is
    /// unmatched, regardless of extra columns.
    #[test]
    fn validity_tracks_missing_required_columns(
        names in prop::collection::hash_set(identifier(), 1..6),
        // digit-prefixed so no extra can ever collide with a declared name
        extras in prop::collection::vec("9[a-z]{1,6}", 0..3),
        required in any::<bool>(),
        present in any::<bool>(),
    ) {
        let names: Vec<String> = names.into_iter().collect();

        let mut definitions: Vec<ColumnDefinition<Blank>> = Vec::new();
        for name in &names {
            let definition = ColumnDefinition::new(name.clone());
            definitions.push(if required { definition.required() } else { definition });
        }

        // input carries either all declared names or all but the first
        let mut input: Vec<String> = if present {
            names.clone()
        } else {
            names.iter().skip(1).cloned().collect()
        };
        input.extend(extras.iter().cloned());

        let header = Header::new(definitions, input);

        let expect_missing = !present;
        prop_assert_eq!(header.valid(), !(required && expect_missing));
        prop_assert_eq!(
            !header.missing_required_columns().is_empty(),
            required && expect_missing
        );
    }

    /// Every input column is either matched to a definition or reported
    /// as extra; nothing is dropped.
    #[test]
    fn columns_partition_into_matched_and_extra(
        names in prop::collection::hash_set(identifier(), 1..6),
        extras in prop::collection::vec("9[a-z]{1,6}", 0..4),
    ) {
        let names: Vec<String> = names.into_iter().collect();
        let definitions: Vec<ColumnDefinition<Blank>> = names
            .iter()
            .map(|name| ColumnDefinition::new(name.clone()))
            .collect();

        let mut input = names.clone();
        input.extend(extras.iter().cloned());

        let header = Header::new(definitions, input.clone());

        let matched = header
            .columns()
            .iter()
            .filter(|column| column.definition().is_some())
            .count();
        prop_assert_eq!(matched + header.extra_columns().len(), input.len());
    }
}

// =============================================================================
// Delimiter detection properties
// =============================================================================

proptest! {
    /// A uniform grid joined by any supported delimiter parses back to
    /// the same shape.
    #[test]
    fn detection_recovers_the_delimiter(
        delimiter in prop::sample::select(vec![',', ';', '\t']),
        columns in 2usize..6,
        rows in 1usize..5,
        cell in "[a-zA-Z0-9 ]{0,8}",
    ) {
        let mut content = String::new();
        for row in 0..=rows {
            let line: Vec<String> = (0..columns)
                .map(|col| {
                    if row == 0 {
                        format!("h{col}")
                    } else {
                        cell.clone()
                    }
                })
                .collect();
            content.push_str(&line.join(&delimiter.to_string()));
            content.push('\n');
        }

        let mut reader = Reader::from_content(content);
        let header = reader.header().expect("parses");
        prop_assert_eq!(header.len(), columns);
    }
}
