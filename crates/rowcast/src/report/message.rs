//! Human-readable rendering of a report.

use super::{Report, Status};

/// Render the status message for the given report.
pub(super) fn render<M>(report: &Report<M>) -> String {
    match report.status() {
        Status::Pending => "Import hasn't started yet".to_string(),
        Status::InProgress => "Import in progress".to_string(),
        Status::Done => format!("Import completed: {}", import_details(report)),
        Status::InvalidHeader => format!(
            "The following columns are required: {}",
            report.missing_columns().join(", ")
        ),
        Status::InvalidCsvFile => report.parser_error().unwrap_or_default().to_string(),
        Status::Aborted => "Import aborted".to_string(),
    }
}

/// Comma-joined `"<count> <label>"` for every non-empty bucket, in
/// canonical bucket order. Generates something like:
/// `"3 created, 4 updated, 1 failed to create"`.
fn import_details<M>(report: &Report<M>) -> String {
    let buckets = [
        ("created", report.created_rows().len()),
        ("updated", report.updated_rows().len()),
        ("failed to create", report.failed_to_create_rows().len()),
        ("failed to update", report.failed_to_update_rows().len()),
        ("create skipped", report.create_skipped_rows().len()),
        ("update skipped", report.update_skipped_rows().len()),
    ];

    buckets
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(label, count)| format!("{count} {label}"))
        .collect::<Vec<_>>()
        .join(", ")
}
