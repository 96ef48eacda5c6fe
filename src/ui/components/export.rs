use rfd::FileDialog;

use crate::domain::entities::record::Record;
use crate::domain::schema::columns::ColumnDescriptor;
use crate::infra::export::csv::{export_filename, export_rows_to_path, ExportSource};
use crate::usecase::ports::notifier::Notifier;

/// Asks for a destination and writes the rows currently shown.
pub fn save_csv(
    notifier: &dyn Notifier,
    source: ExportSource<'_>,
    columns: &[ColumnDescriptor],
    rows: &[Record],
) {
    if rows.is_empty() {
        notifier.info("No rows to export");
        return;
    }

    let Some(path) = FileDialog::new()
        .set_file_name(export_filename(source))
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };

    match export_rows_to_path(&path, columns, rows) {
        Ok(count) => notifier.success(&format!("Exported {count} rows")),
        Err(err) => {
            tracing::error!(error = %err, path = %path.display(), "csv export failed");
            notifier.error("Failed to export CSV");
        }
    }
}
