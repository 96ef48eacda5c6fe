use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::record::Record;
use crate::domain::schema::columns::ColumnDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSource<'a> {
    Collection(&'a str),
    GlobalSearch(&'a str),
}

pub fn export_filename(source: ExportSource<'_>) -> String {
    match source {
        ExportSource::Collection(collection) => format!("{collection}_export.csv"),
        ExportSource::GlobalSearch(term) => format!("global_search_{term}_export.csv"),
    }
}

/// Header labels, then each row's displayed cell text in column order.
pub fn write_rows<W: Write>(
    writer: W,
    columns: &[ColumnDescriptor],
    rows: &[Record],
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    writer
        .write_record(columns.iter().map(|column| column.header.as_str()))
        .context("failed to write csv header")?;

    for row in rows {
        writer
            .write_record(columns.iter().map(|column| column.cell_text(row)))
            .context("failed to write csv row")?;
    }

    writer.flush().context("failed to flush csv output")?;
    Ok(())
}

pub fn export_rows_to_path(
    path: &Path,
    columns: &[ColumnDescriptor],
    rows: &[Record],
) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create csv: {}", path.display()))?;
    write_rows(file, columns, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "exported csv");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::query::{FieldDefinition, FieldType};
    use crate::domain::schema::columns::build_columns;

    #[test]
    fn filenames_follow_source() {
        assert_eq!(
            export_filename(ExportSource::Collection("repositories")),
            "repositories_export.csv"
        );
        assert_eq!(
            export_filename(ExportSource::GlobalSearch("octo")),
            "global_search_octo_export.csv"
        );
    }

    #[test]
    fn writes_headers_and_formatted_cells() {
        let columns = build_columns(&[
            FieldDefinition::new("full_name", FieldType::String),
            FieldDefinition::new("private", FieldType::Boolean),
            FieldDefinition::new("topics", FieldType::Array),
        ]);
        let rows: Vec<Record> = serde_json::from_str(
            r#"[{"full_name":"octo/hello","private":false,"topics":["rust","cli"]}]"#,
        )
        .expect("fixture rows should decode");

        let mut output = Vec::new();
        write_rows(&mut output, &columns, &rows).expect("csv should be written");

        let text = String::from_utf8(output).expect("csv should be utf-8");
        assert_eq!(
            text,
            "Full Name,Private,Topics\nocto/hello,No,\"[\"\"rust\"\",\"\"cli\"\"]\"\n"
        );
    }
}
