use crate::domain::model::{column_union, normalize, Record};
use crate::utils::error::{Result, ScrapeError};

/// Render `records` as CSV over the union of their columns.
///
/// Returns `None` for an empty sequence; nothing should be written then.
pub fn render_csv(records: &[Record]) -> Result<Option<Vec<u8>>> {
    if records.is_empty() {
        return Ok(None);
    }

    let columns = column_union(records);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;

    for row in normalize(records, &columns) {
        writer.write_record(row.iter().map(|(_, v)| v))?;
    }

    let data = writer
        .into_inner()
        .map_err(|e| ScrapeError::ProcessingError {
            message: format!("Failed to flush CSV buffer: {}", e),
        })?;
    Ok(Some(data))
}

/// Tab-separated console table of every record; empty for no records.
pub fn render_text_table(records: &[Record]) -> String {
    let columns = column_union(records);
    if columns.is_empty() {
        return String::new();
    }

    let mut out = columns.join("\t");
    out.push('\n');
    for row in normalize(records, &columns) {
        let cells: Vec<&str> = row.iter().map(|(_, v)| v).collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}
