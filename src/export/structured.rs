use crate::domain::model::Record;
use crate::utils::error::Result;

/// Pretty-printed JSON array, records serialized exactly as scraped.
pub fn render_json(records: &[Record]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(records)?)
}
