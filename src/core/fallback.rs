use crate::domain::model::Record;
use crate::domain::ports::Storage;
use crate::export::Exporter;
use crate::utils::error::Result;
use std::path::PathBuf;

pub const FALLBACK_TITLE: &str = "Fallback Cause List";

/// The demonstration row shown when nothing could be scraped.
pub fn fallback_records() -> Vec<Record> {
    vec![[
        ("serial", "1"),
        ("judge", "Hon. Judge A"),
        ("court", "Court 1"),
        ("case", "Case A vs B"),
    ]
    .into_iter()
    .collect()]
}

/// Writes `fallback_causelist_{date}.pdf` with a fixed record set.
pub struct FallbackProvider<S: Storage> {
    exporter: Exporter<S>,
}

impl<S: Storage> FallbackProvider<S> {
    pub fn new(exporter: Exporter<S>) -> Self {
        Self { exporter }
    }

    pub async fn fallback(&self, date: &str) -> Result<(PathBuf, Vec<Record>)> {
        let records = fallback_records();
        let file_name = format!("fallback_causelist_{}.pdf", date);
        let path = self
            .exporter
            .write_pdf(&records, &file_name, FALLBACK_TITLE)
            .await?;
        tracing::info!("📄 Fallback cause list written to {}", path.display());
        Ok((path, records))
    }
}
