pub mod document;
pub mod structured;
pub mod tabular;

use crate::domain::model::Record;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use document::{render_pdf, PdfLayout};
use std::path::PathBuf;

/// Paths of the files written for one record sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPaths {
    pub pdf: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub csv: Option<PathBuf>,
}

/// Writes the document, structured and tabular artifacts through a [`Storage`].
pub struct Exporter<S: Storage> {
    storage: S,
    layout: PdfLayout,
}

impl<S: Storage> Exporter<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            layout: PdfLayout::default(),
        }
    }

    pub async fn write_pdf(&self, records: &[Record], file_name: &str, title: &str) -> Result<PathBuf> {
        let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let pdf = render_pdf(records, title, &generated_at, &self.layout)?;
        tracing::debug!("Writing {} ({} pages)", file_name, pdf.pages);
        self.storage.write_file(file_name, &pdf.bytes).await?;
        Ok(self.storage.resolve(file_name))
    }

    /// Skipped for an empty sequence.
    pub async fn write_json(&self, records: &[Record], file_name: &str) -> Result<Option<PathBuf>> {
        if records.is_empty() {
            return Ok(None);
        }
        let data = structured::render_json(records)?;
        self.storage.write_file(file_name, &data).await?;
        Ok(Some(self.storage.resolve(file_name)))
    }

    /// Skipped for an empty sequence.
    pub async fn write_csv(&self, records: &[Record], file_name: &str) -> Result<Option<PathBuf>> {
        match tabular::render_csv(records)? {
            Some(data) => {
                self.storage.write_file(file_name, &data).await?;
                Ok(Some(self.storage.resolve(file_name)))
            }
            None => Ok(None),
        }
    }

    /// All three exports for `{stem}.pdf`, `{stem}.json` and `{stem}.csv`.
    pub async fn export_all(&self, records: &[Record], stem: &str, title: &str) -> Result<ExportPaths> {
        let pdf = self.write_pdf(records, &format!("{}.pdf", stem), title).await?;
        let json = self.write_json(records, &format!("{}.json", stem)).await?;
        let csv = self.write_csv(records, &format!("{}.csv", stem)).await?;

        tracing::info!(
            "📁 Exported {} records (pdf: yes, json: {}, csv: {})",
            records.len(),
            json.is_some(),
            csv.is_some()
        );

        Ok(ExportPaths {
            pdf: Some(pdf),
            json,
            csv,
        })
    }
}
