use crate::core::letters::full_number;
use crate::domain::model::{Letter, LetterFilter};
use crate::domain::ports::{LetterStore, Storage};
use crate::utils::error::{AppError, Result};
use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Nomor Surat")]
    pub nomor_surat: String,
    #[serde(rename = "Tanggal")]
    pub tanggal: String,
    #[serde(rename = "Jenis")]
    pub jenis: String,
    #[serde(rename = "Perihal")]
    pub perihal: String,
    #[serde(rename = "Tujuan")]
    pub tujuan: String,
    #[serde(rename = "Keterangan")]
    pub keterangan: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub file_name: String,
    pub rows: usize,
}

pub fn export_filename(today: NaiveDate) -> String {
    format!("surat-lpm-{}.csv", today.format("%Y-%m-%d"))
}

pub fn to_rows(letters: &[Letter], institution_code: &str) -> Result<Vec<ExportRow>> {
    letters
        .iter()
        .map(|letter| {
            Ok(ExportRow {
                nomor_surat: full_number(letter, institution_code)?,
                tanggal: letter.tanggal_surat.to_string(),
                jenis: letter.type_name().to_string(),
                perihal: letter.perihal.clone(),
                tujuan: letter.tujuan.clone(),
                keterangan: letter.keterangan.clone().unwrap_or_default(),
            })
        })
        .collect()
}

/// UTF-8 CSV with a header row; fields with a comma are quoted, no BOM.
pub fn write_csv(rows: &[ExportRow]) -> Result<Vec<u8>> {
    if rows.is_empty() {
        return Err(AppError::NothingToExport);
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());

    for row in rows {
        writer.serialize(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::IoError(e.into_error()))
}

pub struct CsvExporter<S: LetterStore, T: Storage> {
    store: S,
    storage: T,
    institution_code: String,
}

impl<S: LetterStore, T: Storage> CsvExporter<S, T> {
    pub fn new(store: S, storage: T, institution_code: impl Into<String>) -> Self {
        Self {
            store,
            storage,
            institution_code: institution_code.into(),
        }
    }

    pub async fn export(&self, filter: &LetterFilter, file_name: &str) -> Result<ExportSummary> {
        let letters = self.store.export_letters(filter).await?;
        tracing::debug!("Exporting {} letters", letters.len());

        let rows = to_rows(&letters, &self.institution_code)?;
        let data = write_csv(&rows)?;
        self.storage.write_file(file_name, &data).await?;

        tracing::info!("📁 Exported {} letters to {}", rows.len(), file_name);
        Ok(ExportSummary {
            file_name: file_name.to_string(),
            rows: rows.len(),
        })
    }
}
