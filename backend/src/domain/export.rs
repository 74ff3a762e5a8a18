//! CSV report export.
//!
//! The header row comes from the record's field names; the writer quotes a
//! field only when it contains a comma, quote, or newline, doubling any
//! embedded quotes. Filenames embed the export date.

use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use shared::{DisbursementRow, DonationRow};

use crate::error::DomainError;

/// A rendered export: CSV text plus the download filename.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub content: String,
    pub filename: String,
}

/// Serialize records into CSV with a header row.
pub fn write_csv<T: Serialize>(records: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("csv writer: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Debug, Serialize)]
struct DonationExportRecord {
    #[serde(rename = "Tanggal")]
    date: String,
    #[serde(rename = "Donatur")]
    donor: String,
    #[serde(rename = "Event")]
    event: String,
    #[serde(rename = "Tipe")]
    method: String,
    #[serde(rename = "Jumlah")]
    amount: i64,
    #[serde(rename = "Catatan")]
    notes: String,
}

#[derive(Debug, Serialize)]
struct DisbursementExportRecord {
    #[serde(rename = "Tanggal")]
    date: String,
    #[serde(rename = "Penerima")]
    recipient: String,
    #[serde(rename = "Event")]
    event: String,
    #[serde(rename = "Deskripsi")]
    description: String,
    #[serde(rename = "Kategori")]
    category: String,
    #[serde(rename = "Metode")]
    method: String,
    #[serde(rename = "Jumlah")]
    amount: i64,
    #[serde(rename = "Catatan")]
    notes: String,
}

#[derive(Clone, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Export the (already filtered) donation list. An empty list is a
    /// validation failure, mirroring the screens that refuse to download an
    /// empty report.
    pub fn donations(&self, rows: &[DonationRow]) -> Result<CsvExport> {
        if rows.is_empty() {
            return Err(anyhow!(DomainError::Validation(
                "no data to export".to_string()
            )));
        }

        let records: Vec<DonationExportRecord> = rows
            .iter()
            .map(|row| DonationExportRecord {
                date: row.donation.transaction_date.format("%d/%m/%Y").to_string(),
                donor: row
                    .donation
                    .donor_name
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
                event: row.event_name.clone().unwrap_or_else(|| "-".to_string()),
                method: row.donation.method.label(),
                amount: row.donation.amount.unwrap_or(0),
                notes: "-".to_string(),
            })
            .collect();

        let export = CsvExport {
            content: write_csv(&records)?,
            filename: format!("Laporan_Donasi_{}.csv", Utc::now().format("%Y-%m-%d")),
        };
        info!(
            "exported {} donations to {}",
            records.len(),
            export.filename
        );
        Ok(export)
    }

    pub fn disbursements(&self, rows: &[DisbursementRow]) -> Result<CsvExport> {
        if rows.is_empty() {
            return Err(anyhow!(DomainError::Validation(
                "no data to export".to_string()
            )));
        }

        let records: Vec<DisbursementExportRecord> = rows
            .iter()
            .map(|row| DisbursementExportRecord {
                date: row
                    .disbursement
                    .disbursement_date
                    .format("%d/%m/%Y")
                    .to_string(),
                recipient: row.disbursement.recipient.clone(),
                event: row.event_name.clone().unwrap_or_else(|| "-".to_string()),
                description: row.disbursement.description.clone(),
                category: row
                    .disbursement
                    .category
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
                method: row.disbursement.method.as_str().to_string(),
                amount: row.disbursement.amount.unwrap_or(0),
                notes: row
                    .disbursement
                    .notes
                    .clone()
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();

        let export = CsvExport {
            content: write_csv(&records)?,
            filename: format!("Laporan_Pengeluaran_{}.csv", Utc::now().format("%Y-%m-%d")),
        };
        info!(
            "exported {} disbursements to {}",
            records.len(),
            export.filename
        );
        Ok(export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::{Donation, PaymentMethod};

    #[test]
    fn fields_with_commas_are_quoted() {
        #[derive(Serialize)]
        struct Row {
            #[serde(rename = "Tanggal")]
            date: String,
            #[serde(rename = "Jumlah")]
            amount: String,
        }

        let csv = write_csv(&[Row {
            date: "2024-01-01".to_string(),
            amount: "1,000".to_string(),
        }])
        .unwrap();

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Tanggal,Jumlah"));
        assert_eq!(lines.next(), Some("2024-01-01,\"1,000\""));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        #[derive(Serialize)]
        struct Row {
            #[serde(rename = "Catatan")]
            notes: String,
        }

        let csv = write_csv(&[Row {
            notes: "kata \"penting\" di sini".to_string(),
        }])
        .unwrap();
        assert!(csv.contains("\"kata \"\"penting\"\" di sini\""));
    }

    #[test]
    fn donation_export_has_header_and_dated_filename() {
        let rows = vec![DonationRow {
            donation: Donation {
                id: "tx-1".to_string(),
                event_id: "ev-1".to_string(),
                donor_id: None,
                donor_name: Some("Budi".to_string()),
                amount: Some(50_000),
                method: PaymentMethod::Cash,
                transaction_date: Utc::now(),
                created_at: Utc::now(),
            },
            event_name: Some("Peduli Banjir".to_string()),
        }];

        let export = ExportService::new().donations(&rows).unwrap();
        assert!(export
            .content
            .starts_with("Tanggal,Donatur,Event,Tipe,Jumlah,Catatan"));
        assert!(export.content.contains("Budi,Peduli Banjir,Tunai,50000,-"));
        assert!(export.filename.starts_with("Laporan_Donasi_"));
        assert!(export.filename.ends_with(".csv"));
    }

    #[test]
    fn empty_export_is_refused() {
        let err = ExportService::new().donations(&[]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DomainError>(),
            Some(DomainError::Validation(_))
        ));
    }
}
