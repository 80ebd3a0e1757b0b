//! Spreadsheet rendering for report downloads.

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::types::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum DownloadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for DownloadFormat {
    type Error = DownloadError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(DownloadError::InvalidFormat(other.to_string())),
        }
    }
}

impl TryFrom<String> for DownloadFormat {
    type Error = DownloadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct DownloadFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download format: {0}")]
    InvalidFormat(String),
    #[error("failed to render csv")]
    CsvRender,
    #[error("failed to render xlsx")]
    XlsxRender,
}

/// Typed spreadsheet cell. Amounts become numeric cells in XLSX output.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCell {
    Text(String),
    Amount(Money),
    Date(NaiveDate),
    Empty,
}

impl ExportCell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn optional_date(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Empty, Self::Date)
    }

    fn csv_value(&self) -> String {
        match self {
            Self::Text(value) => escape_csv_cell(value),
            Self::Amount(amount) => amount.to_string(),
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
            Self::Empty => String::new(),
        }
    }
}

pub fn render_download_file(
    base_name: &str,
    format: DownloadFormat,
    headers: &[&str],
    rows: &[Vec<ExportCell>],
) -> Result<DownloadFile, DownloadError> {
    match format {
        DownloadFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            writer
                .write_record(headers)
                .map_err(|_| DownloadError::CsvRender)?;
            for row in rows {
                let values: Vec<String> = row.iter().map(ExportCell::csv_value).collect();
                writer
                    .write_record(&values)
                    .map_err(|_| DownloadError::CsvRender)?;
            }
            let bytes = writer.into_inner().map_err(|_| DownloadError::CsvRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.csv"),
                content_type: "text/csv; charset=utf-8",
                bytes,
            })
        }
        DownloadFormat::Xlsx => {
            let mut workbook = Workbook::new();
            let amount_format = Format::new().set_num_format("#,##0.00");
            let worksheet = workbook.add_worksheet();

            for (col_idx, header) in headers.iter().enumerate() {
                worksheet
                    .write_string(0, col_idx as u16, *header)
                    .map_err(|_| DownloadError::XlsxRender)?;
            }

            for (row_idx, row) in rows.iter().enumerate() {
                let sheet_row = (row_idx + 1) as u32;
                for (col_idx, cell) in row.iter().enumerate() {
                    let col = col_idx as u16;
                    let written = match cell {
                        ExportCell::Amount(amount) => worksheet
                            .write_number_with_format(
                                sheet_row,
                                col,
                                amount.cents() as f64 / 100.0,
                                &amount_format,
                            )
                            .map(|_| ()),
                        ExportCell::Text(value) => {
                            worksheet.write_string(sheet_row, col, value).map(|_| ())
                        }
                        ExportCell::Date(_) => worksheet
                            .write_string(sheet_row, col, cell.csv_value())
                            .map(|_| ()),
                        ExportCell::Empty => Ok(()),
                    };
                    written.map_err(|_| DownloadError::XlsxRender)?;
                }
            }

            let bytes = workbook
                .save_to_buffer()
                .map_err(|_| DownloadError::XlsxRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.xlsx"),
                content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                bytes,
            })
        }
    }
}

fn escape_csv_cell(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some('=' | '+' | '-' | '@') => format!("'{value}"),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_export_escapes_formula_prefixed_cells() {
        let file = render_download_file(
            "financial-records",
            DownloadFormat::Csv,
            &["description", "notes"],
            &[vec![
                ExportCell::text("=SUM(A1:A2)"),
                ExportCell::text("@cmd"),
            ]],
        )
        .expect("csv render should succeed");

        let csv_output = String::from_utf8(file.bytes).expect("csv output should be utf-8");
        assert!(csv_output.contains("'=SUM(A1:A2)"));
        assert!(csv_output.contains("'@cmd"));
        assert_eq!(file.file_name, "financial-records.csv");
    }

    #[test]
    fn csv_export_formats_amounts_and_dates() {
        let file = render_download_file(
            "financial-records",
            DownloadFormat::Csv,
            &["due", "amount", "paid"],
            &[vec![
                ExportCell::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
                ExportCell::Amount(Money::from_cents(123_456)),
                ExportCell::optional_date(None),
            ]],
        )
        .expect("csv render should succeed");

        let csv_output = String::from_utf8(file.bytes).expect("csv output should be utf-8");
        assert!(csv_output.contains("2025-03-01,1234.56,"));
    }

    #[test]
    fn xlsx_export_produces_a_workbook() {
        let file = render_download_file(
            "financial-records",
            DownloadFormat::Xlsx,
            &["amount"],
            &[vec![ExportCell::Amount(Money::from_cents(500))]],
        )
        .expect("xlsx render should succeed");
        assert!(file.bytes.starts_with(b"PK"));
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(DownloadFormat::try_from("pdf").is_err());
        assert_eq!(DownloadFormat::try_from(" XLSX ").unwrap(), DownloadFormat::Xlsx);
    }
}
