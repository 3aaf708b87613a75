//! Royalty ingestion pipeline.
//!
//! One upload is a single sequential pass over the rows of the first sheet:
//! map, validate, persist. A failing row is recorded and the pass goes on.

use super::models::{Platform, RoyaltyRecord};
use super::sheet::{read_first_sheet, SheetError, SheetRow};
use super::store::RoyaltyStore;
use super::validation::{validate, RecordContext};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A failed row, with its 1-based spreadsheet row number and the raw row object.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("row {row}: {error}")]
pub struct RowError {
    pub row: usize,
    pub error: String,
    pub data: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Missing required fields: platform, month, or file")]
    MissingFields,

    #[error("Invalid platform. Must be one of: {}", Platform::wire_names())]
    InvalidPlatform(String),

    #[error("Invalid month '{0}'. Expected format YYYY-MM")]
    InvalidMonth(String),

    #[error("The uploaded sheet contains no data rows")]
    EmptySheet,

    #[error("All rows failed to process")]
    AllRowsFailed(Vec<RowError>),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IngestionError {
    /// Request validation problems and a fully failed batch are client errors;
    /// anything else is a server-side failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IngestionError::MissingFields
                | IngestionError::InvalidPlatform(_)
                | IngestionError::InvalidMonth(_)
                | IngestionError::EmptySheet
                | IngestionError::AllRowsFailed(_)
        )
    }
}

/// Parses `YYYY-MM` into the reporting date, fixed on the 15th.
pub fn parse_reporting_month(month: &str) -> Option<NaiveDate> {
    let (year, month_num) = month.trim().split_once('-')?;
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if year.len() != 4 || month_num.is_empty() || month_num.len() > 2 {
        return None;
    }
    if !all_digits(year) || !all_digits(month_num) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month_num: u32 = month_num.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month_num, 15)
}

/// A validated upload request.
#[derive(Debug, Clone)]
pub struct RoyaltyUpload {
    pub platform: Platform,
    pub date: NaiveDate,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl RoyaltyUpload {
    /// Checks the raw multipart fields. Missing fields are reported before the
    /// platform, and the platform before the month.
    pub fn from_fields(
        platform: Option<String>,
        month: Option<String>,
        file_name: Option<String>,
        bytes: Option<Vec<u8>>,
    ) -> Result<Self, IngestionError> {
        let (platform, month, bytes) = match (platform, month, bytes) {
            (Some(p), Some(m), Some(b)) if !p.is_empty() && !m.is_empty() && !b.is_empty() => {
                (p, m, b)
            }
            _ => return Err(IngestionError::MissingFields),
        };

        let platform =
            Platform::parse(&platform).ok_or(IngestionError::InvalidPlatform(platform))?;
        let date = parse_reporting_month(&month).ok_or(IngestionError::InvalidMonth(month))?;

        Ok(Self {
            platform,
            date,
            file_name: file_name.unwrap_or_default(),
            bytes,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestionReport {
    pub platform: Platform,
    pub processed_count: usize,
    pub errors: Vec<RowError>,
}

impl IngestionReport {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn message(&self) -> String {
        if self.errors.is_empty() {
            format!("Processed {} records successfully", self.processed_count)
        } else {
            format!(
                "Processed {} records successfully with {} errors",
                self.processed_count,
                self.errors.len()
            )
        }
    }
}

pub struct RoyaltyIngestionPipeline {
    store: Arc<dyn RoyaltyStore>,
}

impl RoyaltyIngestionPipeline {
    pub fn new(store: Arc<dyn RoyaltyStore>) -> Self {
        Self { store }
    }

    /// Runs a whole upload. Blocking: call from a blocking worker thread.
    pub fn ingest(&self, upload: &RoyaltyUpload) -> Result<IngestionReport, IngestionError> {
        let rows = read_first_sheet(&upload.bytes)?;
        if rows.is_empty() {
            return Err(IngestionError::EmptySheet);
        }

        info!(
            "Ingesting {} {} rows from '{}' for {}",
            rows.len(),
            upload.platform,
            upload.file_name,
            upload.date.format("%Y-%m")
        );

        let context = RecordContext {
            date: upload.date,
            source_file: &upload.file_name,
            created_at: chrono::Utc::now().timestamp(),
        };

        let (persisted, errors): (Vec<_>, Vec<_>) = rows
            .iter()
            .map(|row| self.ingest_row(upload.platform, row, &context))
            .partition(Result::is_ok);
        let processed_count = persisted.len();
        let errors: Vec<RowError> = errors.into_iter().filter_map(Result::err).collect();

        if processed_count == 0 {
            warn!(
                "All {} rows of '{}' failed to process",
                errors.len(),
                upload.file_name
            );
            return Err(IngestionError::AllRowsFailed(errors));
        }

        info!(
            "Ingested {} records from '{}' ({} errors)",
            processed_count,
            upload.file_name,
            errors.len()
        );
        Ok(IngestionReport {
            platform: upload.platform,
            processed_count,
            errors,
        })
    }

    fn ingest_row(
        &self,
        platform: Platform,
        row: &SheetRow,
        context: &RecordContext<'_>,
    ) -> Result<RoyaltyRecord, RowError> {
        let row_error = |error: String| RowError {
            row: row.row_number,
            error,
            data: row.values.clone(),
        };

        let mapped = platform.map_row(row).map_err(|e| row_error(e.to_string()))?;
        let record = validate(mapped, uuid::Uuid::new_v4().to_string(), context)
            .map_err(|e| row_error(e.to_string()))?;
        self.store.insert_record(&record).map_err(|e| {
            debug!("Failed to persist row {}: {:#}", row.row_number, e);
            row_error(e.to_string())
        })?;
        Ok(record)
    }
}
