//! Royalty HTTP routes.
//!
//! - POST /upload - Ingest a platform royalty report (multipart/form-data)
//! - GET /records - List ingested records

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::time::Instant;
use tracing::{error, info, warn};

use super::metrics::{record_error, record_royalty_upload};
use super::response::ApiResponse;
use super::state::{GuardedIngestionPipeline, GuardedRoyaltyStore, ServerState};
use crate::royalty::{
    parse_reporting_month, IngestionError, IngestionReport, Platform, RoyaltyRecordFilter,
    RoyaltyUpload,
};

// =============================================================================
// Upload
// =============================================================================

fn processing_failure(cause: impl std::fmt::Display) -> ApiResponse {
    ApiResponse::error(
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        format!("An error occurred while processing the upload: {}", cause),
    )
}

fn report_response(report: &IngestionReport) -> ApiResponse {
    let mut response = ApiResponse::ok()
        .with_message(report.message())
        .with_field("processedCount", report.processed_count)
        .with_field("errorCount", report.error_count());
    if !report.errors.is_empty() {
        response = response.with_field("errors", &report.errors);
    }
    response
}

/// POST /upload - fields `platform`, `month` (YYYY-MM) and `file`
async fn upload_royalty_report(
    State(pipeline): State<GuardedIngestionPipeline>,
    mut multipart: Multipart,
) -> ApiResponse {
    let mut platform: Option<String> = None;
    let mut month: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read multipart upload: {}", e);
                return ApiResponse::error(e.status(), e.body_text());
            }
        };
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                match field.bytes().await {
                    Ok(data) => bytes = Some(data.to_vec()),
                    Err(e) => {
                        warn!("Failed to read file data: {}", e);
                        return ApiResponse::error(e.status(), e.body_text());
                    }
                }
            }
            "platform" | "month" => {
                let value = match field.text().await {
                    Ok(value) => value.trim().to_string(),
                    Err(e) => return ApiResponse::error(e.status(), e.body_text()),
                };
                if field_name == "platform" {
                    platform = Some(value);
                } else {
                    month = Some(value);
                }
            }
            _ => {}
        }
    }

    let upload = match RoyaltyUpload::from_fields(platform, month, file_name, bytes) {
        Ok(upload) => upload,
        Err(e) => {
            info!("Rejected royalty upload: {}", e);
            return ApiResponse::bad_request(e.to_string());
        }
    };

    let platform = upload.platform;
    let start = Instant::now();
    let result = tokio::task::spawn_blocking(move || pipeline.ingest(&upload)).await;
    let duration = start.elapsed();

    match result {
        Ok(Ok(report)) => {
            let outcome = if report.errors.is_empty() { "success" } else { "partial" };
            record_royalty_upload(
                platform.as_str(),
                outcome,
                report.processed_count,
                report.error_count(),
                duration,
            );
            report_response(&report)
        }
        Ok(Err(IngestionError::AllRowsFailed(errors))) => {
            record_royalty_upload(platform.as_str(), "rejected", 0, errors.len(), duration);
            ApiResponse::bad_request(IngestionError::AllRowsFailed(Vec::new()).to_string())
                .with_field("errors", errors)
        }
        Ok(Err(e)) if e.is_client_error() => {
            record_royalty_upload(platform.as_str(), "rejected", 0, 0, duration);
            ApiResponse::bad_request(e.to_string())
        }
        Ok(Err(e)) => {
            error!("Royalty upload for {} failed: {}", platform, e);
            record_royalty_upload(platform.as_str(), "error", 0, 0, duration);
            record_error("ingestion", "royalty_upload");
            processing_failure(e)
        }
        Err(join_error) => {
            error!("Royalty ingestion worker failed: {}", join_error);
            record_royalty_upload(platform.as_str(), "error", 0, 0, duration);
            record_error("worker", "royalty_upload");
            processing_failure(join_error)
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct RecordsQuery {
    pub platform: Option<String>,
    pub month: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl RecordsQuery {
    fn into_filter(self) -> Result<RoyaltyRecordFilter, String> {
        let platform = match self.platform.filter(|p| !p.is_empty()) {
            Some(p) => Some(
                Platform::parse(&p).ok_or_else(|| IngestionError::InvalidPlatform(p).to_string())?,
            ),
            None => None,
        };
        let date = match self.month.filter(|m| !m.is_empty()) {
            Some(m) => Some(
                parse_reporting_month(&m).ok_or_else(|| IngestionError::InvalidMonth(m).to_string())?,
            ),
            None => None,
        };
        let parse_count = |name: &str, value: Option<String>| match value {
            Some(v) => v
                .parse::<usize>()
                .map(Some)
                .map_err(|_| format!("Invalid {} '{}'", name, v)),
            None => Ok(None),
        };
        Ok(RoyaltyRecordFilter {
            platform,
            date,
            limit: parse_count("limit", self.limit)?,
            offset: parse_count("offset", self.offset)?,
        })
    }
}

/// GET /records?platform=&month=&limit=&offset=
async fn list_royalty_records(
    State(store): State<GuardedRoyaltyStore>,
    Query(query): Query<RecordsQuery>,
) -> ApiResponse {
    let filter = match query.into_filter() {
        Ok(filter) => filter,
        Err(message) => return ApiResponse::bad_request(message),
    };

    let result = tokio::task::spawn_blocking(move || {
        let total = store.count_records(&filter)?;
        let records = store.list_records(&filter)?;
        anyhow::Ok((total, records))
    })
    .await;

    match result {
        Ok(Ok((total, records))) => ApiResponse::ok()
            .with_data(records)
            .with_field("total", total),
        Ok(Err(e)) => ApiResponse::internal("Error listing royalty records", e),
        Err(e) => ApiResponse::internal("Royalty listing worker failed", e),
    }
}

pub fn royalty_routes(max_upload_size_bytes: usize) -> Router<ServerState> {
    let upload_route = Router::new()
        .route("/upload", post(upload_royalty_report))
        .layer(DefaultBodyLimit::max(max_upload_size_bytes));

    Router::new()
        .merge(upload_route)
        .route("/records", get(list_royalty_records))
}
