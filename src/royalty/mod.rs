//! Royalty report ingestion.
//!
//! Uploaded platform reports are read from their first sheet, mapped per
//! platform into [`RoyaltyRecord`]s and persisted row by row.

mod mapper;
mod models;
mod normalize;
mod pipeline;
mod schema;
mod sheet;
mod store;
mod validation;

pub use mapper::PlatformColumns;
pub use models::{
    FacebookProduct, MappedRoyalty, Platform, PlatformData, RoyaltyRecord, SpotifyFileName,
    TikTokContentType, TrackQuality, YouTubeAssetType, YouTubeFileName,
};
pub use normalize::map_facebook_product;
pub use pipeline::{
    parse_reporting_month, IngestionError, IngestionReport, RoyaltyIngestionPipeline,
    RoyaltyUpload, RowError,
};
pub use sheet::{read_first_sheet, SheetError, SheetRow};
pub use store::{RoyaltyRecordFilter, RoyaltyStore, SqliteRoyaltyStore, DEFAULT_LIST_LIMIT};
pub use validation::ValidationError;
