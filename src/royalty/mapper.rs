//! Per-platform column mapping.
//!
//! Every platform report shares `isrc`, `total` and `royality` columns; the
//! remaining column names differ per platform and are listed in
//! [`Platform::columns`].

use super::models::{
    MappedRoyalty, Platform, PlatformData, SpotifyFileName, TikTokContentType, TrackQuality,
    YouTubeAssetType, YouTubeFileName,
};
use super::normalize::map_facebook_product;
use super::sheet::SheetRow;
use super::validation::ValidationError;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

const ISRC_COLUMN: &str = "isrc";
const PLAYS_COLUMN: &str = "total";
const ROYALTY_COLUMN: &str = "royality";

lazy_static! {
    /// Comma grouped thousands, e.g. `1,250` or `12,000,000.5`.
    static ref THOUSANDS_GROUPED: Regex = Regex::new(r"^\d{1,3}(,\d{3})+(\.\d+)?$")
        .expect("Invalid thousands pattern");
}

/// Drops commas only when they separate thousands groups. Any other comma
/// is left in place so the value fails to parse.
fn strip_thousands_separators(s: &str) -> std::borrow::Cow<'_, str> {
    if THOUSANDS_GROUPED.is_match(s) {
        std::borrow::Cow::Owned(s.replace(',', ""))
    } else {
        std::borrow::Cow::Borrowed(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformColumns {
    pub song_name: &'static str,
    pub artist_name: &'static str,
    pub label: Option<&'static str>,
    pub country_code: Option<&'static str>,
}

impl Platform {
    pub fn columns(&self) -> PlatformColumns {
        let (song_name, artist_name, label, country_code) = match self {
            Platform::AmazonMusic => ("song_name", "artist_name", Some("label"), Some("territory_code")),
            Platform::AppleMusic => ("song_name", "item_artist", Some("label"), Some("vendor_identifier")),
            Platform::Facebook => ("song_name", "track_artist", Some("Sub_Label"), Some("country")),
            Platform::Ganna => ("song_name", "artist", Some("label"), None),
            Platform::JioSaavn => ("song_name", "artist_name", Some("label"), None),
            Platform::Spotify => ("song_name", "artist_name", None, Some("country")),
            Platform::TikTok => ("song_name", "artist", Some("label"), Some("territory")),
            Platform::YouTube => ("asset_title", "artist", Some("asset_labels"), Some("country")),
        };
        PlatformColumns {
            song_name,
            artist_name,
            label,
            country_code,
        }
    }

    /// Picks this platform's columns out of a sheet row.
    ///
    /// Only type coercion happens here; presence and range checks are left to
    /// [`super::validation::validate`].
    pub fn map_row(&self, row: &SheetRow) -> Result<MappedRoyalty, ValidationError> {
        let columns = self.columns();
        Ok(MappedRoyalty {
            platform: *self,
            isrc: text(row, ISRC_COLUMN),
            song_name: text(row, columns.song_name),
            artist_name: text(row, columns.artist_name),
            label: columns.label.and_then(|c| text(row, c)),
            total_plays: number(row, PLAYS_COLUMN, "totalPlays")?,
            royalty: number(row, ROYALTY_COLUMN, "royalty")?,
            country_code: columns.country_code.and_then(|c| text(row, c)),
            platform_data: self.platform_data(row)?,
        })
    }

    fn platform_data(&self, row: &SheetRow) -> Result<Option<PlatformData>, ValidationError> {
        let data = match self {
            Platform::AmazonMusic => PlatformData::AmazonMusic {
                track_quality: variant(
                    row,
                    "track_quality",
                    "platformData.amazonmusic.trackQuality",
                    TrackQuality::parse,
                )?,
            },
            Platform::Facebook => PlatformData::Facebook {
                product: map_facebook_product(text(row, "product").as_deref()),
            },
            Platform::Spotify => PlatformData::Spotify {
                composer_name: text(row, "composer_name"),
                file_name: variant(
                    row,
                    "file_name",
                    "platformData.spotify.fileName",
                    SpotifyFileName::parse,
                )?,
            },
            Platform::TikTok => PlatformData::TikTok {
                content_type: variant(
                    row,
                    "content_type",
                    "platformData.tiktok.contentType",
                    TikTokContentType::parse,
                )?,
            },
            Platform::YouTube => PlatformData::YouTube {
                asset_type: variant(
                    row,
                    "asset_type",
                    "platformData.youtube.assetType",
                    YouTubeAssetType::parse,
                )?,
                file_name: variant(
                    row,
                    "file_name",
                    "platformData.youtube.fileName",
                    YouTubeFileName::parse,
                )?,
            },
            Platform::AppleMusic | Platform::Ganna | Platform::JioSaavn => return Ok(None),
        };
        Ok(Some(data))
    }
}

/// Cell as trimmed text. Numbers and booleans are rendered, blanks are `None`.
fn text(row: &SheetRow, column: &str) -> Option<String> {
    let text = match row.get(column)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Cell as a number. Text cells are parsed, ignoring thousands separators.
fn number(
    row: &SheetRow,
    column: &str,
    field: &'static str,
) -> Result<Option<f64>, ValidationError> {
    match row.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            strip_thousands_separators(trimmed)
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Some)
                .ok_or_else(|| ValidationError::NotANumber {
                    field,
                    value: trimmed.to_string(),
                })
        }
        Some(other) => Err(ValidationError::NotANumber {
            field,
            value: other.to_string(),
        }),
    }
}

fn variant<T>(
    row: &SheetRow,
    column: &str,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, ValidationError> {
    match text(row, column) {
        None => Ok(None),
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or(ValidationError::InvalidVariant { field, value: raw }),
    }
}
