//! Royalty record model.
//!
//! A record is produced from one spreadsheet row of a platform report. The
//! platform is a closed set and the optional `platform_data` payload always
//! belongs to the record's own platform.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "amazonmusic")]
    AmazonMusic,
    #[serde(rename = "appleMusic")]
    AppleMusic,
    #[serde(rename = "facebook")]
    Facebook,
    #[serde(rename = "ganna")]
    Ganna,
    #[serde(rename = "jiosavan")]
    JioSaavn,
    #[serde(rename = "spotify")]
    Spotify,
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "youtube")]
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::AmazonMusic,
        Platform::AppleMusic,
        Platform::Facebook,
        Platform::Ganna,
        Platform::JioSaavn,
        Platform::Spotify,
        Platform::TikTok,
        Platform::YouTube,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::AmazonMusic => "amazonmusic",
            Platform::AppleMusic => "appleMusic",
            Platform::Facebook => "facebook",
            Platform::Ganna => "ganna",
            Platform::JioSaavn => "jiosavan",
            Platform::Spotify => "spotify",
            Platform::TikTok => "tiktok",
            Platform::YouTube => "youtube",
        }
    }

    /// Exact, case-sensitive match on the wire spelling.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    /// Comma separated wire names, in declaration order.
    pub fn wire_names() -> String {
        Self::ALL
            .iter()
            .map(Platform::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether this platform's report carries a territory column.
    pub fn has_territory(&self) -> bool {
        !matches!(self, Platform::Ganna | Platform::JioSaavn)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares a closed string enumeration with its wire spellings.
macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(TrackQuality {
    HiRes => "HI_RES",
    Shuffle => "SHUFFLE",
    Station => "STATION",
    OnDemand => "ON_DEMAND",
});

wire_enum!(SpotifyFileName {
    Streaming => "Streaming",
    Discovery => "Discovery",
});

wire_enum!(TikTokContentType {
    Pgc => "PGC",
    Ugc => "UGC",
});

wire_enum!(YouTubeAssetType {
    SoundRecording => "Sound Recording",
    ArtTrack => "Art Track",
});

wire_enum!(YouTubeFileName {
    ContentId => "Content ID",
    YoutubeMusic => "Youtube Music",
});

wire_enum!(FacebookProduct {
    FbMusicSticker => "FB_MUSIC_STICKER",
    FbReels => "FB_REELS",
    FbUgc => "FB_UGC",
    FbProfile => "FB_PROFILE",
    IgMusicSticker => "IG_MUSIC_STICKER",
    IgReels => "IG_REELS",
    IgUgc => "IG_UGC",
    IgMusicOnProfile => "IG_MUSIC_ON_PROFILE",
    Crosspost => "CROSSPOST",
    Other => "OTHER",
});

/// Platform specific payload. Serialized as `{ "<platform>": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlatformData {
    #[serde(rename = "amazonmusic", rename_all = "camelCase")]
    AmazonMusic {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        track_quality: Option<TrackQuality>,
    },
    #[serde(rename = "facebook", rename_all = "camelCase")]
    Facebook { product: FacebookProduct },
    #[serde(rename = "spotify", rename_all = "camelCase")]
    Spotify {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        composer_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<SpotifyFileName>,
    },
    #[serde(rename = "tiktok", rename_all = "camelCase")]
    TikTok {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<TikTokContentType>,
    },
    #[serde(rename = "youtube", rename_all = "camelCase")]
    YouTube {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        asset_type: Option<YouTubeAssetType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        file_name: Option<YouTubeFileName>,
    },
}

impl PlatformData {
    pub fn platform(&self) -> Platform {
        match self {
            PlatformData::AmazonMusic { .. } => Platform::AmazonMusic,
            PlatformData::Facebook { .. } => Platform::Facebook,
            PlatformData::Spotify { .. } => Platform::Spotify,
            PlatformData::TikTok { .. } => Platform::TikTok,
            PlatformData::YouTube { .. } => Platform::YouTube,
        }
    }
}

/// Fields picked out of a sheet row by a platform mapper, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRoyalty {
    pub platform: Platform,
    pub isrc: Option<String>,
    pub song_name: Option<String>,
    pub artist_name: Option<String>,
    pub label: Option<String>,
    pub total_plays: Option<f64>,
    pub royalty: Option<f64>,
    pub country_code: Option<String>,
    pub platform_data: Option<PlatformData>,
}

impl MappedRoyalty {
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            isrc: None,
            song_name: None,
            artist_name: None,
            label: None,
            total_plays: None,
            royalty: None,
            country_code: None,
            platform_data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoyaltyRecord {
    pub id: String,
    pub platform: Platform,
    pub isrc: String,
    pub song_name: String,
    pub artist_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub total_plays: i64,
    pub royalty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_data: Option<PlatformData>,
    pub source_file: String,
    pub processed: bool,
    pub date: NaiveDate,
    pub created_at: i64,
}
