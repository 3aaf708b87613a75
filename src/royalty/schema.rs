use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

pub const ROYALTY_RECORDS_TABLE_V0: Table = Table {
    name: "royalty_records",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("platform", &SqlType::Text, non_null = true),
        sqlite_column!("isrc", &SqlType::Text, non_null = true),
        sqlite_column!("song_name", &SqlType::Text, non_null = true),
        sqlite_column!("artist_name", &SqlType::Text, non_null = true),
        sqlite_column!("label", &SqlType::Text),
        sqlite_column!("total_plays", &SqlType::Integer, non_null = true),
        sqlite_column!("royalty", &SqlType::Real, non_null = true),
        sqlite_column!("country_code", &SqlType::Text),
        // JSON encoded PlatformData
        sqlite_column!("platform_data", &SqlType::Text),
        sqlite_column!("source_file", &SqlType::Text, non_null = true),
        sqlite_column!(
            "processed",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        // YYYY-MM-DD
        sqlite_column!("date", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_royalty_isrc", "isrc"),
        ("idx_royalty_artist_name", "artist_name"),
        ("idx_royalty_country_code", "country_code"),
        ("idx_royalty_date", "date"),
        ("idx_royalty_platform_date", "platform, date"),
        ("idx_royalty_artist_date", "artist_name, date"),
        ("idx_royalty_country_date", "country_code, date"),
    ],
};

pub const ROYALTY_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[ROYALTY_RECORDS_TABLE_V0],
    migration: None,
}];
