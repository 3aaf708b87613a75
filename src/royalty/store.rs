//! SQLite store for royalty records.

use super::models::{Platform, PlatformData, RoyaltyRecord};
use super::schema::ROYALTY_VERSIONED_SCHEMAS;
use crate::sqlite_persistence::{PoolSettings, SqlitePool};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, types::Type, OptionalExtension};
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 500;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoyaltyRecordFilter {
    pub platform: Option<Platform>,
    /// Reporting date, i.e. the 15th of the month.
    pub date: Option<NaiveDate>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub trait RoyaltyStore: Send + Sync {
    /// Persist a single record. Each call is its own write; no transaction spans records.
    fn insert_record(&self, record: &RoyaltyRecord) -> Result<()>;

    fn get_record(&self, id: &str) -> Result<Option<RoyaltyRecord>>;

    /// Newest reporting month first, insertion order within a month.
    fn list_records(&self, filter: &RoyaltyRecordFilter) -> Result<Vec<RoyaltyRecord>>;

    /// Number of records matching the filter, ignoring limit and offset.
    fn count_records(&self, filter: &RoyaltyRecordFilter) -> Result<usize>;
}

#[derive(Clone)]
pub struct SqliteRoyaltyStore {
    pool: SqlitePool,
}

impl SqliteRoyaltyStore {
    pub fn new<P: AsRef<Path>>(db_path: P, settings: PoolSettings) -> Result<Self> {
        Ok(Self {
            pool: SqlitePool::open(db_path, "royalty", ROYALTY_VERSIONED_SCHEMAS, settings)?,
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            pool: SqlitePool::in_memory("royalty", ROYALTY_VERSIONED_SCHEMAS)?,
        })
    }

    fn conversion_error(index: usize, message: String) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, message.into())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<RoyaltyRecord> {
        let platform_str: String = row.get("platform")?;
        let platform = Platform::parse(&platform_str).ok_or_else(|| {
            Self::conversion_error(1, format!("Unknown platform '{}'", platform_str))
        })?;

        let platform_data = match row.get::<_, Option<String>>("platform_data")? {
            Some(json) => Some(
                serde_json::from_str::<PlatformData>(&json)
                    .map_err(|e| Self::conversion_error(9, e.to_string()))?,
            ),
            None => None,
        };

        let date_str: String = row.get("date")?;
        let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
            .map_err(|e| Self::conversion_error(12, e.to_string()))?;

        Ok(RoyaltyRecord {
            id: row.get("id")?,
            platform,
            isrc: row.get("isrc")?,
            song_name: row.get("song_name")?,
            artist_name: row.get("artist_name")?,
            label: row.get("label")?,
            total_plays: row.get("total_plays")?,
            royalty: row.get("royalty")?,
            country_code: row.get("country_code")?,
            platform_data,
            source_file: row.get("source_file")?,
            processed: row.get::<_, i32>("processed")? != 0,
            date,
            created_at: row.get("created_at")?,
        })
    }

    fn where_clause(filter: &RoyaltyRecordFilter) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();
        if let Some(platform) = filter.platform {
            conditions.push("platform = ?");
            values.push(platform.as_str().to_string());
        }
        if let Some(date) = filter.date {
            conditions.push("date = ?");
            values.push(date.format(DATE_FORMAT).to_string());
        }
        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

impl RoyaltyStore for SqliteRoyaltyStore {
    fn insert_record(&self, record: &RoyaltyRecord) -> Result<()> {
        let platform_data = record
            .platform_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.pool.write_conn();
        let conn = conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO royalty_records (
                id, platform, isrc, song_name, artist_name, label, total_plays, royalty,
                country_code, platform_data, source_file, processed, date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                record.id,
                record.platform.as_str(),
                record.isrc,
                record.song_name,
                record.artist_name,
                record.label,
                record.total_plays,
                record.royalty,
                record.country_code,
                platform_data,
                record.source_file,
                record.processed as i32,
                record.date.format(DATE_FORMAT).to_string(),
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn get_record(&self, id: &str) -> Result<Option<RoyaltyRecord>> {
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        let record = conn
            .query_row(
                "SELECT * FROM royalty_records WHERE id = ?1",
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn list_records(&self, filter: &RoyaltyRecordFilter) -> Result<Vec<RoyaltyRecord>> {
        let (where_sql, values) = Self::where_clause(filter);
        let limit = filter
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .min(MAX_LIST_LIMIT);
        let offset = filter.offset.unwrap_or(0);

        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM royalty_records{} ORDER BY date DESC, rowid ASC LIMIT {} OFFSET {}",
            where_sql, limit, offset
        ))?;
        let records = stmt
            .query_map(params_from_iter(values.iter()), Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn count_records(&self, filter: &RoyaltyRecordFilter) -> Result<usize> {
        let (where_sql, values) = Self::where_clause(filter);
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM royalty_records{}", where_sql),
            params_from_iter(values.iter()),
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }
}
