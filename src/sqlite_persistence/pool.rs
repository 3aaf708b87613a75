//! Connection handling shared by every SQLite-backed store.
//!
//! Each database gets one write connection plus a small pool of read-only
//! connections handed out round-robin. WAL journaling lets readers proceed
//! while an upload is being written.

use super::{VersionedSchema, BASE_DB_VERSION};
use anyhow::{bail, Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub read_pool_size: usize,
    pub busy_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

#[derive(Clone)]
pub struct SqlitePool {
    write_conn: Arc<Mutex<Connection>>,
    read_pool: Vec<Arc<Mutex<Connection>>>,
    read_index: Arc<AtomicUsize>,
}

/// Brings `conn` to the latest schema in `schemas`.
///
/// A database without tables gets the latest schema created directly. Otherwise
/// each pending migration runs in a single transaction and the result is
/// validated against the latest declaration.
pub fn migrate_if_needed(
    conn: &mut Connection,
    db_name: &str,
    schemas: &'static [VersionedSchema],
) -> Result<()> {
    let latest_version = schemas.len() - 1;
    let latest_schema = &schemas[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating {} db schema at version {}", db_name, latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "{} db has user_version {}, it was not created by this server",
            db_name,
            db_version
        );
    }
    let mut current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version > latest_version {
        bail!(
            "{} db is at version {}, newer than the supported version {}",
            db_name,
            current_version,
            latest_version
        );
    }

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in schemas.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating {} db from version {} to {}",
                    db_name, current_version, schema.version
                );
                migration_fn(&tx)?;
            }
            current_version = schema.version;
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest_schema
        .validate(conn)
        .with_context(|| format!("{} db schema validation failed", db_name))?;
    Ok(())
}

impl SqlitePool {
    pub fn open<P: AsRef<Path>>(
        db_path: P,
        db_name: &str,
        schemas: &'static [VersionedSchema],
        settings: PoolSettings,
    ) -> Result<Self> {
        let db_path = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open {} database at {:?}", db_name, db_path))?;
        write_conn.busy_timeout(settings.busy_timeout)?;
        write_conn.pragma_update(None, "foreign_keys", "ON")?;

        migrate_if_needed(&mut write_conn, db_name, schemas)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;

        let mut read_pool = Vec::with_capacity(settings.read_pool_size.max(1));
        for _ in 0..settings.read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.busy_timeout(settings.busy_timeout)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        info!(
            "Opened {} db at {:?} with {} read connections",
            db_name,
            db_path,
            read_pool.len()
        );

        Ok(Self {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Single in-memory connection serving both reads and writes.
    pub fn in_memory(db_name: &str, schemas: &'static [VersionedSchema]) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate_if_needed(&mut conn, db_name, schemas)?;
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self {
            write_conn: conn.clone(),
            read_pool: vec![conn],
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn write_conn(&self) -> Arc<Mutex<Connection>> {
        self.write_conn.clone()
    }

    pub fn read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }
}
