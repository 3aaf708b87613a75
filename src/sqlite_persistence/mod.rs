mod pool;
mod versioned_schema;

pub use pool::{
    migrate_if_needed, PoolSettings, SqlitePool, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_READ_POOL_SIZE,
};
pub use versioned_schema::*;
