use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

pub const LABELS_TABLE_V0: Table = Table {
    name: "labels",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("usertype", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_verified",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("state", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_labels_usertype", "usertype"),
        ("idx_labels_state", "state"),
    ],
};

/// `user_id` is not a foreign key: subscriptions may outlive their label and
/// are then left out of joined reports.
pub const SUBSCRIPTIONS_TABLE_V0: Table = Table {
    name: "subscriptions",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("user_id", &SqlType::Text, non_null = true),
        sqlite_column!("plan_id", &SqlType::Text, non_null = true),
        sqlite_column!("plan_name", &SqlType::Text, non_null = true),
        sqlite_column!("price", &SqlType::Real, non_null = true),
        sqlite_column!("status", &SqlType::Text, non_null = true),
        // YYYY-MM-DD
        sqlite_column!("start_date", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_subscriptions_user_id", "user_id"),
        ("idx_subscriptions_status", "status"),
        ("idx_subscriptions_start_date", "start_date"),
        ("idx_subscriptions_created_at", "created_at"),
    ],
};

pub const ANALYTICS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[LABELS_TABLE_V0, SUBSCRIPTIONS_TABLE_V0],
    migration: None,
}];
