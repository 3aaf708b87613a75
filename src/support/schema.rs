use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, OnDelete, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP,
};

pub const SUPPORT_TICKETS_TABLE_V0: Table = Table {
    name: "support_tickets",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("ticket_id", &SqlType::Text, non_null = true),
        sqlite_column!("subject", &SqlType::Text, non_null = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("email", &SqlType::Text, non_null = true),
        sqlite_column!("message", &SqlType::Text, non_null = true),
        sqlite_column!("status", &SqlType::Text, non_null = true),
        sqlite_column!("priority", &SqlType::Text),
        sqlite_column!(
            "is_closed",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("label_id", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[
        ("idx_support_tickets_ticket_id", "ticket_id"),
        ("idx_support_tickets_status", "status"),
    ],
};

const REPLY_TICKET_FK: ForeignKey = ForeignKey {
    foreign_table: "support_tickets",
    foreign_column: "id",
    on_delete: OnDelete::Cascade,
};

pub const SUPPORT_REPLIES_TABLE_V0: Table = Table {
    name: "support_replies",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!(
            "support_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&REPLY_TICKET_FK)
        ),
        sqlite_column!("sender_type", &SqlType::Text, non_null = true),
        sqlite_column!("message", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_read",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_support_replies_support_id", "support_id, created_at")],
};

pub const SUPPORT_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[SUPPORT_TICKETS_TABLE_V0, SUPPORT_REPLIES_TABLE_V0],
    migration: None,
}];
