//! SQLite store for support tickets and their replies.

use super::models::{Reply, Ticket, TicketWithReplies, STATUS_FILTER_ALL};
use super::schema::SUPPORT_VERSIONED_SCHEMAS;
use crate::sqlite_persistence::{PoolSettings, SqlitePool};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub trait SupportStore: Send + Sync {
    fn insert_ticket(&self, ticket: &Ticket) -> Result<()>;

    fn insert_reply(&self, reply: &Reply) -> Result<()>;

    /// Tickets ordered by status rank, newest first within a status.
    /// `None` or `"all"` lists every ticket.
    fn list_tickets(&self, status: Option<&str>) -> Result<Vec<Ticket>>;

    /// Lookup by public ticket id.
    fn find_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>>;

    /// Replies to a ticket, oldest first.
    fn replies_for(&self, support_id: &str) -> Result<Vec<Reply>>;

    fn list_tickets_with_replies(&self, status: Option<&str>) -> Result<Vec<TicketWithReplies>> {
        self.list_tickets(status)?
            .into_iter()
            .map(|ticket| {
                let replies = self.replies_for(&ticket.id)?;
                Ok(TicketWithReplies::new(ticket, replies))
            })
            .collect()
    }
}

#[derive(Clone)]
pub struct SqliteSupportStore {
    pool: SqlitePool,
}

const TICKET_COLUMNS: &str =
    "id, ticket_id, subject, name, email, message, status, priority, is_closed, label_id, created_at";

impl SqliteSupportStore {
    pub fn new<P: AsRef<Path>>(db_path: P, settings: PoolSettings) -> Result<Self> {
        Ok(Self {
            pool: SqlitePool::open(db_path, "support", SUPPORT_VERSIONED_SCHEMAS, settings)?,
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            pool: SqlitePool::in_memory("support", SUPPORT_VERSIONED_SCHEMAS)?,
        })
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        Ok(Ticket {
            id: row.get("id")?,
            ticket_id: row.get("ticket_id")?,
            subject: row.get("subject")?,
            name: row.get("name")?,
            email: row.get("email")?,
            message: row.get("message")?,
            status: row.get("status")?,
            priority: row.get("priority")?,
            is_closed: row.get::<_, i32>("is_closed")? != 0,
            label_id: row.get("label_id")?,
            created_at: row.get("created_at")?,
        })
    }

    fn query_tickets(conn: &Connection, status: Option<&str>) -> Result<Vec<Ticket>> {
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {}
            FROM support_tickets
            WHERE ?1 IS NULL OR status = ?1
            ORDER BY
                CASE status
                    WHEN 'pending' THEN 1
                    WHEN 'in-progress' THEN 2
                    WHEN 'resolved' THEN 3
                    ELSE 4
                END,
                created_at DESC
            "#,
            TICKET_COLUMNS
        ))?;
        let tickets = stmt
            .query_map(params![status], Self::row_to_ticket)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tickets)
    }
}

impl SupportStore for SqliteSupportStore {
    fn insert_ticket(&self, ticket: &Ticket) -> Result<()> {
        let conn = self.pool.write_conn();
        let conn = conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO support_tickets ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                TICKET_COLUMNS
            ),
            params![
                ticket.id,
                ticket.ticket_id,
                ticket.subject,
                ticket.name,
                ticket.email,
                ticket.message,
                ticket.status,
                ticket.priority,
                ticket.is_closed as i32,
                ticket.label_id,
                ticket.created_at,
            ],
        )?;
        Ok(())
    }

    fn insert_reply(&self, reply: &Reply) -> Result<()> {
        let conn = self.pool.write_conn();
        let conn = conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO support_replies (id, support_id, sender_type, message, is_read, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                reply.id,
                reply.support_id,
                reply.sender_type,
                reply.message,
                reply.is_read as i32,
                reply.created_at,
            ],
        )?;
        Ok(())
    }

    fn list_tickets(&self, status: Option<&str>) -> Result<Vec<Ticket>> {
        let status = status.filter(|s| *s != STATUS_FILTER_ALL);
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        Self::query_tickets(&conn, status)
    }

    fn find_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>> {
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        let ticket = conn
            .query_row(
                &format!(
                    "SELECT {} FROM support_tickets WHERE ticket_id = ?1 LIMIT 1",
                    TICKET_COLUMNS
                ),
                params![ticket_id],
                Self::row_to_ticket,
            )
            .optional()?;
        Ok(ticket)
    }

    fn replies_for(&self, support_id: &str) -> Result<Vec<Reply>> {
        let conn = self.pool.read_conn();
        let conn = conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, support_id, sender_type, message, is_read, created_at
            FROM support_replies
            WHERE support_id = ?1
            ORDER BY created_at ASC, rowid ASC
            "#,
        )?;
        let replies = stmt
            .query_map(params![support_id], |r| {
                Ok(Reply {
                    id: r.get(0)?,
                    support_id: r.get(1)?,
                    sender_type: r.get(2)?,
                    message: r.get(3)?,
                    is_read: r.get::<_, i32>(4)? != 0,
                    created_at: r.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(replies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::models::{SENDER_ADMIN, SENDER_USER};

    fn ticket(id: &str, status: &str, created_at: i64) -> Ticket {
        Ticket {
            id: id.to_string(),
            ticket_id: format!("TCK-{}", id),
            subject: "Missing royalties".to_string(),
            name: "Label Owner".to_string(),
            email: "owner@example.com".to_string(),
            message: "March report is empty".to_string(),
            status: status.to_string(),
            priority: Some("high".to_string()),
            is_closed: false,
            label_id: Some("label-1".to_string()),
            created_at,
        }
    }

    fn reply(id: &str, support_id: &str, sender: &str, is_read: bool, created_at: i64) -> Reply {
        Reply {
            id: id.to_string(),
            support_id: support_id.to_string(),
            sender_type: sender.to_string(),
            message: format!("reply {}", id),
            is_read,
            created_at,
        }
    }

    fn seeded() -> SqliteSupportStore {
        let store = SqliteSupportStore::in_memory().unwrap();
        store.insert_ticket(&ticket("1", "resolved", 100)).unwrap();
        store.insert_ticket(&ticket("2", "pending", 50)).unwrap();
        store.insert_ticket(&ticket("3", "escalated", 500)).unwrap();
        store.insert_ticket(&ticket("4", "pending", 200)).unwrap();
        store.insert_ticket(&ticket("5", "in-progress", 10)).unwrap();

        store.insert_reply(&reply("r2", "4", SENDER_ADMIN, false, 300)).unwrap();
        store.insert_reply(&reply("r1", "4", SENDER_USER, false, 250)).unwrap();
        store.insert_reply(&reply("r3", "4", SENDER_USER, true, 400)).unwrap();
        store
    }

    #[test]
    fn lists_by_status_rank_then_newest() {
        let store = seeded();
        let ids: Vec<String> = store
            .list_tickets(None)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["4", "2", "5", "1", "3"]);
    }

    #[test]
    fn all_status_is_no_filter() {
        let store = seeded();
        assert_eq!(store.list_tickets(Some("all")).unwrap().len(), 5);

        let pending = store.list_tickets(Some("pending")).unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|t| t.status == "pending"));

        assert!(store.list_tickets(Some("nope")).unwrap().is_empty());
    }

    #[test]
    fn replies_are_oldest_first() {
        let store = seeded();
        let replies = store.replies_for("4").unwrap();
        let ids: Vec<&str> = replies.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
        assert!(store.replies_for("1").unwrap().is_empty());
    }

    #[test]
    fn tickets_with_replies_carry_counts() {
        let store = seeded();
        let tickets = store.list_tickets_with_replies(Some("pending")).unwrap();
        assert_eq!(tickets[0].ticket.id, "4");
        assert_eq!(tickets[0].reply_count, 3);
        assert_eq!(tickets[0].unread_replies, 1);
        assert_eq!(tickets[1].reply_count, 0);
    }

    #[test]
    fn finds_ticket_by_public_id() {
        let store = seeded();
        let found = store.find_ticket("TCK-3").unwrap().unwrap();
        assert_eq!(found.id, "3");
        assert_eq!(found.priority.as_deref(), Some("high"));
        assert!(store.find_ticket("3").unwrap().is_none());
    }

    #[test]
    fn reply_requires_existing_ticket() {
        let store = seeded();
        assert!(store
            .insert_reply(&reply("rx", "missing", SENDER_USER, false, 1))
            .is_err());
    }
}
