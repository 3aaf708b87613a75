//! Test fixtures: spreadsheets and seeded databases
//!
//! Analytics data is seeded relative to the current date so that the
//! time-windowed reports always see it.

use super::constants::*;
use chrono::{Months, NaiveDate, Utc};
use royalty_dashboard_server::analytics::{AnalyticsStore, Label, Subscription};
use royalty_dashboard_server::support::{Reply, SupportStore, Ticket, SENDER_ADMIN, SENDER_USER};
use rust_xlsxwriter::Workbook;

/// A spreadsheet cell value
#[derive(Debug, Clone)]
pub enum Cell {
    Text(&'static str),
    Number(f64),
    Blank,
}

/// Builds an XLSX workbook whose first sheet holds `header` followed by `rows`
pub fn xlsx_bytes(header: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, name) in header.iter().enumerate() {
        sheet
            .write_string(0, c as u16, *name)
            .expect("Failed to write header");
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32 + 1, c as u16);
            match cell {
                Cell::Text(s) => {
                    sheet.write_string(r, c, *s).expect("Failed to write cell");
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n).expect("Failed to write cell");
                }
                Cell::Blank => {}
            }
        }
    }
    workbook
        .save_to_buffer()
        .expect("Failed to serialize workbook")
}

// ============================================================================
// Analytics
// ============================================================================

fn label(id: &str, usertype: &str, is_verified: bool, state: Option<&str>) -> Label {
    Label {
        id: id.to_string(),
        usertype: usertype.to_string(),
        is_verified,
        state: state.map(str::to_string),
        created_at: Utc::now().timestamp(),
    }
}

fn subscription(
    id: &str,
    user_id: &str,
    plan: &str,
    status: &str,
    start_date: NaiveDate,
    created_days_ago: i64,
) -> Subscription {
    Subscription {
        id: id.to_string(),
        user_id: user_id.to_string(),
        plan_id: format!("plan-{}", plan.to_lowercase()),
        plan_name: plan.to_string(),
        price: if plan == PLAN_PRO { 499.0 } else { 99.0 },
        status: status.to_string(),
        start_date,
        created_at: Utc::now().timestamp() - created_days_ago * 86_400,
    }
}

/// Start date `months` calendar months before today
pub fn months_ago(months: u32) -> NaiveDate {
    let today = Utc::now().date_naive();
    today
        .checked_sub_months(Months::new(months))
        .expect("Date out of range")
}

pub fn seed_analytics(store: &dyn AnalyticsStore) -> anyhow::Result<()> {
    store.insert_label(&label(LABEL_GOA_NORMAL, "normal", true, Some("Goa")))?;
    store.insert_label(&label(LABEL_GOA_SUPER, "super", false, Some("Goa")))?;
    store.insert_label(&label(LABEL_KERALA_NORMAL, "normal", true, Some("Kerala")))?;
    store.insert_label(&label(LABEL_NO_STATE, "super", false, None))?;

    let subscriptions = [
        subscription("sub-1", LABEL_GOA_NORMAL, PLAN_BASIC, "active", months_ago(0), 1),
        subscription("sub-2", LABEL_GOA_SUPER, PLAN_PRO, "active", months_ago(0), 2),
        subscription("sub-3", LABEL_KERALA_NORMAL, PLAN_PRO, "expired", months_ago(2), 10),
        // created outside the top plans window
        subscription("sub-4", LABEL_NO_STATE, PLAN_BASIC, "active", months_ago(4), 200),
        subscription("sub-5", LABEL_GOA_NORMAL, PLAN_PRO, "cancelled", months_ago(0), 5),
        // orphan: its label does not exist
        subscription("sub-6", "label-deleted", PLAN_BASIC, "active", months_ago(0), 3),
    ];
    for s in &subscriptions {
        store.insert_subscription(s)?;
    }
    Ok(())
}

// ============================================================================
// Support
// ============================================================================

fn ticket(id: &str, ticket_id: &str, status: &str, created_at: i64) -> Ticket {
    Ticket {
        id: id.to_string(),
        ticket_id: ticket_id.to_string(),
        subject: format!("Ticket {}", ticket_id),
        name: "Label Owner".to_string(),
        email: "owner@example.com".to_string(),
        message: "Royalties for March are missing".to_string(),
        status: status.to_string(),
        priority: Some("medium".to_string()),
        is_closed: status == "resolved",
        label_id: Some(LABEL_GOA_NORMAL.to_string()),
        created_at,
    }
}

fn reply(id: &str, support_id: &str, sender_type: &str, is_read: bool, created_at: i64) -> Reply {
    Reply {
        id: id.to_string(),
        support_id: support_id.to_string(),
        sender_type: sender_type.to_string(),
        message: format!("Message {}", id),
        is_read,
        created_at,
    }
}

pub fn seed_support(store: &dyn SupportStore) -> anyhow::Result<()> {
    store.insert_ticket(&ticket("t-1", TICKET_WITH_REPLIES, "pending", 1_000))?;
    store.insert_ticket(&ticket("t-2", TICKET_RESOLVED, "resolved", 3_000))?;
    store.insert_ticket(&ticket("t-3", TICKET_IN_PROGRESS, "in-progress", 2_000))?;
    store.insert_ticket(&ticket("t-4", "TCK-1004", "pending", 4_000))?;

    store.insert_reply(&reply("r-2", "t-1", SENDER_ADMIN, false, 1_200))?;
    store.insert_reply(&reply("r-1", "t-1", SENDER_USER, false, 1_100))?;
    store.insert_reply(&reply("r-3", "t-1", SENDER_USER, true, 1_300))?;
    Ok(())
}
