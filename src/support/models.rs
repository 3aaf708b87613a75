use serde::{Deserialize, Serialize};

pub const STATUS_FILTER_ALL: &str = "all";
pub const SENDER_USER: &str = "user";
pub const SENDER_ADMIN: &str = "admin";

/// Listing position of a ticket status. Unknown statuses sort last.
pub fn status_rank(status: &str) -> u8 {
    match status {
        "pending" => 1,
        "in-progress" => 2,
        "resolved" => 3,
        _ => 4,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id")]
    pub id: String,
    /// Public identifier shown to the label.
    pub ticket_id: String,
    pub subject: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub status: String,
    pub priority: Option<String>,
    pub is_closed: bool,
    pub label_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(rename = "_id")]
    pub id: String,
    /// Internal id of the [`Ticket`] replied to.
    pub support_id: String,
    pub sender_type: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: i64,
}

impl Reply {
    pub fn is_unread_from_user(&self) -> bool {
        self.sender_type == SENDER_USER && !self.is_read
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketWithReplies {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub replies: Vec<Reply>,
    pub reply_count: usize,
    pub unread_replies: usize,
}

impl TicketWithReplies {
    pub fn new(ticket: Ticket, replies: Vec<Reply>) -> Self {
        let unread_replies = replies.iter().filter(|r| r.is_unread_from_user()).count();
        Self {
            ticket,
            reply_count: replies.len(),
            unread_replies,
            replies,
        }
    }
}
