//! Support ticket routes, mounted under `/v1/support`.

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::response::ApiResponse;
use super::state::{GuardedSupportStore, ServerState};
use crate::support::STATUS_FILTER_ALL;

#[derive(Debug, Deserialize)]
pub struct TicketsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepliesQuery {
    pub ticket_id: Option<String>,
}

/// GET /tickets?status=
async fn list_tickets(
    State(store): State<GuardedSupportStore>,
    Query(query): Query<TicketsQuery>,
) -> ApiResponse {
    let status = query
        .status
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| STATUS_FILTER_ALL.to_string());

    let filter = status.clone();
    let result =
        tokio::task::spawn_blocking(move || store.list_tickets_with_replies(Some(&filter))).await;

    match result {
        Ok(Ok(tickets)) => ApiResponse::ok()
            .with_data(tickets)
            .with_field("filters", json!({ "status": status })),
        Ok(Err(e)) => ApiResponse::internal("Error fetching support tickets", e),
        Err(e) => ApiResponse::internal("Support tickets worker failed", e),
    }
}

/// GET /replies?ticketId=
async fn list_replies(
    State(store): State<GuardedSupportStore>,
    Query(query): Query<RepliesQuery>,
) -> ApiResponse {
    let Some(ticket_id) = query.ticket_id.filter(|id| !id.is_empty()) else {
        return ApiResponse::bad_request("Ticket ID is required");
    };

    let result = tokio::task::spawn_blocking(move || {
        let Some(ticket) = store.find_ticket(&ticket_id)? else {
            return anyhow::Ok(None);
        };
        let replies = store.replies_for(&ticket.id)?;
        anyhow::Ok(Some((ticket, replies)))
    })
    .await;

    match result {
        Ok(Ok(Some((ticket, replies)))) => {
            debug!(
                "Found ticket {} with {} replies",
                ticket.ticket_id,
                replies.len()
            );
            ApiResponse::ok()
                .with_data(replies)
                .with_field("ticket", ticket)
        }
        Ok(Ok(None)) => ApiResponse::not_found("Ticket not found"),
        Ok(Err(e)) => ApiResponse::internal("Error fetching replies", e),
        Err(e) => ApiResponse::internal("Replies worker failed", e),
    }
}

pub fn support_routes() -> Router<ServerState> {
    Router::new()
        .route("/tickets", get(list_tickets))
        .route("/replies", get(list_replies))
}
