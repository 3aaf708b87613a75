//! End-to-end tests for support ticket endpoints

mod common;

use common::{TestClient, TestServer, TICKET_IN_PROGRESS, TICKET_RESOLVED, TICKET_WITH_REPLIES};
use reqwest::StatusCode;
use serde_json::Value;

fn ticket_ids(data: &Value) -> Vec<String> {
    data.as_array()
        .unwrap()
        .iter()
        .map(|t| t["ticketId"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// Tickets
// ============================================================================

#[tokio::test]
async fn test_tickets_ordered_by_status_then_newest() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_tickets(None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["filters"]["status"], "all");
    assert_eq!(
        ticket_ids(&body["data"]),
        vec![
            "TCK-1004",
            TICKET_WITH_REPLIES,
            TICKET_IN_PROGRESS,
            TICKET_RESOLVED
        ]
    );
}

#[tokio::test]
async fn test_tickets_carry_reply_counts() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.get_tickets(None).await.json().await.unwrap();
    let tickets = body["data"].as_array().unwrap();
    let with_replies = tickets
        .iter()
        .find(|t| t["ticketId"] == TICKET_WITH_REPLIES)
        .unwrap();

    assert_eq!(with_replies["_id"], "t-1");
    assert_eq!(with_replies["replyCount"], 3);
    // Only unread user replies count; the admin reply does not
    assert_eq!(with_replies["unreadReplies"], 1);
    let replies = with_replies["replies"].as_array().unwrap();
    assert_eq!(replies[0]["_id"], "r-1");
    assert_eq!(replies[2]["_id"], "r-3");

    let resolved = tickets
        .iter()
        .find(|t| t["ticketId"] == TICKET_RESOLVED)
        .unwrap();
    assert_eq!(resolved["replyCount"], 0);
    assert_eq!(resolved["isClosed"], true);
}

#[tokio::test]
async fn test_tickets_filtered_by_status() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.get_tickets(Some("pending")).await.json().await.unwrap();
    assert_eq!(body["filters"]["status"], "pending");
    assert_eq!(
        ticket_ids(&body["data"]),
        vec!["TCK-1004", TICKET_WITH_REPLIES]
    );

    let body: Value = client.get_tickets(Some("closed")).await.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}

// ============================================================================
// Replies
// ============================================================================

#[tokio::test]
async fn test_replies_for_ticket_are_chronological() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_replies(Some(TICKET_WITH_REPLIES)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["ticket"]["ticketId"], TICKET_WITH_REPLIES);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["r-1", "r-2", "r-3"]);
    assert_eq!(body["data"][1]["senderType"], "admin");
}

#[tokio::test]
async fn test_replies_require_ticket_id() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_replies(None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], 400);
    assert_eq!(body["message"], "Ticket ID is required");
}

#[tokio::test]
async fn test_replies_for_unknown_ticket() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_replies(Some("TCK-9999")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Ticket not found");
}

#[tokio::test]
async fn test_home_reports_version() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
