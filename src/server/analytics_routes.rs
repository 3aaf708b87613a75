//! Dashboard analytics routes.
//!
//! Mounted under `/v1/analytics`, plus `/v1/subscriptions/top`.

use axum::{extract::State, routing::get, Router};
use chrono::Utc;
use serde::Serialize;

use super::response::ApiResponse;
use super::state::{GuardedAnalyticsReports, ServerState};
use crate::analytics::AnalyticsReports;

const FETCHED: &str = "Data fetched successfully";

/// Runs a report on a blocking worker and wraps it in the envelope.
async fn run_report<T, F>(
    reports: GuardedAnalyticsReports,
    name: &'static str,
    message: &'static str,
    report: F,
) -> ApiResponse
where
    T: Serialize + Send + 'static,
    F: FnOnce(&AnalyticsReports) -> anyhow::Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || report(reports.as_ref())).await {
        Ok(Ok(data)) => ApiResponse::ok().with_message(message).with_data(data),
        Ok(Err(e)) => ApiResponse::internal(&format!("Error building {}", name), e),
        Err(e) => ApiResponse::internal(&format!("Worker failed building {}", name), e),
    }
}

async fn basic_details(State(reports): State<GuardedAnalyticsReports>) -> ApiResponse {
    run_report(reports, "basic details", FETCHED, |r| r.basic_details()).await
}

async fn subscription_details(State(reports): State<GuardedAnalyticsReports>) -> ApiResponse {
    run_report(reports, "subscription details", FETCHED, |r| r.subscription_details()).await
}

async fn user_details(State(reports): State<GuardedAnalyticsReports>) -> ApiResponse {
    run_report(reports, "user details", FETCHED, |r| r.user_details()).await
}

async fn plan_details(State(reports): State<GuardedAnalyticsReports>) -> ApiResponse {
    let today = Utc::now().date_naive();
    run_report(reports, "plan details", FETCHED, move |r| r.plan_details(today)).await
}

async fn trend_details(State(reports): State<GuardedAnalyticsReports>) -> ApiResponse {
    let today = Utc::now().date_naive();
    run_report(reports, "trend details", FETCHED, move |r| r.trend_details(today)).await
}

async fn top_subscriptions(State(reports): State<GuardedAnalyticsReports>) -> ApiResponse {
    let now = Utc::now();
    run_report(
        reports,
        "top subscriptions",
        "Top subscription plans fetched successfully",
        move |r| r.top_subscriptions(now),
    )
    .await
}

pub fn analytics_routes() -> Router<ServerState> {
    Router::new()
        .route("/basic-details", get(basic_details))
        .route("/subscription-details", get(subscription_details))
        .route("/user-details", get(user_details))
        .route("/plan-details", get(plan_details))
        .route("/trend-details", get(trend_details))
}

pub fn subscription_routes() -> Router<ServerState> {
    Router::new().route("/top", get(top_subscriptions))
}
