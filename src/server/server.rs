use anyhow::{Context, Result};
use axum::{extract::State, middleware, routing::get, Json, Router};
use serde::Serialize;
use std::future::IntoFuture;
use std::time::Duration;
use tower_http::services::ServeDir;
use tracing::info;

use super::analytics_routes::{analytics_routes, subscription_routes};
use super::metrics::metrics_handler;
use super::royalty_routes::royalty_routes;
use super::state::ServerState;
use super::support_routes::support_routes;
use super::log_requests;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> Json<ServerStats> {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub fn make_app(state: ServerState) -> Router {
    let config = state.config.clone();

    let home_router: Router = match config.frontend_dir_path.clone() {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let api_routes: Router = Router::new()
        .nest("/v1/royalty", royalty_routes(config.max_upload_size_bytes()))
        .nest("/v1/analytics", analytics_routes())
        .nest("/v1/subscriptions", subscription_routes())
        .nest("/v1/support", support_routes())
        .with_state(state.clone());

    home_router
        .merge(api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves the API and the metrics endpoint until either stops.
pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let metrics_port = state.config.metrics_port;

    let app = make_app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            info!("HTTP server stopped: {:?}", result);
            Ok(result?)
        }
        result = axum::serve(metrics_listener, make_metrics_app()).into_future() => {
            info!("Metrics server stopped: {:?}", result);
            Ok(result?)
        }
    }
}
