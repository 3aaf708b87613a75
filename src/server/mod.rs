mod analytics_routes;
pub mod config;
mod http_layers;
pub mod metrics;
pub mod response;
mod royalty_routes;
#[allow(clippy::module_inception)]
pub mod server;
pub mod state;
mod support_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, make_metrics_app, run_server};
pub use state::ServerState;
