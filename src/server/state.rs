use axum::extract::FromRef;

use crate::analytics::{AnalyticsReports, AnalyticsStore};
use crate::royalty::{RoyaltyIngestionPipeline, RoyaltyStore};
use crate::support::SupportStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedRoyaltyStore = Arc<dyn RoyaltyStore>;
pub type GuardedIngestionPipeline = Arc<RoyaltyIngestionPipeline>;
pub type GuardedAnalyticsReports = Arc<AnalyticsReports>;
pub type GuardedSupportStore = Arc<dyn SupportStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub royalty_store: GuardedRoyaltyStore,
    pub ingestion_pipeline: GuardedIngestionPipeline,
    pub analytics: GuardedAnalyticsReports,
    pub support_store: GuardedSupportStore,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        royalty_store: Arc<dyn RoyaltyStore>,
        analytics_store: Arc<dyn AnalyticsStore>,
        support_store: Arc<dyn SupportStore>,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            ingestion_pipeline: Arc::new(RoyaltyIngestionPipeline::new(royalty_store.clone())),
            royalty_store,
            analytics: Arc::new(AnalyticsReports::new(analytics_store)),
            support_store,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedRoyaltyStore {
    fn from_ref(input: &ServerState) -> Self {
        input.royalty_store.clone()
    }
}

impl FromRef<ServerState> for GuardedIngestionPipeline {
    fn from_ref(input: &ServerState) -> Self {
        input.ingestion_pipeline.clone()
    }
}

impl FromRef<ServerState> for GuardedAnalyticsReports {
    fn from_ref(input: &ServerState) -> Self {
        input.analytics.clone()
    }
}

impl FromRef<ServerState> for GuardedSupportStore {
    fn from_ref(input: &ServerState) -> Self {
        input.support_store.clone()
    }
}
