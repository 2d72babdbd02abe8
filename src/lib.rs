pub mod api;
pub mod config;
pub mod errors;
pub mod gates;
pub mod metrics;
pub mod models;
pub mod proposals;
pub mod services;
pub mod supabase;
pub mod track_record;

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::api::ws_types::WsMessage;
use crate::config::AppConfig;
use crate::gates::GatePipeline;
use crate::services::{DashboardCache, OnboardingCache};
use crate::supabase::SupabaseClient;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub supabase: SupabaseClient,
    pub ws_tx: broadcast::Sender<WsMessage>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    pub dashboard: DashboardCache,
    pub onboarding: OnboardingCache,
    pub gates: Arc<GatePipeline>,
}
