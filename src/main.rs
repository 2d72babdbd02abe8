use std::sync::Arc;

use tokio::sync::{broadcast, watch};

use vela::api::router::create_router;
use vela::api::ws_types::WsMessage;
use vela::config::AppConfig;
use vela::gates::GatePipeline;
use vela::services::{run_dashboard_poller, DashboardCache, OnboardingCache};
use vela::supabase::SupabaseClient;
use vela::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    let supabase = SupabaseClient::new(
        &config.supabase_url,
        &config.supabase_service_key,
        config.supabase_timeout(),
    )?;
    match supabase.ping().await {
        Ok(()) => tracing::info!(url = %config.supabase_url, "Remote data service reachable"),
        Err(e) => tracing::warn!(error = %e, "Remote data service not reachable yet"),
    }

    let metrics_handle = vela::metrics::init_metrics()?;

    // --- WebSocket broadcast channel for dashboard ---
    let (ws_tx, _) = broadcast::channel::<WsMessage>(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let dashboard = DashboardCache::new();
    let poller = tokio::spawn(run_dashboard_poller(
        supabase.clone(),
        dashboard.clone(),
        ws_tx.clone(),
        config.dashboard_poll_interval(),
        shutdown_rx,
    ));

    let state = AppState {
        config,
        supabase,
        ws_tx,
        metrics_handle,
        dashboard,
        onboarding: OnboardingCache::new(),
        gates: Arc::new(GatePipeline::standard()),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
            let _ = shutdown_tx.send(true);
        })
        .await?;

    if let Err(e) = poller.await {
        tracing::error!(error = %e, "Dashboard poller task failed");
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
