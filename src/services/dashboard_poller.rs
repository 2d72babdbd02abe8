use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch, RwLock};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::api::ws_types::WsMessage;
use crate::models::DashboardRow;
use crate::supabase::{SupabaseClient, SupabaseError};

/// Last successful dashboard fetch.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub rows: Vec<DashboardRow>,
    pub fetched_at: DateTime<Utc>,
}

/// Shared holder for the latest snapshot.
#[derive(Clone, Default)]
pub struct DashboardCache {
    inner: Arc<RwLock<Option<DashboardSnapshot>>>,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<DashboardSnapshot> {
        self.inner.read().await.clone()
    }

    /// Snapshot if it is younger than `max_age`.
    pub async fn get_fresh(&self, max_age: Duration) -> Option<DashboardSnapshot> {
        let snapshot = self.get().await?;
        let age = Utc::now() - snapshot.fetched_at;
        let fresh = chrono::Duration::from_std(max_age).map_or(true, |max| age <= max);
        fresh.then_some(snapshot)
    }

    pub async fn store(&self, snapshot: DashboardSnapshot) {
        *self.inner.write().await = Some(snapshot);
    }
}

/// Fetch dashboard rows once, store them and broadcast them.
pub async fn refresh_dashboard(
    client: &SupabaseClient,
    cache: &DashboardCache,
    ws_tx: &broadcast::Sender<WsMessage>,
) -> Result<DashboardSnapshot, SupabaseError> {
    metrics::counter!("dashboard_polls_total").increment(1);

    let rows = match client.dashboard_rows().await {
        Ok(rows) => rows,
        Err(e) => {
            metrics::counter!("dashboard_poll_failures_total").increment(1);
            return Err(e);
        }
    };

    metrics::gauge!("dashboard_assets").set(rows.len() as f64);
    let snapshot = DashboardSnapshot {
        rows,
        fetched_at: Utc::now(),
    };
    cache.store(snapshot.clone()).await;

    // No receivers is fine: nobody has the dashboard open.
    let _ = ws_tx.send(WsMessage::DashboardUpdate(snapshot.clone()));

    Ok(snapshot)
}

/// Run the dashboard poller until `shutdown` flips to `true`.
///
/// A shutdown that arrives during a fetch abandons the fetch; its result is
/// never stored.
pub async fn run_dashboard_poller(
    client: SupabaseClient,
    cache: DashboardCache,
    ws_tx: broadcast::Sender<WsMessage>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(
        interval_secs = poll_interval.as_secs(),
        "Dashboard poller started"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            result = refresh_dashboard(&client, &cache, &ws_tx) => match result {
                Ok(snapshot) => {
                    tracing::debug!(assets = snapshot.rows.len(), "Dashboard poller: refreshed");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Dashboard poller: refresh failed");
                }
            },
            _ = shutdown.changed() => break,
        }
    }

    tracing::info!("Dashboard poller stopped");
}
