use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::{AuthUser, Section, Wallet};
use crate::proposals::{summarize_pending, PendingSummary};
use crate::services::{refresh_dashboard, DashboardSnapshot};
use crate::AppState;

#[derive(Serialize)]
pub struct DashboardSummary {
    pub rows: Section<DashboardSnapshot>,
    pub pending: Section<PendingSummary>,
    pub wallet: Section<Option<Wallet>>,
}

/// Rows from the poller's cache while it is fresh; otherwise fetched now.
/// A failed fetch falls back to whatever snapshot the cache still holds.
async fn dashboard_rows(state: &AppState) -> Section<DashboardSnapshot> {
    let max_age = state.config.dashboard_poll_interval();
    if let Some(snapshot) = state.dashboard.get_fresh(max_age).await {
        return Section::ok(snapshot);
    }

    match refresh_dashboard(&state.supabase, &state.dashboard, &state.ws_tx).await {
        Ok(snapshot) => Section::ok(snapshot),
        Err(e) => match state.dashboard.get().await {
            Some(stale) => {
                tracing::warn!(
                    error = %e,
                    fetched_at = %stale.fetched_at,
                    "Dashboard fetch failed, serving stale snapshot"
                );
                Section::ok(stale)
            }
            None => Section::from_result("dashboard", Err::<DashboardSnapshot, _>(e)),
        },
    }
}

pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Json<ApiResponse<DashboardSummary>> {
    let (rows, proposals, wallet) = tokio::join!(
        dashboard_rows(&state),
        state.supabase.list_proposals(&user.id, None),
        state.supabase.get_wallet(&user.id),
    );

    let pending = proposals.map(|p| summarize_pending(&p));

    Json(ApiResponse::ok(DashboardSummary {
        rows,
        pending: Section::from_result("pending proposals", pending),
        wallet: Section::from_result("wallet", wallet),
    }))
}

/// Force a fetch, store it and push it to every connected client.
pub async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardSnapshot>>, AppError> {
    let snapshot = refresh_dashboard(&state.supabase, &state.dashboard, &state.ws_tx).await?;
    tracing::info!(assets = snapshot.rows.len(), "Dashboard refreshed on request");
    Ok(Json(ApiResponse::ok(snapshot)))
}
