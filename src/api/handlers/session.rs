use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::{Extension, Json};
use serde::Deserialize;

use super::ApiResponse;
use crate::api::auth::bearer_token;
use crate::errors::AppError;
use crate::gates::{AuthState, GateContext, GateOutcome, OnboardingState, Route, SessionUser};
use crate::models::AuthUser;
use crate::AppState;

#[derive(Deserialize)]
pub struct GateQuery {
    pub path: Option<String>,
}

/// Auth state for the gates. A provider that cannot be reached leaves the
/// session `loading` rather than signing the user out.
async fn auth_state(state: &AppState, headers: &HeaderMap) -> AuthState {
    let Some(token) = bearer_token(headers) else {
        return AuthState::anonymous();
    };

    match state.supabase.get_user(token).await {
        Ok(Some(user)) => AuthState::signed_in(SessionUser {
            deactivated_at: user.deactivated_at(),
            id: user.id,
        }),
        Ok(None) => AuthState::anonymous(),
        Err(e) => {
            tracing::warn!(error = %e, "Auth provider unavailable during gate check");
            AuthState::loading()
        }
    }
}

/// Which screen the dashboard should show for `path`.
pub async fn gate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<GateQuery>,
) -> Json<GateOutcome> {
    let route = Route::parse(query.path.as_deref().unwrap_or("/"));
    let auth = auth_state(&state, &headers).await;

    // Deactivated users never reach the onboarding gate, so skip the lookup.
    let onboarding = match &auth.user {
        Some(user) if user.deactivated_at.is_none() => {
            state
                .onboarding
                .resolve(
                    &state.supabase,
                    &user.id,
                    state.config.onboarding_reconcile_delay(),
                )
                .await
        }
        _ => OnboardingState::Checking,
    };

    let outcome = state.gates.evaluate(&GateContext {
        route,
        auth,
        onboarding,
    });
    metrics::counter!("gate_decisions_total", "decision" => outcome.kind()).increment(1);
    tracing::debug!(outcome = outcome.kind(), "Gate evaluated");

    Json(outcome)
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Json<ApiResponse<()>> {
    state.onboarding.invalidate(&user.id).await;
    tracing::info!(user_id = %user.id, "Session ended");
    Json(ApiResponse::ok(()))
}

pub async fn complete_onboarding(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.supabase.complete_onboarding(&user.id).await?;
    state.onboarding.set(&user.id, true).await;
    tracing::info!(user_id = %user.id, "Onboarding completed");
    Ok(Json(ApiResponse::ok(())))
}

pub async fn reactivate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if user.deactivated_at().is_none() {
        return Err(AppError::BadRequest("Account is not deactivated".into()));
    }
    state.supabase.reactivate(&user.id).await?;
    Ok(Json(ApiResponse::ok(())))
}
