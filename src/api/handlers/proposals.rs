use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{wallet_balance, ApiResponse};
use crate::api::ws_types::WsMessage;
use crate::errors::AppError;
use crate::models::{AuthUser, ProposalAction, TradeProposal};
use crate::proposals::{
    build_cards, derive_view_state, preflight as run_preflight, summarize_pending,
    PendingSummary, Preflight, ProposalCard,
};
use crate::AppState;

#[derive(Deserialize)]
pub struct ProposalQuery {
    pub asset_id: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ProposalQuery>,
) -> Result<Json<ApiResponse<Vec<ProposalCard>>>, AppError> {
    let (proposals, balance) = tokio::join!(
        state
            .supabase
            .list_proposals(&user.id, query.asset_id.as_deref()),
        wallet_balance(&state, &user.id),
    );
    let cards = build_cards(proposals?, balance, Utc::now());
    Ok(Json(ApiResponse::ok(cards)))
}

pub async fn pending(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<PendingSummary>>, AppError> {
    let proposals = state.supabase.list_proposals(&user.id, None).await?;
    Ok(Json(ApiResponse::ok(summarize_pending(&proposals))))
}

async fn load(state: &AppState, id: Uuid, user_id: &str) -> Result<TradeProposal, AppError> {
    state
        .supabase
        .get_proposal(id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("proposal {id}")))
}

pub async fn preflight(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Preflight>>, AppError> {
    let (proposal, balance) = tokio::join!(
        load(&state, id, &user.id),
        wallet_balance(&state, &user.id)
    );
    Ok(Json(ApiResponse::ok(run_preflight(
        &proposal?,
        balance,
        Utc::now(),
    ))))
}

pub async fn accept(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProposalCard>>, AppError> {
    respond(&state, &user, id, ProposalAction::Accept).await
}

pub async fn decline(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProposalCard>>, AppError> {
    respond(&state, &user, id, ProposalAction::Decline).await
}

/// Apply the user's decision. Only a proposal that is actionable right now
/// is sent to the remote service; anything else is refused locally.
async fn respond(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    action: ProposalAction,
) -> Result<Json<ApiResponse<ProposalCard>>, AppError> {
    let proposal = load(state, id, &user.id).await?;

    let view = derive_view_state(&proposal, Utc::now());
    if !view.actionable {
        tracing::info!(
            proposal_id = %id,
            status = %proposal.status,
            state = view.label,
            action = action.as_str(),
            "Proposal action refused: not actionable"
        );
        return Err(AppError::Conflict(format!(
            "Proposal cannot be {}: {}",
            action.target_status(),
            view.label.to_lowercase()
        )));
    }

    let updated = match state
        .supabase
        .respond_to_proposal(id, &user.id, action)
        .await
    {
        Ok(updated) => updated,
        Err(e) => {
            metrics::counter!("proposal_action_failures_total").increment(1);
            tracing::warn!(
                proposal_id = %id,
                action = action.as_str(),
                error = %e,
                "Proposal action failed"
            );
            return Err(e.into());
        }
    };

    metrics::counter!("proposal_actions_total", "action" => action.as_str()).increment(1);
    tracing::info!(
        proposal_id = %id,
        user_id = %user.id,
        asset_id = %updated.asset_id,
        action = action.as_str(),
        "Proposal action applied"
    );

    let balance = wallet_balance(state, &user.id).await;
    let card = ProposalCard::build(updated, balance, Utc::now());
    let _ = state.ws_tx.send(WsMessage::ProposalUpdate(card.clone()));

    Ok(Json(ApiResponse::ok(card)))
}
