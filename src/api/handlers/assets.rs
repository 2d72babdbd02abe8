use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Serialize;

use super::{wallet_balance, ApiResponse};
use crate::errors::AppError;
use crate::models::{AssetDetail, AuthUser, Section};
use crate::proposals::{build_cards, ProposalCard};
use crate::AppState;

#[derive(Serialize)]
pub struct AssetPage {
    #[serde(flatten)]
    pub detail: AssetDetail,
    pub proposals: Section<Vec<ProposalCard>>,
}

pub async fn detail(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(asset_id): Path<String>,
) -> Result<Json<ApiResponse<AssetPage>>, AppError> {
    let (detail, proposals, balance) = tokio::join!(
        state.supabase.asset_detail(&asset_id),
        state.supabase.list_proposals(&user.id, Some(&asset_id)),
        wallet_balance(&state, &user.id),
    );

    let detail = detail?.ok_or_else(|| AppError::NotFound(format!("asset {asset_id}")))?;
    let now = Utc::now();
    let proposals = proposals.map(|p| build_cards(p, balance, now));

    Ok(Json(ApiResponse::ok(AssetPage {
        detail,
        proposals: Section::from_result("proposals", proposals),
    })))
}
