use axum::extract::State;
use axum::{Extension, Json};

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::{AuthUser, Wallet};
use crate::AppState;

/// The caller's wallet; `data` is null until one has been provisioned.
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Option<Wallet>>>, AppError> {
    let wallet = state.supabase.get_wallet(&user.id).await?;
    Ok(Json(ApiResponse::ok(wallet)))
}
