use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::errors::AppError;
use crate::models::PaperTrade;
use crate::track_record::{summarize, TrackRecordStats};
use crate::AppState;

#[derive(Deserialize)]
pub struct TrackRecordQuery {
    pub asset_id: Option<String>,
}

#[derive(Serialize)]
pub struct TrackRecord {
    pub trades: Vec<PaperTrade>,
    pub stats: TrackRecordStats,
}

pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<TrackRecordQuery>,
) -> Result<Json<ApiResponse<TrackRecord>>, AppError> {
    let trades = state
        .supabase
        .paper_trades(query.asset_id.as_deref())
        .await?;
    let stats = summarize(&trades, state.config.track_record_position_size_usd);

    Ok(Json(ApiResponse::ok(TrackRecord { trades, stats })))
}
