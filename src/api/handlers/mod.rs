pub mod assets;
pub mod dashboard;
pub mod health;
pub mod proposals;
pub mod session;
pub mod track_record;
pub mod wallet;
pub mod ws;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// The user's wallet balance, or `None` when there is no wallet, no reported
/// balance, or the lookup failed. Callers only use it for advisory flags.
pub(crate) async fn wallet_balance(state: &AppState, user_id: &str) -> Option<Decimal> {
    match state.supabase.get_wallet(user_id).await {
        Ok(wallet) => wallet.and_then(|w| w.balance),
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Wallet lookup failed");
            None
        }
    }
}
