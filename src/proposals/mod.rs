pub mod balance;
pub mod pending;
pub mod view_state;

pub use balance::{is_insufficient, preflight, Preflight};
pub use pending::{badge_label, summarize_pending, PendingSummary};
pub use view_state::{derive_view_state, is_expired, Tone, ViewState, Visual};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::TradeProposal;

/// A proposal as sent to the dashboard: the remote row plus its derived state.
#[derive(Debug, Clone, Serialize)]
pub struct ProposalCard {
    #[serde(flatten)]
    pub proposal: TradeProposal,
    pub view: ViewState,
    pub insufficient_balance: bool,
}

impl ProposalCard {
    pub fn build(
        proposal: TradeProposal,
        wallet_balance: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Self {
        let view = derive_view_state(&proposal, now);
        let insufficient_balance = is_insufficient(&proposal, wallet_balance);
        Self {
            proposal,
            view,
            insufficient_balance,
        }
    }
}

/// Build cards for a whole list against one clock reading.
pub fn build_cards(
    proposals: Vec<TradeProposal>,
    wallet_balance: Option<Decimal>,
    now: DateTime<Utc>,
) -> Vec<ProposalCard> {
    proposals
        .into_iter()
        .map(|p| ProposalCard::build(p, wallet_balance, now))
        .collect()
}
