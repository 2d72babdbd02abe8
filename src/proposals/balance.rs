use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::TradeProposal;

use super::view_state::derive_view_state;

/// Whether accepting `proposal` should come with an "insufficient balance"
/// warning.
///
/// Trims never warn. A missing balance never warns, but a zero balance is a
/// real balance and is compared like any other. The remote service runs the
/// authoritative check, so callers must not refuse the action on this result.
pub fn is_insufficient(proposal: &TradeProposal, wallet_balance: Option<Decimal>) -> bool {
    if proposal.side.is_reducing() {
        return false;
    }
    match wallet_balance {
        Some(balance) => balance < proposal.proposed_size_usd,
        None => false,
    }
}

/// Everything the dashboard needs before submitting an accept.
#[derive(Debug, Clone, Serialize)]
pub struct Preflight {
    pub actionable: bool,
    pub insufficient_balance: bool,
    pub wallet_balance: Option<Decimal>,
    pub required_usd: Decimal,
}

pub fn preflight(
    proposal: &TradeProposal,
    wallet_balance: Option<Decimal>,
    now: DateTime<Utc>,
) -> Preflight {
    Preflight {
        actionable: derive_view_state(proposal, now).actionable,
        insufficient_balance: is_insufficient(proposal, wallet_balance),
        wallet_balance,
        required_usd: proposal.proposed_size_usd,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
