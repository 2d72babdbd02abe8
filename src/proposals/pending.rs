use serde::Serialize;

use crate::gates::Route;
use crate::models::{ProposalStatus, TradeProposal};

/// Above this many pending proposals the badge shows `"9+"`.
pub const BADGE_CAP: usize = 9;

/// Pending-proposal banner/badge data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSummary {
    /// Exact number of proposals in `pending` status. Never capped.
    pub count: usize,
    pub badge: Option<String>,
    /// Where the banner sends the user, `None` when nothing is pending.
    pub target: Option<Route>,
}

/// Badge text for a pending count.
pub fn badge_label(count: usize) -> Option<String> {
    match count {
        0 => None,
        n if n > BADGE_CAP => Some(format!("{BADGE_CAP}+")),
        n => Some(n.to_string()),
    }
}

/// Count pending proposals and pick the banner's navigation target.
///
/// Only exact `pending` counts; in-flight statuses like `auto_approved` do
/// not. When every pending proposal is for one asset the target is that
/// asset, otherwise it is the asset of the first pending proposal in input
/// order.
pub fn summarize_pending(proposals: &[TradeProposal]) -> PendingSummary {
    let pending: Vec<&TradeProposal> = proposals
        .iter()
        .filter(|p| p.status == ProposalStatus::Pending)
        .collect();

    let target = pending.first().map(|first| {
        let single_asset = pending.iter().all(|p| p.asset_id == first.asset_id);
        if !single_asset {
            tracing::debug!(
                count = pending.len(),
                asset_id = %first.asset_id,
                "Pending proposals span several assets, routing to the first"
            );
        }
        Route::Asset(first.asset_id.clone())
    });

    PendingSummary {
        count: pending.len(),
        badge: badge_label(pending.len()),
        target,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
