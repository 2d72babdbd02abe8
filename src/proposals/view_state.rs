use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ProposalStatus, TradeProposal};

/// What the proposal card shows in place of (or next to) its badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visual {
    /// Accept / decline buttons.
    Actions,
    /// Pending proposal whose window has passed.
    Expired,
    Spinner,
    Checkmark,
    Error,
    Muted,
}

/// Badge colour family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Accent,
    Neutral,
    Progress,
    Positive,
    Negative,
    Muted,
}

/// Presentation state of one proposal at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub visual: Visual,
    pub label: &'static str,
    pub tone: Tone,
    pub actionable: bool,
    pub dimmed: bool,
}

impl ViewState {
    const fn new(visual: Visual, label: &'static str, tone: Tone) -> Self {
        Self {
            visual,
            label,
            tone,
            actionable: false,
            dimmed: false,
        }
    }
}

/// True once `now` has reached the proposal's expiry. Proposals without an
/// expiry never expire on this side.
pub fn is_expired(proposal: &TradeProposal, now: DateTime<Utc>) -> bool {
    proposal.expires_at.is_some_and(|expires_at| now >= expires_at)
}

/// Map a proposal's status and expiry to its view state.
///
/// Total over every status value: anything unrecognised is dimmed and
/// inactionable rather than rejected.
pub fn derive_view_state(proposal: &TradeProposal, now: DateTime<Utc>) -> ViewState {
    match &proposal.status {
        ProposalStatus::Pending if is_expired(proposal, now) => {
            ViewState::new(Visual::Expired, "Expired", Tone::Neutral)
        }
        ProposalStatus::Pending => ViewState {
            actionable: true,
            ..ViewState::new(Visual::Actions, "Awaiting decision", Tone::Accent)
        },
        ProposalStatus::Approved => ViewState::new(Visual::Spinner, "Approved", Tone::Progress),
        ProposalStatus::AutoApproved => {
            ViewState::new(Visual::Spinner, "Auto-approved", Tone::Progress)
        }
        ProposalStatus::Executing => ViewState::new(Visual::Spinner, "Executing", Tone::Progress),
        ProposalStatus::Executed => ViewState::new(Visual::Checkmark, "Executed", Tone::Positive),
        ProposalStatus::Failed => ViewState::new(Visual::Error, "Failed", Tone::Negative),
        ProposalStatus::Declined => ViewState::new(Visual::Muted, "Declined", Tone::Muted),
        ProposalStatus::Expired => ViewState::new(Visual::Muted, "Expired", Tone::Muted),
        ProposalStatus::Unknown(_) => ViewState {
            dimmed: true,
            ..ViewState::new(Visual::Muted, "Unavailable", Tone::Muted)
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
