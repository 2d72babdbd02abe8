use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Row of the `trade_proposals` table.
///
/// Proposals are issued and advanced by the remote service. This side only
/// reads them and asks for `accept`/`decline` while they are still pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeProposal {
    pub id: Uuid,
    pub user_id: String,
    pub asset_id: String,
    pub side: ProposalSide,
    pub proposed_size_usd: Decimal,
    #[serde(default)]
    pub proposed_leverage: Option<Decimal>,
    pub entry_price: Decimal,
    pub status: ProposalStatus,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Share of the open position to close, only set on trim proposals.
    #[serde(default)]
    pub trim_pct: Option<Decimal>,
    #[serde(default)]
    pub error_message: Option<String>,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a proposal as reported by the remote service.
///
/// Wire values are matched exactly. Anything outside the known set is kept
/// verbatim in `Unknown` so it can be displayed as a degraded state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProposalStatus {
    Pending,
    Approved,
    AutoApproved,
    Declined,
    Expired,
    Executing,
    Executed,
    Failed,
    Unknown(String),
}

impl ProposalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
            ProposalStatus::AutoApproved => "auto_approved",
            ProposalStatus::Declined => "declined",
            ProposalStatus::Expired => "expired",
            ProposalStatus::Executing => "executing",
            ProposalStatus::Executed => "executed",
            ProposalStatus::Failed => "failed",
            ProposalStatus::Unknown(raw) => raw,
        }
    }

    /// Accepted by the user or the service and not yet settled.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ProposalStatus::Approved | ProposalStatus::AutoApproved | ProposalStatus::Executing
        )
    }
}

impl From<String> for ProposalStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => ProposalStatus::Pending,
            "approved" => ProposalStatus::Approved,
            "auto_approved" => ProposalStatus::AutoApproved,
            "declined" => ProposalStatus::Declined,
            "expired" => ProposalStatus::Expired,
            "executing" => ProposalStatus::Executing,
            "executed" => ProposalStatus::Executed,
            "failed" => ProposalStatus::Failed,
            _ => ProposalStatus::Unknown(raw),
        }
    }
}

impl From<&str> for ProposalStatus {
    fn from(raw: &str) -> Self {
        ProposalStatus::from(raw.to_string())
    }
}

impl From<ProposalStatus> for String {
    fn from(status: ProposalStatus) -> Self {
        match status {
            ProposalStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Direction of a proposed trade. `Trim` is reduce-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProposalSide {
    Long,
    Short,
    Trim,
    Other(String),
}

impl ProposalSide {
    pub fn as_str(&self) -> &str {
        match self {
            ProposalSide::Long => "long",
            ProposalSide::Short => "short",
            ProposalSide::Trim => "trim",
            ProposalSide::Other(raw) => raw,
        }
    }

    /// True for proposals that only shrink an existing position.
    pub fn is_reducing(&self) -> bool {
        matches!(self, ProposalSide::Trim)
    }
}

impl From<String> for ProposalSide {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "long" => ProposalSide::Long,
            "short" => ProposalSide::Short,
            "trim" | "reduce" => ProposalSide::Trim,
            _ => ProposalSide::Other(raw),
        }
    }
}

impl From<ProposalSide> for String {
    fn from(side: ProposalSide) -> Self {
        match side {
            ProposalSide::Other(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProposalSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// A user response to a pending proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalAction {
    Accept,
    Decline,
}

impl ProposalAction {
    /// Status the remote row is moved to when the action is applied.
    pub fn target_status(self) -> ProposalStatus {
        match self {
            ProposalAction::Accept => ProposalStatus::Approved,
            ProposalAction::Decline => ProposalStatus::Declined,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProposalAction::Accept => "accept",
            ProposalAction::Decline => "decline",
        }
    }
}
