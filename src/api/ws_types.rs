use serde::Serialize;

use crate::proposals::ProposalCard;
use crate::services::DashboardSnapshot;

/// Messages broadcast to connected dashboard WebSocket clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "dashboard_update")]
    DashboardUpdate(DashboardSnapshot),

    #[serde(rename = "proposal_update")]
    ProposalUpdate(ProposalCard),
}

impl WsMessage {
    /// Dashboard updates go to everyone; proposal updates only to their owner.
    pub fn visible_to(&self, user_id: &str) -> bool {
        match self {
            WsMessage::DashboardUpdate(_) => true,
            WsMessage::ProposalUpdate(card) => card.proposal.user_id == user_id,
        }
    }
}
