pub mod asset;
pub mod profile;
pub mod proposal;
pub mod trade;
pub mod wallet;

pub use asset::{Asset, AssetDetail, Brief, DashboardRow, Signal, SignalColor};
pub use profile::{AppMetadata, AuthUser, UserProfile};
pub use proposal::{ProposalAction, ProposalSide, ProposalStatus, TradeProposal};
pub use trade::{PaperTrade, TradeDirection};
pub use wallet::{Wallet, WalletEnvironment};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Section: one independently failing part of a composite response
// ---------------------------------------------------------------------------

/// A composite-response slot that carries either data or a displayable error,
/// so one failing widget does not take the whole page down.
#[derive(Debug, Clone, Serialize)]
pub struct Section<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> Section<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn from_result<E: std::fmt::Display>(section: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                tracing::warn!(section, error = %e, "Section fetch failed");
                Self::failed(format!("Could not load {section}"))
            }
        }
    }
}
