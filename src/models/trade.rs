use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Row of the `paper_trades` table (live and backtest track record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperTrade {
    pub id: i64,
    pub asset_id: String,
    pub direction: TradeDirection,
    pub status: String,
    pub entry_price: Decimal,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
    #[serde(default)]
    pub pnl_pct: Option<Decimal>,
    /// Percent of the original position closed by a trim.
    #[serde(default)]
    pub trim_pct: Option<Decimal>,
    pub opened_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: Option<String>,
}

impl PaperTrade {
    pub fn is_closed(&self) -> bool {
        self.status == trade_status::CLOSED
    }
}

/// Trade status constants.
pub mod trade_status {
    pub const OPEN: &str = "open";
    pub const CLOSED: &str = "closed";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TradeDirection {
    Long,
    Short,
    Trim,
    /// Re-entries, mean-reversion legs and anything else the engine emits.
    Other(String),
}

impl From<String> for TradeDirection {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "long" => TradeDirection::Long,
            "short" => TradeDirection::Short,
            "trim" => TradeDirection::Trim,
            _ => TradeDirection::Other(raw),
        }
    }
}

impl From<TradeDirection> for String {
    fn from(direction: TradeDirection) -> Self {
        match direction {
            TradeDirection::Long => "long".into(),
            TradeDirection::Short => "short".into(),
            TradeDirection::Trim => "trim".into(),
            TradeDirection::Other(raw) => raw,
        }
    }
}
