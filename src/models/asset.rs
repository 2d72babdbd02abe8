use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Row of the `assets` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub coingecko_id: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Row of the `signals` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: i64,
    pub asset_id: String,
    pub signal_color: SignalColor,
    #[serde(default)]
    pub price_at_signal: Option<Decimal>,
    #[serde(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row of the `briefs` table (AI-written explanation of a signal).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brief {
    pub id: i64,
    pub asset_id: String,
    pub headline: String,
    #[serde(default)]
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SignalColor
// ---------------------------------------------------------------------------

/// Signal colour as written by the signal engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalColor {
    Green,
    Red,
    Grey,
    Other(String),
}

impl SignalColor {
    /// The action shown to the user for this colour.
    pub fn action(&self) -> &'static str {
        match self {
            SignalColor::Green => "buy",
            SignalColor::Red => "sell",
            SignalColor::Grey | SignalColor::Other(_) => "wait",
        }
    }
}

impl From<String> for SignalColor {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "green" => SignalColor::Green,
            "red" => SignalColor::Red,
            "grey" | "gray" => SignalColor::Grey,
            _ => SignalColor::Other(raw),
        }
    }
}

impl From<SignalColor> for String {
    fn from(color: SignalColor) -> Self {
        match color {
            SignalColor::Green => "green".into(),
            SignalColor::Red => "red".into(),
            SignalColor::Grey => "grey".into(),
            SignalColor::Other(raw) => raw,
        }
    }
}

impl fmt::Display for SignalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.action())
    }
}

// ---------------------------------------------------------------------------
// Composite projections
// ---------------------------------------------------------------------------

/// One dashboard card: an asset with its newest signal and brief.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardRow {
    pub asset: Asset,
    pub signal: Option<Signal>,
    /// `buy` / `sell` / `wait`, `wait` when no signal exists yet.
    pub action: &'static str,
    pub brief: Option<Brief>,
}

impl DashboardRow {
    pub fn new(asset: Asset, signal: Option<Signal>, brief: Option<Brief>) -> Self {
        let action = signal
            .as_ref()
            .map(|s| s.signal_color.action())
            .unwrap_or("wait");
        Self {
            asset,
            signal,
            action,
            brief,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetDetail {
    pub asset: Asset,
    pub latest_signal: Option<Signal>,
    pub signal_history: Vec<Signal>,
    pub briefs: Vec<Brief>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_color_actions() {
        assert_eq!(SignalColor::from("green".to_string()).action(), "buy");
        assert_eq!(SignalColor::from("red".to_string()).action(), "sell");
        assert_eq!(SignalColor::from("grey".to_string()).action(), "wait");
        assert_eq!(SignalColor::from("yellow".to_string()).action(), "wait");
    }

    #[test]
    fn test_row_without_signal_waits() {
        let asset = Asset {
            id: "bitcoin".into(),
            symbol: "BTC".into(),
            name: "Bitcoin".into(),
            coingecko_id: Some("bitcoin".into()),
            enabled: true,
        };
        let row = DashboardRow::new(asset, None, None);
        assert_eq!(row.action, "wait");
    }
}
