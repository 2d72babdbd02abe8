use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Row of the `wallets` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: String,
    #[serde(default)]
    pub address: Option<String>,
    /// Absent until the wallet provider has reported a balance.
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub environment: WalletEnvironment,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletEnvironment {
    #[default]
    Testnet,
    Mainnet,
}
