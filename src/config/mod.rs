use anyhow::Context;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::track_record::DEFAULT_POSITION_SIZE_USD;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    // Remote data service
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub supabase_timeout_secs: u64,

    // Background work
    pub dashboard_poll_interval_secs: u64,
    pub onboarding_reconcile_delay_ms: u64,

    // Track record
    pub track_record_position_size_usd: Decimal,
}

/// Read `key`, falling back to `default` when unset. A set but malformed
/// value is an error.
fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid value, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("PORT", 8080)?,

            supabase_url: env::var("SUPABASE_URL").context("SUPABASE_URL must be set")?,
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .context("SUPABASE_SERVICE_KEY must be set")?,
            supabase_timeout_secs: parse_or("SUPABASE_TIMEOUT_SECS", 15)?,

            dashboard_poll_interval_secs: parse_or("DASHBOARD_POLL_INTERVAL_SECS", 60)?,
            onboarding_reconcile_delay_ms: parse_or("ONBOARDING_RECONCILE_DELAY_MS", 1_500)?,

            track_record_position_size_usd: parse_or(
                "TRACK_RECORD_POSITION_SIZE_USD",
                Decimal::from(DEFAULT_POSITION_SIZE_USD),
            )?,
        })
    }

    pub fn supabase_timeout(&self) -> Duration {
        Duration::from_secs(self.supabase_timeout_secs)
    }

    pub fn dashboard_poll_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_poll_interval_secs.max(1))
    }

    pub fn onboarding_reconcile_delay(&self) -> Duration {
        Duration::from_millis(self.onboarding_reconcile_delay_ms)
    }
}
