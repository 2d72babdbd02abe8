use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::future::join_all;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use super::SupabaseError;
use crate::models::{
    Asset, AssetDetail, Brief, DashboardRow, PaperTrade, ProposalAction, Signal, TradeProposal,
    UserProfile, Wallet,
};

/// Number of signals returned with an asset's detail view.
const SIGNAL_HISTORY_LIMIT: usize = 30;
/// Number of briefs returned with an asset's detail view.
const BRIEF_HISTORY_LIMIT: usize = 10;

/// PostgREST client for the remote tables, authenticated with the service key.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, SupabaseError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// REST URL for `table` with PostgREST query parameters.
    fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, SupabaseError> {
        let base = format!("{}/rest/v1/{}", self.base_url, table);
        Ok(Url::parse_with_params(&base, params)?)
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn check(resp: Response) -> Result<Response, SupabaseError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SupabaseError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// `GET /rest/v1/{table}` and decode the row array.
    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, params)?;
        let resp = self.with_auth(self.http.get(url)).send().await?;
        let rows = Self::check(resp).await?.json().await?;
        Ok(rows)
    }

    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, SupabaseError> {
        let mut params = params.to_vec();
        params.push(("limit", "1".into()));
        let rows: Vec<T> = self.select(table, &params).await?;
        Ok(rows.into_iter().next())
    }

    /// `PATCH /rest/v1/{table}` returning the updated rows.
    async fn update<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
        body: &serde_json::Value,
    ) -> Result<Vec<T>, SupabaseError> {
        let url = self.table_url(table, params)?;
        let req = self
            .http
            .patch(url)
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
            .json(body);
        let resp = self.with_auth(req).send().await?;
        let rows = Self::check(resp).await?.json().await?;
        Ok(rows)
    }

    // -----------------------------------------------------------------------
    // Health
    // -----------------------------------------------------------------------

    pub async fn ping(&self) -> Result<(), SupabaseError> {
        let _: Vec<serde_json::Value> = self
            .select("assets", &[("select", "id".into()), ("limit", "1".into())])
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Assets, signals, briefs
    // -----------------------------------------------------------------------

    pub async fn list_assets(&self) -> Result<Vec<Asset>, SupabaseError> {
        self.select(
            "assets",
            &[
                ("enabled", "eq.true".into()),
                ("order", "symbol.asc".into()),
            ],
        )
        .await
    }

    pub async fn get_asset(&self, asset_id: &str) -> Result<Option<Asset>, SupabaseError> {
        self.select_one("assets", &[("id", format!("eq.{asset_id}"))])
            .await
    }

    pub async fn signal_history(
        &self,
        asset_id: &str,
        limit: usize,
    ) -> Result<Vec<Signal>, SupabaseError> {
        self.select(
            "signals",
            &[
                ("asset_id", format!("eq.{asset_id}")),
                ("order", "created_at.desc".into()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    pub async fn latest_signal(&self, asset_id: &str) -> Result<Option<Signal>, SupabaseError> {
        Ok(self.signal_history(asset_id, 1).await?.into_iter().next())
    }

    pub async fn briefs(&self, asset_id: &str, limit: usize) -> Result<Vec<Brief>, SupabaseError> {
        self.select(
            "briefs",
            &[
                ("asset_id", format!("eq.{asset_id}")),
                ("order", "created_at.desc".into()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    pub async fn latest_brief(&self, asset_id: &str) -> Result<Option<Brief>, SupabaseError> {
        Ok(self.briefs(asset_id, 1).await?.into_iter().next())
    }

    /// One row per enabled asset with its newest signal and brief. Per-asset
    /// lookups run concurrently; a failed lookup leaves that slot empty.
    pub async fn dashboard_rows(&self) -> Result<Vec<DashboardRow>, SupabaseError> {
        let assets = self.list_assets().await?;

        let lookups = assets.iter().map(|asset| async move {
            let (signal, brief) =
                tokio::join!(self.latest_signal(&asset.id), self.latest_brief(&asset.id));
            let signal = signal.unwrap_or_else(|e| {
                tracing::warn!(asset_id = %asset.id, error = %e, "Latest signal lookup failed");
                None
            });
            let brief = brief.unwrap_or_else(|e| {
                tracing::warn!(asset_id = %asset.id, error = %e, "Latest brief lookup failed");
                None
            });
            (signal, brief)
        });
        let results = join_all(lookups).await;

        Ok(assets
            .into_iter()
            .zip(results)
            .map(|(asset, (signal, brief))| DashboardRow::new(asset, signal, brief))
            .collect())
    }

    pub async fn asset_detail(&self, asset_id: &str) -> Result<Option<AssetDetail>, SupabaseError> {
        let Some(asset) = self.get_asset(asset_id).await? else {
            return Ok(None);
        };

        let (signals, briefs) = tokio::join!(
            self.signal_history(asset_id, SIGNAL_HISTORY_LIMIT),
            self.briefs(asset_id, BRIEF_HISTORY_LIMIT)
        );
        let signal_history = signals?;

        Ok(Some(AssetDetail {
            asset,
            latest_signal: signal_history.first().cloned(),
            signal_history,
            briefs: briefs?,
        }))
    }

    // -----------------------------------------------------------------------
    // Track record
    // -----------------------------------------------------------------------

    pub async fn paper_trades(
        &self,
        asset_id: Option<&str>,
    ) -> Result<Vec<PaperTrade>, SupabaseError> {
        let mut params = vec![("order", "opened_at.desc".to_string())];
        if let Some(asset_id) = asset_id {
            params.push(("asset_id", format!("eq.{asset_id}")));
        }
        self.select("paper_trades", &params).await
    }

    // -----------------------------------------------------------------------
    // Proposals
    // -----------------------------------------------------------------------

    /// A user's proposals, newest first, optionally for one asset.
    pub async fn list_proposals(
        &self,
        user_id: &str,
        asset_id: Option<&str>,
    ) -> Result<Vec<TradeProposal>, SupabaseError> {
        let mut params = vec![
            ("user_id", format!("eq.{user_id}")),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(asset_id) = asset_id {
            params.push(("asset_id", format!("eq.{asset_id}")));
        }
        self.select("trade_proposals", &params).await
    }

    pub async fn get_proposal(
        &self,
        proposal_id: Uuid,
        user_id: &str,
    ) -> Result<Option<TradeProposal>, SupabaseError> {
        self.select_one(
            "trade_proposals",
            &[
                ("id", format!("eq.{proposal_id}")),
                ("user_id", format!("eq.{user_id}")),
            ],
        )
        .await
    }

    /// Move a pending proposal to approved/declined. The update is filtered
    /// on `status=eq.pending` and on an unexpired `expires_at`, so a proposal
    /// the service already advanced, or one that lapsed after the caller's
    /// own check, is left untouched and reported as
    /// [`SupabaseError::NotPending`].
    pub async fn respond_to_proposal(
        &self,
        proposal_id: Uuid,
        user_id: &str,
        action: ProposalAction,
    ) -> Result<TradeProposal, SupabaseError> {
        let now = Utc::now();
        let body = json!({
            "status": action.target_status().as_str(),
            "responded_at": now,
        });
        let rows: Vec<TradeProposal> = self
            .update(
                "trade_proposals",
                &respond_filters(proposal_id, user_id, now),
                &body,
            )
            .await?;

        rows.into_iter().next().ok_or(SupabaseError::NotPending)
    }

    // -----------------------------------------------------------------------
    // Wallet + profile
    // -----------------------------------------------------------------------

    pub async fn get_wallet(&self, user_id: &str) -> Result<Option<Wallet>, SupabaseError> {
        self.select_one("wallets", &[("user_id", format!("eq.{user_id}"))])
            .await
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, SupabaseError> {
        self.select_one("profiles", &[("id", format!("eq.{user_id}"))])
            .await
    }

    pub async fn complete_onboarding(&self, user_id: &str) -> Result<(), SupabaseError> {
        let _: Vec<UserProfile> = self
            .update(
                "profiles",
                &[("id", format!("eq.{user_id}"))],
                &json!({ "onboarding_completed": true }),
            )
            .await?;
        Ok(())
    }
}

/// Row filters for a proposal response: the caller's own proposal, still
/// pending, and either without expiry or expiring after `now`.
fn respond_filters(
    proposal_id: Uuid,
    user_id: &str,
    now: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    vec![
        ("id", format!("eq.{proposal_id}")),
        ("user_id", format!("eq.{user_id}")),
        ("status", "eq.pending".into()),
        (
            "or",
            format!(
                "(expires_at.is.null,expires_at.gt.{})",
                now.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
        ),
    ]
}
