use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tower::ServiceExt;

use vela::api::router::create_router;
use vela::api::ws_types::WsMessage;
use vela::config::AppConfig;
use vela::gates::GatePipeline;
use vela::services::{DashboardCache, OnboardingCache};
use vela::supabase::SupabaseClient;
use vela::AppState;

pub const ALICE: &str = "user-alice";
pub const BOB: &str = "user-bob";
pub const CAROL: &str = "user-carol";

pub const ALICE_TOKEN: &str = "token-alice";
pub const BOB_TOKEN: &str = "token-bob";
pub const CAROL_TOKEN: &str = "token-carol";

pub const PENDING_BTC: &str = "00000000-0000-0000-0000-00000000000a";
pub const EXPIRED_ETH: &str = "00000000-0000-0000-0000-00000000000b";
pub const EXECUTED_BTC: &str = "00000000-0000-0000-0000-00000000000c";
pub const PENDING_ETH: &str = "00000000-0000-0000-0000-00000000000d";
pub const BOB_PENDING: &str = "00000000-0000-0000-0000-00000000000e";

// ---------------------------------------------------------------------------
// Mock remote service: PostgREST tables + auth endpoints
// ---------------------------------------------------------------------------

/// In-memory stand-in for the remote service. Tables are JSON rows;
/// `column=eq.value` filters and `or=(col.is.null,col.gt.value)` groups are
/// honoured, ordering is not (rows are seeded in the order the real service
/// would return them).
#[derive(Clone, Default)]
pub struct MockRemote {
    tables: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    users: Arc<Mutex<HashMap<String, Value>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    auth_down: Arc<Mutex<bool>>,
    patches: Arc<Mutex<Vec<String>>>,
    latency: Arc<Mutex<Duration>>,
}

#[allow(dead_code)]
impl MockRemote {
    /// Make every request against `table` answer 500.
    pub fn fail_table(&self, table: &str) {
        self.failing.lock().unwrap().insert(table.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Delay every table read by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn set_auth_down(&self, down: bool) {
        *self.auth_down.lock().unwrap() = down;
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_rows(&self, table: &str, rows: Vec<Value>) {
        self.tables.lock().unwrap().insert(table.to_string(), rows);
    }

    /// Tables that have received a PATCH, in order.
    pub fn patched_tables(&self) -> Vec<String> {
        self.patches.lock().unwrap().clone()
    }

    pub fn set_proposal_status(&self, id: &str, status: &str) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut("trade_proposals") {
            for row in rows.iter_mut().filter(|r| r["id"] == id) {
                row["status"] = json!(status);
            }
        }
    }

    pub fn set_onboarded(&self, user_id: &str, onboarded: bool) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut("profiles") {
            for row in rows.iter_mut().filter(|r| r["id"] == user_id) {
                row["onboarding_completed"] = json!(onboarded);
            }
        }
    }

    pub fn user_deactivated(&self, user_id: &str) -> bool {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u["id"] == user_id)
            .is_some_and(|u| !u["app_metadata"]["deactivated_at"].is_null())
    }
}

fn matches_condition(cell: &Value, condition: &str) -> bool {
    if let Some(expected) = condition.strip_prefix("eq.") {
        return match cell {
            Value::String(s) => s == expected,
            Value::Null => false,
            other => other.to_string() == expected,
        };
    }
    if condition == "is.null" {
        return cell.is_null();
    }
    if let Some(bound) = condition.strip_prefix("gt.") {
        let parse = |s: &str| chrono::DateTime::parse_from_rfc3339(s).ok();
        return match (cell.as_str().and_then(parse), parse(bound)) {
            (Some(value), Some(bound)) => value > bound,
            _ => false,
        };
    }
    true
}

fn matches_filters(row: &Value, params: &[(String, String)]) -> bool {
    params
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "select" | "order" | "limit"))
        .all(|(key, value)| {
            if key == "or" {
                let inner = value.trim_start_matches('(').trim_end_matches(')');
                return inner.split(',').any(|clause| {
                    clause
                        .split_once('.')
                        .is_some_and(|(column, condition)| {
                            matches_condition(&row[column], condition)
                        })
                });
            }
            matches_condition(&row[key.as_str()], value)
        })
}

fn limit_of(params: &[(String, String)]) -> Option<usize> {
    params
        .iter()
        .find(|(key, _)| key == "limit")
        .and_then(|(_, v)| v.parse().ok())
}

async fn rest_select(
    State(mock): State<MockRemote>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let latency = *mock.latency.lock().unwrap();
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
    if mock.failing.lock().unwrap().contains(&table) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let rows: Vec<Value> = mock
        .rows(&table)
        .into_iter()
        .filter(|row| matches_filters(row, &params))
        .take(limit_of(&params).unwrap_or(usize::MAX))
        .collect();
    Json(rows).into_response()
}

async fn rest_update(
    State(mock): State<MockRemote>,
    Path(table): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
    Json(body): Json<Value>,
) -> Response {
    if mock.failing.lock().unwrap().contains(&table) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    mock.patches.lock().unwrap().push(table.clone());

    let mut tables = mock.tables.lock().unwrap();
    let mut updated = Vec::new();
    if let (Some(rows), Some(changes)) = (tables.get_mut(&table), body.as_object()) {
        for row in rows.iter_mut().filter(|row| matches_filters(row, &params)) {
            for (key, value) in changes {
                row[key.as_str()] = value.clone();
            }
            updated.push(row.clone());
        }
    }
    Json(updated).into_response()
}

async fn auth_user(State(mock): State<MockRemote>, headers: HeaderMap) -> Response {
    if *mock.auth_down.lock().unwrap() {
        return (StatusCode::SERVICE_UNAVAILABLE, "auth down").into_response();
    }
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default();
    match mock.users.lock().unwrap().get(token) {
        Some(user) => Json(user.clone()).into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "invalid JWT" }))).into_response(),
    }
}

async fn admin_update_user(
    State(mock): State<MockRemote>,
    Path(user_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut users = mock.users.lock().unwrap();
    let mut found = None;
    for user in users.values_mut().filter(|u| u["id"] == user_id.as_str()) {
        if let Some(meta) = body["app_metadata"].as_object() {
            for (key, value) in meta {
                user["app_metadata"][key.as_str()] = value.clone();
            }
        }
        found = Some(user.clone());
    }
    match found {
        Some(user) => Json(user).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn seed(mock: &MockRemote) {
    let now = Utc::now();
    let in_an_hour = now + chrono::Duration::hours(1);
    let an_hour_ago = now - chrono::Duration::hours(1);

    mock.set_rows(
        "assets",
        vec![
            json!({ "id": "bitcoin", "symbol": "BTC", "name": "Bitcoin", "coingecko_id": "bitcoin", "enabled": true }),
            json!({ "id": "ethereum", "symbol": "ETH", "name": "Ethereum", "coingecko_id": "ethereum", "enabled": true }),
            json!({ "id": "dogecoin", "symbol": "DOGE", "name": "Dogecoin", "enabled": false }),
        ],
    );
    mock.set_rows(
        "signals",
        vec![
            json!({ "id": 12, "asset_id": "bitcoin", "signal_color": "green", "price_at_signal": "64000.50", "reason": "EMA cross up", "created_at": now }),
            json!({ "id": 11, "asset_id": "bitcoin", "signal_color": "grey", "created_at": an_hour_ago }),
            json!({ "id": 21, "asset_id": "ethereum", "signal_color": "red", "price_at_signal": "3100", "created_at": now }),
        ],
    );
    mock.set_rows(
        "briefs",
        vec![
            json!({ "id": 1, "asset_id": "bitcoin", "headline": "BTC breaks out", "summary": "Trend turned up.", "created_at": now }),
        ],
    );
    mock.set_rows(
        "paper_trades",
        vec![
            json!({ "id": 3, "asset_id": "bitcoin", "direction": "trim", "status": "closed", "entry_price": "60000", "exit_price": "66000", "pnl_pct": "10", "trim_pct": "25", "opened_at": an_hour_ago, "closed_at": now }),
            json!({ "id": 2, "asset_id": "ethereum", "direction": "short", "status": "closed", "entry_price": "3200", "exit_price": "3300", "pnl_pct": "-3.125", "opened_at": an_hour_ago, "closed_at": now }),
            json!({ "id": 1, "asset_id": "bitcoin", "direction": "long", "status": "closed", "entry_price": "60000", "exit_price": "63000", "pnl_pct": "5", "opened_at": an_hour_ago, "closed_at": now }),
            json!({ "id": 4, "asset_id": "bitcoin", "direction": "long", "status": "open", "entry_price": "64000", "opened_at": now }),
        ],
    );
    mock.set_rows(
        "trade_proposals",
        vec![
            json!({ "id": PENDING_BTC, "user_id": ALICE, "asset_id": "bitcoin", "side": "long", "proposed_size_usd": "500", "entry_price": "64000", "status": "pending", "expires_at": in_an_hour, "created_at": now }),
            json!({ "id": EXPIRED_ETH, "user_id": ALICE, "asset_id": "ethereum", "side": "short", "proposed_size_usd": "200", "entry_price": "3100", "status": "pending", "expires_at": an_hour_ago, "created_at": an_hour_ago }),
            json!({ "id": EXECUTED_BTC, "user_id": ALICE, "asset_id": "bitcoin", "side": "long", "proposed_size_usd": "100", "entry_price": "60000", "status": "executed", "created_at": an_hour_ago }),
            json!({ "id": PENDING_ETH, "user_id": ALICE, "asset_id": "ethereum", "side": "long", "proposed_size_usd": "5000", "entry_price": "3100", "status": "pending", "created_at": an_hour_ago }),
            json!({ "id": BOB_PENDING, "user_id": BOB, "asset_id": "bitcoin", "side": "long", "proposed_size_usd": "50", "entry_price": "64000", "status": "pending", "created_at": now }),
        ],
    );
    mock.set_rows(
        "wallets",
        vec![
            json!({ "user_id": ALICE, "address": "0xa11ce", "balance": "1000", "environment": "testnet" }),
        ],
    );
    mock.set_rows(
        "profiles",
        vec![
            json!({ "id": ALICE, "onboarding_completed": true }),
            json!({ "id": BOB, "onboarding_completed": false }),
            json!({ "id": CAROL, "onboarding_completed": true }),
        ],
    );

    let mut users = mock.users.lock().unwrap();
    users.insert(
        ALICE_TOKEN.into(),
        json!({ "id": ALICE, "email": "alice@example.com", "app_metadata": {} }),
    );
    users.insert(
        BOB_TOKEN.into(),
        json!({ "id": BOB, "email": "bob@example.com", "app_metadata": {} }),
    );
    users.insert(
        CAROL_TOKEN.into(),
        json!({ "id": CAROL, "email": "carol@example.com", "app_metadata": { "deactivated_at": an_hour_ago } }),
    );
}

/// Start the mock remote on an ephemeral port and return it with its base URL.
pub async fn spawn_mock_remote() -> (MockRemote, String) {
    let mock = MockRemote::default();
    seed(&mock);

    let app = Router::new()
        .route("/rest/v1/:table", get(rest_select).patch(rest_update))
        .route("/auth/v1/user", get(auth_user))
        .route("/auth/v1/admin/users/:id", put(admin_update_user))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock remote");
    let addr = listener.local_addr().expect("mock remote has no address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock remote failed");
    });

    (mock, format!("http://{addr}"))
}

// ---------------------------------------------------------------------------
// Application under test
// ---------------------------------------------------------------------------

pub fn test_config(supabase_url: &str) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        supabase_url: supabase_url.into(),
        supabase_service_key: "service-key".into(),
        supabase_timeout_secs: 5,
        dashboard_poll_interval_secs: 60,
        onboarding_reconcile_delay_ms: 200,
        track_record_position_size_usd: rust_decimal::Decimal::from(1000),
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mock: MockRemote,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn json(&self, method: &str, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let response = self.request(method, uri, token).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.state.ws_tx.subscribe()
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub async fn build_test_app() -> TestApp {
    let (mock, base_url) = spawn_mock_remote().await;
    let config = test_config(&base_url);
    let supabase = SupabaseClient::new(
        &config.supabase_url,
        &config.supabase_service_key,
        Duration::from_secs(5),
    )
    .unwrap();
    let (ws_tx, _) = broadcast::channel::<WsMessage>(16);

    let state = AppState {
        config,
        supabase,
        ws_tx,
        metrics_handle: vela::metrics::detached_handle(),
        dashboard: DashboardCache::new(),
        onboarding: OnboardingCache::new(),
        gates: Arc::new(GatePipeline::standard()),
    };

    TestApp {
        router: create_router(state.clone()),
        state,
        mock,
    }
}
