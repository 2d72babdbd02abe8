use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_user;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes: the gate endpoint resolves the token itself, if any.
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::render_metrics))
        .route("/api/session/gate", get(handlers::session::gate));

    let protected = Router::new()
        // Dashboard
        .route("/api/dashboard", get(handlers::dashboard::summary))
        .route("/api/dashboard/refresh", post(handlers::dashboard::refresh))
        // Assets + track record
        .route("/api/assets/:id", get(handlers::assets::detail))
        .route("/api/track-record", get(handlers::track_record::get))
        // Proposals
        .route("/api/proposals", get(handlers::proposals::list))
        .route("/api/proposals/pending", get(handlers::proposals::pending))
        .route("/api/proposals/:id/preflight", get(handlers::proposals::preflight))
        .route("/api/proposals/:id/accept", post(handlers::proposals::accept))
        .route("/api/proposals/:id/decline", post(handlers::proposals::decline))
        // Wallet + account
        .route("/api/wallet", get(handlers::wallet::get))
        .route("/api/onboarding/complete", post(handlers::session::complete_onboarding))
        .route("/api/account/reactivate", post(handlers::session::reactivate))
        .route("/api/session/logout", post(handlers::session::logout))
        // WebSocket
        .route("/ws", get(handlers::ws::handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_user));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
