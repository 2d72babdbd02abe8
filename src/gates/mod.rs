//! Route gates.
//!
//! Every route render passes through an ordered list of guards. Each guard
//! either lets the request through or replaces the requested screen with a
//! fallback: a loading placeholder, a redirect, or a forced screen. The first
//! guard that does not pass decides the outcome, so the order of the list is
//! the precedence between gates.

pub mod auth;
pub mod deactivation;
pub mod onboarding;
pub mod route;

pub use auth::AuthGate;
pub use deactivation::DeactivationGate;
pub use onboarding::OnboardingGate;
pub use route::Route;

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// The signed-in user as far as the gates care.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub deactivated_at: Option<DateTime<Utc>>,
}

/// Snapshot of the auth provider's state.
#[derive(Debug, Clone, Serialize)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub user: Option<SessionUser>,
}

impl AuthState {
    pub fn loading() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
            user: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            is_loading: false,
            user: None,
        }
    }

    pub fn signed_in(user: SessionUser) -> Self {
        Self {
            is_authenticated: true,
            is_loading: false,
            user: Some(user),
        }
    }
}

/// Result of the onboarding lookup for the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingState {
    /// Lookup still in flight or failed; no decision can be made yet.
    Checking,
    Onboarded,
    NotOnboarded,
}

impl From<bool> for OnboardingState {
    fn from(onboarded: bool) -> Self {
        if onboarded {
            OnboardingState::Onboarded
        } else {
            OnboardingState::NotOnboarded
        }
    }
}

#[derive(Debug, Clone)]
pub struct GateContext {
    pub route: Route,
    pub auth: AuthState,
    pub onboarding: OnboardingState,
}

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Screens a gate can force regardless of the requested route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Reactivation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Loading,
    Redirect(Route),
    Render(Screen),
}

/// What the dashboard should do for the requested route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    Proceed { route: Route },
    Loading { gate: &'static str },
    Redirect { gate: &'static str, to: Route },
    Render { gate: &'static str, screen: Screen },
}

impl GateOutcome {
    pub fn kind(&self) -> &'static str {
        match self {
            GateOutcome::Proceed { .. } => "proceed",
            GateOutcome::Loading { .. } => "loading",
            GateOutcome::Redirect { .. } => "redirect",
            GateOutcome::Render { .. } => "render",
        }
    }
}

// ---------------------------------------------------------------------------
// Guard + pipeline
// ---------------------------------------------------------------------------

pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &GateContext) -> GateDecision;
}

pub struct GatePipeline {
    guards: Vec<Box<dyn Guard>>,
}

impl GatePipeline {
    pub fn new() -> Self {
        Self { guards: Vec::new() }
    }

    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    /// Auth first, then deactivation, then onboarding. Deactivation sits
    /// ahead of onboarding so a deactivated account always lands on the
    /// reactivation screen, onboarded or not.
    pub fn standard() -> Self {
        Self::new()
            .with(AuthGate)
            .with(DeactivationGate)
            .with(OnboardingGate)
    }

    pub fn evaluate(&self, ctx: &GateContext) -> GateOutcome {
        for guard in &self.guards {
            let gate = guard.name();
            match guard.check(ctx) {
                GateDecision::Pass => continue,
                GateDecision::Loading => return GateOutcome::Loading { gate },
                GateDecision::Redirect(to) => return GateOutcome::Redirect { gate, to },
                GateDecision::Render(screen) => return GateOutcome::Render { gate, screen },
            }
        }
        GateOutcome::Proceed {
            route: ctx.route.clone(),
        }
    }
}

impl Default for GatePipeline {
    fn default() -> Self {
        Self::standard()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn user(deactivated: bool) -> SessionUser {
        SessionUser {
            id: "user-1".into(),
            deactivated_at: deactivated.then(Utc::now),
        }
    }

    fn ctx(route: &str, auth: AuthState, onboarding: OnboardingState) -> GateContext {
        GateContext {
            route: Route::parse(route),
            auth,
            onboarding,
        }
    }

    #[test]
    fn test_active_onboarded_user_proceeds() {
        let outcome = GatePipeline::standard().evaluate(&ctx(
            "/asset/bitcoin",
            AuthState::signed_in(user(false)),
            OnboardingState::Onboarded,
        ));
        assert_eq!(
            outcome,
            GateOutcome::Proceed {
                route: Route::Asset("bitcoin".into())
            }
        );
    }

    #[test]
    fn test_auth_loading_wins_over_everything() {
        let outcome = GatePipeline::standard().evaluate(&ctx(
            "/",
            AuthState::loading(),
            OnboardingState::NotOnboarded,
        ));
        assert_eq!(outcome, GateOutcome::Loading { gate: "auth" });
    }

    #[test]
    fn test_onboarding_checking_never_redirects() {
        for path in ["/", "/asset/bitcoin", "/track-record", "/onboarding"] {
            let outcome = GatePipeline::standard().evaluate(&ctx(
                path,
                AuthState::signed_in(user(false)),
                OnboardingState::Checking,
            ));
            assert_eq!(outcome, GateOutcome::Loading { gate: "onboarding" }, "path {path}");
        }
    }

    #[test]
    fn test_deactivation_overrides_every_route() {
        for path in ["/", "/asset/bitcoin", "/onboarding", "/account", "/unknown"] {
            for onboarding in [
                OnboardingState::Onboarded,
                OnboardingState::NotOnboarded,
                OnboardingState::Checking,
            ] {
                let outcome = GatePipeline::standard().evaluate(&ctx(
                    path,
                    AuthState::signed_in(user(true)),
                    onboarding,
                ));
                assert_eq!(
                    outcome,
                    GateOutcome::Render {
                        gate: "deactivation",
                        screen: Screen::Reactivation
                    },
                    "path {path}, onboarding {onboarding:?}"
                );
            }
        }
    }

    #[test]
    fn test_custom_pipeline_order_is_respected() {
        let pipeline = GatePipeline::new().with(OnboardingGate).with(DeactivationGate);
        let outcome = pipeline.evaluate(&ctx(
            "/",
            AuthState::signed_in(user(true)),
            OnboardingState::NotOnboarded,
        ));
        assert_eq!(
            outcome,
            GateOutcome::Redirect {
                gate: "onboarding",
                to: Route::Onboarding
            }
        );
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = GateOutcome::Redirect {
            gate: "onboarding",
            to: Route::Onboarding,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "redirect");
        assert_eq!(json["to"], "/onboarding");
    }
}
