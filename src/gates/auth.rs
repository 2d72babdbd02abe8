use super::{GateContext, GateDecision, Guard, Route};

/// Holds every route on a placeholder until the auth provider has answered,
/// then sends anonymous visitors of protected routes to the login screen.
pub struct AuthGate;

impl Guard for AuthGate {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn check(&self, ctx: &GateContext) -> GateDecision {
        if ctx.auth.is_loading {
            return GateDecision::Loading;
        }
        if !ctx.auth.is_authenticated && !ctx.route.is_public() {
            return GateDecision::Redirect(Route::Login);
        }
        GateDecision::Pass
    }
}
