use super::{GateContext, GateDecision, Guard, Screen};

/// Forces the reactivation screen for a deactivated account on every route.
pub struct DeactivationGate;

impl Guard for DeactivationGate {
    fn name(&self) -> &'static str {
        "deactivation"
    }

    fn check(&self, ctx: &GateContext) -> GateDecision {
        let deactivated = ctx
            .auth
            .user
            .as_ref()
            .is_some_and(|user| user.deactivated_at.is_some());

        if ctx.auth.is_authenticated && deactivated {
            GateDecision::Render(Screen::Reactivation)
        } else {
            GateDecision::Pass
        }
    }
}
