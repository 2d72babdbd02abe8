use super::{GateContext, GateDecision, Guard, OnboardingState, Route};

/// Sends signed-in users who have not finished onboarding to the onboarding
/// flow. While the onboarding lookup is unresolved it only ever answers
/// `Loading`.
pub struct OnboardingGate;

impl Guard for OnboardingGate {
    fn name(&self) -> &'static str {
        "onboarding"
    }

    fn check(&self, ctx: &GateContext) -> GateDecision {
        if !ctx.auth.is_authenticated {
            return GateDecision::Pass;
        }
        match ctx.onboarding {
            OnboardingState::Checking => GateDecision::Loading,
            OnboardingState::NotOnboarded if ctx.route != Route::Onboarding => {
                GateDecision::Redirect(Route::Onboarding)
            }
            OnboardingState::NotOnboarded | OnboardingState::Onboarded => GateDecision::Pass,
        }
    }
}
