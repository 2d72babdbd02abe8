pub mod dashboard_poller;
pub mod onboarding_cache;

pub use dashboard_poller::{refresh_dashboard, run_dashboard_poller, DashboardCache, DashboardSnapshot};
pub use onboarding_cache::OnboardingCache;
