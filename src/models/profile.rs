use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity returned by the auth provider for a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub app_metadata: AppMetadata,
}

/// Server-controlled metadata attached to the auth user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Set when the account was deactivated; cleared on reactivation.
    #[serde(default)]
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    pub fn deactivated_at(&self) -> Option<DateTime<Utc>> {
        self.app_metadata.deactivated_at
    }
}

/// Row of the `profiles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub onboarding_completed: bool,
}
