use serde_json::json;

use super::{SupabaseClient, SupabaseError};
use crate::models::AuthUser;

impl SupabaseClient {
    /// Resolve a caller's access token to a user through the auth provider.
    ///
    /// `Ok(None)` means the provider answered and rejected the token; an
    /// `Err` means no answer could be obtained.
    pub async fn get_user(&self, access_token: &str) -> Result<Option<AuthUser>, SupabaseError> {
        let url = format!("{}/auth/v1/user", self.base_url());
        let resp = self
            .http()
            .get(&url)
            .header("apikey", self.api_key())
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SupabaseError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let user: AuthUser = resp.json().await?;
        Ok(Some(user))
    }

    /// Clear the deactivation marker on the auth user (admin endpoint,
    /// service key).
    pub async fn reactivate(&self, user_id: &str) -> Result<(), SupabaseError> {
        let url = format!("{}/auth/v1/admin/users/{}", self.base_url(), user_id);
        let resp = self
            .http()
            .put(&url)
            .header("apikey", self.api_key())
            .header("Authorization", format!("Bearer {}", self.api_key()))
            .json(&json!({ "app_metadata": { "deactivated_at": null } }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SupabaseError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(user_id, "Account reactivated");
        Ok(())
    }
}
