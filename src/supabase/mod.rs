pub mod auth;
pub mod client;

pub use client::SupabaseClient;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("remote service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("proposal is no longer pending")]
    NotPending,
}

impl SupabaseError {
    /// Message safe to show next to the control that triggered the call.
    pub fn user_message(&self) -> String {
        match self {
            SupabaseError::NotPending => {
                "This proposal has already been handled or has expired.".into()
            }
            SupabaseError::Status { status, .. } if *status == 401 || *status == 403 => {
                "You are not allowed to do that.".into()
            }
            _ => "The trading service is unavailable. Please try again.".into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SupabaseError::Status { status, .. } if *status == 401 || *status == 403)
    }
}
