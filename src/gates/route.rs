use serde::{Deserialize, Serialize};
use std::fmt;

/// A dashboard screen, parsed from and printed as its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Route {
    Home,
    Asset(String),
    TrackRecord,
    Proposals,
    Onboarding,
    Login,
    Account,
    Terms,
    Privacy,
    Other(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = trimmed.trim_end_matches('/');

        match trimmed {
            "" => Route::Home,
            "/track-record" => Route::TrackRecord,
            "/proposals" => Route::Proposals,
            "/onboarding" => Route::Onboarding,
            "/login" => Route::Login,
            "/account" => Route::Account,
            "/terms" => Route::Terms,
            "/privacy" => Route::Privacy,
            other => match other.strip_prefix("/asset/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::Asset(id.to_string()),
                _ => Route::Other(other.to_string()),
            },
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Asset(id) => format!("/asset/{id}"),
            Route::TrackRecord => "/track-record".into(),
            Route::Proposals => "/proposals".into(),
            Route::Onboarding => "/onboarding".into(),
            Route::Login => "/login".into(),
            Route::Account => "/account".into(),
            Route::Terms => "/terms".into(),
            Route::Privacy => "/privacy".into(),
            Route::Other(path) => path.clone(),
        }
    }

    /// Routes reachable without signing in.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Login | Route::Terms | Route::Privacy)
    }
}

impl From<String> for Route {
    fn from(path: String) -> Self {
        Route::parse(&path)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.path()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
