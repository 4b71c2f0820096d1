// src/provider.rs
//
// Identity-provider token exchange. The caller hands us the OAuth2 access
// token it obtained client-side; we ask the provider who the token belongs
// to and hand back a normalized profile.
use reqwest::Client;
use serde::Deserialize;

use crate::error::AppError;

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const GITHUB_USER_URL: &str = "https://api.github.com/user";

/// Identity fields resolved from a provider, normalized across backends.
#[derive(Debug, Clone)]
pub struct SocialProfile {
    pub provider: String,
    pub subject: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

pub struct ProviderClient {
    http: Client,
}

impl Default for ProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Resolve `access_token` against the named provider's userinfo endpoint.
    pub async fn fetch_profile(
        &self,
        provider: &str,
        access_token: &str,
    ) -> Result<SocialProfile, AppError> {
        match provider {
            "google" => self.fetch_google(access_token).await,
            "github" => self.fetch_github(access_token).await,
            _ => Err(AppError::Auth {
                message: "Please provide a valid provider".to_string(),
                details: format!("unsupported provider: {provider}"),
            }),
        }
    }

    async fn fetch_google(&self, access_token: &str) -> Result<SocialProfile, AppError> {
        let response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(invalid_token(response.status()));
        }

        let info: GoogleUserInfo = response.json().await.map_err(transport_error)?;
        Ok(google_profile(info))
    }

    async fn fetch_github(&self, access_token: &str) -> Result<SocialProfile, AppError> {
        let response = self
            .http
            .get(GITHUB_USER_URL)
            .bearer_auth(access_token)
            // GitHub rejects requests without a user agent.
            .header(reqwest::header::USER_AGENT, "petition-backend")
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(invalid_token(response.status()));
        }

        let user: GithubUser = response.json().await.map_err(transport_error)?;
        Ok(github_profile(user))
    }
}

fn google_profile(info: GoogleUserInfo) -> SocialProfile {
    // Google has no username; fall back to the mailbox name.
    let username = info
        .email
        .split('@')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(&info.sub)
        .to_string();
    SocialProfile {
        provider: "google".to_string(),
        subject: info.sub,
        username,
        email: info.email,
        first_name: info.given_name,
        last_name: info.family_name,
    }
}

fn github_profile(user: GithubUser) -> SocialProfile {
    let (first_name, last_name) = split_name(user.name.as_deref().unwrap_or(""));
    SocialProfile {
        provider: "github".to_string(),
        subject: user.id.to_string(),
        username: user.login,
        email: user.email.unwrap_or_default(),
        first_name,
        last_name,
    }
}

fn split_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.to_string()),
        None => (name.to_string(), String::new()),
    }
}

fn invalid_token(status: reqwest::StatusCode) -> AppError {
    AppError::Auth {
        message: "Invalid token".to_string(),
        details: format!("provider returned {status}"),
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    AppError::Auth {
        message: "Invalid credentials".to_string(),
        details: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_provider_is_rejected() {
        let client = ProviderClient::new();
        let err = client.fetch_profile("myspace", "token").await.unwrap_err();
        match err {
            AppError::Auth { message, .. } => {
                assert_eq!(message, "Please provide a valid provider");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn google_profile_uses_mailbox_name() {
        let info: GoogleUserInfo = serde_json::from_value(serde_json::json!({
            "sub": "10769150350006150715113082367",
            "email": "ann.smith@example.org",
            "given_name": "Ann",
            "family_name": "Smith",
        }))
        .unwrap();

        let profile = google_profile(info);
        assert_eq!(profile.username, "ann.smith");
        assert_eq!(profile.first_name, "Ann");
        assert_eq!(profile.last_name, "Smith");
        assert_eq!(profile.provider, "google");
    }

    #[test]
    fn github_profile_splits_display_name() {
        let user: GithubUser = serde_json::from_value(serde_json::json!({
            "id": 583231,
            "login": "annsmith",
            "name": "Ann Smith",
            "email": null,
        }))
        .unwrap();

        let profile = github_profile(user);
        assert_eq!(profile.subject, "583231");
        assert_eq!(profile.username, "annsmith");
        assert_eq!(profile.first_name, "Ann");
        assert_eq!(profile.last_name, "Smith");
        assert_eq!(profile.email, "");
    }
}
