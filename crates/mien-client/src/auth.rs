//! Auth provider client and persisted admin session.
//!
//! Admin operations gate on a provider-issued session: email/password
//! sign-in yields a bearer token that is persisted under the user's data
//! directory and attached to REST calls until sign-out or expiry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid auth URL: {0}")]
    BadUrl(#[from] url::ParseError),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("auth endpoint returned HTTP {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("could not access stored auth session: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored auth session is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A provider-issued admin session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub email: String,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Where the session is persisted:
    /// `$XDG_DATA_HOME/mien/auth.json` (or `~/.local/share/mien/auth.json`).
    pub fn store_path() -> PathBuf {
        std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("mien")
            .join("auth.json")
    }

    /// Persist this session for later invocations.
    pub fn save(&self) -> Result<(), AuthError> {
        let path = Self::store_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, serde_json::to_vec_pretty(self)?)?;
        tracing::debug!(path = %path.display(), "auth session saved");
        Ok(())
    }

    /// Load the persisted session, if any. An expired session reads as
    /// absent; the stale file is left for the next sign-in to overwrite.
    pub fn load() -> Result<Option<AuthSession>, AuthError> {
        let path = Self::store_path();
        if !path.exists() {
            return Ok(None);
        }
        let session: AuthSession = serde_json::from_slice(&std::fs::read(&path)?)?;
        if session.is_expired() {
            tracing::debug!(email = %session.email, "stored auth session has expired");
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Forget the persisted session.
    pub fn sign_out() -> Result<(), AuthError> {
        let path = Self::store_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    email: &'a str,
    password: &'a str,
    grant_type: &'static str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Token lifetime in seconds.
    expires_in: i64,
}

/// Client for the auth provider's password grant endpoint.
pub struct AuthClient {
    http: reqwest::Client,
    token_url: Url,
}

impl AuthClient {
    pub fn new(auth_url: &str) -> Result<Self, AuthError> {
        let normalized = if auth_url.ends_with('/') {
            auth_url.to_string()
        } else {
            format!("{auth_url}/")
        };
        Ok(Self {
            http: reqwest::Client::new(),
            token_url: Url::parse(&normalized)?.join("token")?,
        })
    }

    /// Exchange email/password for a bearer session.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let resp = self
            .http
            .post(self.token_url.clone())
            .json(&TokenRequest {
                email,
                password,
                grant_type: "password",
            })
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(AuthError::Status(status.as_u16()));
        }

        let token: TokenResponse = resp.json().await?;
        tracing::info!(email, "signed in");
        Ok(AuthSession {
            email: email.to_string(),
            access_token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_check() {
        let live = AuthSession {
            email: "admin@example.com".into(),
            access_token: "t".into(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(!live.is_expired());

        let stale = AuthSession {
            expires_at: Utc::now() - Duration::seconds(1),
            ..live
        };
        assert!(stale.is_expired());
    }

    #[test]
    fn test_token_url() {
        let client = AuthClient::new("http://localhost:8000/auth").unwrap();
        assert_eq!(client.token_url.as_str(), "http://localhost:8000/auth/token");
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let session = AuthSession {
            email: "admin@example.com".into(),
            access_token: "secret".into(),
            expires_at: Utc::now() + Duration::hours(2),
        };
        let bytes = serde_json::to_vec(&session).unwrap();
        let back: AuthSession = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.email, session.email);
        assert_eq!(back.access_token, session.access_token);
        assert_eq!(back.expires_at, session.expires_at);
    }
}
