//! REST client for the session storage API.
//!
//! The backend exposes a small collection API: the full session list (no
//! pagination, no server-side filtering), per-session measurement
//! history, soft delete into a trash collection, and restore. Failures
//! are surfaced once and never retried.

use mien_core::{Session, SessionDetail};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid endpoint URL: {0}")]
    BadUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Client for the session storage REST API.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl RestClient {
    /// Build a client for the given base URL (e.g., "http://localhost:8000").
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        // A trailing slash keeps Url::join appending instead of replacing
        // the last path segment.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(&normalized)?,
            token: None,
        })
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// All stored sessions, newest first as the backend orders them.
    pub async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        self.get_json("api/sessions").await
    }

    /// One session plus its full measurement history.
    pub async fn session_detail(&self, id: i64) -> Result<SessionDetail, ApiError> {
        self.get_json(&format!("api/sessions/{id}")).await
    }

    /// Soft-delete a session into the trash collection.
    pub async fn delete_session(&self, id: i64) -> Result<(), ApiError> {
        let url = self.base_url.join(&format!("api/sessions/{id}"))?;
        let resp = self.request(self.http.delete(url.clone())).send().await?;
        self.check(resp, url.path()).await?;
        tracing::info!(session = id, "session deleted");
        Ok(())
    }

    /// Restore a session from the trash.
    pub async fn restore_session(&self, id: i64) -> Result<(), ApiError> {
        let url = self.base_url.join(&format!("api/sessions/{id}/restore"))?;
        let resp = self.request(self.http.post(url.clone())).send().await?;
        self.check(resp, url.path()).await?;
        tracing::info!(session = id, "session restored");
        Ok(())
    }

    /// Sessions currently in the trash.
    pub async fn list_trash(&self) -> Result<Vec<Session>, ApiError> {
        self.get_json("api/trash").await
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.base_url.join(path)?;
        let resp = self.request(self.http.get(url.clone())).send().await?;
        let resp = self.check(resp, url.path()).await?;
        Ok(resp.json().await?)
    }

    async fn check(
        &self,
        resp: reqwest::Response,
        path: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            body: resp.text().await.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_join_appends() {
        let client = RestClient::new("http://localhost:8000").unwrap();
        let url = client.base_url.join("api/sessions").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/sessions");
    }

    #[test]
    fn test_base_url_with_prefix_keeps_prefix() {
        let client = RestClient::new("http://host/backend").unwrap();
        let url = client.base_url.join("api/trash").unwrap();
        assert_eq!(url.as_str(), "http://host/backend/api/trash");
    }

    #[test]
    fn test_bad_url_rejected() {
        assert!(matches!(
            RestClient::new("not a url"),
            Err(ApiError::BadUrl(_))
        ));
    }
}
