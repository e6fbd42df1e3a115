//! # HTTP Transport
//!
//! [`PosClient`] wraps a `reqwest::Client` with the session, bearer auth and
//! the single refresh-and-retry on 401.
//!
//! ## Request Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Authenticated Request                            │
//! │                                                                         │
//! │   call ──► Bearer <access> ──► backend                                 │
//! │                                   │                                     │
//! │             ┌─────────────────────┼──────────────────────┐              │
//! │             ▼                     ▼                      ▼              │
//! │           2xx                   401                   other             │
//! │         decode JSON              │                  Api { status,       │
//! │                                  ▼                        message }     │
//! │                      refresh lock (one at a time)                       │
//! │                                  │                                      │
//! │              token already rotated by another call? ──yes──► retry      │
//! │                                  │ no                                   │
//! │                      POST api/token/refresh/                            │
//! │                        │                    │                           │
//! │                       ok                 rejected                       │
//! │                        │                    │                           │
//! │              store tokens, retry     clear session,                     │
//! │              ONCE (same request id)  Unauthorized                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutating calls carry `X-Request-Id` (UUID v4). The replay after a refresh
//! reuses the id so the backend can drop a duplicate.

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::SessionContext;
use crate::wire::{self, RefreshedToken};

/// Header carrying the idempotency key of a mutation.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

const REFRESH_PATH: &str = "api/token/refresh/";

/// One request, kept whole so it can be replayed after a refresh.
struct Prepared {
    method: Method,
    url: Url,
    body: Option<Value>,
    request_id: Option<Uuid>,
}

/// REST client for the POS backend.
pub struct PosClient {
    http: reqwest::Client,
    base: Url,
    session: Arc<SessionContext>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for PosClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PosClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl PosClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionContext>) -> ClientResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(concat!("tillpoint-desk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        let base = config.base_url()?;
        info!(base = %base, "POS client ready");
        Ok(PosClient {
            http,
            base,
            session,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub(crate) fn url(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<Url> {
        let mut url = self.base.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    /// Authenticated GET returning the parsed body.
    pub(crate) async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<Value> {
        let prepared = Prepared {
            method: Method::GET,
            url: self.url(path, query)?,
            body: None,
            request_id: None,
        };
        self.execute(prepared).await
    }

    /// Authenticated POST with a fresh request id. Returns the id with the body.
    pub(crate) async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<(Uuid, Value)> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::InvalidConfig(format!("unserializable body: {e}")))?;
        let request_id = Uuid::new_v4();
        let prepared = Prepared {
            method: Method::POST,
            url: self.url(path, &[])?,
            body: Some(body),
            request_id: Some(request_id),
        };
        let value = self.execute(prepared).await?;
        Ok((request_id, value))
    }

    /// Unauthenticated POST (login). A 401 here is bad credentials.
    pub(crate) async fn post_anonymous<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<Value> {
        let url = self.url(path, &[])?;
        let response = self.http.post(url).json(body).send().await?;
        read_body(path, response).await
    }

    // =========================================================================
    // Auth & Retry
    // =========================================================================

    async fn execute(&self, prepared: Prepared) -> ClientResult<Value> {
        let token = self
            .session
            .access_token()
            .await
            .ok_or(ClientError::NotLoggedIn)?;

        let response = self.send(&prepared, &token).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return read_body(prepared.url.path(), response).await;
        }

        debug!(path = prepared.url.path(), "Access token rejected, refreshing");
        let fresh = self.refresh(&token).await?;
        let retried = self.send(&prepared, &fresh).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            let body = retried.text().await.unwrap_or_default();
            let (message, _) = wire::error_message(&body);
            warn!(path = prepared.url.path(), "Still unauthorized after refresh");
            return Err(ClientError::Unauthorized(message));
        }
        read_body(prepared.url.path(), retried).await
    }

    async fn send(&self, prepared: &Prepared, token: &str) -> ClientResult<reqwest::Response> {
        debug!(method = %prepared.method, path = prepared.url.path(), "Sending request");
        let mut builder = self
            .http
            .request(prepared.method.clone(), prepared.url.clone())
            .bearer_auth(token);
        if let Some(id) = prepared.request_id {
            builder = builder.header(REQUEST_ID_HEADER, id.to_string());
        }
        if let Some(body) = &prepared.body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// `stale` is the token that just got a 401. If another call already
    /// replaced it while we waited for the lock, that token is used as is.
    async fn refresh(&self, stale: &str) -> ClientResult<String> {
        let _guard = self.refresh_lock.lock().await;

        // Double-check after acquiring the lock
        if let Some(current) = self.session.access_token().await {
            if current != stale {
                debug!("Token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let Some(refresh) = self.session.refresh_token().await else {
            self.session.clear().await?;
            return Err(ClientError::Unauthorized("Session expired".into()));
        };

        let url = self.url(REFRESH_PATH, &[])?;
        let response = self
            .http
            .post(url)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let (message, _) = wire::error_message(&body);
            warn!(status, "Token refresh rejected, clearing session");
            self.session.clear().await?;
            return Err(ClientError::Unauthorized(format!(
                "Session expired, please log in again ({message})"
            )));
        }

        let body = read_body(REFRESH_PATH, response).await?;
        let refreshed: RefreshedToken = serde_json::from_value(body)
            .map_err(|e| ClientError::decode("token refresh", e.to_string()))?;
        let access = refreshed.access.clone();
        self.session
            .set_tokens(refreshed.access, refreshed.refresh.unwrap_or(refresh))
            .await?;
        info!("Access token refreshed");
        Ok(access)
    }
}

/// Turns a response into JSON or a typed API error.
async fn read_body(path: &str, response: reqwest::Response) -> ClientResult<Value> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return serde_json::from_str(&text)
            .map_err(|e| ClientError::decode(path, format!("invalid JSON: {e}")));
    }

    let (message, detail) = wire::error_message(&text);
    debug!(path, status = status.as_u16(), %message, "Request failed");
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized(message));
    }
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_under_base_path() {
        let config = ClientConfig::with_base_url("https://pos.example.in/backend");
        let client = PosClient::new(&config, Arc::new(SessionContext::in_memory())).unwrap();

        let url = client
            .url("/api/pos/bills/search/", &[("q", "Asha K")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://pos.example.in/backend/api/pos/bills/search/?q=Asha+K"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ClientConfig::default();
        config.api.timeout_secs = 0;
        let err = PosClient::new(&config, Arc::new(SessionContext::in_memory())).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_requires_login() {
        let client = PosClient::new(
            &ClientConfig::default(),
            Arc::new(SessionContext::in_memory()),
        )
        .unwrap();
        let err = client.get_json("api/pos/racks/", &[]).await.unwrap_err();
        assert!(matches!(err, ClientError::NotLoggedIn));
    }
}
