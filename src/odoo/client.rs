//! JSON-RPC client for the Odoo ERP.
//!
//! Every operation is an authenticate-then-call pair against
//! `web/session/authenticate` and `web/dataset/call_kw`. A session cache
//! keyed by (base_url, username) can be enabled through
//! `OdooConfig::session_ttl`; without it the client authenticates per
//! operation, matching the behavior of the integration this replaces.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use reqwest::header::SET_COOKIE;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::OdooConfig;

#[derive(Debug, Error)]
pub enum OdooError {
    /// The authenticate response carried no user id.
    #[error("odoo authentication failed: {0}")]
    Auth(String),

    /// The remote call reported an error field.
    #[error("odoo remote error: {0}")]
    Remote(String),

    #[error("odoo transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response was 2xx but not shaped like a JSON-RPC result.
    #[error("unexpected odoo response: {0}")]
    Decode(String),
}

/// Opaque authenticated session: the cookie pair to replay plus the user id
/// the ERP resolved the login to.
#[derive(Debug, Clone)]
pub struct OdooSession {
    pub cookie: String,
    pub uid: i64,
}

struct CachedSession {
    session: OdooSession,
    expires_at: Instant,
}

pub struct OdooClient {
    http: reqwest::Client,
    config: OdooConfig,
    sessions: DashMap<String, CachedSession>,
    rpc_id: AtomicU64,
}

impl OdooClient {
    pub fn new(config: OdooConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("approval-gateway/0.1")
            .build()
            .expect("failed to build Odoo HTTP client");
        Self {
            http,
            config,
            sessions: DashMap::new(),
            rpc_id: AtomicU64::new(1),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn next_id(&self) -> u64 {
        self.rpc_id.fetch_add(1, Ordering::Relaxed)
    }

    fn cache_key(&self) -> String {
        format!("{}|{}", self.config.base_url, self.config.username)
    }

    /// Returns an authenticated session, reusing a cached one when a TTL is
    /// configured and the cached entry is still fresh.
    pub async fn session(&self) -> Result<OdooSession, OdooError> {
        let Some(ttl) = self.config.session_ttl else {
            return self.authenticate().await;
        };

        let key = self.cache_key();
        if let Some(cached) = self.sessions.get(&key) {
            if cached.expires_at > Instant::now() {
                return Ok(cached.session.clone());
            }
        }

        let session = self.authenticate().await?;
        self.sessions.insert(
            key,
            CachedSession {
                session: session.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(session)
    }

    /// One session/credential exchange. Fails with `Auth` when the response
    /// lacks a user identifier.
    pub async fn authenticate(&self) -> Result<OdooSession, OdooError> {
        let envelope = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {
                "db": self.config.database,
                "login": self.config.username,
                "password": self.config.password,
            },
            "id": self.next_id(),
        });

        let response = self
            .http
            .post(self.endpoint("web/session/authenticate"))
            .json(&envelope)
            .send()
            .await?;

        // The session credential rides on Set-Cookie; keep the name=value
        // pair and drop the attributes.
        let cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_default();

        let body: Value = response.json().await?;
        let uid = body
            .get("result")
            .and_then(|r| r.get("uid"))
            .and_then(Value::as_i64)
            .ok_or_else(|| OdooError::Auth(format!("no uid in response: {body}")))?;

        tracing::debug!(uid, "odoo session established");
        Ok(OdooSession { cookie, uid })
    }

    /// Generic remote-procedure invocation against a named model.
    pub async fn call(
        &self,
        session: &OdooSession,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, OdooError> {
        let envelope = json!({
            "jsonrpc": "2.0",
            "method": "call",
            "params": {
                "model": model,
                "method": method,
                "args": args,
                "kwargs": kwargs,
            },
            "id": self.next_id(),
        });

        let mut request = self
            .http
            .post(self.endpoint("web/dataset/call_kw"))
            .json(&envelope);
        if !session.cookie.is_empty() {
            request = request.header("Cookie", &session.cookie);
        }

        let mut body: Value = request.send().await?.json().await?;

        if let Some(error) = body.get("error") {
            let message = error
                .pointer("/data/message")
                .or_else(|| error.get("message"))
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| error.to_string());
            return Err(OdooError::Remote(message));
        }

        Ok(body
            .get_mut("result")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// `create` on a model; returns the ERP-assigned record id.
    pub async fn create(
        &self,
        session: &OdooSession,
        model: &str,
        values: Value,
    ) -> Result<i64, OdooError> {
        let result = self
            .call(session, model, "create", json!([values]), json!({}))
            .await?;
        result
            .as_i64()
            .ok_or_else(|| OdooError::Decode(format!("create returned non-id result: {result}")))
    }

    /// `search_read` on a model with a domain filter, a field list, and a
    /// result limit.
    pub async fn search_read(
        &self,
        session: &OdooSession,
        model: &str,
        domain: Value,
        fields: &[&str],
        limit: u32,
    ) -> Result<Vec<Value>, OdooError> {
        let result = self
            .call(
                session,
                model,
                "search_read",
                json!([domain, fields]),
                json!({ "limit": limit }),
            )
            .await?;
        match result {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            other => Err(OdooError::Decode(format!(
                "search_read returned non-array result: {other}"
            ))),
        }
    }

}

/// Config helper for tests and local tools: short timeout, no session cache.
pub fn ephemeral_config(base_url: &str) -> OdooConfig {
    OdooConfig {
        base_url: base_url.to_string(),
        database: "odoo".into(),
        username: "admin".into(),
        password: "admin".into(),
        timeout: Duration::from_secs(5),
        session_ttl: None,
    }
}
