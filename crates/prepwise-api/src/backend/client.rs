// Portal backend HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer-token injection,
// and `{ data, message }` envelope unwrapping. Endpoint groups (auth,
// alerts, contacts, system) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::sync::RwLock;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::backend::models::Envelope;
use crate::error::{Error, preview};
use crate::transport::TransportConfig;

/// Raw HTTP client for the portal's REST backend.
///
/// Every response is wrapped as `{ "data": ..., "message": ... }`. All
/// methods return the unwrapped `data` payload; `message` is surfaced in
/// errors when the status is not a success.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    /// Bearer token from `POST /auth/login`. Attached to every request
    /// once set.
    token: RwLock<Option<SecretString>>,
    timeout_secs: u64,
}

impl BackendClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `http://localhost:5000/api`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            token: RwLock::new(None),
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
            timeout_secs: 0,
        }
    }

    /// The API root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token management ─────────────────────────────────────────────

    /// Attach a bearer token to all subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        debug!("storing bearer token");
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    /// Drop the bearer token.
    pub fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    /// Whether a bearer token is attached.
    pub fn has_token(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    fn apply_token(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().expect("token lock poisoned");
        match guard.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request with query parameters and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);
        let builder = self.apply_token(self.http.get(url).query(query));
        let resp = self.send(builder).await?;
        Self::parse_envelope(resp).await
    }

    /// Send a POST request with a JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);
        let builder = self.apply_token(self.http.post(url).json(body));
        let resp = self.send(builder).await?;
        Self::parse_envelope(resp).await
    }

    /// Send a PUT request with a JSON body and unwrap the envelope.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("PUT {}", url);
        let builder = self.apply_token(self.http.put(url).json(body));
        let resp = self.send(builder).await?;
        Self::parse_envelope(resp).await
    }

    /// Send a DELETE request and unwrap the envelope.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("DELETE {}", url);
        let builder = self.apply_token(self.http.delete(url));
        let resp = self.send(builder).await?;
        Self::parse_envelope(resp).await
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                Error::Transport(e)
            }
        })
    }

    /// Map the status code, then parse the `{ data, message }` envelope.
    async fn parse_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let status = resp.status();
        let path = resp.url().path().to_owned();
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(%status, bytes = body.len(), "backend response");

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|env| env.message)
                .unwrap_or_else(|| preview(&body));

            return Err(match status {
                StatusCode::UNAUTHORIZED => Error::Authentication { message },
                StatusCode::FORBIDDEN => Error::Forbidden { message },
                StatusCode::NOT_FOUND => Error::NotFound { path },
                _ => Error::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            }
        })?;

        Ok(envelope.data)
    }
}
