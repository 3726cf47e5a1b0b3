// Customer API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer token injection,
// and structured error extraction. Endpoint methods live in `customers`
// and `auth` as inherent impls to keep this module on transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::header::{AUTHORIZATION, HeaderMap};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Versioned API root, relative to the configured base URL.
pub(crate) const API_PREFIX: &str = "api/v1";

const BEARER: &str = "Bearer ";

/// HTTP client for the customer API.
///
/// Holds at most one bearer token, attached to every request while set.
/// No retries, no batching: each endpoint method issues exactly one request.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the server root (e.g. `http://localhost:8080`); the
    /// `/api/v1` prefix is appended per request.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token management ─────────────────────────────────────────────

    /// Replace (or clear) the bearer token attached to requests.
    pub fn set_token(&self, token: Option<SecretString>) {
        debug!(present = token.is_some(), "updating bearer token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Whether a bearer token is currently held.
    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Apply the stored token to a request builder.
    fn apply_token(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => builder.header(AUTHORIZATION, bearer_value(token.expose_secret())),
            None => builder,
        }
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL: `{base}/api/v1/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{API_PREFIX}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.apply_token(self.http.get(url)).send().await?;
        let resp = check_status(resp).await?;
        decode_json(resp).await
    }

    /// Send a POST request with a JSON body, returning the raw response.
    pub(crate) async fn post(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<reqwest::Response, Error> {
        debug!("POST {}", url);
        let resp = self.apply_token(self.http.post(url).json(body)).send().await?;
        check_status(resp).await
    }

    /// Send a PUT request with a JSON body, returning the raw response.
    pub(crate) async fn put(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<reqwest::Response, Error> {
        debug!("PUT {}", url);
        let resp = self.apply_token(self.http.put(url).json(body)).send().await?;
        check_status(resp).await
    }

    /// Send a DELETE request, returning the raw response.
    pub(crate) async fn delete(&self, url: Url) -> Result<reqwest::Response, Error> {
        debug!("DELETE {}", url);
        let resp = self.apply_token(self.http.delete(url)).send().await?;
        check_status(resp).await
    }
}

// ── Response helpers ─────────────────────────────────────────────────

/// Format an `Authorization` header value, tolerating tokens that were
/// stored with their scheme already attached.
pub(crate) fn bearer_value(token: &str) -> String {
    if token.starts_with(BEARER) {
        token.to_owned()
    } else {
        format!("{BEARER}{token}")
    }
}

/// Read a token out of the `Authorization` response header, stripping
/// any `Bearer ` scheme.
pub(crate) fn token_from_headers(headers: &HeaderMap) -> Option<SecretString> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = raw.strip_prefix(BEARER).unwrap_or(raw);
    if token.is_empty() {
        return None;
    }
    trace!("access token found in response headers");
    Some(SecretString::from(token.to_owned()))
}

/// Turn a non-2xx response into `Error::Api`, passing the server's
/// `error` / `message` fields through unchanged.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed.message.filter(|m| !m.is_empty()).unwrap_or_else(|| {
        if body.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_owned()
        } else {
            preview(&body).to_owned()
        }
    });
    let error = parsed
        .error
        .or_else(|| status.canonical_reason().map(str::to_owned));

    debug!(status = status.as_u16(), ?error, "request failed");
    Err(Error::Api {
        status: status.as_u16(),
        error,
        message,
        path: parsed.path,
    })
}

/// Decode a JSON body, keeping the raw text on failure.
pub(crate) async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

/// First 200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.get(..end).unwrap_or(body)
}
