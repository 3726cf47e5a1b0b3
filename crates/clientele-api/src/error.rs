use thiserror::Error;

/// Top-level error type for the `clientele-api` crate.
///
/// Server-side failures are carried verbatim in [`Error::Api`]: the HTTP
/// status plus the `error` / `message` fields of the JSON error body.
/// `clientele-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Server ──────────────────────────────────────────────────────
    /// Structured error returned by the API.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        /// Short error code or reason phrase (the body's `error` field).
        error: Option<String>,
        message: String,
        /// Request path echoed back by the server, when present.
        path: Option<String>,
    },

    /// A response that should carry an access token did not.
    #[error("Response did not include an access token")]
    MissingToken,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the server rejected the bearer token (or its absence).
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the server's error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of the failed request, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> Error {
        Error::Api {
            status,
            error: Some("Forbidden".into()),
            message: "Access Denied".into(),
            path: None,
        }
    }

    #[test]
    fn auth_expired_on_401_and_403() {
        assert!(api(401).is_auth_expired());
        assert!(api(403).is_auth_expired());
        assert!(!api(400).is_auth_expired());
        assert!(!Error::MissingToken.is_auth_expired());
    }

    #[test]
    fn not_found_and_code() {
        assert!(api(404).is_not_found());
        assert!(!api(500).is_not_found());
        assert_eq!(api(403).api_error_code(), Some("Forbidden"));
        assert_eq!(api(403).status(), Some(403));
    }

    #[test]
    fn display_carries_server_message() {
        assert_eq!(api(403).to_string(), "API error (HTTP 403): Access Denied");
    }
}
