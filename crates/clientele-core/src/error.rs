// ── Core error types ──
//
// User-facing errors from clientele-core. Server failures keep the
// server's own error code and message; transport failures are folded
// into connection / timeout variants. The `From<clientele_api::Error>`
// impl does the translation.

use thiserror::Error;

use crate::session::TokenError;
use crate::validate::FieldErrors;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Server errors ────────────────────────────────────────────────
    #[error("{}", api_display(code.as_deref(), message))]
    Api {
        message: String,
        /// The server's error code (the body's `error` field).
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Session errors ───────────────────────────────────────────────
    #[error("Not signed in: {message}")]
    Unauthenticated { message: String },

    #[error("Invalid access token: {0}")]
    Token(#[from] TokenError),

    #[error("Token storage failed: {message}")]
    Storage { message: String },

    // ── Form errors ──────────────────────────────────────────────────
    #[error("Validation failed: {}", summarize(errors))]
    Validation { errors: FieldErrors },

    #[error("Unknown form field: {field}")]
    UnknownField { field: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Title and description for an error notification.
    ///
    /// Server errors use the server's code and message verbatim.
    pub fn notification_parts(&self) -> (String, String) {
        match self {
            Self::Api { message, code, status } => {
                let title = code
                    .clone()
                    .or_else(|| status.map(|s| format!("HTTP {s}")))
                    .unwrap_or_else(|| "Request failed".into());
                (title, message.clone())
            }
            Self::ConnectionFailed { .. } | Self::Timeout => {
                ("Connection error".into(), self.to_string())
            }
            Self::Unauthenticated { message } => ("Unauthorized".into(), message.clone()),
            other => ("Error".into(), other.to_string()),
        }
    }

    /// Whether the server rejected the session's token.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated { .. }
                | Self::Token(_)
                | Self::Api {
                    status: Some(401 | 403),
                    ..
                }
        )
    }
}

fn api_display(code: Option<&str>, message: &str) -> String {
    match code {
        Some(code) => format!("{code}: {message}"),
        None => message.to_owned(),
    }
}

fn summarize(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, msg)| format!("{field}: {msg}"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<clientele_api::Error> for CoreError {
    fn from(err: clientele_api::Error) -> Self {
        match err {
            clientele_api::Error::Api {
                status,
                error,
                message,
                path: _,
            } => Self::Api {
                message,
                code: error,
                status: Some(status),
            },
            clientele_api::Error::MissingToken => Self::Unauthenticated {
                message: "server response did not include an access token".into(),
            },
            clientele_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    Self::Timeout
                } else if e.is_connect() {
                    Self::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    Self::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            clientele_api::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            clientele_api::Error::Tls(msg) => Self::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            clientele_api::Error::Deserialization { message, body: _ } => {
                Self::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
