//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use clientele_config::ConfigError;
use clientele_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to API at {url}")]
    #[diagnostic(
        code(clientele::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}\n\
             Override the address with --api-url or `clientele config init`."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(clientele::timeout),
        help("Increase the limit with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not signed in: {message}")]
    #[diagnostic(
        code(clientele::unauthenticated),
        help("Run: clientele login --profile {profile}")
    )]
    Unauthenticated { message: String, profile: String },

    #[error("{code}: {message}")]
    #[diagnostic(
        code(clientele::auth_failed),
        help("The server rejected the session. Run: clientele login")
    )]
    AuthFailed { code: String, message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(clientele::not_found),
        help("Run: clientele customers list to see available records")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({code}): {message}")]
    #[diagnostic(code(clientele::api_error))]
    ApiError {
        code: String,
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(clientele::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(clientele::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(clientele::config),
        help("Inspect it with: clientele config show")
    )]
    Config { message: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(clientele::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: clientele config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(clientele::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Unauthenticated { .. } => exit_code::AUTH,
            Self::AuthFailed { code, .. } if code == "Forbidden" => exit_code::PERMISSION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError {
                status: Some(409), ..
            } => exit_code::CONFLICT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile name to a missing-session error.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::Unauthenticated { message, .. } => Self::Unauthenticated {
                message,
                profile: name.to_owned(),
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if err.is_auth_failure() && !matches!(err, CoreError::Unauthenticated { .. }) {
            let (code, message) = err.notification_parts();
            return Self::AuthFailed { code, message };
        }
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,
            CoreError::Api {
                message,
                code,
                status,
            } => Self::ApiError {
                code: code
                    .or_else(|| status.map(|s| format!("HTTP {s}")))
                    .unwrap_or_else(|| "error".into()),
                message,
                status,
            },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                resource_type: entity_type,
                identifier,
            },
            CoreError::Unauthenticated { message } => Self::Unauthenticated {
                message,
                profile: "default".into(),
            },
            CoreError::Validation { errors } => {
                let field = errors
                    .keys()
                    .next()
                    .map_or_else(|| "input".to_owned(), |f| (*f).to_owned());
                let reason = errors
                    .iter()
                    .map(|(field, msg)| format!("{field}: {msg}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                Self::Validation { field, reason }
            }
            CoreError::UnknownField { field } => Self::Validation {
                field,
                reason: "not a field of this form".into(),
            },
            CoreError::Config { message } | CoreError::Storage { message } => {
                Self::Config { message }
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
