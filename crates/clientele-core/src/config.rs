// ── Runtime client configuration ──
//
// Describes *how* to reach the customer API. Never touches disk: the CLI
// resolves profiles and hands a `ClientConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use clientele_api::transport::{TlsMode, TransportConfig};
use url::Url;

use crate::list::RefreshOrdering;

/// Where the reference server listens by default.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

/// Connection settings for one API server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:8080`.
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub refresh_ordering: RefreshOrdering,
}

impl ClientConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: None,
            refresh_ordering: RefreshOrdering::default(),
        }
    }

    /// Transport settings for the HTTP client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(Url::parse(DEFAULT_API_URL).expect("default API URL is valid"))
    }
}
