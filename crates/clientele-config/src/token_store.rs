// ── Durable token stores ──
//
// Per-profile persistence for the session's bearer token. The file store
// keeps `<data_dir>/<profile>/access_token`; the keyring store keeps the
// same key under the `clientele` service.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use clientele_core::{CoreError, TOKEN_KEY, TokenStore};

use crate::TokenStoreKind;

/// Keyring service name for stored tokens.
pub const KEYRING_SERVICE: &str = "clientele";

fn storage_error(action: &str, err: impl std::fmt::Display) -> CoreError {
    CoreError::Storage {
        message: format!("{action}: {err}"),
    }
}

// ── File store ──────────────────────────────────────────────────────

/// Token kept in a plain file, readable only by the owner on unix.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store for `profile` rooted at `data_dir`.
    pub fn new(data_dir: &Path, profile: &str) -> Self {
        Self {
            path: data_dir.join(profile).join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(token.to_owned())))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("reading token file", e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| storage_error("creating token dir", e))?;
        }
        std::fs::write(&self.path, token.expose_secret())
            .map_err(|e| storage_error("writing token file", e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| storage_error("restricting token file", e))?;
        }

        debug!(path = %self.path.display(), "token saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("removing token file", e)),
        }
    }
}

// ── Keyring store ───────────────────────────────────────────────────

/// Token kept in the OS keyring under `<profile>/access_token`.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    profile: String,
}

impl KeyringTokenStore {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, CoreError> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/{TOKEN_KEY}", self.profile))
            .map_err(|e| storage_error("opening keyring entry", e))
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(SecretString::from(token))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(storage_error("reading keyring", e)),
        }
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        self.entry()?
            .set_password(token.expose_secret())
            .map_err(|e| storage_error("writing keyring", e))?;
        debug!(profile = %self.profile, "token saved to keyring");
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(storage_error("clearing keyring", e)),
        }
    }
}

/// The store a profile is configured to use.
pub fn open_token_store(
    kind: TokenStoreKind,
    profile: &str,
    data_dir: &Path,
) -> Box<dyn TokenStore> {
    match kind {
        TokenStoreKind::File => Box::new(FileTokenStore::new(data_dir, profile)),
        TokenStoreKind::Keyring => Box::new(KeyringTokenStore::new(profile)),
    }
}
