// Durable token storage seam.
//
// A store holds a single value under `access_token`. Implementations
// backed by the filesystem or the OS keyring live in clientele-config.

use std::sync::{Arc, Mutex, PoisonError};

use secrecy::SecretString;

use crate::error::CoreError;

/// Key under which every store keeps the bearer token.
pub const TOKEN_KEY: &str = "access_token";

/// Persistence for the session's bearer token.
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any.
    fn load(&self) -> Result<Option<SecretString>, CoreError>;

    fn save(&self, token: &SecretString) -> Result<(), CoreError>;

    /// Remove the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> Result<(), CoreError>;
}

impl<T: TokenStore + ?Sized> TokenStore for Box<T> {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        (**self).load()
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), CoreError> {
        (**self).clear()
    }
}

impl<T: TokenStore + ?Sized> TokenStore for Arc<T> {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        (**self).load()
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        (**self).save(token)
    }

    fn clear(&self) -> Result<(), CoreError> {
        (**self).clear()
    }
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<SecretString>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(SecretString::from(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, CoreError> {
        Ok(self
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, token: &SecretString) -> Result<(), CoreError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
