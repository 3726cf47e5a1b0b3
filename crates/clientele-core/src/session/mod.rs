// ── Session / auth context ──
//
// One `SessionContext` per client process, passed explicitly to whatever
// needs it. It owns the token store and the current `Session`, and keeps
// the two in step: every state change is persisted first.

mod route;
mod store;
mod token;

use std::sync::{PoisonError, RwLock};

use clientele_api::LoginCredentials;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::api::CustomerApi;
use crate::error::CoreError;

pub use route::{Route, RouteDecision, guard};
pub use store::{MemoryTokenStore, TOKEN_KEY, TokenStore};
pub use token::{Identity, TokenError, decode_identity, decode_identity_at};

#[cfg(test)]
pub(crate) use token::tests::jwt;

/// Snapshot of who is signed in.
///
/// Either both fields are set or neither is.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub identity: Option<Identity>,
    pub token: Option<SecretString>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Owner of the process's session state and its durable token store.
pub struct SessionContext {
    store: Box<dyn TokenStore>,
    state: RwLock<Session>,
}

impl SessionContext {
    /// An empty session over `store`. Nothing is read from the store.
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        Self {
            store,
            state: RwLock::new(Session::default()),
        }
    }

    /// Rebuild the session from whatever token `store` holds.
    ///
    /// A missing, undecodable, or expired token yields an empty session.
    pub fn restore(store: Box<dyn TokenStore>) -> Self {
        let ctx = Self::new(store);
        let token = match ctx.store.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "could not read stored token");
                None
            }
        };

        let Some(token) = token else {
            debug!("no stored token");
            return ctx;
        };

        match decode_identity(token.expose_secret()) {
            Ok(identity) => {
                debug!(subject = %identity.subject, "restored session");
                ctx.replace(Session {
                    identity: Some(identity),
                    token: Some(token),
                });
            }
            Err(e) => warn!(error = %e, "ignoring stored token"),
        }
        ctx
    }

    /// Current session snapshot.
    pub fn current(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.current().identity
    }

    pub fn token(&self) -> Option<SecretString> {
        self.current().token
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    /// Exchange credentials for a token, persist it, and hand it to `api`
    /// for subsequent requests.
    pub async fn login<A: CustomerApi>(
        &self,
        api: &A,
        credentials: &LoginCredentials,
    ) -> Result<Identity, CoreError> {
        let response = api.login(credentials).await?;
        let identity = self.establish(response.token.clone())?;
        api.set_token(Some(response.token));
        Ok(identity)
    }

    /// Adopt a token obtained elsewhere (signup). The token is decoded
    /// before anything is persisted; a bad token leaves the session as is.
    pub fn establish(&self, token: SecretString) -> Result<Identity, CoreError> {
        let identity = decode_identity(token.expose_secret())?;
        self.store.save(&token)?;
        info!(subject = %identity.subject, "signed in");
        self.replace(Session {
            identity: Some(identity.clone()),
            token: Some(token),
        });
        Ok(identity)
    }

    /// Forget the token, both in memory and in the store.
    pub fn logout(&self) -> Result<(), CoreError> {
        self.store.clear()?;
        self.replace(Session::default());
        info!("signed out");
        Ok(())
    }

    /// Decide whether `route` may be shown for the current session.
    pub fn guard(&self, route: Route) -> RouteDecision {
        guard(
            route,
            &self.state.read().unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn replace(&self, session: Session) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}
