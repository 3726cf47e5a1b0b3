// clientele-core: forms, validation, list refresh, and session state
// between clientele-api and front ends.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod list;
pub mod notify;
pub mod session;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use api::CustomerApi;
pub use config::{ClientConfig, DEFAULT_API_URL, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use form::{
    CreateCustomer, CreateForm, Form, FormKind, Login, LoginForm, SubmitOutcome, UpdateCustomer,
    UpdateForm,
};
pub use list::{ListController, ListState, RefreshHandle, RefreshOrdering};
pub use notify::{ChannelNotifier, Level, Notification, Notifier, TracingNotifier};
pub use session::{
    Identity, MemoryTokenStore, Route, RouteDecision, Session, SessionContext, TOKEN_KEY,
    TokenError, TokenStore,
};
pub use validate::FieldErrors;

// Wire types, re-exported so front ends need only this crate.
pub use clientele_api::{
    ApiClient, CreatedCustomer, Customer, CustomerId, CustomerRegistrationRequest,
    CustomerUpdateRequest, Gender, LoginCredentials, LoginResponse,
};
