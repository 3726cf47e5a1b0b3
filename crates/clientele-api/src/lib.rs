//! Async Rust client for the customer management HTTP API.
//!
//! One method per endpoint on [`ApiClient`]; each issues exactly one
//! request and surfaces server errors unchanged as [`Error::Api`].

pub mod auth;
pub mod client;
pub mod customers;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use models::{
    CreatedCustomer, Customer, CustomerId, CustomerRegistrationRequest, CustomerUpdateRequest,
    Gender, LoginCredentials, LoginResponse,
};
pub use transport::{TlsMode, TransportConfig};
