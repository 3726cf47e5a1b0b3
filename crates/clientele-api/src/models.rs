// Wire types for the customer API
//
// Field names follow the server's JSON. Request types skip absent
// optionals so partial updates never send `null`.

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString, VariantNames};

// ── CustomerId ──────────────────────────────────────────────────────

/// Opaque customer identifier.
///
/// The reference server issues integers; anything else round-trips as a
/// string. Callers only ever display it or pass it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomerId {
    Numeric(i64),
    Opaque(String),
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Opaque(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for CustomerId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<i64> for CustomerId {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

impl From<&str> for CustomerId {
    fn from(s: &str) -> Self {
        s.parse::<i64>()
            .map_or_else(|_| Self::Opaque(s.to_owned()), Self::Numeric)
    }
}

// ── Gender ──────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Gender {
    Male,
    Female,
}

// ── Customer ────────────────────────────────────────────────────────

/// A customer record as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// ── Requests ────────────────────────────────────────────────────────

/// Body of `POST /api/v1/customers` (signup / create).
#[derive(Debug, Clone, Serialize)]
pub struct CustomerRegistrationRequest {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_optional_secret"
    )]
    pub password: Option<SecretString>,
}

/// Body of `PUT /api/v1/customers/{id}`. Gender and id are immutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
}

/// Username (the customer's email) and password for `POST /api/v1/auth/login`.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: SecretString,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

// ── Responses ───────────────────────────────────────────────────────

/// Result of a successful create. Signup flows read the token; admin
/// creates from the dashboard ignore it.
#[derive(Debug, Clone)]
pub struct CreatedCustomer {
    pub token: Option<SecretString>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: SecretString,
    pub customer: Option<Customer>,
}

/// Raw login body: `{ "token": "...", "customerDTO": { ... } }`.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthenticationBody {
    pub token: Option<String>,
    #[serde(rename = "customerDTO", alias = "customer")]
    pub customer: Option<Customer>,
}

/// Error body shape. The server uses both `{error, message, path}` and
/// `{path, message, statusCode}`; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
    pub path: Option<String>,
}

fn expose_optional_secret<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_str(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
