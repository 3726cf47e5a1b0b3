// Authentication endpoint
//
// Login exchanges a username (the customer's email) and password for a
// JWT. The token is returned both in the JSON body and in the
// `Authorization` response header; the body wins when both are present.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{ApiClient, decode_json, token_from_headers};
use crate::error::Error;
use crate::models::{AuthenticationBody, LoginCredentials, LoginResponse};

impl ApiClient {
    /// Authenticate and obtain an access token.
    ///
    /// `POST /api/v1/auth/login` with `{"username", "password"}`. Does not
    /// store the token on this client; session management decides that.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, Error> {
        let url = self.api_url("auth/login")?;
        debug!(username = %credentials.username, "logging in");

        let body = json!({
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
        });

        let resp = self.post(url, &body).await?;
        let header_token = token_from_headers(resp.headers());
        let parsed: AuthenticationBody = decode_json(resp).await?;

        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .or(header_token)
            .ok_or(Error::MissingToken)?;

        debug!("login successful");
        Ok(LoginResponse {
            token,
            customer: parsed.customer,
        })
    }
}
