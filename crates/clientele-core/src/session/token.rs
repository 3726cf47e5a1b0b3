// ── Access token decoding ──
//
// The server issues compact JWTs (`header.payload.signature`). Only the
// payload is read here; signature verification is the server's job.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a token could not be turned into an [`Identity`].
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is not a compact JWT")]
    Malformed,

    #[error("token payload is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("token claims could not be parsed: {0}")]
    Claims(#[from] serde_json::Error),

    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),
}

/// The signed-in customer, as described by the token's claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// The `sub` claim: the customer's email / username.
    pub subject: String,
    /// The `scopes` claim.
    pub roles: Vec<String>,
    pub issuer: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    scopes: Scopes,
    iss: Option<String>,
    iat: Option<i64>,
    exp: Option<i64>,
}

/// `scopes` arrives either as an array or as one space-separated string.
#[derive(Debug, Default, Deserialize)]
#[serde(untagged)]
enum Scopes {
    #[default]
    None,
    List(Vec<String>),
    Joined(String),
}

impl Scopes {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::List(list) => list,
            Self::Joined(s) => s.split_whitespace().map(str::to_owned).collect(),
        }
    }
}

/// Decode a token's identity, rejecting it if already expired.
pub fn decode_identity(token: &str) -> Result<Identity, TokenError> {
    decode_identity_at(token, Utc::now())
}

/// Like [`decode_identity`], evaluating expiry against `now`.
pub fn decode_identity_at(token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);

    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };
    if payload.is_empty() {
        return Err(TokenError::Malformed);
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Claims = serde_json::from_slice(&bytes)?;

    let expires_at = claims.exp.and_then(timestamp);
    if let Some(exp) = expires_at.filter(|exp| *exp <= now) {
        return Err(TokenError::Expired(exp));
    }

    Ok(Identity {
        subject: claims.sub,
        roles: claims.scopes.into_vec(),
        issuer: claims.iss,
        issued_at: claims.iat.and_then(timestamp),
        expires_at,
    })
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}
