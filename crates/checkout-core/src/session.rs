//! # Session Types
//!
//! Wire types shared by the browser initializer and the session endpoint:
//! the outgoing form, the `{ "clientSecret": ... }` reply and the
//! provider-side session records.

use crate::error::{CheckoutError, CheckoutResult};
use crate::identifier::{ProductIdentifier, ISBN_PARAM};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default path of the session endpoint
pub const CREATE_SESSION_PATH: &str = "/create-checkout-session";

/// Form payload sent to the session endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub isbn: Option<ProductIdentifier>,
}

impl CheckoutSessionRequest {
    pub fn new(isbn: Option<ProductIdentifier>) -> Self {
        Self { isbn }
    }

    /// Form fields; an absent identifier contributes no field
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.isbn
            .iter()
            .map(|id| (ISBN_PARAM.to_string(), id.as_str().to_string()))
            .collect()
    }
}

/// One-time token authorizing the browser to complete a checkout session
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientSecret(***)")
    }
}

/// Body returned by the session endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSecretResponse {
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl ClientSecretResponse {
    pub fn new(secret: &ClientSecret) -> Self {
        Self {
            client_secret: Some(secret.expose().to_string()),
        }
    }
}

/// Decode a session endpoint reply into a client secret.
///
/// Non-2xx is a network failure, a non-JSON body is a parse failure and a
/// missing, null or empty `clientSecret` is a missing-field failure.
pub fn parse_client_secret(status: u16, body: &str) -> CheckoutResult<ClientSecret> {
    if !(200..300).contains(&status) {
        return Err(CheckoutError::HttpStatus {
            status,
            body: body.to_string(),
        });
    }

    let response: ClientSecretResponse = serde_json::from_str(body)
        .map_err(|e| CheckoutError::Parse(format!("Invalid session response: {}", e)))?;

    match response.client_secret {
        Some(secret) if !secret.is_empty() => Ok(ClientSecret(secret)),
        _ => Err(CheckoutError::MissingClientSecret),
    }
}

/// Embedded checkout session created by a provider
#[derive(Debug, Clone)]
pub struct EmbeddedSession {
    /// Provider's session ID
    pub session_id: String,

    /// Secret handed to the browser widget
    pub client_secret: ClientSecret,

    /// When the session expires
    pub expires_at: Option<DateTime<Utc>>,
}

/// Status of a checkout session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    /// Awaiting payment
    Open,
    /// Payment completed
    Complete,
    /// Session expired
    Expired,
}

impl CheckoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStatus::Open => "open",
            CheckoutStatus::Complete => "complete",
            CheckoutStatus::Expired => "expired",
        }
    }
}

/// Session status as reported to the return page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub session_id: String,
    pub status: CheckoutStatus,
    pub customer_email: Option<String>,
    /// ISBN recorded in the session metadata
    pub isbn: Option<String>,
}

impl SessionStatus {
    pub fn is_complete(&self) -> bool {
        self.status == CheckoutStatus::Complete
    }
}

/// Prefix of checkout session ids
pub const SESSION_ID_PREFIX: &str = "cs_";

/// Check a visitor-supplied session id: `cs_` then `[A-Za-z0-9_]+`
pub fn validate_session_id(session_id: &str) -> CheckoutResult<&str> {
    let valid = session_id
        .strip_prefix(SESSION_ID_PREFIX)
        .map(|rest| {
            !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        })
        .unwrap_or(false);

    if valid {
        Ok(session_id)
    } else {
        Err(CheckoutError::InvalidRequest(
            "session_id is not a checkout session id".to_string(),
        ))
    }
}
