//! # Stripe Embedded Checkout Sessions
//!
//! Checkout Sessions API in embedded mode (`ui_mode=embedded`). The
//! session's `client_secret` is what Stripe.js needs to mount the checkout
//! inline on the page.

use crate::config::StripeConfig;
use async_trait::async_trait;
use checkout_core::{
    validate_session_id, Book, CheckoutError, CheckoutResult, CheckoutStatus, ClientSecret,
    EmbeddedCheckoutProvider, EmbeddedSession, SessionStatus,
};
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use uuid::Uuid;

const PROVIDER: &str = "stripe";

/// Stripe embedded checkout provider
pub struct StripeEmbeddedCheckout {
    config: StripeConfig,
    client: Client,
}

impl StripeEmbeddedCheckout {
    /// Create a new provider
    pub fn new(config: StripeConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CheckoutError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    pub fn publishable_key(&self) -> &str {
        &self.config.publishable_key
    }

    /// Form parameters for a one-book embedded session
    fn session_params(book: &Book, return_url: &str) -> Vec<(String, String)> {
        vec![
            ("ui_mode".to_string(), "embedded".to_string()),
            ("mode".to_string(), "payment".to_string()),
            ("return_url".to_string(), return_url.to_string()),
            (
                "line_items[0][price_data][currency]".to_string(),
                book.currency.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                book.price.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                book.title.clone(),
            ),
            (
                "line_items[0][price_data][tax_behavior]".to_string(),
                "inclusive".to_string(),
            ),
            ("line_items[0][quantity]".to_string(), "1".to_string()),
            ("metadata[isbn]".to_string(), book.isbn13.clone()),
            ("metadata[fulfilled]".to_string(), "false".to_string()),
        ]
    }

    /// `{base}/v1/checkout/sessions/{id}` with the id as one escaped segment
    fn session_url(&self, session_id: &str) -> CheckoutResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url).map_err(|e| {
            CheckoutError::Configuration(format!("Invalid Stripe API base URL: {}", e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                CheckoutError::Configuration("Stripe API base URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(["v1", "checkout", "sessions", session_id]);
        Ok(url)
    }

    /// Read a response body, turning non-success statuses into errors
    async fn read_body(response: reqwest::Response) -> CheckoutResult<(StatusCode, String)> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;
        Ok((status, body))
    }

    fn provider_error(status: StatusCode, body: &str) -> CheckoutError {
        error!("Stripe API error: status={}, body={}", status, body);

        let message = match serde_json::from_str::<StripeErrorResponse>(body) {
            Ok(error_response) => error_response.error.message,
            Err(_) => format!("HTTP {}: {}", status, body),
        };

        CheckoutError::Provider {
            provider: PROVIDER.to_string(),
            message,
        }
    }
}

#[async_trait]
impl EmbeddedCheckoutProvider for StripeEmbeddedCheckout {
    #[instrument(skip(self, book), fields(isbn = %book.isbn13))]
    async fn create_embedded_session(
        &self,
        book: &Book,
        return_url: &str,
    ) -> CheckoutResult<EmbeddedSession> {
        let form_params = Self::session_params(book, return_url);
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        debug!(
            "Creating Stripe embedded session: title={}, amount={}",
            book.title, book.price
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(&form_params)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            return Err(Self::provider_error(status, &body));
        }

        let session: StripeSessionResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Parse(format!("Failed to parse Stripe response: {}", e))
        })?;

        let client_secret = session
            .client_secret
            .filter(|s| !s.is_empty())
            .ok_or(CheckoutError::MissingClientSecret)?;

        info!("Created Stripe embedded session: id={}", session.id);

        Ok(EmbeddedSession {
            session_id: session.id,
            client_secret: ClientSecret::new(client_secret),
            expires_at: session
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> CheckoutResult<SessionStatus> {
        let session_id = validate_session_id(session_id)?;
        let url = self.session_url(session_id)?;

        let response = self
            .client
            .get(url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if status == StatusCode::NOT_FOUND {
            return Err(CheckoutError::SessionNotFound {
                session_id: session_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(Self::provider_error(status, &body));
        }

        let session: StripeSessionResponse = serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Parse(format!("Failed to parse Stripe response: {}", e))
        })?;

        let checkout_status = match session.status.as_deref() {
            Some("complete") => CheckoutStatus::Complete,
            Some("expired") => CheckoutStatus::Expired,
            Some("open") => CheckoutStatus::Open,
            other => {
                warn!(
                    "Unknown Stripe session status {:?} for {}; treating as open",
                    other, session.id
                );
                CheckoutStatus::Open
            }
        };

        Ok(SessionStatus {
            session_id: session.id,
            status: checkout_status,
            customer_email: session.customer_details.and_then(|cd| cd.email),
            isbn: session.metadata.and_then(|m| m.isbn),
        })
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeSessionResponse {
    id: String,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    customer_details: Option<StripeCustomerDetails>,
    #[serde(default)]
    metadata: Option<StripeSessionMetadata>,
}

#[derive(Debug, Deserialize)]
struct StripeCustomerDetails {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeSessionMetadata {
    #[serde(default)]
    isbn: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}
