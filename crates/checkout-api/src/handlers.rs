//! # Request Handlers
//!
//! Axum request handlers for the storefront and the embedded checkout flow.

use crate::state::AppState;
use crate::storefront;
use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{Html, IntoResponse},
    Form, Json,
};
use checkout_core::{validate_session_id, CheckoutError, ClientSecretResponse, ISBN_PARAM};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn checkout_error_to_response(err: CheckoutError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Provider error text stays in the server log
fn redact_provider_message(err: CheckoutError) -> CheckoutError {
    match err {
        CheckoutError::Provider { provider, .. } => CheckoutError::Provider {
            provider,
            message: "session lookup failed".to_string(),
        },
        other => other,
    }
}

fn bad_form(message: String) -> ApiError {
    checkout_error_to_response(CheckoutError::InvalidRequest(message))
}

/// `isbn` field of a `multipart/form-data` or urlencoded form
#[derive(Debug, Default)]
pub struct IsbnForm {
    pub isbn: Option<String>,
}

impl<S> FromRequest<S> for IsbnForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if !is_multipart {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| bad_form(e.body_text()))?;
            return Ok(Self {
                isbn: fields.get(ISBN_PARAM).cloned(),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| bad_form(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_form(e.body_text()))?
        {
            if field.name() == Some(ISBN_PARAM) {
                let isbn = field.text().await.map_err(|e| bad_form(e.body_text()))?;
                return Ok(Self { isbn: Some(isbn) });
            }
        }

        Ok(Self::default())
    }
}

/// Query of the session status endpoint
#[derive(Debug, Deserialize)]
pub struct SessionStatusQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Reply of the session status endpoint
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub status: String,
    pub customer_email: Option<String>,
}

/// Browser-side configuration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfigResponse {
    pub publishable_key: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "bookstore-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Front page with the book table
pub async fn storefront(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let path = state.config.static_dir.join("index.html");
    let template = tokio::fs::read_to_string(&path).await.map_err(|e| {
        error!("Failed to read {}: {}", path.display(), e);
        checkout_error_to_response(CheckoutError::Internal("Storefront unavailable".to_string()))
    })?;

    Ok(Html(storefront::render_page(&template, &state.catalog)))
}

/// Create an embedded checkout session for the posted `isbn`
#[instrument(skip(state, form), fields(isbn = ?form.isbn))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    form: IsbnForm,
) -> Result<Json<ClientSecretResponse>, ApiError> {
    let isbn = form
        .isbn
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            checkout_error_to_response(CheckoutError::InvalidRequest("isbn is required".to_string()))
        })?;

    let book = state
        .catalog
        .get(&isbn)
        .filter(|book| book.active)
        .ok_or_else(|| {
            warn!("Could not find ISBN {}", isbn);
            checkout_error_to_response(CheckoutError::BookNotFound { isbn: isbn.clone() })
        })?;

    let session = state
        .provider
        .create_embedded_session(book, &state.return_url())
        .await
        .map_err(|e| {
            error!("Failed to create checkout session: {}", e);
            checkout_error_to_response(e)
        })?;

    info!(
        "Created {} session {} for \"{}\"",
        state.provider.provider_name(),
        session.session_id,
        book.title
    );

    Ok(Json(ClientSecretResponse::new(&session.client_secret)))
}

/// Session status for the return page; fulfills completed sessions
#[instrument(skip(state, query))]
pub async fn session_status(
    State(state): State<AppState>,
    Query(query): Query<SessionStatusQuery>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let session_id = query.session_id.filter(|s| !s.is_empty()).ok_or_else(|| {
        checkout_error_to_response(CheckoutError::InvalidRequest(
            "session_id is required".to_string(),
        ))
    })?;
    let session_id = validate_session_id(&session_id).map_err(|e| {
        warn!("Rejected session_id {:?}", session_id);
        checkout_error_to_response(e)
    })?;

    let session = state
        .provider
        .retrieve_session(session_id)
        .await
        .map_err(|e| {
            error!("Failed to retrieve session {}: {}", session_id, e);
            checkout_error_to_response(redact_provider_message(e))
        })?;

    // The customer has paid; a fulfillment failure must not hide that.
    if let Err(e) = state.fulfillment.fulfill_once(&session).await {
        error!("Fulfillment for {} failed: {}", session_id, e);
    }

    Ok(Json(SessionStatusResponse {
        status: session.status.as_str().to_string(),
        customer_email: session.customer_email,
    }))
}

/// Publishable key for Stripe.js
pub async fn client_config(State(state): State<AppState>) -> Json<ClientConfigResponse> {
    Json(ClientConfigResponse {
        publishable_key: state.publishable_key.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400);
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
    }

    #[test]
    fn test_checkout_error_conversion() {
        let (status, _json) =
            checkout_error_to_response(CheckoutError::InvalidRequest("Bad data".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = checkout_error_to_response(CheckoutError::BookNotFound {
            isbn: "123".to_string(),
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json.code, 404);
    }

    #[test]
    fn test_provider_message_is_redacted() {
        let err = redact_provider_message(CheckoutError::Provider {
            provider: "stripe".to_string(),
            message: "No such customer: 'cus_123'".to_string(),
        });
        assert!(!err.to_string().contains("cus_123"));
        assert_eq!(err.status_code(), 502);

        let err = redact_provider_message(CheckoutError::SessionNotFound {
            session_id: "cs_1".to_string(),
        });
        assert!(matches!(err, CheckoutError::SessionNotFound { .. }));
    }
}
