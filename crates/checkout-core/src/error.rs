//! # Checkout Error Types
//!
//! Typed error handling for the bookstore checkout.
//! Browser initialization and server operations both return
//! `Result<T, CheckoutError>`.

use thiserror::Error;

/// Coarse failure category surfaced to callers that decide user-facing behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport failure or non-success HTTP status
    Network,
    /// Response body could not be decoded
    Parse,
    /// A required field was absent from an otherwise valid response
    MissingField,
    /// The widget could not be attached to the page
    Mount,
    /// The embedded checkout library rejected initialization
    Widget,
    /// Server-side failure (catalog, provider, request validation)
    Server,
    /// Missing or malformed configuration
    Config,
    /// Operation invoked in the wrong lifecycle state
    State,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Network => "network",
            FailureKind::Parse => "parse",
            FailureKind::MissingField => "missing_field",
            FailureKind::Mount => "mount",
            FailureKind::Widget => "widget",
            FailureKind::Server => "server",
            FailureKind::Config => "config",
            FailureKind::State => "state",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core error type for all checkout operations
#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Book not found in catalog
    #[error("Book not found: {isbn}")]
    BookNotFound { isbn: String },

    /// Could not reach the endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response was not the JSON we expected
    #[error("Parse error: {0}")]
    Parse(String),

    /// Session endpoint answered without a usable `clientSecret`
    #[error("Response did not contain a clientSecret")]
    MissingClientSecret,

    /// Embedded checkout library failed during setup
    #[error("Embedded checkout initialization failed: {0}")]
    WidgetInit(String),

    /// Widget could not be mounted at the selector
    #[error("Failed to mount checkout at {selector}: {message}")]
    Mount { selector: String, message: String },

    /// `initialize()` called on an initializer that already ran
    #[error("Checkout already initialized")]
    AlreadyInitialized,

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    Provider { provider: String, message: String },

    /// Checkout session unknown to the provider
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckoutError {
    /// Failure category for this error
    pub fn kind(&self) -> FailureKind {
        match self {
            CheckoutError::Network(_) | CheckoutError::HttpStatus { .. } => FailureKind::Network,
            CheckoutError::Parse(_) => FailureKind::Parse,
            CheckoutError::MissingClientSecret => FailureKind::MissingField,
            CheckoutError::Mount { .. } => FailureKind::Mount,
            CheckoutError::WidgetInit(_) => FailureKind::Widget,
            CheckoutError::Configuration(_) => FailureKind::Config,
            CheckoutError::AlreadyInitialized => FailureKind::State,
            CheckoutError::InvalidRequest(_)
            | CheckoutError::BookNotFound { .. }
            | CheckoutError::Provider { .. }
            | CheckoutError::SessionNotFound { .. }
            | CheckoutError::Internal(_) => FailureKind::Server,
        }
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::Network(_) | CheckoutError::Provider { .. } => true,
            CheckoutError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Configuration(_) => 500,
            CheckoutError::InvalidRequest(_) => 400,
            CheckoutError::BookNotFound { .. } => 404,
            CheckoutError::Network(_) => 503,
            CheckoutError::HttpStatus { .. } => 502,
            CheckoutError::Parse(_) => 502,
            CheckoutError::MissingClientSecret => 502,
            CheckoutError::WidgetInit(_) => 500,
            CheckoutError::Mount { .. } => 500,
            CheckoutError::AlreadyInitialized => 409,
            CheckoutError::Provider { .. } => 502,
            CheckoutError::SessionNotFound { .. } => 404,
            CheckoutError::Internal(_) => 500,
        }
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
