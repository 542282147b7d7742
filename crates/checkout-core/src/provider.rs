//! # Embedded Checkout Provider
//!
//! Server-side seam to the payment provider. The session endpoint asks the
//! provider for an embedded session and hands its client secret to the
//! browser; the return page asks for the session status.
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │        EmbeddedCheckoutProvider (trait)         │
//! │  ├── create_embedded_session()                  │
//! │  ├── retrieve_session()                         │
//! │  └── provider_name()                            │
//! └─────────────────────────────────────────────────┘
//!                         ▲
//!                ┌────────┴────────┐
//!                │ StripeEmbedded  │
//!                │    Checkout     │
//!                └─────────────────┘
//! ```

use crate::catalog::Book;
use crate::error::CheckoutResult;
use crate::session::{EmbeddedSession, SessionStatus};
use async_trait::async_trait;
use std::sync::Arc;

/// Placeholder the provider substitutes with the real session ID
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

#[async_trait]
pub trait EmbeddedCheckoutProvider: Send + Sync {
    /// Create an embedded checkout session for one copy of `book`.
    ///
    /// `return_url` is where the customer lands afterwards; it may contain
    /// [`SESSION_ID_PLACEHOLDER`].
    async fn create_embedded_session(
        &self,
        book: &Book,
        return_url: &str,
    ) -> CheckoutResult<EmbeddedSession>;

    /// Look up the status of a session.
    async fn retrieve_session(&self, session_id: &str) -> CheckoutResult<SessionStatus>;

    /// Provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Shared provider handle
pub type BoxedCheckoutProvider = Arc<dyn EmbeddedCheckoutProvider>;

/// Return URL for the embedded flow, e.g.
/// `https://books.example/return.html?session_id={CHECKOUT_SESSION_ID}`
pub fn return_url(base_url: &str, return_page: &str) -> String {
    format!(
        "{}/{}?session_id={}",
        base_url.trim_end_matches('/'),
        return_page.trim_start_matches('/'),
        SESSION_ID_PLACEHOLDER
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_url() {
        assert_eq!(
            return_url("https://books.example/", "/return.html"),
            "https://books.example/return.html?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(
            return_url("http://localhost:8080", "return.html"),
            "http://localhost:8080/return.html?session_id={CHECKOUT_SESSION_ID}"
        );
    }
}
