//! # checkout-stripe
//!
//! Stripe embedded checkout provider for bookstore-checkout-rs.
//!
//! Creates Checkout Sessions with `ui_mode=embedded` for a single book and
//! returns the session's client secret, which Stripe.js uses to mount the
//! checkout inline. Also retrieves session status for the return page.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_core::{return_url, Book, EmbeddedCheckoutProvider};
//! use checkout_stripe::StripeEmbeddedCheckout;
//!
//! let stripe = StripeEmbeddedCheckout::from_env()?;
//!
//! let session = stripe
//!     .create_embedded_session(&book, &return_url("https://books.example", "return.html"))
//!     .await?;
//!
//! // Send session.client_secret to the browser
//! ```

pub mod config;
pub mod embedded;

// Re-exports
pub use config::StripeConfig;
pub use embedded::StripeEmbeddedCheckout;
