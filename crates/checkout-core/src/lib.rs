//! # checkout-core
//!
//! Core types and traits for the bookstore embedded checkout.
//!
//! This crate provides:
//! - `CheckoutInitializer`, the one-shot sequence that mounts the embedded checkout
//! - `extract_identifier` for reading the `isbn` from the page URL
//! - `FormTransport` / `SessionEndpoint` for fetching the client secret
//! - `EmbeddedCheckoutFactory` / `CheckoutWidget`, the seam to the widget library
//! - `EmbeddedCheckoutProvider` and `BookCatalog` for the session endpoint
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{CheckoutInitializer, ReqwestFormTransport};
//!
//! let transport = ReqwestFormTransport::new("http://localhost:8080")?;
//! let mut init = CheckoutInitializer::for_page(factory, transport, "?isbn=9780131103627");
//!
//! match init.initialize().await {
//!     Ok(()) => {} // widget mounted at #checkout
//!     Err(e) => eprintln!("checkout unavailable ({}): {}", e.kind(), e),
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod identifier;
pub mod initializer;
pub mod provider;
pub mod session;
pub mod transport;
pub mod widget;

// Re-exports for convenience
pub use catalog::{Book, BookCatalog};
pub use error::{CheckoutError, CheckoutResult, FailureKind};
pub use identifier::{extract_identifier, query_param, ProductIdentifier, ISBN_PARAM};
pub use initializer::{CheckoutInitializer, InitState};
pub use provider::{return_url, BoxedCheckoutProvider, EmbeddedCheckoutProvider, SESSION_ID_PLACEHOLDER};
pub use session::{
    parse_client_secret, validate_session_id, CheckoutSessionRequest, CheckoutStatus,
    ClientSecret, ClientSecretResponse, EmbeddedSession, SessionStatus, CREATE_SESSION_PATH,
    SESSION_ID_PREFIX,
};
#[cfg(feature = "native-transport")]
pub use transport::ReqwestFormTransport;
pub use transport::{FormTransport, SessionEndpoint, TransportResponse};
pub use widget::{CheckoutWidget, EmbeddedCheckoutFactory, SecretSupplier, DEFAULT_MOUNT_SELECTOR};
