//! # Embedded Checkout Widget Seam
//!
//! Traits standing between the initializer and the third-party embedded
//! checkout library. The browser crate binds them to Stripe.js; tests bind
//! them to stubs.
//!
//! ```text
//!  CheckoutInitializer ──► EmbeddedCheckoutFactory::init_embedded_checkout(supplier)
//!                                   │ calls back
//!                                   ▼
//!                          SecretSupplier::fetch_client_secret()
//!                                   │
//!                                   ▼
//!                          Box<dyn CheckoutWidget> ──► mount("#checkout")
//! ```
//!
//! The browser is single threaded, so these traits are `?Send`.

use crate::error::CheckoutResult;
use crate::session::ClientSecret;
use async_trait::async_trait;
use std::rc::Rc;

/// Default DOM anchor for the widget
pub const DEFAULT_MOUNT_SELECTOR: &str = "#checkout";

/// Supplies the client secret when the widget asks for it
#[async_trait(?Send)]
pub trait SecretSupplier {
    async fn fetch_client_secret(&self) -> CheckoutResult<ClientSecret>;
}

/// Factory for embedded checkout widgets, configured with a publishable key
#[async_trait(?Send)]
pub trait EmbeddedCheckoutFactory {
    /// Set up an embedded checkout that obtains its secret from `supplier`.
    async fn init_embedded_checkout(
        &self,
        supplier: Rc<dyn SecretSupplier>,
    ) -> CheckoutResult<Box<dyn CheckoutWidget>>;
}

/// Handle to an initialized embedded checkout
pub trait CheckoutWidget {
    /// Attach the UI to the element matching `selector`
    fn mount(&self, selector: &str) -> CheckoutResult<()>;

    /// Tear the UI down
    fn destroy(&self) -> CheckoutResult<()>;
}
