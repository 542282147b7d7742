//! # checkout-wasm
//!
//! WebAssembly entry points that mount the Stripe embedded checkout for the
//! book named by the page's `isbn` query parameter.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { boot } from './pkg/checkout_wasm.js';
//!
//! await init();
//!
//! // Reads the publishable key from /config, then mounts into #checkout
//! const checkout = await boot();
//! ```
//!
//! or, with the key supplied by the page:
//!
//! ```javascript
//! import init, { start_checkout } from './pkg/checkout_wasm.js';
//!
//! await init();
//! await start_checkout({ publishableKey: 'pk_test_...', selector: '#checkout' });
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/checkout-wasm --target web --out-dir ../../static/pkg
//! ```

pub mod bindings;
pub mod browser;
pub mod stripe_js;

use browser::{fetch_client_config, location_search, BrowserFormTransport};
use checkout_core::{
    extract_identifier, CheckoutError, CheckoutInitializer, CheckoutWidget, CREATE_SESSION_PATH,
    DEFAULT_MOUNT_SELECTOR,
};
use serde::Deserialize;
use stripe_js::StripeJsFactory;
use wasm_bindgen::prelude::*;

/// Server route exposing the publishable key
pub const CONFIG_PATH: &str = "/config";

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Options accepted by `start_checkout`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOptions {
    pub publishable_key: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_selector")]
    pub selector: String,
}

fn default_endpoint() -> String {
    CREATE_SESSION_PATH.to_string()
}

fn default_selector() -> String {
    DEFAULT_MOUNT_SELECTOR.to_string()
}

impl CheckoutOptions {
    pub fn new(publishable_key: impl Into<String>) -> Self {
        Self {
            publishable_key: publishable_key.into(),
            endpoint: default_endpoint(),
            selector: default_selector(),
        }
    }
}

/// A mounted embedded checkout, owned by the page
#[wasm_bindgen]
pub struct MountedCheckout {
    widget: Box<dyn CheckoutWidget>,
    isbn: Option<String>,
}

#[wasm_bindgen]
impl MountedCheckout {
    /// ISBN the session was created for
    #[wasm_bindgen(getter)]
    pub fn isbn(&self) -> Option<String> {
        self.isbn.clone()
    }

    /// Remove the checkout from the page
    #[wasm_bindgen]
    pub fn destroy(&self) -> Result<(), JsValue> {
        self.widget.destroy().map_err(report)
    }
}

/// Mount the embedded checkout with explicit options.
///
/// Rejects with an `Error` whose message starts with the failure kind,
/// e.g. `[network] HTTP 404: ...`.
#[wasm_bindgen]
pub async fn start_checkout(options: JsValue) -> Result<MountedCheckout, JsValue> {
    let options: CheckoutOptions = serde_wasm_bindgen::from_value(options).map_err(|e| {
        report(CheckoutError::Configuration(format!("Invalid checkout options: {}", e)))
    })?;

    mount_checkout(options).await.map_err(report)
}

/// Fetch the publishable key from the server, then mount the checkout.
#[wasm_bindgen]
pub async fn boot(config_path: Option<String>) -> Result<MountedCheckout, JsValue> {
    let path = config_path.unwrap_or_else(|| CONFIG_PATH.to_string());
    let config = fetch_client_config(&path).await.map_err(report)?;

    mount_checkout(CheckoutOptions::new(config.publishable_key))
        .await
        .map_err(report)
}

async fn mount_checkout(options: CheckoutOptions) -> Result<MountedCheckout, CheckoutError> {
    // Captured once; later URL changes do not affect this checkout
    let isbn = extract_identifier(&location_search()?);
    let factory = StripeJsFactory::new(&options.publishable_key)?;

    let mut initializer = CheckoutInitializer::for_identifier(
        factory,
        BrowserFormTransport,
        &options.endpoint,
        isbn.clone(),
    )
    .with_selector(options.selector);

    initializer.initialize().await?;

    let widget = initializer
        .into_widget()
        .ok_or_else(|| CheckoutError::Internal("Mounted checkout has no widget".to_string()))?;

    Ok(MountedCheckout {
        widget,
        isbn: isbn.map(|id| id.into_inner()),
    })
}

/// Log a failure to the console and convert it for JS
fn report(err: CheckoutError) -> JsValue {
    let message = format!("[{}] {}", err.kind(), err);
    web_sys::console::error_1(&JsValue::from_str(&message));
    js_sys::Error::new(&message).into()
}

/// The `isbn` parameter of a location search string
#[wasm_bindgen]
pub fn extract_isbn(search: &str) -> Option<String> {
    extract_identifier(search).map(|id| id.into_inner())
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
