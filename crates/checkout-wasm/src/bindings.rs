//! Low-level wasm-bindgen bindings to the Stripe.js embedded checkout.
//!
//! Stripe.js must be loaded on the page (`https://js.stripe.com/v3/`).

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    /// Raw Stripe.js client handle.
    #[wasm_bindgen(js_name = Stripe)]
    #[derive(Debug, Clone)]
    pub type JsStripe;

    /// Raw embedded checkout handle returned by `initEmbeddedCheckout`.
    #[wasm_bindgen(js_name = EmbeddedCheckout)]
    #[derive(Debug, Clone)]
    pub type JsEmbeddedCheckout;

    /// `Stripe("pk_test_...")`; throws when Stripe.js is not loaded.
    #[wasm_bindgen(catch, js_name = Stripe, js_namespace = window)]
    pub fn new_stripe(publishable_key: &str) -> Result<JsStripe, JsValue>;

    /// `stripe.initEmbeddedCheckout({ fetchClientSecret })` → `Promise<EmbeddedCheckout>`
    #[wasm_bindgen(method, catch, js_name = initEmbeddedCheckout)]
    pub fn init_embedded_checkout(this: &JsStripe, options: &JsValue) -> Result<Promise, JsValue>;

    /// `checkout.mount(selector)`
    #[wasm_bindgen(method, catch, js_name = mount)]
    pub fn mount(this: &JsEmbeddedCheckout, selector: &str) -> Result<(), JsValue>;

    /// `checkout.destroy()`
    #[wasm_bindgen(method, catch, js_name = destroy)]
    pub fn destroy(this: &JsEmbeddedCheckout) -> Result<(), JsValue>;
}

/// Best-effort message from a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}
