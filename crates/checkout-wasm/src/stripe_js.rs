//! Stripe.js implementation of the embedded checkout widget seam.

use crate::bindings::{js_error_message, new_stripe, JsEmbeddedCheckout, JsStripe};
use async_trait::async_trait;
use checkout_core::{
    CheckoutError, CheckoutResult, CheckoutWidget, EmbeddedCheckoutFactory, SecretSupplier,
};
use js_sys::{Object, Promise, Reflect};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

type FetchClientSecret = Closure<dyn FnMut() -> Promise>;

/// Widget factory backed by `Stripe(publishableKey)`
pub struct StripeJsFactory {
    stripe: JsStripe,
}

impl StripeJsFactory {
    pub fn new(publishable_key: &str) -> CheckoutResult<Self> {
        let stripe = new_stripe(publishable_key).map_err(|e| {
            CheckoutError::Configuration(format!("Stripe.js unavailable: {}", js_error_message(&e)))
        })?;
        Ok(Self { stripe })
    }
}

/// Wrap the supplier as the `fetchClientSecret` callback Stripe.js expects
fn fetch_client_secret_callback(supplier: Rc<dyn SecretSupplier>) -> FetchClientSecret {
    Closure::new(move || {
        let supplier = Rc::clone(&supplier);
        future_to_promise(async move {
            supplier
                .fetch_client_secret()
                .await
                .map(|secret| JsValue::from_str(secret.expose()))
                .map_err(|e| js_sys::Error::new(&e.to_string()).into())
        })
    })
}

#[async_trait(?Send)]
impl EmbeddedCheckoutFactory for StripeJsFactory {
    async fn init_embedded_checkout(
        &self,
        supplier: Rc<dyn SecretSupplier>,
    ) -> CheckoutResult<Box<dyn CheckoutWidget>> {
        let fetch = fetch_client_secret_callback(supplier);

        let options = Object::new();
        Reflect::set(
            &options,
            &JsValue::from_str("fetchClientSecret"),
            fetch.as_ref(),
        )
        .map_err(|e| CheckoutError::Internal(js_error_message(&e)))?;

        let promise = self
            .stripe
            .init_embedded_checkout(&options)
            .map_err(|e| CheckoutError::WidgetInit(js_error_message(&e)))?;

        let checkout = JsFuture::from(promise)
            .await
            .map_err(|e| CheckoutError::WidgetInit(js_error_message(&e)))?;

        Ok(Box::new(StripeEmbeddedWidget {
            checkout: checkout.unchecked_into(),
            _fetch: fetch,
        }))
    }
}

/// Mounted-or-mountable Stripe embedded checkout
pub struct StripeEmbeddedWidget {
    checkout: JsEmbeddedCheckout,
    // Stripe.js may call back again (e.g. on session refresh)
    _fetch: FetchClientSecret,
}

impl CheckoutWidget for StripeEmbeddedWidget {
    fn mount(&self, selector: &str) -> CheckoutResult<()> {
        self.checkout.mount(selector).map_err(|e| CheckoutError::Mount {
            selector: selector.to_string(),
            message: js_error_message(&e),
        })
    }

    fn destroy(&self) -> CheckoutResult<()> {
        self.checkout
            .destroy()
            .map_err(|e| CheckoutError::WidgetInit(js_error_message(&e)))
    }
}
