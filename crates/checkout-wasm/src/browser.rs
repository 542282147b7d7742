//! Browser access: the page URL and `fetch` with a `FormData` body.

use crate::bindings::js_error_message;
use async_trait::async_trait;
use checkout_core::{CheckoutError, CheckoutResult, FormTransport, TransportResponse};
use gloo_net::http::Request;
use serde::Deserialize;
use web_sys::FormData;

/// `window.location.search` of the current page
pub fn location_search() -> CheckoutResult<String> {
    let window = web_sys::window()
        .ok_or_else(|| CheckoutError::Configuration("No window object".to_string()))?;
    window
        .location()
        .search()
        .map_err(|e| CheckoutError::Internal(js_error_message(&e)))
}

/// `fetch`-based transport sending `multipart/form-data`
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserFormTransport;

#[async_trait(?Send)]
impl FormTransport for BrowserFormTransport {
    async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> CheckoutResult<TransportResponse> {
        let form = FormData::new().map_err(|e| CheckoutError::Internal(js_error_message(&e)))?;
        for (name, value) in fields {
            form.append_with_str(name, value)
                .map_err(|e| CheckoutError::Internal(js_error_message(&e)))?;
        }

        let response = Request::post(url)
            .body(form)
            .map_err(|e| CheckoutError::Internal(e.to_string()))?
            .send()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Network(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

/// Reply of the server's `/config` route
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub publishable_key: String,
}

/// Fetch the publishable key from the server
pub async fn fetch_client_config(path: &str) -> CheckoutResult<ClientConfig> {
    let response = Request::get(path)
        .send()
        .await
        .map_err(|e| CheckoutError::Network(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CheckoutError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(CheckoutError::HttpStatus { status, body });
    }

    parse_client_config(&body)
}

fn parse_client_config(body: &str) -> CheckoutResult<ClientConfig> {
    let config: ClientConfig = serde_json::from_str(body)
        .map_err(|e| CheckoutError::Parse(format!("Invalid client config: {}", e)))?;

    if config.publishable_key.is_empty() {
        return Err(CheckoutError::Configuration(
            "Server returned an empty publishable key".to_string(),
        ));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_client_config() {
        let config = parse_client_config(r#"{"publishableKey":"pk_test_xyz"}"#).unwrap();
        assert_eq!(config.publishable_key, "pk_test_xyz");
    }

    #[test]
    fn test_parse_client_config_failures() {
        assert!(matches!(
            parse_client_config("not json"),
            Err(CheckoutError::Parse(_))
        ));
        assert!(matches!(
            parse_client_config(r#"{"publishableKey":""}"#),
            Err(CheckoutError::Configuration(_))
        ));
    }
}
