//! # Form Transport
//!
//! One-shot form POST to the session endpoint, abstracted so the same
//! client-secret logic runs over `fetch` in the browser and over `reqwest`
//! natively.

use crate::error::CheckoutResult;
use crate::identifier::ProductIdentifier;
use crate::session::{parse_client_secret, CheckoutSessionRequest, ClientSecret};
use crate::widget::SecretSupplier;
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Raw reply from a form POST
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Posts a form and returns the raw reply
#[async_trait(?Send)]
pub trait FormTransport {
    /// Send `fields` as `multipart/form-data` to `url`.
    ///
    /// Failing to reach the server is an error; any HTTP status is a reply.
    async fn post_form(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> CheckoutResult<TransportResponse>;
}

/// Client-secret supplier backed by the session endpoint.
///
/// Holds the identifier captured when it was built; it is sent unchanged on
/// every call.
pub struct SessionEndpoint<T> {
    transport: T,
    url: String,
    request: CheckoutSessionRequest,
}

impl<T: FormTransport> SessionEndpoint<T> {
    pub fn new(transport: T, url: impl Into<String>, isbn: Option<ProductIdentifier>) -> Self {
        Self {
            transport,
            url: url.into(),
            request: CheckoutSessionRequest::new(isbn),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn request(&self) -> &CheckoutSessionRequest {
        &self.request
    }
}

#[async_trait(?Send)]
impl<T: FormTransport> SecretSupplier for SessionEndpoint<T> {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_client_secret(&self) -> CheckoutResult<ClientSecret> {
        if self.request.isbn.is_none() {
            warn!("No isbn on the page; requesting a session without one");
        }

        let response = self
            .transport
            .post_form(&self.url, &self.request.form_fields())
            .await?;

        debug!("Session endpoint replied: status={}", response.status);

        parse_client_secret(response.status, &response.body)
    }
}

#[cfg(feature = "native-transport")]
pub use native::ReqwestFormTransport;

#[cfg(feature = "native-transport")]
mod native {
    use super::{FormTransport, TransportResponse};
    use crate::error::{CheckoutError, CheckoutResult};
    use async_trait::async_trait;
    use reqwest::{multipart::Form, Client};

    /// `reqwest`-backed transport resolving relative paths against a base URL
    pub struct ReqwestFormTransport {
        client: Client,
        base_url: String,
    }

    impl ReqwestFormTransport {
        pub fn new(base_url: impl Into<String>) -> CheckoutResult<Self> {
            let client = Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .map_err(|e| CheckoutError::Configuration(format!("HTTP client: {}", e)))?;

            Ok(Self::with_client(client, base_url))
        }

        pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
            Self {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
            }
        }

        fn resolve(&self, url: &str) -> String {
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("{}{}", self.base_url, url)
            }
        }
    }

    #[async_trait(?Send)]
    impl FormTransport for ReqwestFormTransport {
        async fn post_form(
            &self,
            url: &str,
            fields: &[(String, String)],
        ) -> CheckoutResult<TransportResponse> {
            let form = fields
                .iter()
                .fold(Form::new(), |form, (k, v)| form.text(k.clone(), v.clone()));

            let response = self
                .client
                .post(self.resolve(url))
                .multipart(form)
                .send()
                .await
                .map_err(|e| CheckoutError::Network(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| CheckoutError::Network(e.to_string()))?;

            Ok(TransportResponse { status, body })
        }
    }
}
