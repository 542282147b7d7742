//! Client-secret fetching over real HTTP against a mocked session endpoint.

#![cfg(feature = "native-transport")]

use async_trait::async_trait;
use checkout_core::{
    CheckoutError, CheckoutInitializer, CheckoutResult, CheckoutWidget, EmbeddedCheckoutFactory,
    FailureKind, InitState, ReqwestFormTransport, SecretSupplier, SessionEndpoint,
};
use std::cell::RefCell;
use std::rc::Rc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct RecordingWidget {
    mounts: Rc<RefCell<Vec<String>>>,
}

impl CheckoutWidget for RecordingWidget {
    fn mount(&self, selector: &str) -> CheckoutResult<()> {
        self.mounts.borrow_mut().push(selector.to_string());
        Ok(())
    }

    fn destroy(&self) -> CheckoutResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct RecordingFactory {
    mounts: Rc<RefCell<Vec<String>>>,
}

#[async_trait(?Send)]
impl EmbeddedCheckoutFactory for RecordingFactory {
    async fn init_embedded_checkout(
        &self,
        supplier: Rc<dyn SecretSupplier>,
    ) -> CheckoutResult<Box<dyn CheckoutWidget>> {
        supplier
            .fetch_client_secret()
            .await
            .map_err(|e| CheckoutError::WidgetInit(format!("IntegrationError: {}", e)))?;

        Ok(Box::new(RecordingWidget {
            mounts: Rc::clone(&self.mounts),
        }))
    }
}

#[tokio::test]
async fn fetches_client_secret_with_multipart_isbn() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-checkout-session"))
        .and(body_string_contains("name=\"isbn\""))
        .and(body_string_contains("9780131103627"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "clientSecret": "cs_test_abc" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestFormTransport::new(server.uri()).unwrap();
    let endpoint = SessionEndpoint::new(
        transport,
        "/create-checkout-session",
        Some("9780131103627".into()),
    );

    let secret = endpoint.fetch_client_secret().await.unwrap();
    assert_eq!(secret.expose(), "cs_test_abc");
}

#[tokio::test]
async fn omits_isbn_field_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-checkout-session"))
        .respond_with(ResponseTemplate::new(400).set_body_string("isbn is required"))
        .mount(&server)
        .await;

    let transport = ReqwestFormTransport::new(server.uri()).unwrap();
    let endpoint = SessionEndpoint::new(transport, "/create-checkout-session", None);

    let err = endpoint.fetch_client_secret().await.unwrap_err();
    assert!(matches!(err, CheckoutError::HttpStatus { status: 400, .. }));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(!body.contains("name=\"isbn\""));
}

#[tokio::test]
async fn non_json_reply_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-checkout-session"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Request req_123: No such price"))
        .mount(&server)
        .await;

    let transport = ReqwestFormTransport::new(server.uri()).unwrap();
    let endpoint = SessionEndpoint::new(transport, "/create-checkout-session", Some("1".into()));

    let err = endpoint.fetch_client_secret().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Parse);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    // Nothing listens on port 1
    let transport = ReqwestFormTransport::new("http://127.0.0.1:1").unwrap();
    let endpoint = SessionEndpoint::new(transport, "/create-checkout-session", Some("1".into()));

    let err = endpoint.fetch_client_secret().await.unwrap_err();
    assert!(matches!(err, CheckoutError::Network(_)));
}

#[tokio::test]
async fn initialize_mounts_once_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-checkout-session"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "clientSecret": "cs_test_abc" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let factory = RecordingFactory::default();
    let mounts = Rc::clone(&factory.mounts);
    let transport = ReqwestFormTransport::new(server.uri()).unwrap();

    let mut init = CheckoutInitializer::for_page(factory, transport, "?isbn=9780131103627");
    init.initialize().await.unwrap();

    assert_eq!(init.state(), InitState::Mounted);
    assert_eq!(*mounts.borrow(), vec!["#checkout".to_string()]);
}

#[tokio::test]
async fn initialize_surfaces_endpoint_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-checkout-session"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let factory = RecordingFactory::default();
    let mounts = Rc::clone(&factory.mounts);
    let transport = ReqwestFormTransport::new(server.uri()).unwrap();

    let mut init = CheckoutInitializer::for_page(factory, transport, "?isbn=9780131103627");
    let err = init.initialize().await.unwrap_err();

    assert!(matches!(err, CheckoutError::HttpStatus { status: 500, .. }));
    assert_eq!(init.state(), InitState::Failed(FailureKind::Network));
    assert!(mounts.borrow().is_empty());
}
