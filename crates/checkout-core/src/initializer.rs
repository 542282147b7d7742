//! # Checkout Initializer
//!
//! One-shot sequence that puts the embedded checkout on the page:
//!
//! ```text
//!  Uninitialized ──initialize()──► Initializing ──┬──► Mounted
//!                                                  └──► Failed(kind)
//! ```
//!
//! Both terminal states are final. The transport and widget factory are
//! injected, so the sequence runs the same against Stripe.js in a browser
//! and against stubs in tests.

use crate::error::{CheckoutError, CheckoutResult, FailureKind};
use crate::identifier::{extract_identifier, ProductIdentifier};
use crate::session::{ClientSecret, CREATE_SESSION_PATH};
use crate::transport::{FormTransport, SessionEndpoint};
use crate::widget::{CheckoutWidget, EmbeddedCheckoutFactory, SecretSupplier, DEFAULT_MOUNT_SELECTOR};
use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{error, info, instrument};

/// Lifecycle of an initializer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Mounted,
    Failed(FailureKind),
}

impl InitState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InitState::Mounted | InitState::Failed(_))
    }
}

/// Mounts an embedded checkout for one product
pub struct CheckoutInitializer<F> {
    factory: F,
    supplier: Rc<dyn SecretSupplier>,
    selector: String,
    state: InitState,
    widget: Option<Box<dyn CheckoutWidget>>,
}

impl<F: EmbeddedCheckoutFactory> CheckoutInitializer<F> {
    /// Create an initializer from an already-built secret supplier
    pub fn new(factory: F, supplier: Rc<dyn SecretSupplier>) -> Self {
        Self {
            factory,
            supplier,
            selector: DEFAULT_MOUNT_SELECTOR.to_string(),
            state: InitState::Uninitialized,
            widget: None,
        }
    }

    /// Create an initializer for a page, capturing the `isbn` from `search` now.
    ///
    /// The secret is requested from the default session endpoint path.
    pub fn for_page<T>(factory: F, transport: T, search: &str) -> Self
    where
        T: FormTransport + 'static,
    {
        Self::for_identifier(factory, transport, CREATE_SESSION_PATH, extract_identifier(search))
    }

    /// Create an initializer with an explicit endpoint and identifier
    pub fn for_identifier<T>(
        factory: F,
        transport: T,
        endpoint: &str,
        isbn: Option<ProductIdentifier>,
    ) -> Self
    where
        T: FormTransport + 'static,
    {
        let supplier = SessionEndpoint::new(transport, endpoint, isbn);
        Self::new(factory, Rc::new(supplier))
    }

    /// Builder: mount into a different element
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The mounted widget, once `initialize` has succeeded
    pub fn widget(&self) -> Option<&dyn CheckoutWidget> {
        self.widget.as_deref()
    }

    /// Give up ownership of the mounted widget
    pub fn into_widget(self) -> Option<Box<dyn CheckoutWidget>> {
        self.widget
    }

    /// Run the sequence: set up the widget with the secret supplier, then
    /// mount it once at the selector.
    ///
    /// Runs at most once; later calls return `AlreadyInitialized`.
    #[instrument(skip(self), fields(selector = %self.selector))]
    pub async fn initialize(&mut self) -> CheckoutResult<()> {
        if self.state != InitState::Uninitialized {
            return Err(CheckoutError::AlreadyInitialized);
        }
        self.state = InitState::Initializing;

        match self.run().await {
            Ok(widget) => {
                info!("Embedded checkout mounted");
                self.widget = Some(widget);
                self.state = InitState::Mounted;
                Ok(())
            }
            Err(e) => {
                error!(kind = %e.kind(), "Checkout initialization failed: {}", e);
                self.state = InitState::Failed(e.kind());
                Err(e)
            }
        }
    }

    async fn run(&self) -> CheckoutResult<Box<dyn CheckoutWidget>> {
        let recorder = Rc::new(RecordingSupplier::new(Rc::clone(&self.supplier)));
        let supplier: Rc<dyn SecretSupplier> = recorder.clone();

        // A supplier failure surfaces from the widget library as an opaque
        // rejection; report the typed error instead.
        let widget = match self.factory.init_embedded_checkout(supplier).await {
            Ok(widget) => widget,
            Err(e) => return Err(recorder.take_error().unwrap_or(e)),
        };

        widget.mount(&self.selector).map_err(|e| match e {
            CheckoutError::Mount { .. } => e,
            other => CheckoutError::Mount {
                selector: self.selector.clone(),
                message: other.to_string(),
            },
        })?;

        Ok(widget)
    }
}

/// Remembers the last error returned by the wrapped supplier
struct RecordingSupplier {
    inner: Rc<dyn SecretSupplier>,
    last_error: RefCell<Option<CheckoutError>>,
}

impl RecordingSupplier {
    fn new(inner: Rc<dyn SecretSupplier>) -> Self {
        Self {
            inner,
            last_error: RefCell::new(None),
        }
    }

    fn take_error(&self) -> Option<CheckoutError> {
        self.last_error.borrow_mut().take()
    }
}

#[async_trait(?Send)]
impl SecretSupplier for RecordingSupplier {
    async fn fetch_client_secret(&self) -> CheckoutResult<ClientSecret> {
        let result = self.inner.fetch_client_secret().await;
        if let Err(e) = &result {
            *self.last_error.borrow_mut() = Some(e.clone());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportResponse;

    type Calls = Rc<RefCell<Vec<String>>>;

    struct StubWidget {
        mounts: Calls,
        fail_mount: bool,
    }

    impl CheckoutWidget for StubWidget {
        fn mount(&self, selector: &str) -> CheckoutResult<()> {
            self.mounts.borrow_mut().push(selector.to_string());
            if self.fail_mount {
                return Err(CheckoutError::WidgetInit("no element".into()));
            }
            Ok(())
        }

        fn destroy(&self) -> CheckoutResult<()> {
            Ok(())
        }
    }

    /// Behaves like Stripe.js: asks for the secret during setup and rejects
    /// with an opaque error when the supplier fails.
    #[derive(Default)]
    struct StubFactory {
        mounts: Calls,
        secrets: Calls,
        fail_mount: bool,
        reject_secret: Option<String>,
    }

    #[async_trait(?Send)]
    impl EmbeddedCheckoutFactory for StubFactory {
        async fn init_embedded_checkout(
            &self,
            supplier: Rc<dyn SecretSupplier>,
        ) -> CheckoutResult<Box<dyn CheckoutWidget>> {
            let secret = supplier
                .fetch_client_secret()
                .await
                .map_err(|_| CheckoutError::WidgetInit("fetchClientSecret rejected".into()))?;

            if self.reject_secret.as_deref() == Some(secret.expose()) {
                return Err(CheckoutError::WidgetInit("invalid client secret".into()));
            }
            self.secrets.borrow_mut().push(secret.expose().to_string());

            Ok(Box::new(StubWidget {
                mounts: Rc::clone(&self.mounts),
                fail_mount: self.fail_mount,
            }))
        }
    }

    struct CannedTransport {
        status: u16,
        body: &'static str,
        sent: Rc<RefCell<Vec<Vec<(String, String)>>>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status,
                body,
                sent: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    #[async_trait(?Send)]
    impl FormTransport for CannedTransport {
        async fn post_form(
            &self,
            _url: &str,
            fields: &[(String, String)],
        ) -> CheckoutResult<TransportResponse> {
            self.sent.borrow_mut().push(fields.to_vec());
            Ok(TransportResponse {
                status: self.status,
                body: self.body.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_mounts_once_at_checkout_anchor() {
        let factory = StubFactory::default();
        let mounts = Rc::clone(&factory.mounts);
        let secrets = Rc::clone(&factory.secrets);
        let transport = CannedTransport::new(200, r#"{"clientSecret":"cs_test_abc"}"#);
        let sent = Rc::clone(&transport.sent);

        let mut init = CheckoutInitializer::for_page(factory, transport, "?isbn=9780131103627");
        assert_eq!(init.state(), InitState::Uninitialized);

        init.initialize().await.unwrap();

        assert_eq!(init.state(), InitState::Mounted);
        assert!(init.widget().is_some());
        assert_eq!(*mounts.borrow(), vec!["#checkout".to_string()]);
        assert_eq!(*secrets.borrow(), vec!["cs_test_abc".to_string()]);
        assert_eq!(
            *sent.borrow(),
            vec![vec![("isbn".to_string(), "9780131103627".to_string())]]
        );
    }

    #[tokio::test]
    async fn test_custom_selector() {
        let factory = StubFactory::default();
        let mounts = Rc::clone(&factory.mounts);
        let transport = CannedTransport::new(200, r#"{"clientSecret":"cs_test_abc"}"#);

        let mut init =
            CheckoutInitializer::for_page(factory, transport, "?isbn=1").with_selector("#pay");
        init.initialize().await.unwrap();

        assert_eq!(*mounts.borrow(), vec!["#pay".to_string()]);
    }

    #[tokio::test]
    async fn test_non_json_response_fails_with_parse_error() {
        let factory = StubFactory::default();
        let mounts = Rc::clone(&factory.mounts);
        let transport = CannedTransport::new(200, "<html>Internal Server Error</html>");

        let mut init = CheckoutInitializer::for_page(factory, transport, "?isbn=1");
        let err = init.initialize().await.unwrap_err();

        assert!(matches!(err, CheckoutError::Parse(_)));
        assert_eq!(init.state(), InitState::Failed(FailureKind::Parse));
        assert!(mounts.borrow().is_empty());
        assert!(init.widget().is_none());
    }

    #[tokio::test]
    async fn test_error_status_fails_with_network_kind() {
        let transport = CannedTransport::new(404, r#"{"error":"Book not found: 1","code":404}"#);
        let mut init = CheckoutInitializer::for_page(StubFactory::default(), transport, "?isbn=1");

        let err = init.initialize().await.unwrap_err();
        assert!(matches!(err, CheckoutError::HttpStatus { status: 404, .. }));
        assert_eq!(init.state(), InitState::Failed(FailureKind::Network));
    }

    #[tokio::test]
    async fn test_missing_client_secret() {
        let transport = CannedTransport::new(200, r#"{"status":"ok"}"#);
        let mut init = CheckoutInitializer::for_page(StubFactory::default(), transport, "?isbn=1");

        let err = init.initialize().await.unwrap_err();
        assert!(matches!(err, CheckoutError::MissingClientSecret));
        assert_eq!(init.state(), InitState::Failed(FailureKind::MissingField));
    }

    #[tokio::test]
    async fn test_absent_isbn_sends_empty_form() {
        let transport = CannedTransport::new(400, r#"{"error":"isbn is required","code":400}"#);
        let sent = Rc::clone(&transport.sent);
        let mut init =
            CheckoutInitializer::for_page(StubFactory::default(), transport, "?ref=home");

        assert!(init.initialize().await.is_err());
        assert_eq!(sent.borrow().len(), 1);
        assert!(sent.borrow()[0].is_empty());
    }

    #[tokio::test]
    async fn test_widget_rejection_without_supplier_error() {
        let factory = StubFactory {
            reject_secret: Some("cs_bad".into()),
            ..Default::default()
        };
        let transport = CannedTransport::new(200, r#"{"clientSecret":"cs_bad"}"#);
        let mut init = CheckoutInitializer::for_page(factory, transport, "?isbn=1");

        let err = init.initialize().await.unwrap_err();
        assert!(matches!(err, CheckoutError::WidgetInit(_)));
        assert_eq!(init.state(), InitState::Failed(FailureKind::Widget));
    }

    #[tokio::test]
    async fn test_mount_failure() {
        let factory = StubFactory {
            fail_mount: true,
            ..Default::default()
        };
        let transport = CannedTransport::new(200, r#"{"clientSecret":"cs_test_abc"}"#);
        let mut init = CheckoutInitializer::for_page(factory, transport, "?isbn=1");

        let err = init.initialize().await.unwrap_err();
        match err {
            CheckoutError::Mount { selector, .. } => assert_eq!(selector, "#checkout"),
            other => panic!("expected mount error, got {:?}", other),
        }
        assert_eq!(init.state(), InitState::Failed(FailureKind::Mount));
    }

    #[tokio::test]
    async fn test_runs_only_once() {
        let factory = StubFactory::default();
        let mounts = Rc::clone(&factory.mounts);
        let transport = CannedTransport::new(200, r#"{"clientSecret":"cs_test_abc"}"#);
        let sent = Rc::clone(&transport.sent);
        let mut init = CheckoutInitializer::for_page(factory, transport, "?isbn=1");

        init.initialize().await.unwrap();
        let err = init.initialize().await.unwrap_err();

        assert!(matches!(err, CheckoutError::AlreadyInitialized));
        assert_eq!(init.state(), InitState::Mounted);
        assert_eq!(mounts.borrow().len(), 1);
        assert_eq!(sent.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_is_terminal() {
        let transport = CannedTransport::new(200, "not json");
        let mut init = CheckoutInitializer::for_page(StubFactory::default(), transport, "?isbn=1");

        assert!(init.initialize().await.is_err());
        assert!(init.state().is_terminal());
        assert!(matches!(
            init.initialize().await,
            Err(CheckoutError::AlreadyInitialized)
        ));
    }
}
