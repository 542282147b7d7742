//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the checkout provider, book catalog, fulfillment and configuration.

use crate::fulfillment::FulfillmentDesk;
use checkout_core::{return_url, BookCatalog, BoxedCheckoutProvider};
use checkout_stripe::StripeEmbeddedCheckout;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL (used for the return URL)
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Directory holding index.html, checkout.html, return.html and the wasm bundle
    pub static_dir: PathBuf,
    /// Explicit catalog path; searched for when unset
    pub catalog_path: Option<PathBuf>,
    /// Page the customer returns to after paying
    pub return_page: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            catalog_path: std::env::var("CATALOG_PATH").ok().map(PathBuf::from),
            return_page: "return.html".to_string(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Embedded checkout provider
    pub provider: BoxedCheckoutProvider,
    /// Publishable key handed to the browser
    pub publishable_key: String,
    /// Book catalog
    pub catalog: Arc<BookCatalog>,
    /// Fulfillment for completed sessions
    pub fulfillment: FulfillmentDesk,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by Stripe
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let catalog = load_book_catalog(config.catalog_path.as_ref())?;

        let stripe = StripeEmbeddedCheckout::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;
        let publishable_key = stripe.publishable_key().to_string();

        Ok(Self::with_provider(
            Arc::new(stripe),
            publishable_key,
            catalog,
            config,
        ))
    }

    /// Assemble state from parts
    pub fn with_provider(
        provider: BoxedCheckoutProvider,
        publishable_key: impl Into<String>,
        catalog: BookCatalog,
        config: AppConfig,
    ) -> Self {
        Self {
            provider,
            publishable_key: publishable_key.into(),
            catalog: Arc::new(catalog),
            fulfillment: FulfillmentDesk::default(),
            config,
        }
    }

    /// Builder: replace the fulfillment desk
    pub fn with_fulfillment(mut self, fulfillment: FulfillmentDesk) -> Self {
        self.fulfillment = fulfillment;
        self
    }

    /// Return URL with the session ID placeholder
    pub fn return_url(&self) -> String {
        return_url(&self.config.base_url, &self.config.return_page)
    }
}

/// Load the book catalog from the configured path or the usual locations
pub fn load_book_catalog(explicit: Option<&PathBuf>) -> anyhow::Result<BookCatalog> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let catalog = BookCatalog::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded {} books from {}", catalog.len(), path.display());
        return Ok(catalog);
    }

    let config_paths = [
        "config/books.toml",
        "../config/books.toml",
        "../../config/books.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let catalog = BookCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded {} books from {}", catalog.len(), path);
            return Ok(catalog);
        }
    }

    // Return empty catalog if no config found
    tracing::warn!("No book catalog found, using empty catalog");
    Ok(BookCatalog::new())
}
