//! # checkout-api
//!
//! HTTP layer for bookstore-checkout-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The storefront book table
//! - The session endpoint the embedded checkout fetches its client secret from
//! - Session status and fulfillment for the return page
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Storefront |
//! | POST | `/create-checkout-session` | `{ "clientSecret": ... }` for the posted `isbn` |
//! | GET | `/session-status?session_id=` | Session status |
//! | GET | `/config` | Publishable key |
//! | GET | `/health` | Health check |

pub mod fulfillment;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod storefront;

pub use fulfillment::{Fulfillment, FulfillmentDesk, LoggingFulfillment};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
