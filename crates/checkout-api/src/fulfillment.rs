//! # Fulfillment
//!
//! Hook invoked when the return page reports a completed session.

use async_trait::async_trait;
use checkout_core::{CheckoutResult, SessionStatus};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Ships a purchased book
#[async_trait]
pub trait Fulfillment: Send + Sync {
    async fn fulfill(&self, session: &SessionStatus) -> CheckoutResult<()>;
}

/// Logs the order and does nothing else
pub struct LoggingFulfillment;

#[async_trait]
impl Fulfillment for LoggingFulfillment {
    async fn fulfill(&self, session: &SessionStatus) -> CheckoutResult<()> {
        info!(
            session_id = %session.session_id,
            "Need to fulfill {} for {}",
            session.isbn.as_deref().unwrap_or("unknown isbn"),
            session.customer_email.as_deref().unwrap_or("unknown customer")
        );
        Ok(())
    }
}

/// Runs a fulfillment at most once per completed session.
///
/// Fulfilled session ids are held in memory for the life of the process,
/// one entry per completed checkout. A restart forgets them, so `inner`
/// must tolerate a repeat for a session fulfilled before the restart.
#[derive(Clone)]
pub struct FulfillmentDesk {
    inner: Arc<dyn Fulfillment>,
    done: Arc<Mutex<HashSet<String>>>,
}

impl FulfillmentDesk {
    pub fn new(inner: Arc<dyn Fulfillment>) -> Self {
        Self {
            inner,
            done: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Fulfill `session` if it is complete and was not fulfilled before.
    ///
    /// Returns whether the fulfillment ran. A failed run may be retried.
    pub async fn fulfill_once(&self, session: &SessionStatus) -> CheckoutResult<bool> {
        if !session.is_complete() {
            return Ok(false);
        }

        if !self.claim(&session.session_id) {
            return Ok(false);
        }

        if let Err(e) = self.inner.fulfill(session).await {
            warn!(session_id = %session.session_id, "Fulfillment failed: {}", e);
            self.release(&session.session_id);
            return Err(e);
        }

        Ok(true)
    }

    fn claim(&self, session_id: &str) -> bool {
        match self.done.lock() {
            Ok(mut done) => done.insert(session_id.to_string()),
            Err(poisoned) => poisoned.into_inner().insert(session_id.to_string()),
        }
    }

    fn release(&self, session_id: &str) {
        match self.done.lock() {
            Ok(mut done) => done.remove(session_id),
            Err(poisoned) => poisoned.into_inner().remove(session_id),
        };
    }
}

impl Default for FulfillmentDesk {
    fn default() -> Self {
        Self::new(Arc::new(LoggingFulfillment))
    }
}
