use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::traits::{GatewayError, GatewayTransaction, PaymentGateway, TransactionRequest};

/// An in-process payment gateway. Every transaction succeeds with a predictable token unless the gateway has been
/// switched into failure mode.
#[derive(Debug, Clone, Default)]
pub struct StubGateway {
    calls: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits this long before answering, to widen race windows in concurrency tests.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for StubGateway {
    async fn create_transaction(&self, request: TransactionRequest) -> Result<GatewayTransaction, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Unreachable("stub gateway is down".to_string()));
        }
        Ok(GatewayTransaction {
            token: format!("snap-{}", request.order_reference),
            redirect_url: format!("https://pay.example.test/snap/{}", request.order_reference),
        })
    }
}
