//! Publish a service status
//!
//! A single write to `service/{name}`. Waiters are released by the store's own
//! watch fan-out; the publisher never talks to them.

use crate::common::{Result, ServiceKey, DEFAULT_STATUS};
use crate::store::StoreClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRequest {
    pub service: String,
    pub status: String,
    /// Expire the status after this many seconds (persistent if unset)
    pub ttl_secs: Option<u64>,
}

impl NotifyRequest {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            status: DEFAULT_STATUS.to_string(),
            ttl_secs: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_ttl(mut self, ttl_secs: Option<u64>) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

pub struct NotifyPublisher<C> {
    store: C,
}

impl<C: StoreClient> NotifyPublisher<C> {
    pub fn new(store: C) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    pub async fn publish(&self, request: &NotifyRequest) -> Result<()> {
        let key = ServiceKey::new(&request.service)?;
        self.store.probe().await.into_result()?;

        self.store
            .write_key(&key, &request.status, request.ttl_secs)
            .await?;

        tracing::info!("Published {} = {}", key, request.status);
        Ok(())
    }
}
