//! Store access
//!
//! A thin adapter over the store's HTTP key API: connectivity probe,
//! single-key read, single-key long-poll watch and single-key write.
//! No retries happen here; retry policy belongs to the caller.

pub mod http;
pub mod response;

use crate::common::{Result, ServiceKey};
use async_trait::async_trait;

pub use http::HttpStoreClient;
pub use response::{Probe, ReadOutcome, WatchOutcome};

#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Lightweight identity request against the store.
    async fn probe(&self) -> Probe;

    /// Read a key once. An absent key still reports the store index.
    async fn read_key(&self, key: &ServiceKey) -> Result<ReadOutcome>;

    /// Block until `key` changes strictly after `from_index`, or until
    /// `timeout_secs` elapse. Zero means no client-side deadline.
    async fn watch_key(
        &self,
        key: &ServiceKey,
        from_index: u64,
        timeout_secs: u64,
    ) -> Result<WatchOutcome>;

    /// Single atomic write of `value`, with an optional TTL in seconds.
    async fn write_key(&self, key: &ServiceKey, value: &str, ttl: Option<u64>) -> Result<()>;
}
