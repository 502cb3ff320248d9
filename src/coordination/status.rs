//! One-shot status query (read only, never watches)

use crate::common::{Result, ServiceKey};
use crate::store::{ReadOutcome, StoreClient};

/// Current status of a service, `None` when the key is absent.
pub async fn query_status<C: StoreClient>(store: &C, service: &str) -> Result<Option<String>> {
    let key = ServiceKey::new(service)?;
    store.probe().await.into_result()?;

    match store.read_key(&key).await? {
        ReadOutcome::Present { value, .. } => Ok(Some(value)),
        ReadOutcome::Absent { index } => {
            tracing::debug!("{} absent at index {}", key, index);
            Ok(None)
        }
    }
}
