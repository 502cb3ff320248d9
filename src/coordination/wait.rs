//! Wait for a service to report a status
//!
//! The coordinator reads the service key once. A present key is evaluated
//! immediately and never watched. An absent key is watched starting from the
//! index the absence read reported, so a status written after the read is
//! delivered exactly once and nothing written before it is redelivered.
//!
//! ```text
//! CheckingStore -> ReadingKey -> AlreadyPresent ----------> Evaluating -> Success | Mismatch
//!                            \-> AbsentWatching -> Changed -/
//!                                              \-> TimedOut
//! ```

use crate::common::{Error, Result, ServiceKey, DEFAULT_STATUS};
use crate::store::{ReadOutcome, StoreClient, WatchOutcome};
use std::time::Instant;

/// Parameters of one wait invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitRequest {
    pub service: String,
    /// Status that counts as ready (exact, case-sensitive)
    pub expected: String,
    /// Seconds to watch; 0 blocks indefinitely
    pub timeout_secs: u64,
}

impl WaitRequest {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            expected: DEFAULT_STATUS.to_string(),
            timeout_secs: 0,
        }
    }

    pub fn expecting(mut self, status: impl Into<String>) -> Self {
        self.expected = status.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// How the observed status was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// Key already held a status at read time
    AlreadyPresent,
    /// Status arrived through the watch
    Watched,
}

/// Successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ready {
    pub status: String,
    pub observation: Observation,
}

#[derive(Debug)]
enum WaitState {
    CheckingStore,
    ReadingKey,
    AbsentWatching { index: u64 },
    Evaluating { value: String, observation: Observation },
}

pub struct WaitCoordinator<C> {
    store: C,
}

impl<C: StoreClient> WaitCoordinator<C> {
    pub fn new(store: C) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    /// Run one wait to completion.
    ///
    /// Returns [`Ready`] on a matching status. Failing outcomes are
    /// [`Error::Timeout`], [`Error::StatusMismatch`], connectivity errors, or
    /// [`Error::Usage`] for an invalid service name (raised before any request).
    pub async fn wait(&self, request: &WaitRequest) -> Result<Ready> {
        let key = ServiceKey::new(&request.service)?;
        let started = Instant::now();
        let mut state = WaitState::CheckingStore;

        loop {
            tracing::trace!("wait {}: {:?}", key, state);
            state = match state {
                WaitState::CheckingStore => {
                    let version = self.store.probe().await.into_result()?;
                    tracing::debug!("Store identified as {}", version);
                    WaitState::ReadingKey
                }

                WaitState::ReadingKey => match self.store.read_key(&key).await? {
                    ReadOutcome::Present { value, index } => {
                        tracing::debug!("{} present at index {}: {}", key, index, value);
                        WaitState::Evaluating {
                            value,
                            observation: Observation::AlreadyPresent,
                        }
                    }
                    ReadOutcome::Absent { index } => {
                        tracing::info!("{} absent at index {}, watching", key, index);
                        WaitState::AbsentWatching { index }
                    }
                },

                WaitState::AbsentWatching { index } => {
                    match self
                        .store
                        .watch_key(&key, index, request.timeout_secs)
                        .await?
                    {
                        WatchOutcome::Changed { value, index } => {
                            tracing::debug!("{} changed at index {}: {}", key, index, value);
                            WaitState::Evaluating {
                                value,
                                observation: Observation::Watched,
                            }
                        }
                        WatchOutcome::TimedOut => {
                            tracing::info!(
                                "Gave up on {} after {:?}",
                                key,
                                started.elapsed()
                            );
                            return Err(Error::Timeout {
                                service: request.service.clone(),
                                seconds: request.timeout_secs,
                            });
                        }
                    }
                }

                WaitState::Evaluating { value, observation } => {
                    if value == request.expected {
                        tracing::info!("{} reached '{}'", key, value);
                        return Ok(Ready {
                            status: value,
                            observation,
                        });
                    }
                    tracing::debug!(
                        "{} reported '{}', expected '{}'",
                        key,
                        value,
                        request.expected
                    );
                    return Err(Error::StatusMismatch {
                        service: request.service.clone(),
                        expected: request.expected.clone(),
                        observed: value,
                    });
                }
            };
        }
    }
}
