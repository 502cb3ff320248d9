//! In-memory [`StoreClient`] that replays scripted outcomes and records calls

use crate::common::{Result, ServiceKey};
use crate::store::{Probe, ReadOutcome, StoreClient, WatchOutcome};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Probe,
    Read(String),
    Watch {
        key: String,
        from_index: u64,
        timeout_secs: u64,
    },
    Write {
        key: String,
        value: String,
        ttl: Option<u64>,
    },
}

pub struct ScriptedStore {
    probe: Probe,
    read: Mutex<Option<Result<ReadOutcome>>>,
    watch: Mutex<Option<Result<WatchOutcome>>>,
    write: Mutex<Option<Result<()>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            probe: Probe::Connected {
                version: "etcd 2.3.8".into(),
            },
            read: Mutex::new(None),
            watch: Mutex::new(None),
            write: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_read(self, outcome: Result<ReadOutcome>) -> Self {
        *self.read.lock().unwrap() = Some(outcome);
        self
    }

    pub fn with_watch(self, outcome: Result<WatchOutcome>) -> Self {
        *self.watch.lock().unwrap() = Some(outcome);
        self
    }

    pub fn with_write(self, outcome: Result<()>) -> Self {
        *self.write.lock().unwrap() = Some(outcome);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl StoreClient for ScriptedStore {
    async fn probe(&self) -> Probe {
        self.record(Call::Probe);
        self.probe.clone()
    }

    async fn read_key(&self, key: &ServiceKey) -> Result<ReadOutcome> {
        self.record(Call::Read(key.to_string()));
        self.read
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(ReadOutcome::Absent { index: 1 }))
    }

    async fn watch_key(
        &self,
        key: &ServiceKey,
        from_index: u64,
        timeout_secs: u64,
    ) -> Result<WatchOutcome> {
        self.record(Call::Watch {
            key: key.to_string(),
            from_index,
            timeout_secs,
        });
        self.watch
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(WatchOutcome::TimedOut))
    }

    async fn write_key(&self, key: &ServiceKey, value: &str, ttl: Option<u64>) -> Result<()> {
        self.record(Call::Write {
            key: key.to_string(),
            value: value.to_string(),
            ttl,
        });
        self.write.lock().unwrap().take().unwrap_or(Ok(()))
    }
}
