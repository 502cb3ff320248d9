//! HTTP implementation of [`StoreClient`] on top of reqwest
//!
//! Each call owns its request and response buffers; they are dropped on every
//! exit path, including timeouts and transport errors.

use crate::common::{Error, Result, ServiceKey, Settings};
use crate::store::response::{
    decode_read, decode_version, decode_watch, decode_write, parse_index_header, resume_index,
    Probe, ReadOutcome, WatchOutcome, INDEX_HEADER,
};
use crate::store::StoreClient;
use async_trait::async_trait;
use std::time::Duration;

pub struct HttpStoreClient {
    http: reqwest::Client,
    base: String,
    request_timeout: Duration,
}

impl HttpStoreClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout())
            .build()
            .map_err(|e| Error::InvalidConfig(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base: settings.endpoint.trim_end_matches('/').to_string(),
            request_timeout: settings.request_timeout(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.base
    }

    fn key_url(&self, key: &ServiceKey) -> String {
        format!("{}/v2/keys/{}", self.base, key.url_path())
    }
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn probe(&self) -> Probe {
        let url = format!("{}/version", self.base);
        tracing::debug!("Probing store at {}", url);

        let response = match self
            .http
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return Probe::Unreachable(format!("{}: {}", url, e)),
        };

        match response.text().await {
            Ok(body) => decode_version(&body),
            Err(e) => Probe::Unreachable(format!("{}: {}", url, e)),
        }
    }

    async fn read_key(&self, key: &ServiceKey) -> Result<ReadOutcome> {
        let url = self.key_url(key);
        tracing::debug!("Reading {}", key);

        let response = self
            .http
            .get(&url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| Error::Unreachable(format!("{}: {}", url, e)))?;

        let status = response.status().as_u16();
        let index = parse_index_header(
            response
                .headers()
                .get(INDEX_HEADER)
                .and_then(|v| v.to_str().ok()),
        );
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Unreachable(format!("{}: {}", url, e)))?;

        decode_read(status, index, &body)
    }

    async fn watch_key(
        &self,
        key: &ServiceKey,
        from_index: u64,
        timeout_secs: u64,
    ) -> Result<WatchOutcome> {
        let url = self.key_url(key);
        let wait_index = resume_index(from_index);
        tracing::debug!(
            "Watching {} from index {} (timeout {}s)",
            key,
            wait_index,
            timeout_secs
        );

        let mut request = self.http.get(&url).query(&[
            ("wait", "true".to_string()),
            ("waitIndex", wait_index.to_string()),
        ]);
        if timeout_secs > 0 {
            request = request.timeout(Duration::from_secs(timeout_secs));
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Ok(WatchOutcome::TimedOut),
            Err(e) => return Err(Error::Unreachable(format!("{}: {}", url, e))),
        };

        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) if e.is_timeout() => return Ok(WatchOutcome::TimedOut),
            Err(e) => return Err(Error::Unreachable(format!("{}: {}", url, e))),
        };

        decode_watch(&body)
    }

    async fn write_key(&self, key: &ServiceKey, value: &str, ttl: Option<u64>) -> Result<()> {
        let url = self.key_url(key);
        tracing::debug!("Writing {} = {}", key, value);

        let mut form = vec![("value", value.to_string())];
        if let Some(ttl) = ttl {
            form.push(("ttl", ttl.to_string()));
        }

        let response = self
            .http
            .put(&url)
            .form(&form)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| Error::Publish(format!("{}: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Publish(format!("{}: {}", url, e)))?;

        decode_write(status, &body)
    }
}
