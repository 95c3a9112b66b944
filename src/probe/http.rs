//! HTTP implementation of the existence probe (reqwest).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RANGE};
use std::borrow::Cow;
use std::time::Duration;
use tracing::debug;

use super::{classify_head, classify_range, DocumentProber, ProbeOutcome};
use crate::config::ProbeConfig;

pub struct HttpProber {
    client: reqwest::Client,
    range_bytes: u64,
}

impl HttpProber {
    pub fn new(config: &ProbeConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(client, config.range_bytes))
    }

    pub fn with_client(client: reqwest::Client, range_bytes: u64) -> Self {
        Self {
            client,
            range_bytes: range_bytes.max(1),
        }
    }

    async fn head(&self, location: &str) -> ProbeOutcome {
        match self.client.head(location).send().await {
            Ok(resp) => {
                let status = resp.status();
                let outcome = classify_head(status, content_type(resp.headers()).as_deref());
                debug!(url = %location, status = status.as_u16(), outcome = outcome.as_str(), "HEAD probe");
                outcome
            }
            Err(e) => {
                debug!(url = %location, error = %e, "HEAD probe failed, falling back to ranged GET");
                ProbeOutcome::Inconclusive
            }
        }
    }

    async fn ranged_get(&self, location: &str) -> ProbeOutcome {
        // Response body is dropped unread; only status and headers matter.
        let result = self
            .client
            .get(location)
            .header(RANGE, format!("bytes=0-{}", self.range_bytes - 1))
            .send()
            .await;

        match result {
            Ok(resp) => {
                let status = resp.status();
                let outcome = classify_range(status, content_type(resp.headers()).as_deref());
                debug!(url = %location, status = status.as_u16(), outcome = outcome.as_str(), "ranged GET probe");
                outcome
            }
            Err(e) => {
                debug!(url = %location, error = %e, "ranged GET probe failed");
                ProbeOutcome::Inconclusive
            }
        }
    }
}

#[async_trait]
impl DocumentProber for HttpProber {
    async fn probe(&self, location: &str) -> ProbeOutcome {
        match self.head(location).await {
            ProbeOutcome::Inconclusive => self.ranged_get(location).await,
            conclusive => conclusive,
        }
    }
}

/// Non-ASCII bytes are decoded lossily, never treated as an absent header.
fn content_type(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    headers
        .get(CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
}
