//! Memoir API client
//!
//! `MemoirApi` is the seam between the page controller and the remote API.
//! `HttpMemoirClient` is the reqwest implementation used by the server; tests
//! substitute an in-memory implementation.

use crate::error::{AppError, Result};
use crate::models::{Draft, Record};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;

/// Remote store of memoir records
#[async_trait]
pub trait MemoirApi: Send + Sync {
    /// Fetch the full record list
    async fn list_records(&self) -> Result<Vec<Record>>;

    /// Store a new record and return it as the API stored it
    async fn create_record(&self, draft: &Draft) -> Result<Record>;
}

#[derive(Clone)]
pub struct HttpMemoirClient {
    client: Client,
    data_url: String,
}

impl HttpMemoirClient {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("memoirs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            data_url: data_url(base_url),
        })
    }

    /// URL of the records collection
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::InvalidResponse(format!("body is not JSON: {}", e)))
    }
}

#[async_trait]
impl MemoirApi for HttpMemoirClient {
    async fn list_records(&self) -> Result<Vec<Record>> {
        let response = self.client.get(&self.data_url).send().await?;
        let body = Self::read_json(response).await?;
        let records = Record::list_from_value(body)?;

        tracing::debug!("Fetched {} records from {}", records.len(), self.data_url);
        Ok(records)
    }

    async fn create_record(&self, draft: &Draft) -> Result<Record> {
        let response = self.client.post(&self.data_url).json(draft).send().await?;
        let body = Self::read_json(response).await?;
        let record = Record::from_value(body)?;

        tracing::debug!("Created record {:?} at {}", record.label, self.data_url);
        Ok(record)
    }
}

/// `{base}/data`, tolerating a trailing slash on the base
fn data_url(base_url: &Url) -> String {
    format!("{}/data", base_url.as_str().trim_end_matches('/'))
}
