//! Clients for the external table-building service.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use statpub_core::{content::DataQuery, render::TableBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
  #[error("table-building service is not configured")]
  Offline,

  #[error("table-building request failed: {0}")]
  Http(#[from] reqwest::Error),
}

// ─── HTTP ────────────────────────────────────────────────────────────────────

/// POSTs each [`DataQuery`] as JSON to `{base_url}/query`.
#[derive(Clone)]
pub struct HttpTableBuilder {
  client:   Client,
  base_url: String,
}

impl HttpTableBuilder {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TableError> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_owned(),
    })
  }

  fn url(&self) -> String { format!("{}/query", self.base_url) }
}

impl TableBuilder for HttpTableBuilder {
  type Error = TableError;

  async fn query(&self, query: &DataQuery) -> Result<Value, TableError> {
    let resp = self
      .client
      .post(self.url())
      .json(query)
      .send()
      .await?
      .error_for_status()?;
    Ok(resp.json().await?)
  }
}

// ─── Either ──────────────────────────────────────────────────────────────────

/// The service client chosen at startup: HTTP when a URL is configured,
/// otherwise offline (every data block reports itself unavailable).
#[derive(Clone)]
pub enum Tables {
  Http(HttpTableBuilder),
  Offline,
}

impl Tables {
  pub fn from_config(url: Option<&str>, timeout: Duration) -> Result<Self, TableError> {
    match url {
      Some(url) => Ok(Self::Http(HttpTableBuilder::new(url, timeout)?)),
      None => Ok(Self::Offline),
    }
  }
}

impl TableBuilder for Tables {
  type Error = TableError;

  async fn query(&self, query: &DataQuery) -> Result<Value, TableError> {
    match self {
      Self::Http(http) => http.query(query).await,
      Self::Offline => Err(TableError::Offline),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn offline_reports_every_query_unavailable() {
    let tables = Tables::from_config(None, Duration::from_secs(1)).unwrap();
    let err = tables.query(&DataQuery::default()).await.unwrap_err();
    assert!(matches!(err, TableError::Offline));
  }

  #[test]
  fn trailing_slash_is_trimmed() {
    let http =
      HttpTableBuilder::new("http://localhost:5050/api/", Duration::from_secs(1)).unwrap();
    assert_eq!(http.url(), "http://localhost:5050/api/query");
  }
}
