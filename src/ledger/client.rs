//! Ledger gateway client with timeout and fallback handling.
//!
//! # Responsibilities
//! - Query the GraphQL endpoint for recent transfers to an address
//! - Fall back to the REST history endpoint when GraphQL yields nothing usable
//! - Normalise both shapes into `TransactionRecord`
//! - Swallow every failure into an empty result so polling never stalls

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::config::LedgerConfig;
use crate::ledger::types::{
    GraphQlResponse, HistoryEntry, LedgerError, LedgerResult, TransactionRecord,
};
use crate::ledger::LedgerSource;
use crate::observability::metrics;

const TRANSACTIONS_QUERY: &str = r#"
query GetTransactions($address: String!, $first: Int!) {
  transactions(recipients: [$address], first: $first, sort: HEIGHT_DESC) {
    edges {
      node {
        id
        owner { address }
        quantity { ar }
        block { height timestamp }
      }
    }
  }
}
"#;

/// Gateway client reading incoming transfers for one address.
#[derive(Clone)]
pub struct LedgerReader {
    http: reqwest::Client,
    gateway_url: String,
    page_size: u32,
    timeout: Duration,
}

impl LedgerReader {
    /// Create a new reader. Every request carries `request_timeout_secs`.
    pub fn new(config: &LedgerConfig) -> LedgerResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tip-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            timeout,
        })
    }

    /// Primary path: recent transfers via GraphQL, newest block first.
    ///
    /// An empty edge list is reported as `Ok(vec![])`; the caller decides
    /// whether that warrants the fallback.
    pub async fn query_graphql(&self, address: &str) -> LedgerResult<Vec<TransactionRecord>> {
        let response = self
            .http
            .post(format!("{}/graphql", self.gateway_url))
            .json(&json!({
                "query": TRANSACTIONS_QUERY,
                "variables": { "address": address, "first": self.page_size },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LedgerError::Status(response.status().as_u16()));
        }

        let body: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| LedgerError::Decode(e.to_string()))?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            return Err(LedgerError::GraphQl(
                serde_json::Value::Array(errors).to_string(),
            ));
        }

        let connection = body
            .data
            .and_then(|data| data.transactions)
            .ok_or_else(|| LedgerError::Decode("missing data.transactions".to_string()))?;

        Ok(connection
            .edges
            .into_iter()
            .map(|edge| edge.node.into_record(address))
            .collect())
    }

    /// Fallback path: REST transaction history.
    ///
    /// A body that is not a JSON array yields an empty result.
    pub async fn query_history(&self, address: &str) -> LedgerResult<Vec<TransactionRecord>> {
        let response = self
            .http
            .get(format!("{}/tx/history/{}", self.gateway_url, address))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LedgerError::Status(response.status().as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LedgerError::Decode(e.to_string()))?;

        let serde_json::Value::Array(entries) = body else {
            tracing::warn!(address = %address, "History response is not an array");
            return Ok(Vec::new());
        };

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<HistoryEntry>(entry) {
                Ok(entry) => records.push(TransactionRecord::from(entry)),
                Err(e) => tracing::debug!(error = %e, "Skipping malformed history entry"),
            }
        }
        Ok(records)
    }

    /// Configured per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl LedgerSource for LedgerReader {
    async fn fetch_incoming(&self, address: &str) -> Vec<TransactionRecord> {
        match self.query_graphql(address).await {
            Ok(records) if !records.is_empty() => return records,
            Ok(_) => tracing::info!(address = %address, "GraphQL returned no transactions"),
            Err(e) => tracing::error!(address = %address, error = %e, "GraphQL query failed"),
        }

        tracing::warn!(address = %address, "Using REST history as a fallback");
        metrics::record_ledger_fallback();

        match self.query_history(address).await {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(address = %address, error = %e, "History query failed");
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for LedgerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerReader")
            .field("gateway_url", &self.gateway_url)
            .field("page_size", &self.page_size)
            .field("timeout_secs", &self.timeout.as_secs())
            .finish()
    }
}
