//! Ledger record types, upstream response shapes, and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ledger::amount::ar_to_winston;

/// One transfer observed on the ledger, normalised from either upstream
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Ledger transaction id. `None` when the upstream omitted it.
    pub id: Option<String>,
    /// Sending address.
    pub sender: String,
    /// Receiving address.
    pub recipient: String,
    /// Quantity in winston.
    pub quantity_raw: u128,
    /// Block height, absent while pending.
    pub block_height: Option<u64>,
    /// Block timestamp in unix seconds, absent while pending.
    pub block_timestamp: Option<i64>,
}

impl TransactionRecord {
    /// Unconfirmed transactions have no block timestamp yet.
    pub fn is_pending(&self) -> bool {
        self.block_timestamp.is_none()
    }

    /// The id, if present and non-empty.
    pub fn tx_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Errors that can occur while talking to the ledger gateway.
///
/// None of these escape `LedgerSource::fetch_incoming`; they drive the
/// fallback chain and the logs.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Connection failure or timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Gateway answered with a non-success status.
    #[error("gateway returned status {0}")]
    Status(u16),

    /// GraphQL reported an `errors` list.
    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    /// Response body did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Number carried either as JSON number or string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberOrString {
    Integer(u64),
    Float(f64),
    Text(String),
}

impl NumberOrString {
    /// Interpret as an integer winston quantity.
    pub(crate) fn as_winston(&self) -> Option<u128> {
        match self {
            Self::Integer(n) => Some(u128::from(*n)),
            Self::Float(f) if f.is_finite() && *f >= 0.0 && f.fract() == 0.0 => Some(*f as u128),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Interpret as a decimal AR amount and convert to winston.
    pub(crate) fn ar_as_winston(&self) -> Option<u128> {
        match self {
            Self::Integer(n) => u128::from(*n).checked_mul(crate::ledger::amount::WINSTON_PER_AR),
            Self::Float(f) => ar_to_winston(&f.to_string()),
            Self::Text(s) => ar_to_winston(s),
        }
    }
}

/// Top-level GraphQL response.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse {
    pub data: Option<GraphQlData>,
    pub errors: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlData {
    pub transactions: Option<TransactionConnection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionConnection {
    #[serde(default)]
    pub edges: Vec<TransactionEdge>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionEdge {
    pub node: TransactionNode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionNode {
    pub id: Option<String>,
    pub owner: Option<OwnerNode>,
    pub quantity: Option<QuantityNode>,
    pub block: Option<BlockNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerNode {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuantityNode {
    pub ar: Option<NumberOrString>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlockNode {
    pub height: Option<u64>,
    pub timestamp: Option<i64>,
}

impl TransactionNode {
    /// GraphQL results are filtered by recipient server-side, so the queried
    /// address is the recipient.
    pub(crate) fn into_record(self, address: &str) -> TransactionRecord {
        let (block_height, block_timestamp) = self
            .block
            .map(|b| (b.height, b.timestamp))
            .unwrap_or((None, None));

        TransactionRecord {
            id: self.id,
            sender: self.owner.and_then(|o| o.address).unwrap_or_default(),
            recipient: address.to_string(),
            quantity_raw: self
                .quantity
                .and_then(|q| q.ar)
                .and_then(|ar| ar.ar_as_winston())
                .unwrap_or(0),
            block_height,
            block_timestamp,
        }
    }
}

/// One entry of the REST `/tx/history/{address}` array.
#[derive(Debug, Deserialize)]
pub(crate) struct HistoryEntry {
    pub txid: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub quantity: Option<NumberOrString>,
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_timestamp: Option<i64>,
}

impl From<HistoryEntry> for TransactionRecord {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.txid,
            sender: entry.owner.unwrap_or_default(),
            recipient: entry.target.unwrap_or_default(),
            quantity_raw: entry
                .quantity
                .and_then(|q| q.as_winston())
                .unwrap_or(0),
            block_height: entry.block_height,
            block_timestamp: entry.block_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_graphql_node_mapping() {
        let node: TransactionNode = serde_json::from_value(serde_json::json!({
            "id": "tx-1",
            "owner": { "address": "sender-1" },
            "quantity": { "ar": "0.250000000000" },
            "block": { "height": 1200, "timestamp": 1700000000 }
        }))
        .unwrap();

        let record = node.into_record("watched");
        assert_eq!(
            record,
            TransactionRecord {
                id: Some("tx-1".into()),
                sender: "sender-1".into(),
                recipient: "watched".into(),
                quantity_raw: 250_000_000_000,
                block_height: Some(1200),
                block_timestamp: Some(1_700_000_000),
            }
        );
        assert!(!record.is_pending());
    }

    #[test]
    fn test_pending_node_has_no_block() {
        let node: TransactionNode = serde_json::from_value(serde_json::json!({
            "id": "tx-2",
            "owner": { "address": "s" },
            "quantity": { "ar": "1" },
            "block": null
        }))
        .unwrap();
        let record = node.into_record("watched");
        assert!(record.is_pending());
        assert_eq!(record.block_height, None);
    }

    #[test]
    fn test_history_entry_mapping() {
        let entry: HistoryEntry = serde_json::from_value(serde_json::json!({
            "txid": "tx-3",
            "owner": "sender-3",
            "quantity": "1500000000000",
            "block_height": 7,
            "block_timestamp": 1700000100
        }))
        .unwrap();

        let record = TransactionRecord::from(entry);
        assert_eq!(record.recipient, "");
        assert_eq!(record.quantity_raw, 1_500_000_000_000);
        assert_eq!(record.tx_id(), Some("tx-3"));
    }

    #[test]
    fn test_empty_id_is_absent() {
        let record = TransactionRecord {
            id: Some(String::new()),
            sender: String::new(),
            recipient: String::new(),
            quantity_raw: 0,
            block_height: None,
            block_timestamp: None,
        };
        assert_eq!(record.tx_id(), None);
    }
}
