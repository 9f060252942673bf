//! Tip event types shared by the server and the viewer.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::amount::format_ar;
use crate::ledger::TransactionRecord;

/// Frame sent from the relay to every viewer.
///
/// Serialized adjacently tagged: `{"type": "tip", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RelayMessage {
    Tip(TipData),
}

/// Payload of a tip frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipData {
    /// Sender address.
    pub from: String,
    /// Decimal AR amount.
    pub amount: String,
    /// Ledger transaction id.
    pub tx_id: String,
    /// Human message shown alongside the amount.
    pub message: String,
    /// ISO-8601 UTC time the event was built.
    pub timestamp: String,
}

impl TipData {
    pub fn new(from: String, amount: String, tx_id: String, message: &str) -> Self {
        Self::at(from, amount, tx_id, message, Utc::now())
    }

    pub fn at(
        from: String,
        amount: String,
        tx_id: String,
        message: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            from,
            amount,
            tx_id,
            message: message.to_string(),
            timestamp: iso_timestamp(at),
        }
    }

    /// Build from a ledger record that already passed the poll filter.
    ///
    /// Returns `None` if the record has no id.
    pub fn from_record(record: &TransactionRecord, message: &str) -> Option<Self> {
        let tx_id = record.tx_id()?;
        Some(Self::new(
            record.sender.clone(),
            format_ar(record.quantity_raw),
            tx_id.to_string(),
            message,
        ))
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// An amount submitted by hand: JSON string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManualAmount {
    Text(String),
    Number(serde_json::Number),
}

impl ManualAmount {
    /// Numeric zero and blank text count as missing.
    fn into_text(self) -> Option<String> {
        let text = match self {
            Self::Text(text) => text,
            Self::Number(number) if number.as_f64() == Some(0.0) => return None,
            Self::Number(number) => number.to_string(),
        };
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Body of `POST /notify`. Every field is optional on the wire so missing
/// fields become a validation error instead of a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualTip {
    pub from: Option<String>,
    pub amount: Option<ManualAmount>,
    pub tx_id: Option<String>,
}

impl ManualTip {
    /// Check that `from`, `amount` and `txId` are all present and non-empty.
    pub fn into_tip(self, message: &str) -> Option<TipData> {
        let from = self.from.filter(|f| !f.trim().is_empty())?;
        let amount = self.amount.and_then(ManualAmount::into_text)?;
        let tx_id = self.tx_id.filter(|t| !t.trim().is_empty())?;
        Some(TipData::new(from, amount, tx_id, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_tip_wire_shape() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let msg = RelayMessage::Tip(TipData::at(
            "abc".into(),
            "1.500000".into(),
            "tx1".into(),
            "hello",
            at,
        ));

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "tip",
                "data": {
                    "from": "abc",
                    "amount": "1.500000",
                    "txId": "tx1",
                    "message": "hello",
                    "timestamp": "2024-05-01T12:30:00.000Z"
                }
            })
        );
    }

    #[test]
    fn test_from_record_formats_amount() {
        let record = TransactionRecord {
            id: Some("tx-9".into()),
            sender: "sender".into(),
            recipient: "watched".into(),
            quantity_raw: 2_000_000_000,
            block_height: None,
            block_timestamp: None,
        };
        let tip = TipData::from_record(&record, "m").unwrap();
        assert_eq!(tip.amount, "0.002000");
        assert_eq!(tip.tx_id, "tx-9");
        assert_eq!(tip.from, "sender");
    }

    #[test]
    fn test_manual_tip_requires_all_fields() {
        let complete: ManualTip =
            serde_json::from_str(r#"{"from":"abc","amount":"1.5","txId":"tx1"}"#).unwrap();
        let tip = complete.into_tip("m").unwrap();
        assert_eq!(tip.amount, "1.5");

        let numeric: ManualTip =
            serde_json::from_str(r#"{"from":"abc","amount":2.25,"txId":"tx1"}"#).unwrap();
        assert_eq!(numeric.into_tip("m").unwrap().amount, "2.25");

        let missing: ManualTip = serde_json::from_str(r#"{"from":"abc","txId":"tx1"}"#).unwrap();
        assert!(missing.into_tip("m").is_none());

        let empty: ManualTip =
            serde_json::from_str(r#"{"from":"","amount":"1","txId":"tx1"}"#).unwrap();
        assert!(empty.into_tip("m").is_none());
    }

    #[test]
    fn test_manual_zero_amount_is_missing() {
        for body in [
            r#"{"from":"abc","amount":0,"txId":"tx1"}"#,
            r#"{"from":"abc","amount":0.0,"txId":"tx1"}"#,
            r#"{"from":"abc","amount":"","txId":"tx1"}"#,
        ] {
            let tip: ManualTip = serde_json::from_str(body).unwrap();
            assert!(tip.into_tip("m").is_none(), "{body}");
        }

        // A non-empty string is relayed verbatim, like any other text amount.
        let text_zero: ManualTip =
            serde_json::from_str(r#"{"from":"abc","amount":"0","txId":"tx1"}"#).unwrap();
        assert_eq!(text_zero.into_tip("m").unwrap().amount, "0");
    }
}
