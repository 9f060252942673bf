//! Ledger reader and poll loop against a mock gateway.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use common::{start_mock_gateway, start_relay, test_config, wait_until, GatewayScript, WATCHED};
use tip_relay::ledger::{LedgerReader, LedgerSource, TransactionRecord};
use tip_relay::payments::PaymentMonitor;

fn graphql_edges() -> Value {
    json!({
        "data": { "transactions": { "edges": [
            { "node": {
                "id": "tx-confirmed",
                "owner": { "address": "sender-aaaaaaaa" },
                "quantity": { "ar": "1.250000000000" },
                "block": { "height": 1500, "timestamp": 1700000000 }
            } },
            { "node": {
                "id": "tx-pending",
                "owner": { "address": "sender-bbbbbbbb" },
                "quantity": { "ar": "0.5" },
                "block": null
            } }
        ] } }
    })
}

fn history_entries() -> Value {
    json!([
        {
            "txid": "tx-confirmed",
            "owner": "sender-aaaaaaaa",
            "target": WATCHED,
            "quantity": "1250000000000",
            "block_height": 1500,
            "block_timestamp": 1700000000
        },
        {
            "txid": "tx-pending",
            "owner": "sender-bbbbbbbb",
            "target": WATCHED,
            "quantity": "500000000000"
        }
    ])
}

fn reader(gateway: &str) -> LedgerReader {
    LedgerReader::new(&test_config(gateway).ledger).unwrap()
}

#[tokio::test]
async fn test_primary_and_fallback_map_identically() {
    let primary = GatewayScript::new((200, graphql_edges()), (500, json!({})));
    let primary_url = start_mock_gateway(Arc::clone(&primary)).await;
    let from_graphql = reader(&primary_url).fetch_incoming(WATCHED).await;

    let fallback = GatewayScript::new((200, json!({ "data": { "transactions": { "edges": [] } } })), (200, history_entries()));
    let fallback_url = start_mock_gateway(Arc::clone(&fallback)).await;
    let from_history = reader(&fallback_url).fetch_incoming(WATCHED).await;

    assert_eq!(from_graphql.len(), 2);
    assert_eq!(from_graphql, from_history);
    assert_eq!(primary.history_hits.load(Ordering::SeqCst), 0);
    assert_eq!(fallback.history_hits.load(Ordering::SeqCst), 1);

    let expected = TransactionRecord {
        id: Some("tx-confirmed".into()),
        sender: "sender-aaaaaaaa".into(),
        recipient: WATCHED.into(),
        quantity_raw: 1_250_000_000_000,
        block_height: Some(1500),
        block_timestamp: Some(1700000000),
    };
    assert_eq!(from_history[0], expected);
    assert!(from_history[1].is_pending());
}

#[tokio::test]
async fn test_graphql_errors_fall_back_to_history() {
    let script = GatewayScript::new(
        (200, json!({ "errors": [{ "message": "rate limited" }] })),
        (200, history_entries()),
    );
    let url = start_mock_gateway(Arc::clone(&script)).await;

    let records = reader(&url).fetch_incoming(WATCHED).await;
    assert_eq!(records.len(), 2);
    assert_eq!(script.graphql_hits.load(Ordering::SeqCst), 1);
    assert_eq!(script.history_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_both_paths_failing_yields_empty() {
    let script = GatewayScript::new((502, json!({})), (200, json!({ "not": "an array" })));
    let url = start_mock_gateway(script).await;

    assert!(reader(&url).fetch_incoming(WATCHED).await.is_empty());
}

#[tokio::test]
async fn test_request_timeout_yields_empty() {
    let script = GatewayScript::delayed(
        (200, graphql_edges()),
        (200, history_entries()),
        Duration::from_secs(30),
    );
    let url = start_mock_gateway(Arc::clone(&script)).await;
    let mut config = test_config(&url);
    config.ledger.request_timeout_secs = 1;
    let reader = LedgerReader::new(&config.ledger).unwrap();

    let started = Instant::now();
    let records = reader.fetch_incoming(WATCHED).await;
    let elapsed = started.elapsed();

    assert!(records.is_empty());
    // One timeout for GraphQL, one for the history fallback.
    assert!(elapsed >= Duration::from_secs(2), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "hung for {elapsed:?}");
    assert_eq!(script.graphql_hits.load(Ordering::SeqCst), 1);
    assert_eq!(script.history_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_poll_pass_delivers_each_transfer_once() {
    let script = GatewayScript::new((200, graphql_edges()), (500, json!({})));
    let gateway = start_mock_gateway(script).await;
    let config = test_config(&gateway);
    let relay = start_relay(&config).await;

    let (viewer, _) = connect_async(relay.ws_url()).await.unwrap();
    let (_, mut rx) = viewer.split();
    assert!(wait_until(|| relay.state.broadcaster.connection_count() == 1).await);

    let monitor = PaymentMonitor::new(
        &config,
        Arc::new(reader(&gateway)),
        Arc::clone(&relay.state.dedup),
        Arc::clone(&relay.state.broadcaster),
        Arc::clone(&relay.state.poll_status),
    );

    let first = monitor.poll_once().await;
    assert_eq!(first.seen, 2);
    assert_eq!(first.forwarded, 2);
    let second = monitor.poll_once().await;
    assert_eq!(second.forwarded, 0);
    assert_eq!(relay.state.dedup.len(), 2);
    assert!(relay.state.poll_status.last_checked().is_some());

    let mut ids = Vec::new();
    for _ in 0..2 {
        let frame = tokio::time::timeout(Duration::from_secs(2), rx.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let Message::Text(text) = frame else { panic!("expected text frame") };
        let value: Value = serde_json::from_str(text.as_str()).unwrap();
        ids.push(value["data"]["txId"].as_str().unwrap().to_string());
        if value["data"]["txId"] == "tx-confirmed" {
            assert_eq!(value["data"]["amount"], "1.250000");
            assert_eq!(value["data"]["from"], "sender-aaaaaaaa");
        }
    }
    ids.sort();
    assert_eq!(ids, vec!["tx-confirmed", "tx-pending"]);

    let health: Value = reqwest::get(format!("{}/health", relay.http_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["processedTxs"], 2);

    relay.shutdown.trigger();
}
