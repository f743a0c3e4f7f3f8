//! Common test utilities for building screen documents, requests and callback endpoints.
use serde_json::json;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use ussd_flow::prelude::*;

/// The two-choice menu: `initial_screen` accepts "1" or "2" and leads to the
/// info screens `menu_1` and `menu_2`.
#[allow(dead_code)]
pub fn menu_document(retry: bool) -> serde_json::Value {
    json!({
        "flows": {
            "main": {
                "screens": [
                    {
                        "name": "initial_screen",
                        "type": "input",
                        "data": "Welcome\n1. Balance\n2. Help",
                        "retry_message": "Please choose 1 or 2",
                        "retry": retry,
                        "validation": { "kind": "list", "value": ["1", "2"] },
                        "next_screen": "menu_{user_response}"
                    },
                    { "name": "menu_1", "type": "info", "data": "Your balance is 42" },
                    { "name": "menu_2", "type": "info", "data": "Call 100 for help" }
                ]
            }
        }
    })
}

/// A shop with purchases, a cross-flow jump to `billing` and a `go_to` chain.
///
/// - `1` -> balance (END)
/// - `2` -> amount (retry, regex) -> confirm (mapped 1=buy/2=sell) -> purchase_buy / purchase_sell
/// - `3` -> billing_gate -> `billing.confirm` -> billing.done_1 / billing.done_2
/// - `4` -> hop_a -> hop_b -> hop_c (zero-width)
#[allow(dead_code)]
pub fn shop_document() -> serde_json::Value {
    json!({
        "flows": {
            "main": {
                "screens": [
                    {
                        "name": "initial_screen",
                        "type": "initial",
                        "data": "Shop\n1. Balance\n2. Trade\n3. Billing\n4. Promotions",
                        "validation": { "type": "regex", "value": "[1-4]$" },
                        "next_screen": "menu_{user_response}"
                    },
                    { "name": "menu_1", "type": "info", "data": "Balance: 42" },
                    {
                        "name": "menu_2",
                        "type": "input",
                        "data": "Enter amount",
                        "retry_message": "Amount must be a number",
                        "retry": true,
                        "validation": { "kind": "regex", "value": "[0-9]+$" },
                        "next_screen": "confirm",
                        "callback": { "type": "function", "name": "record_amount", "mode": "sync" }
                    },
                    {
                        "name": "confirm",
                        "type": "confirmation",
                        "data": "1. Buy\n2. Sell",
                        "validation": { "kind": "list", "value": ["1", "2"] },
                        "mappings": { "1": "buy", "2": "sell" },
                        "next_screen": "purchase_{user_response}",
                        "callback": { "type": "func", "name": "send_sms" }
                    },
                    { "name": "purchase_buy", "type": "info", "data": "Bought" },
                    { "name": "purchase_sell", "type": "info", "data": "Sold" },
                    {
                        "name": "menu_3",
                        "type": "input",
                        "data": "1. Pay bill",
                        "validation": { "kind": "list", "value": ["1"] },
                        "next_screen": "billing.confirm"
                    },
                    { "name": "menu_4", "type": "info", "data": "unreachable", "go_to": "hop_a" },
                    { "name": "hop_a", "type": "info", "data": "unreachable", "go_to": "hop_b" },
                    {
                        "name": "hop_b",
                        "type": "info",
                        "data": "unreachable",
                        "go_to": "hop_c",
                        "extra_field": "ignored"
                    },
                    {
                        "name": "hop_c",
                        "type": "input",
                        "data": "Promotions\n0. Back",
                        "validation": { "kind": "list", "value": ["0"] },
                        "next_screen": "initial_screen"
                    }
                ]
            },
            "billing": {
                "screens": [
                    {
                        "name": "initial_screen",
                        "type": "input",
                        "data": "Billing home",
                        "validation": { "kind": "list", "value": ["9"] },
                        "next_screen": "main.initial_screen"
                    },
                    {
                        "name": "confirm",
                        "type": "confirmation",
                        "data": "Pay now?\n1. Yes\n2. Later",
                        "validation": { "kind": "list", "value": ["1", "2"] },
                        "next_screen": "done_{user_response}"
                    },
                    { "name": "done_1", "type": "info", "data": "Bill paid" },
                    { "name": "done_2", "type": "info", "data": "Bill deferred" }
                ]
            }
        }
    })
}

/// `initial_screen` leads into `a`, whose `go_to` chain loops a -> b -> a.
#[allow(dead_code)]
pub fn cyclic_document() -> serde_json::Value {
    json!({
        "flows": {
            "main": {
                "screens": [
                    {
                        "name": "initial_screen",
                        "type": "input",
                        "data": "Start",
                        "next_screen": "a"
                    },
                    { "name": "a", "type": "info", "data": "A", "go_to": "b" },
                    { "name": "b", "type": "info", "data": "B", "go_to": "a" }
                ]
            }
        }
    })
}

/// Two flows linked through `go_to` hops.
///
/// - `main`: `1` -> menu_1 -> `billing.receipt`; `2` -> menu_2 -> `billing.bounce` -> `main.menu_2` (cycle);
///   `3` -> menu_3, whose `go_to` is empty
/// - `billing`: receipt (END), bounce
/// - `kiosk`: `initial_screen` has only a `go_to`, used as its post-validation target
#[allow(dead_code)]
pub fn linked_flows_document() -> serde_json::Value {
    json!({
        "flows": {
            "main": {
                "screens": [
                    {
                        "name": "initial_screen",
                        "type": "input",
                        "data": "1. Receipt\n2. Loop\n3. Broken",
                        "validation": { "kind": "list", "value": ["1", "2", "3"] },
                        "next_screen": "menu_{user_response}"
                    },
                    { "name": "menu_1", "type": "info", "data": "unreachable", "go_to": "billing.receipt" },
                    { "name": "menu_2", "type": "info", "data": "unreachable", "go_to": "billing.bounce" },
                    { "name": "menu_3", "type": "info", "data": "Broken", "go_to": "" }
                ]
            },
            "billing": {
                "screens": [
                    { "name": "initial_screen", "type": "input", "data": "Billing", "next_screen": "receipt" },
                    { "name": "receipt", "type": "info", "data": "Receipt sent" },
                    { "name": "bounce", "type": "info", "data": "unreachable", "go_to": "main.menu_2" }
                ]
            },
            "kiosk": {
                "screens": [
                    {
                        "name": "initial_screen",
                        "type": "input",
                        "data": "a. Airtime\nb. Bundles",
                        "validation": { "kind": "list", "value": ["a", "b"] },
                        "go_to": "item_{user_response}"
                    },
                    { "name": "item_a", "type": "info", "data": "Airtime" },
                    { "name": "item_b", "type": "info", "data": "Bundles" }
                ]
            }
        }
    })
}

/// A straight `go_to` chain `hop_0 -> hop_1 -> ... -> hop_{length}`.
#[allow(dead_code)]
pub fn chain_document(length: usize) -> serde_json::Value {
    let mut screens = vec![json!({
        "name": "initial_screen",
        "type": "input",
        "data": "Start",
        "next_screen": "hop_0"
    })];
    for i in 0..length {
        screens.push(json!({
            "name": format!("hop_{}", i),
            "type": "info",
            "data": format!("hop {}", i),
            "go_to": format!("hop_{}", i + 1)
        }));
    }
    screens.push(json!({
        "name": format!("hop_{}", length),
        "type": "info",
        "data": "Chain end"
    }));
    json!({ "flows": { "main": { "screens": screens } } })
}

/// A single flow whose `initial_screen` runs the given callback on any input.
#[allow(dead_code)]
pub fn callback_document(callback: serde_json::Value) -> serde_json::Value {
    json!({
        "flows": {
            "main": {
                "screens": [
                    {
                        "name": "initial_screen",
                        "type": "input",
                        "data": "Pick",
                        "validation": { "kind": "list", "value": ["1", "2"] },
                        "mappings": { "1": "buy", "2": "sell" },
                        "next_screen": "done",
                        "callback": callback
                    },
                    { "name": "done", "type": "info", "data": "Done" }
                ]
            }
        }
    })
}

#[allow(dead_code)]
pub fn load(document: serde_json::Value) -> ScreenStore {
    let json = document.to_string();
    ScreenStore::from_json(&json).expect("Failed to load screen document")
}

#[allow(dead_code)]
pub fn request(text: &str) -> UssdRequest {
    UssdRequest {
        phone_number: "+254700000001".to_string(),
        session_id: "ATUid_test".to_string(),
        service_code: "*384*1#".to_string(),
        text: text.to_string(),
    }
}

/// Starts a one-shot HTTP endpoint on localhost. The returned receiver yields
/// the request body the endpoint received.
#[allow(dead_code)]
pub async fn spawn_http_endpoint() -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let (sender, receiver) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("Failed to accept");
        let body = read_request_body(&mut socket).await;
        let _ = sender.send(body);
        let response =
            "HTTP/1.1 201 Created\r\ncontent-type: text/plain\r\ncontent-length: 8\r\nconnection: close\r\n\r\naccepted";
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    (format!("http://{}/hooks/ussd", addr), receiver)
}

/// Starts an endpoint that accepts connections but never answers.
#[allow(dead_code)]
pub async fn spawn_silent_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        if let Ok((socket, _)) = listener.accept().await {
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        }
    });

    format!("http://{}/slow", addr)
}

async fn read_request_body(socket: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let read = socket.read(&mut chunk).await.unwrap_or(0);
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        if let Some(end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buffer[..end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let body_start = end + 4;
            if buffer.len() >= body_start + length {
                return String::from_utf8_lossy(&buffer[body_start..body_start + length])
                    .to_string();
            }
        }
    }

    String::new()
}
