// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Integration tests for the HTTP API with concurrent requests.
//!
//! These tests verify that the server exposes every ledger operation with the
//! expected wire format and stays consistent under concurrent transfers.

use futures::future::join_all;
use ledger_transfer::server::{AppState, ErrorResponse, create_router};
use ledger_transfer::{Account, AccountId, Engine, LedgerEntry, Transaction};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Test server that binds to an ephemeral port.
struct TestServer {
    base_url: String,
    engine: Arc<Engine>,
}

impl TestServer {
    async fn new() -> Self {
        let engine = Arc::new(Engine::new());
        let app = create_router(AppState::new(engine.clone()));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer {
            base_url: format!("http://{}", addr),
            engine,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create(&self, client: &Client, id: u64, customer: u64, amount: i64, currency: &str) {
        let response = client
            .post(self.url("/accounts"))
            .json(&json!({
                "id": id,
                "customer_id": customer,
                "balance": {"amount": amount, "currency": currency}
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    async fn seed(&self, client: &Client) {
        self.create(client, 1, 1, 100, "USD").await;
        self.create(client, 2, 1, 200, "AED").await;
        self.create(client, 3, 2, 300, "USD").await;
    }
}

fn transfer_body(sender: u64, receiver: u64, amount: i64, currency: &str) -> Value {
    json!({
        "sender_account_id": sender,
        "receiver_account_id": receiver,
        "amount": {"amount": amount, "currency": currency}
    })
}

// === Tests ===

#[tokio::test]
async fn create_and_list_accounts() {
    let server = TestServer::new().await;
    let client = Client::new();
    server.seed(&client).await;

    let accounts: Vec<Value> = client
        .get(server.url("/accounts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(accounts.len(), 3);
    assert_eq!(
        accounts[1],
        json!({"id": 2, "customer_id": 1, "balance": {"amount": 200, "currency": "AED"}})
    );
}

#[tokio::test]
async fn get_account_by_id() {
    let server = TestServer::new().await;
    let client = Client::new();
    server.seed(&client).await;

    let response = client.get(server.url("/accounts/3")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let account: Account = response.json().await.unwrap();
    assert_eq!(account.id, AccountId(3));
    assert_eq!(account.balance.amount(), 300);

    let missing = client.get(server.url("/accounts/42")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    let error: ErrorResponse = missing.json().await.unwrap();
    assert_eq!(error.code, "ACCOUNT_NOT_FOUND");
}

#[tokio::test]
async fn duplicate_account_conflicts() {
    let server = TestServer::new().await;
    let client = Client::new();
    server.seed(&client).await;

    let body = json!({"id": 1, "customer_id": 1, "balance": {"amount": 5, "currency": "USD"}});
    let response = client
        .post(server.url("/accounts"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ErrorResponse = response.json().await.unwrap();
    assert_eq!(error.code, "DUPLICATE_ACCOUNT");
    assert_eq!(server.engine.accounts().len(), 3);
}

#[tokio::test]
async fn transfer_returns_updated_sender() {
    let server = TestServer::new().await;
    let client = Client::new();
    server.seed(&client).await;

    let response = client
        .post(server.url("/transfer"))
        .json(&transfer_body(1, 3, 70, "USD"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let sender: Value = response.json().await.unwrap();
    assert_eq!(
        sender,
        json!({"id": 1, "customer_id": 1, "balance": {"amount": 30, "currency": "USD"}})
    );

    let transactions: Vec<Transaction> = client
        .get(server.url("/transactions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(transactions.len(), 4);

    let entries: Vec<Value> = client
        .get(server.url("/ledger"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(entries.len(), 8);
    assert_eq!(entries[6]["type"], "C");
    assert_eq!(entries[6]["account_id"], 3);
    assert_eq!(entries[7]["type"], "D");
    assert_eq!(entries[7]["account_id"], 1);
    let transfer_id = transactions[3].id.0.to_string();
    assert_eq!(entries[7]["transaction_id"], transfer_id);

    let typed: Vec<LedgerEntry> = serde_json::from_value(Value::Array(entries)).unwrap();
    assert_eq!(typed, server.engine.ledger_entries());
}

#[tokio::test]
async fn transfer_errors_map_to_status_codes() {
    let server = TestServer::new().await;
    let client = Client::new();
    server.seed(&client).await;

    let cases = [
        (transfer_body(800, 1, 10, "USD"), StatusCode::NOT_FOUND, "ACCOUNT_NOT_FOUND"),
        (transfer_body(1, 2, 70, "USD"), StatusCode::BAD_REQUEST, "CURRENCY_MISMATCH"),
        (transfer_body(1, 3, 70, "AED"), StatusCode::BAD_REQUEST, "UNSUPPORTED_CURRENCY"),
        (
            transfer_body(1, 3, 101, "USD"),
            StatusCode::UNPROCESSABLE_ENTITY,
            "INSUFFICIENT_BALANCE",
        ),
        (transfer_body(1, 1, 10, "USD"), StatusCode::BAD_REQUEST, "SAME_ACCOUNT"),
        (transfer_body(1, 3, 0, "USD"), StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
    ];

    for (body, status, code) in cases {
        let response = client
            .post(server.url("/transfer"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), status, "{body}");
        let error: ErrorResponse = response.json().await.unwrap();
        assert_eq!(error.code, code);
    }

    assert_eq!(server.engine.transactions().len(), 3);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let server = TestServer::new().await;
    let client = Client::new();

    let response = client
        .post(server.url("/transfer"))
        .json(&json!({"sender_account_id": 1}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let body = json!({"id": 1, "customer_id": 1, "balance": {"amount": 1, "currency": "DOLLARS"}});
    let response = client
        .post(server.url("/accounts"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());
    assert!(server.engine.accounts().is_empty());
}

/// Concurrent opposite transfers over HTTP net to the exact balances.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_over_http() {
    let server = TestServer::new().await;
    let client = Client::new();
    server.create(&client, 1, 1, 1_000, "USD").await;
    server.create(&client, 2, 2, 1_000, "USD").await;

    const REQUESTS_PER_DIRECTION: usize = 100;

    let requests = (0..REQUESTS_PER_DIRECTION * 2).map(|i| {
        let client = client.clone();
        let url = server.url("/transfer");
        let body = if i % 2 == 0 {
            transfer_body(1, 2, 3, "USD")
        } else {
            transfer_body(2, 1, 1, "USD")
        };
        async move {
            let response = client.post(&url).json(&body).send().await.unwrap();
            response.status()
        }
    });

    let statuses = join_all(requests).await;
    assert!(statuses.iter().all(|s| *s == StatusCode::OK));

    let moved = REQUESTS_PER_DIRECTION as i64;
    let first = server.engine.get_account(&AccountId(1)).unwrap();
    let second = server.engine.get_account(&AccountId(2)).unwrap();
    assert_eq!(first.balance.amount(), 1_000 - 3 * moved + moved);
    assert_eq!(second.balance.amount(), 1_000 + 3 * moved - moved);
}
