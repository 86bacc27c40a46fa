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

//! HTTP/JSON surface over the [`Engine`].
//!
//! ## Endpoints
//!
//! - `POST /accounts` - Create an account
//! - `GET /accounts` - List all accounts
//! - `GET /accounts/{id}` - Get an account by id
//! - `POST /transfer` - Transfer money between two accounts
//! - `GET /transactions` - List all transactions
//! - `GET /ledger` - List all ledger entries
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:8090/accounts \
//!   -H "Content-Type: application/json" \
//!   -d '{"id": 1, "customer_id": 1, "balance": {"amount": 100, "currency": "USD"}}'
//!
//! curl -X POST http://localhost:8090/transfer \
//!   -H "Content-Type: application/json" \
//!   -d '{"sender_account_id": 1, "receiver_account_id": 3, "amount": {"amount": 70, "currency": "USD"}}'
//! ```

use crate::account::Account;
use crate::base::AccountId;
use crate::engine::Engine;
use crate::error::LedgerError;
use crate::ledger::LedgerEntry;
use crate::transaction::{Transaction, Transfer};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response body for errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Shared application state containing the ledger engine.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}

/// Wrapper for converting [`LedgerError`] into HTTP responses.
pub struct AppError(LedgerError);

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        AppError(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            LedgerError::AccountNotFound { .. } => StatusCode::NOT_FOUND,
            LedgerError::DuplicateAccount(_) | LedgerError::ReservedAccount(_) => {
                StatusCode::CONFLICT
            }
            LedgerError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::SameAccount(_)
            | LedgerError::CurrencyMismatch { .. }
            | LedgerError::UnsupportedCurrency { .. }
            | LedgerError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            LedgerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: self.0.code().to_string(),
            }),
        )
            .into_response()
    }
}

/// POST /accounts
async fn create_account(
    State(state): State<AppState>,
    Json(account): Json<Account>,
) -> Result<(StatusCode, Json<Account>), AppError> {
    let account = state.engine.create_account(account)?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /accounts
async fn list_accounts(State(state): State<AppState>) -> Json<Vec<Account>> {
    Json(state.engine.accounts())
}

/// GET /accounts/{id}
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Account>, (StatusCode, Json<ErrorResponse>)> {
    state.engine.get_account(&AccountId(id)).map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("account {id} not found"),
                code: "ACCOUNT_NOT_FOUND".to_string(),
            }),
        )
    })
}

/// POST /transfer
async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<Transfer>,
) -> Result<Json<Account>, AppError> {
    Ok(Json(state.engine.transfer(request)?))
}

/// GET /transactions
async fn list_transactions(State(state): State<AppState>) -> Json<Vec<Transaction>> {
    Json(state.engine.transactions())
}

/// GET /ledger
async fn list_ledger_entries(State(state): State<AppState>) -> Json<Vec<LedgerEntry>> {
    Json(state.engine.ledger_entries())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route("/accounts/{id}", get(get_account))
        .route("/transfer", post(transfer))
        .route("/transactions", get(list_transactions))
        .route("/ledger", get(list_ledger_entries))
        .with_state(state)
}
